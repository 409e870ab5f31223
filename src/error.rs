//! Error handling for mkproject.
//! Defines the error taxonomy and result alias used throughout the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing, expanding or materializing a project structure.
///
/// Parse and expansion errors are always raised before anything is written to disk.
/// Only [`Error::WriteError`] can occur once materialization has started.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed structure description: invalid node shape or invalid name.
    #[error("Invalid structure: {message}{}.", line_suffix(.line))]
    ParseError { message: String, line: Option<usize> },

    /// A `{mp:name}` marker referenced a token that is not defined.
    #[error("Unknown token \"{name}\".")]
    UnknownTokenError { name: String },

    /// A project template includes itself, directly or transitively.
    #[error("Recursive project template include \"{name}\": {}.", .chain.join(" -> "))]
    CyclicTemplateError { name: String, chain: Vec<String> },

    /// Dynamic code failed, or produced a value of the wrong shape.
    #[error("Dynamic code error in `{}`: {cause}.", .code.trim())]
    DynamicEvaluationError { code: String, cause: String },

    /// A file, folder or project template reference could not be resolved.
    #[error("{kind} template \"{name}\" not found.")]
    TemplateNotFoundError { kind: TemplateKind, name: String },

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Filesystem failure while writing a generated entry.
    #[error("Failed to write '{}': {source}.", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Interactive prompt failure.
    #[error("Prompt error: {0}.")]
    PromptError(String),
}

/// Which kind of template a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    File,
    Folder,
    Project,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::File => write!(f, "File"),
            TemplateKind::Folder => write!(f, "Folder"),
            TemplateKind::Project => write!(f, "Project"),
        }
    }
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {line})"),
        None => String::new(),
    }
}

impl Error {
    pub(crate) fn parse<S: Into<String>>(message: S) -> Self {
        Error::ParseError { message: message.into(), line: None }
    }

    pub(crate) fn dynamic<C: Into<String>, E: ToString>(code: C, cause: E) -> Self {
        Error::DynamicEvaluationError { code: code.into(), cause: cause.to_string() }
    }

    pub(crate) fn write<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::WriteError { path: path.into(), source }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}

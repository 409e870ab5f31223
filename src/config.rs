//! Configuration handling for mkproject.
//! Loads the optional `mkproject.json` / `mkproject.yml` / `mkproject.yaml` file holding
//! template locations, custom tokens, the dynamic-code preamble and the default conflict policy.

use crate::conflict::ConflictPolicy;
use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::token::TokenValue;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default file templates directory, relative to the configuration base.
pub const DEFAULT_FILE_TEMPLATES: &str = "templates";

/// Default project templates directory, relative to the configuration base.
pub const DEFAULT_PROJECT_TEMPLATES: &str = "projects";

/// Kind of a custom token in its long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Text,
    #[serde(alias = "python")]
    Dynamic,
}

/// A custom token as written in the configuration file.
///
/// Accepted shapes:
/// - `email: me@example.com`
/// - `email: { type: text, value: me@example.com }`
/// - `year: { dynamic: "2024 + 1" }` (`python:` is accepted for `dynamic:`)
///
/// Anything else, such as a list or a mapping with other keys, is rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CustomToken {
    Typed {
        #[serde(rename = "type")]
        kind: TokenKind,
        #[serde(default)]
        value: Option<Scalar>,
    },
    Dynamic {
        #[serde(alias = "python")]
        dynamic: String,
    },
    Plain(Option<Scalar>),
}

/// Scalar token value; numbers and booleans keep their written spelling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CustomToken {
    pub fn into_value(self) -> TokenValue {
        match self {
            CustomToken::Typed { kind: TokenKind::Text, value } => TokenValue::Text(text(value)),
            CustomToken::Typed { kind: TokenKind::Dynamic, value } => {
                TokenValue::Dynamic(text(value))
            }
            CustomToken::Dynamic { dynamic } => TokenValue::Dynamic(dynamic),
            CustomToken::Plain(value) => TokenValue::Text(text(value)),
        }
    }
}

fn text(value: Option<Scalar>) -> String {
    match value {
        None => String::new(),
        Some(Scalar::Bool(flag)) => flag.to_string(),
        Some(Scalar::Number(number)) => number.to_string(),
        Some(Scalar::Text(text)) => text,
    }
}

/// Settings read from the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub file_templates: Option<PathBuf>,
    pub project_templates: Option<PathBuf>,
    pub tokens: IndexMap<String, CustomToken>,
    pub preamble: Option<String>,
    pub on_conflict: Option<ConflictPolicy>,
    /// Directory relative template paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    pub fn file_templates_dir(&self) -> PathBuf {
        self.resolve(self.file_templates.as_deref().unwrap_or(Path::new(DEFAULT_FILE_TEMPLATES)))
    }

    pub fn project_templates_dir(&self) -> PathBuf {
        self.resolve(
            self.project_templates.as_deref().unwrap_or(Path::new(DEFAULT_PROJECT_TEMPLATES)),
        )
    }

    /// Custom tokens in declaration order.
    pub fn token_values(&self) -> impl Iterator<Item = (String, TokenValue)> + '_ {
        self.tokens.iter().map(|(name, token)| (name.clone(), token.clone().into_value()))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Finds the first existing configuration file in `dir`.
///
/// # Arguments
/// * `dir` - Directory to search
/// * `config_files` - Candidate file names, in priority order
pub fn find_config<P: AsRef<Path>>(dir: P, config_files: &[&str]) -> Option<PathBuf> {
    config_files.iter().map(|file| dir.as_ref().join(file)).find(|path| path.is_file())
}

/// Parses configuration content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML for [`Config`]
pub fn parse_config(content: &str) -> Result<Config> {
    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str::<Option<Config>>(content)
            .map(Option::unwrap_or_default)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

/// Loads the configuration.
///
/// An explicit `path` must exist. Without one, `dir` is searched for the
/// supported file names and an absent file yields the defaults.
pub fn get_config<P: AsRef<Path>>(path: Option<&Path>, dir: P) -> Result<Config> {
    let dir = dir.as_ref();
    let config_path = match path {
        Some(path) if !path.is_file() => {
            return Err(Error::ConfigError(format!(
                "Invalid configuration path: {}",
                path.display()
            )))
        }
        Some(path) => Some(path.to_path_buf()),
        None => find_config(dir, &CONFIG_FILES),
    };

    let Some(config_path) = config_path else {
        debug!("No configuration file found (tried: {})", CONFIG_FILES.join(", "));
        return Ok(Config { base_dir: dir.to_path_buf(), ..Config::default() });
    };

    debug!("Loading configuration from {}", config_path.display());
    let content = std::fs::read_to_string(&config_path)?;
    let mut config = parse_config(&content)?;
    config.base_dir = config_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());
    Ok(config)
}

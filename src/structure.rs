//! Structure model: the typed node tree parsed from a structure description.

use crate::error::{Error, Result};

/// Where a file's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Inline text, token-resolved.
    Content(String),
    /// Relative path of a File Template.
    Template(String),
}

impl Default for FileSource {
    fn default() -> Self {
        FileSource::Content(String::new())
    }
}

/// `title` / `description` replacements scoped to one project template inclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// One entry of a structure description. Names may still contain token markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File { name: String, source: FileSource },
    /// `template` names a Folder Template whose files follow the explicit children.
    Folder { name: String, children: Vec<Node>, template: Option<String> },
    /// Single File Template; the destination name is the template's base name.
    FileTemplate { path: String },
    /// Every file of a Folder Template, inserted as siblings.
    FolderTemplate { path: String },
    /// Another Project Template's root nodes, inlined.
    ProjectTemplate { name: String, overrides: Overrides },
    /// Code producing more node descriptions at expansion time.
    DynamicList { code: String },
}

impl Node {
    pub fn file<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Node::File { name: name.into(), source: FileSource::Content(content.into()) }
    }

    pub fn folder<N: Into<String>>(name: N, children: Vec<Node>) -> Self {
        Node::Folder { name: name.into(), children, template: None }
    }
}

/// A parsed structure description, also the shape of a Project Template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structure {
    pub title: Option<String>,
    /// Declared description, or the document's leading comment.
    pub description: Option<String>,
    pub nodes: Vec<Node>,
}

/// Checks that a resolved name can be used as a single path segment.
///
/// # Errors
/// * `Error::ParseError` if the name is empty, `.`/`..`, or contains a separator or NUL
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::parse(format!("invalid name \"{name}\": {reason}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("README.md").is_ok());
        assert!(validate_name(".gitignore").is_ok());
        assert!(validate_name("Teaching - Shop").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("src/main.rs").is_err());
        assert!(validate_name("src\\main.rs").is_err());
    }
}

//! Structure description parsing.
//! Turns a YAML document into [`Structure`] nodes.
//!
//! A document is either a list of items, or a mapping with a `files:` list and
//! optional `title` / `description` defaults. Each item is one of:
//! - a plain string, an empty file
//! - `file:` with optional `content:` or `template:`
//! - `folder:` with optional `contents:` and `template:`
//! - `file_template:`, `folder_template:`
//! - `project_template:` with optional `overrides:`
//! - `dynamic:` code producing more items
//! - a single `name: [items]` entry, the implicit folder shorthand
use crate::error::{Error, Result};
use crate::structure::{FileSource, Node, Overrides, Structure};
use serde_yaml::{Mapping, Value};

const FILE_KEYS: &[&str] = &["file", "content", "template"];
const FOLDER_KEYS: &[&str] = &["folder", "contents", "template"];
const PROJECT_KEYS: &[&str] = &["project_template", "overrides"];

/// Parses a structure description.
///
/// # Errors
/// * `Error::ParseError` with the offending line for YAML syntax errors,
///   or without one for items that do not match the node vocabulary
pub fn parse_structure(text: &str) -> Result<Structure> {
    let document = parse_document(text)?;

    let (nodes, title, description) = match &document {
        Value::Mapping(mapping) if mapping.contains_key("files") => (
            parse_items(&document)?,
            optional_text(mapping, "title")?,
            optional_text(mapping, "description")?,
        ),
        _ => (parse_items(&document)?, None, None),
    };

    Ok(Structure { title, description: description.or_else(|| leading_comment(text)), nodes })
}

/// Parses YAML text after converting tabs to two spaces.
pub fn parse_document(text: &str) -> Result<Value> {
    let processed = text.replace('\t', "  ");
    serde_yaml::from_str(&processed).map_err(|e| Error::ParseError {
        message: format!("invalid YAML: {e}"),
        line: e.location().map(|location| location.line()),
    })
}

/// Parses the item list of a document value: a sequence, a mapping with `files:`, or nothing.
pub fn parse_items(document: &Value) -> Result<Vec<Node>> {
    match document {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items.iter().map(parse_node).collect(),
        Value::Mapping(mapping) => match mapping.get("files") {
            Some(files @ (Value::Sequence(_) | Value::Null)) => parse_items(files),
            Some(_) => Err(Error::parse("`files` must be a list of items")),
            None => Err(Error::parse("expected a list of items or a mapping with `files`")),
        },
        _ => Err(Error::parse("expected a list of items or a mapping with `files`")),
    }
}

/// Returns the first block of `#` comment lines at the top of the document.
pub fn leading_comment(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .skip_while(|line| line.is_empty())
        .take_while(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .collect();

    let comment = lines.join("\n").trim().to_string();
    if comment.is_empty() {
        None
    } else {
        Some(comment)
    }
}

/// Parses one item into a [`Node`].
pub fn parse_node(item: &Value) -> Result<Node> {
    let mapping = match item {
        Value::Mapping(mapping) => mapping,
        other => {
            let name = scalar_text(other)
                .ok_or_else(|| Error::parse(format!("unsupported item {}", describe(other))))?;
            return Ok(Node::file(name, ""));
        }
    };

    // `- {mp:title}` written unquoted is a one-entry mapping with a null value.
    if let Some(name) = token_shorthand(item) {
        return Ok(Node::file(name, ""));
    }

    if mapping.contains_key("project_template") {
        check_keys(mapping, PROJECT_KEYS)?;
        let name = required_text(mapping, "project_template")?;
        let overrides = match mapping.get("overrides") {
            None | Some(Value::Null) => Overrides::default(),
            Some(Value::Mapping(overrides)) => {
                check_keys(overrides, &["title", "description"])?;
                Overrides {
                    title: optional_text(overrides, "title")?,
                    description: optional_text(overrides, "description")?,
                }
            }
            Some(other) => {
                return Err(Error::parse(format!(
                    "`overrides` of \"{name}\" must be a mapping, found {}",
                    describe(other)
                )))
            }
        };
        return Ok(Node::ProjectTemplate { name, overrides });
    }

    if mapping.contains_key("file_template") {
        check_keys(mapping, &["file_template"])?;
        return Ok(Node::FileTemplate { path: required_text(mapping, "file_template")? });
    }

    if mapping.contains_key("folder_template") {
        check_keys(mapping, &["folder_template"])?;
        return Ok(Node::FolderTemplate { path: required_text(mapping, "folder_template")? });
    }

    if mapping.contains_key("dynamic") {
        check_keys(mapping, &["dynamic"])?;
        return Ok(Node::DynamicList { code: required_text(mapping, "dynamic")? });
    }

    if mapping.contains_key("file") {
        check_keys(mapping, FILE_KEYS)?;
        let name = required_text(mapping, "file")?;
        let content = optional_text(mapping, "content")?;
        let template = optional_text(mapping, "template")?;
        let source = match (content, template) {
            (Some(_), Some(_)) => {
                return Err(Error::parse(format!(
                    "file \"{name}\" has both `content` and `template`"
                )))
            }
            (Some(content), None) => FileSource::Content(content),
            (None, Some(template)) => FileSource::Template(template),
            (None, None) => FileSource::default(),
        };
        return Ok(Node::File { name, source });
    }

    if mapping.contains_key("folder") {
        check_keys(mapping, FOLDER_KEYS)?;
        let name = required_text(mapping, "folder")?;
        let children = match mapping.get("contents") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items.iter().map(parse_node).collect::<Result<_>>()?,
            Some(other) => {
                return Err(Error::parse(format!(
                    "`contents` of folder \"{name}\" must be a list, found {}",
                    describe(other)
                )))
            }
        };
        let template = optional_text(mapping, "template")?;
        return Ok(Node::Folder { name, children, template });
    }

    // Implicit folder: `name: [items]`
    if mapping.len() == 1 {
        if let Some((key, value)) = mapping.iter().next() {
            let name = key_text(key)?;
            return match value {
                Value::Sequence(items) => Ok(Node::folder(
                    name,
                    items.iter().map(parse_node).collect::<Result<_>>()?,
                )),
                Value::Null => Ok(Node::folder(name, Vec::new())),
                other => Err(Error::parse(format!(
                    "invalid shorthand folder \"{name}\": expected a list, found {}",
                    describe(other)
                ))),
            };
        }
    }

    Err(Error::parse(format!("unrecognised item {}", describe(item))))
}

/// Text of a scalar value. Numbers and booleans become their YAML spelling.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => token_shorthand(value),
    }
}

/// `{mp:title}` left unquoted parses as `{"mp:title": null}`; restores the marker text.
fn token_shorthand(value: &Value) -> Option<String> {
    let Value::Mapping(mapping) = value else { return None };
    if mapping.len() != 1 {
        return None;
    }
    match mapping.iter().next() {
        Some((Value::String(key), Value::Null)) if is_marker_body(key) => Some(format!("{{{key}}}")),
        _ => None,
    }
}

fn is_marker_body(key: &str) -> bool {
    let lower = key.trim_start().to_lowercase();
    lower.starts_with("mp:") || lower.starts_with("mp.py")
}

fn key_text(key: &Value) -> Result<String> {
    scalar_text(key).ok_or_else(|| Error::parse(format!("invalid key {}", describe(key))))
}

fn required_text(mapping: &Mapping, key: &str) -> Result<String> {
    optional_text(mapping, key)?.ok_or_else(|| Error::parse(format!("`{key}` must not be empty")))
}

fn optional_text(mapping: &Mapping, key: &str) -> Result<Option<String>> {
    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_text(value).map(Some).ok_or_else(|| {
            Error::parse(format!("`{key}` must be text, found {}", describe(value)))
        }),
    }
}

fn check_keys(mapping: &Mapping, allowed: &[&str]) -> Result<()> {
    for key in mapping.keys() {
        let name = key.as_str().unwrap_or_default();
        if !allowed.contains(&name) {
            return Err(Error::parse(format!(
                "unexpected key {} (allowed: {})",
                describe(key),
                allowed.join(", ")
            )));
        }
    }
    Ok(())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "nothing".to_string(),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| format!("`{}`", s.trim()))
            .unwrap_or_else(|_| "a value".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_comment() {
        let text = "\n# Rust crate\n# with tests\n- README.md\n# not this\n";
        assert_eq!(leading_comment(text), Some("Rust crate\nwith tests".to_string()));
        assert_eq!(leading_comment("- README.md\n"), None);
    }

    #[test]
    fn test_token_shorthand() {
        let value: Value = serde_yaml::from_str("{mp:title}").unwrap();
        assert_eq!(token_shorthand(&value), Some("{mp:title}".to_string()));

        let value: Value = serde_yaml::from_str("{other: null}").unwrap();
        assert_eq!(token_shorthand(&value), None);
    }
}

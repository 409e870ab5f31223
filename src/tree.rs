//! Resolved tree: concrete files and folders ready to be written.

use std::fmt::Write;

/// Final content of a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    /// Copied verbatim, never token-resolved.
    Binary(Vec<u8>),
}

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Binary(bytes) => bytes,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Content::Binary(_))
    }
}

/// Kind of a filesystem entry, generated or existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Folder => write!(f, "folder"),
        }
    }
}

/// Node of the resolved tree. Names are final and valid path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedNode {
    File { name: String, content: Content },
    Folder { name: String, children: Vec<ResolvedNode> },
}

impl ResolvedNode {
    pub fn text_file<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        ResolvedNode::File { name: name.into(), content: Content::Text(content.into()) }
    }

    pub fn folder<N: Into<String>>(name: N, children: Vec<ResolvedNode>) -> Self {
        ResolvedNode::Folder { name: name.into(), children }
    }

    pub fn name(&self) -> &str {
        match self {
            ResolvedNode::File { name, .. } | ResolvedNode::Folder { name, .. } => name,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            ResolvedNode::File { .. } => EntryKind::File,
            ResolvedNode::Folder { .. } => EntryKind::Folder,
        }
    }

    /// Number of files (not folders) in this subtree.
    pub fn file_count(&self) -> usize {
        match self {
            ResolvedNode::File { .. } => 1,
            ResolvedNode::Folder { children, .. } => file_count(children),
        }
    }
}

pub fn file_count(nodes: &[ResolvedNode]) -> usize {
    nodes.iter().map(ResolvedNode::file_count).sum()
}

/// Indented listing of a resolved tree, folders marked with a trailing `/`.
pub fn render_listing(nodes: &[ResolvedNode]) -> String {
    fn walk(out: &mut String, nodes: &[ResolvedNode], depth: usize) {
        for node in nodes {
            let indent = "  ".repeat(depth);
            match node {
                ResolvedNode::File { name, content } => {
                    let marker = if content.is_binary() { " (binary)" } else { "" };
                    let _ = writeln!(out, "{indent}{name}{marker}");
                }
                ResolvedNode::Folder { name, children } => {
                    let _ = writeln!(out, "{indent}{name}/");
                    walk(out, children, depth + 1);
                }
            }
        }
    }

    let mut out = String::new();
    walk(&mut out, nodes, 0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_count_and_listing() {
        let tree = vec![
            ResolvedNode::text_file("README.md", "# Shop"),
            ResolvedNode::folder(
                "assets",
                vec![ResolvedNode::File {
                    name: "logo.png".to_string(),
                    content: Content::Binary(vec![0, 1, 2]),
                }],
            ),
            ResolvedNode::folder("empty", vec![]),
        ];

        assert_eq!(file_count(&tree), 2);
        assert_eq!(
            render_listing(&tree),
            "README.md\nassets/\n  logo.png (binary)\nempty/\n"
        );
    }
}

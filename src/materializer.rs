//! Writes a resolved tree to a destination directory.
//!
//! The walk is pre-order and strictly sequential. Every collision with an
//! existing path goes through a [`ConflictResolver`]. Writes are best-effort:
//! on cancellation or failure, entries already written stay on disk. Writing
//! the whole tree to a temporary directory first and renaming it into place
//! would be a valid strengthening but is not done here.

use crate::conflict::{Conflict, ConflictResolver, Decision};
use crate::error::{Error, Result};
use crate::tree::{Content, EntryKind, ResolvedNode};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one generated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Overwritten,
    Merged,
    /// Written beside the existing entry under the given path.
    KeptBoth(PathBuf),
    Skipped,
    Cancelled,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Created => write!(f, "Created"),
            Outcome::Overwritten => write!(f, "Overwritten"),
            Outcome::Merged => write!(f, "Merged"),
            Outcome::KeptBoth(path) => write!(f, "Kept both, new entry at '{}'", path.display()),
            Outcome::Skipped => write!(f, "Skipped"),
            Outcome::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    CancelledPartway,
    Failed,
}

/// Ordered record of a materialization run.
#[derive(Debug)]
pub struct GenerationReport {
    /// Destination paths in the order they were visited.
    pub entries: Vec<(PathBuf, Outcome)>,
    pub status: Status,
    /// The error that stopped the run when `status` is `Failed`.
    pub error: Option<Error>,
}

impl GenerationReport {
    pub fn outcome(&self, path: &Path) -> Option<&Outcome> {
        self.entries.iter().find(|(p, _)| p == path).map(|(_, outcome)| outcome)
    }

    /// Paths that received new content, in write order.
    pub fn written(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().filter_map(|(path, outcome)| match outcome {
            Outcome::Created | Outcome::Overwritten | Outcome::Merged => Some(path.as_path()),
            Outcome::KeptBoth(new_path) => Some(new_path.as_path()),
            Outcome::Skipped | Outcome::Cancelled => None,
        })
    }
}

enum Flow {
    Continue,
    Cancel,
}

/// Writes `tree` below `destination`, asking `resolver` about every collision.
///
/// The destination directory itself is created when missing and is never a collision.
pub fn materialize(
    tree: &[ResolvedNode],
    destination: &Path,
    resolver: &mut dyn ConflictResolver,
) -> GenerationReport {
    let mut materializer = Materializer { resolver, sticky: None, entries: Vec::new() };

    let result = fs::create_dir_all(destination)
        .map_err(|e| Error::write(destination, e))
        .and_then(|_| materializer.write_nodes(tree, destination, None));

    let (status, error) = match result {
        Ok(Flow::Continue) => (Status::Completed, None),
        Ok(Flow::Cancel) => (Status::CancelledPartway, None),
        Err(e) => (Status::Failed, Some(e)),
    };
    GenerationReport { entries: materializer.entries, status, error }
}

struct Materializer<'r> {
    resolver: &'r mut dyn ConflictResolver,
    sticky: Option<Decision>,
    entries: Vec<(PathBuf, Outcome)>,
}

impl Materializer<'_> {
    /// `inherited` is set inside an overwritten folder, whose children overwrite without asking.
    fn write_nodes(
        &mut self,
        nodes: &[ResolvedNode],
        parent: &Path,
        inherited: Option<Decision>,
    ) -> Result<Flow> {
        for node in nodes {
            if let Flow::Cancel = self.write_node(node, parent, inherited)? {
                return Ok(Flow::Cancel);
            }
        }
        Ok(Flow::Continue)
    }

    fn write_node(
        &mut self,
        node: &ResolvedNode,
        parent: &Path,
        inherited: Option<Decision>,
    ) -> Result<Flow> {
        let path = parent.join(node.name());

        let Some(existing) = existing_kind(&path) else {
            self.create(node, &path)?;
            self.entries.push((path.clone(), Outcome::Created));
            return self.write_children(node, &path, None);
        };

        let decision = self.decide(&path, node.kind(), existing, inherited)?;
        debug!("Conflict on '{}': {decision}.", path.display());

        match decision {
            Decision::CancelAll => {
                self.entries.push((path, Outcome::Cancelled));
                Ok(Flow::Cancel)
            }
            Decision::Skip => {
                self.entries.push((path, Outcome::Skipped));
                Ok(Flow::Continue)
            }
            Decision::KeepBoth => {
                let alternative = next_available_path(&path);
                self.create(node, &alternative)?;
                self.entries.push((path, Outcome::KeptBoth(alternative.clone())));
                self.write_children(node, &alternative, None)
            }
            Decision::Overwrite | Decision::Merge => {
                self.replace(node, &path, existing)?;
                match (node, decision) {
                    (ResolvedNode::Folder { .. }, Decision::Merge) => {
                        self.entries.push((path.clone(), Outcome::Merged));
                        self.write_children(node, &path, None)
                    }
                    (ResolvedNode::Folder { .. }, _) => {
                        self.entries.push((path.clone(), Outcome::Overwritten));
                        self.write_children(node, &path, Some(Decision::Overwrite))
                    }
                    (ResolvedNode::File { .. }, _) => {
                        self.entries.push((path, Outcome::Overwritten));
                        Ok(Flow::Continue)
                    }
                }
            }
        }
    }

    fn write_children(
        &mut self,
        node: &ResolvedNode,
        path: &Path,
        inherited: Option<Decision>,
    ) -> Result<Flow> {
        match node {
            ResolvedNode::Folder { children, .. } => self.write_nodes(children, path, inherited),
            ResolvedNode::File { .. } => Ok(Flow::Continue),
        }
    }

    fn decide(
        &mut self,
        path: &Path,
        incoming: EntryKind,
        existing: EntryKind,
        inherited: Option<Decision>,
    ) -> Result<Decision> {
        if let Some(decision) = inherited.or(self.sticky) {
            return Ok(decision);
        }

        let resolution = self.resolver.decide(&Conflict { path, incoming, existing })?;
        if resolution.sticky && resolution.decision != Decision::CancelAll {
            info!("Applying '{}' to all remaining conflicts.", resolution.decision);
            self.sticky = Some(resolution.decision);
        }
        Ok(resolution.decision)
    }

    fn create(&self, node: &ResolvedNode, path: &Path) -> Result<()> {
        match node {
            ResolvedNode::Folder { .. } => create_dir(path),
            ResolvedNode::File { content, .. } => write_file(path, content),
        }
    }

    /// Makes room for `node` at `path`. A file and a folder never share a path,
    /// so a mismatched existing entry is removed first.
    fn replace(&self, node: &ResolvedNode, path: &Path, existing: EntryKind) -> Result<()> {
        match (node, existing) {
            (ResolvedNode::Folder { .. }, EntryKind::Folder) => Ok(()),
            (ResolvedNode::Folder { .. }, EntryKind::File) => {
                fs::remove_file(path).map_err(|e| Error::write(path, e))?;
                create_dir(path)
            }
            (ResolvedNode::File { content, .. }, EntryKind::Folder) => {
                fs::remove_dir_all(path).map_err(|e| Error::write(path, e))?;
                write_file(path, content)
            }
            (ResolvedNode::File { content, .. }, EntryKind::File) => write_file(path, content),
        }
    }
}

fn existing_kind(path: &Path) -> Option<EntryKind> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if metadata.is_dir() {
        Some(EntryKind::Folder)
    } else {
        Some(EntryKind::File)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    debug!("Creating folder: {}", path.display());
    fs::create_dir(path).map_err(|e| Error::write(path, e))
}

fn write_file(path: &Path, content: &Content) -> Result<()> {
    debug!("Writing file: {}", path.display());
    fs::write(path, content.as_bytes()).map_err(|e| Error::write(path, e))
}

/// First free `stem (N).ext` sibling of `path`, counting from 1.
pub fn next_available_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut index = 1;
    loop {
        let candidate = path.with_file_name(format!("{stem} ({index}){suffix}"));
        if existing_kind(&candidate).is_none() {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_next_available_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(next_available_path(&path), temp_dir.path().join("config (1).json"));

        fs::write(temp_dir.path().join("config (1).json"), "{}").unwrap();
        assert_eq!(next_available_path(&path), temp_dir.path().join("config (2).json"));

        let dotfile = temp_dir.path().join(".gitignore");
        assert_eq!(next_available_path(&dotfile), temp_dir.path().join(".gitignore (1)"));

        let folder = temp_dir.path().join("src");
        assert_eq!(next_available_path(&folder), temp_dir.path().join("src (1)"));
    }
}

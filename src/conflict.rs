//! Conflict resolution policies.
//! Decides what happens when a generated entry collides with an existing path.

use crate::error::{Error, Result};
use crate::tree::EntryKind;
use dialoguer::{Confirm, Select};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What to do with one collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Replace an existing file; write into an existing folder.
    Overwrite,
    /// Keep an existing folder and resolve each child on its own. Means `Overwrite` for files.
    Merge,
    /// Write the new entry under a free `name (N).ext` name.
    KeepBoth,
    /// Leave the existing entry alone.
    Skip,
    /// Stop generating. Entries already written stay on disk.
    CancelAll,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Overwrite => write!(f, "Overwrite"),
            Decision::Merge => write!(f, "Merge"),
            Decision::KeepBoth => write!(f, "Keep both"),
            Decision::Skip => write!(f, "Skip"),
            Decision::CancelAll => write!(f, "Cancel"),
        }
    }
}

/// A decision plus whether it applies to every later collision of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub decision: Decision,
    pub sticky: bool,
}

impl Resolution {
    pub fn once(decision: Decision) -> Self {
        Self { decision, sticky: false }
    }

    pub fn for_all(decision: Decision) -> Self {
        Self { decision, sticky: true }
    }
}

/// A destination path that already exists.
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    pub path: &'a Path,
    pub incoming: EntryKind,
    pub existing: EntryKind,
}

/// Source of collision decisions. Called synchronously; may block on user input.
pub trait ConflictResolver {
    fn decide(&mut self, conflict: &Conflict<'_>) -> Result<Resolution>;
}

/// Answers every collision with the same decision, for headless runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy {
    decision: Decision,
}

impl FixedPolicy {
    pub fn new(decision: Decision) -> Self {
        Self { decision }
    }
}

impl Default for FixedPolicy {
    fn default() -> Self {
        FixedPolicy::new(Decision::Skip)
    }
}

impl ConflictResolver for FixedPolicy {
    fn decide(&mut self, _conflict: &Conflict<'_>) -> Result<Resolution> {
        Ok(Resolution::once(self.decision))
    }
}

/// Asks on the terminal, offering to apply the answer to every remaining collision.
pub struct DialoguerResolver {
    /// Paths are shown relative to this directory
    root: PathBuf,
}

impl DialoguerResolver {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl ConflictResolver for DialoguerResolver {
    fn decide(&mut self, conflict: &Conflict<'_>) -> Result<Resolution> {
        let display = conflict.path.strip_prefix(&self.root).unwrap_or(conflict.path);

        let mut choices = vec![Decision::Overwrite];
        if conflict.incoming == EntryKind::Folder && conflict.existing == EntryKind::Folder {
            choices.push(Decision::Merge);
        }
        choices.extend([Decision::KeepBoth, Decision::Skip, Decision::CancelAll]);
        let labels: Vec<String> = choices.iter().map(ToString::to_string).collect();
        let default = choices.iter().position(|d| *d == Decision::Skip).unwrap_or(0);

        let selection = Select::new()
            .with_prompt(format!(
                "{} '{}' already exists. What should happen to the new {}?",
                conflict.existing,
                display.display(),
                conflict.incoming
            ))
            .default(default)
            .items(&labels)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))?;
        let decision = choices[selection];

        if decision == Decision::CancelAll {
            return Ok(Resolution::once(decision));
        }

        let sticky = Confirm::new()
            .with_prompt("Apply to all remaining conflicts?")
            .default(false)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))?;

        Ok(Resolution { decision, sticky })
    }
}

/// Conflict handling selectable from the command line and the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    Ask,
    Overwrite,
    Merge,
    KeepBoth,
    Skip,
    Cancel,
}

impl ConflictPolicy {
    /// Builds the resolver for this policy; `root` is the destination directory.
    pub fn resolver<P: Into<PathBuf>>(self, root: P) -> Box<dyn ConflictResolver> {
        let decision = match self {
            ConflictPolicy::Ask => return Box::new(DialoguerResolver::new(root)),
            ConflictPolicy::Overwrite => Decision::Overwrite,
            ConflictPolicy::Merge => Decision::Merge,
            ConflictPolicy::KeepBoth => Decision::KeepBoth,
            ConflictPolicy::Skip => Decision::Skip,
            ConflictPolicy::Cancel => Decision::CancelAll,
        };
        Box::new(FixedPolicy::new(decision))
    }
}

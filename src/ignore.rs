//! File ignore pattern handling for template stores.
//! Builds the set of names that are never enumerated as templates: VCS folders,
//! OS metadata files and any pattern listed in `.mkprojectignore`.

use crate::constants::{IGNORED_TEMPLATE_DIRS, IGNORED_TEMPLATE_FILES, IGNORE_FILE};
use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::{fs::read_to_string, path::Path};

/// Reads `.mkprojectignore` from `templates_root` and combines it with the built-in patterns.
///
/// # Returns
/// * `Result<GlobSet>` - Patterns matched against entry names and relative paths
///
/// # Notes
/// - A missing ignore file only yields the built-in patterns
/// - Blank lines and lines starting with `#` are skipped
/// - Invalid patterns are a `ConfigError`
///
/// # Example
/// ```ignore
/// # Contents of .mkprojectignore:
/// *.bak
/// drafts/**
/// ```
pub fn parse_ignore_file<P: AsRef<Path>>(templates_root: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in IGNORED_TEMPLATE_DIRS.iter().chain(IGNORED_TEMPLATE_FILES.iter()) {
        builder.add(compile(pattern)?);
    }
    builder.add(compile(IGNORE_FILE)?);

    let ignore_path = templates_root.as_ref().join(IGNORE_FILE);
    if let Ok(contents) = read_to_string(&ignore_path) {
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(compile(line)?);
        }
    } else {
        debug!("{} does not exist", ignore_path.display());
    }

    builder
        .build()
        .map_err(|e| Error::ConfigError(format!("{IGNORE_FILE} loading failed: {e}")))
}

fn compile(pattern: &str) -> Result<Glob> {
    Glob::new(pattern)
        .map_err(|e| Error::ConfigError(format!("{IGNORE_FILE} loading failed: {e}")))
}

/// Whether an entry, given by its name and its path relative to the store root, is ignored.
pub fn is_ignored(patterns: &GlobSet, name: &str, relative_path: &str) -> bool {
    patterns.is_match(name) || patterns.is_match(relative_path)
}

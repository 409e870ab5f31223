//! mkproject generates file and folder trees from declarative YAML structures.
//! Structures reference reusable file, folder and project templates, embed
//! `{mp:...}` tokens and dynamic code, and are written to disk with explicit
//! handling of paths that already exist.

/// Command-line interface module
pub mod cli;

/// Configuration file handling
/// Supports JSON and YAML formats (mkproject.json, mkproject.yml, mkproject.yaml)
pub mod config;

/// Conflict resolution policies for pre-existing destination paths
pub mod conflict;

pub mod constants;

/// Error types and handling
pub mod error;

/// Injected dynamic-code evaluation and the MiniJinja host
pub mod evaluator;

/// Resolution of structure nodes into a concrete tree
pub mod expander;

/// Ignore patterns for template stores
/// Processes .mkprojectignore files to exclude specific paths
pub mod ignore;

pub mod logger;

/// Writing a resolved tree to disk
pub mod materializer;

/// Structure description parsing
pub mod parser;

/// File, folder and project template lookup
pub mod store;

/// Structure model
pub mod structure;

/// Token context and marker resolution
pub mod token;

/// Resolved tree model
pub mod tree;

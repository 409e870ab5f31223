//! Template store: read-only lookup of File, Folder and Project Templates.
//!
//! File Templates live under a file templates root and are addressed by their
//! relative path (`licenses/MIT`). A Folder Template is any directory under the
//! same root, addressed by its relative folder name. Project Templates are
//! `<name>.yaml` structure descriptions under a project templates root.
use crate::constants::{BINARY_EXTENSIONS, PROJECT_TEMPLATE_EXT};
use crate::error::{Error, Result, TemplateKind};
use crate::ignore::{is_ignored, parse_ignore_file};
use crate::parser::parse_structure;
use crate::structure::Structure;
use crate::tree::Content;
use globset::GlobSet;
use indexmap::IndexMap;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A File Template: path relative to its root (or to its Folder Template) and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub path: String,
    pub content: Content,
}

impl TemplateFile {
    pub fn is_binary(&self) -> bool {
        self.content.is_binary()
    }
}

/// Read operations the expander needs from a template store.
pub trait TemplateStore {
    /// Looks up a single File Template by relative path.
    fn resolve_file_template(&self, path: &str) -> Result<TemplateFile>;

    /// Enumerates every file of a Folder Template in stable lexicographic order.
    /// Returned paths are relative to the folder and use `/` separators.
    fn resolve_folder_template(&self, name: &str) -> Result<Vec<TemplateFile>>;

    /// Looks up and parses a Project Template.
    fn resolve_project_template(&self, name: &str) -> Result<Structure>;
}

/// Whether a template path names binary content, judged by its extension only.
pub fn is_binary_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Normalises a template name to a `/`-separated relative path.
/// Absolute names and names escaping the root with `..` are rejected.
pub fn sanitize_name(name: &str) -> Option<String> {
    let normalized = name.trim().replace('\\', "/");
    if normalized.starts_with('/') {
        return None;
    }
    let parts: Vec<&str> =
        normalized.split('/').filter(|part| !part.is_empty() && *part != ".").collect();
    if parts.is_empty() || parts.contains(&"..") {
        return None;
    }
    Some(parts.join("/"))
}

fn classify(path: &str, bytes: Vec<u8>) -> Content {
    if is_binary_path(path) {
        return Content::Binary(bytes);
    }
    match String::from_utf8(bytes) {
        Ok(text) => Content::Text(text),
        Err(e) => {
            warn!("Template '{path}' is not valid UTF-8, copying it verbatim.");
            Content::Binary(e.into_bytes())
        }
    }
}

fn not_found(kind: TemplateKind, name: &str) -> Error {
    Error::TemplateNotFoundError { kind, name: name.to_string() }
}

/// Identity of a Project Template: its sanitised name without a `.yaml` suffix,
/// so `a`, `./a`, `sub//a` and `a.yaml` compare by the file they name.
/// `None` for names that cannot name a template.
pub fn project_name(name: &str) -> Option<String> {
    let name = name.trim();
    sanitize_name(name.strip_suffix(".yaml").unwrap_or(name))
}

fn parse_project(name: &str, text: &str) -> Result<Structure> {
    parse_structure(text).map_err(|e| match e {
        Error::ParseError { message, line } => Error::ParseError {
            message: format!("project template \"{name}\": {message}"),
            line,
        },
        other => other,
    })
}

/// Template store backed by two directories on disk.
#[derive(Debug)]
pub struct DirectoryStore {
    file_templates: PathBuf,
    project_templates: PathBuf,
    ignored: GlobSet,
}

impl DirectoryStore {
    /// Creates a store. Missing directories simply contain no templates.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the `.mkprojectignore` file holds an invalid pattern
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        file_templates: P,
        project_templates: Q,
    ) -> Result<Self> {
        let file_templates = file_templates.into();
        let ignored = parse_ignore_file(&file_templates)?;
        Ok(Self { file_templates, project_templates: project_templates.into(), ignored })
    }

    pub fn file_templates(&self) -> &Path {
        &self.file_templates
    }

    pub fn project_templates(&self) -> &Path {
        &self.project_templates
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.file_templates)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl TemplateStore for DirectoryStore {
    fn resolve_file_template(&self, path: &str) -> Result<TemplateFile> {
        let name = sanitize_name(path).ok_or_else(|| not_found(TemplateKind::File, path))?;
        let full_path = self.file_templates.join(&name);
        if !full_path.is_file() {
            return Err(not_found(TemplateKind::File, path));
        }

        debug!("Reading file template '{}'.", full_path.display());
        let bytes = fs::read(&full_path)?;
        Ok(TemplateFile { content: classify(&name, bytes), path: name })
    }

    fn resolve_folder_template(&self, name: &str) -> Result<Vec<TemplateFile>> {
        let folder = sanitize_name(name).ok_or_else(|| not_found(TemplateKind::Folder, name))?;
        let root = self.file_templates.join(&folder);
        if !root.is_dir() {
            return Err(not_found(TemplateKind::Folder, name));
        }

        debug!("Enumerating folder template '{}'.", root.display());
        let walker = WalkDir::new(&root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let entry_name = entry.file_name().to_string_lossy();
                !is_ignored(&self.ignored, &entry_name, &self.relative(entry.path()))
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = fs::read(entry.path())?;
            files.push(TemplateFile { content: classify(&path, bytes), path });
        }

        Ok(files)
    }

    fn resolve_project_template(&self, name: &str) -> Result<Structure> {
        let name = project_name(name).ok_or_else(|| not_found(TemplateKind::Project, name))?;
        let path = self.project_templates.join(format!("{name}.{PROJECT_TEMPLATE_EXT}"));
        if !path.is_file() {
            return Err(not_found(TemplateKind::Project, &name));
        }

        debug!("Loading project template '{}'.", path.display());
        let text = fs::read_to_string(&path)?;
        parse_project(&name, &text)
    }
}

/// In-memory template store, for embedding hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: IndexMap<String, Content>,
    projects: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a File Template. Binary classification follows the path's extension.
    pub fn with_file<P: AsRef<str>, B: Into<Vec<u8>>>(mut self, path: P, bytes: B) -> Self {
        if let Some(path) = sanitize_name(path.as_ref()) {
            let content = classify(&path, bytes.into());
            self.files.insert(path, content);
        }
        self
    }

    /// Adds a Project Template from its YAML text.
    pub fn with_project<N: AsRef<str>, S: Into<String>>(mut self, name: N, yaml: S) -> Self {
        if let Some(name) = project_name(name.as_ref()) {
            self.projects.insert(name, yaml.into());
        }
        self
    }
}

impl TemplateStore for MemoryStore {
    fn resolve_file_template(&self, path: &str) -> Result<TemplateFile> {
        let name = sanitize_name(path).ok_or_else(|| not_found(TemplateKind::File, path))?;
        self.files
            .get(&name)
            .map(|content| TemplateFile { path: name.clone(), content: content.clone() })
            .ok_or_else(|| not_found(TemplateKind::File, path))
    }

    fn resolve_folder_template(&self, name: &str) -> Result<Vec<TemplateFile>> {
        let folder = sanitize_name(name).ok_or_else(|| not_found(TemplateKind::Folder, name))?;
        let prefix = format!("{folder}/");

        let mut files: Vec<TemplateFile> = self
            .files
            .iter()
            .filter_map(|(path, content)| {
                path.strip_prefix(&prefix)
                    .map(|relative| TemplateFile { path: relative.to_string(), content: content.clone() })
            })
            .collect();
        if files.is_empty() {
            return Err(not_found(TemplateKind::Folder, name));
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn resolve_project_template(&self, name: &str) -> Result<Structure> {
        let name = project_name(name).ok_or_else(|| not_found(TemplateKind::Project, name))?;
        let text =
            self.projects.get(&name).ok_or_else(|| not_found(TemplateKind::Project, &name))?;
        parse_project(&name, text)
    }
}

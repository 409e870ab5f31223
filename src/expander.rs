//! Tree expansion.
//!
//! Turns structure [`Node`]s into a [`ResolvedNode`] tree: template references
//! are looked up in the [`TemplateStore`], dynamic lists are evaluated and every
//! name and text body is token-resolved. Nothing touches the destination
//! directory here, so any error leaves the filesystem unchanged.

use crate::error::{Error, Result, TemplateKind};
use crate::evaluator::{Evaluator, Snippet};
use crate::parser::{parse_document, parse_items};
use crate::store::{project_name, TemplateFile, TemplateStore};
use crate::structure::{validate_name, FileSource, Node, Overrides};
use crate::token::{TokenContext, TokenResolver};
use crate::tree::{Content, ResolvedNode};
use log::debug;

/// Expands structure nodes against a template store and an evaluator.
pub struct Expander<'a> {
    store: &'a dyn TemplateStore,
    evaluator: &'a dyn Evaluator,
    resolver: TokenResolver<'a>,
}

impl<'a> Expander<'a> {
    pub fn new(store: &'a dyn TemplateStore, evaluator: &'a dyn Evaluator) -> Self {
        Self { store, evaluator, resolver: TokenResolver::new(evaluator) }
    }

    /// Expands a root node list.
    ///
    /// # Arguments
    /// * `nodes` - Root nodes of the structure
    /// * `context` - Tokens for this run
    /// * `root_template` - Name of the Project Template the nodes came from, if any,
    ///   so that it cannot include itself
    ///
    /// # Errors
    /// * `Error::CyclicTemplateError` if a Project Template includes itself
    /// * Any token, parse, template lookup or dynamic evaluation error
    pub fn expand_tree(
        &self,
        nodes: &[Node],
        context: &TokenContext,
        root_template: Option<&str>,
    ) -> Result<Vec<ResolvedNode>> {
        let mut visited: Vec<String> = root_template.and_then(project_name).into_iter().collect();
        self.expand_nodes(nodes, context, &mut visited)
    }

    fn expand_nodes(
        &self,
        nodes: &[Node],
        context: &TokenContext,
        visited: &mut Vec<String>,
    ) -> Result<Vec<ResolvedNode>> {
        let mut resolved = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.expand(node, context, visited, &mut resolved)?;
        }
        Ok(resolved)
    }

    fn expand(
        &self,
        node: &Node,
        context: &TokenContext,
        visited: &mut Vec<String>,
        out: &mut Vec<ResolvedNode>,
    ) -> Result<()> {
        match node {
            Node::File { name, source: FileSource::Content(content) } => {
                let name = self.resolve_name(name, context)?;
                let content = self.resolver.resolve(content, &context.with_file_scope(&name))?;
                out.push(ResolvedNode::File { name, content: Content::Text(content) });
            }
            Node::File { name, source: FileSource::Template(template) } => {
                let name = self.resolve_name(name, context)?;
                let template = self.file_template(template, context)?;
                out.push(self.template_file(name, template, context)?);
            }
            Node::FileTemplate { path } => {
                let template = self.file_template(path, context)?;
                let base_name = template.path.rsplit('/').next().unwrap_or_default().to_string();
                let name = self.resolve_name(&base_name, context)?;
                out.push(self.template_file(name, template, context)?);
            }
            Node::Folder { name, children, template } => {
                let name = self.resolve_name(name, context)?;
                let mut resolved = self.expand_nodes(children, context, visited)?;
                if let Some(template) = template {
                    resolved.extend(self.folder_template(template, context)?);
                }
                out.push(ResolvedNode::Folder { name, children: resolved });
            }
            Node::FolderTemplate { path } => {
                out.extend(self.folder_template(path, context)?);
            }
            Node::ProjectTemplate { name, overrides } => {
                out.extend(self.project_template(name, overrides, context, visited)?);
            }
            Node::DynamicList { code } => {
                for item in self.dynamic_items(code, context)? {
                    self.expand(&item, context, visited, out)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_name(&self, name: &str, context: &TokenContext) -> Result<String> {
        let resolved = self.resolver.resolve(name, context)?.trim().to_string();
        validate_name(&resolved)?;
        Ok(resolved)
    }

    fn file_template(&self, path: &str, context: &TokenContext) -> Result<TemplateFile> {
        let path = self.resolver.resolve(path, context)?;
        debug!("Resolving file template '{path}'.");
        self.store.resolve_file_template(&path)
    }

    /// Binary templates are copied untouched; text is resolved with the file's scope.
    fn template_file(
        &self,
        name: String,
        template: TemplateFile,
        context: &TokenContext,
    ) -> Result<ResolvedNode> {
        let content = match template.content {
            Content::Binary(bytes) => Content::Binary(bytes),
            Content::Text(text) => {
                Content::Text(self.resolver.resolve(&text, &context.with_file_scope(&name))?)
            }
        };
        Ok(ResolvedNode::File { name, content })
    }

    /// Files of a Folder Template as sibling nodes, nested paths becoming subfolders.
    fn folder_template(&self, name: &str, context: &TokenContext) -> Result<Vec<ResolvedNode>> {
        let name = self.resolver.resolve(name, context)?;
        debug!("Resolving folder template '{name}'.");

        let mut nodes = Vec::new();
        for template in self.store.resolve_folder_template(&name)? {
            let mut segments = template
                .path
                .split('/')
                .map(|segment| self.resolve_name(segment, context))
                .collect::<Result<Vec<_>>>()?;
            let Some(file_name) = segments.pop() else { continue };
            let file = self.template_file(file_name, template, context)?;
            insert_at(&mut nodes, &segments, file);
        }
        Ok(nodes)
    }

    fn project_template(
        &self,
        name: &str,
        overrides: &Overrides,
        context: &TokenContext,
        visited: &mut Vec<String>,
    ) -> Result<Vec<ResolvedNode>> {
        let resolved = self.resolver.resolve(name, context)?;
        let name = project_name(&resolved).ok_or_else(|| Error::TemplateNotFoundError {
            kind: TemplateKind::Project,
            name: resolved.clone(),
        })?;

        if visited.contains(&name) {
            let mut chain = visited.clone();
            chain.push(name.clone());
            return Err(Error::CyclicTemplateError { name, chain });
        }

        debug!("Including project template '{name}'.");
        let template = self.store.resolve_project_template(&name)?;

        // Overrides see the including context, so "{mp:title} API" extends the outer title.
        let title =
            overrides.title.as_deref().map(|t| self.resolver.resolve(t, context)).transpose()?;
        let description = overrides
            .description
            .as_deref()
            .map(|d| self.resolver.resolve(d, context))
            .transpose()?;
        let derived = context.with_overrides(title, description);

        visited.push(name);
        let expanded = self.expand_nodes(&template.nodes, &derived, visited);
        visited.pop();
        expanded
    }

    /// Evaluates a dynamic list. The result is either a sequence of item
    /// descriptions or text holding a YAML list of them.
    fn dynamic_items(&self, code: &str, context: &TokenContext) -> Result<Vec<Node>> {
        debug!("Evaluating dynamic item list.");
        let value = self.evaluator.evaluate(Snippet::from_code(code), context)?;

        let document = match value {
            serde_json::Value::Null => return Ok(Vec::new()),
            serde_json::Value::String(text) if text.trim().is_empty() => return Ok(Vec::new()),
            serde_json::Value::String(text) => {
                parse_document(&text).map_err(|e| Error::dynamic(code, e))?
            }
            items @ serde_json::Value::Array(_) => {
                serde_yaml::to_value(&items).map_err(|e| Error::dynamic(code, e))?
            }
            other => {
                return Err(Error::dynamic(code, format!("expected a list of items, got `{other}`")))
            }
        };

        if !matches!(document, serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_)) {
            return Err(Error::dynamic(code, "expected a list of items"));
        }
        parse_items(&document).map_err(|e| Error::dynamic(code, e))
    }
}

/// Appends `file` below the folder path `dirs`, reusing folders already present.
fn insert_at(nodes: &mut Vec<ResolvedNode>, dirs: &[String], file: ResolvedNode) {
    let Some((dir, rest)) = dirs.split_first() else {
        nodes.push(file);
        return;
    };

    let position = nodes
        .iter()
        .position(|node| matches!(node, ResolvedNode::Folder { name, .. } if name == dir));
    let index = match position {
        Some(index) => index,
        None => {
            nodes.push(ResolvedNode::folder(dir.clone(), Vec::new()));
            nodes.len() - 1
        }
    };
    if let ResolvedNode::Folder { children, .. } = &mut nodes[index] {
        insert_at(children, rest, file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_groups_folders() {
        let mut nodes = Vec::new();
        insert_at(&mut nodes, &["a".to_string()], ResolvedNode::text_file("1.txt", ""));
        insert_at(&mut nodes, &[], ResolvedNode::text_file("b.txt", ""));
        insert_at(&mut nodes, &["a".to_string()], ResolvedNode::text_file("2.txt", ""));

        assert_eq!(
            nodes,
            vec![
                ResolvedNode::folder(
                    "a",
                    vec![ResolvedNode::text_file("1.txt", ""), ResolvedNode::text_file("2.txt", "")]
                ),
                ResolvedNode::text_file("b.txt", ""),
            ]
        );
    }
}

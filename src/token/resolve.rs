//! Token marker substitution.
//!
//! Recognised markers:
//! - `{mp:name}` looks `name` up in the [`TokenContext`], ignoring case
//! - `{mp.py: expr}` evaluates a single expression
//! - `{mp.py} ... {/mp.py}` evaluates a block
//!
//! Substitution is a single left-to-right pass. Replacement text is never
//! scanned again, so a token whose value looks like a marker is emitted as is.

use crate::error::{Error, Result};
use crate::evaluator::{Evaluator, Snippet};
use crate::token::{TokenContext, TokenValue};
use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\{mp\.py\}(?P<block>.*?)\{/mp\.py\}|\{mp\.py\s*:\s*(?P<expr>[^}]*)\}|\{mp:(?P<name>[^}]*)\}",
    )
    .expect("token marker pattern is valid")
});

/// Replaces token markers in strings using a [`TokenContext`].
pub struct TokenResolver<'a> {
    evaluator: &'a dyn Evaluator,
}

impl<'a> TokenResolver<'a> {
    pub fn new(evaluator: &'a dyn Evaluator) -> Self {
        Self { evaluator }
    }

    /// Returns `text` with every marker replaced.
    ///
    /// # Errors
    /// * `Error::UnknownTokenError` if a `{mp:name}` marker names an undefined token
    /// * `Error::DynamicEvaluationError` if dynamic code fails
    pub fn resolve(&self, text: &str, context: &TokenContext) -> Result<String> {
        let mut output = String::with_capacity(text.len());
        let mut last = 0;

        for captures in MARKER.captures_iter(text) {
            let Some(marker) = captures.get(0) else { continue };
            output.push_str(&text[last..marker.start()]);
            output.push_str(&self.replacement(&captures, context)?);
            last = marker.end();
        }
        output.push_str(&text[last..]);

        Ok(output)
    }

    fn replacement(&self, captures: &Captures<'_>, context: &TokenContext) -> Result<String> {
        if let Some(block) = captures.name("block") {
            return self.run(Snippet::Block(block.as_str()), context);
        }
        if let Some(expr) = captures.name("expr") {
            return self.run(Snippet::Expression(expr.as_str()), context);
        }
        let name = captures.name("name").map(|m| m.as_str().trim()).unwrap_or_default();
        self.lookup(name, context)
    }

    fn lookup(&self, name: &str, context: &TokenContext) -> Result<String> {
        match context.get(name) {
            Some(TokenValue::Text(value)) => Ok(value.clone()),
            Some(TokenValue::Dynamic(code)) => {
                debug!("Evaluating dynamic token '{name}'.");
                self.run(Snippet::from_code(code), context)
            }
            None => Err(Error::UnknownTokenError { name: name.to_string() }),
        }
    }

    fn run(&self, snippet: Snippet<'_>, context: &TokenContext) -> Result<String> {
        let value = self.evaluator.evaluate(snippet, context)?;
        value_to_text(snippet.code(), value)
    }
}

/// Textual form of a dynamic value: strings as is, `null` as nothing,
/// sequences and mappings as block YAML.
pub fn value_to_text(code: &str, value: serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => Ok(value.to_string()),
        structured => serde_yaml::to_string(&structured)
            .map(|yaml| yaml.trim_end_matches('\n').to_string())
            .map_err(|e| Error::dynamic(code, e)),
    }
}

//! Dynamic code evaluation.
//!
//! The generation engine never runs code itself: token markers, dynamic
//! custom tokens and dynamic item lists go through an injected [`Evaluator`].
//! [`MiniJinjaEvaluator`] is the built-in host, where expressions are MiniJinja
//! expressions and blocks are MiniJinja templates.
use crate::constants::CONTEXT_VARIABLE;
use crate::error::{Error, Result};
use crate::token::{TokenContext, TokenValue};
use log::warn;
use minijinja::value::{Enumerator, Object, Value};
use minijinja::{Environment, UndefinedBehavior};
use std::sync::Arc;

/// A piece of dynamic code together with how it should be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snippet<'a> {
    /// Single expression; its value is the result.
    Expression(&'a str),
    /// Multi-line block; its emitted output is the result.
    Block(&'a str),
}

impl<'a> Snippet<'a> {
    /// Single-line code is an expression, anything longer is a block.
    pub fn from_code(code: &'a str) -> Self {
        if code.trim().contains('\n') {
            Snippet::Block(code)
        } else {
            Snippet::Expression(code)
        }
    }

    pub fn code(&self) -> &'a str {
        match self {
            Snippet::Expression(code) | Snippet::Block(code) => code,
        }
    }
}

/// Capability to run dynamic code against the current tokens.
pub trait Evaluator {
    /// Evaluates `snippet` with the tokens of `context` exposed as a lookup object.
    ///
    /// # Returns
    /// * `Result<serde_json::Value>` - The produced value; blocks produce a string
    ///
    /// # Errors
    /// * `Error::DynamicEvaluationError` if the code fails to compile or run
    fn evaluate(&self, snippet: Snippet<'_>, context: &TokenContext) -> Result<serde_json::Value>;
}

/// MiniJinja-based evaluation host.
///
/// Dynamic code sees the tokens as `context`, looked up by name in any casing.
/// Dynamic tokens are evaluated when read. Undefined names are errors.
pub struct MiniJinjaEvaluator {
    host: Arc<Host>,
}

#[derive(Debug, Clone)]
struct Host {
    /// MiniJinja environment instance
    env: Environment<'static>,
    /// Template source run before every evaluation, typically macros and `set` statements
    preamble: String,
}

impl MiniJinjaEvaluator {
    /// Creates a new evaluator with the default environment and no preamble.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { host: Arc::new(Host { env, preamble: String::new() }) }
    }

    /// Sets the shared preamble. It should define values and macros only,
    /// any text it outputs becomes part of every result.
    pub fn with_preamble<S: Into<String>>(self, preamble: S) -> Self {
        let Host { env, .. } = Arc::unwrap_or_clone(self.host);
        Self { host: Arc::new(Host { env, preamble: preamble.into() }) }
    }
}

impl Default for MiniJinjaEvaluator {
    fn default() -> Self {
        MiniJinjaEvaluator::new()
    }
}

impl Evaluator for MiniJinjaEvaluator {
    fn evaluate(&self, snippet: Snippet<'_>, context: &TokenContext) -> Result<serde_json::Value> {
        self.host.run(snippet, context, &[])
    }
}

impl Host {
    /// `active` holds the lower-cased dynamic tokens being evaluated further up,
    /// which read as undefined to stop self-reference.
    fn run(
        self: &Arc<Self>,
        snippet: Snippet<'_>,
        context: &TokenContext,
        active: &[String],
    ) -> Result<serde_json::Value> {
        match snippet {
            Snippet::Expression(code) => {
                // The value crosses the template boundary as JSON to keep its type.
                let source = format!("{{{{ ({})|tojson }}}}", code.trim());
                let rendered = self.render(&source, code, context, active)?;
                serde_json::from_str(rendered.trim()).map_err(|e| Error::dynamic(code, e))
            }
            Snippet::Block(code) => {
                let rendered = self.render(&dedent(code), code, context, active)?;
                Ok(serde_json::Value::String(rendered.trim_matches('\n').to_string()))
            }
        }
    }

    fn render(
        self: &Arc<Self>,
        source: &str,
        code: &str,
        context: &TokenContext,
        active: &[String],
    ) -> Result<String> {
        let lookup = TokenLookup {
            host: Arc::clone(self),
            context: context.clone(),
            active: active.to_vec(),
        };
        let scope = Value::from_iter([(CONTEXT_VARIABLE, Value::from_object(lookup))]);
        let source = format!("{}{}", self.preamble, source);
        self.env.render_str(&source, scope).map_err(|e| Error::dynamic(code, e))
    }
}

/// The `context` object handed to dynamic code.
#[derive(Debug)]
struct TokenLookup {
    host: Arc<Host>,
    context: TokenContext,
    active: Vec<String>,
}

impl Object for TokenLookup {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let name = key.as_str()?;
        match self.context.get(name)? {
            TokenValue::Text(text) => Some(Value::from(text.as_str())),
            TokenValue::Dynamic(code) => {
                let folded = name.trim().to_lowercase();
                if self.active.contains(&folded) {
                    warn!("Dynamic token '{name}' refers to itself.");
                    return None;
                }
                let mut active = self.active.clone();
                active.push(folded);
                match self.host.run(Snippet::from_code(code), &self.context, &active) {
                    Ok(value) => Some(Value::from_serialize(&value)),
                    Err(e) => {
                        warn!("Dynamic token '{name}' failed: {e}");
                        None
                    }
                }
            }
        }
    }

    /// Declared names, plus their lower-cased alias where it differs.
    fn enumerate(self: &Arc<Self>) -> Enumerator {
        let mut keys = Vec::new();
        for (name, _) in self.context.iter() {
            keys.push(Value::from(name));
            let folded = name.to_lowercase();
            if folded != name {
                keys.push(Value::from(folded));
            }
        }
        Enumerator::Values(keys)
    }
}

/// Removes the indentation shared by every non-blank line.
pub fn dedent(code: &str) -> String {
    let code = code.trim_matches('\n');
    let indent = code
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    code.lines()
        .map(|line| if line.len() >= indent { &line[indent..] } else { line.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}

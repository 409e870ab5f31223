#![allow(dead_code)]

use mkproject::conflict::{Conflict, ConflictResolver, Decision, Resolution};
use mkproject::error::{Error, Result};
use mkproject::evaluator::{Evaluator, Snippet};
use mkproject::token::TokenContext;
use serde_json::Value;
use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

/// Evaluator answering from a table of canned results, keyed by trimmed code.
#[derive(Default)]
pub struct MockEvaluator {
    answers: HashMap<String, Value>,
    calls: Cell<usize>,
}

impl MockEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, code: &str, value: Value) -> Self {
        self.answers.insert(code.trim().to_string(), value);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Evaluator for MockEvaluator {
    fn evaluate(&self, snippet: Snippet<'_>, _context: &TokenContext) -> Result<Value> {
        self.calls.set(self.calls.get() + 1);
        self.answers.get(snippet.code().trim()).cloned().ok_or_else(|| {
            Error::DynamicEvaluationError {
                code: snippet.code().to_string(),
                cause: "name is not defined".to_string(),
            }
        })
    }
}

/// Resolver replaying a fixed list of answers, then skipping.
#[derive(Default)]
pub struct ScriptedResolver {
    answers: VecDeque<Resolution>,
    pub asked: Vec<PathBuf>,
}

impl ScriptedResolver {
    pub fn new<I: IntoIterator<Item = Resolution>>(answers: I) -> Self {
        Self { answers: answers.into_iter().collect(), asked: Vec::new() }
    }
}

impl ConflictResolver for ScriptedResolver {
    fn decide(&mut self, conflict: &Conflict<'_>) -> Result<Resolution> {
        self.asked.push(conflict.path.to_path_buf());
        Ok(self.answers.pop_front().unwrap_or(Resolution::once(Decision::Skip)))
    }
}

//! Token namespace available while resolving a structure.
//!
//! A [`TokenContext`] is built fresh for every generation run from the
//! built-in tokens and the user's custom tokens. Derived contexts (project
//! template overrides, file scope) are new values; the parent is never mutated.

use indexmap::IndexMap;
use std::path::Path;

/// Value bound to a token name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    /// Literal replacement text.
    Text(String),
    /// Code evaluated on every reference.
    Dynamic(String),
}

impl TokenValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        TokenValue::Text(value.into())
    }

    pub fn dynamic<S: Into<String>>(code: S) -> Self {
        TokenValue::Dynamic(code.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    name: String,
    value: TokenValue,
}

/// Ordered, case-insensitive mapping of token names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    // keyed by the lower-cased name
    tokens: IndexMap<String, Token>,
}

impl TokenContext {
    /// Creates a context holding the built-in `title`, `formatted_title` and `description` tokens.
    pub fn new<T: Into<String>, D: Into<String>>(title: T, description: D) -> Self {
        let mut context = Self::default();
        context.set_title(title.into());
        context.insert("description", TokenValue::Text(description.into()));
        context
    }

    /// Adds custom tokens after the built-ins. A custom token with a built-in name replaces it.
    pub fn with_custom_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = (S, TokenValue)>,
        S: Into<String>,
    {
        for (name, value) in tokens {
            self.insert(name, value);
        }
        self
    }

    /// Binds `name` to `value`, replacing any binding that differs only by case.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: TokenValue) {
        let name = name.into();
        self.tokens.insert(name.to_lowercase(), Token { name, value });
    }

    /// Looks up a token ignoring case.
    pub fn get(&self, name: &str) -> Option<&TokenValue> {
        self.tokens.get(&name.trim().to_lowercase()).map(|token| &token.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token names in declaration order, with their original casing.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.values().map(|token| token.name.as_str())
    }

    /// Returns a derived context with `title` and/or `description` replaced.
    pub fn with_overrides(&self, title: Option<String>, description: Option<String>) -> Self {
        let mut derived = self.clone();
        if let Some(title) = title {
            derived.set_title(title);
        }
        if let Some(description) = description {
            derived.insert("description", TokenValue::Text(description));
        }
        derived
    }

    /// Returns a derived context with the file-scoped tokens for `file_name`.
    ///
    /// `filename` is the full name, `file_stem` the name without its last
    /// extension and `file_ext` the last extension without the leading dot.
    pub fn with_file_scope(&self, file_name: &str) -> Self {
        let path = Path::new(file_name);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();

        let mut scoped = self.clone();
        scoped.insert("filename", TokenValue::text(file_name));
        scoped.insert("file_stem", TokenValue::text(stem));
        scoped.insert("file_ext", TokenValue::text(ext));
        scoped
    }

    /// Tokens in declaration order, with their original casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenValue)> {
        self.tokens.values().map(|token| (token.name.as_str(), &token.value))
    }

    fn set_title(&mut self, title: String) {
        self.insert("formatted_title", TokenValue::Text(formatted_title(&title)));
        self.insert("title", TokenValue::Text(title));
    }
}

/// File-friendly form of a title: "Linear Algebra" becomes "linear_algebra".
pub fn formatted_title(title: &str) -> String {
    title.trim().to_lowercase().replace([' ', '-'], "_")
}

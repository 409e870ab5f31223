//! Token context construction and marker resolution.

pub mod context;
pub mod resolve;

pub use context::{formatted_title, TokenContext, TokenValue};
pub use resolve::{value_to_text, TokenResolver};

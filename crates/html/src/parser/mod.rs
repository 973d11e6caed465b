//! Markup tokenization and one-shot document construction.

mod html5ever_engine;

use crate::builder::{BuildOutput, DomBuilder, ElementFactory};
use crate::token::Token;
pub use html5ever_engine::Html5everEngine;

/// Tokenize markup into a well-formed start/end/text/comment stream.
///
/// Malformed input never fails; the HTML tree construction rules recover from
/// it the same way browsers do.
pub fn tokenize(markup: &str) -> Vec<Token> {
    if markup.trim().is_empty() {
        return Vec::new();
    }
    Html5everEngine::parse(markup).into_tokens()
}

/// Tokenize and build a DOM in one step.
pub fn parse_document(markup: &str, factory: &mut dyn ElementFactory) -> BuildOutput {
    let mut builder = DomBuilder::new(factory);
    for token in tokenize(markup) {
        builder.feed(token);
    }
    builder.finish()
}

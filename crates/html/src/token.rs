//! Token stream consumed by the DOM builder.

use html5ever::LocalName;

/// A single `name="value"` pair from a start tag. Names are ASCII lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: LocalName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: LocalName::from(name.to_ascii_lowercase()),
            value: value.into(),
        }
    }
}

/// Tokens produced by the tokenizer, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: LocalName,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    EndTag {
        name: LocalName,
    },
    Text(String),
    Comment(String),
}

impl Token {
    /// Convenience constructor used by tests and embedders that synthesize markup.
    pub fn start(name: &str, attrs: Vec<Attribute>) -> Self {
        Self::StartTag {
            name: LocalName::from(name.to_ascii_lowercase()),
            attrs,
            self_closing: false,
        }
    }

    pub fn end(name: &str) -> Self {
        Self::EndTag {
            name: LocalName::from(name.to_ascii_lowercase()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

//! HTML document model.
//!
//! Markup is tokenized through html5ever, then replayed into an arena-backed
//! [`Dom`] by the [`DomBuilder`], which attaches per-tag behaviors and runs
//! their hooks as each element closes.
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod behavior;
pub mod builder;
pub mod dom;
pub mod parser;
pub mod token;

pub use behavior::{DocumentEvent, TagBehavior};
pub use builder::{BuildOutput, DomBuilder, ElementFactory, NoCustomElements};
pub use dom::{Dom, ElementData, ElementKind, NodeData, NodeId};
pub use html5ever::LocalName;
pub use parser::{parse_document, tokenize};
pub use token::{Attribute, Token};

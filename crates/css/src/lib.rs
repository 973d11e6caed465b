//! CSS engine: stylesheet sets, the cascade and typed computed styles.
//!
//! Parsing of the raw grammar, selectors, media queries and `style`
//! attributes lives in the `crates/css/modules/*` crates; this crate ties
//! them to the DOM and turns winning declarations into [`ComputedStyle`]s.
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal helpers are documented where the behavior is not obvious"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Cross-crate inlining is left to the compiler"
)]

pub mod cascade;
pub mod properties;
pub mod rule_index;
pub mod style;
pub mod style_model;
pub mod stylesheet;
pub mod ua_stylesheet;
pub mod values;

pub use cascade::{ComputedStyles, DomAdapter, DynamicState, cascade_level, compute_styles};
pub use css_media_queries::{MediaFeatures, MediaQueryList, MediaType, parse_media_query_list};
pub use css_selectors::{SelectorList, Specificity, parse_selector_list};
pub use properties::{PropertyId, expand_declaration};
pub use style::{StyleContext, build_computed};
pub use style_model::*;
pub use stylesheet::{
    ImportedSheet, NoImports, Origin, PropertyDeclaration, SheetSource, StyleRule, StyleSet,
    StylesheetImporter,
};
pub use ua_stylesheet::{DEFAULT_STYLESHEET, default_display};
pub use values::{ColorResolver, Dimension, Length, LengthContext, Rgba, parse_color};

//! Document controller for the HTML/CSS engine.
//!
//! A [`Document`] parses markup, runs the cascade, lays the result out and
//! paints it through a host-supplied [`Backend`]. Pointer events drive the
//! hover/active state machine and report the regions that need redrawing.
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal helpers are documented where the behavior is not obvious"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Cross-crate inlining is left to the compiler"
)]

pub mod backend;
pub mod config;
mod document;
pub mod fonts;
mod interaction;
mod paint;
pub mod resources;

pub use backend::{
    Background, Backend, BorderEdge, Borders, ImageLayer, ListMarker, Surface, TextRun,
};
pub use config::EngineConfig;
pub use document::Document;
pub use fonts::FontCache;
pub use interaction::{AnchorActivation, PointerResponse};
pub use resources::resolve_url;

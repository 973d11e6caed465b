//! Box layout for styled documents.
//!
//! [`layout_document`] builds render items for a DOM and its computed
//! styles, then runs block, inline, float, table, list and positioned
//! formatting for a containing width. All geometry is in document
//! coordinates with the origin at the top-left of the initial containing
//! block. Layout is a pure function of the styled DOM, the width and the
//! measurements supplied through [`LayoutContext`].
#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal helpers are documented where the behavior is not obvious"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Cross-crate inlining is left to the compiler"
)]

pub mod arena;
mod block;
mod build;
pub mod context;
mod engine;
pub mod float;
pub mod geometry;
mod inline;
mod intrinsic;
mod list;
mod positioned;
mod table;
pub mod tree;

use css::ComputedStyles;
use html::Dom;

pub use arena::{BoxGeometry, LineBox, RenderArena, RenderId, RenderItem, RenderKind};
pub use block::MarginStrut;
pub use build::marker_text;
pub use context::{
    FontDescriptor, FontHandle, FontInfo, FontMetrics, LayoutContext, apply_text_transform,
};
pub use geometry::{Edges, Point, Rect, Size};
pub use tree::{LayoutTree, PaintOp};

use crate::engine::LayoutEngine;

/// Lay out `dom` for a containing width of `width` pixels.
///
/// Negative or non-finite widths are treated as zero. `generation` tags every
/// render id of the result so ids from an older tree never resolve in it.
pub fn layout_document(
    dom: &Dom,
    styles: &ComputedStyles,
    ctx: &mut dyn LayoutContext,
    width: f32,
    generation: u32,
) -> LayoutTree {
    let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
    let built = build::build_render_tree(dom, styles, ctx, generation);
    let Some(root) = built.root else {
        log::debug!("document has no renderable root element");
        return LayoutTree::new(built.arena, None, built.by_node, width);
    };
    let mut engine = LayoutEngine::new(built.arena, ctx);
    engine.layout_root(root, width);
    let tree = LayoutTree::new(engine.arena, Some(root), built.by_node, width);
    log::debug!(
        "laid out {} render items at width {width}, extent {:?}",
        tree.arena().len(),
        tree.size()
    );
    tree
}

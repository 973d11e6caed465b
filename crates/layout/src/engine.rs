//! Layout driver shared by the formatting modules.

use std::collections::HashMap;
use std::rc::Rc;

use css::{BoxSizing, ComputedStyle, Dimension, Position, Sides};

use crate::arena::{RenderArena, RenderId, RenderItem};
use crate::context::{FontDescriptor, FontInfo, LayoutContext};
use crate::float::ExclusionSpace;
use crate::geometry::{Edges, Point, Rect};
use crate::intrinsic::Intrinsic;

/// Containing block handed from a box to its children: the content box left
/// edge, its width, and its height when that is definite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Containing {
    pub x: f32,
    pub width: f32,
    pub height: Option<f32>,
}

impl Containing {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// An absolutely positioned box waiting for its containing block to finish.
/// The static position is kept relative to the content box of `anchor`, so it
/// survives any later translation of the anchor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingAbsolute {
    pub id: RenderId,
    pub anchor: RenderId,
    pub offset: Point,
}

pub(crate) struct LayoutEngine<'ctx> {
    pub arena: RenderArena,
    pub ctx: &'ctx mut dyn LayoutContext,
    pub intrinsic_cache: HashMap<RenderId, Intrinsic>,
    /// Pending absolutely positioned boxes, one frame per positioned ancestor.
    pub positioned_stack: Vec<Vec<PendingAbsolute>>,
    pub fixed: Vec<PendingAbsolute>,
}

impl<'ctx> LayoutEngine<'ctx> {
    pub fn new(arena: RenderArena, ctx: &'ctx mut dyn LayoutContext) -> Self {
        Self {
            arena,
            ctx,
            intrinsic_cache: HashMap::new(),
            positioned_stack: Vec::new(),
            fixed: Vec::new(),
        }
    }

    /// Lay out the whole tree for a viewport of `width`.
    pub fn layout_root(&mut self, root: RenderId, width: f32) {
        let viewport = self.ctx.client_rect();
        let initial = Containing {
            x: 0.0,
            width,
            height: Some(viewport.height.max(0.0)),
        };
        self.positioned_stack.push(Vec::new());
        let mut space = ExclusionSpace::new();
        self.layout_block_level(root, initial, 0.0, &mut space, false);

        let initial_rect = Rect::new(0.0, 0.0, width, viewport.height.max(0.0));
        let pending = self.positioned_stack.pop().unwrap_or_default();
        for entry in pending {
            self.layout_absolute(entry, initial_rect);
        }
        let fixed: Vec<PendingAbsolute> = self.fixed.drain(..).collect();
        for entry in fixed {
            self.layout_absolute(entry, viewport);
        }
    }

    pub fn item(&self, id: RenderId) -> Option<&RenderItem> {
        self.arena.get(id)
    }

    pub fn style(&self, id: RenderId) -> Rc<ComputedStyle> {
        self.arena.get(id).map_or_else(
            || Rc::new(ComputedStyle::initial("serif", 16.0)),
            |item| Rc::clone(&item.style),
        )
    }

    pub fn children(&self, id: RenderId) -> Vec<RenderId> {
        self.arena.children(id).to_vec()
    }

    pub fn font(&mut self, style: &ComputedStyle) -> FontInfo {
        self.ctx.font(&FontDescriptor::from_style(style))
    }

    /// Space above and below the baseline a style's line-height reserves,
    /// half-leading included.
    pub fn strut(&mut self, style: &ComputedStyle) -> (f32, f32) {
        let font = self.font(style);
        strut_of(style, font)
    }

    /// Register an absolutely positioned box with its containing block.
    pub fn defer_absolute(&mut self, entry: PendingAbsolute) {
        let fixed = self
            .arena
            .get(entry.id)
            .is_some_and(|item| item.style.position == Position::Fixed);
        if fixed {
            self.fixed.push(entry);
        } else if let Some(frame) = self.positioned_stack.last_mut() {
            frame.push(entry);
        } else {
            self.fixed.push(entry);
        }
    }
}

/// Half-leading model: the line-height is split evenly above and below the
/// font's content area.
pub(crate) fn strut_of(style: &ComputedStyle, font: FontInfo) -> (f32, f32) {
    let content = font.metrics.ascent + font.metrics.descent;
    let line_height = style.used_line_height(font.metrics.height);
    let half_leading = (line_height - content) / 2.0;
    (
        font.metrics.ascent + half_leading,
        font.metrics.descent + half_leading,
    )
}

/// Resolve four length-percentages against `basis`, `auto` as zero.
pub(crate) fn resolve_edges(sides: &Sides<Dimension>, basis: f32) -> Edges {
    Edges::new(
        sides.top.resolve_or_zero(basis),
        sides.right.resolve_or_zero(basis),
        sides.bottom.resolve_or_zero(basis),
        sides.left.resolve_or_zero(basis),
    )
}

/// Padding never goes negative.
pub(crate) fn padding_edges(style: &ComputedStyle, basis: f32) -> Edges {
    let raw = resolve_edges(&style.padding, basis);
    Edges::new(
        raw.top.max(0.0),
        raw.right.max(0.0),
        raw.bottom.max(0.0),
        raw.left.max(0.0),
    )
}

pub(crate) fn border_edges(style: &ComputedStyle) -> Edges {
    let widths = style.border_widths();
    Edges::new(widths.top, widths.right, widths.bottom, widths.left)
}

/// A specified size converted to a content-box size.
pub(crate) fn content_size(style: &ComputedStyle, specified: f32, extra: f32) -> f32 {
    match style.box_sizing {
        BoxSizing::ContentBox => specified.max(0.0),
        BoxSizing::BorderBox => (specified - extra).max(0.0),
    }
}

/// Apply `min-width`/`max-width` to a content width.
pub(crate) fn clamp_width(style: &ComputedStyle, width: f32, basis: f32, extra: f32) -> f32 {
    let mut used = width;
    if let Some(max) = style.max_width.and_then(|max| max.resolve(Some(basis))) {
        used = used.min(content_size(style, max, extra));
    }
    if let Some(min) = style.min_width.resolve(Some(basis)) {
        used = used.max(content_size(style, min, extra));
    }
    used.max(0.0)
}

/// Apply `min-height`/`max-height`; percentages need a definite basis.
pub(crate) fn clamp_height(style: &ComputedStyle, height: f32, basis: Option<f32>, extra: f32) -> f32 {
    let mut used = height;
    if let Some(max) = style.max_height.and_then(|max| max.resolve(basis)) {
        used = used.min(content_size(style, max, extra));
    }
    if let Some(min) = style.min_height.resolve(basis) {
        used = used.max(content_size(style, min, extra));
    }
    used.max(0.0)
}

//! Block formatting: width resolution, vertical margin collapsing,
//! clearance and float placement.
//! Spec: <https://www.w3.org/TR/CSS22/visudet.html#blockwidth>
//! Spec: <https://www.w3.org/TR/CSS22/box.html#collapsing-margins>

use std::rc::Rc;

use css::{Clear, Position};

use crate::arena::{BoxGeometry, RenderId, RenderKind};
use crate::engine::{
    Containing, LayoutEngine, PendingAbsolute, border_edges, clamp_height, clamp_width,
    content_size, padding_edges, resolve_edges,
};
use crate::float::ExclusionSpace;
use crate::geometry::{Edges, Point, Rect, Size};

/// Margin strut accumulates adjoining margins until the position of the box
/// they belong to is known.
///
/// Positive margins collapse to the largest one, negative margins to the most
/// negative one, and the two results are added.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarginStrut {
    /// Largest positive margin accumulated.
    pub positive: f32,
    /// Most negative margin accumulated.
    pub negative: f32,
}

impl MarginStrut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, margin: f32) {
        if margin > 0.0 {
            self.positive = self.positive.max(margin);
        } else if margin < 0.0 {
            self.negative = self.negative.min(margin);
        }
    }

    pub fn append_strut(&mut self, other: Self) {
        self.positive = self.positive.max(other.positive);
        self.negative = self.negative.min(other.negative);
    }

    /// The single margin the accumulated ones collapse into.
    pub fn collapse(&self) -> f32 {
        self.positive + self.negative
    }

    pub fn is_empty(&self) -> bool {
        self.positive == 0.0 && self.negative == 0.0
    }
}

/// How an `auto` width is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WidthMode {
    /// Fill the containing block (in-flow blocks).
    Fill,
    /// Shrink to fit the content (floats, inline-blocks, absolute boxes).
    ShrinkToFit,
}

/// Horizontal box model of a box about to be laid out.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BoxPlan {
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    pub content_width: f32,
    /// Content height imposed from outside (absolute boxes with both `top`
    /// and `bottom` set).
    pub height_override: Option<f32>,
}

impl BoxPlan {
    pub fn border_box_width(&self) -> f32 {
        self.content_width + self.border.horizontal() + self.padding.horizontal()
    }
}

/// Result of laying out one block-level box.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BlockOutcome {
    /// Border box height.
    pub height: f32,
    /// Margins adjoining the bottom edge that still have to collapse with
    /// whatever follows.
    pub end_strut: MarginStrut,
    /// The box has no content, padding or border: its margins collapse
    /// through it.
    pub collapsed_through: bool,
}

/// Result of laying out the children of a block container.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FlowOutcome {
    /// Bottom of the last in-flow content, before pending margins.
    pub bottom: f32,
    pub end_strut: MarginStrut,
    pub has_content: bool,
}

impl LayoutEngine<'_> {
    /// Resolve widths and horizontal margins of a box in `cb`.
    pub(crate) fn plan_box(&mut self, id: RenderId, cb: Containing, mode: WidthMode) -> BoxPlan {
        let style = self.style(id);
        let mut margin = resolve_edges(&style.margin, cb.width);
        let border = border_edges(&style);
        let padding = padding_edges(&style, cb.width);
        let extra = border.horizontal() + padding.horizontal();
        let specified = style
            .width
            .resolve(Some(cb.width))
            .map(|width| content_size(&style, width, extra));
        let available = (cb.width - margin.horizontal() - extra).max(0.0);
        let width = match (specified, mode) {
            (Some(width), _) => width,
            (None, WidthMode::Fill) => available,
            (None, WidthMode::ShrinkToFit) => {
                let intrinsic = self.content_intrinsic(id);
                intrinsic.max.min(available.max(intrinsic.min))
            }
        };
        let content_width = clamp_width(&style, width, cb.width, extra);

        if mode == WidthMode::Fill {
            let free = cb.width - content_width - extra - margin.horizontal();
            match (style.margin.left.is_auto(), style.margin.right.is_auto()) {
                (true, true) => {
                    let half = (free / 2.0).max(0.0);
                    margin.left = half;
                    margin.right = free - half;
                }
                (true, false) => margin.left = free,
                (false, true) => margin.right = free,
                (false, false) => {}
            }
        }
        BoxPlan {
            margin,
            border,
            padding,
            content_width,
            height_override: None,
        }
    }

    /// Lay out an in-flow block-level box whose border box starts at `top`.
    /// `absorbed` means the parent already collapsed this box's top margin
    /// chain into its own.
    pub(crate) fn layout_block_level(
        &mut self,
        id: RenderId,
        cb: Containing,
        top: f32,
        excl: &mut ExclusionSpace,
        absorbed: bool,
    ) -> BlockOutcome {
        let Some(item) = self.item(id) else {
            return BlockOutcome::default();
        };
        let kind = item.kind;
        let bfc = item.establishes_bfc() || item.parent.is_none() || kind == RenderKind::Table;

        // Formatting context roots do not overlap floats of the outer context.
        let mut used_cb = cb;
        if bfc && !excl.is_empty() {
            let band = excl.band(top, 1.0, cb.x, cb.right());
            used_cb.x = band.left;
            used_cb.width = band.width();
        }

        match kind {
            RenderKind::Table => {
                let height = self.layout_table(id, used_cb, top, WidthMode::Fill);
                BlockOutcome {
                    height,
                    ..BlockOutcome::default()
                }
            }
            RenderKind::Image => {
                let height = self.layout_replaced(id, used_cb, top, WidthMode::Fill);
                BlockOutcome {
                    height,
                    ..BlockOutcome::default()
                }
            }
            _ => {
                let plan = self.plan_box(id, used_cb, WidthMode::Fill);
                let x = used_cb.x + plan.margin.left;
                self.layout_container(id, &plan, used_cb, x, top, excl, absorbed, bfc)
            }
        }
    }

    /// Lay out a block container with its border box at (`x`, `top`).
    #[allow(
        clippy::too_many_arguments,
        reason = "Mirrors the inputs of CSS 2.1 §10.3 and §10.6 one to one"
    )]
    pub(crate) fn layout_container(
        &mut self,
        id: RenderId,
        plan: &BoxPlan,
        cb: Containing,
        x: f32,
        top: f32,
        excl: &mut ExclusionSpace,
        absorbed: bool,
        bfc: bool,
    ) -> BlockOutcome {
        let style = self.style(id);
        let positioned = style.is_positioned();
        if positioned {
            self.positioned_stack.push(Vec::new());
        }
        let content_x = x + plan.border.left + plan.padding.left;
        let content_top = top + plan.border.top + plan.padding.top;
        let extra_vertical = plan.border.vertical() + plan.padding.vertical();
        let specified_height = plan.height_override.or_else(|| {
            style
                .height
                .resolve(cb.height)
                .map(|height| content_size(&style, height, extra_vertical))
        });
        let child_cb = Containing {
            x: content_x,
            width: plan.content_width,
            height: specified_height,
        };

        // Provisional geometry so descendants can read their container.
        self.set_geometry(
            id,
            BoxGeometry {
                border_box: Rect::new(x, top, plan.border_box_width(), extra_vertical),
                margin: plan.margin,
                border: plan.border,
                padding: plan.padding,
            },
        );

        let collapse_top = !bfc && plan.border.top == 0.0 && plan.padding.top == 0.0;
        let mut own_space = ExclusionSpace::new();
        let flow = {
            let space: &mut ExclusionSpace = if bfc { &mut own_space } else { excl };
            if self.has_inline_content(id) {
                let lines = self.layout_inline_content(id, child_cb, content_top, space);
                FlowOutcome {
                    bottom: lines.bottom,
                    end_strut: MarginStrut::new(),
                    has_content: lines.has_lines,
                }
            } else {
                self.layout_block_children(id, child_cb, content_top, space, absorbed && collapse_top)
            }
        };

        let collapse_bottom = !bfc
            && style.height.is_auto()
            && plan.height_override.is_none()
            && plan.border.bottom == 0.0
            && plan.padding.bottom == 0.0;
        let mut content_bottom = flow.bottom;
        if !collapse_bottom {
            content_bottom += flow.end_strut.collapse();
        }
        let mut auto_height = (content_bottom - content_top).max(0.0);
        if bfc && let Some(float_bottom) = own_space.bottom() {
            auto_height = auto_height.max(float_bottom - content_top);
        }
        let content_height = clamp_height(
            &style,
            specified_height.unwrap_or(auto_height),
            cb.height,
            extra_vertical,
        );
        let height = content_height + extra_vertical;
        if let Some(item) = self.arena.get_mut(id) {
            item.geometry.border_box.height = height;
        }

        let collapsed_through =
            collapse_top && collapse_bottom && !flow.has_content && height == 0.0;
        let end_strut = if collapse_bottom {
            flow.end_strut
        } else {
            MarginStrut::new()
        };

        self.place_outside_marker(id);
        if positioned {
            self.finish_positioned(id, cb);
        }
        BlockOutcome {
            height,
            end_strut,
            collapsed_through,
        }
    }

    /// Vertical flow of block-level children.
    fn layout_block_children(
        &mut self,
        id: RenderId,
        cb: Containing,
        content_top: f32,
        space: &mut ExclusionSpace,
        first_absorbed: bool,
    ) -> FlowOutcome {
        let mut cursor = content_top;
        let mut strut = MarginStrut::new();
        let mut first = true;
        let mut has_content = false;

        for child in self.children(id) {
            let Some(item) = self.item(child) else {
                continue;
            };
            if item.kind == RenderKind::ListMarker {
                continue;
            }
            if item.style.is_out_of_flow_positioned() {
                let offset = Point::new(0.0, cursor + strut.collapse() - content_top);
                self.defer_absolute(PendingAbsolute {
                    id: child,
                    anchor: id,
                    offset,
                });
                continue;
            }
            if item.style.is_floating() {
                let y = cursor + strut.collapse();
                self.layout_float(child, cb, y, space);
                continue;
            }
            if item.is_inline_level() {
                log::trace!("inline-level child left in a block flow, skipping");
                continue;
            }
            let clear = item.style.clear;
            let margin_bottom = item.style.margin.bottom.resolve_or_zero(cb.width);
            let absorbs = self.absorbs_first_child_margin(child, cb.width);

            if !(first && first_absorbed) {
                strut.append_strut(self.top_margin_chain(child, cb.width));
            }
            let mut top = cursor + strut.collapse();
            let mut cleared = false;
            if clear != Clear::None
                && let Some(clear_y) = space.clearance(clear)
                && clear_y > top
            {
                top = clear_y;
                cleared = true;
            }

            let outcome = self.layout_block_level(child, cb, top, space, absorbs && !cleared);
            if outcome.collapsed_through && !cleared {
                strut.append_strut(outcome.end_strut);
                strut.append(margin_bottom);
            } else {
                cursor = top + outcome.height;
                strut = outcome.end_strut;
                strut.append(margin_bottom);
                has_content = true;
            }
            first = false;
        }

        FlowOutcome {
            bottom: cursor,
            end_strut: strut,
            has_content,
        }
    }

    /// Top margins of `id` and of every first child whose margin it absorbs.
    fn top_margin_chain(&self, id: RenderId, basis: f32) -> MarginStrut {
        let mut strut = MarginStrut::new();
        let mut current = id;
        loop {
            let Some(item) = self.item(current) else {
                break;
            };
            strut.append(item.style.margin.top.resolve_or_zero(basis));
            if !self.absorbs_first_child_margin(current, basis) {
                break;
            }
            match self.first_in_flow_block_child(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        strut
    }

    /// Whether the top margin of the first in-flow child of `id` collapses
    /// with the top margin of `id`.
    fn absorbs_first_child_margin(&self, id: RenderId, basis: f32) -> bool {
        let Some(item) = self.item(id) else {
            return false;
        };
        if item.kind != RenderKind::Block
            || item.establishes_bfc()
            || item.parent.is_none()
            || item.style.border_widths().top != 0.0
            || item.style.padding.top.resolve_or_zero(basis) != 0.0
            || self.has_inline_content(id)
        {
            return false;
        }
        self.first_in_flow_block_child(id)
            .and_then(|child| self.item(child))
            .is_some_and(|child| child.style.clear == Clear::None)
    }

    fn first_in_flow_block_child(&self, id: RenderId) -> Option<RenderId> {
        let child = self.arena.children(id).iter().copied().find(|child| {
            self.item(*child)
                .is_some_and(|item| item.kind != RenderKind::ListMarker && !item.is_out_of_flow())
        })?;
        self.item(child)
            .is_some_and(|item| !item.is_inline_level())
            .then_some(child)
    }

    pub(crate) fn has_inline_content(&self, id: RenderId) -> bool {
        self.arena
            .children(id)
            .iter()
            .any(|child| self.item(*child).is_some_and(|item| item.is_inline_level()))
    }

    pub(crate) fn set_geometry(&mut self, id: RenderId, geometry: BoxGeometry) {
        if let Some(item) = self.arena.get_mut(id) {
            item.geometry = geometry;
        }
    }

    /// Place a float whose top may not be above `y`. Returns its margin box.
    pub(crate) fn layout_float(
        &mut self,
        id: RenderId,
        cb: Containing,
        y: f32,
        space: &mut ExclusionSpace,
    ) -> Rect {
        let provisional = self.layout_atomic_box(id, cb, Point::new(cb.x, y));
        self.place_float(id, provisional, y, cb, space)
    }

    /// Move an already laid out float from its `provisional` margin box to
    /// the first spot at or below `y` where it fits.
    pub(crate) fn place_float(
        &mut self,
        id: RenderId,
        provisional: Rect,
        y: f32,
        cb: Containing,
        space: &mut ExclusionSpace,
    ) -> Rect {
        let Some(item) = self.item(id) else {
            return provisional;
        };
        let side = item.style.float;
        let mut top = y;
        if let Some(clear_y) = space.clearance(item.style.clear) {
            top = top.max(clear_y);
        }
        let placed = space.place(
            side,
            provisional.width,
            provisional.height,
            top,
            cb.x,
            cb.right(),
        );
        self.arena
            .translate_subtree(id, placed.x - provisional.x, placed.y - provisional.y);
        log::trace!("float {side:?} placed at {placed:?}");
        placed
    }

    /// Lay out a shrink-to-fit box (float or inline-block) with its margin box
    /// at `origin`. Returns the margin box.
    pub(crate) fn layout_atomic_box(&mut self, id: RenderId, cb: Containing, origin: Point) -> Rect {
        let Some(item) = self.item(id) else {
            return Rect::default();
        };
        let kind = item.kind;
        let style = self.style(id);
        let margin = resolve_edges(&style.margin, cb.width);
        let top = origin.y + margin.top;
        let shifted = Containing {
            x: origin.x,
            ..cb
        };
        match kind {
            RenderKind::Table => {
                self.layout_table(id, shifted, top, WidthMode::ShrinkToFit);
            }
            RenderKind::Image => {
                self.layout_replaced(id, shifted, top, WidthMode::ShrinkToFit);
            }
            _ => {
                let plan = self.plan_box(id, shifted, WidthMode::ShrinkToFit);
                let mut scratch = ExclusionSpace::new();
                self.layout_container(
                    id,
                    &plan,
                    shifted,
                    origin.x + plan.margin.left,
                    top,
                    &mut scratch,
                    false,
                    true,
                );
            }
        }
        self.item(id)
            .map_or_else(Rect::default, |item| item.geometry.margin_box())
    }

    /// Used content size of a replaced element.
    pub(crate) fn replaced_size(&mut self, id: RenderId, cb: Containing) -> Size {
        let Some(item) = self.item(id) else {
            return Size::default();
        };
        let style = Rc::clone(&item.style);
        let url = item.image.clone();
        let natural = url.and_then(|url| self.ctx.image_size(&url));
        let border = border_edges(&style);
        let padding = padding_edges(&style, cb.width);
        let extra_width = border.horizontal() + padding.horizontal();
        let extra_height = border.vertical() + padding.vertical();
        let width = style
            .width
            .resolve(Some(cb.width))
            .map(|width| content_size(&style, width, extra_width));
        let height = style
            .height
            .resolve(cb.height)
            .map(|height| content_size(&style, height, extra_height));

        let ratio = natural
            .filter(|size| size.width > 0.0 && size.height > 0.0)
            .map(|size| size.height / size.width);
        let (width, height) = match (width, height) {
            (Some(width), Some(height)) => (width, height),
            (Some(width), None) => (
                width,
                ratio.map_or_else(|| natural.map_or(0.0, |size| size.height), |ratio| width * ratio),
            ),
            (None, Some(height)) => (
                ratio.map_or_else(|| natural.map_or(0.0, |size| size.width), |ratio| height / ratio),
                height,
            ),
            (None, None) => natural.map_or((0.0, 0.0), |size| (size.width, size.height)),
        };
        Size::new(
            clamp_width(&style, width, cb.width, extra_width),
            clamp_height(&style, height, cb.height, extra_height),
        )
    }

    /// Lay out an image as a block-level or shrink-to-fit box with its border
    /// box top at `top`. Returns the border box height.
    pub(crate) fn layout_replaced(
        &mut self,
        id: RenderId,
        cb: Containing,
        top: f32,
        mode: WidthMode,
    ) -> f32 {
        let style = self.style(id);
        let size = self.replaced_size(id, cb);
        let mut margin = resolve_edges(&style.margin, cb.width);
        let border = border_edges(&style);
        let padding = padding_edges(&style, cb.width);
        let width = size.width + border.horizontal() + padding.horizontal();
        let height = size.height + border.vertical() + padding.vertical();
        if mode == WidthMode::Fill {
            let free = cb.width - width - margin.horizontal();
            match (style.margin.left.is_auto(), style.margin.right.is_auto()) {
                (true, true) => {
                    margin.left = (free / 2.0).max(0.0);
                    margin.right = free - margin.left;
                }
                (true, false) => margin.left = free,
                _ => {}
            }
        }
        self.set_geometry(
            id,
            BoxGeometry {
                border_box: Rect::new(cb.x + margin.left, top, width, height),
                margin,
                border,
                padding,
            },
        );
        if style.position == Position::Relative {
            self.apply_relative(id, cb);
        }
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strut_collapses_mixed_signs() {
        let mut strut = MarginStrut::new();
        strut.append(10.0);
        strut.append(20.0);
        assert_eq!(strut.collapse(), 20.0);

        let mut mixed = MarginStrut::new();
        mixed.append(-10.0);
        mixed.append(20.0);
        assert_eq!(mixed.collapse(), 10.0);

        let mut negative = MarginStrut::new();
        negative.append(-10.0);
        negative.append(-20.0);
        assert_eq!(negative.collapse(), -20.0);
        assert!(MarginStrut::new().is_empty());
    }

    #[test]
    fn merging_struts_keeps_extremes() {
        let mut first = MarginStrut::new();
        first.append(5.0);
        let mut second = MarginStrut::new();
        second.append(-3.0);
        second.append(8.0);
        first.append_strut(second);
        assert_eq!(first, MarginStrut { positive: 8.0, negative: -3.0 });
    }
}

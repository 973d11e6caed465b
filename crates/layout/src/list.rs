//! List item markers.

use css::ListStyleType;

use crate::arena::{RenderId, RenderKind};
use crate::engine::{LayoutEngine, strut_of};
use crate::geometry::{Rect, Size};

/// Marker box size and the gap kept between marker and content.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct MarkerExtent {
    pub size: Size,
    pub gap: f32,
}

impl LayoutEngine<'_> {
    pub(crate) fn marker_extent(&mut self, id: RenderId) -> MarkerExtent {
        let Some(item) = self.item(id) else {
            return MarkerExtent::default();
        };
        let style = self.style(id);
        let image = item.image.clone();
        let has_text = item.text.is_some();
        let advance = item.advance;
        let known_font = item.font;
        let font = match known_font {
            Some(font) => font,
            None => self.font(&style),
        };
        let gap = style.font_size * 0.5;

        if let Some(size) = image.and_then(|url| self.ctx.image_size(&url)) {
            return MarkerExtent { size, gap };
        }
        if has_text {
            return MarkerExtent {
                size: Size::new(advance, font.metrics.ascent + font.metrics.descent),
                gap,
            };
        }
        if style.list_style_type == ListStyleType::None {
            return MarkerExtent::default();
        }
        let side = (style.font_size * 0.35).max(2.0).floor();
        MarkerExtent {
            size: Size::new(side, side),
            gap,
        }
    }

    /// Put a marker's box at `x` against `baseline`.
    pub(crate) fn position_marker(&mut self, id: RenderId, x: f32, baseline: f32, extent: MarkerExtent) {
        let Some(item) = self.item(id) else {
            return;
        };
        let known_font = item.font;
        let image = item.image.clone();
        let has_text = item.text.is_some();
        let style = self.style(id);
        let font = match known_font {
            Some(font) => font,
            None => self.font(&style),
        };
        let image_loaded = image.is_some_and(|url| self.ctx.image_size(&url).is_some());
        let size = extent.size;
        let y = if image_loaded {
            baseline - size.height
        } else if has_text {
            baseline - font.metrics.ascent
        } else {
            baseline - (font.metrics.x_height + size.height) / 2.0
        };
        if let Some(item) = self.arena.get_mut(id) {
            item.geometry.border_box = Rect::new(x, y, size.width, size.height);
        }
    }

    /// Outside markers hang left of the content box, on the first baseline.
    pub(crate) fn place_outside_marker(&mut self, list_item: RenderId) {
        let marker = self.arena.children(list_item).iter().copied().find(|child| {
            self.item(*child)
                .is_some_and(|item| item.kind == RenderKind::ListMarker && !item.is_inline_level())
        });
        let Some(marker) = marker else {
            return;
        };
        let Some(content) = self.item(list_item).map(|item| item.geometry.content_box()) else {
            return;
        };
        let baseline = match self.first_baseline(list_item) {
            Some(baseline) => baseline,
            None => {
                let style = self.style(list_item);
                let font = self.font(&style);
                content.y + strut_of(&style, font).0
            }
        };
        let extent = self.marker_extent(marker);
        self.position_marker(marker, content.x - extent.gap - extent.size.width, baseline, extent);
    }

    /// Baseline of the first line box in the in-flow subtree of `id`.
    pub(crate) fn first_baseline(&self, id: RenderId) -> Option<f32> {
        let item = self.item(id)?;
        if let Some(line) = item.lines.first() {
            return Some(line.baseline);
        }
        item.children.iter().find_map(|child| {
            let child_item = self.item(*child)?;
            if child_item.is_out_of_flow() || child_item.kind == RenderKind::ListMarker {
                return None;
            }
            self.first_baseline(*child)
        })
    }

    /// Baseline of the last line box in the in-flow subtree of `id`.
    pub(crate) fn last_baseline(&self, id: RenderId) -> Option<f32> {
        let item = self.item(id)?;
        if let Some(line) = item.lines.last() {
            return Some(line.baseline);
        }
        item.children.iter().rev().find_map(|child| {
            let child_item = self.item(*child)?;
            if child_item.is_out_of_flow() || child_item.kind == RenderKind::ListMarker {
                return None;
            }
            self.last_baseline(*child)
        })
    }
}

//! Relative offsets and absolutely positioned boxes.
//! Spec: <https://www.w3.org/TR/CSS22/visudet.html#abs-non-replaced-width>

use css::Position;

use crate::arena::{RenderId, RenderKind};
use crate::block::WidthMode;
use crate::engine::{Containing, LayoutEngine, PendingAbsolute};
use crate::float::ExclusionSpace;
use crate::geometry::{Point, Rect};

impl LayoutEngine<'_> {
    /// Lay out the absolutely positioned boxes collected while `id` was laid
    /// out, against its padding box, then apply its own relative offset.
    pub(crate) fn finish_positioned(&mut self, id: RenderId, cb: Containing) {
        let pending = self.positioned_stack.pop().unwrap_or_default();
        let Some(item) = self.item(id) else {
            return;
        };
        let padding_box = item.geometry.padding_box();
        let relative = item.style.position == Position::Relative;
        for entry in pending {
            self.layout_absolute(entry, padding_box);
        }
        if relative {
            self.apply_relative(id, cb);
        }
    }

    /// Shift a relatively positioned box and its subtree by its offsets.
    pub(crate) fn apply_relative(&mut self, id: RenderId, cb: Containing) {
        let style = self.style(id);
        let offsets = style.offsets;
        let dx = offsets
            .left
            .resolve(Some(cb.width))
            .or_else(|| offsets.right.resolve(Some(cb.width)).map(|right| -right))
            .unwrap_or(0.0);
        let dy = offsets
            .top
            .resolve(cb.height)
            .or_else(|| offsets.bottom.resolve(cb.height).map(|bottom| -bottom))
            .unwrap_or(0.0);
        self.arena.translate_subtree(id, dx, dy);
    }

    /// Lay out one absolutely positioned box against `container` (a padding
    /// box, or the client rectangle for fixed boxes).
    pub(crate) fn layout_absolute(&mut self, entry: PendingAbsolute, container: Rect) {
        let Some(item) = self.item(entry.id) else {
            return;
        };
        let kind = item.kind;
        let style = self.style(entry.id);
        let static_origin = self.item(entry.anchor).map_or(Point::default(), |anchor| {
            let content = anchor.geometry.content_box();
            Point::new(content.x + entry.offset.x, content.y + entry.offset.y)
        });
        let cb = Containing {
            x: container.x,
            width: container.width,
            height: Some(container.height),
        };
        let offsets = style.offsets;
        let left = offsets.left.resolve(Some(container.width));
        let right = offsets.right.resolve(Some(container.width));
        let top = offsets.top.resolve(Some(container.height));
        let bottom = offsets.bottom.resolve(Some(container.height));

        // Provisional layout at the static position.
        let provisional_x = static_origin.x;
        let provisional_y = static_origin.y;
        let margin_box = match kind {
            RenderKind::Table | RenderKind::Image => {
                self.layout_atomic_box(entry.id, cb, Point::new(provisional_x, provisional_y))
            }
            _ => {
                let mut plan = self.plan_box(entry.id, cb, WidthMode::ShrinkToFit);
                let extra = plan.border.horizontal() + plan.padding.horizontal();
                if style.width.is_auto()
                    && let (Some(left), Some(right)) = (left, right)
                {
                    let stretched = container.width - left - right - plan.margin.horizontal() - extra;
                    plan.content_width = stretched.max(0.0);
                }
                let extra_vertical = plan.border.vertical() + plan.padding.vertical();
                if style.height.is_auto()
                    && let (Some(top), Some(bottom)) = (top, bottom)
                {
                    let stretched =
                        container.height - top - bottom - plan.margin.vertical() - extra_vertical;
                    plan.height_override = Some(stretched.max(0.0));
                }
                let mut scratch = ExclusionSpace::new();
                self.layout_container(
                    entry.id,
                    &plan,
                    cb,
                    provisional_x + plan.margin.left,
                    provisional_y + plan.margin.top,
                    &mut scratch,
                    false,
                    true,
                );
                self.item(entry.id)
                    .map_or_else(Rect::default, |item| item.geometry.margin_box())
            }
        };

        let x = match (left, right) {
            (Some(left), _) => container.x + left,
            (None, Some(right)) => container.right() - right - margin_box.width,
            (None, None) => static_origin.x,
        };
        let y = match (top, bottom) {
            (Some(top), _) => container.y + top,
            (None, Some(bottom)) => container.bottom() - bottom - margin_box.height,
            (None, None) => static_origin.y,
        };
        self.arena
            .translate_subtree(entry.id, x - margin_box.x, y - margin_box.y);
        log::trace!("positioned box placed at ({x}, {y})");
    }
}

//! Min-content and max-content widths, cached per render item.
//! Spec: <https://www.w3.org/TR/CSS22/visudet.html#shrink-to-fit-float>

use css::{Clear, ComputedStyle, Dimension};

use crate::arena::{RenderId, RenderKind};
use crate::engine::{Containing, LayoutEngine, border_edges, content_size};
use crate::inline::AtomKind;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Intrinsic {
    pub min: f32,
    pub max: f32,
}

impl Intrinsic {
    fn grow(self, amount: f32) -> Self {
        Self {
            min: self.min + amount,
            max: self.max + amount,
        }
    }
}

impl LayoutEngine<'_> {
    /// Intrinsic widths of the content box of `id`.
    pub(crate) fn content_intrinsic(&mut self, id: RenderId) -> Intrinsic {
        if let Some(cached) = self.intrinsic_cache.get(&id) {
            return *cached;
        }
        let result = if self.has_inline_content(id) {
            self.inline_intrinsic(id)
        } else {
            self.block_intrinsic(id)
        };
        self.intrinsic_cache.insert(id, result);
        result
    }

    /// What `id` contributes to the intrinsic widths of its parent: its
    /// margin box, with fixed widths and min/max constraints applied.
    pub(crate) fn outer_intrinsic(&mut self, id: RenderId) -> Intrinsic {
        let Some(item) = self.item(id) else {
            return Intrinsic::default();
        };
        let kind = item.kind;
        let style = self.style(id);
        let border = border_edges(&style);
        let padding_left = fixed(style.padding.left);
        let padding_right = fixed(style.padding.right);
        let extra = border.horizontal() + padding_left + padding_right;

        let (content, includes_extra) = match kind {
            RenderKind::Image => {
                let size = self.replaced_size(
                    id,
                    Containing {
                        x: 0.0,
                        width: 0.0,
                        height: None,
                    },
                );
                (
                    Intrinsic {
                        min: size.width,
                        max: size.width,
                    },
                    false,
                )
            }
            RenderKind::Table => (self.table_intrinsic(id), true),
            _ => (self.content_intrinsic(id), false),
        };
        let mut result = if includes_extra {
            content
        } else {
            let sized = match style.width {
                Dimension::Px(width) => {
                    let width = content_size(&style, width, extra);
                    Intrinsic {
                        min: width,
                        max: width,
                    }
                }
                Dimension::Auto | Dimension::Percent(_) => content,
            };
            clamp_fixed(&style, sized, extra).grow(extra)
        };
        let margins = fixed(style.margin.left) + fixed(style.margin.right);
        result = result.grow(margins);
        result.min = result.min.max(0.0);
        result.max = result.max.max(result.min);
        result
    }

    fn block_intrinsic(&mut self, id: RenderId) -> Intrinsic {
        let mut result = Intrinsic::default();
        let mut float_run = 0.0_f32;
        for child in self.children(id) {
            let Some(item) = self.item(child) else {
                continue;
            };
            if item.kind == RenderKind::ListMarker || item.style.is_out_of_flow_positioned() {
                continue;
            }
            let floating = item.style.is_floating();
            let clears = item.style.clear != Clear::None;
            let child_size = self.outer_intrinsic(child);
            result.min = result.min.max(child_size.min);
            if floating {
                float_run += child_size.max;
                result.max = result.max.max(float_run);
            } else {
                if clears {
                    float_run = 0.0;
                }
                result.max = result.max.max(child_size.max + float_run);
            }
        }
        result
    }

    fn inline_intrinsic(&mut self, id: RenderId) -> Intrinsic {
        let mut atoms = Vec::new();
        self.collect_atoms(id, 0.0, &mut atoms);
        let indent = fixed(self.style(id).text_indent);

        let mut min = 0.0_f32;
        let mut max = 0.0_f32;
        let mut chunk = indent;
        let mut line = indent;
        for atom in atoms {
            match atom.kind {
                AtomKind::Word | AtomKind::Marker | AtomKind::BoxStart | AtomKind::BoxEnd => {
                    chunk += atom.width;
                    line += atom.width;
                }
                AtomKind::Space { wraps, .. } => {
                    if wraps {
                        min = min.max(chunk);
                        chunk = 0.0;
                    } else {
                        chunk += atom.width;
                    }
                    line += atom.width;
                }
                AtomKind::Break => {
                    min = min.max(chunk);
                    max = max.max(line);
                    chunk = 0.0;
                    line = 0.0;
                }
                AtomKind::Atomic => {
                    let inner = self.outer_intrinsic(atom.id);
                    if atom.wraps {
                        min = min.max(chunk).max(inner.min);
                        chunk = 0.0;
                    } else {
                        chunk += inner.min;
                    }
                    line += inner.max;
                }
                AtomKind::Float => {
                    let inner = self.outer_intrinsic(atom.id);
                    min = min.max(inner.min);
                    line += inner.max;
                }
                AtomKind::Absolute => {}
            }
        }
        min = min.max(chunk);
        max = max.max(line);
        Intrinsic {
            min,
            max: max.max(min),
        }
    }
}

/// Pixel value of a length that does not depend on the containing block.
fn fixed(value: Dimension) -> f32 {
    match value {
        Dimension::Px(pixels) => pixels,
        Dimension::Auto | Dimension::Percent(_) => 0.0,
    }
}

fn clamp_fixed(style: &ComputedStyle, size: Intrinsic, extra: f32) -> Intrinsic {
    let mut result = size;
    if let Some(Dimension::Px(max)) = style.max_width {
        let max = content_size(style, max, extra);
        result.min = result.min.min(max);
        result.max = result.max.min(max);
    }
    if let Dimension::Px(min) = style.min_width {
        let min = content_size(style, min, extra);
        result.min = result.min.max(min);
        result.max = result.max.max(min);
    }
    result
}

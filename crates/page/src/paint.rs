//! Turns a laid out tree into backend draw calls.
//!
//! Items are visited in the tree's paint order. Each one draws its background
//! and borders, then its own content (text, marker or image); children are
//! separate paint steps.

use css::{
    BackgroundLayer, BackgroundRepeat, BorderSide, ComputedStyle, Rgba, Sides, TextDecoration,
    Visibility,
};
use layout::{LayoutTree, PaintOp, Point, Rect, RenderId, RenderItem, RenderKind, Size};

use crate::backend::{
    Background, Backend, BorderEdge, Borders, ImageLayer, ListMarker, Surface, TextRun,
};
use crate::resources::resolve_url;

/// Where and how much of the document to draw.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DrawTarget {
    pub surface: Surface,
    /// Surface position of the document origin.
    pub offset: Point,
    /// Surface-space region that needs drawing; everything when `None`.
    pub clip: Option<Rect>,
}

pub(crate) struct Painter<'doc> {
    pub backend: &'doc mut dyn Backend,
    pub tree: &'doc LayoutTree,
    pub base_url: Option<&'doc str>,
    pub target: DrawTarget,
    /// Item whose background was propagated to the canvas.
    pub canvas_source: Option<RenderId>,
}

impl Painter<'_> {
    pub fn paint(&mut self) {
        self.paint_canvas();
        for op in self.tree.paint_ops() {
            match *op {
                PaintOp::Item(id) => self.paint_item(id),
                PaintOp::PushClip { rect, radii } => {
                    let rect = self.to_surface(rect);
                    self.backend.set_clip(rect, radii);
                }
                PaintOp::PopClip => self.backend.del_clip(),
            }
        }
    }

    fn to_surface(&self, rect: Rect) -> Rect {
        rect.translated(self.target.offset.x, self.target.offset.y)
    }

    fn needs_paint(&self, rect: &Rect) -> bool {
        self.target
            .clip
            .is_none_or(|clip| clip.intersects(&self.to_surface(*rect)))
    }

    /// The root background, or the body's when the root has none, covers the
    /// whole canvas.
    fn paint_canvas(&mut self) {
        let tree = self.tree;
        let Some(source) = self.canvas_source.and_then(|id| tree.get(id)) else {
            return;
        };
        let client = self.backend.client_rect();
        let size = tree.size();
        let canvas = Rect::new(
            0.0,
            0.0,
            size.width.max(tree.width()).max(client.width),
            size.height.max(client.height),
        );
        let mut background = self.background_for(&source.style, canvas, canvas);
        background.is_root = true;
        background.clip = self.to_surface(canvas);
        background.origin_box = self.to_surface(source.geometry.padding_box());
        self.backend.draw_background(self.target.surface, &background);
    }

    fn paint_item(&mut self, id: RenderId) {
        let tree = self.tree;
        let Some(item) = tree.get(id) else {
            return;
        };
        if item.style.visibility != Visibility::Visible {
            return;
        }
        if !item.fragments().iter().any(|rect| self.needs_paint(rect)) {
            return;
        }
        match item.kind {
            RenderKind::Text | RenderKind::Space => self.paint_text(item),
            RenderKind::LineBreak => {}
            RenderKind::ListMarker => self.paint_marker(item),
            RenderKind::Image => {
                self.paint_decorations(id, item, item.geometry.border_box);
                self.paint_image(item);
            }
            RenderKind::Inline => {
                for rect in &item.line_rects {
                    self.paint_decorations(id, item, *rect);
                }
            }
            RenderKind::Block
            | RenderKind::InlineBlock
            | RenderKind::Table
            | RenderKind::TableRowGroup
            | RenderKind::TableRow
            | RenderKind::TableCell
            | RenderKind::TableCaption => {
                self.paint_decorations(id, item, item.geometry.border_box);
            }
        }
    }

    fn paint_decorations(&mut self, id: RenderId, item: &RenderItem, border_box: Rect) {
        let style = &item.style;
        let padding_box = Rect::new(
            border_box.x + item.geometry.border.left,
            border_box.y + item.geometry.border.top,
            (border_box.width - item.geometry.border.horizontal()).max(0.0),
            (border_box.height - item.geometry.border.vertical()).max(0.0),
        );
        let has_background =
            !style.background_color.is_transparent() || !style.background_layers.is_empty();
        if has_background && self.canvas_source != Some(id) {
            let background = self.background_for(style, border_box, padding_box);
            self.backend.draw_background(self.target.surface, &background);
        }
        let widths = style.border_widths();
        if widths.top > 0.0 || widths.right > 0.0 || widths.bottom > 0.0 || widths.left > 0.0 {
            let edge = |width: f32, side: &BorderSide| BorderEdge {
                width,
                style: side.style,
                color: style.border_color(side),
            };
            let borders = Borders {
                rect: self.to_surface(border_box),
                sides: Sides {
                    top: edge(widths.top, &style.border.top),
                    right: edge(widths.right, &style.border.right),
                    bottom: edge(widths.bottom, &style.border.bottom),
                    left: edge(widths.left, &style.border.left),
                },
                radii: style.border_radius,
            };
            self.backend.draw_borders(self.target.surface, &borders);
        }
    }

    fn background_for(
        &mut self,
        style: &ComputedStyle,
        border_box: Rect,
        padding_box: Rect,
    ) -> Background {
        // The first declared layer is the top one.
        let layers = style
            .background_layers
            .iter()
            .rev()
            .map(|layer| self.image_layer(layer, padding_box))
            .collect();
        Background {
            clip: self.to_surface(border_box),
            origin_box: self.to_surface(padding_box),
            color: style.background_color,
            layers,
            radii: style.border_radius,
            is_root: false,
        }
    }

    fn image_layer(&mut self, layer: &BackgroundLayer, padding_box: Rect) -> ImageLayer {
        let url = resolve_url(self.base_url, &layer.image);
        let size = self.backend.image_size(&url);
        let image = size.unwrap_or_default();
        // Percentages align the same point of the image and the box.
        let left = layer
            .position_x
            .resolve_or_zero(padding_box.width - image.width);
        let top = layer
            .position_y
            .resolve_or_zero(padding_box.height - image.height);
        let box_origin = self.to_surface(padding_box);
        ImageLayer {
            url,
            repeat: layer.repeat,
            origin: Point::new(box_origin.x + left, box_origin.y + top),
            size,
        }
    }

    fn paint_text(&mut self, item: &RenderItem) {
        let (Some(text), Some(font)) = (item.text.as_ref(), item.font) else {
            return;
        };
        // Spaces only matter when a decoration runs through them.
        if item.kind == RenderKind::Space && item.style.text_decoration.is_none() {
            return;
        }
        let rect = self.to_surface(item.geometry.border_box);
        let run = TextRun {
            text: text.clone(),
            font: font.handle,
            color: item.style.color,
            origin: Point::new(rect.x, rect.y),
            baseline: rect.y + font.metrics.ascent,
            width: rect.width,
            decoration: item.style.text_decoration,
        };
        self.backend.draw_text(self.target.surface, &run);
    }

    fn paint_marker(&mut self, item: &RenderItem) {
        let rect = self.to_surface(item.geometry.border_box);
        if let (Some(text), Some(font)) = (item.text.as_ref(), item.font) {
            let run = TextRun {
                text: text.clone(),
                font: font.handle,
                color: item.style.color,
                origin: Point::new(rect.x, rect.y),
                baseline: rect.y + font.metrics.ascent,
                width: rect.width,
                decoration: TextDecoration::default(),
            };
            self.backend.draw_text(self.target.surface, &run);
            return;
        }
        let marker = ListMarker {
            kind: item.style.list_style_type,
            image: item.image.as_deref().map(|url| resolve_url(self.base_url, url)),
            rect,
            color: item.style.color,
        };
        self.backend.draw_list_marker(self.target.surface, &marker);
    }

    fn paint_image(&mut self, item: &RenderItem) {
        let Some(src) = item.image.as_deref() else {
            return;
        };
        let content = self.to_surface(item.geometry.content_box());
        let url = resolve_url(self.base_url, src);
        let background = Background {
            clip: content,
            origin_box: content,
            color: Rgba::TRANSPARENT,
            layers: vec![ImageLayer {
                url,
                repeat: BackgroundRepeat::NoRepeat,
                origin: Point::new(content.x, content.y),
                size: Some(Size::new(content.width, content.height)),
            }],
            radii: item.style.border_radius,
            is_root: false,
        };
        self.backend.draw_background(self.target.surface, &background);
    }
}

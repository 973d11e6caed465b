//! The capability interface a host implements to display documents.
//!
//! The engine never draws, loads or measures anything itself. Every call that
//! touches fonts, pixels or resources goes through [`Backend`], which is
//! injected into a [`Document`](crate::Document) at construction.

use anyhow::Result;
use css::{
    BackgroundRepeat, BorderStyle, ImportedSheet, ListStyleType, MediaFeatures, Radii, Rgba,
    Sides, TextDecoration, TextTransform,
};
use html::{Attribute, ElementData, NodeId};
use layout::{FontDescriptor, FontHandle, FontInfo, Point, Rect, Size, apply_text_transform};

/// Opaque drawing target handed through [`Document::draw`](crate::Document::draw).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Surface(pub u64);

/// One word or space run.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: FontHandle,
    pub color: Rgba,
    /// Top-left of the run's box.
    pub origin: Point,
    pub baseline: f32,
    pub width: f32,
    pub decoration: TextDecoration,
}

/// A graphical list marker. Counter markers are drawn as [`TextRun`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct ListMarker {
    pub kind: ListStyleType,
    /// Resolved `list-style-image`, when the marker is an image.
    pub image: Option<String>,
    pub rect: Rect,
    pub color: Rgba,
}

/// One background image layer, already resolved to pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayer {
    pub url: String,
    pub repeat: BackgroundRepeat,
    /// Where the image's top-left corner lands.
    pub origin: Point,
    pub size: Option<Size>,
}

/// Background color and image layers of one box.
#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    /// Area the background is painted in (the border box).
    pub clip: Rect,
    /// Area positions are relative to (the padding box).
    pub origin_box: Rect,
    pub color: Rgba,
    /// Layers in paint order, bottom-most first.
    pub layers: Vec<ImageLayer>,
    pub radii: Radii,
    /// Set for the canvas background propagated from the root or body.
    pub is_root: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderEdge {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Rgba,
}

/// The four borders of one box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Borders {
    pub rect: Rect,
    pub sides: Sides<BorderEdge>,
    pub radii: Radii,
}

/// Services the engine needs from its host.
///
/// Methods with default bodies are optional. Fallible resource loads return
/// [`Result`]; the engine reports failures through [`Backend::on_error`] and
/// carries on without the resource.
pub trait Backend {
    // Fonts.
    fn create_font(&mut self, descriptor: &FontDescriptor) -> FontInfo;
    fn delete_font(&mut self, font: FontHandle);
    fn text_width(&mut self, text: &str, font: FontHandle) -> f32;

    // Drawing.
    fn draw_text(&mut self, surface: Surface, run: &TextRun);
    fn draw_list_marker(&mut self, surface: Surface, marker: &ListMarker);
    fn draw_background(&mut self, surface: Surface, background: &Background);
    fn draw_borders(&mut self, surface: Surface, borders: &Borders);
    /// Restrict drawing to `rect` until the matching [`Backend::del_clip`].
    fn set_clip(&mut self, rect: Rect, radii: Radii);
    fn del_clip(&mut self);

    // Resources.
    /// Start loading an image. Asynchronous hosts call
    /// [`Document::image_ready`](crate::Document::image_ready) once it arrives.
    fn load_image(&mut self, url: &str, redraw_on_ready: bool) -> Result<()>;
    fn image_size(&mut self, url: &str) -> Option<Size>;
    /// Text of the stylesheet at `url` and the base its own imports resolve against.
    fn import_css(&mut self, url: &str, base_url: Option<&str>) -> Result<ImportedSheet>;
    /// Canonical form of a color name the engine does not know.
    fn resolve_color(&self, _name: &str) -> Option<String> {
        None
    }

    // Environment.
    fn pt_to_px(&self, points: f32) -> f32 {
        points * 96.0 / 72.0
    }
    fn default_font_family(&self) -> String {
        "serif".to_owned()
    }
    fn default_font_size(&self) -> f32 {
        16.0
    }
    fn client_rect(&self) -> Rect;
    /// `None` lets the engine derive features from the client rectangle.
    fn media_features(&self) -> Option<MediaFeatures> {
        None
    }
    /// UI language, used when the document does not declare one.
    fn language(&self) -> String {
        "en".to_owned()
    }

    // Notifications.
    fn set_caption(&mut self, caption: &str);
    fn set_base_url(&mut self, base_url: &str);
    fn set_cursor(&mut self, cursor: &str);
    fn on_anchor_click(&mut self, url: &str, node: NodeId);
    fn on_error(&mut self, message: &str) {
        log::error!("{message}");
    }
    fn transform_text(&mut self, text: &str, transform: TextTransform) -> String {
        apply_text_transform(text, transform)
    }
    /// Substitute element data for a tag; `None` keeps the default element.
    fn create_element(&mut self, _name: &str, _attrs: &[Attribute]) -> Option<ElementData> {
        None
    }
}

#![allow(dead_code, reason = "Each test binary uses a different part of the fake backend")]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use css::{DEFAULT_STYLESHEET, ImportedSheet, MediaFeatures, Radii};
use html::NodeId;
use layout::{FontDescriptor, FontHandle, FontInfo, FontMetrics, Rect, Size};
use page::{Background, Backend, Borders, Document, EngineConfig, ListMarker, Surface, TextRun};

/// Everything the engine told the backend, plus the resources it serves.
#[derive(Default)]
pub struct Recorder {
    pub captions: Vec<String>,
    pub base_urls: Vec<String>,
    pub cursors: Vec<String>,
    pub anchors: Vec<(String, NodeId)>,
    pub errors: Vec<String>,
    pub texts: Vec<TextRun>,
    pub backgrounds: Vec<Background>,
    pub borders: Vec<Borders>,
    pub markers: Vec<ListMarker>,
    pub clips: Vec<Rect>,
    pub clip_depth: i32,
    pub loaded_images: Vec<String>,
    pub imported: Vec<String>,
    pub font_sizes: Vec<f32>,
    pub deleted_fonts: Vec<FontHandle>,
    /// Stylesheets served by URL.
    pub sheets: HashMap<String, String>,
    /// Natural image sizes served by URL.
    pub images: HashMap<String, Size>,
    pub client: Rect,
    pub media: Option<MediaFeatures>,
}

pub type Shared = Rc<RefCell<Recorder>>;

/// In-memory backend: each character advances half the font size and a
/// line is a quarter taller than the font.
pub struct RecordingBackend {
    pub state: Shared,
}

impl Backend for RecordingBackend {
    fn create_font(&mut self, descriptor: &FontDescriptor) -> FontInfo {
        let mut state = self.state.borrow_mut();
        state.font_sizes.push(descriptor.size);
        let size = descriptor.size;
        FontInfo {
            handle: FontHandle(state.font_sizes.len() as u64 - 1),
            metrics: FontMetrics {
                ascent: size * 0.8,
                descent: size * 0.2,
                height: (size * 1.25).round(),
                x_height: size * 0.5,
            },
        }
    }

    fn delete_font(&mut self, font: FontHandle) {
        self.state.borrow_mut().deleted_fonts.push(font);
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> f32 {
        let state = self.state.borrow();
        let size = state
            .font_sizes
            .get(font.0 as usize)
            .copied()
            .unwrap_or(16.0);
        text.chars().count() as f32 * size * 0.5
    }

    fn draw_text(&mut self, _surface: Surface, run: &TextRun) {
        self.state.borrow_mut().texts.push(run.clone());
    }

    fn draw_list_marker(&mut self, _surface: Surface, marker: &ListMarker) {
        self.state.borrow_mut().markers.push(marker.clone());
    }

    fn draw_background(&mut self, _surface: Surface, background: &Background) {
        self.state.borrow_mut().backgrounds.push(background.clone());
    }

    fn draw_borders(&mut self, _surface: Surface, borders: &Borders) {
        self.state.borrow_mut().borders.push(*borders);
    }

    fn set_clip(&mut self, rect: Rect, _radii: Radii) {
        let mut state = self.state.borrow_mut();
        state.clips.push(rect);
        state.clip_depth += 1;
    }

    fn del_clip(&mut self) {
        self.state.borrow_mut().clip_depth -= 1;
    }

    fn load_image(&mut self, url: &str, _redraw_on_ready: bool) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.loaded_images.push(url.to_owned());
        if state.images.contains_key(url) {
            Ok(())
        } else {
            Err(anyhow!("no such image"))
        }
    }

    fn image_size(&mut self, url: &str) -> Option<Size> {
        self.state.borrow().images.get(url).copied()
    }

    fn import_css(&mut self, url: &str, _base_url: Option<&str>) -> Result<ImportedSheet> {
        let mut state = self.state.borrow_mut();
        state.imported.push(url.to_owned());
        let text = state
            .sheets
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("404 for {url}"))?;
        Ok(ImportedSheet {
            text,
            base_url: Some(url.to_owned()),
        })
    }

    fn client_rect(&self) -> Rect {
        self.state.borrow().client
    }

    fn media_features(&self) -> Option<MediaFeatures> {
        self.state.borrow().media
    }

    fn set_caption(&mut self, caption: &str) {
        self.state.borrow_mut().captions.push(caption.to_owned());
    }

    fn set_base_url(&mut self, base_url: &str) {
        self.state.borrow_mut().base_urls.push(base_url.to_owned());
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.state.borrow_mut().cursors.push(cursor.to_owned());
    }

    fn on_anchor_click(&mut self, url: &str, node: NodeId) {
        self.state.borrow_mut().anchors.push((url.to_owned(), node));
    }

    fn on_error(&mut self, message: &str) {
        self.state.borrow_mut().errors.push(message.to_owned());
    }
}

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn recorder() -> Shared {
    Rc::new(RefCell::new(Recorder {
        client: Rect::new(0.0, 0.0, 800.0, 600.0),
        ..Recorder::default()
    }))
}

/// A document over `state` with the default stylesheet and configuration.
pub fn document_with(markup: &str, state: &Shared) -> Document {
    init_logs();
    let backend = RecordingBackend {
        state: Rc::clone(state),
    };
    Document::with_config(
        markup,
        Box::new(backend),
        DEFAULT_STYLESHEET,
        None,
        EngineConfig::default(),
    )
}

pub fn document(markup: &str) -> (Document, Shared) {
    let state = recorder();
    let doc = document_with(markup, &state);
    (doc, state)
}

pub fn by_id(doc: &Document, id: &str) -> Result<NodeId> {
    doc.dom()
        .element_by_id(id)
        .ok_or_else(|| anyhow!("no element #{id}"))
}

pub fn placement(doc: &Document, id: &str) -> Result<Rect> {
    let node = by_id(doc, id)?;
    doc.element_placement(node)
        .ok_or_else(|| anyhow!("#{id} has no box"))
}

pub fn covers(regions: &[Rect], target: Rect) -> bool {
    regions.iter().any(|region| {
        region.x <= target.x
            && region.y <= target.y
            && region.right() >= target.right()
            && region.bottom() >= target.bottom()
    })
}

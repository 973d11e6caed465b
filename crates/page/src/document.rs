//! The document controller: owns the DOM, styles and layout of one document
//! and drives them through the backend.

use std::collections::{HashMap, HashSet};

use css::{
    ComputedStyles, DomAdapter, DynamicState, MediaFeatures, Origin, SheetSource, StyleContext,
    StyleSet, compute_styles, parse_selector_list,
};
use css_selectors::matches_selector_list;
use html::{Attribute, DocumentEvent, Dom, ElementData, ElementFactory, NodeId, parse_document};
use layout::{LayoutTree, Point, Rect, RenderId, Size, layout_document};
use tracing::info_span;

use crate::backend::{Backend, Surface};
use crate::config::EngineConfig;
use crate::fonts::{BackendContext, FontCache};
use crate::interaction::{Interaction, element_of};
use crate::paint::{DrawTarget, Painter};
use crate::resources::{BackendColors, BackendImporter, resolve_url};

/// Lets the backend substitute elements while the tree is built.
struct HostElements<'doc> {
    backend: &'doc mut dyn Backend,
}

impl ElementFactory for HostElements<'_> {
    fn create_element(&mut self, name: &str, attrs: &[Attribute]) -> Option<ElementData> {
        self.backend.create_element(name, attrs)
    }
}

/// One parsed, styled and laid out document.
///
/// Construction parses the markup and runs the cascade; [`Document::render`]
/// lays the document out for a width and [`Document::draw`] paints the last
/// layout through the backend.
pub struct Document {
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) config: EngineConfig,
    pub(crate) dom: Dom,
    body: Option<NodeId>,
    caption: Option<String>,
    base_url: Option<String>,
    pub(crate) style_set: StyleSet,
    pub(crate) styles: ComputedStyles,
    pub(crate) dynamic: DynamicState,
    media: Vec<bool>,
    pub(crate) tree: LayoutTree,
    fonts: FontCache,
    generation: u32,
    rendered_width: Option<f32>,
    pub(crate) interaction: Interaction,
    /// Resolved image URLs and the references in the document that name them.
    images: HashMap<String, HashSet<String>>,
}

impl Document {
    /// Build a document from markup with configuration from the environment.
    ///
    /// `master_css` is the default stylesheet; `user_css` is an optional user
    /// stylesheet ranked between it and the author sheets.
    pub fn from_html(
        markup: &str,
        backend: Box<dyn Backend>,
        master_css: &str,
        user_css: Option<&str>,
    ) -> Self {
        Self::with_config(markup, backend, master_css, user_css, EngineConfig::from_env())
    }

    pub fn with_config(
        markup: &str,
        mut backend: Box<dyn Backend>,
        master_css: &str,
        user_css: Option<&str>,
        config: EngineConfig,
    ) -> Self {
        let (dom, events) = if markup.trim().is_empty() {
            log::info!("empty markup, building an empty document");
            (Dom::new(), Vec::new())
        } else {
            let _span = info_span!("page.parse").entered();
            let mut factory = HostElements {
                backend: &mut *backend,
            };
            let output = parse_document(markup, &mut factory);
            (output.dom, output.events)
        };

        let mut style_set = StyleSet::new();
        style_set.add_stylesheet(SheetSource::new(master_css, Origin::UserAgent));
        if let Some(user) = user_css {
            style_set.add_stylesheet(SheetSource::new(user, Origin::User));
        }

        let mut document = Self {
            backend,
            config,
            dom,
            body: None,
            caption: None,
            base_url: None,
            style_set,
            styles: ComputedStyles::default(),
            dynamic: DynamicState::default(),
            media: Vec::new(),
            tree: LayoutTree::empty(0),
            fonts: FontCache::default(),
            generation: 0,
            rendered_width: None,
            interaction: Interaction::default(),
            images: HashMap::new(),
        };
        for event in events {
            document.apply_event(event);
        }
        let device = document.device();
        document.media = document.style_set.media_signature(&device);
        document.restyle();
        log::info!(
            "document ready: {} nodes, {} rules",
            document.dom.node_count(),
            document.style_set.len()
        );
        document
    }

    fn apply_event(&mut self, event: DocumentEvent) {
        match event {
            DocumentEvent::BaseUrl(href) => {
                let resolved = resolve_url(self.base_url.as_deref(), &href);
                self.backend.set_base_url(&resolved);
                self.base_url = Some(resolved);
            }
            DocumentEvent::Body(node) => self.body = Some(node),
            DocumentEvent::Title(text) => {
                if self.caption.is_none() {
                    self.backend.set_caption(&text);
                    self.caption = Some(text);
                }
            }
            DocumentEvent::InlineStylesheet { text, media, .. } => {
                let source = SheetSource {
                    text: &text,
                    origin: Origin::Author,
                    media: media.as_deref(),
                    base_url: self.base_url.as_deref(),
                };
                let mut importer = BackendImporter {
                    backend: &mut *self.backend,
                };
                self.style_set.add_stylesheet_with_imports(
                    source,
                    &mut importer,
                    self.config.max_import_depth,
                );
            }
            DocumentEvent::LinkedStylesheet { href, media, .. } => {
                let mut importer = BackendImporter {
                    backend: &mut *self.backend,
                };
                let Some(sheet) = importer.fetch(&href, self.base_url.as_deref()) else {
                    return;
                };
                let source = SheetSource {
                    text: &sheet.text,
                    origin: Origin::Author,
                    media: media.as_deref(),
                    base_url: sheet.base_url.as_deref(),
                };
                self.style_set.add_stylesheet_with_imports(
                    source,
                    &mut importer,
                    self.config.max_import_depth,
                );
            }
        }
    }

    /// Media features to match `@media` rules against.
    fn device(&self) -> MediaFeatures {
        self.backend.media_features().unwrap_or_else(|| {
            let client = self.backend.client_rect();
            MediaFeatures {
                media_type: self.config.default_media,
                width: client.width,
                height: client.height,
                device_width: client.width,
                device_height: client.height,
                ..MediaFeatures::default()
            }
        })
    }

    /// Re-run the cascade for the current dynamic state and media.
    pub(crate) fn restyle(&mut self) {
        let _span = info_span!("page.cascade").entered();
        let device = self.device();
        let family = self.backend.default_font_family();
        let client = self.backend.client_rect();
        let colors = BackendColors(&*self.backend);
        let ctx = StyleContext {
            default_font_family: &family,
            default_font_size: self.backend.default_font_size(),
            pt_to_px: self.backend.pt_to_px(1.0),
            viewport_width: client.width,
            viewport_height: client.height,
            colors: Some(&colors),
        };
        self.styles = compute_styles(&self.dom, &self.style_set, &device, &self.dynamic, &ctx);
    }

    /// Lay the document out again at the last rendered width, if any.
    pub(crate) fn relayout(&mut self) {
        if let Some(width) = self.rendered_width {
            self.layout(width);
        }
    }

    fn layout(&mut self, width: f32) {
        let _span = info_span!("page.layout", width).entered();
        self.generation = self.generation.wrapping_add(1);
        let mut ctx = BackendContext {
            backend: &mut *self.backend,
            fonts: &mut self.fonts,
            base_url: self.base_url.as_deref(),
        };
        self.tree = layout_document(&self.dom, &self.styles, &mut ctx, width, self.generation);
        self.rendered_width = Some(width);
        self.request_images();
        self.interaction.refresh(&self.dom, &self.tree);
    }

    /// Lay the document out for `width` pixels and return its extent.
    pub fn render(&mut self, width: f32) -> Size {
        self.layout(width);
        let size = self.tree.size();
        log::debug!("rendered at width {width}: {size:?}");
        size
    }

    /// Paint the last layout with the document origin at (`x`, `y`) of
    /// `surface`. Only boxes meeting `clip`, in surface coordinates, are drawn.
    pub fn draw(&mut self, surface: Surface, x: f32, y: f32, clip: Option<Rect>) {
        let _span = info_span!("page.draw").entered();
        let canvas_source = self.canvas_source();
        let mut painter = Painter {
            backend: &mut *self.backend,
            tree: &self.tree,
            base_url: self.base_url.as_deref(),
            target: DrawTarget {
                surface,
                offset: Point::new(x, y),
                clip,
            },
            canvas_source,
        };
        painter.paint();
    }

    /// The item whose background paints the canvas: the root element's, or
    /// the body's when the root has none.
    fn canvas_source(&self) -> Option<RenderId> {
        let has_background = |id: RenderId| {
            self.tree.get(id).is_some_and(|item| {
                !item.style.background_color.is_transparent()
                    || !item.style.background_layers.is_empty()
            })
        };
        let root = self.tree.root()?;
        if has_background(root) {
            return Some(root);
        }
        let body = self
            .body
            .and_then(|body| self.tree.items_for(body).first().copied())?;
        has_background(body).then_some(body)
    }

    /// Ask the backend to load every image the current layout paints.
    fn request_images(&mut self) {
        let mut references = Vec::new();
        for id in self.tree.arena().ids() {
            let Some(item) = self.tree.get(id) else {
                continue;
            };
            references.extend(item.image.iter().cloned());
            references.extend(
                item.style
                    .background_layers
                    .iter()
                    .map(|layer| layer.image.clone()),
            );
        }
        for reference in references {
            let resolved = resolve_url(self.base_url.as_deref(), &reference);
            let first_request = !self.images.contains_key(&resolved);
            self.images
                .entry(resolved.clone())
                .or_default()
                .insert(reference);
            if !first_request {
                continue;
            }
            if let Err(err) = self.backend.load_image(&resolved, true) {
                let message = format!("failed to load image {resolved}: {err:#}");
                log::warn!("{message}");
                self.backend.on_error(&message);
            }
        }
    }

    /// Re-evaluate `@media` rules. Returns `true` when the active rule set
    /// changed and the document was restyled and laid out again.
    pub fn media_changed(&mut self) -> bool {
        let device = self.device();
        let signature = self.style_set.media_signature(&device);
        if signature == self.media {
            return false;
        }
        log::info!("media features changed, restyling");
        self.media = signature;
        self.restyle();
        self.relayout();
        true
    }

    /// An image finished loading. Returns the regions that paint it; layout
    /// is not redone.
    pub fn image_ready(&self, url: &str) -> Vec<Rect> {
        self.images.get(url).map_or_else(Vec::new, |references| {
            references
                .iter()
                .flat_map(|reference| self.tree.image_rects(reference))
                .collect()
        })
    }

    /// Root element of the DOM.
    pub fn root(&self) -> Option<NodeId> {
        self.dom.root_element()
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn layout_tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn styles(&self) -> &ComputedStyles {
        &self.styles
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extent of the last layout; zero before the first render.
    pub fn size(&self) -> Size {
        self.tree.size()
    }

    /// Language of the root element, or the backend's UI language.
    pub fn language(&self) -> String {
        self.root()
            .and_then(|root| self.dom.element(root))
            .and_then(|root| root.attr("lang"))
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map_or_else(|| self.backend.language(), str::to_owned)
    }

    /// Innermost element painted at (`x`, `y`) in document coordinates.
    pub fn get_element_at(&self, x: f32, y: f32) -> Option<NodeId> {
        let hit = self.tree.hit_test(Point::new(x, y))?;
        element_of(&self.dom, &self.tree, hit)
    }

    /// Document-coordinate border box of the first box of `node`.
    pub fn element_placement(&self, node: NodeId) -> Option<Rect> {
        self.tree.element_placement(node)
    }

    /// Every element matching `selector`, in document order.
    pub fn select_all(&self, selector: &str) -> Vec<NodeId> {
        let list = parse_selector_list(selector);
        if list.selectors.is_empty() {
            return Vec::new();
        }
        let adapter = DomAdapter::new(&self.dom, &self.dynamic);
        self.dom
            .descendants(self.dom.document())
            .filter(|node| self.dom.is_element(*node))
            .filter(|node| matches_selector_list(&adapter, *node, &list))
            .collect()
    }

    /// First element matching `selector`. A bare `#name` that matches no id
    /// falls back to `[name="name"]`, the way fragment links find anchors.
    pub fn select_one(&self, selector: &str) -> Option<NodeId> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        if let Some(found) = self.select_all(selector).first() {
            return Some(*found);
        }
        let name = selector.strip_prefix('#')?;
        self.dom.descendants(self.dom.document()).find(|node| {
            self.dom
                .element(*node)
                .is_some_and(|element| element.attr("name") == Some(name))
        })
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        log::debug!("releasing {} fonts", self.fonts.len());
        self.fonts.release(&mut *self.backend);
    }
}

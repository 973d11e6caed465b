//! Font cache and the measurement context handed to layout.

use std::collections::HashMap;

use css::TextTransform;
use layout::{FontDescriptor, FontHandle, FontInfo, LayoutContext, Rect, Size};

use crate::backend::Backend;
use crate::resources::resolve_url;

/// Fonts created through the backend, one per distinct descriptor.
#[derive(Debug, Default)]
pub struct FontCache {
    fonts: HashMap<FontDescriptor, FontInfo>,
}

impl FontCache {
    pub fn get(&mut self, backend: &mut dyn Backend, descriptor: &FontDescriptor) -> FontInfo {
        if let Some(info) = self.fonts.get(descriptor) {
            return *info;
        }
        let info = backend.create_font(descriptor);
        log::debug!(
            "created font {:?} for {} {}px",
            info.handle,
            descriptor.family,
            descriptor.size
        );
        self.fonts.insert(descriptor.clone(), info);
        info
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Hand every font back to the backend.
    pub fn release(&mut self, backend: &mut dyn Backend) {
        for (_, info) in self.fonts.drain() {
            backend.delete_font(info.handle);
        }
    }
}

/// [`LayoutContext`] backed by a document's backend and font cache.
pub(crate) struct BackendContext<'doc> {
    pub backend: &'doc mut dyn Backend,
    pub fonts: &'doc mut FontCache,
    pub base_url: Option<&'doc str>,
}

impl LayoutContext for BackendContext<'_> {
    fn font(&mut self, descriptor: &FontDescriptor) -> FontInfo {
        self.fonts.get(&mut *self.backend, descriptor)
    }

    fn text_width(&mut self, text: &str, font: FontHandle) -> f32 {
        self.backend.text_width(text, font).max(0.0)
    }

    fn image_size(&mut self, url: &str) -> Option<Size> {
        let resolved = resolve_url(self.base_url, url);
        self.backend.image_size(&resolved)
    }

    fn client_rect(&self) -> Rect {
        self.backend.client_rect()
    }

    fn transform_text(&mut self, text: &str, transform: TextTransform) -> String {
        self.backend.transform_text(text, transform)
    }
}

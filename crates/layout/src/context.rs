//! What layout needs from its embedder: fonts, text measurement, image sizes
//! and the viewport.

use std::hash::{Hash, Hasher};

use css::{ComputedStyle, FontStyle, TextDecoration, TextTransform};

use crate::geometry::{Rect, Size};

/// Opaque font identifier handed out by the embedder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontHandle(pub u64);

/// Vertical metrics of a font, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    /// Natural line height, used for `line-height: normal`.
    pub height: f32,
    pub x_height: f32,
}

/// A created font together with its metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontInfo {
    pub handle: FontHandle,
    pub metrics: FontMetrics,
}

/// Everything that identifies a font instance.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDescriptor {
    /// Comma separated family list as computed.
    pub family: String,
    pub size: f32,
    pub weight: u16,
    pub italic: bool,
    pub decoration: TextDecoration,
}

impl FontDescriptor {
    pub fn from_style(style: &ComputedStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size,
            weight: style.font_weight,
            italic: style.font_style != FontStyle::Normal,
            decoration: style.text_decoration,
        }
    }
}

impl Eq for FontDescriptor {}

impl Hash for FontDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.family.hash(state);
        self.size.to_bits().hash(state);
        self.weight.hash(state);
        self.italic.hash(state);
        self.decoration.hash(state);
    }
}

/// Measurement services used while building and laying out render items.
pub trait LayoutContext {
    /// Font for `descriptor`. Implementations are expected to cache.
    fn font(&mut self, descriptor: &FontDescriptor) -> FontInfo;

    /// Advance width of `text` in `font`.
    fn text_width(&mut self, text: &str, font: FontHandle) -> f32;

    /// Natural size of the image at `url`, if it is known.
    fn image_size(&mut self, url: &str) -> Option<Size>;

    /// Visible client area; fixed boxes and viewport units resolve against it.
    fn client_rect(&self) -> Rect;

    fn transform_text(&mut self, text: &str, transform: TextTransform) -> String {
        apply_text_transform(text, transform)
    }
}

/// `text-transform` applied to one text run.
pub fn apply_text_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_owned(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut at_word_start = true;
            for ch in text.chars() {
                if at_word_start && ch.is_alphabetic() {
                    out.extend(ch.to_uppercase());
                } else {
                    out.push(ch);
                }
                at_word_start = ch.is_whitespace();
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[test]
    fn capitalize_only_touches_word_starts() {
        assert_eq!(
            apply_text_transform("hello wORLD", TextTransform::Capitalize),
            "Hello WORLD"
        );
        assert_eq!(apply_text_transform("Mixed", TextTransform::Lowercase), "mixed");
    }

    #[test]
    fn equal_descriptors_hash_equally() {
        let style = ComputedStyle::initial("serif", 16.0);
        let first = FontDescriptor::from_style(&style);
        let second = FontDescriptor::from_style(&style);
        let digest = |descriptor: &FontDescriptor| {
            let mut hasher = DefaultHasher::new();
            descriptor.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(first, second);
        assert_eq!(digest(&first), digest(&second));
    }
}

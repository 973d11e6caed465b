//! Computed style construction from cascaded declarations.
//!
//! The cascade hands over one winning value per longhand. This module applies
//! CSS-wide keywords, resolves `font-size` first so `em` lengths see the
//! element's own size, then runs the per-group parsers.

mod parsers;

use std::collections::HashMap;

use crate::properties::PropertyId;
use crate::style_model::ComputedStyle;
use crate::values::{ColorResolver, LengthContext, parse_color};

/// Environment the embedder supplies for value resolution.
#[derive(Clone, Copy)]
pub struct StyleContext<'ctx> {
    pub default_font_family: &'ctx str,
    pub default_font_size: f32,
    /// Pixels per point.
    pub pt_to_px: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub colors: Option<&'ctx dyn ColorResolver>,
}

impl Default for StyleContext<'_> {
    fn default() -> Self {
        Self {
            default_font_family: "serif",
            default_font_size: 16.0,
            pt_to_px: 96.0 / 72.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            colors: None,
        }
    }
}

/// Per-element resolution state handed to the parsers.
pub struct ResolveContext<'ctx> {
    pub lengths: LengthContext,
    pub parent_font_size: f32,
    pub medium_font_size: f32,
    pub colors: Option<&'ctx dyn ColorResolver>,
}

impl<'ctx> ResolveContext<'ctx> {
    fn new(ctx: &StyleContext<'ctx>, font_size: f32, parent_font_size: f32, root: f32) -> Self {
        Self {
            lengths: LengthContext {
                font_size,
                root_font_size: root,
                pt_to_px: ctx.pt_to_px,
                viewport_width: ctx.viewport_width,
                viewport_height: ctx.viewport_height,
            },
            parent_font_size,
            medium_font_size: ctx.default_font_size,
            colors: ctx.colors,
        }
    }
}

/// Build the computed style of an element from its winning declarations.
///
/// `root_font_size` is `None` when computing the root element itself.
pub fn build_computed(
    decls: &HashMap<String, String>,
    parent: Option<&ComputedStyle>,
    root_font_size: Option<f32>,
    ctx: &StyleContext,
) -> ComputedStyle {
    let initial = ComputedStyle::initial(ctx.default_font_family, ctx.default_font_size);
    let mut computed = parent.map_or_else(|| initial.clone(), ComputedStyle::inherit_from);

    let mut specified: HashMap<String, String> = HashMap::with_capacity(decls.len());
    for (name, value) in decls {
        if value.eq_ignore_ascii_case("inherit") {
            computed.copy_property(parent.unwrap_or(&initial), name);
        } else if value.eq_ignore_ascii_case("initial") {
            computed.copy_property(&initial, name);
        } else {
            specified.insert(name.clone(), value.clone());
        }
    }

    let parent_font_size = parent.map_or(ctx.default_font_size, |style| style.font_size);
    let resolve = ResolveContext::new(
        ctx,
        computed.font_size,
        parent_font_size,
        root_font_size.unwrap_or(parent_font_size),
    );
    parsers::typography::apply_font_size(&mut computed, &specified, &resolve);

    let resolve = ResolveContext::new(
        ctx,
        computed.font_size,
        parent_font_size,
        root_font_size.unwrap_or(computed.font_size),
    );
    // Color first: background and border `currentColor` read it.
    parsers::colors::apply_colors(&mut computed, &specified, &resolve);
    parsers::typography::apply_typography(&mut computed, &specified, &resolve);
    parsers::layout::apply_layout_keywords(&mut computed, &specified, &resolve);
    parsers::dimensions::apply_dimensions(&mut computed, &specified, &resolve);
    parsers::edges::apply_edges_and_borders(&mut computed, &specified, &resolve);
    computed
}

/// Whether `value` is syntactically valid for `id`. Invalid declarations are
/// dropped before the cascade so a lower-priority valid one can win.
pub fn is_valid_value(id: PropertyId, value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("inherit") || trimmed.eq_ignore_ascii_case("initial") {
        return true;
    }
    let resolve = ResolveContext::new(&StyleContext::default(), 16.0, 16.0, 16.0);
    match id {
        PropertyId::Color
        | PropertyId::BackgroundColor
        | PropertyId::BorderTopColor
        | PropertyId::BorderRightColor
        | PropertyId::BorderBottomColor
        | PropertyId::BorderLeftColor => {
            // Identifiers may be known only to the embedder's color resolver.
            parse_color(trimmed, None).is_some()
                || (trimmed.starts_with(|ch: char| ch.is_ascii_alphabetic())
                    && trimmed
                        .chars()
                        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-'))
        }
        PropertyId::FontSize => parsers::typography::parse_font_size(trimmed, &resolve).is_some(),
        PropertyId::FontFamily => !trimmed.is_empty(),
        PropertyId::FontWeight => parsers::typography::parse_font_weight(trimmed, 400).is_some(),
        PropertyId::FontStyle => parsers::typography::parse_font_style(trimmed).is_some(),
        PropertyId::LineHeight => {
            parsers::typography::parse_line_height(trimmed, &resolve).is_some()
        }
        PropertyId::TextAlign => parsers::typography::parse_text_align(trimmed).is_some(),
        PropertyId::TextIndent => {
            parsers::dimensions::parse_length_percentage(trimmed, &resolve, true).is_some()
        }
        PropertyId::TextTransform => parsers::typography::parse_text_transform(trimmed).is_some(),
        PropertyId::TextDecoration => {
            parsers::typography::parse_text_decoration(trimmed).is_some()
        }
        PropertyId::WhiteSpace => parsers::typography::parse_white_space(trimmed).is_some(),
        PropertyId::Visibility => parsers::typography::parse_visibility(trimmed).is_some(),
        PropertyId::Cursor => !trimmed.is_empty(),
        PropertyId::ListStyleType => parsers::typography::parse_list_style_type(trimmed).is_some(),
        PropertyId::ListStylePosition => {
            parsers::typography::parse_list_style_position(trimmed).is_some()
        }
        PropertyId::ListStyleImage => {
            parsers::typography::parse_list_style_image(trimmed).is_some()
        }
        PropertyId::BorderCollapse => parsers::layout::parse_border_collapse(trimmed).is_some(),
        PropertyId::BorderSpacing => {
            parsers::layout::parse_border_spacing(trimmed, &resolve).is_some()
        }
        PropertyId::Display => parsers::layout::parse_display(trimmed).is_some(),
        PropertyId::Position => parsers::layout::parse_position(trimmed).is_some(),
        PropertyId::Float => parsers::layout::parse_float(trimmed).is_some(),
        PropertyId::Clear => parsers::layout::parse_clear(trimmed).is_some(),
        PropertyId::Overflow => parsers::layout::parse_overflow(trimmed).is_some(),
        PropertyId::BoxSizing => parsers::dimensions::parse_box_sizing(trimmed).is_some(),
        PropertyId::VerticalAlign => {
            parsers::layout::parse_vertical_align(trimmed, &resolve, 16.0).is_some()
        }
        PropertyId::MarginTop
        | PropertyId::MarginRight
        | PropertyId::MarginBottom
        | PropertyId::MarginLeft
        | PropertyId::Top
        | PropertyId::Right
        | PropertyId::Bottom
        | PropertyId::Left => {
            parsers::dimensions::parse_length_percentage_auto(trimmed, &resolve, true).is_some()
        }
        PropertyId::PaddingTop
        | PropertyId::PaddingRight
        | PropertyId::PaddingBottom
        | PropertyId::PaddingLeft => {
            parsers::dimensions::parse_length_percentage(trimmed, &resolve, false).is_some()
        }
        PropertyId::BorderTopWidth
        | PropertyId::BorderRightWidth
        | PropertyId::BorderBottomWidth
        | PropertyId::BorderLeftWidth => {
            parsers::edges::parse_border_width(trimmed, &resolve).is_some()
        }
        PropertyId::BorderTopStyle
        | PropertyId::BorderRightStyle
        | PropertyId::BorderBottomStyle
        | PropertyId::BorderLeftStyle => parsers::edges::parse_border_style(trimmed).is_some(),
        PropertyId::BorderTopLeftRadius
        | PropertyId::BorderTopRightRadius
        | PropertyId::BorderBottomRightRadius
        | PropertyId::BorderBottomLeftRadius => {
            parsers::edges::parse_radius(trimmed, &resolve).is_some()
        }
        PropertyId::Width | PropertyId::Height => {
            parsers::dimensions::parse_box_size(trimmed, &resolve).is_some()
        }
        PropertyId::MinWidth | PropertyId::MinHeight => {
            parsers::dimensions::parse_min_size(trimmed, &resolve).is_some()
        }
        PropertyId::MaxWidth | PropertyId::MaxHeight => {
            parsers::dimensions::parse_max_size(trimmed, &resolve).is_some()
        }
        PropertyId::ZIndex => parsers::layout::parse_z_index(trimmed).is_some(),
        PropertyId::BackgroundImage => parsers::colors::parse_background_images(trimmed).is_some(),
        PropertyId::BackgroundRepeat => {
            parsers::colors::parse_background_repeats(trimmed).is_some()
        }
        PropertyId::BackgroundPosition => {
            parsers::colors::parse_background_positions(trimmed, &resolve).is_some()
        }
        PropertyId::TableLayout => parsers::layout::parse_table_layout(trimmed).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style_model::{Display, LineHeight};
    use crate::values::{Dimension, Rgba};

    fn decls(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn em_lengths_use_own_font_size() {
        let ctx = StyleContext::default();
        let parent = build_computed(&decls(&[("font-size", "20px")]), None, None, &ctx);
        let child = build_computed(
            &decls(&[("font-size", "2em"), ("margin-top", "1em"), ("line-height", "1.5")]),
            Some(&parent),
            Some(20.0),
            &ctx,
        );
        assert!((child.font_size - 40.0).abs() < f32::EPSILON);
        assert_eq!(child.margin.top, Dimension::Px(40.0));
        assert_eq!(child.line_height, LineHeight::Number(1.5));
    }

    #[test]
    fn wide_keywords() {
        let ctx = StyleContext::default();
        let parent = build_computed(
            &decls(&[("display", "block"), ("color", "red"), ("width", "10px")]),
            None,
            None,
            &ctx,
        );
        let child = build_computed(
            &decls(&[("display", "inherit"), ("color", "initial"), ("width", "inherit")]),
            Some(&parent),
            Some(16.0),
            &ctx,
        );
        assert_eq!(child.display, Display::Block);
        assert_eq!(child.color, Rgba::BLACK);
        assert_eq!(child.width, Dimension::Px(10.0));
    }

    #[test]
    fn negative_box_sizes_clamp_to_zero() {
        let ctx = StyleContext::default();
        let style = build_computed(
            &decls(&[("width", "-10px"), ("height", "-5%")]),
            None,
            None,
            &ctx,
        );
        assert_eq!(style.width, Dimension::Px(0.0));
        assert_eq!(style.height, Dimension::Percent(0.0));
    }

    #[test]
    fn validation() {
        assert!(is_valid_value(PropertyId::Width, "50%"));
        assert!(is_valid_value(PropertyId::Width, "-5px"));
        assert!(!is_valid_value(PropertyId::MinWidth, "-5px"));
        assert!(!is_valid_value(PropertyId::Display, "grid-ish"));
        assert!(is_valid_value(PropertyId::Color, "ButtonFace"));
        assert!(!is_valid_value(PropertyId::Color, "1px"));
        assert!(is_valid_value(PropertyId::MarginLeft, "-5px"));
    }
}

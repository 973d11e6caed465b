//! Font, text and list property parsers.

use std::collections::HashMap;

use super::super::ResolveContext;
use super::dimensions::parse_length_percentage;
use super::keyword;
use crate::style_model::{
    ComputedStyle, FontStyle, LineHeight, ListStylePosition, ListStyleType, TextAlign,
    TextDecoration, TextTransform, Visibility, WhiteSpace,
};
use crate::values::{Length, parse_length, parse_url};

/// Absolute-size keywords as multiples of `medium`.
const ABSOLUTE_SIZES: [(&str, f32); 7] = [
    ("xx-small", 3.0 / 5.0),
    ("x-small", 3.0 / 4.0),
    ("small", 8.0 / 9.0),
    ("medium", 1.0),
    ("large", 6.0 / 5.0),
    ("x-large", 3.0 / 2.0),
    ("xx-large", 2.0),
];

/// Parse a CSS font-size. Relative units resolve against the parent's size.
pub fn parse_font_size(value: &str, resolve: &ResolveContext) -> Option<f32> {
    let lowered = keyword(value);
    if let Some((_, factor)) = ABSOLUTE_SIZES.iter().find(|(name, _)| *name == lowered) {
        return Some(resolve.medium_font_size * factor);
    }
    let parent = resolve.parent_font_size;
    let size = match lowered.as_str() {
        "larger" => parent * 1.2,
        "smaller" => parent / 1.2,
        _ => match parse_length(&lowered)? {
            Length::Percent(percent) => parent * percent / 100.0,
            Length::Em(em) => parent * em,
            Length::Ex(ex) => parent * ex * 0.5,
            length => {
                let mut lengths = resolve.lengths;
                lengths.font_size = parent;
                length.to_px(&lengths)?
            }
        },
    };
    (size >= 0.0).then_some(size)
}

pub fn apply_font_size(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    resolve: &ResolveContext,
) {
    if let Some(value) = decls.get("font-size")
        && let Some(size) = parse_font_size(value, resolve)
    {
        computed.font_size = size;
    }
}

/// Numeric weight; `bolder`/`lighter` step from the inherited weight.
pub fn parse_font_weight(value: &str, parent_weight: u16) -> Option<u16> {
    let lowered = keyword(value);
    Some(match lowered.as_str() {
        "normal" => 400,
        "bold" => 700,
        "bolder" => match parent_weight {
            0..=349 => 400,
            350..=549 => 700,
            _ => 900,
        },
        "lighter" => match parent_weight {
            0..=549 => 100,
            550..=749 => 400,
            _ => 700,
        },
        numeric => {
            let weight: u16 = numeric.parse().ok()?;
            if !(1..=1000).contains(&weight) {
                return None;
            }
            weight
        }
    })
}

pub fn parse_font_style(value: &str) -> Option<FontStyle> {
    match keyword(value).as_str() {
        "normal" => Some(FontStyle::Normal),
        "italic" => Some(FontStyle::Italic),
        "oblique" => Some(FontStyle::Oblique),
        _ => None,
    }
}

/// Strip quotes and normalize separators: `"Times New Roman" ,serif` becomes
/// `Times New Roman, serif`.
pub fn normalize_font_family(value: &str) -> String {
    value
        .split(',')
        .map(|family| family.trim().trim_matches(['"', '\'']).trim())
        .filter(|family| !family.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn parse_line_height(value: &str, resolve: &ResolveContext) -> Option<LineHeight> {
    let lowered = keyword(value);
    if lowered == "normal" {
        return Some(LineHeight::Normal);
    }
    if let Ok(number) = lowered.parse::<f32>() {
        return (number >= 0.0 && number.is_finite()).then_some(LineHeight::Number(number));
    }
    let pixels = match parse_length(&lowered)? {
        Length::Percent(percent) => resolve.lengths.font_size * percent / 100.0,
        length => length.to_px(&resolve.lengths)?,
    };
    (pixels >= 0.0).then_some(LineHeight::Px(pixels))
}

pub fn parse_text_align(value: &str) -> Option<TextAlign> {
    match keyword(value).as_str() {
        "left" | "start" => Some(TextAlign::Left),
        "right" | "end" => Some(TextAlign::Right),
        "center" | "middle" => Some(TextAlign::Center),
        "justify" => Some(TextAlign::Justify),
        _ => None,
    }
}

pub fn parse_text_transform(value: &str) -> Option<TextTransform> {
    match keyword(value).as_str() {
        "none" => Some(TextTransform::None),
        "uppercase" => Some(TextTransform::Uppercase),
        "lowercase" => Some(TextTransform::Lowercase),
        "capitalize" => Some(TextTransform::Capitalize),
        _ => None,
    }
}

pub fn parse_text_decoration(value: &str) -> Option<TextDecoration> {
    let lowered = keyword(value);
    let mut decoration = TextDecoration::default();
    if lowered == "none" {
        return Some(decoration);
    }
    for token in lowered.split_ascii_whitespace() {
        match token {
            "underline" => decoration.underline = true,
            "overline" => decoration.overline = true,
            "line-through" => decoration.line_through = true,
            "blink" => {}
            _ => return None,
        }
    }
    (!lowered.is_empty()).then_some(decoration)
}

pub fn parse_white_space(value: &str) -> Option<WhiteSpace> {
    match keyword(value).as_str() {
        "normal" => Some(WhiteSpace::Normal),
        "nowrap" => Some(WhiteSpace::Nowrap),
        "pre" => Some(WhiteSpace::Pre),
        "pre-wrap" => Some(WhiteSpace::PreWrap),
        "pre-line" => Some(WhiteSpace::PreLine),
        _ => None,
    }
}

pub fn parse_visibility(value: &str) -> Option<Visibility> {
    match keyword(value).as_str() {
        "visible" => Some(Visibility::Visible),
        "hidden" => Some(Visibility::Hidden),
        "collapse" => Some(Visibility::Collapse),
        _ => None,
    }
}

pub fn parse_list_style_type(value: &str) -> Option<ListStyleType> {
    match keyword(value).as_str() {
        "none" => Some(ListStyleType::None),
        "disc" => Some(ListStyleType::Disc),
        "circle" => Some(ListStyleType::Circle),
        "square" => Some(ListStyleType::Square),
        "decimal" => Some(ListStyleType::Decimal),
        "decimal-leading-zero" => Some(ListStyleType::DecimalLeadingZero),
        "lower-alpha" | "lower-latin" => Some(ListStyleType::LowerAlpha),
        "upper-alpha" | "upper-latin" => Some(ListStyleType::UpperAlpha),
        "lower-roman" => Some(ListStyleType::LowerRoman),
        "upper-roman" => Some(ListStyleType::UpperRoman),
        _ => None,
    }
}

pub fn parse_list_style_position(value: &str) -> Option<ListStylePosition> {
    match keyword(value).as_str() {
        "outside" => Some(ListStylePosition::Outside),
        "inside" => Some(ListStylePosition::Inside),
        _ => None,
    }
}

/// `none` parses to `Some(None)`.
pub fn parse_list_style_image(value: &str) -> Option<Option<String>> {
    if keyword(value) == "none" {
        return Some(None);
    }
    parse_url(value).map(Some)
}

/// Apply typography and list properties other than font-size.
pub fn apply_typography(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    resolve: &ResolveContext,
) {
    if let Some(value) = decls.get("font-family") {
        let family = normalize_font_family(value);
        if !family.is_empty() {
            computed.font_family = family;
        }
    }
    if let Some(value) = decls.get("font-weight")
        && let Some(weight) = parse_font_weight(value, computed.font_weight)
    {
        computed.font_weight = weight;
    }
    if let Some(style) = decls.get("font-style").and_then(|value| parse_font_style(value)) {
        computed.font_style = style;
    }
    if let Some(value) = decls.get("line-height")
        && let Some(line_height) = parse_line_height(value, resolve)
    {
        computed.line_height = line_height;
    }
    if let Some(align) = decls.get("text-align").and_then(|value| parse_text_align(value)) {
        computed.text_align = align;
    }
    if let Some(value) = decls.get("text-indent")
        && let Some(indent) = parse_length_percentage(value, resolve, true)
    {
        computed.text_indent = indent;
    }
    if let Some(transform) = decls
        .get("text-transform")
        .and_then(|value| parse_text_transform(value))
    {
        computed.text_transform = transform;
    }
    if let Some(decoration) = decls
        .get("text-decoration")
        .and_then(|value| parse_text_decoration(value))
    {
        computed.text_decoration = decoration;
    }
    if let Some(mode) = decls.get("white-space").and_then(|value| parse_white_space(value)) {
        computed.white_space = mode;
    }
    if let Some(visibility) = decls.get("visibility").and_then(|value| parse_visibility(value)) {
        computed.visibility = visibility;
    }
    if let Some(value) = decls.get("cursor") {
        // Only the keyword fallback of a cursor list is used.
        if let Some(cursor) = value.rsplit(',').next().map(keyword)
            && !cursor.is_empty()
        {
            computed.cursor = cursor;
        }
    }
    if let Some(kind) = decls
        .get("list-style-type")
        .and_then(|value| parse_list_style_type(value))
    {
        computed.list_style_type = kind;
    }
    if let Some(position) = decls
        .get("list-style-position")
        .and_then(|value| parse_list_style_position(value))
    {
        computed.list_style_position = position;
    }
    if let Some(image) = decls
        .get("list-style-image")
        .and_then(|value| parse_list_style_image(value))
    {
        computed.list_style_image = image;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleContext;

    #[test]
    fn font_sizes() {
        let resolve = ResolveContext::new(&StyleContext::default(), 20.0, 20.0, 16.0);
        assert_eq!(parse_font_size("medium", &resolve), Some(16.0));
        assert_eq!(parse_font_size("150%", &resolve), Some(30.0));
        assert_eq!(parse_font_size("2em", &resolve), Some(40.0));
        assert_eq!(parse_font_size("1rem", &resolve), Some(16.0));
        assert_eq!(parse_font_size("12pt", &resolve), Some(16.0));
        assert_eq!(parse_font_size("-1px", &resolve), None);
    }

    #[test]
    fn keywords() {
        assert_eq!(parse_font_weight("bolder", 400), Some(700));
        assert_eq!(parse_font_weight("650", 400), Some(650));
        assert_eq!(parse_font_weight("heavy", 400), None);
        assert_eq!(
            parse_text_decoration("underline line-through"),
            Some(TextDecoration {
                underline: true,
                overline: false,
                line_through: true
            })
        );
        assert_eq!(normalize_font_family("\"Times New Roman\" ,serif"), "Times New Roman, serif");
        assert_eq!(parse_list_style_image("none"), Some(None));
    }
}

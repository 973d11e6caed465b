//! Layout keyword parsers: display, positioning, floats, overflow, tables.

use std::collections::HashMap;

use super::super::ResolveContext;
use super::dimensions::parse_length_percentage_auto;
use super::keyword;
use crate::style_model::{
    BorderCollapse, Clear, ComputedStyle, Display, Float, Overflow, Position, TableLayout,
    VerticalAlign,
};
use crate::values::{Length, parse_length};

pub fn parse_display(value: &str) -> Option<Display> {
    Display::from_keyword(&keyword(value))
}

pub fn parse_position(value: &str) -> Option<Position> {
    match keyword(value).as_str() {
        "static" => Some(Position::Static),
        "relative" => Some(Position::Relative),
        "absolute" => Some(Position::Absolute),
        "fixed" => Some(Position::Fixed),
        _ => None,
    }
}

pub fn parse_float(value: &str) -> Option<Float> {
    match keyword(value).as_str() {
        "none" => Some(Float::None),
        "left" => Some(Float::Left),
        "right" => Some(Float::Right),
        _ => None,
    }
}

pub fn parse_clear(value: &str) -> Option<Clear> {
    match keyword(value).as_str() {
        "none" => Some(Clear::None),
        "left" => Some(Clear::Left),
        "right" => Some(Clear::Right),
        "both" => Some(Clear::Both),
        _ => None,
    }
}

pub fn parse_overflow(value: &str) -> Option<Overflow> {
    match keyword(value).as_str() {
        "visible" => Some(Overflow::Visible),
        "hidden" | "clip" => Some(Overflow::Hidden),
        "scroll" => Some(Overflow::Scroll),
        "auto" => Some(Overflow::Auto),
        _ => None,
    }
}

/// Percentages refer to the element's line height.
pub fn parse_vertical_align(
    value: &str,
    resolve: &ResolveContext,
    line_height: f32,
) -> Option<VerticalAlign> {
    let lowered = keyword(value);
    Some(match lowered.as_str() {
        "baseline" => VerticalAlign::Baseline,
        "sub" => VerticalAlign::Sub,
        "super" => VerticalAlign::Super,
        "top" => VerticalAlign::Top,
        "text-top" => VerticalAlign::TextTop,
        "middle" => VerticalAlign::Middle,
        "bottom" => VerticalAlign::Bottom,
        "text-bottom" => VerticalAlign::TextBottom,
        other => match parse_length(other)? {
            Length::Percent(percent) => VerticalAlign::Length(line_height * percent / 100.0),
            length => VerticalAlign::Length(length.to_px(&resolve.lengths)?),
        },
    })
}

/// `auto` parses to `Some(None)`.
pub fn parse_z_index(value: &str) -> Option<Option<i32>> {
    let lowered = keyword(value);
    if lowered == "auto" {
        return Some(None);
    }
    lowered.parse().ok().map(Some)
}

pub fn parse_table_layout(value: &str) -> Option<TableLayout> {
    match keyword(value).as_str() {
        "auto" => Some(TableLayout::Auto),
        "fixed" => Some(TableLayout::Fixed),
        _ => None,
    }
}

pub fn parse_border_collapse(value: &str) -> Option<BorderCollapse> {
    match keyword(value).as_str() {
        "separate" => Some(BorderCollapse::Separate),
        "collapse" => Some(BorderCollapse::Collapse),
        _ => None,
    }
}

/// One value for both axes or horizontal then vertical.
pub fn parse_border_spacing(value: &str, resolve: &ResolveContext) -> Option<(f32, f32)> {
    let mut parts = value.split_ascii_whitespace().map(|part| {
        match parse_length(part)? {
            Length::Percent(_) => None,
            length => length.to_px(&resolve.lengths).filter(|px| *px >= 0.0),
        }
    });
    let horizontal = parts.next()??;
    let vertical = match parts.next() {
        Some(vertical) => vertical?,
        None => horizontal,
    };
    parts.next().is_none().then_some((horizontal, vertical))
}

/// Apply display, positioning, overflow, stacking and table keywords.
pub fn apply_layout_keywords(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    resolve: &ResolveContext,
) {
    if let Some(display) = decls.get("display").and_then(|value| parse_display(value)) {
        computed.display = display;
    }
    if let Some(position) = decls.get("position").and_then(|value| parse_position(value)) {
        computed.position = position;
    }
    if let Some(float) = decls.get("float").and_then(|value| parse_float(value)) {
        computed.float = float;
    }
    if let Some(clear) = decls.get("clear").and_then(|value| parse_clear(value)) {
        computed.clear = clear;
    }
    if let Some(overflow) = decls.get("overflow").and_then(|value| parse_overflow(value)) {
        computed.overflow = overflow;
    }
    let line_height = computed.used_line_height(computed.font_size * 1.2);
    if let Some(value) = decls.get("vertical-align")
        && let Some(align) = parse_vertical_align(value, resolve, line_height)
    {
        computed.vertical_align = align;
    }
    if let Some(z_index) = decls.get("z-index").and_then(|value| parse_z_index(value)) {
        computed.z_index = z_index;
    }
    if let Some(layout) = decls.get("table-layout").and_then(|value| parse_table_layout(value)) {
        computed.table_layout = layout;
    }
    if let Some(collapse) = decls
        .get("border-collapse")
        .and_then(|value| parse_border_collapse(value))
    {
        computed.border_collapse = collapse;
    }
    if let Some(value) = decls.get("border-spacing")
        && let Some(spacing) = parse_border_spacing(value, resolve)
    {
        computed.border_spacing = spacing;
    }
    for (name, slot) in [
        ("top", &mut computed.offsets.top),
        ("right", &mut computed.offsets.right),
        ("bottom", &mut computed.offsets.bottom),
        ("left", &mut computed.offsets.left),
    ] {
        if let Some(offset) = decls
            .get(name)
            .and_then(|value| parse_length_percentage_auto(value, resolve, true))
        {
            *slot = offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleContext;

    #[test]
    fn keywords_and_spacing() {
        let resolve = ResolveContext::new(&StyleContext::default(), 16.0, 16.0, 16.0);
        assert_eq!(parse_display("TABLE-CELL"), Some(Display::TableCell));
        assert_eq!(parse_display("flex"), None);
        assert_eq!(parse_z_index("auto"), Some(None));
        assert_eq!(parse_z_index("-3"), Some(Some(-3)));
        assert_eq!(parse_border_spacing("2px", &resolve), Some((2.0, 2.0)));
        assert_eq!(parse_border_spacing("2px 4px", &resolve), Some((2.0, 4.0)));
        assert_eq!(parse_border_spacing("2px 4px 6px", &resolve), None);
        assert_eq!(
            parse_vertical_align("50%", &resolve, 20.0),
            Some(VerticalAlign::Length(10.0))
        );
    }
}

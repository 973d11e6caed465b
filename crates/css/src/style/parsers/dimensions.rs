//! Width, height, min/max dimension parsers.

use std::collections::HashMap;

use super::super::ResolveContext;
use super::keyword;
use crate::style_model::{BoxSizing, ComputedStyle};
use crate::values::{Dimension, Length, parse_length};

/// `<length-percentage>`, optionally rejecting negative values.
pub fn parse_length_percentage(
    value: &str,
    resolve: &ResolveContext,
    allow_negative: bool,
) -> Option<Dimension> {
    let dimension = match parse_length(value)? {
        Length::Percent(percent) => Dimension::Percent(percent),
        length => Dimension::Px(length.to_px(&resolve.lengths)?),
    };
    let negative = match dimension {
        Dimension::Px(amount) | Dimension::Percent(amount) => amount < 0.0,
        Dimension::Auto => false,
    };
    (allow_negative || !negative).then_some(dimension)
}

pub fn parse_length_percentage_auto(
    value: &str,
    resolve: &ResolveContext,
    allow_negative: bool,
) -> Option<Dimension> {
    if keyword(value) == "auto" {
        return Some(Dimension::Auto);
    }
    parse_length_percentage(value, resolve, allow_negative)
}

/// `width`/`height`: negative lengths are kept as declarations and clamp
/// to zero.
pub fn parse_box_size(value: &str, resolve: &ResolveContext) -> Option<Dimension> {
    let size = match parse_length_percentage_auto(value, resolve, true)? {
        Dimension::Px(amount) => Dimension::Px(amount.max(0.0)),
        Dimension::Percent(percent) => Dimension::Percent(percent.max(0.0)),
        Dimension::Auto => Dimension::Auto,
    };
    Some(size)
}

/// `min-width`/`min-height`; `auto` computes to zero.
pub fn parse_min_size(value: &str, resolve: &ResolveContext) -> Option<Dimension> {
    match parse_length_percentage_auto(value, resolve, false)? {
        Dimension::Auto => Some(Dimension::Px(0.0)),
        other => Some(other),
    }
}

/// `max-width`/`max-height`; `none` parses to `Some(None)`.
pub fn parse_max_size(value: &str, resolve: &ResolveContext) -> Option<Option<Dimension>> {
    if keyword(value) == "none" {
        return Some(None);
    }
    parse_length_percentage(value, resolve, false).map(Some)
}

pub fn parse_box_sizing(value: &str) -> Option<BoxSizing> {
    match keyword(value).as_str() {
        "content-box" => Some(BoxSizing::ContentBox),
        "border-box" => Some(BoxSizing::BorderBox),
        _ => None,
    }
}

/// Parse width/height/min/max and box-sizing.
pub fn apply_dimensions(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    resolve: &ResolveContext,
) {
    let sized = |name: &str| decls.get(name).and_then(|value| parse_box_size(value, resolve));
    if let Some(width) = sized("width") {
        computed.width = width;
    }
    if let Some(height) = sized("height") {
        computed.height = height;
    }
    let min = |name: &str| decls.get(name).and_then(|value| parse_min_size(value, resolve));
    if let Some(min_width) = min("min-width") {
        computed.min_width = min_width;
    }
    if let Some(min_height) = min("min-height") {
        computed.min_height = min_height;
    }
    let max = |name: &str| decls.get(name).and_then(|value| parse_max_size(value, resolve));
    if let Some(max_width) = max("max-width") {
        computed.max_width = max_width;
    }
    if let Some(max_height) = max("max-height") {
        computed.max_height = max_height;
    }
    if let Some(sizing) = decls.get("box-sizing").and_then(|value| parse_box_sizing(value)) {
        computed.box_sizing = sizing;
    }
}

//! Margin, padding, border and border-radius parsers.

use std::collections::HashMap;

use super::super::ResolveContext;
use super::dimensions::{parse_length_percentage, parse_length_percentage_auto};
use super::keyword;
use crate::style_model::{BorderStyle, ComputedStyle};
use crate::values::{Length, parse_color, parse_length};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

pub fn parse_border_width(value: &str, resolve: &ResolveContext) -> Option<f32> {
    let width = match keyword(value).as_str() {
        "thin" => 1.0,
        "medium" => 3.0,
        "thick" => 5.0,
        other => match parse_length(other)? {
            Length::Percent(_) => return None,
            length => length.to_px(&resolve.lengths)?,
        },
    };
    (width >= 0.0).then_some(width)
}

pub fn parse_border_style(value: &str) -> Option<BorderStyle> {
    BorderStyle::from_keyword(&keyword(value))
}

/// Corner radius in pixels. Percentages are not supported.
pub fn parse_radius(value: &str, resolve: &ResolveContext) -> Option<f32> {
    // The vertical radius of an elliptical corner is ignored.
    let horizontal = value.split_ascii_whitespace().next()?;
    match parse_length(horizontal)? {
        Length::Percent(_) => None,
        length => length.to_px(&resolve.lengths).filter(|radius| *radius >= 0.0),
    }
}

/// Apply margins, padding, borders and radii.
pub fn apply_edges_and_borders(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    resolve: &ResolveContext,
) {
    for side in SIDES {
        let margin = decls
            .get(&format!("margin-{side}"))
            .and_then(|value| parse_length_percentage_auto(value, resolve, true));
        let padding = decls
            .get(&format!("padding-{side}"))
            .and_then(|value| parse_length_percentage(value, resolve, false));
        let width = decls
            .get(&format!("border-{side}-width"))
            .and_then(|value| parse_border_width(value, resolve));
        let style = decls
            .get(&format!("border-{side}-style"))
            .and_then(|value| parse_border_style(value));
        let color = decls.get(&format!("border-{side}-color")).and_then(|value| {
            if keyword(value) == "currentcolor" {
                Some(None)
            } else {
                parse_color(value, resolve.colors).map(Some)
            }
        });

        let (margin_slot, padding_slot, border_slot) = match side {
            "top" => (
                &mut computed.margin.top,
                &mut computed.padding.top,
                &mut computed.border.top,
            ),
            "right" => (
                &mut computed.margin.right,
                &mut computed.padding.right,
                &mut computed.border.right,
            ),
            "bottom" => (
                &mut computed.margin.bottom,
                &mut computed.padding.bottom,
                &mut computed.border.bottom,
            ),
            _ => (
                &mut computed.margin.left,
                &mut computed.padding.left,
                &mut computed.border.left,
            ),
        };
        if let Some(margin) = margin {
            *margin_slot = margin;
        }
        if let Some(padding) = padding {
            *padding_slot = padding;
        }
        if let Some(width) = width {
            border_slot.width = width;
        }
        if let Some(style) = style {
            border_slot.style = style;
        }
        if let Some(color) = color {
            border_slot.color = color;
        }
    }

    let radius = |name: &str| decls.get(name).and_then(|value| parse_radius(value, resolve));
    if let Some(value) = radius("border-top-left-radius") {
        computed.border_radius.top_left = value;
    }
    if let Some(value) = radius("border-top-right-radius") {
        computed.border_radius.top_right = value;
    }
    if let Some(value) = radius("border-bottom-right-radius") {
        computed.border_radius.bottom_right = value;
    }
    if let Some(value) = radius("border-bottom-left-radius") {
        computed.border_radius.bottom_left = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleContext;
    use crate::values::{Dimension, Rgba};

    #[test]
    fn sides_and_borders() {
        let resolve = ResolveContext::new(&StyleContext::default(), 10.0, 10.0, 16.0);
        let decls: HashMap<String, String> = [
            ("margin-left", "auto"),
            ("padding-top", "2em"),
            ("padding-bottom", "-1px"),
            ("border-right-width", "thick"),
            ("border-right-style", "dashed"),
            ("border-right-color", "#ff0000"),
            ("border-top-left-radius", "4px 8px"),
        ]
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
        let mut computed = ComputedStyle::initial("serif", 10.0);
        apply_edges_and_borders(&mut computed, &decls, &resolve);
        assert_eq!(computed.margin.left, Dimension::Auto);
        assert_eq!(computed.padding.top, Dimension::Px(20.0));
        assert_eq!(computed.padding.bottom, Dimension::Px(0.0));
        assert_eq!(computed.border.right.style, BorderStyle::Dashed);
        assert_eq!(computed.border.right.color, Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(computed.border_widths().right, 5.0);
        assert_eq!(computed.border_widths().left, 0.0);
        assert_eq!(computed.border_radius.top_left, 4.0);
    }
}

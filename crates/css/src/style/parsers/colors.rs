//! Color and background property parsers.

use std::collections::HashMap;

use super::super::ResolveContext;
use super::keyword;
use crate::properties::split_layers;
use crate::style_model::{BackgroundLayer, BackgroundRepeat, ComputedStyle};
use crate::values::{Dimension, Length, parse_color, parse_length, parse_url};

/// Comma-separated image list; `none` layers are kept as `None` so
/// repeat and position lists stay aligned.
pub fn parse_background_images(value: &str) -> Option<Vec<Option<String>>> {
    split_layers(value)
        .into_iter()
        .map(|layer| {
            if keyword(layer) == "none" {
                Some(None)
            } else {
                parse_url(layer).map(Some)
            }
        })
        .collect()
}

pub fn parse_background_repeats(value: &str) -> Option<Vec<BackgroundRepeat>> {
    split_layers(value)
        .into_iter()
        .map(|layer| match keyword(layer).as_str() {
            "repeat" | "repeat repeat" => Some(BackgroundRepeat::Repeat),
            "repeat-x" | "repeat no-repeat" => Some(BackgroundRepeat::RepeatX),
            "repeat-y" | "no-repeat repeat" => Some(BackgroundRepeat::RepeatY),
            "no-repeat" | "no-repeat no-repeat" => Some(BackgroundRepeat::NoRepeat),
            _ => None,
        })
        .collect()
}

fn position_component(token: &str, resolve: &ResolveContext) -> Option<Dimension> {
    match keyword(token).as_str() {
        "left" | "top" => Some(Dimension::Percent(0.0)),
        "center" => Some(Dimension::Percent(50.0)),
        "right" | "bottom" => Some(Dimension::Percent(100.0)),
        other => match parse_length(other)? {
            Length::Percent(percent) => Some(Dimension::Percent(percent)),
            length => length.to_px(&resolve.lengths).map(Dimension::Px),
        },
    }
}

fn is_vertical_keyword(token: &str) -> bool {
    matches!(keyword(token).as_str(), "top" | "bottom")
}

fn is_horizontal_keyword(token: &str) -> bool {
    matches!(keyword(token).as_str(), "left" | "right")
}

/// One `(x, y)` pair per layer. A single value sets x and centers y, unless
/// it is `top`/`bottom`.
pub fn parse_background_positions(
    value: &str,
    resolve: &ResolveContext,
) -> Option<Vec<(Dimension, Dimension)>> {
    split_layers(value)
        .into_iter()
        .map(|layer| {
            let tokens: Vec<&str> = layer.split_ascii_whitespace().collect();
            match tokens.as_slice() {
                [single] if is_vertical_keyword(single) => Some((
                    Dimension::Percent(50.0),
                    position_component(single, resolve)?,
                )),
                [single] => Some((
                    position_component(single, resolve)?,
                    Dimension::Percent(50.0),
                )),
                [first, second] if is_vertical_keyword(first) || is_horizontal_keyword(second) => {
                    Some((
                        position_component(second, resolve)?,
                        position_component(first, resolve)?,
                    ))
                }
                [first, second] => Some((
                    position_component(first, resolve)?,
                    position_component(second, resolve)?,
                )),
                _ => None,
            }
        })
        .collect()
}

/// Apply `color`, `background-color` and the background layer lists.
pub fn apply_colors(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    resolve: &ResolveContext,
) {
    if let Some(value) = decls.get("color") {
        // `currentColor` on `color` itself keeps the inherited value.
        if keyword(value) != "currentcolor"
            && let Some(color) = parse_color(value, resolve.colors)
        {
            computed.color = color;
        }
    }
    if let Some(value) = decls.get("background-color") {
        if keyword(value) == "currentcolor" {
            computed.background_color = computed.color;
        } else if let Some(color) = parse_color(value, resolve.colors) {
            computed.background_color = color;
        }
    }

    let Some(images) = decls
        .get("background-image")
        .and_then(|value| parse_background_images(value))
    else {
        return;
    };
    let repeats = decls
        .get("background-repeat")
        .and_then(|value| parse_background_repeats(value))
        .unwrap_or_default();
    let positions = decls
        .get("background-position")
        .and_then(|value| parse_background_positions(value, resolve))
        .unwrap_or_default();
    computed.background_layers = images
        .into_iter()
        .enumerate()
        .filter_map(|(index, image)| {
            let image = image?;
            let repeat = cycle(&repeats, index).copied().unwrap_or_default();
            let (position_x, position_y) = cycle(&positions, index)
                .copied()
                .unwrap_or((Dimension::Percent(0.0), Dimension::Percent(0.0)));
            Some(BackgroundLayer {
                image,
                repeat,
                position_x,
                position_y,
            })
        })
        .collect();
}

/// Shorter lists repeat to match the number of image layers.
fn cycle<T>(items: &[T], index: usize) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(index % items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleContext;
    use crate::values::Rgba;

    #[test]
    fn layers_align_with_images() {
        let resolve = ResolveContext::new(&StyleContext::default(), 16.0, 16.0, 16.0);
        let decls: HashMap<String, String> = [
            ("color", "rgb(0, 128, 0)"),
            ("background-color", "currentColor"),
            ("background-image", "url(a.png), none, url(\"b.png\")"),
            ("background-repeat", "no-repeat, repeat-x"),
            ("background-position", "right top"),
        ]
        .iter()
        .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
        .collect();
        let mut computed = ComputedStyle::initial("serif", 16.0);
        apply_colors(&mut computed, &decls, &resolve);
        assert_eq!(computed.background_color, Rgba::new(0, 128, 0, 255));
        assert_eq!(computed.background_layers.len(), 2);
        let first = &computed.background_layers[0];
        assert_eq!(first.image, "a.png");
        assert_eq!(first.repeat, BackgroundRepeat::NoRepeat);
        assert_eq!(first.position_x, Dimension::Percent(100.0));
        assert_eq!(first.position_y, Dimension::Percent(0.0));
        // Third list entry cycles back to the first repeat value.
        assert_eq!(computed.background_layers[1].image, "b.png");
        assert_eq!(computed.background_layers[1].repeat, BackgroundRepeat::NoRepeat);
    }
}

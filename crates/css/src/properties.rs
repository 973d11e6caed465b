//! Property table and shorthand expansion.
//! Spec: <https://www.w3.org/TR/CSS21/propidx.html>

use crate::values::split_value_tokens;

/// Longhand properties the engine computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyId {
    Color,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    LineHeight,
    TextAlign,
    TextIndent,
    TextTransform,
    TextDecoration,
    WhiteSpace,
    Visibility,
    Cursor,
    ListStyleType,
    ListStylePosition,
    ListStyleImage,
    BorderCollapse,
    BorderSpacing,
    Display,
    Position,
    Float,
    Clear,
    Overflow,
    BoxSizing,
    VerticalAlign,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderTopStyle,
    BorderRightStyle,
    BorderBottomStyle,
    BorderLeftStyle,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomRightRadius,
    BorderBottomLeftRadius,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    Top,
    Right,
    Bottom,
    Left,
    ZIndex,
    BackgroundColor,
    BackgroundImage,
    BackgroundRepeat,
    BackgroundPosition,
    TableLayout,
}

/// Name, id and inherited flag of every longhand.
const LONGHANDS: &[(&str, PropertyId, bool)] = &[
    ("color", PropertyId::Color, true),
    ("font-family", PropertyId::FontFamily, true),
    ("font-size", PropertyId::FontSize, true),
    ("font-weight", PropertyId::FontWeight, true),
    ("font-style", PropertyId::FontStyle, true),
    ("line-height", PropertyId::LineHeight, true),
    ("text-align", PropertyId::TextAlign, true),
    ("text-indent", PropertyId::TextIndent, true),
    ("text-transform", PropertyId::TextTransform, true),
    ("text-decoration", PropertyId::TextDecoration, true),
    ("white-space", PropertyId::WhiteSpace, true),
    ("visibility", PropertyId::Visibility, true),
    ("cursor", PropertyId::Cursor, true),
    ("list-style-type", PropertyId::ListStyleType, true),
    ("list-style-position", PropertyId::ListStylePosition, true),
    ("list-style-image", PropertyId::ListStyleImage, true),
    ("border-collapse", PropertyId::BorderCollapse, true),
    ("border-spacing", PropertyId::BorderSpacing, true),
    ("display", PropertyId::Display, false),
    ("position", PropertyId::Position, false),
    ("float", PropertyId::Float, false),
    ("clear", PropertyId::Clear, false),
    ("overflow", PropertyId::Overflow, false),
    ("box-sizing", PropertyId::BoxSizing, false),
    ("vertical-align", PropertyId::VerticalAlign, false),
    ("margin-top", PropertyId::MarginTop, false),
    ("margin-right", PropertyId::MarginRight, false),
    ("margin-bottom", PropertyId::MarginBottom, false),
    ("margin-left", PropertyId::MarginLeft, false),
    ("padding-top", PropertyId::PaddingTop, false),
    ("padding-right", PropertyId::PaddingRight, false),
    ("padding-bottom", PropertyId::PaddingBottom, false),
    ("padding-left", PropertyId::PaddingLeft, false),
    ("border-top-width", PropertyId::BorderTopWidth, false),
    ("border-right-width", PropertyId::BorderRightWidth, false),
    ("border-bottom-width", PropertyId::BorderBottomWidth, false),
    ("border-left-width", PropertyId::BorderLeftWidth, false),
    ("border-top-style", PropertyId::BorderTopStyle, false),
    ("border-right-style", PropertyId::BorderRightStyle, false),
    ("border-bottom-style", PropertyId::BorderBottomStyle, false),
    ("border-left-style", PropertyId::BorderLeftStyle, false),
    ("border-top-color", PropertyId::BorderTopColor, false),
    ("border-right-color", PropertyId::BorderRightColor, false),
    ("border-bottom-color", PropertyId::BorderBottomColor, false),
    ("border-left-color", PropertyId::BorderLeftColor, false),
    ("border-top-left-radius", PropertyId::BorderTopLeftRadius, false),
    ("border-top-right-radius", PropertyId::BorderTopRightRadius, false),
    ("border-bottom-right-radius", PropertyId::BorderBottomRightRadius, false),
    ("border-bottom-left-radius", PropertyId::BorderBottomLeftRadius, false),
    ("width", PropertyId::Width, false),
    ("height", PropertyId::Height, false),
    ("min-width", PropertyId::MinWidth, false),
    ("min-height", PropertyId::MinHeight, false),
    ("max-width", PropertyId::MaxWidth, false),
    ("max-height", PropertyId::MaxHeight, false),
    ("top", PropertyId::Top, false),
    ("right", PropertyId::Right, false),
    ("bottom", PropertyId::Bottom, false),
    ("left", PropertyId::Left, false),
    ("z-index", PropertyId::ZIndex, false),
    ("background-color", PropertyId::BackgroundColor, false),
    ("background-image", PropertyId::BackgroundImage, false),
    ("background-repeat", PropertyId::BackgroundRepeat, false),
    ("background-position", PropertyId::BackgroundPosition, false),
    ("table-layout", PropertyId::TableLayout, false),
];

impl PropertyId {
    pub fn from_name(name: &str) -> Option<Self> {
        LONGHANDS
            .iter()
            .find(|(candidate, _, _)| *candidate == name)
            .map(|(_, id, _)| *id)
    }

    pub fn name(self) -> &'static str {
        LONGHANDS
            .iter()
            .find(|(_, id, _)| *id == self)
            .map_or("", |(name, _, _)| name)
    }

    pub fn is_inherited(self) -> bool {
        LONGHANDS
            .iter()
            .any(|(_, id, inherited)| *id == self && *inherited)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        LONGHANDS.iter().map(|(_, id, _)| *id)
    }
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];
const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

/// Expand a declaration into longhand `(property, value)` pairs.
///
/// Longhands pass through; unknown properties yield nothing. A CSS-wide
/// keyword on a shorthand is copied to each of its longhands. Components a
/// shorthand leaves out are reset to their initial values.
pub fn expand_declaration(name: &str, value: &str) -> Vec<(PropertyId, String)> {
    if let Some(id) = PropertyId::from_name(name) {
        return vec![(id, value.trim().to_owned())];
    }
    let value = value.trim();
    let longhands = shorthand_longhands(name);
    if longhands.is_empty() {
        log::trace!("ignoring unknown property {name:?}");
        return Vec::new();
    }
    if is_wide_keyword(value) {
        return longhands
            .iter()
            .filter_map(|longhand| PropertyId::from_name(longhand))
            .map(|id| (id, value.to_ascii_lowercase()))
            .collect();
    }
    let pairs = match name {
        "margin" | "padding" => four_sides(name, "", value),
        "border-width" => four_sides("border", "-width", value),
        "border-style" => four_sides("border", "-style", value),
        "border-color" => four_sides("border", "-color", value),
        "border" => expand_border(&SIDES, value),
        "border-top" => expand_border(&["top"], value),
        "border-right" => expand_border(&["right"], value),
        "border-bottom" => expand_border(&["bottom"], value),
        "border-left" => expand_border(&["left"], value),
        "border-radius" => expand_radius(value),
        "background" => expand_background(value),
        "font" => expand_font(value),
        "list-style" => expand_list_style(value),
        _ => Vec::new(),
    };
    pairs
        .into_iter()
        .filter_map(|(longhand, component)| {
            PropertyId::from_name(&longhand).map(|id| (id, component))
        })
        .collect()
}

fn is_wide_keyword(value: &str) -> bool {
    value.eq_ignore_ascii_case("inherit") || value.eq_ignore_ascii_case("initial")
}

fn shorthand_longhands(name: &str) -> Vec<String> {
    let sided = |prefix: &str, suffix: &str| {
        SIDES
            .iter()
            .map(|side| format!("{prefix}-{side}{suffix}"))
            .collect::<Vec<_>>()
    };
    match name {
        "margin" | "padding" => sided(name, ""),
        "border-width" => sided("border", "-width"),
        "border-style" => sided("border", "-style"),
        "border-color" => sided("border", "-color"),
        "border" => ["-width", "-style", "-color"]
            .iter()
            .flat_map(|suffix| sided("border", suffix))
            .collect(),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            ["-width", "-style", "-color"]
                .iter()
                .map(|suffix| format!("{name}{suffix}"))
                .collect()
        }
        "border-radius" => CORNERS
            .iter()
            .map(|corner| format!("border-{corner}-radius"))
            .collect(),
        "background" => [
            "background-color",
            "background-image",
            "background-repeat",
            "background-position",
        ]
        .map(str::to_owned)
        .to_vec(),
        "font" => [
            "font-style",
            "font-weight",
            "font-size",
            "line-height",
            "font-family",
        ]
        .map(str::to_owned)
        .to_vec(),
        "list-style" => ["list-style-type", "list-style-position", "list-style-image"]
            .map(str::to_owned)
            .to_vec(),
        _ => Vec::new(),
    }
}

/// `margin: 1px 2px` style one-to-four value expansion.
fn four_sides(prefix: &str, suffix: &str, value: &str) -> Vec<(String, String)> {
    let parts = split_value_tokens(value);
    let pick = |index: usize| -> Option<&str> {
        let chosen = match (parts.len(), index) {
            (1, _) | (2, 0 | 2) | (3 | 4, 0) => 0,
            (2, _) | (3, 1 | 3) => 1,
            (3, 2) => 2,
            (4, _) => index,
            _ => return None,
        };
        parts.get(chosen).copied()
    };
    SIDES
        .iter()
        .enumerate()
        .filter_map(|(index, side)| {
            pick(index).map(|part| (format!("{prefix}-{side}{suffix}"), part.to_owned()))
        })
        .collect()
}

const BORDER_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

fn is_border_width(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "thin" | "medium" | "thick"
    ) || crate::values::parse_length(token).is_some()
}

/// `border: 1px solid red` in any component order.
fn expand_border(sides: &[&str], value: &str) -> Vec<(String, String)> {
    let mut width = "medium".to_owned();
    let mut style = "none".to_owned();
    let mut color = "currentcolor".to_owned();
    for token in split_value_tokens(value) {
        let lowered = token.to_ascii_lowercase();
        if BORDER_STYLES.contains(&lowered.as_str()) {
            style = lowered;
        } else if is_border_width(token) {
            token.clone_into(&mut width);
        } else {
            token.clone_into(&mut color);
        }
    }
    sides
        .iter()
        .flat_map(|side| {
            [
                (format!("border-{side}-width"), width.clone()),
                (format!("border-{side}-style"), style.clone()),
                (format!("border-{side}-color"), color.clone()),
            ]
        })
        .collect()
}

/// Only the horizontal radii are kept; elliptical corners use them for both axes.
fn expand_radius(value: &str) -> Vec<(String, String)> {
    let horizontal = value.split('/').next().unwrap_or_default();
    four_sides("border", "", horizontal)
        .into_iter()
        .zip(CORNERS)
        .map(|((_, radius), corner)| (format!("border-{corner}-radius"), radius))
        .collect()
}

/// `background: <color> url(...) <repeat> <position>`. Comma-separated
/// layers share the final layer's color.
fn expand_background(value: &str) -> Vec<(String, String)> {
    let mut color = "transparent".to_owned();
    let mut images = Vec::new();
    let mut repeats = Vec::new();
    let mut positions = Vec::new();
    for layer in split_layers(value) {
        let mut image = "none".to_owned();
        let mut repeat = "repeat".to_owned();
        let mut position: Vec<&str> = Vec::new();
        for token in split_value_tokens(layer) {
            let lowered = token.to_ascii_lowercase();
            if lowered.starts_with("url(") || lowered == "none" {
                token.clone_into(&mut image);
            } else if matches!(
                lowered.as_str(),
                "repeat" | "repeat-x" | "repeat-y" | "no-repeat"
            ) {
                repeat = lowered;
            } else if matches!(
                lowered.as_str(),
                "left" | "right" | "top" | "bottom" | "center"
            ) || crate::values::parse_length(token).is_some()
            {
                position.push(token);
            } else if !matches!(lowered.as_str(), "scroll" | "fixed" | "local") {
                token.clone_into(&mut color);
            }
        }
        images.push(image);
        repeats.push(repeat);
        positions.push(if position.is_empty() {
            "0% 0%".to_owned()
        } else {
            position.join(" ")
        });
    }
    vec![
        ("background-color".to_owned(), color),
        ("background-image".to_owned(), images.join(", ")),
        ("background-repeat".to_owned(), repeats.join(", ")),
        ("background-position".to_owned(), positions.join(", ")),
    ]
}

/// Split on commas outside parentheses.
pub fn split_layers(value: &str) -> Vec<&str> {
    let mut layers = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;
    for (index, ch) in value.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth <= 0 => {
                layers.push(value.get(start..index).unwrap_or_default().trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    layers.push(value.get(start..).unwrap_or_default().trim());
    layers
}

/// `font: italic bold 12px/1.5 "Helvetica", sans-serif`.
fn expand_font(value: &str) -> Vec<(String, String)> {
    let tokens = split_value_tokens(value);
    let mut style = "normal".to_owned();
    let mut weight = "normal".to_owned();
    let mut size_index = None;
    for (index, token) in tokens.iter().enumerate() {
        let lowered = token.to_ascii_lowercase();
        match lowered.as_str() {
            "italic" | "oblique" => style.clone_from(&lowered),
            "bold" | "bolder" | "lighter" | "100" | "200" | "300" | "400" | "500" | "600"
            | "700" | "800" | "900" => weight.clone_from(&lowered),
            "normal" | "small-caps" => {}
            _ => {
                size_index = Some(index);
                break;
            }
        }
    }
    // Size and family are mandatory; without them the declaration is invalid.
    let Some(size_index) = size_index else {
        return Vec::new();
    };
    let Some(size_token) = tokens.get(size_index) else {
        return Vec::new();
    };
    let (size, mut line_height) = match size_token.split_once('/') {
        Some((size, line)) => (size.to_owned(), Some(line.to_owned())),
        None => ((*size_token).to_owned(), None),
    };
    let mut family_start = size_index + 1;
    if line_height.as_deref() == Some("")
        && let Some(next) = tokens.get(family_start)
    {
        line_height = Some((*next).to_owned());
        family_start += 1;
    } else if let Some(next) = tokens.get(family_start)
        && let Some(line) = next.strip_prefix('/')
    {
        line_height = if line.is_empty() {
            family_start += 1;
            tokens.get(family_start).map(|token| (*token).to_owned())
        } else {
            Some(line.to_owned())
        };
        family_start += 1;
    }
    let family = tokens.get(family_start..).unwrap_or_default().join(" ");
    if family.is_empty() {
        return Vec::new();
    }
    vec![
        ("font-style".to_owned(), style),
        ("font-weight".to_owned(), weight),
        ("font-size".to_owned(), size),
        (
            "line-height".to_owned(),
            line_height.unwrap_or_else(|| "normal".to_owned()),
        ),
        ("font-family".to_owned(), family),
    ]
}

fn expand_list_style(value: &str) -> Vec<(String, String)> {
    let mut kind = "disc".to_owned();
    let mut position = "outside".to_owned();
    let mut image = "none".to_owned();
    for token in split_value_tokens(value) {
        let lowered = token.to_ascii_lowercase();
        if lowered == "inside" || lowered == "outside" {
            position = lowered;
        } else if lowered.starts_with("url(") {
            token.clone_into(&mut image);
        } else {
            kind = lowered;
        }
    }
    vec![
        ("list-style-type".to_owned(), kind),
        ("list-style-position".to_owned(), position),
        ("list-style-image".to_owned(), image),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(name: &str, value: &str) -> Vec<(&'static str, String)> {
        expand_declaration(name, value)
            .into_iter()
            .map(|(id, value)| (id.name(), value))
            .collect()
    }

    #[test]
    fn table_is_consistent() {
        for id in PropertyId::all() {
            assert_eq!(PropertyId::from_name(id.name()), Some(id));
        }
        assert!(PropertyId::Color.is_inherited());
        assert!(!PropertyId::MarginTop.is_inherited());
    }

    #[test]
    fn box_shorthands() {
        let margin = expanded("margin", "1px 2px 3px");
        assert_eq!(
            margin,
            vec![
                ("margin-top", "1px".to_owned()),
                ("margin-right", "2px".to_owned()),
                ("margin-bottom", "3px".to_owned()),
                ("margin-left", "2px".to_owned()),
            ]
        );
        let border = expanded("border-left", "red 2px dashed");
        assert_eq!(
            border,
            vec![
                ("border-left-width", "2px".to_owned()),
                ("border-left-style", "dashed".to_owned()),
                ("border-left-color", "red".to_owned()),
            ]
        );
        assert_eq!(expanded("border", "inherit").len(), 12);
        assert!(expanded("unknown-thing", "1px").is_empty());
    }

    #[test]
    fn font_shorthand() {
        let font = expanded("font", "italic bold 12px/1.5 \"Times New Roman\", serif");
        assert!(font.contains(&("font-style", "italic".to_owned())));
        assert!(font.contains(&("font-weight", "bold".to_owned())));
        assert!(font.contains(&("font-size", "12px".to_owned())));
        assert!(font.contains(&("line-height", "1.5".to_owned())));
        assert!(font.contains(&("font-family", "\"Times New Roman\", serif".to_owned())));
        assert!(expanded("font", "bold").is_empty());
    }

    #[test]
    fn background_layers() {
        let background = expanded("background", "url(a.png) no-repeat right top, #fff");
        assert!(background.contains(&("background-color", "#fff".to_owned())));
        assert!(background.contains(&("background-image", "url(a.png), none".to_owned())));
        assert!(background.contains(&("background-repeat", "no-repeat, repeat".to_owned())));
    }
}

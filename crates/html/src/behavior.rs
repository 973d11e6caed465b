//! Per-tag behaviors run by the builder once an element is complete.
//!
//! Dispatch is a closed enum looked up from the element kind; hooks never
//! call out to the embedder directly. They report [`DocumentEvent`]s which the
//! document controller applies in order.

use crate::dom::{Dom, ElementKind, NodeId};

/// Behavior attached to an element at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagBehavior {
    #[default]
    None,
    /// `<base href>` sets the document base URL.
    BaseUrl,
    /// `<body>` is recorded as the document body.
    BodyMarker,
    /// `<title>` text becomes the document caption.
    TitleCapture,
    /// `<style>` text is registered as an author stylesheet.
    StyleRegister,
    /// `<link rel=stylesheet>` is imported through the backend.
    LinkRegister,
    /// `<p align>` and friends turn `align` into `text-align`.
    AlignMapper,
}

impl TagBehavior {
    pub const fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Base => Self::BaseUrl,
            ElementKind::Body => Self::BodyMarker,
            ElementKind::Title => Self::TitleCapture,
            ElementKind::Style => Self::StyleRegister,
            ElementKind::Link => Self::LinkRegister,
            ElementKind::Paragraph
            | ElementKind::Div
            | ElementKind::Heading
            | ElementKind::TableCaption => Self::AlignMapper,
            _ => Self::None,
        }
    }
}

/// Document-level side effects discovered while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    BaseUrl(String),
    Body(NodeId),
    Title(String),
    InlineStylesheet {
        node: NodeId,
        text: String,
        media: Option<String>,
    },
    LinkedStylesheet {
        node: NodeId,
        href: String,
        media: Option<String>,
    },
}

/// Run the element's behavior hook and derive its presentational hints.
pub fn on_element_complete(dom: &mut Dom, node: NodeId) -> Option<DocumentEvent> {
    let hints = presentational_hints(dom, node);
    dom.element_mut(node)?.hints = hints;
    let element = dom.element(node)?;
    match element.behavior {
        TagBehavior::None | TagBehavior::AlignMapper => None,
        TagBehavior::BaseUrl => element
            .attr("href")
            .map(|href| DocumentEvent::BaseUrl(href.trim().to_owned())),
        TagBehavior::BodyMarker => Some(DocumentEvent::Body(node)),
        TagBehavior::TitleCapture => {
            let text = dom.text_content(node);
            Some(DocumentEvent::Title(
                text.split_whitespace().collect::<Vec<_>>().join(" "),
            ))
        }
        TagBehavior::StyleRegister => {
            let media = element.attr("media").map(str::to_owned);
            Some(DocumentEvent::InlineStylesheet {
                node,
                text: dom.text_content(node),
                media,
            })
        }
        TagBehavior::LinkRegister => {
            let is_stylesheet = element.attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"))
            });
            let href = element.attr("href")?.trim();
            if !is_stylesheet || href.is_empty() {
                return None;
            }
            Some(DocumentEvent::LinkedStylesheet {
                node,
                href: href.to_owned(),
                media: element.attr("media").map(str::to_owned),
            })
        }
    }
}

/// Map legacy presentational attributes to CSS declarations.
fn presentational_hints(dom: &Dom, node: NodeId) -> Vec<(String, String)> {
    let Some(element) = dom.element(node) else {
        return Vec::new();
    };
    let mut hints = Vec::new();
    let mut push = |name: &str, value: String| hints.push((name.to_owned(), value));

    if element.behavior == TagBehavior::AlignMapper
        && let Some(align) = element.attr("align")
    {
        push("text-align", align.trim().to_ascii_lowercase());
    }

    match element.kind {
        ElementKind::Table => {
            if let Some(width) = element.attr("width") {
                push("width", dimension(width));
            }
            if let Some(border) = element.attr("border") {
                let width = pixels(border).unwrap_or(1);
                push("border", format!("{width}px outset gray"));
            }
            if let Some(spacing) = element.attr("cellspacing").and_then(pixels) {
                push("border-spacing", format!("{spacing}px"));
            }
            if let Some(color) = element.attr("bgcolor") {
                push("background-color", color.trim().to_owned());
            }
            if let Some(align) = element.attr("align") {
                match align.trim().to_ascii_lowercase().as_str() {
                    "center" => {
                        push("margin-left", "auto".to_owned());
                        push("margin-right", "auto".to_owned());
                    }
                    "left" => push("float", "left".to_owned()),
                    "right" => push("float", "right".to_owned()),
                    _ => {}
                }
            }
        }
        ElementKind::TableDataCell | ElementKind::TableHeaderCell | ElementKind::TableRow => {
            if let Some(align) = element.attr("align") {
                push("text-align", align.trim().to_ascii_lowercase());
            }
            if let Some(valign) = element.attr("valign") {
                push("vertical-align", valign.trim().to_ascii_lowercase());
            }
            if let Some(color) = element.attr("bgcolor") {
                push("background-color", color.trim().to_owned());
            }
            if element.kind != ElementKind::TableRow {
                if let Some(width) = element.attr("width") {
                    push("width", dimension(width));
                }
                if let Some(height) = element.attr("height") {
                    push("height", dimension(height));
                }
                if element.attr("nowrap").is_some() {
                    push("white-space", "nowrap".to_owned());
                }
                let table = dom.ancestors(node).find(|ancestor| {
                    dom.element(*ancestor)
                        .is_some_and(|candidate| candidate.kind == ElementKind::Table)
                });
                if let Some(table) = table.and_then(|table| dom.element(table)) {
                    if let Some(padding) = table.attr("cellpadding").and_then(pixels) {
                        push("padding", format!("{padding}px"));
                    }
                    if table.attr("border").and_then(pixels).is_some_and(|width| width > 0) {
                        push("border", "1px inset gray".to_owned());
                    }
                }
            }
        }
        ElementKind::Image => {
            if let Some(width) = element.attr("width") {
                push("width", dimension(width));
            }
            if let Some(height) = element.attr("height") {
                push("height", dimension(height));
            }
        }
        ElementKind::Body => {
            if let Some(color) = element.attr("bgcolor") {
                push("background-color", color.trim().to_owned());
            }
            if let Some(color) = element.attr("text") {
                push("color", color.trim().to_owned());
            }
        }
        ElementKind::Font => {
            if let Some(color) = element.attr("color") {
                push("color", color.trim().to_owned());
            }
            if let Some(face) = element.attr("face") {
                push("font-family", face.trim().to_owned());
            }
            if let Some(size) = element.attr("size").and_then(font_size_keyword) {
                push("font-size", size.to_owned());
            }
        }
        ElementKind::HorizontalRule => {
            if let Some(width) = element.attr("width") {
                push("width", dimension(width));
            }
            if let Some(size) = element.attr("size").and_then(pixels) {
                push("height", format!("{size}px"));
            }
        }
        ElementKind::OrderedList | ElementKind::UnorderedList | ElementKind::ListItem => {
            if let Some(kind) = element.attr("type").and_then(list_type) {
                push("list-style-type", kind.to_owned());
            }
        }
        _ => {}
    }
    hints
}

/// `"50%"` stays a percentage, bare numbers become pixels.
fn dimension(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.ends_with('%') {
        trimmed.to_owned()
    } else {
        pixels(trimmed).map_or_else(|| trimmed.to_owned(), |px| format!("{px}px"))
    }
}

fn pixels(value: &str) -> Option<i32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|ch| ch.is_ascii_digit() || *ch == '-')
        .collect();
    digits.parse().ok()
}

fn font_size_keyword(value: &str) -> Option<&'static str> {
    const SIZES: [&str; 7] = [
        "x-small", "small", "medium", "large", "x-large", "xx-large", "xx-large",
    ];
    let trimmed = value.trim();
    let parsed: i32 = trimmed.trim_start_matches(['+', '-']).parse().ok()?;
    let absolute = if trimmed.starts_with('+') {
        3 + parsed
    } else if trimmed.starts_with('-') {
        3 - parsed
    } else {
        parsed
    };
    let index = usize::try_from(absolute.clamp(1, 7) - 1).ok()?;
    SIZES.get(index).copied()
}

fn list_type(value: &str) -> Option<&'static str> {
    Some(match value.trim() {
        "1" => "decimal",
        "a" => "lower-alpha",
        "A" => "upper-alpha",
        "i" => "lower-roman",
        "I" => "upper-roman",
        "disc" => "disc",
        "circle" => "circle",
        "square" => "square",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_lookup_follows_kind() {
        assert_eq!(TagBehavior::for_kind(ElementKind::Title), TagBehavior::TitleCapture);
        assert_eq!(TagBehavior::for_kind(ElementKind::Paragraph), TagBehavior::AlignMapper);
        assert_eq!(TagBehavior::for_kind(ElementKind::Span), TagBehavior::None);
    }

    #[test]
    fn legacy_sizes() {
        assert_eq!(dimension("120"), "120px");
        assert_eq!(dimension(" 50% "), "50%");
        assert_eq!(font_size_keyword("+1"), Some("large"));
        assert_eq!(font_size_keyword("1"), Some("x-small"));
        assert_eq!(list_type("I"), Some("upper-roman"));
    }
}

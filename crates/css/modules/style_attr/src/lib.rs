//! CSS Style Attributes: style="..." attribute processing.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

#![forbid(unsafe_code)]

use std::collections::HashMap;

pub use css_syntax::Declaration;

/// Parse the value of a `style` attribute into a list of declarations.
///
/// The attribute is parsed as a declaration block with the tokenizer-backed
/// parser from the syntax module, so quoted semicolons, comments and
/// `!important` behave the same as inside a stylesheet rule. Invalid items
/// are skipped; the remaining declarations keep source order.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    css_syntax::parse_declaration_list(input)
}

/// Parse and keep only the effective declaration for each property: the last
/// one, unless an earlier occurrence is `!important` and the later is not.
///
/// Spec: <https://www.w3.org/TR/css-cascade-4/#cascade-sort>
pub fn normalize_style_attribute(input: &str) -> Vec<Declaration> {
    let declarations = parse_style_attribute(input);
    let mut winner_for_property: HashMap<&str, usize> = HashMap::new();
    for (index, decl_item) in declarations.iter().enumerate() {
        let replace = winner_for_property
            .get(decl_item.name.as_str())
            .and_then(|&previous| declarations.get(previous))
            .is_none_or(|previous| decl_item.important || !previous.important);
        if replace {
            winner_for_property.insert(decl_item.name.as_str(), index);
        }
    }
    let mut keep: Vec<usize> = winner_for_property.into_values().collect();
    keep.sort_unstable();
    keep.into_iter()
        .filter_map(|index| declarations.get(index).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_attribute() {
        assert!(parse_style_attribute("  ").is_empty());
    }

    #[test]
    fn quoted_semicolons_survive() {
        let decls = parse_style_attribute("font-family: \"a;b\", serif; COLOR: Red");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "\"a;b\", serif");
        assert_eq!(decls[1].name, "color");
        assert_eq!(decls[1].value, "Red");
    }

    #[test]
    fn last_wins_unless_important() {
        let decls =
            normalize_style_attribute("color: red !important; width: 1px; color: blue; width: 2px");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "red");
        assert!(decls[0].important);
        assert_eq!(decls[1].value, "2px");
    }
}

//! CSS selector matching engine.
//! Spec: <https://www.w3.org/TR/selectors-3/>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, ElementAdapter, PseudoClass,
    SelectorList, SimpleSelector,
};

/// Match a selector list against an element.
/// Spec: Section 3, 4
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element.
/// Spec: Section 3, 11, Right-to-left matching strategy
///
/// Descendant and general-sibling combinators backtrack, so a nearer
/// candidate that fails further left does not hide a farther one that works.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    if !matches_compound(adapter, element, sel.subject()) {
        return false;
    }
    matches_leftwards(adapter, element, sel, sel.rest.len())
}

/// `position` indexes the compound already matched by `element`: 0 is
/// `sel.first`, `k` is `sel.rest[k - 1]`.
fn matches_leftwards<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    position: usize,
) -> bool {
    if position == 0 {
        return true;
    }
    let Some((combinator, _)) = sel.rest.get(position - 1) else {
        return false;
    };
    let left = if position == 1 {
        &sel.first
    } else {
        match sel.rest.get(position - 2) {
            Some(pair) => &pair.1,
            None => return false,
        }
    };
    let try_candidate = |candidate: A::Handle| {
        matches_compound(adapter, candidate, left)
            && matches_leftwards(adapter, candidate, sel, position - 1)
    };
    match combinator {
        Combinator::Child => adapter.parent(element).is_some_and(try_candidate),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(try_candidate),
        Combinator::Descendant => {
            let mut current = adapter.parent(element);
            while let Some(ancestor) = current {
                if try_candidate(ancestor) {
                    return true;
                }
                current = adapter.parent(ancestor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut current = adapter.previous_sibling_element(element);
            while let Some(sibling) = current {
                if try_candidate(sibling) {
                    return true;
                }
                current = adapter.previous_sibling_element(sibling);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
/// Spec: Section 5–8
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(adapter, element, simple))
}

fn matches_simple<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    simple: &SimpleSelector,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element) == type_name.as_str(),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => {
            adapter.element_id(element) == Some(id_value.as_str())
        }
        SimpleSelector::Attribute {
            name,
            operator,
            value,
        } => adapter
            .attr(element, name)
            .is_some_and(|actual| matches_attribute(*operator, actual, value)),
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo(adapter, element, pseudo),
        SimpleSelector::Negation(inner) => !matches_simple(adapter, element, inner),
        SimpleSelector::PseudoElement(_) => false,
    }
}

/// Spec: Section 6.3.1, 6.3.2, attribute presence, value and substring matching
fn matches_attribute(operator: AttrOperator, actual: &str, expected: &str) -> bool {
    match operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        AttrOperator::Includes => {
            !expected.is_empty() && actual.split_ascii_whitespace().any(|token| token == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

/// 1-based position among element siblings, counted from the start or the end,
/// optionally restricted to siblings with the same tag name.
fn sibling_position<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    from_end: bool,
    same_type: bool,
) -> i32 {
    let tag = adapter.tag_name(element);
    let step = |handle: A::Handle| {
        if from_end {
            adapter.next_sibling_element(handle)
        } else {
            adapter.previous_sibling_element(handle)
        }
    };
    let mut position = 1_i32;
    let mut current = step(element);
    while let Some(sibling) = current {
        if !same_type || adapter.tag_name(sibling) == tag {
            position = position.saturating_add(1);
        }
        current = step(sibling);
    }
    position
}

/// Spec: Section 6.6, Pseudo-classes
fn matches_pseudo<A: ElementAdapter>(adapter: &A, element: A::Handle, pseudo: &PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Root => adapter.is_root(element),
        PseudoClass::FirstChild => adapter.previous_sibling_element(element).is_none(),
        PseudoClass::LastChild => adapter.next_sibling_element(element).is_none(),
        PseudoClass::OnlyChild => {
            adapter.previous_sibling_element(element).is_none()
                && adapter.next_sibling_element(element).is_none()
        }
        PseudoClass::NthChild(nth) => nth.matches(sibling_position(adapter, element, false, false)),
        PseudoClass::NthLastChild(nth) => {
            nth.matches(sibling_position(adapter, element, true, false))
        }
        PseudoClass::FirstOfType => sibling_position(adapter, element, false, true) == 1,
        PseudoClass::LastOfType => sibling_position(adapter, element, true, true) == 1,
        PseudoClass::Empty => adapter.is_empty(element),
        PseudoClass::Link => adapter.is_link(element),
        PseudoClass::Hover => adapter.is_hovered(element),
        PseudoClass::Active => adapter.is_active(element),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_operators() {
        assert!(matches_attribute(AttrOperator::Includes, "a b c", "b"));
        assert!(!matches_attribute(AttrOperator::Includes, "abc", "b"));
        assert!(matches_attribute(AttrOperator::DashMatch, "en-US", "en"));
        assert!(!matches_attribute(AttrOperator::DashMatch, "english", "en"));
        assert!(matches_attribute(AttrOperator::Prefix, "http://x", "http"));
        assert!(matches_attribute(AttrOperator::Suffix, "doc.pdf", ".pdf"));
        assert!(!matches_attribute(AttrOperator::Substring, "abc", ""));
    }
}

//! Selectors Level 3: Element matching and specificity.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! This module implements the selector subset used by the style engine:
//! - Type, universal, class, id and attribute selectors (all six operators)
//! - Structural and dynamic pseudo-classes, including `:not()` of a simple selector
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Specificity calculation
//!
//! Items cite the section of Selectors Level 3 they follow.

mod matcher;
mod parser;
mod specificity;

// Re-export public API
pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{SelectorError, parse_complex_selector, parse_selector_list};
pub use specificity::{Specificity, specificity_of_complex, specificity_of_compound};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// Spec references:
/// - Section 3: Selectors overview and element matching
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any.
    /// Spec: Section 11, Combinators (for tree relationships)
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element (skip non-elements if your DOM has mixed nodes).
    /// Spec: Section 11, Sibling combinators
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling element.
    /// Spec: Section 6.6.5, Structural pseudo-classes
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase (per HTML parsing conventions).
    /// Spec: Section 5, Type selectors
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    /// Spec: Section 7, ID selectors
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token.
    /// Spec: Section 6, Class selectors
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    /// Spec: Section 8, Attribute selectors
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True if the element has neither element children nor text.
    /// Spec: Section 6.6.5.9, `:empty`
    fn is_empty(&self, element: Self::Handle) -> bool;

    /// Spec: Section 6.6.5.1, `:root`
    fn is_root(&self, element: Self::Handle) -> bool {
        self.parent(element).is_none()
    }

    /// Spec: Section 6.6.1, `:link`
    fn is_link(&self, element: Self::Handle) -> bool {
        matches!(self.tag_name(element), "a" | "area" | "link") && self.attr(element, "href").is_some()
    }

    /// Spec: Section 6.6.1.2, `:hover`
    fn is_hovered(&self, _element: Self::Handle) -> bool {
        false
    }

    /// Spec: Section 6.6.1.2, `:active`
    fn is_active(&self, _element: Self::Handle) -> bool {
        false
    }
}

/// Attribute selector operators.
/// Spec: Section 6.3, Attribute selectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[name]`
    Exists,
    /// `[name=value]`
    Equals,
    /// `[name~=value]`
    Includes,
    /// `[name|=value]`
    DashMatch,
    /// `[name^=value]`
    Prefix,
    /// `[name$=value]`
    Suffix,
    /// `[name*=value]`
    Substring,
}

/// `an+b` from `:nth-child()` and friends.
/// Spec: Section 6.6.5.2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NthExpr {
    pub step: i32,
    pub offset: i32,
}

impl NthExpr {
    /// Whether a 1-based position satisfies `an+b` for some n >= 0.
    pub const fn matches(self, position: i32) -> bool {
        if self.step == 0 {
            return position == self.offset;
        }
        let delta = position - self.offset;
        delta % self.step == 0 && delta / self.step >= 0
    }
}

/// Pseudo-classes.
/// Spec: Section 6.6
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(NthExpr),
    NthLastChild(NthExpr),
    FirstOfType,
    LastOfType,
    Empty,
    Link,
    Hover,
    Active,
}

/// Simple selectors.
/// Spec: Section 5, 6, 7, 8
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Spec: Section 5, Type selectors
    Type(String),
    /// Spec: Section 6, Class selectors
    Class(String),
    /// Spec: Section 7, ID selectors
    IdSelector(String),
    /// Spec: Section 8, Attribute selectors
    Attribute {
        name: String,
        operator: AttrOperator,
        value: String,
    },
    /// Spec: Section 6.6
    PseudoClass(PseudoClass),
    /// `:not(simple)`.
    /// Spec: Section 6.6.7, The negation pseudo-class
    Negation(Box<Self>),
    /// `::before`, `::first-line`, ... Parsed for specificity, never matches an element.
    /// Spec: Section 7, Pseudo-elements
    PseudoElement(String),
    /// Universal selector '*'.
    /// Spec: Section 5, Universal selector
    Universal,
}

/// A compound selector is a sequence of simple selectors (no combinators).
/// Spec: Section 5, Simple selector sequences
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
/// Spec: Section 11, Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
/// `first` is the left-most compound; `rest` continues to the right, so the
/// subject is the last compound.
/// Spec: Section 3, 11
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// The compound that must match the element itself.
    pub fn subject(&self) -> &CompoundSelector {
        self.rest.last().map_or(&self.first, |pair| &pair.1)
    }

    fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        core::iter::once(&self.first).chain(self.rest.iter().map(|pair| &pair.1))
    }

    /// True if any compound uses `:hover`.
    pub fn uses_hover(&self) -> bool {
        self.compounds()
            .any(|compound| compound.contains_pseudo(&PseudoClass::Hover))
    }

    /// True if any compound uses `:active`.
    pub fn uses_active(&self) -> bool {
        self.compounds()
            .any(|compound| compound.contains_pseudo(&PseudoClass::Active))
    }

    /// True if the subject is a pseudo-element, which never matches an element.
    pub fn targets_pseudo_element(&self) -> bool {
        self.subject()
            .simples
            .iter()
            .any(|simple| matches!(simple, SimpleSelector::PseudoElement(_)))
    }
}

impl CompoundSelector {
    fn contains_pseudo(&self, wanted: &PseudoClass) -> bool {
        self.simples.iter().any(|simple| match simple {
            SimpleSelector::PseudoClass(pseudo) => pseudo == wanted,
            SimpleSelector::Negation(inner) => {
                matches!(inner.as_ref(), SimpleSelector::PseudoClass(pseudo) if pseudo == wanted)
            }
            _ => false,
        })
    }
}

/// A selector list separated by commas.
/// Spec: Section 4, Groups of selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

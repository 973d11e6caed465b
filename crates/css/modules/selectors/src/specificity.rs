//! CSS selector specificity calculation.
//! Spec: <https://www.w3.org/TR/selectors-3/#specificity>

use crate::{ComplexSelector, CompoundSelector, SimpleSelector};

/// Specificity triple (a, b, c).
/// Spec: Section 13, Calculating a selector's specificity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16);

impl Specificity {
    fn add(self, other: Self) -> Self {
        Self(
            self.0.saturating_add(other.0),
            self.1.saturating_add(other.1),
            self.2.saturating_add(other.2),
        )
    }
}

/// Specificity contribution of a single simple selector.
/// Spec: Section 13, the negation pseudo-class counts as its argument
fn specificity_of_simple(simple: &SimpleSelector) -> Specificity {
    match simple {
        SimpleSelector::IdSelector(_) => Specificity(1, 0, 0),
        SimpleSelector::Class(_)
        | SimpleSelector::Attribute { .. }
        | SimpleSelector::PseudoClass(_) => Specificity(0, 1, 0),
        SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => Specificity(0, 0, 1),
        SimpleSelector::Negation(inner) => specificity_of_simple(inner),
        SimpleSelector::Universal => Specificity::default(),
    }
}

/// Compute the specificity of a compound selector.
/// Spec: Section 13, Specificity (a, b, c)
pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    compound
        .simples
        .iter()
        .map(specificity_of_simple)
        .fold(Specificity::default(), Specificity::add)
}

/// Compute the specificity of a complex selector (sum of its compounds).
/// Spec: Section 13, Specificity accumulation
pub fn specificity_of_complex(sel: &ComplexSelector) -> Specificity {
    sel.rest
        .iter()
        .map(|pair| specificity_of_compound(&pair.1))
        .fold(specificity_of_compound(&sel.first), Specificity::add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_complex_selector;

    fn of(text: &str) -> Specificity {
        parse_complex_selector(text)
            .map(|sel| specificity_of_complex(&sel))
            .unwrap_or_default()
    }

    #[test]
    fn ordering_follows_selectors_level_3() {
        assert_eq!(of("*"), Specificity(0, 0, 0));
        assert_eq!(of("li"), Specificity(0, 0, 1));
        assert_eq!(of("ul li"), Specificity(0, 0, 2));
        assert_eq!(of("ul ol+li"), Specificity(0, 0, 3));
        assert_eq!(of("h1 + *[rel=up]"), Specificity(0, 1, 1));
        assert_eq!(of("ul ol li.red"), Specificity(0, 1, 3));
        assert_eq!(of("li.red.level"), Specificity(0, 2, 1));
        assert_eq!(of("#x34y"), Specificity(1, 0, 0));
        assert_eq!(of("#s12:not(FOO)"), Specificity(1, 0, 1));
        assert_eq!(of("a:hover"), Specificity(0, 1, 1));
        assert!(of("#a") > of(".a.b.c.d"));
    }
}

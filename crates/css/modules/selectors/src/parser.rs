//! CSS selector parsing.
//! Spec: <https://www.w3.org/TR/selectors-3/>

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, NthExpr, PseudoClass,
    SelectorList, SimpleSelector,
};
use core::mem::take;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
pub enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A simple selector token (type, class, id, attribute, universal, pseudo).
    Simple(SimpleSelector),
}

/// Reasons a selector is rejected. Invalid selectors are dropped by callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorError {
    UnexpectedByte(u8),
    EmptyName,
    UnterminatedAttribute,
    UnknownPseudoClass(String),
    BadNthExpression(String),
    DanglingCombinator,
    Empty,
}

/// Tokenizer over a selector string.
pub struct SelectorTokenizer<'input> {
    /// Underlying bytes for the selector.
    input_bytes: &'input [u8],
    /// Current cursor index into `input_bytes`.
    index: usize,
}

impl<'input> SelectorTokenizer<'input> {
    /// Construct a tokenizer from input.
    #[inline]
    pub(crate) fn new(input: &'input str) -> Self {
        Self {
            input_bytes: input.as_bytes(),
            index: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input_bytes.get(self.index).copied()
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Return the next selector token, if any.
    #[inline]
    pub(crate) fn next(&mut self) -> Option<Result<Tok, SelectorError>> {
        let saw_whitespace = self.skip_whitespace();
        let current = self.peek()?;
        if saw_whitespace {
            return Some(Ok(Tok::DescendantWS));
        }
        Some(match current {
            b'*' => {
                self.bump();
                Ok(Tok::Simple(SimpleSelector::Universal))
            }
            b'.' => {
                self.bump();
                self.consume_name(false)
                    .map(|name| Tok::Simple(SimpleSelector::Class(name)))
            }
            b'#' => {
                self.bump();
                self.consume_name(false)
                    .map(|name| Tok::Simple(SimpleSelector::IdSelector(name)))
            }
            b'[' => self.consume_attr().map(Tok::Simple),
            b':' => self.consume_pseudo().map(Tok::Simple),
            b'>' => {
                self.bump();
                Ok(Tok::Combinator(Combinator::Child))
            }
            b'+' => {
                self.bump();
                Ok(Tok::Combinator(Combinator::AdjacentSibling))
            }
            b'~' => {
                self.bump();
                Ok(Tok::Combinator(Combinator::GeneralSibling))
            }
            byte if is_name_byte(byte) => self
                .consume_name(true)
                .map(|name| Tok::Simple(SimpleSelector::Type(name))),
            byte => Err(SelectorError::UnexpectedByte(byte)),
        })
    }

    /// Skip whitespace, reporting whether any was present. Whitespace between
    /// compounds is a descendant combinator.
    #[inline]
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        self.skip_spaces();
        self.index > start
    }

    /// Consume an identifier consisting of name bytes (ASCII alphanumerics, '-',
    /// '_' and any non-ASCII), optionally lowercased.
    #[inline]
    fn consume_name(&mut self, lowercase: bool) -> Result<String, SelectorError> {
        let start = self.index;
        while self.peek().is_some_and(is_name_byte) {
            self.bump();
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        if slice.is_empty() {
            return Err(SelectorError::EmptyName);
        }
        let text = String::from_utf8_lossy(slice);
        Ok(if lowercase {
            text.to_ascii_lowercase()
        } else {
            text.into_owned()
        })
    }

    /// Parse an attribute selector: `[name]` or `[name op value]` where op is
    /// one of `= ~= |= ^= $= *=` and value is quoted or an identifier.
    #[inline]
    fn consume_attr(&mut self) -> Result<SimpleSelector, SelectorError> {
        // skip '['
        self.bump();
        self.skip_spaces();
        let name = self.consume_name(true)?;
        self.skip_spaces();
        let operator = match self.peek() {
            Some(b']') => {
                self.bump();
                return Ok(SimpleSelector::Attribute {
                    name,
                    operator: AttrOperator::Exists,
                    value: String::new(),
                });
            }
            Some(b'=') => AttrOperator::Equals,
            Some(b'~') => AttrOperator::Includes,
            Some(b'|') => AttrOperator::DashMatch,
            Some(b'^') => AttrOperator::Prefix,
            Some(b'$') => AttrOperator::Suffix,
            Some(b'*') => AttrOperator::Substring,
            Some(byte) => return Err(SelectorError::UnexpectedByte(byte)),
            None => return Err(SelectorError::UnterminatedAttribute),
        };
        self.bump();
        if operator != AttrOperator::Equals {
            if self.peek() != Some(b'=') {
                return Err(SelectorError::UnterminatedAttribute);
            }
            self.bump();
        }
        self.skip_spaces();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.bump();
                self.consume_quoted_attr_value(quote)?
            }
            _ => self.consume_name(false)?,
        };
        self.skip_spaces();
        if self.peek() != Some(b']') {
            return Err(SelectorError::UnterminatedAttribute);
        }
        self.bump();
        Ok(SimpleSelector::Attribute {
            name,
            operator,
            value,
        })
    }

    /// Consume a quoted attribute value until the matching quote byte.
    #[inline]
    fn consume_quoted_attr_value(&mut self, quote: u8) -> Result<String, SelectorError> {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte != quote) {
            self.bump();
        }
        if self.peek().is_none() {
            return Err(SelectorError::UnterminatedAttribute);
        }
        let slice = self.input_bytes.get(start..self.index).unwrap_or(&[]);
        let out = String::from_utf8_lossy(slice).into_owned();
        self.bump();
        Ok(out)
    }

    /// Parse `:name`, `:name(args)` or `::name`.
    fn consume_pseudo(&mut self) -> Result<SimpleSelector, SelectorError> {
        // skip ':'
        self.bump();
        if self.peek() == Some(b':') {
            self.bump();
            return self.consume_name(true).map(SimpleSelector::PseudoElement);
        }
        let name = self.consume_name(true)?;
        if self.peek() == Some(b'(') {
            self.bump();
            let start = self.index;
            let mut depth = 1_u32;
            while let Some(byte) = self.peek() {
                if byte == b'(' {
                    depth += 1;
                } else if byte == b')' {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                self.bump();
            }
            if self.peek() != Some(b')') {
                return Err(SelectorError::UnterminatedAttribute);
            }
            let args = String::from_utf8_lossy(self.input_bytes.get(start..self.index).unwrap_or(&[]))
                .trim()
                .to_owned();
            self.bump();
            return functional_pseudo(&name, &args);
        }
        // Legacy single-colon pseudo-elements.
        if matches!(name.as_str(), "before" | "after" | "first-line" | "first-letter") {
            return Ok(SimpleSelector::PseudoElement(name));
        }
        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "empty" => PseudoClass::Empty,
            "link" => PseudoClass::Link,
            "hover" => PseudoClass::Hover,
            "active" => PseudoClass::Active,
            _ => return Err(SelectorError::UnknownPseudoClass(name)),
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    /// Skip ASCII whitespace.
    #[inline]
    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
    }
}

const fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

fn functional_pseudo(name: &str, args: &str) -> Result<SimpleSelector, SelectorError> {
    match name {
        "nth-child" => parse_nth(args).map(|nth| SimpleSelector::PseudoClass(PseudoClass::NthChild(nth))),
        "nth-last-child" => {
            parse_nth(args).map(|nth| SimpleSelector::PseudoClass(PseudoClass::NthLastChild(nth)))
        }
        "not" => {
            let mut inner = SelectorTokenizer::new(args);
            let first = match inner.next() {
                Some(Ok(Tok::Simple(simple))) => simple,
                Some(Err(error)) => return Err(error),
                _ => return Err(SelectorError::Empty),
            };
            if inner.next().is_some() || matches!(first, SimpleSelector::Negation(_) | SimpleSelector::PseudoElement(_)) {
                return Err(SelectorError::UnknownPseudoClass(format!("not({args})")));
            }
            Ok(SimpleSelector::Negation(Box::new(first)))
        }
        _ => Err(SelectorError::UnknownPseudoClass(format!("{name}()"))),
    }
}

/// Parse the `an+b` micro-syntax.
/// Spec: Section 6.6.5.2
fn parse_nth(args: &str) -> Result<NthExpr, SelectorError> {
    let bad = || SelectorError::BadNthExpression(args.to_owned());
    let compact: String = args
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "odd" => return Ok(NthExpr { step: 2, offset: 1 }),
        "even" => return Ok(NthExpr { step: 2, offset: 0 }),
        _ => {}
    }
    let Some(n_pos) = compact.find('n') else {
        return compact
            .parse()
            .map(|offset| NthExpr { step: 0, offset })
            .map_err(|_| bad());
    };
    let (step_text, rest) = compact.split_at(n_pos);
    let step = match step_text {
        "" | "+" => 1,
        "-" => -1,
        other => other.parse().map_err(|_| bad())?,
    };
    let offset_text = rest.get(1..).unwrap_or_default();
    let offset = if offset_text.is_empty() {
        0
    } else {
        offset_text
            .trim_start_matches('+')
            .parse()
            .map_err(|_| bad())?
    };
    Ok(NthExpr { step, offset })
}

/// Parse a selector list from CSS text, dropping any member that fails to parse.
/// Spec: Section 3, 4, 5–8, 11
pub fn parse_selector_list(input: &str) -> SelectorList {
    let mut list = SelectorList::default();
    for part in split_top_level_commas(input) {
        match parse_complex_selector(part.trim()) {
            Ok(sel) => list.selectors.push(sel),
            Err(error) => log::debug!("dropping selector {part:?}: {error:?}"),
        }
    }
    list
}

/// Split on commas that are not inside brackets, parentheses or quotes.
fn split_top_level_commas(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(input.get(start..index).unwrap_or_default());
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(input.get(start..).unwrap_or_default());
    parts
}

/// Parse one complex selector.
/// Spec: Section 11, Combinators; Section 5–8, simple selectors
///
/// # Errors
/// Returns a [`SelectorError`] when the text is not a valid selector.
pub fn parse_complex_selector(input: &str) -> Result<ComplexSelector, SelectorError> {
    let mut tokens = SelectorTokenizer::new(input.trim());
    let mut current = CompoundSelector::default();
    let mut first: Option<CompoundSelector> = None;
    let mut rest: Vec<(Combinator, CompoundSelector)> = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next() {
        match token? {
            Tok::Combinator(comb) => {
                if current.simples.is_empty() {
                    // `a > > b`, `> a` or `a + ~ b`
                    if first.is_none() || !matches!(pending_combinator, None | Some(Combinator::Descendant)) {
                        return Err(SelectorError::DanglingCombinator);
                    }
                    pending_combinator = Some(comb);
                    continue;
                }
                if first.is_none() {
                    first = Some(take(&mut current));
                } else {
                    rest.push((
                        pending_combinator.unwrap_or(Combinator::Descendant),
                        take(&mut current),
                    ));
                }
                pending_combinator = Some(comb);
            }
            Tok::DescendantWS => {
                if !current.simples.is_empty() {
                    if first.is_none() {
                        first = Some(take(&mut current));
                    } else {
                        rest.push((
                            pending_combinator.take().unwrap_or(Combinator::Descendant),
                            take(&mut current),
                        ));
                    }
                    pending_combinator = Some(Combinator::Descendant);
                }
            }
            Tok::Simple(simple) => current.simples.push(simple),
        }
    }

    if current.simples.is_empty() {
        return match (first, pending_combinator) {
            (Some(_), Some(comb)) if comb != Combinator::Descendant => {
                Err(SelectorError::DanglingCombinator)
            }
            (Some(first), _) => Ok(ComplexSelector { first, rest }),
            (None, _) => Err(SelectorError::Empty),
        };
    }
    match first {
        None => Ok(ComplexSelector {
            first: current,
            rest,
        }),
        Some(first) => {
            rest.push((pending_combinator.unwrap_or(Combinator::Descendant), current));
            Ok(ComplexSelector { first, rest })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_forms() {
        assert_eq!(parse_nth("odd"), Ok(NthExpr { step: 2, offset: 1 }));
        assert_eq!(parse_nth("2n + 1"), Ok(NthExpr { step: 2, offset: 1 }));
        assert_eq!(parse_nth("-n+3"), Ok(NthExpr { step: -1, offset: 3 }));
        assert_eq!(parse_nth("n"), Ok(NthExpr { step: 1, offset: 0 }));
        assert_eq!(parse_nth("4"), Ok(NthExpr { step: 0, offset: 4 }));
        assert!(parse_nth("x").is_err());
    }

    #[test]
    fn combinators_and_whitespace() {
        let sel = parse_complex_selector("div  >  p.note  span").unwrap_or_default();
        assert_eq!(sel.first.simples, vec![SimpleSelector::Type("div".to_owned())]);
        assert_eq!(sel.rest.len(), 2);
        assert_eq!(sel.rest[0].0, Combinator::Child);
        assert_eq!(
            sel.rest[0].1.simples,
            vec![
                SimpleSelector::Type("p".to_owned()),
                SimpleSelector::Class("note".to_owned())
            ]
        );
        assert_eq!(sel.rest[1].0, Combinator::Descendant);
    }

    #[test]
    fn class_names_keep_case() {
        let sel = parse_complex_selector("DIV.Note#Main").unwrap_or_default();
        assert_eq!(
            sel.first.simples,
            vec![
                SimpleSelector::Type("div".to_owned()),
                SimpleSelector::Class("Note".to_owned()),
                SimpleSelector::IdSelector("Main".to_owned()),
            ]
        );
    }

    #[test]
    fn attribute_operators() {
        let sel = parse_complex_selector("a[href^='http'][lang|=en][title]").unwrap_or_default();
        let operators: Vec<_> = sel
            .first
            .simples
            .iter()
            .filter_map(|simple| match simple {
                SimpleSelector::Attribute { operator, .. } => Some(*operator),
                _ => None,
            })
            .collect();
        assert_eq!(
            operators,
            vec![AttrOperator::Prefix, AttrOperator::DashMatch, AttrOperator::Exists]
        );
    }

    #[test]
    fn invalid_members_are_dropped() {
        let list = parse_selector_list("p, div >, :unknown, [x, a:not(.b)");
        assert_eq!(list.selectors.len(), 2);
        assert!(parse_complex_selector("> p").is_err());
        assert!(parse_complex_selector("p {").is_err());
    }
}

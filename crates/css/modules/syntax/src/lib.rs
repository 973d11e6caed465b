//! CSS Syntax Module Level 3: Parsing and tokenization.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Produces a raw rule tree: selector preludes and declaration values are kept
//! as text and interpreted by the selector and property layers.
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

/// A single style rule with a raw prelude and parsed declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (typically the selector list).
    pub prelude: String,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
}

/// Rules the engine understands. Unknown at-rules are dropped while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssRule {
    Style(StyleRule),
    /// `@media <query> { ... }` with its nested rules.
    Media { query: String, rules: Vec<CssRule> },
    /// `@import url(...) <media>;`
    Import { url: String, media: String },
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    /// All style rules, flattened out of `@media` blocks, with the media
    /// query text that guards each (innermost last).
    pub fn style_rules(&self) -> Vec<(&StyleRule, Vec<&str>)> {
        let mut out = Vec::new();
        collect_style_rules(&self.rules, &mut Vec::new(), &mut out);
        out
    }
}

fn collect_style_rules<'sheet>(
    rules: &'sheet [CssRule],
    media: &mut Vec<&'sheet str>,
    out: &mut Vec<(&'sheet StyleRule, Vec<&'sheet str>)>,
) {
    for rule in rules {
        match rule {
            CssRule::Style(style) => out.push((style, media.clone())),
            CssRule::Media { query, rules } => {
                media.push(query);
                collect_style_rules(rules, media, out);
                media.pop();
            }
            CssRule::Import { .. } => {}
        }
    }
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind('!')
        && let Some(tail) = trimmed.get(pos + 1..)
        && tail.trim().eq_ignore_ascii_case("important")
        && let Some(prefix) = trimmed.get(..pos)
    {
        let head = prefix.trim_end();
        return (head.to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Collects `name: value` pairs from a rule body, rejecting nested rules.
struct DeclarationCollector;

impl CssDeclarationParser<'_> for DeclarationCollector {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        // The value runs to the end of the declaration item.
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);
        let (value, important) = split_important_tail(raw);
        if value.is_empty() {
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value,
            important,
        })
    }
}

impl CssAtRuleParser<'_> for DeclarationCollector {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        _name: CowRcStr<'input>,
        _input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// At-rule preludes the top-level parser keeps.
enum AtPrelude {
    Media(String),
    Import { url: String, media: String },
}

/// Top-level parser that builds `CssRule` items.
struct TopLevelParser;

impl CssAtRuleParser<'_> for TopLevelParser {
    type Prelude = AtPrelude;
    type AtRule = CssRule;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        if name.eq_ignore_ascii_case("media") {
            let start = input.position();
            while input.next().is_ok() {}
            return Ok(AtPrelude::Media(input.slice_from(start).trim().to_owned()));
        }
        if name.eq_ignore_ascii_case("import") {
            let url = input.expect_url_or_string()?.as_ref().to_owned();
            let start = input.position();
            while input.next().is_ok() {}
            return Ok(AtPrelude::Import {
                url,
                media: input.slice_from(start).trim().to_owned(),
            });
        }
        log::debug!("skipping unsupported at-rule @{name}");
        Err(input.new_error(BasicParseErrorKind::AtRuleInvalid(name)))
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        match prelude {
            AtPrelude::Media(query) => {
                let mut nested = TopLevelParser;
                let rules = StyleSheetParser::new(input, &mut nested)
                    .flatten()
                    .filter(|rule| !matches!(rule, CssRule::Import { .. }))
                    .collect();
                Ok(CssRule::Media { query, rules })
            }
            AtPrelude::Import { .. } => {
                Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
            }
        }
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        match prelude {
            AtPrelude::Import { url, media } => Ok(CssRule::Import { url, media }),
            AtPrelude::Media(_) => Err(()),
        }
    }
}

impl CssQualifiedRuleParser<'_> for TopLevelParser {
    type Prelude = String; // raw selector/prelude
    type QualifiedRule = CssRule;
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        let start = input.state();
        while input.next_including_whitespace_and_comments().is_ok() {}
        Ok(input.slice_from(start.position()).trim().to_owned())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        let decls = parse_declarations_from_block(input);
        Ok(CssRule::Style(StyleRule {
            prelude,
            declarations: decls,
        }))
    }
}

/// Parse declarations from a rule block using `cssparser` body parser.
fn parse_declarations_from_block(block: &mut Parser) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    let mut body = DeclarationCollector;
    for decl in CssRuleBodyParser::new(block, &mut body).flatten() {
        out.push(decl);
    }
    out
}

/// Parse a full stylesheet into a `Stylesheet` using cssparser.
///
/// Malformed rules and declarations are dropped individually; parsing never
/// fails as a whole.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser;
    let mut sheet = Stylesheet::default();
    for rule in StyleSheetParser::new(&mut parser, &mut top).flatten() {
        sheet.rules.push(rule);
    }
    sheet
}

/// Parse a bare declaration list such as the contents of a `style` attribute.
pub fn parse_declaration_list(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_declarations_from_block(&mut parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_tail_is_split() {
        assert_eq!(
            split_important_tail("red ! IMPORTANT"),
            ("red".to_owned(), true)
        );
        assert_eq!(split_important_tail("red"), ("red".to_owned(), false));
    }

    #[test]
    fn rules_and_media_blocks() {
        let sheet = parse_stylesheet(
            "p, div { color: red; margin: 0 !important }\n\
             @font-face { font-family: x }\n\
             @media print { p { color: black } }\n\
             @import url(\"more.css\") screen;",
        );
        assert_eq!(sheet.rules.len(), 3);
        let flat = sheet.style_rules();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].0.prelude, "p, div");
        assert!(flat[0].0.declarations[1].important);
        assert_eq!(flat[1].1, vec!["print"]);
        assert_eq!(
            sheet.rules[2],
            CssRule::Import {
                url: "more.css".to_owned(),
                media: "screen".to_owned()
            }
        );
    }

    #[test]
    fn broken_declarations_are_skipped() {
        let decls = parse_declaration_list("color: red; : nope; width:; height: 4px");
        let names: Vec<_> = decls.iter().map(|decl| decl.name.as_str()).collect();
        assert_eq!(names, vec!["color", "height"]);
    }
}

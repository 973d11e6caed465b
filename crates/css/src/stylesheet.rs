//! Stylesheet set: parsed rules from every origin in source order.
//!
//! Each selector of a comma list becomes its own [`StyleRule`] sharing the
//! declaration block. Shorthands are expanded and invalid declarations are
//! dropped here, once, so the cascade only compares valid longhands.

use std::rc::Rc;

use css_media_queries::{MediaFeatures, MediaQueryList, parse_media_query_list};
use css_selectors::{ComplexSelector, Specificity, parse_selector_list, specificity_of_complex};
use css_syntax::{CssRule, Declaration, parse_stylesheet};

use crate::properties::{PropertyId, expand_declaration};
use crate::style::is_valid_value;

/// Where a stylesheet came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    UserAgent,
    User,
    Author,
}

/// One longhand declaration after shorthand expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub property: PropertyId,
    pub value: String,
    pub important: bool,
}

#[derive(Clone, Debug)]
pub struct StyleRule {
    pub selector: ComplexSelector,
    pub specificity: Specificity,
    pub declarations: Rc<[PropertyDeclaration]>,
    pub origin: Origin,
    /// Position among all rules of the set; 0 is reserved for presentational hints.
    pub source_order: u32,
    /// Every list must match; nested `@media` blocks and `@import` media stack.
    pub media: Vec<Rc<MediaQueryList>>,
}

impl StyleRule {
    pub fn media_matches(&self, device: &MediaFeatures) -> bool {
        self.media.iter().all(|list| list.matches(device))
    }
}

/// Text of an imported stylesheet and the base URL its own imports resolve against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportedSheet {
    pub text: String,
    pub base_url: Option<String>,
}

/// Resolves `@import` targets.
pub trait StylesheetImporter {
    /// `None` when the sheet is unavailable; the import then contributes no rules.
    fn import(&mut self, url: &str, base_url: Option<&str>) -> Option<ImportedSheet>;
}

/// Importer for sets built without a resource loader.
pub struct NoImports;

impl StylesheetImporter for NoImports {
    fn import(&mut self, url: &str, _base_url: Option<&str>) -> Option<ImportedSheet> {
        log::debug!("no importer configured, skipping @import {url}");
        None
    }
}

/// A stylesheet to add to a [`StyleSet`].
#[derive(Clone, Copy, Debug)]
pub struct SheetSource<'src> {
    pub text: &'src str,
    pub origin: Origin,
    /// `media` attribute of the owning `<style>`/`<link>`, if any.
    pub media: Option<&'src str>,
    pub base_url: Option<&'src str>,
}

impl<'src> SheetSource<'src> {
    pub const fn new(text: &'src str, origin: Origin) -> Self {
        Self {
            text,
            origin,
            media: None,
            base_url: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StyleSet {
    rules: Vec<StyleRule>,
    next_order: u32,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSet {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            next_order: 1,
        }
    }

    /// Append a stylesheet without import support.
    pub fn add_stylesheet(&mut self, source: SheetSource) {
        self.add_stylesheet_with_imports(source, &mut NoImports, 0);
    }

    /// Append a stylesheet; `@import` rules are spliced in place, at most
    /// `max_import_depth` levels deep.
    pub fn add_stylesheet_with_imports(
        &mut self,
        source: SheetSource,
        importer: &mut dyn StylesheetImporter,
        max_import_depth: u32,
    ) {
        let mut media = Vec::new();
        if let Some(text) = source.media.filter(|text| !text.trim().is_empty()) {
            media.push(Rc::new(parse_media_query_list(text)));
        }
        let sheet = parse_stylesheet(source.text);
        let before = self.rules.len();
        self.add_rules(
            &sheet.rules,
            source.origin,
            &mut media,
            source.base_url,
            importer,
            max_import_depth,
        );
        log::debug!(
            "added {:?} stylesheet with {} rules",
            source.origin,
            self.rules.len() - before
        );
    }

    fn add_rules(
        &mut self,
        rules: &[CssRule],
        origin: Origin,
        media: &mut Vec<Rc<MediaQueryList>>,
        base_url: Option<&str>,
        importer: &mut dyn StylesheetImporter,
        depth_left: u32,
    ) {
        for rule in rules {
            match rule {
                CssRule::Style(style) => {
                    self.add_style_rule(&style.prelude, &style.declarations, origin, media);
                }
                CssRule::Media { query, rules } => {
                    media.push(Rc::new(parse_media_query_list(query)));
                    self.add_rules(rules, origin, media, base_url, importer, depth_left);
                    media.pop();
                }
                CssRule::Import {
                    url,
                    media: import_media,
                } => {
                    if depth_left == 0 {
                        log::warn!("@import {url} exceeds the maximum import depth, skipped");
                        continue;
                    }
                    let Some(imported) = importer.import(url, base_url) else {
                        continue;
                    };
                    let pushed = !import_media.trim().is_empty();
                    if pushed {
                        media.push(Rc::new(parse_media_query_list(import_media)));
                    }
                    let sheet = parse_stylesheet(&imported.text);
                    let nested_base = imported.base_url.as_deref().or(base_url);
                    self.add_rules(
                        &sheet.rules,
                        origin,
                        media,
                        nested_base,
                        importer,
                        depth_left - 1,
                    );
                    if pushed {
                        media.pop();
                    }
                }
            }
        }
    }

    fn add_style_rule(
        &mut self,
        prelude: &str,
        declarations: &[Declaration],
        origin: Origin,
        media: &[Rc<MediaQueryList>],
    ) {
        let selectors = parse_selector_list(prelude);
        if selectors.selectors.is_empty() {
            log::warn!("dropping rule with unparsable selector {prelude:?}");
            return;
        }
        let expanded: Rc<[PropertyDeclaration]> = declarations
            .iter()
            .flat_map(|declaration| {
                expand_declaration(&declaration.name, &declaration.value)
                    .into_iter()
                    .map(move |(property, value)| PropertyDeclaration {
                        property,
                        value,
                        important: declaration.important,
                    })
            })
            .filter(|declaration| {
                let valid = is_valid_value(declaration.property, &declaration.value);
                if !valid {
                    log::debug!(
                        "dropping invalid declaration {}: {}",
                        declaration.property.name(),
                        declaration.value
                    );
                }
                valid
            })
            .collect();
        if expanded.is_empty() {
            return;
        }
        for selector in selectors.selectors {
            if selector.targets_pseudo_element() {
                log::trace!("skipping pseudo-element rule {prelude:?}");
                continue;
            }
            let source_order = self.next_order;
            self.next_order = self.next_order.saturating_add(1);
            self.rules.push(StyleRule {
                specificity: specificity_of_complex(&selector),
                selector,
                declarations: Rc::clone(&expanded),
                origin,
                source_order,
                media: media.to_vec(),
            });
        }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if any rule depends on `:hover`.
    pub fn uses_hover(&self) -> bool {
        self.rules.iter().any(|rule| rule.selector.uses_hover())
    }

    /// True if any rule depends on `:active`.
    pub fn uses_active(&self) -> bool {
        self.rules.iter().any(|rule| rule.selector.uses_active())
    }

    /// Which media-qualified rules are active for `device`. Two devices with the
    /// same signature produce the same cascade.
    pub fn media_signature(&self, device: &MediaFeatures) -> Vec<bool> {
        self.rules
            .iter()
            .filter(|rule| !rule.media.is_empty())
            .map(|rule| rule.media_matches(device))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_media_queries::MediaType;
    use std::collections::HashMap;

    struct MapImporter {
        sheets: HashMap<&'static str, &'static str>,
        requested: Vec<(String, Option<String>)>,
    }

    impl StylesheetImporter for MapImporter {
        fn import(&mut self, url: &str, base_url: Option<&str>) -> Option<ImportedSheet> {
            self.requested
                .push((url.to_owned(), base_url.map(str::to_owned)));
            self.sheets.get(url).map(|text| ImportedSheet {
                text: (*text).to_owned(),
                base_url: Some(format!("http://host/{url}")),
            })
        }
    }

    #[test]
    fn selector_groups_share_declarations() {
        let mut set = StyleSet::new();
        set.add_stylesheet(SheetSource::new(
            "h1, .x > p { margin: 0; bogus: 1 } ::before { color: red } p { width: -1px }",
            Origin::Author,
        ));
        assert_eq!(set.len(), 2);
        let first = &set.rules()[0];
        let second = &set.rules()[1];
        assert!(Rc::ptr_eq(&first.declarations, &second.declarations));
        assert_eq!(first.declarations.len(), 4);
        assert!(first.source_order < second.source_order);
        assert_eq!(second.specificity, Specificity(0, 1, 1));
    }

    #[test]
    fn imports_are_spliced_in_order_and_bounded() {
        let mut importer = MapImporter {
            sheets: HashMap::from([
                ("a.css", "@import 'b.css' print; a { color: red }"),
                ("b.css", "@import 'a.css'; b { color: blue }"),
            ]),
            requested: Vec::new(),
        };
        let mut set = StyleSet::new();
        let source = SheetSource {
            base_url: Some("http://host/"),
            ..SheetSource::new("@import url(a.css); main { color: green }", Origin::Author)
        };
        set.add_stylesheet_with_imports(source, &mut importer, 2);
        let tags: Vec<String> = set
            .rules()
            .iter()
            .map(|rule| format!("{:?}", rule.selector.subject().simples))
            .collect();
        assert_eq!(set.len(), 3, "{tags:?}");
        // b.css came through a print-only import.
        let print = MediaFeatures {
            media_type: MediaType::Print,
            ..MediaFeatures::default()
        };
        assert!(!set.rules()[0].media_matches(&MediaFeatures::default()));
        assert!(set.rules()[0].media_matches(&print));
        assert_eq!(importer.requested[0], ("a.css".to_owned(), Some("http://host/".to_owned())));
        assert_eq!(
            importer.requested[1],
            ("b.css".to_owned(), Some("http://host/a.css".to_owned()))
        );
        assert_eq!(importer.requested.len(), 2);
        assert_ne!(
            set.media_signature(&MediaFeatures::default()),
            set.media_signature(&print)
        );
    }
}

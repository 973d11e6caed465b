//! CSS cascade resolution and selector matching.
//!
//! Implements the CSS cascade algorithm for determining which declarations apply to each
//! element, considering origin, importance, specificity and source order, then builds
//! the computed style of every element in tree order.
//! Spec: <https://www.w3.org/TR/css-cascade-3/#cascading>

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use css_media_queries::MediaFeatures;
use css_selectors::{ElementAdapter, Specificity, matches_complex};
use css_style_attr::normalize_style_attribute;
use html::{Dom, NodeData, NodeId};

use crate::properties::{PropertyId, expand_declaration};
use crate::rule_index::RuleIndex;
use crate::style::{StyleContext, build_computed, is_valid_value};
use crate::style_model::{BorderStyle, ComputedStyle, Display, Float};
use crate::stylesheet::{Origin, StyleSet};
use crate::ua_stylesheet::default_display;

/// Pointer-driven state that `:hover` and `:active` match against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DynamicState {
    /// The hovered element and all of its ancestors.
    pub hovered: HashSet<NodeId>,
    /// The pressed element and all of its ancestors.
    pub active: HashSet<NodeId>,
}

/// Computed styles of every element of a document.
#[derive(Clone, Debug, Default)]
pub struct ComputedStyles {
    styles: HashMap<NodeId, Rc<ComputedStyle>>,
}

impl ComputedStyles {
    pub fn get(&self, node: NodeId) -> Option<&Rc<ComputedStyle>> {
        self.styles.get(&node)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Rc<ComputedStyle>)> {
        self.styles.iter().map(|(node, style)| (*node, style))
    }
}

/// Selector matching view of the DOM.
pub struct DomAdapter<'dom> {
    dom: &'dom Dom,
    dynamic: &'dom DynamicState,
}

impl<'dom> DomAdapter<'dom> {
    pub const fn new(dom: &'dom Dom, dynamic: &'dom DynamicState) -> Self {
        Self { dom, dynamic }
    }
}

impl ElementAdapter for DomAdapter<'_> {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.dom.parent_element(element)
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.dom.previous_element_sibling(element)
    }

    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.dom.next_element_sibling(element)
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.dom.element(element).map_or("", |data| data.tag_name())
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.dom.element(element)?.id()
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.dom
            .element(element)
            .is_some_and(|data| data.has_class(class))
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.dom.element(element)?.attr(name)
    }

    fn is_empty(&self, element: NodeId) -> bool {
        !self
            .dom
            .children(element)
            .any(|child| match self.dom.data(child) {
                Some(NodeData::Element(_)) => true,
                Some(NodeData::Text(text)) => !text.is_empty(),
                _ => false,
            })
    }

    fn is_hovered(&self, element: NodeId) -> bool {
        self.dynamic.hovered.contains(&element)
    }

    fn is_active(&self, element: NodeId) -> bool {
        self.dynamic.active.contains(&element)
    }
}

/// A declaration tracked during cascading with metadata used to resolve conflicts.
#[derive(Clone, Debug)]
struct CascadedDecl {
    value: String,
    /// Origin and importance folded into one precedence level.
    level: u8,
    specificity: Specificity,
    source_order: u32,
    /// Position inside the declaration block.
    index: u32,
}

/// Precedence level of a declaration, lowest first:
/// UA, user, author (hints included), inline, then the important buckets in
/// reverse origin order.
pub const fn cascade_level(origin: Origin, important: bool, inline: bool) -> u8 {
    match (origin, important, inline) {
        (Origin::UserAgent, false, _) => 0,
        (Origin::User, false, _) => 1,
        (Origin::Author, false, false) => 2,
        (Origin::Author, false, true) => 3,
        (Origin::Author, true, false) => 4,
        (Origin::Author, true, true) => 5,
        (Origin::User, true, _) => 6,
        (Origin::UserAgent, true, _) => 7,
    }
}

/// Return true if `candidate` wins over `previous` according to CSS cascade rules.
fn wins_over(candidate: &CascadedDecl, previous: &CascadedDecl) -> bool {
    (
        candidate.level,
        candidate.specificity,
        candidate.source_order,
        candidate.index,
    ) > (
        previous.level,
        previous.specificity,
        previous.source_order,
        previous.index,
    )
}

/// Insert a cascaded declaration into the property map if it wins over any existing one.
fn cascade_put(props: &mut HashMap<PropertyId, CascadedDecl>, id: PropertyId, entry: CascadedDecl) {
    let should_insert = props
        .get(&id)
        .is_none_or(|previous| wins_over(&entry, previous));
    if should_insert {
        props.insert(id, entry);
    }
}

/// Winning value of every property declared for `node`, keyed by longhand name.
pub fn cascaded_values(
    dom: &Dom,
    set: &StyleSet,
    index: &RuleIndex,
    dynamic: &DynamicState,
    node: NodeId,
) -> HashMap<String, String> {
    let mut props: HashMap<PropertyId, CascadedDecl> = HashMap::new();
    let Some(element) = dom.element(node) else {
        return HashMap::new();
    };
    let adapter = DomAdapter::new(dom, dynamic);

    for position in index.candidates(element.tag_name(), element.id(), element.classes()) {
        let Some(rule) = set.rules().get(position) else {
            continue;
        };
        if !matches_complex(&adapter, node, &rule.selector) {
            continue;
        }
        for (decl_index, declaration) in rule.declarations.iter().enumerate() {
            cascade_put(
                &mut props,
                declaration.property,
                CascadedDecl {
                    value: declaration.value.clone(),
                    level: cascade_level(rule.origin, declaration.important, false),
                    specificity: rule.specificity,
                    source_order: rule.source_order,
                    index: decl_index as u32,
                },
            );
        }
    }

    // Presentational hints: author origin, zero specificity, before every author rule.
    let hints = element
        .hints
        .iter()
        .flat_map(|(name, value)| expand_declaration(name, value));
    for (decl_index, (id, value)) in hints.enumerate() {
        if !is_valid_value(id, &value) {
            continue;
        }
        cascade_put(
            &mut props,
            id,
            CascadedDecl {
                value,
                level: cascade_level(Origin::Author, false, false),
                specificity: Specificity::default(),
                source_order: 0,
                index: decl_index as u32,
            },
        );
    }

    if let Some(style_attr) = element.attr("style") {
        let inline = normalize_style_attribute(style_attr)
            .into_iter()
            .flat_map(|declaration| {
                let important = declaration.important;
                expand_declaration(&declaration.name, &declaration.value)
                    .into_iter()
                    .map(move |(id, value)| (id, value, important))
            });
        for (decl_index, (id, value, important)) in inline.enumerate() {
            if !is_valid_value(id, &value) {
                continue;
            }
            cascade_put(
                &mut props,
                id,
                CascadedDecl {
                    value,
                    level: cascade_level(Origin::Author, important, true),
                    specificity: Specificity::default(),
                    source_order: u32::MAX,
                    index: decl_index as u32,
                },
            );
        }
    }

    props
        .into_iter()
        .map(|(id, decl)| (id.name().to_owned(), decl.value))
        .collect()
}

/// Compute the style of every element in `dom`.
///
/// Resolution runs once over the finished tree, parents before children.
pub fn compute_styles(
    dom: &Dom,
    set: &StyleSet,
    device: &MediaFeatures,
    dynamic: &DynamicState,
    ctx: &StyleContext,
) -> ComputedStyles {
    let index = RuleIndex::build(set.rules(), |rule| rule.media_matches(device));
    let mut styles: HashMap<NodeId, Rc<ComputedStyle>> = HashMap::new();
    let mut root_font_size = None;

    for node in dom.descendants(dom.document()) {
        let Some(element) = dom.element(node) else {
            continue;
        };
        let mut decls = cascaded_values(dom, set, &index, dynamic, node);
        if !decls.contains_key("display") {
            let fallback = default_display(element.tag_name());
            if fallback != Display::Inline {
                decls.insert("display".to_owned(), display_keyword(fallback).to_owned());
            }
        }
        let parent_element = dom.parent_element(node);
        let parent = parent_element.and_then(|parent| styles.get(&parent));
        let mut computed = build_computed(&decls, parent.map(|style| &**style), root_font_size, ctx);
        fixup(&mut computed, parent_element.is_none());
        if parent_element.is_none() {
            root_font_size = Some(computed.font_size);
        }
        log::trace!("computed style for <{}>: {:?}", element.tag_name(), computed.display);
        styles.insert(node, Rc::new(computed));
    }
    log::debug!("computed styles for {} elements", styles.len());
    ComputedStyles { styles }
}

/// CSS 2.1 §9.7 display adjustments and used border widths.
fn fixup(computed: &mut ComputedStyle, is_root: bool) {
    if computed.is_out_of_flow_positioned() {
        computed.float = Float::None;
    }
    if computed.display != Display::None
        && (is_root || computed.is_floating() || computed.is_out_of_flow_positioned())
    {
        computed.display = computed.display.blockified();
    }
    for side in [
        &mut computed.border.top,
        &mut computed.border.right,
        &mut computed.border.bottom,
        &mut computed.border.left,
    ] {
        if matches!(side.style, BorderStyle::None | BorderStyle::Hidden) {
            side.width = 0.0;
        }
    }
}

const fn display_keyword(display: Display) -> &'static str {
    match display {
        Display::Inline => "inline",
        Display::Block => "block",
        Display::InlineBlock => "inline-block",
        Display::ListItem => "list-item",
        Display::Table => "table",
        Display::InlineTable => "inline-table",
        Display::TableRowGroup => "table-row-group",
        Display::TableHeaderGroup => "table-header-group",
        Display::TableFooterGroup => "table-footer-group",
        Display::TableRow => "table-row",
        Display::TableCell => "table-cell",
        Display::TableCaption => "table-caption",
        Display::TableColumn => "table-column",
        Display::TableColumnGroup => "table-column-group",
        Display::None => "none",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::SheetSource;
    use crate::values::Rgba;
    use html::{Attribute, DomBuilder, NoCustomElements, Token};

    fn build(tokens: Vec<Token>) -> Dom {
        let mut factory = NoCustomElements;
        let mut builder = DomBuilder::new(&mut factory);
        for token in tokens {
            builder.feed(token);
        }
        builder.finish().dom
    }

    fn styles_for(dom: &Dom, css: &str) -> ComputedStyles {
        let mut set = StyleSet::new();
        set.add_stylesheet(SheetSource::new(css, Origin::Author));
        compute_styles(
            dom,
            &set,
            &MediaFeatures::default(),
            &DynamicState::default(),
            &StyleContext::default(),
        )
    }

    fn first_tag(dom: &Dom, tag: &str) -> Option<NodeId> {
        dom.descendants(dom.document())
            .find(|node| dom.element(*node).is_some_and(|data| data.tag_name() == tag))
    }

    #[test]
    fn class_beats_type() {
        let dom = build(vec![
            Token::start("p", vec![Attribute::new("class", "x")]),
            Token::text("hi"),
            Token::end("p"),
        ]);
        let styles = styles_for(&dom, "p{color:red} .x{color:blue}");
        let color = first_tag(&dom, "p")
            .and_then(|node| styles.get(node))
            .map(|style| style.color);
        assert_eq!(color, Some(Rgba::new(0, 0, 255, 255)));
    }

    #[test]
    fn inline_and_important_ordering() {
        let dom = build(vec![
            Token::start(
                "div",
                vec![
                    Attribute::new("id", "d"),
                    Attribute::new("style", "color: green; width: 10px"),
                    Attribute::new("align", "center"),
                ],
            ),
            Token::end("div"),
        ]);
        let styles = styles_for(
            &dom,
            "#d { color: red; width: 20px !important; text-align: right } div { text-align: left }",
        );
        let Some(style) = first_tag(&dom, "div").and_then(|node| styles.get(node)) else {
            panic!("div has no style");
        };
        assert_eq!(style.color, Rgba::new(0, 128, 0, 255));
        assert_eq!(style.width, crate::values::Dimension::Px(20.0));
        // Author rules beat the `align` hint.
        assert_eq!(style.text_align, crate::style_model::TextAlign::Right);
        assert_eq!(style.display, Display::Block);
    }

    #[test]
    fn inheritance_and_blockification() {
        let dom = build(vec![
            Token::start("div", Vec::new()),
            Token::start("span", vec![Attribute::new("style", "float: left")]),
            Token::text("x"),
            Token::end("span"),
            Token::end("div"),
        ]);
        let styles = styles_for(&dom, "div { color: #123456; margin: 5px; border-style: none; border-width: 4px }");
        let Some(span) = first_tag(&dom, "span").and_then(|node| styles.get(node)) else {
            panic!("span has no style");
        };
        let Some(div) = first_tag(&dom, "div").and_then(|node| styles.get(node)) else {
            panic!("div has no style");
        };
        assert_eq!(span.color, Rgba::new(0x12, 0x34, 0x56, 255));
        assert_eq!(span.margin.top, crate::values::Dimension::Px(0.0));
        assert_eq!(span.display, Display::Block);
        assert!(div.border.top.width.abs() < f32::EPSILON);
    }
}

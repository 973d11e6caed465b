use crate::behavior::TagBehavior;
use crate::token::Attribute;
use html5ever::LocalName;
use smallvec::SmallVec;

/// Tags the engine dispatches on. Everything else is `Other` and keeps its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Html,
    Head,
    Body,
    Title,
    Style,
    Link,
    Base,
    Meta,
    Script,
    Paragraph,
    Div,
    Span,
    Anchor,
    Image,
    LineBreak,
    HorizontalRule,
    Table,
    TableCaption,
    TableHead,
    TableBody,
    TableFoot,
    TableRow,
    TableDataCell,
    TableHeaderCell,
    TableColumn,
    TableColumnGroup,
    OrderedList,
    UnorderedList,
    ListItem,
    Font,
    Center,
    Heading,
    Pre,
    Other,
}

impl ElementKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "html" => Self::Html,
            "head" => Self::Head,
            "body" => Self::Body,
            "title" => Self::Title,
            "style" => Self::Style,
            "link" => Self::Link,
            "base" => Self::Base,
            "meta" => Self::Meta,
            "script" | "noscript" | "template" => Self::Script,
            "p" => Self::Paragraph,
            "div" => Self::Div,
            "span" => Self::Span,
            "a" => Self::Anchor,
            "img" => Self::Image,
            "br" => Self::LineBreak,
            "hr" => Self::HorizontalRule,
            "table" => Self::Table,
            "caption" => Self::TableCaption,
            "thead" => Self::TableHead,
            "tbody" => Self::TableBody,
            "tfoot" => Self::TableFoot,
            "tr" => Self::TableRow,
            "td" => Self::TableDataCell,
            "th" => Self::TableHeaderCell,
            "col" => Self::TableColumn,
            "colgroup" => Self::TableColumnGroup,
            "ol" => Self::OrderedList,
            "ul" | "menu" | "dir" => Self::UnorderedList,
            "li" => Self::ListItem,
            "font" => Self::Font,
            "center" => Self::Center,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Self::Heading,
            "pre" | "listing" | "xmp" | "plaintext" => Self::Pre,
            _ => Self::Other,
        }
    }

    /// Elements that never have children and are not pushed on the open stack.
    pub fn is_void_name(name: &str) -> bool {
        matches!(
            name,
            "area"
                | "base"
                | "br"
                | "col"
                | "embed"
                | "hr"
                | "img"
                | "input"
                | "link"
                | "meta"
                | "param"
                | "source"
                | "track"
                | "wbr"
        )
    }

    pub const fn is_table_cell(self) -> bool {
        matches!(self, Self::TableDataCell | Self::TableHeaderCell)
    }
}

/// Per-element payload stored in the DOM arena.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub name: LocalName,
    pub kind: ElementKind,
    pub attrs: SmallVec<Attribute, 4>,
    pub behavior: TagBehavior,
    /// Declarations derived from presentational attributes (`align`, `bgcolor`,
    /// `width`, ...). They enter the cascade as author rules with zero
    /// specificity ahead of every stylesheet rule.
    pub hints: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(name: &str, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        let lowered = name.to_ascii_lowercase();
        let kind = ElementKind::from_name(&lowered);
        Self {
            name: LocalName::from(lowered),
            kind,
            attrs: attrs.into_iter().collect(),
            behavior: TagBehavior::for_kind(kind),
            hints: Vec::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name.as_ref().eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(existing) = self
            .attrs
            .iter_mut()
            .find(|attr| attr.name.as_ref().eq_ignore_ascii_case(name))
        {
            existing.value = value;
        } else {
            self.attrs.push(Attribute::new(name, value));
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|token| token == class)
    }
}

//! Arena-backed document tree.

mod element;

pub use element::{ElementData, ElementKind};
use indextree::Arena;
pub use indextree::NodeId;

/// Payload of a DOM node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// The document tree. Node ids stay valid for the lifetime of the `Dom`; the
/// tree is never mutated after construction except for attribute-level hints.
#[derive(Debug)]
pub struct Dom {
    arena: Arena<NodeData>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(NodeData::Document);
        Self { arena, document }
    }

    /// The synthetic document node that owns the root element.
    pub const fn document(&self) -> NodeId {
        self.document
    }

    /// The root element (`<html>`), if the document has any content.
    pub fn root_element(&self) -> Option<NodeId> {
        self.element_children(self.document).next()
    }

    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.arena.get(node).map(indextree::Node::get)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.data(node)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match self.arena.get_mut(node)?.get_mut() {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.data(node)? {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    /// Parent, but only when it is an element (the document node is skipped).
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
            .filter(|child| self.is_element(*child))
    }

    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        node.preceding_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        node.following_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    /// Pre-order traversal including `node` itself.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    /// Ancestors excluding `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena).skip(1)
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        node.ancestors(&self.arena).any(|candidate| candidate == ancestor)
    }

    pub fn node_count(&self) -> usize {
        self.arena.count()
    }

    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    /// Append text, merging into a trailing text sibling so adjacent text
    /// tokens produce one node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(last) = self.arena.get(parent).and_then(indextree::Node::last_child)
            && let Some(NodeData::Text(existing)) =
                self.arena.get_mut(last).map(indextree::Node::get_mut)
        {
            existing.push_str(text);
            return last;
        }
        self.append(parent, NodeData::Text(text.to_owned()))
    }

    /// Concatenated text of all descendant text nodes, verbatim.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for descendant in self.descendants(node) {
            if let Some(text) = self.text(descendant) {
                out.push_str(text);
            }
        }
        out
    }

    /// Human-readable text: whitespace collapsed, block-ish elements separated
    /// by line breaks, non-rendered elements (`script`, `style`, `head`) skipped.
    pub fn plain_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_plain_text(node, &mut out);
        out.trim().to_owned()
    }

    fn collect_plain_text(&self, node: NodeId, out: &mut String) {
        match self.data(node) {
            Some(NodeData::Text(text)) => {
                let leading_space = text.starts_with(|ch: char| ch.is_ascii_whitespace());
                for (index, word) in text.split_ascii_whitespace().enumerate() {
                    let separated = index > 0 || leading_space;
                    if separated && !out.is_empty() && !out.ends_with([' ', '\n']) {
                        out.push(' ');
                    }
                    out.push_str(word);
                }
                if text.ends_with(|ch: char| ch.is_ascii_whitespace()) && !out.is_empty() {
                    out.push(' ');
                }
            }
            Some(NodeData::Element(element)) => {
                if matches!(
                    element.kind,
                    ElementKind::Script | ElementKind::Style | ElementKind::Head
                ) {
                    return;
                }
                if element.kind == ElementKind::LineBreak {
                    trim_trailing_space(out);
                    out.push('\n');
                    return;
                }
                let block = is_block_for_text(element.kind);
                if block {
                    break_line(out);
                }
                for child in self.children(node) {
                    self.collect_plain_text(child, out);
                }
                if block {
                    break_line(out);
                }
            }
            Some(NodeData::Document) => {
                for child in self.children(node) {
                    self.collect_plain_text(child, out);
                }
            }
            Some(NodeData::Comment(_)) | None => {}
        }
    }

    /// First element in document order whose `id` equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.document)
            .find(|node| self.element(*node).and_then(ElementData::id) == Some(id))
    }
}

const fn is_block_for_text(kind: ElementKind) -> bool {
    matches!(
        kind,
        ElementKind::Paragraph
            | ElementKind::Div
            | ElementKind::Heading
            | ElementKind::Pre
            | ElementKind::ListItem
            | ElementKind::Table
            | ElementKind::TableRow
            | ElementKind::TableCaption
            | ElementKind::HorizontalRule
            | ElementKind::Center
            | ElementKind::Body
    )
}

fn trim_trailing_space(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
}

fn break_line(out: &mut String) {
    trim_trailing_space(out);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(name: &str) -> NodeData {
        NodeData::Element(ElementData::new(name, Vec::new()))
    }

    #[test]
    fn adjacent_text_merges() {
        let mut dom = Dom::new();
        let html = dom.append(dom.document(), element("html"));
        let first = dom.append_text(html, "Hello, ");
        let second = dom.append_text(html, "world");
        assert_eq!(first, second);
        assert_eq!(dom.text_content(html), "Hello, world");
    }

    #[test]
    fn sibling_navigation_skips_text() {
        let mut dom = Dom::new();
        let root = dom.append(dom.document(), element("div"));
        let first = dom.append(root, element("p"));
        dom.append_text(root, "  ");
        let second = dom.append(root, element("p"));
        assert_eq!(dom.next_element_sibling(first), Some(second));
        assert_eq!(dom.previous_element_sibling(second), Some(first));
        assert_eq!(dom.previous_element_sibling(first), None);
        assert_eq!(dom.root_element(), Some(root));
    }

    #[test]
    fn plain_text_collapses_and_breaks_blocks() {
        let mut dom = Dom::new();
        let body = dom.append(dom.document(), element("body"));
        let para = dom.append(body, element("p"));
        dom.append_text(para, "  one\n   two ");
        let style = dom.append(body, element("style"));
        dom.append_text(style, "p { color: red }");
        let second = dom.append(body, element("p"));
        dom.append_text(second, "three");
        assert_eq!(dom.plain_text(body), "one two\nthree");
    }
}

//! Render items and the arena that owns them.
//!
//! Ids carry the generation of the layout pass that created them, so a stale
//! id held across a re-layout resolves to nothing instead of a wrong box.

use std::rc::Rc;

use css::{ComputedStyle, Display, ListStylePosition, Overflow, Visibility};
use html::NodeId;
use smallvec::SmallVec;

use crate::context::FontInfo;
use crate::geometry::{Edges, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderId {
    index: u32,
    generation: u32,
}

impl RenderId {
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Box kinds produced by box construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderKind {
    /// Block container: block, list-item, float, absolutely positioned box or
    /// an anonymous block wrapping inline content.
    Block,
    /// Inline element (`span`, `a`, ...) fragmented across line boxes.
    Inline,
    InlineBlock,
    /// A word of text.
    Text,
    /// A run of white space between words.
    Space,
    /// Forced line break from `<br>` or a preserved newline.
    LineBreak,
    Image,
    ListMarker,
    Table,
    TableRowGroup,
    TableRow,
    TableCell,
    TableCaption,
}

impl RenderKind {
    /// Items whose children are laid out by the block/inline formatting code.
    pub const fn is_block_container(self) -> bool {
        matches!(
            self,
            Self::Block | Self::InlineBlock | Self::TableCell | Self::TableCaption
        )
    }

    pub const fn is_text_like(self) -> bool {
        matches!(self, Self::Text | Self::Space | Self::LineBreak)
    }
}

/// One line box of a block container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineBox {
    pub rect: Rect,
    /// Absolute y of the baseline.
    pub baseline: f32,
    /// Items placed on this line, left to right.
    pub items: Vec<RenderId>,
}

/// Resolved box model of an item.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxGeometry {
    pub border_box: Rect,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
}

impl BoxGeometry {
    pub fn padding_box(&self) -> Rect {
        self.border_box.deflated(&self.border)
    }

    pub fn content_box(&self) -> Rect {
        self.padding_box().deflated(&self.padding)
    }

    pub fn margin_box(&self) -> Rect {
        self.border_box.inflated(&self.margin)
    }
}

#[derive(Clone, Debug)]
pub struct RenderItem {
    pub kind: RenderKind,
    /// DOM node this item was generated for. Text runs point at their text
    /// node; anonymous boxes and markers point at the element they belong to.
    pub node: NodeId,
    pub style: Rc<ComputedStyle>,
    pub parent: Option<RenderId>,
    pub children: Vec<RenderId>,
    pub geometry: BoxGeometry,
    /// Line boxes of a block container with inline content.
    pub lines: Vec<LineBox>,
    /// Border boxes of each line fragment of an inline element.
    pub line_rects: Vec<Rect>,
    /// Word text, space text or marker text.
    pub text: Option<String>,
    /// Measured advance of a text run or marker text.
    pub advance: f32,
    pub font: Option<FontInfo>,
    /// Image source for images and image list markers.
    pub image: Option<String>,
    pub anonymous: bool,
    pub hit_testable: bool,
    /// `colspan` and `rowspan` of a table cell.
    pub col_span: usize,
    pub row_span: usize,
}

impl RenderItem {
    pub fn new(kind: RenderKind, node: NodeId, style: Rc<ComputedStyle>) -> Self {
        let hit_testable = style.visibility == Visibility::Visible;
        Self {
            kind,
            node,
            style,
            parent: None,
            children: Vec::new(),
            geometry: BoxGeometry::default(),
            lines: Vec::new(),
            line_rects: Vec::new(),
            text: None,
            advance: 0.0,
            font: None,
            image: None,
            anonymous: false,
            hit_testable,
            col_span: 1,
            row_span: 1,
        }
    }

    /// Floats and absolutely positioned boxes.
    pub fn is_out_of_flow(&self) -> bool {
        self.style.is_floating() || self.style.is_out_of_flow_positioned()
    }

    /// Participates in an inline formatting context.
    pub fn is_inline_level(&self) -> bool {
        if self.is_out_of_flow() {
            return false;
        }
        match self.kind {
            RenderKind::Inline
            | RenderKind::InlineBlock
            | RenderKind::Text
            | RenderKind::Space
            | RenderKind::LineBreak => true,
            RenderKind::Image => !self.style.display.is_block_level(),
            RenderKind::Table => self.style.display == Display::InlineTable,
            RenderKind::ListMarker => self.style.list_style_position == ListStylePosition::Inside,
            RenderKind::Block
            | RenderKind::TableRowGroup
            | RenderKind::TableRow
            | RenderKind::TableCell
            | RenderKind::TableCaption => false,
        }
    }

    /// Whether the item establishes a new block formatting context.
    pub fn establishes_bfc(&self) -> bool {
        self.is_out_of_flow()
            || self.style.overflow != Overflow::Visible
            || matches!(
                self.kind,
                RenderKind::InlineBlock | RenderKind::TableCell | RenderKind::TableCaption
            )
    }

    /// Border boxes used for hit testing and redraw regions.
    pub fn fragments(&self) -> SmallVec<Rect, 2> {
        if self.kind == RenderKind::Inline {
            return self.line_rects.iter().copied().collect();
        }
        let mut single = SmallVec::new();
        single.push(self.geometry.border_box);
        single
    }
}

/// Owner of every render item of one layout pass.
#[derive(Debug, Default)]
pub struct RenderArena {
    items: Vec<RenderItem>,
    generation: u32,
}

impl RenderArena {
    pub const fn new(generation: u32) -> Self {
        Self {
            items: Vec::new(),
            generation,
        }
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: RenderItem) -> RenderId {
        let id = RenderId {
            index: self.items.len() as u32,
            generation: self.generation,
        };
        self.items.push(item);
        id
    }

    /// Append `child` under `parent`, fixing the back reference.
    pub fn append_child(&mut self, parent: RenderId, child: RenderId) {
        if let Some(item) = self.get_mut(child) {
            item.parent = Some(parent);
        }
        if let Some(item) = self.get_mut(parent) {
            item.children.push(child);
        }
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderItem> {
        if id.generation != self.generation {
            return None;
        }
        self.items.get(id.index as usize)
    }

    pub fn get_mut(&mut self, id: RenderId) -> Option<&mut RenderItem> {
        if id.generation != self.generation {
            return None;
        }
        self.items.get_mut(id.index as usize)
    }

    pub fn children(&self, id: RenderId) -> &[RenderId] {
        self.get(id).map_or(&[], |item| item.children.as_slice())
    }

    pub fn ids(&self) -> impl Iterator<Item = RenderId> + '_ {
        (0..self.items.len()).map(|index| RenderId {
            index: index as u32,
            generation: self.generation,
        })
    }

    /// Move an item and all of its descendants.
    pub fn translate_subtree(&mut self, id: RenderId, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(item) = self.get_mut(current) else {
                continue;
            };
            item.geometry.border_box = item.geometry.border_box.translated(dx, dy);
            for rect in &mut item.line_rects {
                *rect = rect.translated(dx, dy);
            }
            for line in &mut item.lines {
                line.rect = line.rect.translated(dx, dy);
                line.baseline += dy;
            }
            stack.extend(item.children.iter().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{Dom, ElementData, NodeData};

    #[test]
    fn stale_ids_resolve_to_nothing() {
        let mut dom = Dom::new();
        let node = dom.append(dom.document(), NodeData::Element(ElementData::new("div", Vec::new())));
        let style = Rc::new(ComputedStyle::initial("serif", 16.0));

        let mut old = RenderArena::new(1);
        let id = old.push(RenderItem::new(RenderKind::Block, node, Rc::clone(&style)));
        assert!(old.get(id).is_some());

        let mut fresh = RenderArena::new(2);
        fresh.push(RenderItem::new(RenderKind::Block, node, style));
        assert!(fresh.get(id).is_none());
    }

    #[test]
    fn translation_moves_descendants() {
        let mut dom = Dom::new();
        let node = dom.append(dom.document(), NodeData::Element(ElementData::new("div", Vec::new())));
        let style = Rc::new(ComputedStyle::initial("serif", 16.0));
        let mut arena = RenderArena::new(0);
        let parent = arena.push(RenderItem::new(RenderKind::Block, node, Rc::clone(&style)));
        let child = arena.push(RenderItem::new(RenderKind::Block, node, style));
        arena.append_child(parent, child);
        if let Some(item) = arena.get_mut(child) {
            item.geometry.border_box = Rect::new(5.0, 5.0, 10.0, 10.0);
        }
        arena.translate_subtree(parent, 3.0, -2.0);
        assert_eq!(
            arena.get(child).map(|item| item.geometry.border_box),
            Some(Rect::new(8.0, 3.0, 10.0, 10.0))
        );
    }
}

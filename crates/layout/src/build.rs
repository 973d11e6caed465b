//! Box construction: turns the styled DOM into render items.
//!
//! Text is split into words and spaces according to `white-space`, mixed
//! block/inline children are wrapped in anonymous blocks and table parts get
//! their missing anonymous rows and cells.
//! Spec: <https://www.w3.org/TR/CSS22/visuren.html#box-gen>

use std::collections::HashMap;
use std::rc::Rc;

use css::{ComputedStyle, ComputedStyles, Display, ListStyleType};
use html::{Dom, ElementKind, NodeData, NodeId};

use crate::arena::{RenderArena, RenderId, RenderItem, RenderKind};
use crate::context::{FontDescriptor, FontInfo, LayoutContext};
use crate::geometry::Rect;

/// Render items of one document plus the DOM-node index.
pub(crate) struct BuiltTree {
    pub arena: RenderArena,
    pub root: Option<RenderId>,
    pub by_node: HashMap<NodeId, Vec<RenderId>>,
}

struct BoxBuilder<'build> {
    dom: &'build Dom,
    styles: &'build ComputedStyles,
    ctx: &'build mut dyn LayoutContext,
    arena: RenderArena,
    by_node: HashMap<NodeId, Vec<RenderId>>,
    /// The last inline content ended in collapsible white space (or nothing
    /// has been emitted since the last block boundary).
    space_pending: bool,
}

pub(crate) fn build_render_tree(
    dom: &Dom,
    styles: &ComputedStyles,
    ctx: &mut dyn LayoutContext,
    generation: u32,
) -> BuiltTree {
    let mut builder = BoxBuilder {
        dom,
        styles,
        ctx,
        arena: RenderArena::new(generation),
        by_node: HashMap::new(),
        space_pending: true,
    };
    let root = dom
        .root_element()
        .and_then(|node| builder.build_element(node));
    log::debug!("box construction produced {} items", builder.arena.len());
    BuiltTree {
        arena: builder.arena,
        root,
        by_node: builder.by_node,
    }
}

impl BoxBuilder<'_> {
    fn push(&mut self, item: RenderItem) -> RenderId {
        let node = item.node;
        let anonymous = item.anonymous;
        let id = self.arena.push(item);
        if !anonymous {
            self.by_node.entry(node).or_default().push(id);
        }
        id
    }

    fn font_for(&mut self, style: &ComputedStyle) -> FontInfo {
        self.ctx.font(&FontDescriptor::from_style(style))
    }

    fn build_element(&mut self, node: NodeId) -> Option<RenderId> {
        let dom = self.dom;
        let element = dom.element(node)?;
        let style = Rc::clone(self.styles.get(node)?);
        if matches!(
            style.display,
            Display::None | Display::TableColumn | Display::TableColumnGroup
        ) {
            return None;
        }
        let kind = match element.kind {
            ElementKind::Image => RenderKind::Image,
            ElementKind::LineBreak => RenderKind::LineBreak,
            _ => kind_for_display(style.display),
        };
        let mut item = RenderItem::new(kind, node, Rc::clone(&style));
        match kind {
            RenderKind::Image => {
                item.image = element
                    .attr("src")
                    .map(str::trim)
                    .filter(|src| !src.is_empty())
                    .map(str::to_owned);
            }
            RenderKind::LineBreak => {
                let font = self.font_for(&style);
                item.geometry.border_box.height = font.metrics.ascent + font.metrics.descent;
                item.font = Some(font);
            }
            RenderKind::TableCell => {
                item.col_span = span_attr(element.attr("colspan"));
                item.row_span = span_attr(element.attr("rowspan"));
            }
            _ => {}
        }
        let id = self.push(item);

        match kind {
            RenderKind::Image => {
                self.space_pending = false;
                return Some(id);
            }
            RenderKind::LineBreak => {
                self.space_pending = true;
                return Some(id);
            }
            _ => {}
        }

        let block_boundary = kind != RenderKind::Inline;
        if block_boundary {
            self.space_pending = true;
        }
        if style.display == Display::ListItem {
            self.build_marker(id, node, &style);
        }
        for child in dom.children(node) {
            match dom.data(child) {
                Some(NodeData::Element(_)) => {
                    if let Some(child_id) = self.build_element(child) {
                        self.arena.append_child(id, child_id);
                        let child_is_block = self
                            .arena
                            .get(child_id)
                            .is_some_and(|item| !item.is_inline_level() && !item.is_out_of_flow());
                        if child_is_block {
                            self.space_pending = true;
                        }
                    }
                }
                Some(NodeData::Text(text)) => self.build_text(id, child, text, &style),
                _ => {}
            }
        }

        self.fixup_children(id);
        if block_boundary {
            // Content after an atomic inline keeps its leading space.
            self.space_pending = self
                .arena
                .get(id)
                .is_none_or(|item| !item.is_inline_level());
        }
        Some(id)
    }

    fn build_text(&mut self, parent: RenderId, node: NodeId, text: &str, style: &Rc<ComputedStyle>) {
        let transformed = self.ctx.transform_text(text, style.text_transform);
        let font = self.font_for(style);
        let white_space = style.white_space;
        if white_space.collapses_spaces() {
            let mut word = String::new();
            let mut newlines = 0_usize;
            let mut in_space = false;
            for ch in transformed.chars() {
                if ch.is_ascii_whitespace() {
                    if !word.is_empty() {
                        self.emit(parent, node, style, font, RenderKind::Text, &word);
                        word.clear();
                    }
                    in_space = true;
                    if ch == '\n' {
                        newlines += 1;
                    }
                    continue;
                }
                if in_space {
                    self.emit_collapsed_space(parent, node, style, font, newlines);
                    in_space = false;
                    newlines = 0;
                }
                word.push(ch);
            }
            if in_space {
                self.emit_collapsed_space(parent, node, style, font, newlines);
            }
            if !word.is_empty() {
                self.emit(parent, node, style, font, RenderKind::Text, &word);
            }
            return;
        }

        let mut run = String::new();
        let mut run_is_space = false;
        for ch in transformed.chars() {
            let is_space = ch == ' ' || ch == '\t';
            if ch == '\r' {
                continue;
            }
            if ch == '\n' || is_space != run_is_space {
                if !run.is_empty() {
                    let kind = if run_is_space { RenderKind::Space } else { RenderKind::Text };
                    self.emit(parent, node, style, font, kind, &run);
                    run.clear();
                }
                run_is_space = is_space;
            }
            match ch {
                '\n' => self.emit(parent, node, style, font, RenderKind::LineBreak, ""),
                '\t' => run.push_str("        "),
                _ => run.push(ch),
            }
        }
        if !run.is_empty() {
            let kind = if run_is_space { RenderKind::Space } else { RenderKind::Text };
            self.emit(parent, node, style, font, kind, &run);
        }
    }

    fn emit_collapsed_space(
        &mut self,
        parent: RenderId,
        node: NodeId,
        style: &Rc<ComputedStyle>,
        font: FontInfo,
        newlines: usize,
    ) {
        if style.white_space.preserves_newlines() && newlines > 0 {
            for _ in 0..newlines {
                self.emit(parent, node, style, font, RenderKind::LineBreak, "");
            }
            return;
        }
        if !self.space_pending {
            self.emit(parent, node, style, font, RenderKind::Space, " ");
        }
    }

    fn emit(
        &mut self,
        parent: RenderId,
        node: NodeId,
        style: &Rc<ComputedStyle>,
        font: FontInfo,
        kind: RenderKind,
        text: &str,
    ) {
        let width = if text.is_empty() {
            0.0
        } else {
            self.ctx.text_width(text, font.handle)
        };
        let mut item = RenderItem::new(kind, node, Rc::clone(style));
        item.text = Some(text.to_owned());
        item.advance = width;
        item.font = Some(font);
        item.geometry.border_box = Rect::new(0.0, 0.0, width, font.metrics.ascent + font.metrics.descent);
        let id = self.push(item);
        self.arena.append_child(parent, id);
        self.space_pending = match kind {
            RenderKind::Space => style.white_space.collapses_spaces(),
            RenderKind::LineBreak => true,
            _ => false,
        };
    }

    fn build_marker(&mut self, list_item: RenderId, node: NodeId, style: &Rc<ComputedStyle>) {
        let image = style.list_style_image.clone();
        if style.list_style_type == ListStyleType::None && image.is_none() {
            return;
        }
        let font = self.font_for(style);
        let mut marker = RenderItem::new(RenderKind::ListMarker, node, Rc::clone(style));
        marker.anonymous = true;
        marker.hit_testable = false;
        marker.font = Some(font);
        if image.is_none() {
            let ordinal = self.list_ordinal(node);
            if let Some(text) = marker_text(style.list_style_type, ordinal) {
                marker.advance = self.ctx.text_width(&text, font.handle);
                marker.text = Some(text);
            }
        }
        marker.image = image;
        let id = self.arena.push(marker);
        self.arena.append_child(list_item, id);
        self.space_pending = true;
    }

    /// Position of a list item among its list-item siblings, honoring
    /// `<ol start>` and `<li value>`.
    fn list_ordinal(&self, node: NodeId) -> i64 {
        let Some(parent) = self.dom.parent(node) else {
            return 1;
        };
        let mut counter = self
            .dom
            .element(parent)
            .and_then(|list| list.attr("start"))
            .and_then(|start| start.trim().parse::<i64>().ok())
            .unwrap_or(1)
            - 1;
        for sibling in self.dom.element_children(parent) {
            let is_list_item = self
                .styles
                .get(sibling)
                .is_some_and(|style| style.display == Display::ListItem);
            if !is_list_item {
                continue;
            }
            counter = self
                .dom
                .element(sibling)
                .and_then(|item| item.attr("value"))
                .and_then(|value| value.trim().parse::<i64>().ok())
                .unwrap_or(counter + 1);
            if sibling == node {
                break;
            }
        }
        counter
    }

    fn anonymous(&mut self, kind: RenderKind, node: NodeId, style: ComputedStyle) -> RenderId {
        let mut item = RenderItem::new(kind, node, Rc::new(style));
        item.anonymous = true;
        self.arena.push(item)
    }

    fn fixup_children(&mut self, id: RenderId) {
        let Some(item) = self.arena.get(id) else {
            return;
        };
        let kind = item.kind;
        let node = item.node;
        let style = Rc::clone(&item.style);
        match kind {
            RenderKind::Table => self.fixup_table(id, node, &style),
            RenderKind::TableRowGroup => self.fixup_row_group(id, node, &style),
            RenderKind::TableRow => self.fixup_row(id, node, &style),
            RenderKind::Inline => {
                self.demote_table_parts(id);
                let has_block = self.children_of(id).iter().any(|child| self.is_in_flow_block(*child));
                if has_block {
                    log::trace!("inline box contains block-level content, treating it as a block");
                    if let Some(item) = self.arena.get_mut(id) {
                        item.kind = RenderKind::Block;
                    }
                    self.wrap_inline_runs(id, node, &style);
                }
            }
            _ if kind.is_block_container() => {
                self.demote_table_parts(id);
                self.wrap_inline_runs(id, node, &style);
            }
            _ => {}
        }
    }

    fn children_of(&self, id: RenderId) -> Vec<RenderId> {
        self.arena.children(id).to_vec()
    }

    fn set_children(&mut self, id: RenderId, children: Vec<RenderId>) {
        for child in &children {
            if let Some(item) = self.arena.get_mut(*child) {
                item.parent = Some(id);
            }
        }
        if let Some(item) = self.arena.get_mut(id) {
            item.children = children;
        }
    }

    fn is_in_flow_block(&self, id: RenderId) -> bool {
        self.arena.get(id).is_some_and(|item| {
            !item.is_inline_level() && !item.is_out_of_flow() && item.kind != RenderKind::ListMarker
        })
    }

    fn is_collapsible_space(&self, id: RenderId) -> bool {
        self.arena.get(id).is_some_and(|item| {
            item.kind == RenderKind::Space && item.style.white_space.collapses_spaces()
        })
    }

    /// Table parts outside of a table render as plain blocks.
    fn demote_table_parts(&mut self, id: RenderId) {
        for child in self.children_of(id) {
            if let Some(item) = self.arena.get_mut(child)
                && matches!(
                    item.kind,
                    RenderKind::TableRowGroup
                        | RenderKind::TableRow
                        | RenderKind::TableCell
                        | RenderKind::TableCaption
                )
            {
                item.kind = RenderKind::Block;
            }
        }
    }

    /// Wrap runs of inline-level children of a block container holding
    /// block-level children into anonymous blocks.
    fn wrap_inline_runs(&mut self, id: RenderId, node: NodeId, style: &ComputedStyle) {
        let children = self.children_of(id);
        if !children.iter().any(|child| self.is_in_flow_block(*child)) {
            return;
        }
        let mut result = Vec::with_capacity(children.len());
        let mut run: Vec<RenderId> = Vec::new();
        for child in children {
            if self.is_in_flow_block(child) {
                self.flush_run(node, style, &mut run, &mut result);
                result.push(child);
            } else {
                run.push(child);
            }
        }
        self.flush_run(node, style, &mut run, &mut result);
        self.set_children(id, result);
    }

    fn flush_run(
        &mut self,
        node: NodeId,
        style: &ComputedStyle,
        run: &mut Vec<RenderId>,
        result: &mut Vec<RenderId>,
    ) {
        if run.is_empty() {
            return;
        }
        let has_content = run.iter().any(|child| {
            self.arena.get(*child).is_some_and(|item| {
                item.is_inline_level() && !(item.kind == RenderKind::Space && item.style.white_space.collapses_spaces())
            })
        });
        if has_content {
            let wrapper = self.anonymous(RenderKind::Block, node, ComputedStyle::anonymous_block(style));
            self.set_children(wrapper, run.drain(..).collect());
            result.push(wrapper);
        } else {
            result.extend(run.drain(..).filter(|child| !self.is_collapsible_space(*child)));
        }
    }

    fn fixup_table(&mut self, id: RenderId, node: NodeId, style: &ComputedStyle) {
        let mut result = Vec::new();
        let mut cells: Vec<RenderId> = Vec::new();
        for child in self.children_of(id) {
            let kind = self.arena.get(child).map(|item| item.kind);
            match kind {
                Some(RenderKind::TableCaption | RenderKind::TableRowGroup | RenderKind::TableRow) => {
                    self.flush_cells(node, style, &mut cells, &mut result);
                    result.push(child);
                }
                _ if self.is_collapsible_space(child) => {}
                Some(RenderKind::TableCell) => cells.push(child),
                Some(_) => {
                    let cell = self.wrap_in_cell(node, style, child);
                    cells.push(cell);
                }
                None => {}
            }
        }
        self.flush_cells(node, style, &mut cells, &mut result);
        self.set_children(id, result);
    }

    fn fixup_row_group(&mut self, id: RenderId, node: NodeId, style: &ComputedStyle) {
        let mut result = Vec::new();
        let mut cells: Vec<RenderId> = Vec::new();
        for child in self.children_of(id) {
            let kind = self.arena.get(child).map(|item| item.kind);
            match kind {
                Some(RenderKind::TableRow) => {
                    self.flush_cells(node, style, &mut cells, &mut result);
                    result.push(child);
                }
                _ if self.is_collapsible_space(child) => {}
                Some(RenderKind::TableCell) => cells.push(child),
                Some(_) => {
                    let cell = self.wrap_in_cell(node, style, child);
                    cells.push(cell);
                }
                None => {}
            }
        }
        self.flush_cells(node, style, &mut cells, &mut result);
        self.set_children(id, result);
    }

    fn fixup_row(&mut self, id: RenderId, node: NodeId, style: &ComputedStyle) {
        let mut result = Vec::new();
        for child in self.children_of(id) {
            let kind = self.arena.get(child).map(|item| item.kind);
            match kind {
                Some(RenderKind::TableCell) => result.push(child),
                _ if self.is_collapsible_space(child) => {}
                Some(_) => result.push(self.wrap_in_cell(node, style, child)),
                None => {}
            }
        }
        self.set_children(id, result);
    }

    fn flush_cells(
        &mut self,
        node: NodeId,
        style: &ComputedStyle,
        cells: &mut Vec<RenderId>,
        result: &mut Vec<RenderId>,
    ) {
        if cells.is_empty() {
            return;
        }
        let mut row_style = ComputedStyle::inherit_from(style);
        row_style.display = Display::TableRow;
        let row = self.anonymous(RenderKind::TableRow, node, row_style);
        self.set_children(row, cells.drain(..).collect());
        result.push(row);
    }

    fn wrap_in_cell(&mut self, node: NodeId, style: &ComputedStyle, child: RenderId) -> RenderId {
        let mut cell_style = ComputedStyle::inherit_from(style);
        cell_style.display = Display::TableCell;
        let cell = self.anonymous(RenderKind::TableCell, node, cell_style);
        self.set_children(cell, vec![child]);
        cell
    }
}

/// `colspan`/`rowspan` value; missing, zero or malformed spans count as one.
fn span_attr(value: Option<&str>) -> usize {
    value
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|span| *span > 0)
        .map_or(1, |span| span.min(1000))
}

fn kind_for_display(display: Display) -> RenderKind {
    match display {
        Display::Inline => RenderKind::Inline,
        Display::InlineBlock => RenderKind::InlineBlock,
        Display::Table | Display::InlineTable => RenderKind::Table,
        Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup => {
            RenderKind::TableRowGroup
        }
        Display::TableRow => RenderKind::TableRow,
        Display::TableCell => RenderKind::TableCell,
        Display::TableCaption => RenderKind::TableCaption,
        Display::Block
        | Display::ListItem
        | Display::TableColumn
        | Display::TableColumnGroup
        | Display::None => RenderKind::Block,
    }
}

/// Marker text for counter styles; bullets have none.
pub fn marker_text(kind: ListStyleType, ordinal: i64) -> Option<String> {
    let body = match kind {
        ListStyleType::None | ListStyleType::Disc | ListStyleType::Circle | ListStyleType::Square => {
            return None;
        }
        ListStyleType::Decimal => ordinal.to_string(),
        ListStyleType::DecimalLeadingZero => format!("{ordinal:02}"),
        ListStyleType::LowerAlpha => alphabetic(ordinal)?,
        ListStyleType::UpperAlpha => alphabetic(ordinal)?.to_ascii_uppercase(),
        ListStyleType::LowerRoman => roman(ordinal)?.to_ascii_lowercase(),
        ListStyleType::UpperRoman => roman(ordinal)?,
    };
    Some(format!("{body}."))
}

fn alphabetic(ordinal: i64) -> Option<String> {
    if ordinal < 1 {
        return None;
    }
    let mut value = ordinal;
    let mut letters = Vec::new();
    while value > 0 {
        value -= 1;
        letters.push(char::from(b'a' + (value % 26) as u8));
        value /= 26;
    }
    Some(letters.iter().rev().collect())
}

fn roman(ordinal: i64) -> Option<String> {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if !(1..4000).contains(&ordinal) {
        return None;
    }
    let mut value = ordinal;
    let mut out = String::new();
    for (amount, numeral) in NUMERALS {
        while value >= amount {
            out.push_str(numeral);
            value -= amount;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_styles() {
        assert_eq!(marker_text(ListStyleType::Decimal, 3).as_deref(), Some("3."));
        assert_eq!(marker_text(ListStyleType::DecimalLeadingZero, 7).as_deref(), Some("07."));
        assert_eq!(marker_text(ListStyleType::LowerAlpha, 28).as_deref(), Some("ab."));
        assert_eq!(marker_text(ListStyleType::UpperRoman, 1994).as_deref(), Some("MCMXCIV."));
        assert_eq!(marker_text(ListStyleType::Disc, 1), None);
        assert_eq!(marker_text(ListStyleType::LowerRoman, 0), None);
    }
}

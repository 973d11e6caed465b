//! Inline formatting: breaking inline content into line boxes, horizontal
//! alignment and baseline-relative vertical placement.
//! Spec: <https://www.w3.org/TR/CSS22/visuren.html#inline-formatting>

use std::ops::Range;
use std::rc::Rc;

use css::{Overflow, Position, TextAlign, VerticalAlign};

use crate::arena::{LineBox, RenderId, RenderKind};
use crate::context::FontMetrics;
use crate::engine::{Containing, LayoutEngine, PendingAbsolute, border_edges, padding_edges, strut_of};
use crate::float::{Band, ExclusionSpace};
use crate::geometry::{Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum AtomKind {
    Word,
    Space { collapsible: bool, wraps: bool },
    Break,
    /// Inline-block, inline table or image.
    Atomic,
    /// Inside list marker.
    Marker,
    Float,
    Absolute,
    BoxStart,
    BoxEnd,
}

/// One unit of inline content in document order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Atom {
    pub kind: AtomKind,
    pub id: RenderId,
    /// Advance along the line.
    pub width: f32,
    /// Margin share of a box start or end advance.
    pub margin: f32,
    /// Extent above and below the atom's own baseline.
    pub above: f32,
    pub below: f32,
    /// A line may break after this atom.
    pub wraps: bool,
    /// Margin box as first laid out, for atomics and floats.
    pub provisional: Rect,
    /// Collapsed away at a line edge.
    pub hidden: bool,
}

impl Atom {
    fn new(kind: AtomKind, id: RenderId) -> Self {
        Self {
            kind,
            id,
            width: 0.0,
            margin: 0.0,
            above: 0.0,
            below: 0.0,
            wraps: true,
            provisional: Rect::default(),
            hidden: false,
        }
    }

    fn is_collapsible_space(&self) -> bool {
        matches!(self.kind, AtomKind::Space { collapsible: true, .. })
    }

    fn advances(&self) -> bool {
        !self.hidden && !matches!(self.kind, AtomKind::Float | AtomKind::Absolute)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InlineOutcome {
    pub bottom: f32,
    pub has_lines: bool,
}

/// An inline box open at the current position, with its accumulated
/// baseline raise.
#[derive(Clone, Copy, Debug)]
struct OpenBox {
    id: RenderId,
    raise: f32,
}

#[derive(Clone, Copy, Debug)]
struct Fragment {
    id: RenderId,
    start: f32,
    end: Option<f32>,
    raise: f32,
}

/// Per-container values shared by every line.
struct LineSetup {
    container: RenderId,
    align: TextAlign,
    strut: (f32, f32),
    metrics: FontMetrics,
    font_size: f32,
}

/// One assembled line waiting for placement.
struct LineSpan {
    start: usize,
    end: usize,
    top: f32,
    band: Band,
    indent: f32,
    justify: bool,
}

impl LayoutEngine<'_> {
    /// Flatten the inline-level descendants of `id` into atoms.
    pub(crate) fn collect_atoms(&mut self, id: RenderId, basis: f32, out: &mut Vec<Atom>) {
        let wraps = self.style(id).white_space.wraps();
        for child in self.children(id) {
            let Some(item) = self.item(child) else {
                continue;
            };
            let style = self.style(child);
            let kind = item.kind;
            let advance = item.advance;
            let font = item.font;
            let inline_level = item.is_inline_level();
            if style.is_out_of_flow_positioned() {
                out.push(Atom::new(AtomKind::Absolute, child));
                continue;
            }
            if style.is_floating() {
                out.push(Atom::new(AtomKind::Float, child));
                continue;
            }
            if !inline_level {
                continue;
            }
            match kind {
                RenderKind::Text | RenderKind::Space | RenderKind::LineBreak => {
                    let font = match font {
                        Some(font) => font,
                        None => self.font(&style),
                    };
                    let (above, below) = strut_of(&style, font);
                    let atom_kind = match kind {
                        RenderKind::Text => AtomKind::Word,
                        RenderKind::Space => AtomKind::Space {
                            collapsible: style.white_space.collapses_spaces(),
                            wraps: style.white_space.wraps(),
                        },
                        _ => AtomKind::Break,
                    };
                    let mut atom = Atom::new(atom_kind, child);
                    atom.width = if kind == RenderKind::LineBreak { 0.0 } else { advance };
                    atom.above = above;
                    atom.below = below;
                    atom.wraps = style.white_space.wraps();
                    out.push(atom);
                }
                RenderKind::Inline => {
                    let margin_left = style.margin.left.resolve_or_zero(basis);
                    let margin_right = style.margin.right.resolve_or_zero(basis);
                    let border = border_edges(&style);
                    let padding = padding_edges(&style, basis);
                    let font = self.font(&style);
                    let (above, below) = strut_of(&style, font);

                    let mut start = Atom::new(AtomKind::BoxStart, child);
                    start.width = margin_left + border.left + padding.left;
                    start.margin = margin_left;
                    start.above = above;
                    start.below = below;
                    start.wraps = false;
                    out.push(start);
                    self.collect_atoms(child, basis, out);
                    let mut end = Atom::new(AtomKind::BoxEnd, child);
                    end.width = margin_right + border.right + padding.right;
                    end.margin = margin_right;
                    end.wraps = false;
                    out.push(end);
                }
                RenderKind::ListMarker => {
                    let extent = self.marker_extent(child);
                    let font = self.font(&style);
                    let (above, below) = strut_of(&style, font);
                    let mut atom = Atom::new(AtomKind::Marker, child);
                    atom.width = extent.size.width + extent.gap;
                    atom.above = above.max(extent.size.height);
                    atom.below = below;
                    atom.wraps = false;
                    out.push(atom);
                }
                _ => {
                    let mut atom = Atom::new(AtomKind::Atomic, child);
                    atom.wraps = wraps;
                    out.push(atom);
                }
            }
        }
    }

    /// Lay out the inline content of `container` in line boxes starting at
    /// `top`, flowing around the floats of `space`.
    pub(crate) fn layout_inline_content(
        &mut self,
        container: RenderId,
        cb: Containing,
        top: f32,
        space: &mut ExclusionSpace,
    ) -> InlineOutcome {
        let style = self.style(container);
        let font = self.font(&style);
        let setup = LineSetup {
            container,
            align: style.text_align,
            strut: strut_of(&style, font),
            metrics: font.metrics,
            font_size: style.font_size,
        };
        let strut_height = setup.strut.0 + setup.strut.1;
        let first_indent = style.text_indent.resolve_or_zero(cb.width);

        let mut atoms = Vec::new();
        self.collect_atoms(container, cb.width, &mut atoms);
        self.measure_atomics(&mut atoms, cb, top);
        if let Some(item) = self.arena.get_mut(container) {
            item.lines.clear();
        }

        let mut settled = vec![false; atoms.len()];
        let mut deferred: Vec<usize> = Vec::new();
        let mut open: Vec<OpenBox> = Vec::new();
        let mut index = 0;
        let mut y = top;
        let mut first_line = true;
        let mut has_lines = false;

        while index < atoms.len() {
            for float in deferred.drain(..) {
                self.place_float(atoms[float].id, atoms[float].provisional, y, cb, space);
            }
            let indent = if first_line { first_indent } else { 0.0 };
            let mut band = space.band(y, strut_height, cb.x, cb.right());
            let mut available = band.width() - indent;

            let mut start = index;
            while start < atoms.len() && atoms[start].is_collapsible_space() {
                atoms[start].hidden = true;
                start += 1;
            }

            let mut cursor = start;
            let mut width = 0.0_f32;
            let mut has_content = false;
            let mut forced = false;
            let mut break_at: Option<usize> = None;
            let mut push_down: Option<f32> = None;
            while cursor < atoms.len() {
                let atom = atoms[cursor];
                match atom.kind {
                    AtomKind::Break => {
                        cursor += 1;
                        forced = true;
                        has_content = true;
                        break;
                    }
                    AtomKind::Float => {
                        if !settled[cursor] {
                            settled[cursor] = true;
                            if !has_content || width + atom.provisional.width <= available {
                                self.place_float(atom.id, atom.provisional, y, cb, space);
                                band = space.band(y, strut_height, cb.x, cb.right());
                                available = band.width() - indent;
                            } else {
                                deferred.push(cursor);
                            }
                        }
                        cursor += 1;
                    }
                    AtomKind::Absolute => {
                        if !settled[cursor] {
                            settled[cursor] = true;
                            let offset = Point::new(band.left + indent + width - cb.x, y - top);
                            self.defer_absolute(PendingAbsolute {
                                id: atom.id,
                                anchor: container,
                                offset,
                            });
                        }
                        cursor += 1;
                    }
                    AtomKind::Space { wraps, collapsible } => {
                        width += atom.width;
                        has_content |= !collapsible;
                        cursor += 1;
                        if wraps {
                            break_at = Some(cursor);
                        }
                    }
                    AtomKind::BoxStart | AtomKind::BoxEnd => {
                        width += atom.width;
                        has_content |= atom.width > 0.0;
                        cursor += 1;
                    }
                    AtomKind::Word | AtomKind::Atomic | AtomKind::Marker => {
                        let atomic = atom.kind == AtomKind::Atomic;
                        if atomic && atom.wraps && has_content {
                            break_at = Some(cursor);
                        }
                        if has_content
                            && width + atom.width > available
                            && let Some(position) = break_at
                        {
                            cursor = position;
                            break;
                        }
                        if !has_content
                            && atom.width > available
                            && space.narrows(y, strut_height, cb.x, cb.right())
                            && let Some(next) = space.next_edge_below(y)
                        {
                            push_down = Some(next);
                            break;
                        }
                        width += atom.width;
                        has_content = true;
                        cursor += 1;
                        if atomic && atom.wraps {
                            break_at = Some(cursor);
                        }
                    }
                }
            }

            if let Some(next) = push_down {
                log::trace!("line does not fit beside floats at {y}, moving to {next}");
                y = next;
                continue;
            }
            let end = cursor;
            let mut trim = end;
            while trim > start {
                let atom = &mut atoms[trim - 1];
                match atom.kind {
                    AtomKind::Space { collapsible: true, .. } => atom.hidden = true,
                    AtomKind::BoxStart | AtomKind::BoxEnd | AtomKind::Float | AtomKind::Absolute => {}
                    _ => break,
                }
                trim -= 1;
            }
            index = end;
            if !has_content {
                continue;
            }

            let span = LineSpan {
                start,
                end,
                top: y,
                band,
                indent,
                justify: setup.align == TextAlign::Justify && !forced && end < atoms.len(),
            };
            let height = self.finish_line(&setup, &atoms, &span, &mut open);
            y += height;
            first_line = false;
            has_lines = true;
        }
        for float in deferred.drain(..) {
            self.place_float(atoms[float].id, atoms[float].provisional, y, cb, space);
        }

        for atom in &atoms {
            if atom.kind == AtomKind::BoxStart
                && self
                    .item(atom.id)
                    .is_some_and(|item| item.style.position == Position::Relative)
            {
                self.apply_relative(atom.id, cb);
            }
        }

        InlineOutcome {
            bottom: y,
            has_lines,
        }
    }

    /// Lay out atomic inlines and floats once so their sizes are known.
    fn measure_atomics(&mut self, atoms: &mut [Atom], cb: Containing, top: f32) {
        for atom in atoms.iter_mut() {
            match atom.kind {
                AtomKind::Atomic => {
                    let rect = self.layout_atomic_box(atom.id, cb, Point::new(cb.x, top));
                    let baseline = self.atomic_baseline(atom.id, rect);
                    atom.provisional = rect;
                    atom.width = rect.width;
                    atom.above = baseline;
                    atom.below = rect.height - baseline;
                }
                AtomKind::Float => {
                    atom.provisional = self.layout_atomic_box(atom.id, cb, Point::new(cb.x, top));
                }
                _ => {}
            }
        }
    }

    /// Distance from the margin box top of an atomic inline to its baseline.
    fn atomic_baseline(&self, id: RenderId, margin_box: Rect) -> f32 {
        let Some(item) = self.item(id) else {
            return margin_box.height;
        };
        let baseline = match item.kind {
            RenderKind::InlineBlock if item.style.overflow == Overflow::Visible => {
                self.last_baseline(id)
            }
            RenderKind::Table => self.first_baseline(id),
            _ => None,
        };
        baseline.map_or(margin_box.height, |baseline| baseline - margin_box.y)
    }

    /// Raise of an inline box's content relative to its parent's baseline.
    fn baseline_raise(&self, id: RenderId) -> f32 {
        let Some(item) = self.item(id) else {
            return 0.0;
        };
        let parent_size = item
            .parent
            .and_then(|parent| self.item(parent))
            .map_or(item.style.font_size, |parent| parent.style.font_size);
        raise_for(item.style.vertical_align, parent_size)
    }

    /// Position the atoms of one line and record its line box. Returns the
    /// line height.
    fn finish_line(&mut self, setup: &LineSetup, atoms: &[Atom], span: &LineSpan, open: &mut Vec<OpenBox>) -> f32 {
        let line = &atoms[span.start..span.end];
        let used: f32 = line.iter().filter(|atom| atom.advances()).map(|atom| atom.width).sum();
        let spaces = line
            .iter()
            .filter(|atom| atom.advances() && matches!(atom.kind, AtomKind::Space { .. }))
            .count();
        let free = (span.band.width() - span.indent - used).max(0.0);
        let (offset, space_gap) = match setup.align {
            TextAlign::Left => (0.0, 0.0),
            TextAlign::Right => (free, 0.0),
            TextAlign::Center => (free / 2.0, 0.0),
            TextAlign::Justify if span.justify && spaces > 0 => (0.0, free / spaces as f32),
            TextAlign::Justify => (0.0, 0.0),
        };

        // Horizontal pass.
        let line_left = span.band.left + span.indent + offset;
        let mut x = line_left;
        let mut fragments: Vec<Fragment> = open
            .iter()
            .map(|entry| Fragment {
                id: entry.id,
                start: x,
                end: None,
                raise: entry.raise,
            })
            .collect();
        let mut raise = open.last().map_or(0.0, |entry| entry.raise);
        let mut placed: Vec<(usize, f32, f32)> = Vec::new();
        for (offset_index, atom) in line.iter().enumerate() {
            let index = span.start + offset_index;
            if atom.hidden {
                placed.push((index, x, raise));
                continue;
            }
            match atom.kind {
                AtomKind::Float | AtomKind::Absolute => {}
                AtomKind::BoxStart => {
                    let box_raise = raise + self.baseline_raise(atom.id);
                    fragments.push(Fragment {
                        id: atom.id,
                        start: x + atom.margin,
                        end: None,
                        raise: box_raise,
                    });
                    open.push(OpenBox {
                        id: atom.id,
                        raise: box_raise,
                    });
                    raise = box_raise;
                    x += atom.width;
                }
                AtomKind::BoxEnd => {
                    x += atom.width;
                    if let Some(fragment) = fragments
                        .iter_mut()
                        .rev()
                        .find(|fragment| fragment.id == atom.id && fragment.end.is_none())
                    {
                        fragment.end = Some(x - atom.margin);
                    }
                    if let Some(position) = open.iter().rposition(|entry| entry.id == atom.id) {
                        open.truncate(position);
                    }
                    raise = open.last().map_or(0.0, |entry| entry.raise);
                }
                AtomKind::Space { .. } => {
                    placed.push((index, x, raise));
                    x += atom.width + space_gap;
                }
                AtomKind::Word | AtomKind::Break | AtomKind::Atomic | AtomKind::Marker => {
                    placed.push((index, x, raise));
                    x += atom.width;
                }
            }
        }
        let line_right = x;

        // Vertical pass: the tallest extents above and below the baseline.
        let (mut above, mut below) = setup.strut;
        let mut edge_aligned = 0.0_f32;
        let mut raises: Vec<f32> = Vec::with_capacity(placed.len());
        for (index, _, box_raise) in &placed {
            let atom = atoms[*index];
            let mut atom_raise = *box_raise;
            if atom.kind == AtomKind::Atomic {
                let align = self
                    .item(atom.id)
                    .map_or(VerticalAlign::Baseline, |item| item.style.vertical_align);
                match align {
                    VerticalAlign::Top | VerticalAlign::Bottom => {
                        edge_aligned = edge_aligned.max(atom.above + atom.below);
                        raises.push(atom_raise);
                        continue;
                    }
                    VerticalAlign::Middle => {
                        atom_raise += setup.metrics.x_height / 2.0 - (atom.above - atom.below) / 2.0;
                    }
                    VerticalAlign::TextTop => {
                        atom_raise += setup.metrics.ascent - atom.above;
                    }
                    VerticalAlign::TextBottom => {
                        atom_raise += atom.below - setup.metrics.descent;
                    }
                    other => atom_raise += raise_for(other, setup.font_size),
                }
            }
            raises.push(atom_raise);
            if atom.hidden {
                continue;
            }
            above = above.max(atom.above + atom_raise);
            below = below.max(atom.below - atom_raise);
        }
        for fragment in &fragments {
            let Some(item) = self.item(fragment.id) else {
                continue;
            };
            let style = Rc::clone(&item.style);
            let font = self.font(&style);
            let (box_above, box_below) = strut_of(&style, font);
            above = above.max(box_above + fragment.raise);
            below = below.max(box_below - fragment.raise);
        }
        let height = (above + below).max(edge_aligned);
        let baseline = span.top + above;

        // Final placement.
        let mut items = Vec::with_capacity(placed.len());
        for ((index, atom_x, _), atom_raise) in placed.iter().zip(raises) {
            let atom = atoms[*index];
            match atom.kind {
                AtomKind::Atomic => {
                    let align = self
                        .item(atom.id)
                        .map_or(VerticalAlign::Baseline, |item| item.style.vertical_align);
                    let atom_top = match align {
                        VerticalAlign::Top => span.top,
                        VerticalAlign::Bottom => span.top + height - atom.provisional.height,
                        _ => baseline - atom_raise - atom.above,
                    };
                    self.arena.translate_subtree(
                        atom.id,
                        atom_x - atom.provisional.x,
                        atom_top - atom.provisional.y,
                    );
                }
                AtomKind::Marker => {
                    let extent = self.marker_extent(atom.id);
                    self.position_marker(atom.id, *atom_x, baseline - atom_raise, extent);
                }
                _ => {
                    let width = if atom.hidden { 0.0 } else { atom.width };
                    if let Some(item) = self.arena.get_mut(atom.id) {
                        let metrics = item.font.map(|font| font.metrics).unwrap_or_default();
                        item.geometry.border_box = Rect::new(
                            *atom_x,
                            baseline - atom_raise - metrics.ascent,
                            width,
                            metrics.ascent + metrics.descent,
                        );
                    }
                }
            }
            if !atom.hidden {
                items.push(atom.id);
            }
        }

        for fragment in fragments {
            self.push_fragment(fragment, line_right, baseline);
        }
        if let Some(item) = self.arena.get_mut(setup.container) {
            item.lines.push(LineBox {
                rect: Rect::new(span.band.left, span.top, span.band.width(), height),
                baseline,
                items,
            });
        }
        height
    }

    /// Record the border box of one line fragment of an inline box.
    fn push_fragment(&mut self, fragment: Fragment, line_right: f32, baseline: f32) {
        let style = self.style(fragment.id);
        let font = self.font(&style);
        let basis = self
            .item(fragment.id)
            .and_then(|item| item.parent)
            .and_then(|parent| self.item(parent))
            .map_or(0.0, |parent| parent.geometry.content_box().width);
        let border = border_edges(&style);
        let padding = padding_edges(&style, basis);
        let end = fragment.end.unwrap_or(line_right);
        let rect = fragment_rect(
            font.metrics,
            fragment.start..end,
            baseline - fragment.raise,
            (border.top + padding.top, border.bottom + padding.bottom),
        );
        if let Some(item) = self.arena.get_mut(fragment.id) {
            item.line_rects.push(rect);
        }
    }
}

/// Border box of an inline box fragment: the font's content area grown by
/// vertical borders and padding, which do not affect the line height.
fn fragment_rect(metrics: FontMetrics, span: Range<f32>, baseline: f32, extra: (f32, f32)) -> Rect {
    let (extra_top, extra_bottom) = extra;
    Rect::new(
        span.start,
        baseline - metrics.ascent - extra_top,
        (span.end - span.start).max(0.0),
        metrics.ascent + metrics.descent + extra_top + extra_bottom,
    )
}

/// Baseline raise of `sub`, `super` and lengths relative to a parent font.
fn raise_for(align: VerticalAlign, parent_font_size: f32) -> f32 {
    match align {
        VerticalAlign::Sub => -parent_font_size / 5.0,
        VerticalAlign::Super => parent_font_size / 3.0,
        VerticalAlign::Length(pixels) => pixels,
        VerticalAlign::Baseline
        | VerticalAlign::Top
        | VerticalAlign::TextTop
        | VerticalAlign::Middle
        | VerticalAlign::Bottom
        | VerticalAlign::TextBottom => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_raises_and_sub_lowers() {
        assert!(raise_for(VerticalAlign::Super, 15.0) > 0.0);
        assert!(raise_for(VerticalAlign::Sub, 15.0) < 0.0);
        assert_eq!(raise_for(VerticalAlign::Length(4.0), 15.0), 4.0);
        assert_eq!(raise_for(VerticalAlign::Middle, 15.0), 0.0);
    }
}

//! Pointer state machine: hover and active tracking, anchor activation and
//! redraw regions.

use std::collections::HashSet;
use std::iter;

use html::{Dom, ElementKind, NodeId};
use layout::{LayoutTree, Point, Rect, RenderId};

use crate::document::Document;
use crate::resources::resolve_url;

/// A link followed by a click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorActivation {
    /// `href` resolved against the document base.
    pub url: String,
    pub node: NodeId,
}

/// Result of one pointer event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerResponse {
    /// Document-coordinate regions that must be redrawn.
    pub redraw: Vec<Rect>,
    pub anchor: Option<AnchorActivation>,
}

/// The element under the pointer and the render item that was hit.
///
/// The item id belongs to one layout generation; after a re-layout it is
/// looked up again and may be `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Target {
    pub element: NodeId,
    pub item: Option<RenderId>,
}

#[derive(Debug, Default)]
pub(crate) struct Interaction {
    pub hover: Option<Target>,
    pub active: Option<Target>,
    pub last_pointer: Option<Point>,
    /// Cursor last sent to the backend.
    pub cursor: Option<String>,
}

impl Interaction {
    /// Re-resolve held render ids against a freshly built tree.
    pub fn refresh(&mut self, dom: &Dom, tree: &LayoutTree) {
        let at_pointer = self
            .last_pointer
            .and_then(|point| tree.hit_test(point));
        for target in [&mut self.hover, &mut self.active].into_iter().flatten() {
            let still_hit = at_pointer
                .filter(|hit| element_of(dom, tree, *hit) == Some(target.element));
            target.item = still_hit.or_else(|| tree.items_for(target.element).first().copied());
        }
    }
}

/// Element a render item belongs to; text runs answer their parent element.
pub(crate) fn element_of(dom: &Dom, tree: &LayoutTree, id: RenderId) -> Option<NodeId> {
    let node = tree.get(id)?.node;
    if dom.is_element(node) {
        Some(node)
    } else {
        dom.parent_element(node)
    }
}

/// `node` and its element ancestors.
fn element_chain(dom: &Dom, node: NodeId) -> HashSet<NodeId> {
    iter::once(node)
        .chain(dom.ancestors(node))
        .filter(|candidate| dom.is_element(*candidate))
        .collect()
}

/// Append the bounds of `nodes` to `redraw`, skipping rectangles already
/// present.
fn push_bounds(tree: &LayoutTree, nodes: &[NodeId], redraw: &mut Vec<Rect>) {
    for rect in nodes.iter().filter_map(|node| tree.node_bounds(*node)) {
        if !redraw.contains(&rect) {
            redraw.push(rect);
        }
    }
}

/// Nearest `<a href>` at or above `node`.
fn anchor_for(dom: &Dom, node: NodeId) -> Option<(NodeId, String)> {
    iter::once(node).chain(dom.ancestors(node)).find_map(|candidate| {
        let element = dom.element(candidate)?;
        if element.kind != ElementKind::Anchor {
            return None;
        }
        element
            .attr("href")
            .map(|href| (candidate, href.trim().to_owned()))
    })
}

impl Document {
    fn target_at(&self, point: Point) -> Option<Target> {
        let item = self.tree.hit_test(point)?;
        let element = element_of(&self.dom, &self.tree, item)?;
        Some(Target {
            element,
            item: Some(item),
        })
    }

    /// Element currently under the pointer.
    pub fn get_over_element(&self) -> Option<NodeId> {
        self.interaction.hover.map(|target| target.element)
    }

    /// Render item under the pointer in the current layout.
    pub fn hover_item(&self) -> Option<RenderId> {
        self.interaction
            .hover
            .and_then(|target| target.item)
            .filter(|id| self.tree.get(*id).is_some())
    }

    /// Pointer moved to (`x`, `y`) in document coordinates.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> PointerResponse {
        let point = Point::new(x, y);
        self.interaction.last_pointer = Some(point);
        let hit = self.target_at(point);
        let previous = self.interaction.hover;
        self.interaction.hover = hit;

        let mut response = PointerResponse::default();
        let before = previous.map(|target| target.element);
        let after = hit.map(|target| target.element);
        if before != after {
            log::trace!("hover moved from {before:?} to {after:?}");
            let touched: Vec<NodeId> = before.into_iter().chain(after).collect();
            let restyle = self.style_set.uses_hover();
            response.redraw = self.pointer_state_changed(&touched, restyle);
        }
        self.update_cursor();
        response
    }

    /// Button pressed at (`x`, `y`).
    pub fn on_pointer_down(&mut self, x: f32, y: f32) -> PointerResponse {
        let point = Point::new(x, y);
        self.interaction.last_pointer = Some(point);
        let hit = self.target_at(point);
        self.interaction.active = hit;
        let mut response = PointerResponse::default();
        if let Some(target) = hit
            && self.style_set.uses_active()
        {
            response.redraw = self.pointer_state_changed(&[target.element], true);
        }
        response
    }

    /// Button released at (`x`, `y`). Releasing over the same link that was
    /// pressed activates it.
    pub fn on_pointer_up(&mut self, x: f32, y: f32) -> PointerResponse {
        let point = Point::new(x, y);
        self.interaction.last_pointer = Some(point);
        let mut response = PointerResponse::default();
        let Some(pressed) = self.interaction.active.take() else {
            return response;
        };
        if self.style_set.uses_active() {
            response.redraw = self.pointer_state_changed(&[pressed.element], true);
        }

        let released = self.target_at(point).map(|target| target.element);
        let activation = anchor_for(&self.dom, pressed.element).filter(|(anchor, _)| {
            released.is_some_and(|node| self.dom.is_ancestor_or_self(*anchor, node))
        });
        if let Some((node, href)) = activation {
            let url = resolve_url(self.base_url(), &href);
            log::debug!("anchor activated: {url}");
            self.backend.on_anchor_click(&url, node);
            response.anchor = Some(AnchorActivation { url, node });
        }
        response
    }

    /// Pointer left the document area.
    pub fn on_pointer_leave(&mut self) -> PointerResponse {
        self.interaction.last_pointer = None;
        let mut response = PointerResponse::default();
        if let Some(previous) = self.interaction.hover.take() {
            let restyle = self.style_set.uses_hover();
            response.redraw = self.pointer_state_changed(&[previous.element], restyle);
        }
        self.update_cursor();
        response
    }

    /// Redraw regions after the hover or active element changed.
    ///
    /// The elements that were or became hovered or active are always
    /// redrawn. When rules depend on that state the document is restyled and
    /// laid out again, and every element whose computed style changed (an
    /// ancestor matching `:hover`, a descendant selected through it) is
    /// redrawn at its old and new position.
    fn pointer_state_changed(&mut self, touched: &[NodeId], restyle: bool) -> Vec<Rect> {
        let mut redraw = Vec::new();
        push_bounds(&self.tree, touched, &mut redraw);
        if !restyle || !self.config.hover_restyle {
            return redraw;
        }
        let before = self.tree.size();
        self.dynamic.hovered = self
            .interaction
            .hover
            .map(|target| element_chain(&self.dom, target.element))
            .unwrap_or_default();
        self.dynamic.active = self
            .interaction
            .active
            .map(|target| element_chain(&self.dom, target.element))
            .unwrap_or_default();
        let previous = self.styles.clone();
        self.restyle();
        let mut restyled = Vec::new();
        for (node, style) in self.styles.iter() {
            if previous.get(node).is_none_or(|old| old != style) {
                restyled.push(node);
            }
        }
        restyled.sort_unstable();
        log::trace!("{} elements restyled by pointer state", restyled.len());
        push_bounds(&self.tree, &restyled, &mut redraw);
        self.relayout();

        let after = self.tree.size();
        if after != before {
            // Geometry moved beyond the restyled elements.
            return vec![Rect::new(
                0.0,
                0.0,
                after.width.max(before.width),
                after.height.max(before.height),
            )];
        }
        push_bounds(&self.tree, touched, &mut redraw);
        push_bounds(&self.tree, &restyled, &mut redraw);
        redraw
    }

    /// Send the hovered element's cursor to the backend when it changes.
    fn update_cursor(&mut self) {
        let cursor = self
            .interaction
            .hover
            .and_then(|target| self.styles.get(target.element))
            .map_or_else(|| "auto".to_owned(), |style| style.cursor.clone());
        if self.interaction.cursor.as_deref() != Some(cursor.as_str()) {
            self.backend.set_cursor(&cursor);
            self.interaction.cursor = Some(cursor);
        }
    }
}

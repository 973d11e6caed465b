//! The laid out render tree: paint order, hit testing and geometry queries.

use std::collections::HashMap;

use css::{Overflow, Radii};
use html::NodeId;

use crate::arena::{RenderArena, RenderId, RenderItem, RenderKind};
use crate::geometry::{Point, Rect, Size};

/// One step of painting the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaintOp {
    /// Paint the backgrounds, borders and content of one item.
    Item(RenderId),
    /// Clip everything painted until the matching [`PaintOp::PopClip`].
    PushClip { rect: Rect, radii: Radii },
    PopClip,
}

#[derive(Debug)]
pub struct LayoutTree {
    arena: RenderArena,
    root: Option<RenderId>,
    by_node: HashMap<NodeId, Vec<RenderId>>,
    width: f32,
    size: Size,
    paint_ops: Vec<PaintOp>,
}

impl LayoutTree {
    pub(crate) fn new(
        arena: RenderArena,
        root: Option<RenderId>,
        by_node: HashMap<NodeId, Vec<RenderId>>,
        width: f32,
    ) -> Self {
        let mut tree = Self {
            arena,
            root,
            by_node,
            width,
            size: Size::default(),
            paint_ops: Vec::new(),
        };
        tree.size = tree.measure_extent();
        tree.paint_ops = tree.build_paint_ops();
        tree
    }

    /// A tree with no boxes, as produced for an empty document.
    pub fn empty(generation: u32) -> Self {
        Self::new(RenderArena::new(generation), None, HashMap::new(), 0.0)
    }

    pub fn root(&self) -> Option<RenderId> {
        self.root
    }

    pub fn arena(&self) -> &RenderArena {
        &self.arena
    }

    pub fn get(&self, id: RenderId) -> Option<&RenderItem> {
        self.arena.get(id)
    }

    pub fn generation(&self) -> u32 {
        self.arena.generation()
    }

    /// Width the tree was laid out for.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Extent of everything painted, from the document origin.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Render items generated for `node`, first one first.
    pub fn items_for(&self, node: NodeId) -> &[RenderId] {
        self.by_node.get(&node).map_or(&[], Vec::as_slice)
    }

    pub fn paint_ops(&self) -> &[PaintOp] {
        &self.paint_ops
    }

    /// Border box of the first render item of `node`; inline elements report
    /// the union of their line fragments.
    pub fn element_placement(&self, node: NodeId) -> Option<Rect> {
        let first = *self.items_for(node).first()?;
        let item = self.get(first)?;
        item.fragments()
            .into_iter()
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Area covered by every item of `node` and all of their descendants.
    pub fn node_bounds(&self, node: NodeId) -> Option<Rect> {
        self.items_for(node)
            .iter()
            .filter_map(|id| self.subtree_bounds(*id))
            .reduce(|acc, rect| acc.union(&rect))
    }

    fn subtree_bounds(&self, id: RenderId) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(item) = self.get(current) else {
                continue;
            };
            for rect in item.fragments() {
                if rect.is_empty() {
                    continue;
                }
                bounds = Some(bounds.map_or(rect, |acc| acc.union(&rect)));
            }
            stack.extend(item.children.iter().copied());
        }
        bounds
    }

    /// Border boxes of items that paint the image at `url`, as a list
    /// marker, an `<img>` or a background layer.
    pub fn image_rects(&self, url: &str) -> Vec<Rect> {
        self.arena
            .ids()
            .filter_map(|id| self.get(id))
            .filter(|item| {
                item.image.as_deref() == Some(url)
                    || item
                        .style
                        .background_layers
                        .iter()
                        .any(|layer| layer.image == url)
            })
            .flat_map(|item| item.fragments())
            .collect()
    }

    /// The innermost hit-testable item painted at `point`.
    ///
    /// Walks the paint order backwards, so the item painted last wins; a
    /// clipped region only answers for points inside the clip.
    pub fn hit_test(&self, point: Point) -> Option<RenderId> {
        self.paint_ops.iter().rev().find_map(|op| {
            let PaintOp::Item(id) = op else {
                return None;
            };
            let item = self.get(*id)?;
            let inside = item.hit_testable
                && item.fragments().iter().any(|rect| rect.contains(point))
                && !self.clipped_out(*id, point);
            inside.then_some(*id)
        })
    }

    /// Whether an ancestor with hidden overflow cuts `point` away from `id`.
    ///
    /// Follows paint order: a positioned box paints as its own layer outside
    /// the clips of the flow it escaped, so the walk stops there.
    fn clipped_out(&self, id: RenderId, point: Point) -> bool {
        let mut current = self.get(id);
        while let Some(item) = current {
            if item.style.is_positioned() {
                return false;
            }
            let Some(parent) = item.parent.and_then(|parent| self.get(parent)) else {
                break;
            };
            if clips_children(parent) && !parent.geometry.padding_box().contains(point) {
                return true;
            }
            current = Some(parent);
        }
        false
    }

    fn measure_extent(&self) -> Size {
        let mut size = Size::default();
        for id in self.arena.ids() {
            let Some(item) = self.get(id) else {
                continue;
            };
            for rect in item.fragments() {
                if rect.is_empty() {
                    continue;
                }
                size.width = size.width.max(rect.right());
                size.height = size.height.max(rect.bottom());
            }
            let margin_box = item.geometry.margin_box();
            if item.parent.is_none() {
                size.height = size.height.max(margin_box.bottom());
            }
        }
        size
    }

    /// Paint order: each positioned box paints as a layer after the normal
    /// flow of its parent layer, layers sorted by `z-index` with negative
    /// ones under the flow. Within a layer items paint in tree order.
    fn build_paint_ops(&self) -> Vec<PaintOp> {
        let mut ops = Vec::new();
        if let Some(root) = self.root {
            self.paint_layer(root, &mut ops);
        }
        ops
    }

    fn paint_layer(&self, root: RenderId, ops: &mut Vec<PaintOp>) {
        let mut flow = Vec::new();
        let mut layers: Vec<(i32, usize, RenderId)> = Vec::new();
        self.paint_flow(root, &mut flow, &mut layers);
        layers.sort_by_key(|(z_index, order, _)| (*z_index, *order));
        for (_, _, layer) in layers.iter().filter(|(z_index, _, _)| *z_index < 0) {
            self.paint_layer(*layer, ops);
        }
        ops.append(&mut flow);
        for (_, _, layer) in layers.iter().filter(|(z_index, _, _)| *z_index >= 0) {
            self.paint_layer(*layer, ops);
        }
    }

    fn paint_flow(&self, id: RenderId, ops: &mut Vec<PaintOp>, layers: &mut Vec<(i32, usize, RenderId)>) {
        let Some(item) = self.get(id) else {
            return;
        };
        ops.push(PaintOp::Item(id));
        let clip = clips_children(item);
        if clip {
            ops.push(PaintOp::PushClip {
                rect: item.geometry.padding_box(),
                radii: item.style.border_radius,
            });
        }
        for child in &item.children {
            let Some(child_item) = self.get(*child) else {
                continue;
            };
            if child_item.style.is_positioned() {
                let order = layers.len();
                layers.push((child_item.style.z_index.unwrap_or(0), order, *child));
            } else {
                self.paint_flow(*child, ops, layers);
            }
        }
        if clip {
            ops.push(PaintOp::PopClip);
        }
    }
}

fn clips_children(item: &RenderItem) -> bool {
    item.style.overflow != Overflow::Visible
        && (item.kind.is_block_container() || item.kind == RenderKind::Table)
}

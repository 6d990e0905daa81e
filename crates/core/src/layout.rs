//! Full-tree layout pass for one active root.
//!
//! The active root fills the viewport below the toolbar band. Every other node's
//! children are laid out inside the node's rectangle minus the side/bottom margin
//! and the band its own label occupies. The whole frame is recomputed on every
//! navigation change or resize.

use serde::Serialize;
use std::collections::HashMap;

use crate::color::{self, Shade};
use crate::config::TreemapConfig;
use crate::label::{self, LabelFit, TextMeasure};
use crate::model::{NodeId, Tree, TreeNode};
use crate::treemap::{squarify, Rect};

/// Everything a renderer needs to draw one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub rect: Rect,
    /// Depth below the active root (its direct children are 1).
    pub depth: usize,
    pub shade: Shade,
    pub label: String,
    pub fit: LabelFit,
    pub drillable: bool,
}

/// The laid-out, annotated view of the active subtree.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub viewport: Rect,
    pub active: NodeId,
    /// Breadcrumb/collapse band across the top of the viewport.
    pub toolbar: Rect,
    pub toolbar_shade: Shade,
    pub trail: String,
    /// Renderable nodes in paint order; a node always precedes its descendants.
    pub nodes: Vec<NodeView>,
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
}

impl Frame {
    pub fn get(&self, id: NodeId) -> Option<&NodeView> {
        self.index
            .get(&id)
            .and_then(|&i| self.nodes.get(i))
            .filter(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest rendered node under the point.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&NodeView> {
        self.nodes.iter().rev().find(|n| n.rect.contains(x, y))
    }

    pub fn in_toolbar(&self, x: f64, y: f64) -> bool {
        self.toolbar.contains(x, y)
    }

    /// The region the active root's children were laid out in.
    pub fn content(&self) -> Rect {
        Rect::new(
            self.viewport.x,
            self.viewport.y + self.toolbar.h,
            self.viewport.w,
            self.viewport.h - self.toolbar.h,
        )
    }
}

struct Pass<'a> {
    tree: &'a Tree,
    measure: &'a dyn TextMeasure,
    config: &'a TreemapConfig,
    nodes: Vec<NodeView>,
    index: HashMap<NodeId, usize>,
}

/// Lay out the subtree under `active` into `viewport`.
pub fn layout_frame(
    tree: &Tree,
    active: NodeId,
    trail: String,
    viewport: Rect,
    measure: &dyn TextMeasure,
    config: &TreemapConfig,
) -> Frame {
    let toolbar = Rect::new(
        viewport.x,
        viewport.y,
        viewport.w,
        config.toolbar_height.min(viewport.h.max(0.0)),
    );
    let mut pass = Pass {
        tree,
        measure,
        config,
        nodes: Vec::new(),
        index: HashMap::new(),
    };

    if let Some(root) = tree.get(active) {
        let content = Rect::new(
            viewport.x,
            viewport.y + toolbar.h,
            viewport.w,
            viewport.h - toolbar.h,
        );
        pass.layout_children(root, content, 1);
    } else {
        tracing::warn!(%active, "active root is not in the tree");
    }

    tracing::debug!(
        %active,
        rendered = pass.nodes.len(),
        width = viewport.w,
        height = viewport.h,
        "laid out frame"
    );

    Frame {
        viewport,
        active,
        toolbar,
        toolbar_shade: config.palette.toolbar(),
        trail,
        nodes: pass.nodes,
        index: pass.index,
    }
}

impl Pass<'_> {
    fn layout_children(&mut self, parent: &TreeNode, region: Rect, depth: usize) {
        if parent.children.is_empty() {
            return;
        }
        if region.is_degenerate() {
            tracing::trace!(id = %parent.id, ?region, "no room for children");
            return;
        }
        let children: Vec<&TreeNode> = self.tree.children(parent.id).collect();
        let total: f64 = children.iter().map(|c| c.weight).sum();
        if !(total > 0.0) {
            tracing::trace!(id = %parent.id, "sibling group has no weight");
            return;
        }

        // weights to area units so strip thickness comes out in pixels
        let scale = region.w * region.h / total;
        let weights: Vec<(NodeId, f64)> = children.iter().map(|c| (c.id, c.weight * scale)).collect();

        for item in squarify(&weights, region) {
            if item.rect.is_degenerate() {
                continue;
            }
            let Some(node) = self.tree.get(item.id) else {
                continue;
            };
            let fit = label::fit(node.label(), &item.rect, self.measure, self.config);
            let shade = color::shade_node(self.tree, node, self.config.color_mode, &self.config.palette);

            self.index.insert(node.id, self.nodes.len());
            self.nodes.push(NodeView {
                id: node.id,
                rect: item.rect,
                depth,
                shade,
                label: node.label().to_string(),
                fit,
                drillable: node.kind.is_drillable(),
            });

            let margin = self.config.margin;
            let inner = Rect::new(
                item.rect.x + margin,
                item.rect.y + fit.reserved_height,
                item.rect.w - 2.0 * margin,
                item.rect.h - fit.reserved_height - margin,
            );
            self.layout_children(node, inner, depth + 1);
        }
    }
}

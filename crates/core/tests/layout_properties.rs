//! Property tests for the treemap packer, the frame layout and navigation.
//!
//! 1. Strips conserve the area they were given.
//! 2. Sibling rectangles never overlap.
//! 3. Every sibling rectangle stays inside the parent rectangle.
//! 4. Strip numbers follow input order.
//! 5. Laid out nodes are nested inside their parent's rectangle.
//! 6. Expanding a node and collapsing back out returns to the root.

use proptest::prelude::*;
use treeheat_core::{
    build_tree, layout_frame, squarify, AverageCharMeasure, Navigator, NodeId, NodeKind, RawNode,
    Rect, Transition, TreemapConfig,
};

const EPS: f64 = 1e-6;

// ── Helpers ─────────────────────────────────────────────────────────────

fn area_strategy() -> impl Strategy<Value = Rect> {
    (0.0f64..200.0, 0.0f64..200.0, 1.0f64..600.0, 1.0f64..600.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

/// Size-descending weights already scaled so they sum to the area.
fn scaled_weights(area: Rect) -> impl Strategy<Value = Vec<(NodeId, f64)>> {
    prop::collection::vec(0.5f64..100.0, 1..24).prop_map(move |mut raw| {
        raw.sort_by(|a, b| b.total_cmp(a));
        let total: f64 = raw.iter().sum();
        let scale = area.area() / total;
        raw.into_iter()
            .enumerate()
            .map(|(i, w)| (NodeId(i as u64 + 1), w * scale))
            .collect()
    })
}

fn packed() -> impl Strategy<Value = (Rect, Vec<(NodeId, f64)>)> {
    area_strategy().prop_flat_map(|area| (Just(area), scaled_weights(area)))
}

fn leaf(name: String, weight: f64) -> RawNode {
    RawNode {
        name: Some(name),
        weight: Some(weight),
        kind: Some("FILE".into()),
        ..RawNode::default()
    }
}

fn dir(name: String, children: Vec<RawNode>) -> RawNode {
    let weight = children.iter().filter_map(|c| c.weight).sum();
    RawNode {
        name: Some(name),
        weight: Some(weight),
        kind: Some("DIR".into()),
        children: Some(children),
        ..RawNode::default()
    }
}

/// Two levels of directories over leaves with random weights.
fn dataset() -> impl Strategy<Value = RawNode> {
    prop::collection::vec(prop::collection::vec(1.0f64..50.0, 1..6), 1..6).prop_map(|groups| {
        let dirs = groups
            .into_iter()
            .enumerate()
            .map(|(i, leaves)| {
                let files = leaves
                    .into_iter()
                    .enumerate()
                    .map(|(j, w)| leaf(format!("f{i}_{j}"), w))
                    .collect();
                dir(format!("d{i}"), files)
            })
            .collect();
        dir("root".into(), dirs)
    })
}

/// A chain of `depth` directories, each with a file beside the next directory.
fn chain(depth: usize) -> RawNode {
    let mut node = leaf("bottom".into(), 1.0);
    for level in (0..depth).rev() {
        node = dir(format!("level{level}"), vec![node, leaf(format!("side{level}"), 1.0)]);
    }
    dir("root".into(), vec![node])
}

fn inside(inner: &Rect, outer: &Rect) -> bool {
    inner.x >= outer.x - EPS
        && inner.y >= outer.y - EPS
        && inner.right() <= outer.right() + EPS
        && inner.bottom() <= outer.bottom() + EPS
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Area conservation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn strips_conserve_area((area, weights) in packed()) {
        let items = squarify(&weights, area);
        prop_assert_eq!(items.len(), weights.len());
        let covered: f64 = items.iter().map(|i| i.rect.area()).sum();
        prop_assert!(
            (covered - area.area()).abs() <= area.area() * 1e-9,
            "covered {} of {}", covered, area.area()
        );
        for (item, (id, weight)) in items.iter().zip(&weights) {
            prop_assert_eq!(item.id, *id);
            prop_assert!((item.rect.area() - weight).abs() <= weight * 1e-6 + EPS);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. No overlap and 3. containment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn siblings_do_not_overlap((area, weights) in packed()) {
        let items = squarify(&weights, area);
        for (i, a) in items.iter().enumerate() {
            prop_assert!(inside(&a.rect, &area), "{:?} escapes {:?}", a.rect, area);
            prop_assert!(a.rect.w.is_finite() && a.rect.h.is_finite());
            for b in &items[i + 1..] {
                let shared = a.rect.intersection_area(&b.rect);
                prop_assert!(shared <= area.area() * 1e-9 + EPS, "{:?} overlaps {:?}", a.rect, b.rect);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Strip order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rows_are_contiguous((area, weights) in packed()) {
        let items = squarify(&weights, area);
        prop_assert_eq!(items[0].row, 0);
        for pair in items.windows(2) {
            prop_assert!(pair[1].row == pair[0].row || pair[1].row == pair[0].row + 1);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Nesting in a full frame
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn frame_nodes_nest_inside_parents(raw in dataset(), w in 50.0f64..1200.0, h in 60.0f64..900.0) {
        let tree = build_tree(raw);
        let config = TreemapConfig::default();
        let frame = layout_frame(
            &tree,
            tree.root,
            String::new(),
            Rect::new(0.0, 0.0, w, h),
            &AverageCharMeasure::default(),
            &config,
        );
        let content = frame.content();
        for view in &frame.nodes {
            prop_assert!(!view.rect.is_degenerate());
            let node = tree.get(view.id).unwrap();
            let parent = node.parent.unwrap();
            let outer = if parent == tree.root {
                content
            } else {
                frame.get(parent).unwrap().rect
            };
            prop_assert!(inside(&view.rect, &outer), "{} {:?} escapes {:?}", view.id, view.rect, outer);
            prop_assert_eq!(view.depth, tree.depth(view.id));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Navigation round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn expand_then_collapse_returns_to_root(depth in 1usize..8, pick in any::<prop::sample::Index>()) {
        let tree = build_tree(chain(depth));
        let dirs: Vec<NodeId> = tree
            .nodes
            .iter()
            .filter(|n| !n.is_root() && n.kind == NodeKind::Dir)
            .map(|n| n.id)
            .collect();
        let target = dirs[pick.index(dirs.len())];

        let mut nav = Navigator::new(&tree);
        prop_assert_eq!(
            nav.expand(&tree, target),
            Transition::RootChanged { from: tree.root, to: target }
        );
        prop_assert_eq!(nav.breadcrumb().len(), tree.depth(target));
        prop_assert_eq!(nav.expand(&tree, target), Transition::Unchanged);

        for _ in 0..tree.depth(target) {
            prop_assert!(nav.collapse().is_changed());
        }
        prop_assert_eq!(nav.active(), tree.root);
        prop_assert_eq!(nav.collapse(), Transition::Unchanged);
    }
}

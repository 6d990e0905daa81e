//! Drill-down state: which node is the active root and how the user got there.

use serde::Serialize;

use crate::config::WeightUnit;
use crate::human;
use crate::model::{NodeId, Tree, TreeNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreadcrumbEntry {
    pub id: NodeId,
    pub name: Option<String>,
    pub weight: f64,
}

impl From<&TreeNode> for BreadcrumbEntry {
    fn from(node: &TreeNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            weight: node.weight,
        }
    }
}

/// Result of a navigation request. `RootChanged` tells the renderer to lay out and
/// draw again; `Unchanged` needs no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    RootChanged { from: NodeId, to: NodeId },
}

impl Transition {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::RootChanged { .. })
    }
}

/// Holds node ids only; the tree itself belongs to whoever built it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigator {
    root: NodeId,
    active: NodeId,
    breadcrumb: Vec<BreadcrumbEntry>,
}

impl Navigator {
    pub fn new(tree: &Tree) -> Self {
        Self {
            root: tree.root,
            active: tree.root,
            breadcrumb: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn active(&self) -> NodeId {
        self.active
    }

    /// Drill points passed through, oldest first; the last entry is the active root.
    pub fn breadcrumb(&self) -> &[BreadcrumbEntry] {
        &self.breadcrumb
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.breadcrumb.iter().any(|e| e.id == id)
    }

    /// Make `id` the active root.
    ///
    /// Ancestors between the current trail and `id` are added too, so a node several
    /// levels down can be opened in one click. Roots, leaves, unknown ids and nodes
    /// already on the trail are ignored.
    pub fn expand(&mut self, tree: &Tree, id: NodeId) -> Transition {
        let Some(node) = tree.get(id) else {
            tracing::debug!(%id, "expand: unknown node");
            return Transition::Unchanged;
        };
        if node.is_root() || !node.kind.is_drillable() || self.is_expanded(id) {
            tracing::debug!(%id, kind = node.kind.as_str(), "expand: ignored");
            return Transition::Unchanged;
        }

        let mut path = vec![BreadcrumbEntry::from(node)];
        let mut joined_at = None;
        for ancestor in tree.ancestors(id) {
            if ancestor.is_root() {
                break;
            }
            if let Some(pos) = self.breadcrumb.iter().position(|e| e.id == ancestor.id) {
                joined_at = Some(pos);
                break;
            }
            path.push(BreadcrumbEntry::from(ancestor));
        }
        path.reverse();

        // Keep only the part of the trail that is still an ancestor of `id`.
        match joined_at {
            Some(pos) => self.breadcrumb.truncate(pos + 1),
            None => self.breadcrumb.clear(),
        }
        self.breadcrumb.extend(path);

        let from = self.active;
        self.active = id;
        tracing::debug!(%from, to = %id, depth = self.breadcrumb.len(), "expanded");
        Transition::RootChanged { from, to: id }
    }

    /// Step back out one level.
    pub fn collapse(&mut self) -> Transition {
        if self.breadcrumb.pop().is_none() {
            return Transition::Unchanged;
        }
        let from = self.active;
        self.active = self.breadcrumb.last().map(|e| e.id).unwrap_or(self.root);
        tracing::debug!(%from, to = %self.active, "collapsed");
        Transition::RootChanged {
            from,
            to: self.active,
        }
    }

    /// `"root / a / b: <weight of active root>"`, as shown in the collapse band.
    pub fn trail_label(&self, tree: &Tree, unit: WeightUnit) -> String {
        let root = tree.get(self.root);
        let mut parts = vec![root.map(|r| r.label()).unwrap_or("")];
        parts.extend(self.breadcrumb.iter().map(|e| e.name.as_deref().unwrap_or("")));
        let weight = match self.breadcrumb.last() {
            Some(last) => last.weight,
            None => root.map(|r| r.weight).unwrap_or(0.0),
        };
        format!("{}: {}", parts.join(" / "), human::format_weight(weight, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;

    // root(0) -> A(1) -> B(2) -> C(3) -> leaf(4); root -> D(5) -> E(6)
    fn sample() -> Tree {
        build(
            r#"{"name":"root","weight":20,"type":"DIR","children":[
                {"name":"A","weight":12,"type":"DIR","children":[
                    {"name":"B","weight":12,"type":"DIR","children":[
                        {"name":"C","weight":12,"type":"DIR","children":[{"name":"leaf","weight":12,"type":"FILE"}]}
                    ]}
                ]},
                {"name":"D","weight":8,"type":"DIR","children":[{"name":"E","weight":8,"type":"DIR"}]}
            ]}"#,
        )
        .unwrap()
    }

    fn trail(nav: &Navigator) -> Vec<u64> {
        nav.breadcrumb().iter().map(|e| e.id.0).collect()
    }

    #[test]
    fn deep_expand_records_skipped_ancestors() {
        let tree = sample();
        let mut nav = Navigator::new(&tree);
        let t = nav.expand(&tree, NodeId(3));
        assert_eq!(t, Transition::RootChanged { from: NodeId(0), to: NodeId(3) });
        assert_eq!(trail(&nav), [1, 2, 3]);
        assert_eq!(nav.active(), NodeId(3));
    }

    #[test]
    fn expand_is_idempotent() {
        let tree = sample();
        let mut nav = Navigator::new(&tree);
        nav.expand(&tree, NodeId(2));
        let once = nav.clone();
        assert_eq!(nav.expand(&tree, NodeId(2)), Transition::Unchanged);
        assert_eq!(nav, once);
        assert_eq!(nav.expand(&tree, NodeId(1)), Transition::Unchanged);
        assert_eq!(trail(&nav), [1, 2]);
    }

    #[test]
    fn stepwise_expand_then_collapse_round_trips() {
        let tree = sample();
        let mut nav = Navigator::new(&tree);
        nav.expand(&tree, NodeId(1));
        nav.expand(&tree, NodeId(3));
        assert_eq!(trail(&nav), [1, 2, 3]);

        assert_eq!(nav.collapse(), Transition::RootChanged { from: NodeId(3), to: NodeId(2) });
        assert_eq!(nav.collapse(), Transition::RootChanged { from: NodeId(2), to: NodeId(1) });
        assert_eq!(nav.collapse(), Transition::RootChanged { from: NodeId(1), to: NodeId(0) });
        assert_eq!(nav.collapse(), Transition::Unchanged);
        assert!(nav.breadcrumb().is_empty());
        assert_eq!(nav.active(), tree.root);
    }

    #[test]
    fn root_leaf_and_unknown_are_ignored() {
        let tree = sample();
        let mut nav = Navigator::new(&tree);
        assert_eq!(nav.expand(&tree, NodeId(0)), Transition::Unchanged);
        assert_eq!(nav.expand(&tree, NodeId(4)), Transition::Unchanged);
        assert_eq!(nav.expand(&tree, NodeId(99)), Transition::Unchanged);
        assert!(nav.breadcrumb().is_empty());
    }

    #[test]
    fn expanding_outside_the_trail_replaces_it() {
        let tree = sample();
        let mut nav = Navigator::new(&tree);
        nav.expand(&tree, NodeId(2));
        nav.expand(&tree, NodeId(6));
        assert_eq!(trail(&nav), [5, 6]);
        nav.collapse();
        nav.collapse();
        assert_eq!(nav.active(), tree.root);
    }

    #[test]
    fn trail_label_names_the_path() {
        let tree = sample();
        let mut nav = Navigator::new(&tree);
        assert_eq!(nav.trail_label(&tree, WeightUnit::Count), "root: 20");
        nav.expand(&tree, NodeId(2));
        assert_eq!(nav.trail_label(&tree, WeightUnit::Count), "root / A / B: 12");
    }
}

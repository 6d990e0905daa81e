use serde::{Deserialize, Serialize};
use std::fmt;

/// Pre-order index of a node; also its slot in [`Tree::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl Default for NodeId {
    fn default() -> Self {
        NodeId(0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Dir,
}

impl NodeKind {
    /// Interpret a dataset `type`/`kind` tag. Unknown tags are leaves.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "dir" | "directory" | "folder" | "container" => NodeKind::Dir,
            _ => NodeKind::File,
        }
    }

    pub fn is_drillable(self) -> bool {
        matches!(self, NodeKind::Dir)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Dir => "dir",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub weight: f64,
    /// `None` means the dataset carried no heat for this node.
    pub heat: Option<f64>,
    /// Sorted by descending weight at build time.
    pub children: Vec<NodeId>,
}

impl TreeNode {
    /// The display label; unnamed nodes render as an empty string.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Spread of heat values across one dataset.
///
/// Both bounds start at zero and only widen, so a dataset without any heat yields
/// the degenerate `{0, 0}` range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatRange {
    pub min: f64,
    pub max: f64,
}

impl HeatRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn include(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        }
        if value < self.min {
            self.min = value;
        }
    }

    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.spread() > 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Tree {
    pub root: NodeId,
    pub nodes: Vec<TreeNode>,
    pub heat: HeatRange,
}

impl Tree {
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn root_node(&self) -> Option<&TreeNode> {
        self.get(self.root)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|c| self.get(*c))
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(|n| n.parent),
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.get(self.next?)?;
        self.next = node.parent;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_range_only_widens() {
        let mut range = HeatRange::default();
        range.include(3.0);
        range.include(-2.0);
        range.include(1.0);
        assert_eq!(range, HeatRange::new(-2.0, 3.0));
        assert!(!range.is_degenerate());
        assert!(HeatRange::default().is_degenerate());
    }

    #[test]
    fn kind_tags() {
        assert_eq!(NodeKind::from_tag("DIR"), NodeKind::Dir);
        assert_eq!(NodeKind::from_tag("Directory"), NodeKind::Dir);
        assert_eq!(NodeKind::from_tag("FILE"), NodeKind::File);
        assert_eq!(NodeKind::from_tag("symlink"), NodeKind::File);
    }
}

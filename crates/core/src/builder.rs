//! Turns the nested dataset format into an id-indexed [`Tree`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{HeatRange, NodeId, NodeKind, Tree, TreeNode};

/// One node of the dataset as it arrives on the wire.
///
/// Every field is optional; the builder fills in defaults rather than rejecting
/// sparse input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "size",
        alias = "loc",
        alias = "proportion",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    #[serde(default, alias = "heatmap", skip_serializing_if = "Option::is_none")]
    pub heat: Option<f64>,
    #[serde(default, rename = "type", alias = "kind", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    fn sanitized_weight(&self) -> f64 {
        match self.weight {
            Some(w) if w.is_finite() && w >= 0.0 => w,
            Some(w) => {
                tracing::warn!(name = ?self.name, weight = w, "dropping invalid weight");
                0.0
            }
            None => 0.0,
        }
    }
}

/// Parse serialized dataset text. Blank input is an empty root, like `{}`.
///
/// Nesting depth is unbounded; the stack grows on demand while deserializing.
pub fn parse(raw: &str) -> Result<RawNode> {
    if raw.trim().is_empty() {
        return Ok(RawNode::default());
    }
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let node = RawNode::deserialize(serde_stacker::Deserializer::new(&mut de)).map_err(Error::MalformedInput)?;
    de.end().map_err(Error::MalformedInput)?;
    Ok(node)
}

/// Parse and build in one step.
pub fn build(raw: &str) -> Result<Tree> {
    Ok(build_tree(parse(raw)?))
}

/// Assign pre-order ids starting at 0, sort children by descending weight and
/// compute the dataset's heat range.
pub fn build_tree(raw: RawNode) -> Tree {
    let mut nodes = Vec::new();
    let root = push_nodes(raw, &mut nodes);

    let mut heat = HeatRange::default();
    for h in nodes.iter().filter_map(|n| n.heat) {
        heat.include(h);
    }

    tracing::debug!(
        nodes = nodes.len(),
        heat_min = heat.min,
        heat_max = heat.max,
        "built tree"
    );
    Tree { root, nodes, heat }
}

/// Pre-order walk with an explicit stack so depth is bounded by memory only.
fn push_nodes(root: RawNode, nodes: &mut Vec<TreeNode>) -> NodeId {
    let weight = root.sanitized_weight();
    let mut stack: Vec<(RawNode, f64, Option<NodeId>)> = vec![(root, weight, None)];

    while let Some((raw, weight, parent)) = stack.pop() {
        let id = NodeId(nodes.len() as u64);
        let mut children: Vec<(f64, RawNode)> = raw
            .children
            .unwrap_or_default()
            .into_iter()
            .map(|c| (c.sanitized_weight(), c))
            .collect();
        // sort_by is stable: equal weights keep their input order
        children.sort_by(|a, b| b.0.total_cmp(&a.0));

        let kind = match raw.kind.as_deref() {
            Some(tag) => NodeKind::from_tag(tag),
            None if !children.is_empty() => NodeKind::Dir,
            None => NodeKind::File,
        };

        nodes.push(TreeNode {
            id,
            parent,
            name: raw.name,
            kind,
            weight,
            heat: raw.heat.filter(|h| h.is_finite()),
            children: Vec::with_capacity(children.len()),
        });
        if let Some(p) = parent {
            nodes[p.0 as usize].children.push(id);
        }

        // reversed so the heaviest child is popped, and numbered, first
        stack.extend(children.into_iter().rev().map(|(w, c)| (c, w, Some(id))));
    }
    NodeId(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_preorder_ids_after_sorting() {
        let tree = build(
            r#"{"name":"root","weight":10,"type":"DIR","children":[
                {"name":"small","weight":1},
                {"name":"big","weight":9,"type":"DIR","children":[{"name":"leaf","weight":9}]}
            ]}"#,
        )
        .unwrap();

        let names: Vec<_> = tree.nodes.iter().map(|n| n.label().to_string()).collect();
        assert_eq!(names, ["root", "big", "leaf", "small"]);
        for (i, n) in tree.nodes.iter().enumerate() {
            assert_eq!(n.id, NodeId(i as u64));
        }
        assert_eq!(tree.root, NodeId(0));
        assert_eq!(tree.get(NodeId(2)).unwrap().parent, Some(NodeId(1)));
        assert_eq!(tree.get(NodeId(0)).unwrap().children, vec![NodeId(1), NodeId(3)]);
    }

    #[test]
    fn equal_weights_keep_input_order() {
        let tree = build(r#"{"children":[{"name":"a","weight":2},{"name":"b","weight":3},{"name":"c","weight":2}]}"#)
            .unwrap();
        let names: Vec<_> = tree.children(tree.root).map(|n| n.label()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn defaults_for_missing_fields() {
        let tree = build(r#"{"children":[{}]}"#).unwrap();
        let root = tree.root_node().unwrap();
        assert_eq!(root.name, None);
        assert_eq!(root.weight, 0.0);
        assert_eq!(root.kind, NodeKind::Dir);
        let child = tree.get(NodeId(1)).unwrap();
        assert_eq!(child.kind, NodeKind::File);
        assert!(child.children.is_empty());
        assert_eq!(child.heat, None);
    }

    #[test]
    fn aliases_are_accepted() {
        let tree = build(r#"{"name":"r","loc":7,"heatmap":3,"kind":"directory","children":null}"#).unwrap();
        let root = tree.root_node().unwrap();
        assert_eq!(root.weight, 7.0);
        assert_eq!(root.heat, Some(3.0));
        assert_eq!(root.kind, NodeKind::Dir);
    }

    #[test]
    fn heat_range_ignores_missing_heat() {
        let tree = build(r#"{"children":[{"heat":4},{"heat":-1},{"weight":3}]}"#).unwrap();
        assert_eq!(tree.heat, HeatRange::new(-1.0, 4.0));

        let cold = build(r#"{"children":[{"weight":3}]}"#).unwrap();
        assert_eq!(cold.heat, HeatRange::new(0.0, 0.0));
    }

    #[test]
    fn negative_weight_is_zeroed() {
        let tree = build(r#"{"weight":-4}"#).unwrap();
        assert_eq!(tree.root_node().unwrap().weight, 0.0);
    }

    #[test]
    fn blank_input_is_an_empty_root() {
        let tree = build("  ").unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(build("{\"name\":"), Err(Error::MalformedInput(_))));
        assert!(matches!(build("[1,2,3]"), Err(Error::MalformedInput(_))));
        assert!(matches!(build(r#"{"weight":"heavy"}"#), Err(Error::MalformedInput(_))));
        assert!(matches!(build(r#"{"name":"a"} trailing"#), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn deeply_nested_dataset_builds() {
        const DEPTH: usize = 200;
        let mut json = r#"{"name":"leaf","weight":1}"#.to_string();
        for level in (0..DEPTH).rev() {
            json = format!(r#"{{"name":"n{level}","weight":1,"children":[{json}]}}"#);
        }

        let tree = build(&json).unwrap();
        assert_eq!(tree.len(), DEPTH + 1);
        let leaf = NodeId(DEPTH as u64);
        assert_eq!(tree.get(leaf).unwrap().label(), "leaf");
        assert_eq!(tree.get(leaf).unwrap().kind, NodeKind::File);
        assert_eq!(tree.depth(leaf), DEPTH);
        assert_eq!(tree.get(NodeId(5)).unwrap().parent, Some(NodeId(4)));
    }
}

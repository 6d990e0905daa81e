use bytesize::ByteSize;

use crate::config::WeightUnit;
use crate::model::TreeNode;

pub fn human_bytes(b: impl Into<u128>) -> String {
    let b: u128 = b.into();
    ByteSize::b(u64::try_from(b).unwrap_or(u64::MAX)).to_string()
}

/// Whole numbers print without decimals, everything else with two.
pub fn format_weight(weight: f64, unit: WeightUnit) -> String {
    match unit {
        WeightUnit::Bytes if weight.is_finite() && weight >= 0.0 => human_bytes(weight.round() as u64),
        _ if weight.fract() == 0.0 => format!("{weight:.0}"),
        _ => format!("{weight:.2}"),
    }
}

/// Hover text for a node, one `key=value` per line.
pub fn tooltip_lines(node: &TreeNode, unit: WeightUnit) -> Vec<String> {
    let mut lines = vec![
        format!("label={}", node.label()),
        format!("value={}", format_weight(node.weight, unit)),
        format!("type={}", node.kind.as_str()),
    ];
    if let Some(heat) = node.heat {
        lines.push(format!("heatmap={}", heat.round()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, NodeKind};

    #[test]
    fn weights() {
        assert_eq!(format_weight(12.0, WeightUnit::Count), "12");
        assert_eq!(format_weight(2.5, WeightUnit::Count), "2.50");
        let size = format_weight(2048.0, WeightUnit::Bytes);
        assert!(size.starts_with('2') && size.ends_with('B'), "{size}");
    }

    #[test]
    fn tooltip() {
        let mut node = TreeNode {
            id: NodeId(3),
            parent: Some(NodeId(0)),
            name: Some("main.rs".into()),
            kind: NodeKind::File,
            weight: 120.0,
            heat: Some(7.6),
            children: Vec::new(),
        };
        assert_eq!(
            tooltip_lines(&node, WeightUnit::Count),
            ["label=main.rs", "value=120", "type=file", "heatmap=8"]
        );
        node.heat = None;
        assert_eq!(tooltip_lines(&node, WeightUnit::Count).len(), 3);
    }
}

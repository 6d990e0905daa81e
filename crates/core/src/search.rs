use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::model::{NodeId, Tree};

pub fn fuzzy_score(needle: &str, hay: &str) -> Option<i64> {
    let m = SkimMatcherV2::default();
    m.fuzzy_match(hay, needle)
}

/// Follow `a/b/c` by name from the root. The root's own name is not part of the path.
pub fn resolve_path(tree: &Tree, path: &str) -> Option<NodeId> {
    let mut current = tree.root;
    for part in path.split('/').filter(|p| !p.is_empty()) {
        current = tree.children(current).find(|c| c.label() == part)?.id;
    }
    Some(current)
}

/// Best fuzzy name match; ties go to the shallower, then earlier, node.
pub fn best_match(tree: &Tree, query: &str) -> Option<NodeId> {
    let matcher = SkimMatcherV2::default();
    tree.nodes
        .iter()
        .filter_map(|n| matcher.fuzzy_match(n.label(), query).map(|s| (s, n.id)))
        .max_by(|(sa, a), (sb, b)| {
            sa.cmp(sb)
                .then_with(|| tree.depth(*b).cmp(&tree.depth(*a)))
                .then_with(|| b.cmp(a))
        })
        .map(|(_, id)| id)
}

/// Exact path first, then fuzzy name.
pub fn find(tree: &Tree, query: &str) -> Option<NodeId> {
    if query.contains('/') {
        if let Some(id) = resolve_path(tree, query) {
            return Some(id);
        }
    }
    tree.nodes
        .iter()
        .find(|n| n.label() == query)
        .map(|n| n.id)
        .or_else(|| best_match(tree, query))
}

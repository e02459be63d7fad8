// 🔍 Filter Engine - ancestor-preserving search
//
// Prunes the forest to the smallest sub-forest holding every match together
// with its full path to the root:
//
//   keep(node) = matches(node) || any(keep(child))
//
// A kept node's children are replaced by its surviving children only.

use crate::tree::TreeNode;

/// Normalized search needle, or None for a blank query
fn needle(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Case-insensitive match against title + code + manual code.
///
/// `needle` must already be lowercased.
pub fn node_matches(node: &TreeNode, needle: &str) -> bool {
    let haystack = format!("{}{}{}", node.title, node.code, node.manual_code).to_lowercase();
    haystack.contains(needle)
}

fn prune(node: TreeNode, needle: &str) -> Option<TreeNode> {
    let self_match = node_matches(&node, needle);
    let TreeNode {
        id,
        kind,
        title,
        manual_code,
        status,
        code,
        children,
    } = node;

    let survivors = children.map(|children| {
        children
            .into_iter()
            .filter_map(|child| prune(child, needle))
            .collect::<Vec<_>>()
    });

    let has_survivors = survivors.as_ref().map_or(false, |s| !s.is_empty());
    if !self_match && !has_survivors {
        return None;
    }

    Some(TreeNode {
        id,
        kind,
        title,
        manual_code,
        status,
        code,
        children: survivors,
    })
}

/// Filter a built forest by a free-text query.
///
/// A blank query hands the forest back untouched.
pub fn filter_tree(tree: Vec<TreeNode>, query: &str) -> Vec<TreeNode> {
    let Some(needle) = needle(query) else {
        return tree;
    };

    let filtered: Vec<TreeNode> = tree
        .into_iter()
        .filter_map(|root| prune(root, &needle))
        .collect();

    tracing::debug!(query = %needle, roots = filtered.len(), "chart tree filtered");
    filtered
}

/// True when the query is non-blank, i.e. a search is active
pub fn is_active_query(query: &str) -> bool {
    needle(query).is_some()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AccountNode, NodeKey, NodeKind, NodeStore, Status};
    use crate::tree::{build_tree, walk_forest};
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};

    fn node(kind: NodeKind, id: &str, parent: Option<&str>, title: &str, code: &str) -> AccountNode {
        AccountNode::with_id(
            id.to_string(),
            kind,
            parent.map(str::to_string),
            title.to_string(),
            code.to_string(),
            Status::Active,
        )
    }

    fn sample_tree() -> Vec<TreeNode> {
        let mut store = NodeStore::new();
        for n in [
            node(NodeKind::Class, "c1", None, "Assets", "1000"),
            node(NodeKind::Group, "g1", Some("c1"), "Current Assets", "1100"),
            node(NodeKind::SubGroup, "s1", Some("g1"), "Cash", "10"),
            node(NodeKind::Control, "k1", Some("s1"), "Banks", "01"),
            node(NodeKind::GlAccount, "a1", Some("k1"), "Main Checking", "001"),
            node(NodeKind::GlAccount, "a2", Some("k1"), "Savings", "002"),
            node(NodeKind::Group, "g2", Some("c1"), "Fixed Assets", "1200"),
            node(NodeKind::Class, "c2", None, "Liabilities", "2000"),
            node(NodeKind::Group, "g3", Some("c2"), "Payables", "2100"),
        ] {
            store.insert(n).unwrap();
        }
        build_tree(&store)
    }

    fn ids(forest: &[TreeNode]) -> Vec<String> {
        let mut out = Vec::new();
        walk_forest(forest, |n, _| out.push(n.id.clone()));
        out
    }

    #[test]
    fn test_blank_query_is_identity() {
        let tree = sample_tree();
        assert_eq!(filter_tree(tree.clone(), ""), tree);
        assert_eq!(filter_tree(tree.clone(), "   \t"), tree);
    }

    #[test]
    fn test_root_self_match_keeps_only_matching_branch_children() {
        let tree = sample_tree();
        let filtered = filter_tree(tree, "Assets");

        // Assets, Current Assets, Fixed Assets match; Cash chain does not
        assert_eq!(ids(&filtered), vec!["c1", "g1", "g2"]);
    }

    #[test]
    fn test_single_branch_scenario() {
        let mut store = NodeStore::new();
        store.insert(node(NodeKind::Class, "c1", None, "Assets", "1000")).unwrap();
        store.insert(node(NodeKind::Group, "g1", Some("c1"), "Current Assets", "1100")).unwrap();
        let tree = build_tree(&store);

        assert_eq!(filter_tree(tree.clone(), "Assets"), tree);
        assert!(filter_tree(tree, "zzz").is_empty());
    }

    #[test]
    fn test_deep_match_drags_ancestors() {
        let filtered = filter_tree(sample_tree(), "savings");

        assert_eq!(ids(&filtered), vec!["c1", "g1", "s1", "k1", "a2"]);
        let control = &filtered[0].children()[0].children()[0].children()[0];
        assert_eq!(control.children().len(), 1);
    }

    #[test]
    fn test_matches_on_composed_code() {
        let filtered = filter_tree(sample_tree(), "1000-1100-10-01-001");
        assert_eq!(ids(&filtered), vec!["c1", "g1", "s1", "k1", "a1"]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(ids(&filter_tree(sample_tree(), "PAYABLES")), vec!["c2", "g3"]);
    }

    #[test]
    fn test_self_match_with_no_surviving_children_keeps_empty_children() {
        let filtered = filter_tree(sample_tree(), "banks");
        let control = &filtered[0].children()[0].children()[0].children()[0];

        assert_eq!(control.id, "k1");
        assert_eq!(control.children, Some(Vec::new()));
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    fn random_tree() -> impl Strategy<Value = Vec<TreeNode>> {
        let words = prop_oneof![Just("cash"), Just("bank"), Just("loan"), Just("tax"), Just("rent")];
        let record = (0usize..5, 0usize..4, 0usize..4, words, "[0-9]{0,2}");
        proptest::collection::vec(record, 1..50).prop_map(|records| {
            let mut store = NodeStore::new();
            for (level, id, parent, title, code) in records {
                let kind = NodeKind::ALL[level];
                let parent_id = kind.parent_kind().map(|_| format!("n{}", parent));
                let _ = store.insert(AccountNode::with_id(
                    format!("n{}", id),
                    kind,
                    parent_id,
                    title.to_string(),
                    code,
                    Status::Active,
                ));
            }
            build_tree(&store)
        })
    }

    fn parent_map(forest: &[TreeNode]) -> HashMap<NodeKey, NodeKey> {
        let mut parents = HashMap::new();
        walk_forest(forest, |n, _| {
            for child in n.children() {
                parents.insert(child.key(), n.key());
            }
        });
        parents
    }

    fn check_survivors(node: &TreeNode, needle: &str) -> bool {
        let ok = node_matches(node, needle) || !node.children().is_empty();
        ok && node.children().iter().all(|c| check_survivors(c, needle))
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

        #[test]
        fn blank_query_identity(tree in random_tree()) {
            prop_assert_eq!(filter_tree(tree.clone(), ""), tree);
        }

        #[test]
        fn every_match_keeps_its_ancestors(
            tree in random_tree(),
            query in prop_oneof![Just("cash"), Just("an"), Just("1"), Just("x")],
        ) {
            let parents = parent_map(&tree);
            let mut matching = Vec::new();
            walk_forest(&tree, |n, _| if node_matches(n, query) { matching.push(n.key()) });

            let filtered = filter_tree(tree, query);
            let mut kept = HashSet::new();
            walk_forest(&filtered, |n, _| { kept.insert(n.key()); });

            for key in matching {
                prop_assert!(kept.contains(&key));
                let mut cursor = key;
                while let Some(parent) = parents.get(&cursor) {
                    prop_assert!(kept.contains(parent));
                    cursor = parent.clone();
                }
            }
        }

        #[test]
        fn every_survivor_matches_or_has_children(
            tree in random_tree(),
            query in prop_oneof![Just("bank"), Just("ta"), Just("0"), Just("zzz")],
        ) {
            let filtered = filter_tree(tree, query);
            for root in &filtered {
                prop_assert!(check_survivors(root, query));
            }
        }
    }
}

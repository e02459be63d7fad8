// 📂 Expansion Tracker - which subtrees are rendered open
//
// Absent key means collapsed. An active search renders every node open
// without touching the stored map, so clearing the search brings back
// exactly the state the user left.

use crate::code::display_code;
use crate::entities::{NodeKey, Status};
use crate::filter::is_active_query;
use crate::tree::{walk_forest, TreeNode};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    open: HashMap<NodeKey, bool>,
}

impl ExpansionState {
    /// Everything collapsed
    pub fn new() -> Self {
        ExpansionState {
            open: HashMap::new(),
        }
    }

    /// Initial load: every top-level Class open, everything else collapsed
    pub fn initial(tree: &[TreeNode]) -> Self {
        let mut state = ExpansionState::new();
        for root in tree {
            state.open.insert(root.key(), true);
        }
        state
    }

    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.open.get(key).copied().unwrap_or(false)
    }

    /// Effective state while rendering: an active search forces everything open
    pub fn is_visible_open(&self, key: &NodeKey, query: &str) -> bool {
        is_active_query(query) || self.is_expanded(key)
    }

    /// Flip one entry; returns the new value
    pub fn toggle(&mut self, key: &NodeKey) -> bool {
        let next = !self.is_expanded(key);
        self.open.insert(key.clone(), next);
        next
    }

    pub fn set(&mut self, key: NodeKey, expanded: bool) {
        self.open.insert(key, expanded);
    }

    /// Open every node that can have children. GL Accounts get no entry.
    pub fn expand_all(&mut self, tree: &[TreeNode]) {
        walk_forest(tree, |node, _| {
            if !node.kind.is_leaf() {
                self.open.insert(node.key(), true);
            }
        });
    }

    pub fn collapse_all(&mut self) {
        self.open.clear();
    }

    /// Snapshot of the stored map (the read surface)
    pub fn entries(&self) -> &HashMap<NodeKey, bool> {
        &self.open
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

// ============================================================================
// RENDER PROJECTION
// ============================================================================

/// One visible line of the rendered tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub key: NodeKey,
    pub depth: usize,
    pub title: String,
    /// Composed code, or the placeholder when empty
    pub code: String,
    pub status: Status,
    pub has_children: bool,
    pub expanded: bool,
}

fn push_rows(node: &TreeNode, depth: usize, state: &ExpansionState, query: &str, rows: &mut Vec<TreeRow>) {
    let key = node.key();
    let expanded = !node.is_leaf() && state.is_visible_open(&key, query);

    rows.push(TreeRow {
        key,
        depth,
        title: node.title.clone(),
        code: display_code(&node.code).to_string(),
        status: node.status,
        has_children: node.has_children(),
        expanded,
    });

    if expanded {
        for child in node.children() {
            push_rows(child, depth + 1, state, query, rows);
        }
    }
}

/// Flatten an already filtered forest into the rows a list view shows
pub fn visible_rows(tree: &[TreeNode], state: &ExpansionState, query: &str) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    for root in tree {
        push_rows(root, 0, state, query, &mut rows);
    }
    rows
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AccountNode, NodeKind, NodeStore};
    use crate::filter::filter_tree;
    use crate::tree::build_tree;

    fn sample_tree() -> Vec<TreeNode> {
        let mut store = NodeStore::new();
        let records = [
            (NodeKind::Class, "c1", None, "Assets", "1"),
            (NodeKind::Group, "g1", Some("c1"), "Current Assets", "1"),
            (NodeKind::SubGroup, "s1", Some("g1"), "Cash", ""),
            (NodeKind::Control, "k1", Some("s1"), "Banks", "1"),
            (NodeKind::GlAccount, "a1", Some("k1"), "Checking", "1"),
            (NodeKind::Class, "c2", None, "Liabilities", "2"),
        ];
        for (kind, id, parent, title, code) in records {
            store
                .insert(AccountNode::with_id(
                    id.to_string(),
                    kind,
                    parent.map(str::to_string),
                    title.to_string(),
                    code.to_string(),
                    Status::Active,
                ))
                .unwrap();
        }
        build_tree(&store)
    }

    fn titles(rows: &[TreeRow]) -> Vec<&str> {
        rows.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_initial_opens_classes_only() {
        let tree = sample_tree();
        let state = ExpansionState::initial(&tree);

        assert!(state.is_expanded(&NodeKey::new(NodeKind::Class, "c1")));
        assert!(state.is_expanded(&NodeKey::new(NodeKind::Class, "c2")));
        assert!(!state.is_expanded(&NodeKey::new(NodeKind::Group, "g1")));
        assert_eq!(state.len(), 2);

        let rows = visible_rows(&tree, &state, "");
        assert_eq!(titles(&rows), vec!["Assets", "Current Assets", "Liabilities"]);
    }

    #[test]
    fn test_toggle_flips_single_entry() {
        let mut state = ExpansionState::new();
        let key = NodeKey::new(NodeKind::Group, "g1");

        assert!(state.toggle(&key));
        assert!(state.is_expanded(&key));
        assert!(!state.toggle(&key));
        assert!(!state.is_expanded(&key));
    }

    #[test]
    fn test_expand_all_skips_leaves() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        state.expand_all(&tree);

        assert_eq!(state.len(), 5);
        assert!(!state.entries().contains_key(&NodeKey::new(NodeKind::GlAccount, "a1")));

        let rows = visible_rows(&tree, &state, "");
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[4].depth, 4);
        assert!(!rows[4].expanded);

        state.collapse_all();
        assert!(state.is_empty());
        assert_eq!(titles(&visible_rows(&tree, &state, "")), vec!["Assets", "Liabilities"]);
    }

    #[test]
    fn test_search_forces_open_without_mutating_state() {
        let tree = sample_tree();
        let state = ExpansionState::new();
        let before = state.clone();

        let filtered = filter_tree(tree.clone(), "checking");
        let rows = visible_rows(&filtered, &state, "checking");

        assert_eq!(titles(&rows), vec!["Assets", "Current Assets", "Cash", "Banks", "Checking"]);
        assert_eq!(state, before);
        assert_eq!(titles(&visible_rows(&tree, &state, "")), vec!["Assets", "Liabilities"]);
    }

    #[test]
    fn test_row_code_placeholder() {
        let tree = sample_tree();
        let mut state = ExpansionState::new();
        state.expand_all(&tree);
        let rows = visible_rows(&tree, &state, "");

        assert_eq!(rows[0].code, "1");
        assert_eq!(rows[2].code, "1-1");
        assert_eq!(rows[3].code, "1-1-1");
        assert!(!rows[5].has_children);

        let mut blank = NodeStore::new();
        blank
            .insert(AccountNode::with_id(
                "x".to_string(),
                NodeKind::Class,
                None,
                "Uncoded".to_string(),
                String::new(),
                Status::Active,
            ))
            .unwrap();
        let rows = visible_rows(&build_tree(&blank), &ExpansionState::new(), "");
        assert_eq!(rows[0].code, "—");
    }
}

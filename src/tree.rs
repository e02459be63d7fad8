// 🌲 Tree Builder - projects the flat store into a rooted forest
//
// Classes are the roots, GL Accounts the leaves. Every emitted node carries
// its composed code. Records whose parent chain does not resolve are left
// out of the forest instead of failing the build.

use crate::code::compose_code;
use crate::entities::{AccountNode, NodeKey, NodeKind, NodeStore, Status};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

// ============================================================================
// TREE NODE
// ============================================================================

/// A node of the built hierarchy, ready for filtering and rendering.
///
/// `children` is `Some` (possibly empty) for every level except GL Account,
/// which is always a leaf with `children == None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub title: String,
    pub manual_code: String,
    pub status: Status,

    /// Composed code, root to this node
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    fn from_record(node: &AccountNode, code: String) -> Self {
        TreeNode {
            id: node.id.clone(),
            kind: node.kind,
            title: node.title.clone(),
            manual_code: node.manual_code.clone(),
            status: node.status,
            code,
            children: if node.kind.is_leaf() { None } else { Some(Vec::new()) },
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind, self.id.clone())
    }

    /// Children as a slice (empty for leaves)
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Pre-order walk over this node and all descendants
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a TreeNode, usize)) {
        visit(self, depth);
        for child in self.children() {
            child.walk_at(depth + 1, visit);
        }
    }
}

/// Pre-order walk over a whole forest; the callback receives each node and its depth
pub fn walk_forest<'a>(forest: &'a [TreeNode], mut visit: impl FnMut(&'a TreeNode, usize)) {
    for root in forest {
        root.walk(&mut visit);
    }
}

/// Total number of nodes in a forest
pub fn count_nodes(forest: &[TreeNode]) -> usize {
    let mut count = 0;
    walk_forest(forest, |_, _| count += 1);
    count
}

// ============================================================================
// ORDERING
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

/// Split into alternating runs of ASCII digits and everything else
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        out.push(make_chunk(&s[start..], prev));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Numeric-aware comparison: "9" < "10", "A2" < "a10".
///
/// Digit runs compare by value, text runs case-insensitively, digits sort
/// before text. Strings equal under those rules fall back to plain byte
/// order so the result is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Sibling order: manual code, then title, then id
pub fn sibling_cmp(a: &AccountNode, b: &AccountNode) -> Ordering {
    natural_cmp(&a.manual_code, &b.manual_code)
        .then_with(|| natural_cmp(&a.title, &b.title))
        .then_with(|| a.id.cmp(&b.id))
}

// ============================================================================
// BUILD
// ============================================================================

/// Children grouped by (child kind, parent id)
type ChildIndex<'a> = HashMap<(NodeKind, &'a str), Vec<&'a AccountNode>>;

fn index_children(store: &NodeStore) -> ChildIndex<'_> {
    let mut index: ChildIndex<'_> = HashMap::new();
    for node in store.all() {
        if let Some(parent_id) = node.parent_id.as_deref() {
            index.entry((node.kind, parent_id)).or_default().push(node);
        }
    }
    for siblings in index.values_mut() {
        siblings.sort_by(|a, b| sibling_cmp(a, b));
    }
    index
}

fn build_node<'a>(node: &'a AccountNode, index: &ChildIndex<'a>, codes: &mut Vec<&'a str>) -> TreeNode {
    codes.push(node.manual_code.as_str());
    let mut tree_node = TreeNode::from_record(node, compose_code(codes.iter().map(|c| Some(*c))));

    if let (Some(child_kind), Some(children)) = (node.kind.child_kind(), tree_node.children.as_mut()) {
        if let Some(records) = index.get(&(child_kind, node.id.as_str())) {
            children.extend(records.iter().map(|child| build_node(*child, index, codes)));
        }
    }

    codes.pop();
    tree_node
}

/// Build the full forest from the store.
///
/// Deterministic for a given set of records regardless of insertion order.
pub fn build_tree(store: &NodeStore) -> Vec<TreeNode> {
    let index = index_children(store);

    let mut classes: Vec<&AccountNode> = store.by_kind(NodeKind::Class).collect();
    classes.sort_by(|a, b| sibling_cmp(a, b));

    let mut codes = Vec::with_capacity(NodeKind::ALL.len());
    let forest: Vec<TreeNode> = classes
        .into_iter()
        .map(|class| build_node(class, &index, &mut codes))
        .collect();

    let built = count_nodes(&forest);
    if built < store.count() {
        tracing::debug!(
            built,
            omitted = store.count() - built,
            "chart tree built; records with unresolved parents omitted"
        );
    } else {
        tracing::debug!(built, "chart tree built");
    }

    forest
}

// ============================================================================
// TESTS
// ============================================================================

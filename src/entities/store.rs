// 🗄️ Node Store - arena of all chart records keyed by (kind, id)
//
// The five levels live in one collection. Children are resolved by
// key lookup, never by embedded references, so a record whose parent
// is missing simply fails to resolve instead of breaking the store.

use super::node::{AccountNode, NodeKey, NodeKind};
use std::collections::BTreeMap;

/// In-memory store of every record in the chart.
///
/// Single owner, no interior locking: every read and write happens inside
/// one synchronous event handler at a time.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: BTreeMap<NodeKey, AccountNode>,
}

impl NodeStore {
    /// Create new empty store
    pub fn new() -> Self {
        NodeStore {
            nodes: BTreeMap::new(),
        }
    }

    /// Insert a record. Fails if the (kind, id) pair is already taken.
    pub fn insert(&mut self, node: AccountNode) -> Result<(), String> {
        let key = node.key();
        if self.nodes.contains_key(&key) {
            return Err(format!("Duplicate {} id: {}", node.kind, node.id));
        }
        self.nodes.insert(key, node);
        Ok(())
    }

    pub fn get(&self, key: &NodeKey) -> Option<&AccountNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: &NodeKey) -> Option<&mut AccountNode> {
        self.nodes.get_mut(key)
    }

    /// Lookup by kind and id without building a key
    pub fn find(&self, kind: NodeKind, id: &str) -> Option<&AccountNode> {
        self.nodes.get(&NodeKey::new(kind, id))
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// All records of one level, in key order
    pub fn by_kind(&self, kind: NodeKind) -> impl Iterator<Item = &AccountNode> + '_ {
        self.nodes.values().filter(move |node| node.kind == kind)
    }

    pub fn all(&self) -> impl Iterator<Item = &AccountNode> + '_ {
        self.nodes.values()
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.by_kind(kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent record of a node, if it resolves
    pub fn get_parent(&self, node: &AccountNode) -> Option<&AccountNode> {
        node.parent_key().and_then(|key| self.get(&key))
    }

    /// Ancestor chain root → ... → node.
    ///
    /// Stops at the first parent that does not resolve, so a broken chain
    /// yields a partial path that does not start at a Class.
    pub fn get_path(&self, key: &NodeKey) -> Vec<&AccountNode> {
        let Some(node) = self.get(key) else {
            return Vec::new();
        };

        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.get_parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// True when the node exists and every ancestor up to a Class exists
    pub fn resolves(&self, key: &NodeKey) -> bool {
        self.get_path(key)
            .first()
            .map(|root| root.is_root())
            .unwrap_or(false)
    }

    /// Direct children of a node (unsorted)
    pub fn get_children(&self, key: &NodeKey) -> Vec<&AccountNode> {
        let Some(child_kind) = key.kind.child_kind() else {
            return Vec::new();
        };
        self.by_kind(child_kind)
            .filter(|child| child.parent_id.as_deref() == Some(key.id.as_str()))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

// 🌳 Account Node - one record of the five-level chart of accounts
//
// Class → Group → Sub-Group → Control → GL Account
//
// All five levels share one record shape. The level is a tag (NodeKind)
// and the parent reference is a plain id that always points exactly one
// level up. Identity (id) never changes; title and status can.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// NODE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Top level (e.g. "Assets")
    Class,

    /// Second level, child of a Class
    Group,

    /// Third level, child of a Group
    SubGroup,

    /// Fourth level, child of a Sub-Group
    Control,

    /// Leaf level, the postable ledger account
    GlAccount,
}

impl NodeKind {
    /// Every kind, root to leaf
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Class,
        NodeKind::Group,
        NodeKind::SubGroup,
        NodeKind::Control,
        NodeKind::GlAccount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Group => "group",
            NodeKind::SubGroup => "subGroup",
            NodeKind::Control => "control",
            NodeKind::GlAccount => "glAccount",
        }
    }

    /// Human label used in forms and the terminal browser
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Class => "Class",
            NodeKind::Group => "Group",
            NodeKind::SubGroup => "Sub-Group",
            NodeKind::Control => "Control",
            NodeKind::GlAccount => "GL Account",
        }
    }

    /// Kind one level up (None for Class)
    pub fn parent_kind(&self) -> Option<NodeKind> {
        match self {
            NodeKind::Class => None,
            NodeKind::Group => Some(NodeKind::Class),
            NodeKind::SubGroup => Some(NodeKind::Group),
            NodeKind::Control => Some(NodeKind::SubGroup),
            NodeKind::GlAccount => Some(NodeKind::Control),
        }
    }

    /// Kind one level down (None for GL Account)
    pub fn child_kind(&self) -> Option<NodeKind> {
        match self {
            NodeKind::Class => Some(NodeKind::Group),
            NodeKind::Group => Some(NodeKind::SubGroup),
            NodeKind::SubGroup => Some(NodeKind::Control),
            NodeKind::Control => Some(NodeKind::GlAccount),
            NodeKind::GlAccount => None,
        }
    }

    /// GL Accounts never have children
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::GlAccount)
    }

    /// Name of the parent reference field in forms and seed files
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            NodeKind::Class => None,
            NodeKind::Group => Some("classId"),
            NodeKind::SubGroup => Some("groupId"),
            NodeKind::Control => Some("subGroupId"),
            NodeKind::GlAccount => Some("controlId"),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

// ============================================================================
// NODE KEY
// ============================================================================

/// Ids are unique within a kind only, so anything keyed by "node id"
/// uses the pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeKey {
    pub fn new(kind: NodeKind, id: impl Into<String>) -> Self {
        NodeKey { kind, id: id.into() }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

// ============================================================================
// ACCOUNT NODE
// ============================================================================

/// One record at any level of the hierarchy.
///
/// Identity: `kind` + `id` (never change)
/// Structure: `parent_id` (locked after creation below the Class level)
/// Values: `title`, `status` (and `manual_code` for Classes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNode {
    pub id: String,
    pub kind: NodeKind,

    /// Id of the record one level up. Always None for Classes.
    pub parent_id: Option<String>,

    /// Display name (required, non-empty)
    pub title: String,

    /// Human-assigned code segment, may be empty
    #[serde(default)]
    pub manual_code: String,

    #[serde(default)]
    pub status: Status,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountNode {
    /// New record with a freshly generated UUID
    pub fn new(
        kind: NodeKind,
        parent_id: Option<String>,
        title: String,
        manual_code: String,
        status: Status,
    ) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), kind, parent_id, title, manual_code, status)
    }

    /// New record with a caller-chosen id (seed data)
    pub fn with_id(
        id: String,
        kind: NodeKind,
        parent_id: Option<String>,
        title: String,
        manual_code: String,
        status: Status,
    ) -> Self {
        let now = Utc::now();

        AccountNode {
            id,
            kind,
            parent_id,
            title,
            manual_code,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind, self.id.clone())
    }

    /// Key of the parent record, if this level has one and it is set
    pub fn parent_key(&self) -> Option<NodeKey> {
        let parent_kind = self.kind.parent_kind()?;
        self.parent_id
            .as_ref()
            .map(|parent_id| NodeKey::new(parent_kind, parent_id.clone()))
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Class
    }
}

// ============================================================================
// TESTS
// ============================================================================

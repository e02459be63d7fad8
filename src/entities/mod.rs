// Entity Models - the chart of accounts records
//
// Each record has:
// - Stable identity (kind + id) that NEVER changes
// - A parent reference exactly one level up (none for Classes)
// - Editable values (title, status)

pub mod node;
pub mod store;

pub use node::{AccountNode, NodeKey, NodeKind, Status};
pub use store::NodeStore;

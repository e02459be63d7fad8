// Chart of Accounts - Core Library
// Hierarchy manager for the five-level chart: Class → Group → Sub-Group →
// Control → GL Account. Exposes all modules for use in the CLI, the
// terminal browser, the API server, and tests.

pub mod entities;   // Node Store - records and the arena that holds them
pub mod code;       // Code Composer - derived composite codes
pub mod tree;       // Tree Builder - flat store → ordered forest
pub mod filter;     // Filter Engine - ancestor-preserving search
pub mod expansion;  // Expansion Tracker + visible row projection
pub mod mutation;   // Mutation Gateway - create / update with validation
pub mod chart;      // In-process API tying the layers together
pub mod export;     // Flat GL account list for other screens
pub mod seed;       // Built-in and file-based seed data
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use entities::{AccountNode, NodeKey, NodeKind, NodeStore, Status};
pub use code::{compose_code, compose_path, display_code};
pub use tree::{build_tree, natural_cmp, walk_forest, TreeNode};
pub use filter::{filter_tree, node_matches};
pub use expansion::{visible_rows, ExpansionState, TreeRow};
pub use mutation::{
    ChildForm, ClassForm, ClassUpdateRequest, CreateRequest, MutationOutcome,
    UpdateRequest, ValidationError, ValidationResult,
};
pub use chart::{ChartOfAccounts, SelectOption};
pub use export::{flatten_gl_accounts, AccountOption};
pub use seed::SeedChart;
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

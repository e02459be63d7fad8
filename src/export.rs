// 📤 Flat Account Export - what voucher and invoice pickers consume
//
// One record per GL Account leaf of the built tree, in tree order.
// Records whose chain does not resolve are absent from the tree and so
// absent here too.

use crate::entities::{NodeKind, Status};
use crate::tree::{walk_forest, TreeNode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOption {
    pub id: String,
    pub composite_code: String,
    pub label: String,
    pub status: Status,
}

/// Flatten GL Account leaves of a built forest
pub fn flatten_gl_accounts(tree: &[TreeNode]) -> Vec<AccountOption> {
    let mut options = Vec::new();
    walk_forest(tree, |node, _| {
        if node.kind == NodeKind::GlAccount {
            options.push(AccountOption {
                id: node.id.clone(),
                composite_code: node.code.clone(),
                label: node.title.clone(),
                status: node.status,
            });
        }
    });
    options
}

/// Only the accounts a new voucher line may post to
pub fn active_only(options: Vec<AccountOption>) -> Vec<AccountOption> {
    options.into_iter().filter(|o| o.status.is_active()).collect()
}

/// Write the export as CSV with a header row
pub fn write_csv<W: Write>(options: &[AccountOption], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for option in options {
        csv_writer
            .serialize(option)
            .with_context(|| format!("Failed to write account {}", option.id))?;
    }
    csv_writer.flush().context("Failed to flush CSV export")?;
    Ok(())
}

/// Write the export as pretty JSON
pub fn write_json<W: Write>(options: &[AccountOption], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, options).context("Failed to write JSON export")
}

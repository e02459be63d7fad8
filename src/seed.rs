// 🌱 Seed Data - initial chart loaded at startup
//
// Seed files use the five-parallel-collections layout forms work with:
//
//   { "classes": [...], "groups": [{ "classId": ... }], "subGroups": [...],
//     "controls": [...], "glAccounts": [...] }
//
// Seeds carry their own ids. Records with an unknown parent are kept (the
// tree builder leaves them out) and reported; duplicates and blank titles
// fail the load.

use crate::entities::{AccountNode, NodeKind, NodeStore, Status};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in chart used when no seed file is configured
pub const DEFAULT_CHART_JSON: &str = include_str!("../data/default_chart.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSeed {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub manual_code: String,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSeed {
    pub id: String,
    #[serde(alias = "classId", alias = "groupId", alias = "subGroupId", alias = "controlId")]
    pub parent_id: String,
    pub title: String,
    #[serde(default)]
    pub manual_code: String,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedChart {
    pub classes: Vec<ClassSeed>,
    pub groups: Vec<ChildSeed>,
    pub sub_groups: Vec<ChildSeed>,
    pub controls: Vec<ChildSeed>,
    pub gl_accounts: Vec<ChildSeed>,
}

impl SeedChart {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse chart seed JSON")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chart seed {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid chart seed {}", path.display()))
    }

    pub fn defaults() -> Result<Self> {
        Self::from_json_str(DEFAULT_CHART_JSON)
    }

    fn children(&self) -> [(NodeKind, &[ChildSeed]); 4] {
        [
            (NodeKind::Group, self.groups.as_slice()),
            (NodeKind::SubGroup, self.sub_groups.as_slice()),
            (NodeKind::Control, self.controls.as_slice()),
            (NodeKind::GlAccount, self.gl_accounts.as_slice()),
        ]
    }

    /// Load every record into a fresh store, parents before children
    pub fn into_store(self) -> Result<NodeStore> {
        let mut store = NodeStore::new();

        for class in &self.classes {
            insert_seed(
                &mut store,
                AccountNode::with_id(
                    class.id.clone(),
                    NodeKind::Class,
                    None,
                    class.title.clone(),
                    class.manual_code.clone(),
                    class.status,
                ),
            )?;
        }

        for (kind, records) in self.children() {
            let parent_kind = kind
                .parent_kind()
                .ok_or_else(|| anyhow!("{} has no parent level", kind))?;

            for record in records {
                if store.find(parent_kind, &record.parent_id).is_none() {
                    tracing::warn!(
                        kind = %kind,
                        id = %record.id,
                        parent = %record.parent_id,
                        "seed record references a missing {}; it will not appear in the tree",
                        parent_kind
                    );
                }
                insert_seed(
                    &mut store,
                    AccountNode::with_id(
                        record.id.clone(),
                        kind,
                        Some(record.parent_id.clone()),
                        record.title.clone(),
                        record.manual_code.clone(),
                        record.status,
                    ),
                )?;
            }
        }

        tracing::info!(records = store.count(), "chart seed loaded");
        Ok(store)
    }
}

fn insert_seed(store: &mut NodeStore, node: AccountNode) -> Result<()> {
    if node.id.trim().is_empty() {
        bail!("Seed {} with title {:?} has an empty id", node.kind, node.title);
    }
    if node.title.trim().is_empty() {
        bail!("Seed {} {} has an empty title", node.kind, node.id);
    }
    store.insert(node).map_err(|message| anyhow!(message))
}

/// Store pre-loaded with the built-in chart
pub fn default_store() -> Result<NodeStore> {
    SeedChart::defaults()?.into_store()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chart_loads() {
        let store = default_store().unwrap();

        assert_eq!(store.count_kind(NodeKind::Class), 5);
        assert_eq!(store.count_kind(NodeKind::Group), 6);
        assert_eq!(store.count_kind(NodeKind::SubGroup), 7);
        assert_eq!(store.count_kind(NodeKind::Control), 9);
        assert_eq!(store.count_kind(NodeKind::GlAccount), 12);
        assert_eq!(
            store.find(NodeKind::GlAccount, "gl-12").unwrap().status,
            Status::Inactive
        );
    }

    #[test]
    fn test_parent_field_aliases() {
        let seed = SeedChart::from_json_str(
            r#"{
                "classes": [{ "id": "c1", "title": "Assets", "manualCode": "1000" }],
                "groups": [{ "id": "g1", "classId": "c1", "title": "Current Assets" }]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.groups[0].parent_id, "c1");
        assert_eq!(seed.groups[0].manual_code, "");
        assert!(seed.controls.is_empty());

        let store = seed.into_store().unwrap();
        assert_eq!(
            store.find(NodeKind::Group, "g1").unwrap().parent_id.as_deref(),
            Some("c1")
        );
    }

    #[test]
    fn test_dangling_seed_record_is_kept() {
        let seed = SeedChart::from_json_str(
            r#"{ "groups": [{ "id": "g1", "classId": "gone", "title": "Orphan" }] }"#,
        )
        .unwrap();
        let store = seed.into_store().unwrap();

        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_duplicate_id_fails_load() {
        let seed = SeedChart::from_json_str(
            r#"{ "classes": [
                { "id": "c1", "title": "Assets" },
                { "id": "c1", "title": "Liabilities" }
            ] }"#,
        )
        .unwrap();
        let err = seed.into_store().unwrap_err();

        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_blank_title_fails_load() {
        let seed = SeedChart::from_json_str(r#"{ "classes": [{ "id": "c1", "title": " " }] }"#).unwrap();
        assert!(seed.into_store().is_err());
    }

    #[test]
    fn test_invalid_json_has_context() {
        let err = SeedChart::from_json_str("{ not json").unwrap_err();
        assert!(err.to_string().contains("Failed to parse chart seed JSON"));
    }
}

// 📒 Chart of Accounts - the hierarchy manager's in-process API
//
// Owns the node store and the expansion state. Reads rebuild the tree from
// the flat store every time; writes go through the mutation gateway. The
// search query is passed in by the caller, never stored here.

use crate::code::display_code;
use crate::entities::{NodeKey, NodeKind, NodeStore};
use crate::expansion::{visible_rows, ExpansionState, TreeRow};
use crate::export::{flatten_gl_accounts, AccountOption};
use crate::filter::filter_tree;
use crate::mutation::{submit_child_form, submit_class_form, ChildForm, ClassForm, MutationOutcome};
use crate::seed::{default_store, SeedChart};
use crate::tree::{build_tree, walk_forest, TreeNode};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;

/// One entry of a cascading parent/child dropdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    pub key: NodeKey,
    /// Composed code, or the placeholder when empty
    pub code: String,
    pub title: String,
}

impl SelectOption {
    fn from_tree_node(node: &TreeNode) -> Self {
        SelectOption {
            key: node.key(),
            code: display_code(&node.code).to_string(),
            title: node.title.clone(),
        }
    }
}

#[derive(Debug)]
pub struct ChartOfAccounts {
    store: NodeStore,
    expansion: ExpansionState,
}

impl ChartOfAccounts {
    /// Wrap an existing store; top-level Classes start expanded
    pub fn new(store: NodeStore) -> Self {
        let expansion = ExpansionState::initial(&build_tree(&store));
        ChartOfAccounts { store, expansion }
    }

    /// Chart pre-loaded with the built-in seed
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(default_store()?))
    }

    pub fn from_seed(seed: SeedChart) -> Result<Self> {
        Ok(Self::new(seed.into_store()?))
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    // ========================================================================
    // READ SURFACE
    // ========================================================================

    /// Full hierarchy, or the ancestor-preserving filter of it
    pub fn get_tree(&self, query: Option<&str>) -> Vec<TreeNode> {
        let tree = build_tree(&self.store);
        match query {
            Some(query) => filter_tree(tree, query),
            None => tree,
        }
    }

    pub fn get_expansion_state(&self) -> &HashMap<NodeKey, bool> {
        self.expansion.entries()
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    /// Rows a list view shows for the current query and expansion state
    pub fn visible_rows(&self, query: &str) -> Vec<TreeRow> {
        let tree = self.get_tree(Some(query));
        visible_rows(&tree, &self.expansion, query)
    }

    /// Flat GL Account list for the account pickers of other screens
    pub fn account_options(&self) -> Vec<AccountOption> {
        flatten_gl_accounts(&self.get_tree(None))
    }

    // ========================================================================
    // CASCADING SELECTION
    // ========================================================================

    /// Candidate parents when creating a node of `kind`, in tree order.
    /// Empty for Classes.
    pub fn parent_options(&self, kind: NodeKind) -> Vec<SelectOption> {
        let Some(parent_kind) = kind.parent_kind() else {
            return Vec::new();
        };

        let tree = self.get_tree(None);
        let mut options = Vec::new();
        walk_forest(&tree, |node, _| {
            if node.kind == parent_kind {
                options.push(SelectOption::from_tree_node(node));
            }
        });
        options
    }

    /// Direct children of a node in tree order, to narrow the next dropdown
    pub fn children_of(&self, key: &NodeKey) -> Vec<SelectOption> {
        let tree = self.get_tree(None);
        let mut options = Vec::new();
        walk_forest(&tree, |node, _| {
            if node.kind == key.kind && node.id == key.id {
                options.extend(node.children().iter().map(SelectOption::from_tree_node));
            }
        });
        options
    }

    // ========================================================================
    // WRITE SURFACE
    // ========================================================================

    pub fn create_or_update_class(&mut self, form: ClassForm) -> MutationOutcome {
        let outcome = submit_class_form(&mut self.store, form);
        // A new Class shows up expanded like the ones present at load
        if let MutationOutcome::Created(id) = &outcome {
            self.expansion.set(NodeKey::new(NodeKind::Class, id.clone()), true);
        }
        outcome
    }

    pub fn create_or_update_group(&mut self, form: ChildForm) -> MutationOutcome {
        submit_child_form(&mut self.store, NodeKind::Group, form)
    }

    pub fn create_or_update_sub_group(&mut self, form: ChildForm) -> MutationOutcome {
        submit_child_form(&mut self.store, NodeKind::SubGroup, form)
    }

    pub fn create_or_update_control(&mut self, form: ChildForm) -> MutationOutcome {
        submit_child_form(&mut self.store, NodeKind::Control, form)
    }

    pub fn create_or_update_gl_account(&mut self, form: ChildForm) -> MutationOutcome {
        submit_child_form(&mut self.store, NodeKind::GlAccount, form)
    }

    /// Dispatch on level; Classes go through the class form
    pub fn create_or_update(&mut self, kind: NodeKind, form: ChildForm) -> MutationOutcome {
        match kind {
            NodeKind::Class => self.create_or_update_class(ClassForm {
                id: form.id,
                title: form.title,
                manual_code: form.manual_code,
                status: form.status,
            }),
            _ => submit_child_form(&mut self.store, kind, form),
        }
    }

    // ========================================================================
    // EXPANSION EVENTS
    // ========================================================================

    pub fn toggle(&mut self, key: &NodeKey) -> bool {
        self.expansion.toggle(key)
    }

    pub fn expand_all(&mut self) {
        let tree = build_tree(&self.store);
        self.expansion.expand_all(&tree);
    }

    pub fn collapse_all(&mut self) {
        self.expansion.collapse_all();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Status;

    fn scenario_chart() -> ChartOfAccounts {
        let seed = SeedChart::from_json_str(
            r#"{
                "classes": [{ "id": "c1", "title": "Assets", "manualCode": "1000" }],
                "groups": [{ "id": "g1", "classId": "c1", "title": "Current Assets", "manualCode": "1100" }]
            }"#,
        )
        .unwrap();
        ChartOfAccounts::from_seed(seed).unwrap()
    }

    fn form(parent: &str, title: &str, code: &str) -> ChildForm {
        ChildForm {
            parent_id: parent.to_string(),
            title: title.to_string(),
            manual_code: code.to_string(),
            ..ChildForm::default()
        }
    }

    #[test]
    fn test_scenario_tree_and_search() {
        let chart = scenario_chart();
        let tree = chart.get_tree(None);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children()[0].code, "1000-1100");
        assert_eq!(chart.get_tree(Some("Assets")), tree);
        assert!(chart.get_tree(Some("zzz")).is_empty());
    }

    #[test]
    fn test_full_chain_created_through_forms() {
        let mut chart = scenario_chart();

        let sub = chart.create_or_update_sub_group(form("g1", "Cash", "10"));
        let control = chart.create_or_update_control(form(sub.id().unwrap(), "Banks", "01"));
        let gl = chart.create_or_update_gl_account(form(control.id().unwrap(), "Main Checking", "001"));
        assert!(gl.is_applied());

        let options = chart.account_options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].composite_code, "1000-1100-10-01-001");
        assert_eq!(options[0].label, "Main Checking");
    }

    #[test]
    fn test_class_code_change_flows_to_descendants() {
        let mut chart = scenario_chart();
        let outcome = chart.create_or_update_class(ClassForm {
            id: Some("c1".to_string()),
            title: "Assets".to_string(),
            manual_code: "1".to_string(),
            status: Status::Active,
        });

        assert_eq!(outcome, MutationOutcome::Updated("c1".to_string()));
        assert_eq!(chart.get_tree(None)[0].children()[0].code, "1-1100");
    }

    #[test]
    fn test_invalid_group_leaves_store_unchanged() {
        let mut chart = scenario_chart();
        let before = chart.store().count_kind(NodeKind::Group);

        let outcome = chart.create_or_update_group(form("c1", "", ""));

        assert!(!outcome.is_applied());
        assert_eq!(chart.store().count_kind(NodeKind::Group), before);
    }

    #[test]
    fn test_new_class_starts_expanded() {
        let mut chart = scenario_chart();
        let outcome = chart.create_or_update_class(ClassForm {
            title: "Liabilities".to_string(),
            manual_code: "2000".to_string(),
            ..ClassForm::default()
        });
        let key = NodeKey::new(NodeKind::Class, outcome.id().unwrap());

        assert!(chart.expansion().is_expanded(&key));
    }

    #[test]
    fn test_cascading_options() {
        let chart = ChartOfAccounts::with_defaults().unwrap();

        assert!(chart.parent_options(NodeKind::Class).is_empty());

        let classes = chart.parent_options(NodeKind::Group);
        let titles: Vec<&str> = classes.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Assets", "Liabilities", "Equity", "Revenue", "Expenses"]);

        let groups = chart.children_of(&classes[0].key);
        let titles: Vec<&str> = groups.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Current Assets", "Non-Current Assets"]);
        assert_eq!(groups[1].code, "1-2");

        assert_eq!(chart.parent_options(NodeKind::GlAccount).len(), 9);
        assert!(chart.children_of(&NodeKey::new(NodeKind::GlAccount, "gl-1")).is_empty());
    }

    #[test]
    fn test_search_does_not_touch_expansion() {
        let mut chart = ChartOfAccounts::with_defaults().unwrap();
        chart.collapse_all();
        let before = chart.get_expansion_state().clone();

        let rows = chart.visible_rows("electricity");
        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(
            titles,
            vec!["Expenses", "Operating Expenses", "Administrative Expenses", "Rent and Utilities", "Electricity"]
        );
        assert_eq!(chart.get_expansion_state(), &before);
        assert_eq!(chart.visible_rows("").len(), 5);
    }

    #[test]
    fn test_expand_all_then_toggle() {
        let mut chart = ChartOfAccounts::with_defaults().unwrap();
        chart.expand_all();
        assert_eq!(chart.visible_rows("").len(), 39);

        let assets = NodeKey::new(NodeKind::Class, "cls-1");
        assert!(!chart.toggle(&assets));
        assert!(!chart.get_expansion_state()[&assets]);
    }
}

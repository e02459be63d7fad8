// ✏️ Mutation Gateway - create / update requests and their validation
//
// Two request shapes keep the "structure locks on edit" rule in the types:
// - CreateRequest carries every field, parent included
// - UpdateRequest carries only title and status
// Classes have no parent, so their update may also change the manual code
// (ClassUpdateRequest).
//
// Failed validation never mutates the store; the errors are returned so the
// form can stay open for correction.

use crate::entities::{AccountNode, NodeKey, NodeKind, NodeStore, Status};
use serde::{Deserialize, Serialize};

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>, kind: NodeKind) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: kind.label().to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T = ()> = Result<T, Vec<ValidationError>>;

// ============================================================================
// REQUESTS
// ============================================================================

/// Everything needed to create a record at any level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub kind: NodeKind,
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub manual_code: String,
    #[serde(default)]
    pub status: Status,
}

impl CreateRequest {
    pub fn class(title: impl Into<String>, manual_code: impl Into<String>) -> Self {
        CreateRequest {
            kind: NodeKind::Class,
            parent_id: None,
            title: title.into(),
            manual_code: manual_code.into(),
            status: Status::Active,
        }
    }

    /// Child of `parent_id`, one level below it
    pub fn child(
        kind: NodeKind,
        parent_id: impl Into<String>,
        title: impl Into<String>,
        manual_code: impl Into<String>,
    ) -> Self {
        CreateRequest {
            kind,
            parent_id: Some(parent_id.into()),
            title: title.into(),
            manual_code: manual_code.into(),
            status: Status::Active,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// Post-creation edit for Group / Sub-Group / Control / GL Account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub title: String,
    #[serde(default)]
    pub status: Status,
}

/// Post-creation edit for a Class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassUpdateRequest {
    pub title: String,
    #[serde(default)]
    pub manual_code: String,
    #[serde(default)]
    pub status: Status,
}

// ============================================================================
// VALIDATION
// ============================================================================

fn check_title(title: &str, kind: NodeKind, errors: &mut Vec<ValidationError>) {
    if title.trim().is_empty() {
        errors.push(ValidationError::new("title", "Required field is empty", kind));
    }
}

/// Validate a create request against the current store
pub fn validate_create(store: &NodeStore, request: &CreateRequest) -> ValidationResult {
    let mut errors = Vec::new();
    let kind = request.kind;

    check_title(&request.title, kind, &mut errors);

    match (kind.parent_kind(), kind.parent_field()) {
        (Some(parent_kind), Some(field)) => match request.parent_id.as_deref() {
            None | Some("") => {
                errors.push(ValidationError::new(field, "Required field is empty", kind));
            }
            Some(parent_id) => {
                if store.find(parent_kind, parent_id).is_none() {
                    errors.push(ValidationError::new(
                        field,
                        format!("{} not found: {}", parent_kind, parent_id),
                        kind,
                    ));
                }
            }
        },
        _ => {
            if request.parent_id.is_some() {
                errors.push(ValidationError::new("parentId", "Classes have no parent", kind));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_existing(store: &NodeStore, key: &NodeKey, errors: &mut Vec<ValidationError>) {
    if !store.contains(key) {
        errors.push(ValidationError::new(
            "id",
            format!("{} not found: {}", key.kind, key.id),
            key.kind,
        ));
    }
}

// ============================================================================
// APPLY
// ============================================================================

/// Validate and append a new record with a fresh id. Returns the id.
pub fn create(store: &mut NodeStore, request: CreateRequest) -> ValidationResult<String> {
    if let Err(errors) = validate_create(store, &request) {
        tracing::warn!(kind = %request.kind, errors = errors.len(), "create rejected");
        return Err(errors);
    }

    let node = AccountNode::new(
        request.kind,
        request.parent_id,
        request.title,
        request.manual_code,
        request.status,
    );
    let id = node.id.clone();
    let kind = node.kind;

    // Fresh UUIDs do not collide; a failure here would mean a broken store
    store
        .insert(node)
        .map_err(|message| vec![ValidationError::new("id", message, kind)])?;

    tracing::info!(kind = %kind, id = %id, "record created");
    Ok(id)
}

/// Edit title and status of a non-Class record in place.
/// Parent reference and manual code stay as they were.
pub fn update(store: &mut NodeStore, key: &NodeKey, request: UpdateRequest) -> ValidationResult {
    let mut errors = Vec::new();
    check_existing(store, key, &mut errors);
    check_title(&request.title, key.kind, &mut errors);
    if key.kind == NodeKind::Class {
        errors.push(ValidationError::new("kind", "Use a class update for classes", key.kind));
    }
    if !errors.is_empty() {
        tracing::warn!(key = %key, errors = errors.len(), "update rejected");
        return Err(errors);
    }

    if let Some(node) = store.get_mut(key) {
        node.title = request.title;
        node.status = request.status;
        node.updated_at = chrono::Utc::now();
    }
    tracing::info!(key = %key, "record updated");
    Ok(())
}

/// Edit a Class in place (title, manual code, status)
pub fn update_class(store: &mut NodeStore, id: &str, request: ClassUpdateRequest) -> ValidationResult {
    let key = NodeKey::new(NodeKind::Class, id);
    let mut errors = Vec::new();
    check_existing(store, &key, &mut errors);
    check_title(&request.title, NodeKind::Class, &mut errors);
    if !errors.is_empty() {
        tracing::warn!(key = %key, errors = errors.len(), "class update rejected");
        return Err(errors);
    }

    if let Some(node) = store.get_mut(&key) {
        node.title = request.title;
        node.manual_code = request.manual_code;
        node.status = request.status;
        node.updated_at = chrono::Utc::now();
    }
    tracing::info!(key = %key, "class updated");
    Ok(())
}

// ============================================================================
// FORMS (create-or-update by optional id)
// ============================================================================

/// Result of submitting a form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "value", rename_all = "camelCase")]
pub enum MutationOutcome {
    Created(String),
    Updated(String),
    /// Nothing changed; the form stays open
    Rejected(Vec<ValidationError>),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, MutationOutcome::Rejected(_))
    }

    /// Id of the created or updated record
    pub fn id(&self) -> Option<&str> {
        match self {
            MutationOutcome::Created(id) | MutationOutcome::Updated(id) => Some(id),
            MutationOutcome::Rejected(_) => None,
        }
    }

    fn from_create(result: ValidationResult<String>) -> Self {
        match result {
            Ok(id) => MutationOutcome::Created(id),
            Err(errors) => MutationOutcome::Rejected(errors),
        }
    }

    fn from_update(id: String, result: ValidationResult) -> Self {
        match result {
            Ok(()) => MutationOutcome::Updated(id),
            Err(errors) => MutationOutcome::Rejected(errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassForm {
    pub id: Option<String>,
    pub title: String,
    pub manual_code: String,
    pub status: Status,
}

/// Form shape shared by the four lower levels.
///
/// `parent_id` maps to `classId` / `groupId` / `subGroupId` / `controlId`
/// depending on the level; it is ignored on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChildForm {
    pub id: Option<String>,
    #[serde(alias = "classId", alias = "groupId", alias = "subGroupId", alias = "controlId")]
    pub parent_id: String,
    pub title: String,
    pub manual_code: String,
    pub status: Status,
}

pub fn submit_class_form(store: &mut NodeStore, form: ClassForm) -> MutationOutcome {
    match form.id {
        Some(id) => {
            let request = ClassUpdateRequest {
                title: form.title,
                manual_code: form.manual_code,
                status: form.status,
            };
            let result = update_class(store, &id, request);
            MutationOutcome::from_update(id, result)
        }
        None => {
            let request = CreateRequest::class(form.title, form.manual_code).with_status(form.status);
            MutationOutcome::from_create(create(store, request))
        }
    }
}

pub fn submit_child_form(store: &mut NodeStore, kind: NodeKind, form: ChildForm) -> MutationOutcome {
    match form.id {
        Some(id) => {
            let key = NodeKey::new(kind, id.clone());
            let request = UpdateRequest {
                title: form.title,
                status: form.status,
            };
            MutationOutcome::from_update(id, update(store, &key, request))
        }
        None => {
            let request = CreateRequest::child(kind, form.parent_id, form.title, form.manual_code)
                .with_status(form.status);
            MutationOutcome::from_create(create(store, request))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

// Chart of Accounts - Web Server
// JSON surface over the in-process hierarchy API

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chart_of_accounts::{logging, AppConfig, ChartOfAccounts, ChildForm, ClassForm, MutationOutcome, NodeKey, NodeKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    chart: Arc<Mutex<ChartOfAccounts>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

#[derive(Deserialize)]
struct TreeQuery {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpansionEntry {
    key: NodeKey,
    expanded: bool,
}

// ============================================================================
// API Handlers - read surface
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/tree?q= - Full or filtered hierarchy
async fn get_tree(State(state): State<AppState>, Query(query): Query<TreeQuery>) -> impl IntoResponse {
    let chart = state.chart.lock().await;
    Json(ApiResponse::ok(chart.get_tree(Some(&query.q))))
}

/// GET /api/rows?q= - Visible rows for the current expansion state
async fn get_rows(State(state): State<AppState>, Query(query): Query<TreeQuery>) -> impl IntoResponse {
    let chart = state.chart.lock().await;
    Json(ApiResponse::ok(chart.visible_rows(&query.q)))
}

/// GET /api/accounts - Flat GL account list for pickers
async fn get_accounts(State(state): State<AppState>) -> impl IntoResponse {
    let chart = state.chart.lock().await;
    Json(ApiResponse::ok(chart.account_options()))
}

/// GET /api/parents/:kind - Parent candidates when creating a node of this kind
async fn get_parent_options(State(state): State<AppState>, Path(kind): Path<NodeKind>) -> impl IntoResponse {
    let chart = state.chart.lock().await;
    Json(ApiResponse::ok(chart.parent_options(kind)))
}

/// GET /api/children/:kind/:id - Direct children for cascading selection
async fn get_children(
    State(state): State<AppState>,
    Path((kind, id)): Path<(NodeKind, String)>,
) -> impl IntoResponse {
    let chart = state.chart.lock().await;
    Json(ApiResponse::ok(chart.children_of(&NodeKey::new(kind, id))))
}

/// GET /api/expansion - Stored expansion map
async fn get_expansion(State(state): State<AppState>) -> impl IntoResponse {
    let chart = state.chart.lock().await;
    let mut entries: Vec<ExpansionEntry> = chart
        .get_expansion_state()
        .iter()
        .map(|(key, expanded)| ExpansionEntry {
            key: key.clone(),
            expanded: *expanded,
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Json(ApiResponse::ok(entries))
}

// ============================================================================
// API Handlers - write surface
// ============================================================================

fn outcome_response(outcome: MutationOutcome) -> impl IntoResponse {
    let status = match &outcome {
        MutationOutcome::Created(_) => StatusCode::CREATED,
        MutationOutcome::Updated(_) => StatusCode::OK,
        MutationOutcome::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let success = outcome.is_applied();
    (
        status,
        Json(ApiResponse {
            success,
            data: outcome,
            error: if success { None } else { Some("Validation failed".to_string()) },
        }),
    )
}

/// POST /api/classes
async fn save_class(State(state): State<AppState>, Json(form): Json<ClassForm>) -> impl IntoResponse {
    let mut chart = state.chart.lock().await;
    outcome_response(chart.create_or_update_class(form))
}

/// POST /api/{groups,subGroups,controls,glAccounts}
async fn save_child(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(form): Json<ChildForm>,
) -> axum::response::Response {
    let kind = match collection.as_str() {
        "groups" => NodeKind::Group,
        "subGroups" => NodeKind::SubGroup,
        "controls" => NodeKind::Control,
        "glAccounts" => NodeKind::GlAccount,
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse {
                    success: false,
                    data: (),
                    error: Some(format!("Unknown collection: {}", collection)),
                }),
            )
                .into_response()
        }
    };

    let mut chart = state.chart.lock().await;
    outcome_response(chart.create_or_update(kind, form)).into_response()
}

/// POST /api/expansion/toggle - body: { "kind": ..., "id": ... }
async fn toggle_expansion(State(state): State<AppState>, Json(key): Json<NodeKey>) -> impl IntoResponse {
    let mut chart = state.chart.lock().await;
    Json(ApiResponse::ok(chart.toggle(&key)))
}

/// POST /api/expansion/expand-all
async fn expand_all(State(state): State<AppState>) -> impl IntoResponse {
    let mut chart = state.chart.lock().await;
    chart.expand_all();
    Json(ApiResponse::ok(chart.get_expansion_state().len()))
}

/// POST /api/expansion/collapse-all
async fn collapse_all(State(state): State<AppState>) -> impl IntoResponse {
    let mut chart = state.chart.lock().await;
    chart.collapse_all();
    Json(ApiResponse::ok(0usize))
}

// ============================================================================
// Main Server
// ============================================================================

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/tree", get(get_tree))
        .route("/rows", get(get_rows))
        .route("/accounts", get(get_accounts))
        .route("/parents/:kind", get(get_parent_options))
        .route("/children/:kind/:id", get(get_children))
        .route("/expansion", get(get_expansion))
        .route("/expansion/toggle", post(toggle_expansion))
        .route("/expansion/expand-all", post(expand_all))
        .route("/expansion/collapse-all", post(collapse_all))
        .route("/classes", post(save_class))
        .route("/:collection", post(save_child))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init(&config)?;

    let chart = config.load_chart()?;
    tracing::info!(records = chart.store().count(), "chart loaded");

    let state = AppState {
        chart: Arc::new(Mutex::new(chart)),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "server running; API under /api");

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

use crate::error::ServerResult;
use crate::middleware::CallerIdentity;
use crate::state::ServerState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use docverify::ReviewDecision;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    20
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DecisionRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PurgeRequest {
    /// Falls back to `retention.purge_after_days`.
    #[serde(default)]
    pub older_than_days: Option<u32>,
}

/// Paginated review queue, oldest first.
pub async fn list_reviews(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let page = state
        .workflow
        .list_pending_review(&caller, query.page, query.per_page)
        .await?;
    Ok(Json(page))
}

/// Approve or reject a record awaiting review.
pub async fn decide(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(record_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> ServerResult<impl IntoResponse> {
    let record = state
        .workflow
        .decide(&caller, &record_id, request.decision, request.reason)
        .await?;
    Ok(Json(record))
}

/// A record and its earlier attempts, newest first.
pub async fn history(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
    Path(record_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let attempts = state.workflow.attempt_history(&caller, &record_id)?;
    Ok(Json(json!({
        "record_id": record_id,
        "attempts": attempts,
    })))
}

/// Delete terminal records older than the given age.
pub async fn purge(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<PurgeRequest>,
) -> ServerResult<impl IntoResponse> {
    let days = request
        .older_than_days
        .unwrap_or(state.pipeline.retention.purge_after_days);
    let report = state.workflow.purge(&caller, days).await?;
    Ok(Json(report))
}

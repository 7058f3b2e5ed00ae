//! API route handlers
//!
//! - `health`: liveness, readiness and Prometheus metrics
//! - `verification`: user submission, status and retry
//! - `admin`: review queue, decisions, attempt history and purge

pub mod admin;
pub mod health;
pub mod verification;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /, no authentication).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "docverify server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/verification",
            "/api/v1/verification/status",
            "/api/v1/verification/retry",
            "/api/v1/admin/reviews",
            "/api/v1/admin/reviews/{id}/decision",
            "/api/v1/admin/records/{id}/history",
            "/api/v1/admin/maintenance/purge",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

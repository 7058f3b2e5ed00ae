//! HTTP API for identity-document verification
//!
//! Wraps the `docverify` pipeline in an Axum server:
//!
//! - **Applicants** submit front/back images, poll status and retry after a
//!   rejection.
//! - **Reviewers** work the manual-review queue, inspect retry chains and
//!   purge closed records.
//! - **Operators** get liveness/readiness probes and Prometheus metrics.
//!
//! Every `/api/v1` route requires an API key (`Authorization: Bearer` or
//! `X-API-Key`) and the caller headers `X-User-Id` and, for reviewers,
//! `X-User-Role: admin`. The API key authenticates the calling service; the
//! caller headers carry the end user that service has already signed in.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected
//!
//! - `POST /api/v1/verification` - Submit document images (multipart)
//! - `GET /api/v1/verification/status` - Caller's latest status
//! - `POST /api/v1/verification/retry` - Retry after rejection or expiry
//! - `GET /api/v1/admin/reviews` - Review queue
//! - `POST /api/v1/admin/reviews/{record_id}/decision` - Approve or reject
//! - `GET /api/v1/admin/records/{record_id}/history` - Retry chain
//! - `POST /api/v1/admin/maintenance/purge` - Purge closed records

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;

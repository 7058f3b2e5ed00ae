use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use docverify::{Caller, Role};
use std::sync::Arc;

/// Header carrying the authenticated user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller role: `user` (default) or `admin`.
pub const USER_ROLE_HEADER: &str = "x-user-role";

pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Key from `X-API-Key`, else from `Authorization` with an optional `Bearer ` prefix.
pub fn presented_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .or_else(|| headers.get(AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Rejects `/api/v1` calls without a known key, then applies the per-key rate limit.
pub async fn api_key_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(key) = presented_api_key(request.headers()) else {
        return Err(ServerError::Authentication(format!(
            "API key required. Provide it in '{API_KEY_HEADER}' or 'Authorization: Bearer <key>' header"
        )));
    };

    if !state.is_valid_api_key(&key) {
        tracing::warn!(uri = %request.uri(), "api_key_rejected");
        return Err(ServerError::Authentication("Invalid API key".to_string()));
    }

    if !state.check_rate_limit(&key) {
        tracing::warn!(uri = %request.uri(), "rate_limit_exceeded");
        return Err(ServerError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// The caller behind a request, read from the identity headers.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Caller);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ServerError::Authentication(format!("missing '{USER_ID_HEADER}' header"))
            })?;

        let role = match parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("") | Some("user") => Role::User,
            Some("admin") => Role::Admin,
            Some(other) => {
                return Err(ServerError::BadRequest(format!("unknown role '{other}'")));
            }
        };

        Ok(CallerIdentity(Caller {
            user_id: user_id.to_string(),
            role,
        }))
    }
}

/// Request id carried in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Reuses an inbound `X-Request-Id` or mints one, and echoes it on the response.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = std::time::Instant::now();

    tracing::info!(%method, %uri, %request_id, "request_started");

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_micros = start.elapsed().as_micros() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %uri, %status, elapsed_micros, %request_id, "request_completed");
    } else {
        tracing::info!(%method, %uri, %status, elapsed_micros, %request_id, "request_completed");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_from_either_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_api_key(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(presented_api_key(&headers).as_deref(), Some("abc"));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("xyz"));
        assert_eq!(presented_api_key(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn blank_api_key_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(presented_api_key(&headers), None);
    }
}

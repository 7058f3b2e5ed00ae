use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docverify::VerificationError;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Verification(#[from] VerificationError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Verification(err) => match err {
                VerificationError::Validation(_) => StatusCode::BAD_REQUEST,
                VerificationError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                VerificationError::Conflict { .. } => StatusCode::CONFLICT,
                VerificationError::TooManyAttempts(_) => StatusCode::TOO_MANY_REQUESTS,
                VerificationError::ExtractionFailure(_) | VerificationError::MatchFailure(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                VerificationError::Authorization(_) => StatusCode::FORBIDDEN,
                VerificationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                VerificationError::NotFound(_) => StatusCode::NOT_FOUND,
                VerificationError::Store(_)
                | VerificationError::Storage(_)
                | VerificationError::Collaborator(_)
                | VerificationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::Authentication(_) => "AUTH_FAILED",
            ServerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Verification(err) => err.code(),
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServerError::Verification(VerificationError::Conflict {
                existing_status,
                record_id,
                ..
            }) => Some(json!({
                "existing_status": existing_status,
                "record_id": record_id,
            })),
            ServerError::Verification(VerificationError::ImageTooLarge { size, limit }) => {
                Some(json!({ "size": size, "limit": limit }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request_failure");
        }
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::net::AddrParseError> for ServerError {
    fn from(err: std::net::AddrParseError) -> Self {
        ServerError::Config(format!("Invalid address: {err}"))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<docverify::StoreError> for ServerError {
    fn from(err: docverify::StoreError) -> Self {
        ServerError::Verification(err.into())
    }
}

impl From<axum::extract::multipart::MultipartError> for ServerError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ServerError::BadRequest(format!("Invalid multipart body: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docverify::VerificationStatus;

    #[test]
    fn conflict_maps_to_409_with_details() {
        let err = ServerError::from(VerificationError::Conflict {
            message: "a verification is already processing".into(),
            existing_status: Some(VerificationStatus::Processing),
            record_id: Some("r1".into()),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), "CONFLICT");
        let details = err.details().unwrap();
        assert_eq!(details["existing_status"], "processing");
        assert_eq!(details["record_id"], "r1");
    }

    #[test]
    fn verification_errors_map_to_status_codes() {
        let cases = [
            (VerificationError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                VerificationError::ImageTooLarge { size: 2, limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (VerificationError::Authorization("x".into()), StatusCode::FORBIDDEN),
            (VerificationError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                VerificationError::TooManyAttempts("x".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                VerificationError::ExtractionFailure("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                VerificationError::Storage("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status_code(), status);
        }
    }
}

//! HTTP tests for the verification and admin routes
//!
//! The router runs in-process through `tower::ServiceExt::oneshot`, with an
//! OCR fake that reads each uploaded "image" back as text.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use docverify::{
    CollaboratorError, Collaborators, InMemoryUserDirectory, LocalFileStorage, OcrEngine,
    OcrOutput, UserProfile, VerificationConfig,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tempfile::TempDir;
use tower::ServiceExt;

const API_KEY: &str = "test-key";
const BOUNDARY: &str = "docverify-test-boundary";

const CEDULA_FRONT: &str = "REPÚBLICA DE COLOMBIA\n\
    IDENTIFICACIÓN PERSONAL\n\
    CÉDULA DE CIUDADANÍA\n\
    NÚMERO 1.041.970.336\n\
    RAMOS OCHOA\n\
    APELLIDOS\n\
    LUZ DEISY\n\
    NOMBRES";

struct EchoOcr;

#[async_trait]
impl OcrEngine for EchoOcr {
    async fn recognize(&self, path: &Path) -> Result<OcrOutput, CollaboratorError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CollaboratorError::Ocr(e.to_string()))?;
        Ok(OcrOutput {
            text,
            confidence: 0.9,
        })
    }
}

struct TestApp {
    router: Router,
    _dir: TempDir,
}

fn app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let mut config = ServerConfig::default();
    config.api_keys.insert(API_KEY.to_string());
    config.rate_limit_per_minute = 10_000; // status is polled
    config.janitor_enabled = false;

    let mut pipeline = VerificationConfig::default();
    pipeline.hashing.salt = "server-test-salt".to_string();
    pipeline.uploads.dir = dir.path().join("uploads");

    let users = Arc::new(InMemoryUserDirectory::new());
    users.insert("u1", UserProfile::new("Luz Deisy", "Ramos Ochoa"));
    users.insert("u2", UserProfile::new("Carlos", "Mejia"));

    let collaborators = Collaborators {
        ocr: Arc::new(EchoOcr),
        files: Arc::new(LocalFileStorage::new(&pipeline.uploads.dir)),
        users,
        identity_provider: None,
    };
    let state = Arc::new(ServerState::new(config, pipeline, collaborators, None).unwrap());

    TestApp {
        router: build_router(state),
        _dir: dir,
    }
}

fn multipart(document_type: Option<&str>, front: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(kind) = document_type {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"document_type\"\r\n\r\n{kind}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(text) = front {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"front_image\"; filename=\"front.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(text.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn user_request(method: &str, uri: &str, user: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", API_KEY)
        .header("x-user-id", user)
}

fn admin_request(method: &str, uri: &str) -> axum::http::request::Builder {
    user_request(method, uri, "reviewer").header("x-user-role", "admin")
}

fn submission(user: &str, front: &str) -> Request<Body> {
    user_request("POST", "/api/v1/verification", user)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart(Some("national_id"), Some(front))))
        .unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn wait_for_status(app: &TestApp, user: &str, expected: &str) -> Value {
    for _ in 0..200 {
        let request = user_request("GET", "/api/v1/verification/status", user)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] == expected {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("user {user} never reached status {expected}");
}

#[tokio::test]
async fn public_health_endpoints_need_no_key() {
    let app = app();

    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Request::get("/ready").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["store"], "ready");
    assert_eq!(body["active_jobs"], 0);
}

#[tokio::test]
async fn api_key_and_caller_are_required() {
    let app = app();

    let no_key = Request::get("/api/v1/verification/status")
        .header("x-user-id", "u1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, no_key).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_FAILED");

    let no_user = Request::get("/api/v1/verification/status")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, no_user).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bad_role = user_request("GET", "/api/v1/verification/status", "u1")
        .header("x-user-role", "root")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, bad_role).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_before_any_submission() {
    let app = app();
    let request = user_request("GET", "/api/v1/verification/status", "u1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "not_started");
    assert_eq!(body["can_retry"], false);
}

#[tokio::test]
async fn submission_is_accepted_then_approved() {
    let app = app();

    let (status, body) = send(&app, submission("u1", CEDULA_FRONT)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["estimated_seconds"], 30);
    assert!(body["record_id"].is_string());

    let view = wait_for_status(&app, "u1", "approved").await;
    assert_eq!(view["record_id"], body["record_id"]);
    assert_eq!(view["extracted"]["last_name"], "RAMOS OCHOA");
    assert!(view["verified_at"].is_string());
}

#[tokio::test]
async fn second_submission_conflicts_with_details() {
    let app = app();

    let (status, first) = send(&app, submission("u1", CEDULA_FRONT)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    wait_for_status(&app, "u1", "approved").await;

    let (status, body) = send(&app, submission("u1", CEDULA_FRONT)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["existing_status"], "approved");
    assert_eq!(body["error"]["details"]["record_id"], first["record_id"]);
}

#[tokio::test]
async fn submission_without_front_image_is_rejected() {
    let app = app();
    let request = user_request("POST", "/api/v1/verification", "u1")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart(Some("national_id"), None)))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn mismatch_then_retry_without_images() {
    let app = app();

    // u2 is "Carlos Mejia"; the document belongs to someone else.
    send(&app, submission("u2", CEDULA_FRONT)).await;
    let view = wait_for_status(&app, "u2", "rejected").await;
    assert_eq!(view["can_retry"], true);
    assert!(view["rejection_reason"].is_string());

    let retry = user_request("POST", "/api/v1/verification/retry", "u2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, retry).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");

    let view = wait_for_status(&app, "u2", "pending").await;
    assert_eq!(view["message"], "Waiting for document images");

    let history = admin_request(
        "GET",
        &format!(
            "/api/v1/admin/records/{}/history",
            body["record_id"].as_str().unwrap()
        ),
    )
    .body(Body::empty())
    .unwrap();
    let (status, chain) = send(&app, history).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chain["attempts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_routes_are_forbidden_to_users() {
    let app = app();
    let request = user_request("GET", "/api/v1/admin/reviews", "u1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn reviewer_approves_partial_match() {
    let app = app();
    // Given names match, surnames only partly.
    let front = CEDULA_FRONT.replace("RAMOS OCHOA", "RAMIREZ OSPINA");
    let (status, receipt) = send(&app, submission("u1", &front)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    wait_for_status(&app, "u1", "pending_review").await;

    let list = admin_request("GET", "/api/v1/admin/reviews?page=1&per_page=10")
        .body(Body::empty())
        .unwrap();
    let (status, page) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["display_name"], "Luz Deisy Ramos Ochoa");
    assert_eq!(page["items"][0]["record_id"], receipt["record_id"]);

    let decide = admin_request(
        "POST",
        &format!(
            "/api/v1/admin/reviews/{}/decision",
            receipt["record_id"].as_str().unwrap()
        ),
    )
    .header("content-type", "application/json")
    .body(Body::from(json!({"decision": "approve"}).to_string()))
    .unwrap();
    let (status, record) = send(&app, decide).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "approved");
    assert_eq!(record["verification_method"], "manual");
    assert_eq!(record["reviewed_by"], "reviewer");

    let view = wait_for_status(&app, "u1", "approved").await;
    assert_eq!(view["record_id"], receipt["record_id"]);
}

#[tokio::test]
async fn purge_with_explicit_age() {
    let app = app();
    let request = admin_request("POST", "/api/v1/admin/maintenance/purge")
        .header("content-type", "application/json")
        .body(Body::from(json!({"older_than_days": 30}).to_string()))
        .unwrap();
    let (status, report) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["removed"], 0);

    let zero = admin_request("POST", "/api/v1/admin/maintenance/purge")
        .header("content-type", "application/json")
        .body(Body::from(json!({"older_than_days": 0}).to_string()))
        .unwrap();
    let (status, _) = send(&app, zero).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app();
    let (status, body) = send(&app, Request::get("/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

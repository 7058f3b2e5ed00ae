use crate::error::{ServerError, ServerResult};
use crate::middleware::CallerIdentity;
use crate::state::ServerState;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use docverify::{ImageUpload, RetryRequest, SubmitRequest};
use std::sync::Arc;

/// Fields accepted in a verification upload.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub document_type: Option<String>,
    pub front_image: Option<ImageUpload>,
    pub back_image: Option<ImageUpload>,
}

/// Reads `document_type`, `front_image` and `back_image`; other fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> ServerResult<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "document_type" => form.document_type = Some(field.text().await?),
            "front_image" | "back_image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?;
                let upload = ImageUpload::new(bytes.to_vec(), content_type);
                if name == "front_image" {
                    form.front_image = Some(upload);
                } else {
                    form.back_image = Some(upload);
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Submit a document for verification (multipart).
///
/// Responds `202 Accepted` with `{record_id, status, estimated_seconds}`;
/// processing continues in the background.
pub async fn submit(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
    multipart: Multipart,
) -> ServerResult<impl IntoResponse> {
    let form = read_upload(multipart).await?;
    let receipt = state
        .coordinator
        .submit(SubmitRequest {
            user_id: caller.user_id,
            document_type: form.document_type.unwrap_or_default(),
            front_image: form.front_image,
            back_image: form.back_image,
        })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// The caller's latest verification status.
pub async fn status(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
) -> ServerResult<impl IntoResponse> {
    Ok(Json(state.coordinator.status(&caller.user_id)?))
}

/// Retry after a rejected or expired attempt.
///
/// Images are optional: send them as multipart to start processing now, or
/// send no body and upload them later through the submit route.
pub async fn retry(
    State(state): State<Arc<ServerState>>,
    CallerIdentity(caller): CallerIdentity,
    request: Request,
) -> ServerResult<impl IntoResponse> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let form = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        read_upload(multipart).await?
    } else {
        UploadForm::default()
    };

    let receipt = state
        .workflow
        .retry(RetryRequest {
            user_id: caller.user_id,
            front_image: form.front_image,
            back_image: form.back_image,
        })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

//! Upload function handlers
//!
//! One URL, dispatched on method: POST acknowledges an upload, GET answers
//! the retrieval placeholder, anything else (except the CORS preflight,
//! which the CORS layer answers) is rejected with 405.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use modup_core::{RetrievalNotice, UploadError, UploadReceipt, UploadRequest};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Header the web client uses to identify the uploading user
pub const USER_ID_HEADER: &str = "x-user-id";

/// Query parameters of the retrieval endpoint
#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    #[serde(rename = "fileId", default)]
    pub file_id: Option<String>,
}

/// POST {route_path}
/// Acknowledge an uploaded mod file
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadReceipt>, ApiError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok());

    let receipt = accept_upload(&state, &body, user_id).await?;
    Ok(Json(receipt))
}

/// GET {route_path}?fileId=...
/// Retrieval placeholder; nothing is looked up
pub async fn get_file(
    State(state): State<AppState>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<RetrievalNotice>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let notice = locate_file(&state, query.file_id.as_deref()).await?;
    Ok(Json(notice))
}

/// Any method without a handler on the upload route
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Parse, check and acknowledge a raw upload body
pub async fn accept_upload(
    state: &AppState,
    body: &[u8],
    user_id: Option<&str>,
) -> Result<UploadReceipt, ApiError> {
    let max = state.settings().max_body_bytes;
    if body.len() > max {
        return Err(ApiError::PayloadTooLarge(format!(
            "Request body exceeds {} bytes",
            max
        )));
    }

    let upload = UploadRequest::from_json(body)?
        .into_upload(&state.settings().default_file_name)?;
    let content_len = upload.file_content.len();

    let receipt = state.backend().accept(upload).await?;

    tracing::info!(
        mod_id = %receipt.mod_id,
        file_id = %receipt.file_id,
        file_name = %receipt.file_name,
        content_len,
        user_id = user_id.unwrap_or("-"),
        "File upload acknowledged"
    );

    Ok(receipt)
}

/// Resolve the retrieval placeholder for an optional file ID
pub async fn locate_file(
    state: &AppState,
    file_id: Option<&str>,
) -> Result<RetrievalNotice, ApiError> {
    let file_id = file_id
        .filter(|id| !id.is_empty())
        .ok_or(UploadError::MissingFileId)?;

    let notice = state.backend().locate(file_id).await?;

    tracing::debug!(file_id = %file_id, "File retrieval requested");

    Ok(notice)
}

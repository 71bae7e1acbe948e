use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::services::{
    ext_from_mime, owns_key, remove_image, store_image, UploadItem, MAX_UPLOAD_BYTES,
};
use crate::{
    auth::extractors::AuthUser,
    error::{required, ApiError, AppJson},
    state::AppState,
};

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/uploads", post(upload_image).delete(delete_image))
        // multipart framing on top of the file itself
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
}

/// POST /uploads (multipart, field `file`)
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".into());
        let Some(ext) = ext_from_mime(&content_type) else {
            warn!(%content_type, "rejected upload type");
            return Err(ApiError::validation("file must be a jpeg, png, webp or heic image"));
        };
        let body = field.bytes().await?;
        if body.is_empty() {
            return Err(ApiError::validation("file is empty"));
        }
        if body.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::validation("file is larger than 10 MiB"));
        }

        let stored = store_image(&state, principal.user_id, UploadItem { body, content_type }, ext)
            .await?;
        info!(key = %stored.key, "image uploaded");
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                key: stored.key,
                url: stored.url,
            }),
        ));
    }
    Err(ApiError::validation("file is required"))
}

#[derive(Debug, Deserialize)]
pub struct DeleteUploadRequest {
    pub key: Option<String>,
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn delete_image(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<DeleteUploadRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = required("key", payload.key)?;
    if !owns_key(principal.user_id, &key) {
        return Err(ApiError::NotFound("Upload"));
    }
    remove_image(&state, &key).await?;
    info!(%key, "image deleted");
    Ok(Json(json!({ "success": true })))
}

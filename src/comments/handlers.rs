use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CommentResponse, CreateCommentRequest},
    repo,
};
use crate::{
    access::{authorize, ensure_affected, Action},
    auth::{claims::Principal, extractors::AuthUser},
    catches,
    error::{ApiError, AppJson, AppPath, Validate},
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/catches/:id/comments",
            get(list_comments).post(create_comment),
        )
        .route("/comments/:id", delete(delete_comment))
}

/// Loads the catch and checks the caller may see it.
pub(crate) async fn readable_catch(
    state: &AppState,
    catch_id: Uuid,
    principal: &Principal,
) -> Result<catches::repo::Catch, ApiError> {
    let catch = catches::repo::find(&state.db, catch_id)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    authorize(
        "Catch",
        catch.user_id,
        catch.is_shared.into(),
        principal,
        Action::Read,
    )?;
    Ok(catch)
}

#[instrument(skip_all, fields(user_id = %principal.user_id, catch_id = %id))]
pub async fn list_comments(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    readable_catch(&state, id, &principal).await?;
    let rows = repo::list_for_catch(&state.db, id).await?;
    Ok(Json(rows.into_iter().map(CommentResponse::from).collect()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, catch_id = %id))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let body = payload.validate()?;
    readable_catch(&state, id, &principal).await?;
    let comment = repo::create(&state.db, id, principal.user_id, &body).await?;
    info!(comment_id = %comment.id, "comment created");
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Only the author may delete; for anyone else the comment does not exist.
#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let rows = repo::delete(&state.db, id, principal.user_id).await?;
    ensure_affected("Comment", rows)?;
    info!("comment deleted");
    Ok(Json(json!({ "success": true })))
}

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::repo;
use crate::{
    auth::extractors::AuthUser,
    comments::handlers::readable_catch,
    error::{ApiError, AppPath},
    state::AppState,
};

pub fn like_routes() -> Router<AppState> {
    Router::new().route("/catches/:id/like", post(toggle_like))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes: i64,
    pub is_liked: bool,
}

/// Read-then-write toggle. Two concurrent toggles by the same user may
/// both land on the same side; the unique edge keeps the count sane.
#[instrument(skip_all, fields(user_id = %principal.user_id, catch_id = %id))]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<LikeResponse>, ApiError> {
    readable_catch(&state, id, &principal).await?;

    let was_liked = repo::exists(&state.db, id, principal.user_id).await?;
    if was_liked {
        repo::remove(&state.db, id, principal.user_id).await?;
    } else {
        repo::add(&state.db, id, principal.user_id).await?;
    }
    let likes = repo::count(&state.db, id).await?;
    debug!(likes, is_liked = !was_liked, "like toggled");

    Ok(Json(LikeResponse {
        likes,
        is_liked: !was_liked,
    }))
}

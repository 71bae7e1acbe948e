use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateSpotRequest, FavoriteResponse, SpotFilter, SpotResponse, UpdateSpotRequest},
    repo,
};
use crate::{
    access::{authorize, ensure_affected, Action, Visibility},
    auth::extractors::AuthUser,
    error::{ApiError, AppJson, AppPath, AppQuery, Validate},
    pagination::Pagination,
    state::AppState,
};

pub fn spot_routes() -> Router<AppState> {
    Router::new()
        .route("/spots", get(list_spots).post(create_spot))
        .route(
            "/spots/:id",
            get(get_spot).patch(update_spot).delete(delete_spot),
        )
        .route("/spots/:id/favorite", post(toggle_favorite))
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn list_spots(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppQuery(filter): AppQuery<SpotFilter>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<SpotResponse>>, ApiError> {
    let (limit, offset) = page.clamped();
    let spots =
        repo::list_by_user(&state.db, principal.user_id, filter.favorite, limit, offset).await?;
    Ok(Json(spots.into_iter().map(SpotResponse::from).collect()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn create_spot(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<CreateSpotRequest>,
) -> Result<(StatusCode, Json<SpotResponse>), ApiError> {
    let input = payload.validate()?;
    let spot = repo::create(&state.db, principal.user_id, &input).await?;
    info!(spot_id = %spot.id, "spot created");
    Ok((StatusCode::CREATED, Json(spot.into())))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn get_spot(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SpotResponse>, ApiError> {
    let spot = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Spot"))?;
    authorize("Spot", spot.user_id, Visibility::Private, &principal, Action::Read)?;
    Ok(Json(spot.into()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn update_spot(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateSpotRequest>,
) -> Result<Json<SpotResponse>, ApiError> {
    let patch = payload.validate()?;
    let spot = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Spot"))?;
    authorize("Spot", spot.user_id, Visibility::Private, &principal, Action::Mutate)?;

    let updated = repo::update(&state.db, id, principal.user_id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Spot"))?;
    Ok(Json(updated.into()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn delete_spot(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let spot = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Spot"))?;
    authorize("Spot", spot.user_id, Visibility::Private, &principal, Action::Delete)?;

    let rows = repo::delete(&state.db, id, principal.user_id).await?;
    ensure_affected("Spot", rows)?;
    info!("spot deleted");
    Ok(Json(json!({ "success": true })))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<FavoriteResponse>, ApiError> {
    let is_favorite = repo::toggle_favorite(&state.db, id, principal.user_id)
        .await?
        .ok_or(ApiError::NotFound("Spot"))?;
    Ok(Json(FavoriteResponse { id, is_favorite }))
}

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        CatchDetails, CatchFilter, CatchResponse, CreateCatchRequest, CreatedCatchResponse,
        ShareResponse, UpdateCatchRequest,
    },
    repo, services,
};
use crate::{
    access::{authorize, ensure_affected, Action},
    auth::extractors::AuthUser,
    error::{ApiError, AppJson, AppPath, AppQuery, Validate},
    events::{self, handlers::ensure_spot_owned},
    pagination::Pagination,
    state::AppState,
};

pub fn catch_routes() -> Router<AppState> {
    Router::new()
        .route("/catches", get(list_catches).post(create_catch))
        .route("/catches/feed", get(feed))
        .route(
            "/catches/:id",
            get(get_catch).patch(update_catch).delete(delete_catch),
        )
        .route("/catches/:id/share", post(toggle_share))
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn list_catches(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppQuery(filter): AppQuery<CatchFilter>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<CatchResponse>>, ApiError> {
    let (limit, offset) = page.clamped();
    let rows = repo::list_by_user(
        &state.db,
        principal.user_id,
        filter.event_id,
        filter.spot_id,
        limit,
        offset,
    )
    .await?;
    Ok(Json(rows.into_iter().map(CatchResponse::from).collect()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn feed(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<CatchDetails>>, ApiError> {
    let (limit, offset) = page.clamped();
    let rows = repo::feed(&state.db, principal.user_id, limit, offset).await?;
    Ok(Json(rows.into_iter().map(CatchDetails::from).collect()))
}

/// Files the catch under `eventId`, or under a fresh session when absent.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn create_catch(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<CreateCatchRequest>,
) -> Result<(StatusCode, Json<CreatedCatchResponse>), ApiError> {
    let input = payload.validate()?;
    ensure_spot_owned(&state, input.spot_id, principal.user_id).await?;

    let mut tx = state.db.begin().await?;
    let (event_id, created_event_id) = match input.event_id {
        Some(event_id) => {
            events::repo::find_owned_tx(&mut tx, event_id, principal.user_id)
                .await?
                .ok_or(ApiError::NotFound("Event"))?;
            (event_id, None)
        }
        None => {
            let session =
                services::session_for_catch(&input.species, input.spot_id, OffsetDateTime::now_utc())?;
            let event = events::repo::insert_tx(&mut tx, principal.user_id, &session).await?;
            info!(event_id = %event.id, "session created for catch");
            (event.id, Some(event.id))
        }
    };
    let catch = repo::insert_tx(&mut tx, principal.user_id, event_id, &input).await?;
    tx.commit().await?;

    info!(catch_id = %catch.id, %event_id, "catch created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedCatchResponse {
            catch: catch.into(),
            created_event_id,
        }),
    ))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn get_catch(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CatchDetails>, ApiError> {
    let view = repo::find_view(&state.db, id, principal.user_id)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    authorize(
        "Catch",
        view.user_id,
        view.is_shared.into(),
        &principal,
        Action::Read,
    )?;
    Ok(Json(view.into()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn update_catch(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCatchRequest>,
) -> Result<Json<CatchResponse>, ApiError> {
    let patch = payload.validate()?;
    let catch = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    authorize(
        "Catch",
        catch.user_id,
        catch.is_shared.into(),
        &principal,
        Action::Mutate,
    )?;

    ensure_spot_owned(&state, patch.spot_id.value().copied(), principal.user_id).await?;
    if let Some(event_id) = patch.event_id {
        let owned = events::repo::find(&state.db, event_id)
            .await?
            .is_some_and(|e| e.user_id == principal.user_id);
        if !owned {
            return Err(ApiError::NotFound("Event"));
        }
    }

    let updated = repo::update(&state.db, id, principal.user_id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    Ok(Json(updated.into()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn delete_catch(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let catch = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    authorize(
        "Catch",
        catch.user_id,
        catch.is_shared.into(),
        &principal,
        Action::Delete,
    )?;

    let rows = repo::delete(&state.db, id, principal.user_id).await?;
    ensure_affected("Catch", rows)?;
    info!("catch deleted");
    Ok(Json(json!({ "success": true })))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn toggle_share(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ShareResponse>, ApiError> {
    let catch = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    authorize(
        "Catch",
        catch.user_id,
        catch.is_shared.into(),
        &principal,
        Action::Mutate,
    )?;

    let is_shared = repo::toggle_shared(&state.db, id, principal.user_id)
        .await?
        .ok_or(ApiError::NotFound("Catch"))?;
    info!(is_shared, "catch sharing toggled");
    Ok(Json(ShareResponse { id, is_shared }))
}

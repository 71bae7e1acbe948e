use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        check_span, CreateEventRequest, EventDetails, EventFilter, EventResponse,
        UpdateEventRequest,
    },
    repo,
};
use crate::{
    access::{authorize, ensure_affected, Action, Visibility},
    auth::extractors::AuthUser,
    catches,
    error::{ApiError, AppJson, AppPath, AppQuery, Validate},
    pagination::Pagination,
    spots,
    state::AppState,
};

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).patch(update_event).delete(delete_event),
        )
}

pub(crate) async fn ensure_spot_owned(
    state: &AppState,
    spot_id: Option<Uuid>,
    user_id: Uuid,
) -> Result<(), ApiError> {
    if let Some(spot_id) = spot_id {
        if !spots::repo::is_owned_by(&state.db, spot_id, user_id).await? {
            return Err(ApiError::NotFound("Spot"));
        }
    }
    Ok(())
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn list_events(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppQuery(filter): AppQuery<EventFilter>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let (limit, offset) = page.clamped();
    let events = repo::list_by_user(
        &state.db,
        principal.user_id,
        filter.from,
        filter.to,
        limit,
        offset,
    )
    .await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let input = payload.validate()?;
    ensure_spot_owned(&state, input.spot_id, principal.user_id).await?;
    let event = repo::create(&state.db, principal.user_id, &input).await?;
    info!(event_id = %event.id, "event created");
    Ok((StatusCode::CREATED, Json(event.into())))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<EventDetails>, ApiError> {
    let event = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    authorize("Event", event.user_id, Visibility::Private, &principal, Action::Read)?;

    let rows = catches::repo::list_by_event(&state.db, event.id).await?;
    Ok(Json(EventDetails {
        event: event.into(),
        catches: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    let patch = payload.validate()?;
    let event = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    authorize("Event", event.user_id, Visibility::Private, &principal, Action::Mutate)?;

    check_span(
        patch.start_at.unwrap_or(event.start_at),
        patch.end_at.apply(event.end_at),
    )?;
    ensure_spot_owned(&state, patch.spot_id.value().copied(), principal.user_id).await?;

    let updated = repo::update(&state.db, id, principal.user_id, &patch)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(Json(updated.into()))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let event = repo::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    authorize("Event", event.user_id, Visibility::Private, &principal, Action::Delete)?;

    let rows = repo::delete(&state.db, id, principal.user_id).await?;
    ensure_affected("Event", rows)?;
    info!("event deleted");
    Ok(Json(json!({ "success": true })))
}

use anyhow::Context;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::PublicUser,
        extractors::AuthUser,
        password::{hash_password, verify_password, MIN_PASSWORD_LEN},
        repo::User,
    },
    error::{ApiError, AppJson, Validate},
    patch::Patch,
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/profile/password", post(change_password))
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub spots: i64,
    pub events: i64,
    pub catches: i64,
    pub shared_catches: i64,
    pub total_weight_kg: f64,
    pub biggest_catch_kg: Option<f64>,
}

async fn stats_for(db: &PgPool, user_id: Uuid) -> anyhow::Result<ProfileStats> {
    let stats = sqlx::query_as::<_, ProfileStats>(
        r#"
        SELECT (SELECT COUNT(*) FROM spots WHERE user_id = $1) AS spots,
               (SELECT COUNT(*) FROM fish_events WHERE user_id = $1) AS events,
               (SELECT COUNT(*) FROM catches WHERE user_id = $1) AS catches,
               (SELECT COUNT(*) FROM catches WHERE user_id = $1 AND is_shared) AS shared_catches,
               (SELECT COALESCE(SUM(weight_kg), 0)::float8 FROM catches WHERE user_id = $1)
                   AS total_weight_kg,
               (SELECT MAX(weight_kg) FROM catches WHERE user_id = $1) AS biggest_catch_kg
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("profile stats")?;
    Ok(stats)
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
    pub stats: ProfileStats,
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    let stats = stats_for(&state.db, user.id).await?;
    Ok(Json(ProfileResponse {
        user: user.into(),
        stats,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub avatar_url: Patch<String>,
}

#[derive(Debug)]
pub struct ProfilePatch {
    pub name: Patch<String>,
    pub avatar_url: Patch<String>,
}

impl Validate for UpdateProfileRequest {
    type Output = ProfilePatch;

    fn validate(self) -> Result<ProfilePatch, ApiError> {
        let patch = ProfilePatch {
            name: self.name.trimmed(),
            avatar_url: self.avatar_url.trimmed(),
        };
        if !patch.name.is_touched() && !patch.avatar_url.is_touched() {
            return Err(ApiError::validation("name or avatarUrl is required"));
        }
        Ok(patch)
    }
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let patch = payload.validate()?;
    let user = User::update_profile(&state.db, principal.user_id, &patch.name, &patch.avatar_url)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
}

impl Validate for ChangePasswordRequest {
    type Output = PasswordChange;

    fn validate(self) -> Result<PasswordChange, ApiError> {
        let current = self
            .current_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::validation("currentPassword is required"))?;
        let new = self
            .new_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::validation("newPassword is required"))?;
        if new.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation("Password too short"));
        }
        Ok(PasswordChange { current, new })
    }
}

/// Existing tokens stay valid; only the stored hash changes.
#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let change = payload.validate()?;
    let user = User::find_by_id(&state.db, principal.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !verify_password(&change.current, &user.password_hash)? {
        warn!("password change with wrong current password");
        return Err(ApiError::validation("Current password is incorrect"));
    }

    let hash = hash_password(&change.new)?;
    if !User::set_password_hash(&state.db, user.id, &hash).await? {
        return Err(ApiError::Unauthenticated);
    }
    info!("password changed");
    Ok(Json(json!({ "success": true })))
}

//! Read-only reference collection of fish and bait species.

use anyhow::Context;
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, AppPath, AppQuery},
    state::AppState,
};

pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/collection", get(list_species))
        .route("/collection/:id", get(get_species))
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesKind {
    Fish,
    Bait,
}

impl SpeciesKind {
    fn as_str(self) -> &'static str {
        match self {
            SpeciesKind::Fish => "fish",
            SpeciesKind::Bait => "bait",
        }
    }
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub scientific_name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionQuery {
    pub kind: Option<SpeciesKind>,
    pub q: Option<String>,
}

/// `%`/`_` in user input match literally.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

async fn search(
    db: &PgPool,
    kind: Option<SpeciesKind>,
    q: Option<&str>,
) -> anyhow::Result<Vec<Species>> {
    let rows = sqlx::query_as::<_, Species>(
        r#"
        SELECT id, kind, name, scientific_name, description, image_url
          FROM species
         WHERE ($1::text IS NULL OR kind = $1)
           AND ($2::text IS NULL OR name ILIKE $2 OR scientific_name ILIKE $2)
         ORDER BY kind, name
        "#,
    )
    .bind(kind.map(SpeciesKind::as_str))
    .bind(q.map(like_pattern))
    .fetch_all(db)
    .await
    .context("search species")?;
    Ok(rows)
}

#[instrument(skip_all, fields(user_id = %principal.user_id))]
pub async fn list_species(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppQuery(query): AppQuery<CollectionQuery>,
) -> Result<Json<Vec<Species>>, ApiError> {
    let q = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = search(&state.db, query.kind, q).await?;
    Ok(Json(rows))
}

#[instrument(skip_all, fields(user_id = %principal.user_id, %id))]
pub async fn get_species(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Species>, ApiError> {
    let row = sqlx::query_as::<_, Species>(
        "SELECT id, kind, name, scientific_name, description, image_url FROM species WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(ApiError::NotFound("Species"))?;
    Ok(Json(row))
}

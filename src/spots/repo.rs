use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{NewSpot, SpotPatch};

#[derive(Debug, Clone, FromRow)]
pub struct Spot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_favorite: bool,
    pub created_at: OffsetDateTime,
}

const SPOT_COLUMNS: &str =
    "id, user_id, name, description, latitude, longitude, is_favorite, created_at";

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    favorite: Option<bool>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Spot>> {
    let rows = sqlx::query_as::<_, Spot>(&format!(
        r#"
        SELECT {SPOT_COLUMNS}
          FROM spots
         WHERE user_id = $1
           AND ($2::bool IS NULL OR is_favorite = $2)
         ORDER BY is_favorite DESC, created_at DESC
         LIMIT $3 OFFSET $4
        "#
    ))
    .bind(user_id)
    .bind(favorite)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list spots")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Spot>> {
    let row = sqlx::query_as::<_, Spot>(&format!("SELECT {SPOT_COLUMNS} FROM spots WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find spot")?;
    Ok(row)
}

/// True when `spot_id` exists and belongs to `user_id`.
pub async fn is_owned_by(db: &PgPool, spot_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
    let found: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM spots WHERE id = $1 AND user_id = $2")
            .bind(spot_id)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("check spot owner")?;
    Ok(found.is_some())
}

pub async fn create(db: &PgPool, user_id: Uuid, spot: &NewSpot) -> anyhow::Result<Spot> {
    let row = sqlx::query_as::<_, Spot>(&format!(
        r#"
        INSERT INTO spots (user_id, name, description, latitude, longitude, is_favorite)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SPOT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(&spot.name)
    .bind(&spot.description)
    .bind(spot.latitude)
    .bind(spot.longitude)
    .bind(spot.is_favorite)
    .fetch_one(db)
    .await
    .context("insert spot")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    patch: &SpotPatch,
) -> anyhow::Result<Option<Spot>> {
    let row = sqlx::query_as::<_, Spot>(&format!(
        r#"
        UPDATE spots
           SET name = COALESCE($3, name),
               description = CASE WHEN $4 THEN $5 ELSE description END,
               latitude = COALESCE($6, latitude),
               longitude = COALESCE($7, longitude)
         WHERE id = $1 AND user_id = $2
        RETURNING {SPOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&patch.name)
    .bind(patch.description.is_touched())
    .bind(patch.description.value())
    .bind(patch.latitude)
    .bind(patch.longitude)
    .fetch_optional(db)
    .await
    .context("update spot")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM spots WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete spot")?;
    Ok(res.rows_affected())
}

/// Flips `is_favorite` in one statement; `None` if nothing matched.
pub async fn toggle_favorite(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<bool>> {
    let row: Option<(bool,)> = sqlx::query_as(
        r#"
        UPDATE spots SET is_favorite = NOT is_favorite
         WHERE id = $1 AND user_id = $2
        RETURNING is_favorite
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("toggle spot favorite")?;
    Ok(row.map(|(fav,)| fav))
}

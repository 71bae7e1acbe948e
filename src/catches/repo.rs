use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{CatchPatch, NewCatch};

#[derive(Debug, Clone, FromRow)]
pub struct Catch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub bait: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub is_shared: bool,
    pub caught_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// A catch as seen by a particular viewer, with social counters.
#[derive(Debug, Clone, FromRow)]
pub struct CatchView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub species: String,
    pub weight_kg: Option<f64>,
    pub length_cm: Option<f64>,
    pub bait: Option<String>,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub is_shared: bool,
    pub caught_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub author_name: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub is_liked: bool,
}

const CATCH_COLUMNS: &str = "id, user_id, event_id, spot_id, species, weight_kg, length_cm, \
     bait, notes, photo_url, is_shared, caught_at, created_at";

// $1 is always the viewer.
const VIEW_SELECT: &str = r#"
    SELECT c.id, c.user_id, c.event_id, c.spot_id, c.species, c.weight_kg, c.length_cm,
           c.bait, c.notes, c.photo_url, c.is_shared, c.caught_at, c.created_at,
           u.name AS author_name,
           (SELECT COUNT(*) FROM catch_likes l WHERE l.catch_id = c.id) AS likes,
           (SELECT COUNT(*) FROM catch_comments m WHERE m.catch_id = c.id) AS comments,
           EXISTS (SELECT 1 FROM catch_likes l
                    WHERE l.catch_id = c.id AND l.user_id = $1) AS is_liked
      FROM catches c
      JOIN users u ON u.id = c.user_id
"#;

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    event_id: Option<Uuid>,
    spot_id: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Catch>> {
    let rows = sqlx::query_as::<_, Catch>(&format!(
        r#"
        SELECT {CATCH_COLUMNS}
          FROM catches
         WHERE user_id = $1
           AND ($2::uuid IS NULL OR event_id = $2)
           AND ($3::uuid IS NULL OR spot_id = $3)
         ORDER BY caught_at DESC
         LIMIT $4 OFFSET $5
        "#
    ))
    .bind(user_id)
    .bind(event_id)
    .bind(spot_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list catches")?;
    Ok(rows)
}

pub async fn list_by_event(db: &PgPool, event_id: Uuid) -> anyhow::Result<Vec<Catch>> {
    let rows = sqlx::query_as::<_, Catch>(&format!(
        "SELECT {CATCH_COLUMNS} FROM catches WHERE event_id = $1 ORDER BY caught_at ASC"
    ))
    .bind(event_id)
    .fetch_all(db)
    .await
    .context("list catches by event")?;
    Ok(rows)
}

pub async fn feed(
    db: &PgPool,
    viewer: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<CatchView>> {
    let rows = sqlx::query_as::<_, CatchView>(&format!(
        "{VIEW_SELECT} WHERE c.is_shared ORDER BY c.caught_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(viewer)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("catch feed")?;
    Ok(rows)
}

pub async fn find_view(db: &PgPool, id: Uuid, viewer: Uuid) -> anyhow::Result<Option<CatchView>> {
    let row = sqlx::query_as::<_, CatchView>(&format!("{VIEW_SELECT} WHERE c.id = $2"))
        .bind(viewer)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find catch view")?;
    Ok(row)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Catch>> {
    let row = sqlx::query_as::<_, Catch>(&format!(
        "SELECT {CATCH_COLUMNS} FROM catches WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find catch")?;
    Ok(row)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    event_id: Uuid,
    c: &NewCatch,
) -> anyhow::Result<Catch> {
    let row = sqlx::query_as::<_, Catch>(&format!(
        r#"
        INSERT INTO catches (user_id, event_id, spot_id, species, weight_kg, length_cm,
                             bait, notes, photo_url, is_shared, caught_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {CATCH_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(event_id)
    .bind(c.spot_id)
    .bind(&c.species)
    .bind(c.weight_kg)
    .bind(c.length_cm)
    .bind(&c.bait)
    .bind(&c.notes)
    .bind(&c.photo_url)
    .bind(c.is_shared)
    .bind(c.caught_at)
    .fetch_one(&mut **tx)
    .await
    .context("insert catch")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    patch: &CatchPatch,
) -> anyhow::Result<Option<Catch>> {
    let row = sqlx::query_as::<_, Catch>(&format!(
        r#"
        UPDATE catches
           SET species = COALESCE($3, species),
               weight_kg = CASE WHEN $4 THEN $5 ELSE weight_kg END,
               length_cm = CASE WHEN $6 THEN $7 ELSE length_cm END,
               bait = CASE WHEN $8 THEN $9 ELSE bait END,
               notes = CASE WHEN $10 THEN $11 ELSE notes END,
               photo_url = CASE WHEN $12 THEN $13 ELSE photo_url END,
               is_shared = COALESCE($14, is_shared),
               caught_at = COALESCE($15, caught_at),
               spot_id = CASE WHEN $16 THEN $17 ELSE spot_id END,
               event_id = COALESCE($18, event_id)
         WHERE id = $1 AND user_id = $2
        RETURNING {CATCH_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&patch.species)
    .bind(patch.weight_kg.is_touched())
    .bind(patch.weight_kg.value().copied())
    .bind(patch.length_cm.is_touched())
    .bind(patch.length_cm.value().copied())
    .bind(patch.bait.is_touched())
    .bind(patch.bait.value())
    .bind(patch.notes.is_touched())
    .bind(patch.notes.value())
    .bind(patch.photo_url.is_touched())
    .bind(patch.photo_url.value())
    .bind(patch.is_shared)
    .bind(patch.caught_at)
    .bind(patch.spot_id.is_touched())
    .bind(patch.spot_id.value().copied())
    .bind(patch.event_id)
    .fetch_optional(db)
    .await
    .context("update catch")?;
    Ok(row)
}

/// Flips `is_shared` in one statement; `None` if nothing matched.
pub async fn toggle_shared(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<bool>> {
    let row: Option<(bool,)> = sqlx::query_as(
        r#"
        UPDATE catches SET is_shared = NOT is_shared
         WHERE id = $1 AND user_id = $2
        RETURNING is_shared
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("toggle catch shared")?;
    Ok(row.map(|(shared,)| shared))
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM catches WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete catch")?;
    Ok(res.rows_affected())
}

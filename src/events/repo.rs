use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{EventPatch, NewEvent};

/// A fishing session on the calendar.
#[derive(Debug, Clone, FromRow)]
pub struct FishEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub spot_id: Option<Uuid>,
    pub title: String,
    pub notes: Option<String>,
    pub start_at: OffsetDateTime,
    pub end_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

const EVENT_COLUMNS: &str = "id, user_id, spot_id, title, notes, start_at, end_at, created_at";

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    from: Option<OffsetDateTime>,
    to: Option<OffsetDateTime>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<FishEvent>> {
    let rows = sqlx::query_as::<_, FishEvent>(&format!(
        r#"
        SELECT {EVENT_COLUMNS}
          FROM fish_events
         WHERE user_id = $1
           AND ($2::timestamptz IS NULL OR start_at >= $2)
           AND ($3::timestamptz IS NULL OR start_at < $3)
         ORDER BY start_at DESC
         LIMIT $4 OFFSET $5
        "#
    ))
    .bind(user_id)
    .bind(from)
    .bind(to)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list events")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<FishEvent>> {
    let row = sqlx::query_as::<_, FishEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM fish_events WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find event")?;
    Ok(row)
}

/// Event row locked for the caller inside a transaction.
pub async fn find_owned_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<FishEvent>> {
    let row = sqlx::query_as::<_, FishEvent>(&format!(
        "SELECT {EVENT_COLUMNS} FROM fish_events WHERE id = $1 AND user_id = $2 FOR SHARE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("find owned event")?;
    Ok(row)
}

pub async fn create(db: &PgPool, user_id: Uuid, event: &NewEvent) -> anyhow::Result<FishEvent> {
    let mut tx = db.begin().await.context("begin tx")?;
    let row = insert_tx(&mut tx, user_id, event).await?;
    tx.commit().await.context("commit tx")?;
    Ok(row)
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    event: &NewEvent,
) -> anyhow::Result<FishEvent> {
    let row = sqlx::query_as::<_, FishEvent>(&format!(
        r#"
        INSERT INTO fish_events (user_id, spot_id, title, notes, start_at, end_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {EVENT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(event.spot_id)
    .bind(&event.title)
    .bind(&event.notes)
    .bind(event.start_at)
    .bind(event.end_at)
    .fetch_one(&mut **tx)
    .await
    .context("insert event")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
    patch: &EventPatch,
) -> anyhow::Result<Option<FishEvent>> {
    let row = sqlx::query_as::<_, FishEvent>(&format!(
        r#"
        UPDATE fish_events
           SET title = COALESCE($3, title),
               notes = CASE WHEN $4 THEN $5 ELSE notes END,
               start_at = COALESCE($6, start_at),
               end_at = CASE WHEN $7 THEN $8 ELSE end_at END,
               spot_id = CASE WHEN $9 THEN $10 ELSE spot_id END
         WHERE id = $1 AND user_id = $2
        RETURNING {EVENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&patch.title)
    .bind(patch.notes.is_touched())
    .bind(patch.notes.value())
    .bind(patch.start_at)
    .bind(patch.end_at.is_touched())
    .bind(patch.end_at.value().copied())
    .bind(patch.spot_id.is_touched())
    .bind(patch.spot_id.value().copied())
    .fetch_optional(db)
    .await
    .context("update event")?;
    Ok(row)
}

/// Catches of the event go with it (ON DELETE CASCADE).
pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM fish_events WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete event")?;
    Ok(res.rows_affected())
}

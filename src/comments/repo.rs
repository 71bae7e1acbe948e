use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub catch_id: Uuid,
    pub user_id: Uuid,
    pub author_name: Option<String>,
    pub body: String,
    pub created_at: OffsetDateTime,
}

pub async fn list_for_catch(db: &PgPool, catch_id: Uuid) -> anyhow::Result<Vec<Comment>> {
    let rows = sqlx::query_as::<_, Comment>(
        r#"
        SELECT m.id, m.catch_id, m.user_id, u.name AS author_name, m.body, m.created_at
          FROM catch_comments m
          JOIN users u ON u.id = m.user_id
         WHERE m.catch_id = $1
         ORDER BY m.created_at ASC
        "#,
    )
    .bind(catch_id)
    .fetch_all(db)
    .await
    .context("list comments")?;
    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    catch_id: Uuid,
    user_id: Uuid,
    body: &str,
) -> anyhow::Result<Comment> {
    let row = sqlx::query_as::<_, Comment>(
        r#"
        WITH inserted AS (
            INSERT INTO catch_comments (catch_id, user_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, catch_id, user_id, body, created_at
        )
        SELECT i.id, i.catch_id, i.user_id, u.name AS author_name, i.body, i.created_at
          FROM inserted i
          JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(catch_id)
    .bind(user_id)
    .bind(body)
    .fetch_one(db)
    .await
    .context("insert comment")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM catch_comments WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete comment")?;
    Ok(res.rows_affected())
}

use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn exists(db: &PgPool, catch_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
    let (found,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM catch_likes WHERE catch_id = $1 AND user_id = $2)",
    )
    .bind(catch_id)
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("check like")?;
    Ok(found)
}

pub async fn add(db: &PgPool, catch_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO catch_likes (catch_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (catch_id, user_id) DO NOTHING
        "#,
    )
    .bind(catch_id)
    .bind(user_id)
    .execute(db)
    .await
    .context("insert like")?;
    Ok(())
}

pub async fn remove(db: &PgPool, catch_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM catch_likes WHERE catch_id = $1 AND user_id = $2")
        .bind(catch_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete like")?;
    Ok(())
}

pub async fn count(db: &PgPool, catch_id: Uuid) -> anyhow::Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM catch_likes WHERE catch_id = $1")
        .bind(catch_id)
        .fetch_one(db)
        .await
        .context("count likes")?;
    Ok(n)
}

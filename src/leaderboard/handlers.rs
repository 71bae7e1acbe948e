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
    error::{ApiError, AppQuery},
    pagination::MAX_LIMIT,
    state::AppState,
};

pub fn leaderboard_routes() -> Router<AppState> {
    Router::new().route("/leaderboard", get(leaderboard))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Catches,
    Weight,
    Biggest,
}

impl Metric {
    fn order_by(self) -> &'static str {
        match self {
            Metric::Catches => "catches DESC, total_weight_kg DESC",
            Metric::Weight => "total_weight_kg DESC, catches DESC",
            Metric::Biggest => "biggest_catch_kg DESC NULLS LAST, catches DESC",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Clone, FromRow)]
pub struct StandingRow {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub catches: i64,
    pub total_weight_kg: f64,
    pub biggest_catch_kg: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: usize,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub catches: i64,
    pub total_weight_kg: f64,
    pub biggest_catch_kg: Option<f64>,
    pub is_current_user: bool,
}

async fn standings(db: &PgPool, metric: Metric, limit: i64) -> anyhow::Result<Vec<StandingRow>> {
    let rows = sqlx::query_as::<_, StandingRow>(&format!(
        r#"
        SELECT u.id AS user_id,
               u.name,
               COUNT(c.id) AS catches,
               COALESCE(SUM(c.weight_kg), 0)::float8 AS total_weight_kg,
               MAX(c.weight_kg) AS biggest_catch_kg
          FROM users u
          JOIN catches c ON c.user_id = u.id
         GROUP BY u.id, u.name
         ORDER BY {}, user_id
         LIMIT $1
        "#,
        metric.order_by()
    ))
    .bind(limit)
    .fetch_all(db)
    .await
    .context("leaderboard standings")?;
    Ok(rows)
}

fn rank(rows: Vec<StandingRow>, viewer: Uuid) -> Vec<Standing> {
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| Standing {
            rank: i + 1,
            is_current_user: r.user_id == viewer,
            user_id: r.user_id,
            name: r.name,
            catches: r.catches,
            total_weight_kg: r.total_weight_kg,
            biggest_catch_kg: r.biggest_catch_kg,
        })
        .collect()
}

#[instrument(skip_all, fields(user_id = %principal.user_id, metric = ?q.metric))]
pub async fn leaderboard(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    AppQuery(q): AppQuery<LeaderboardQuery>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    let limit = q.limit.clamp(1, MAX_LIMIT);
    let rows = standings(&state.db, q.metric, limit).await?;
    Ok(Json(rank(rows, principal.user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_parses_from_query() {
        let q: LeaderboardQuery = serde_json::from_str(r#"{"metric":"biggest"}"#).unwrap();
        assert_eq!(q.metric, Metric::Biggest);
        assert_eq!(q.limit, 10);

        let q: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.metric, Metric::Catches);
    }

    #[test]
    fn biggest_puts_missing_weights_last() {
        assert!(Metric::Biggest.order_by().contains("NULLS LAST"));
    }

    #[test]
    fn ranks_are_one_based_and_mark_viewer() {
        let me = Uuid::new_v4();
        let rows = vec![
            StandingRow {
                user_id: Uuid::new_v4(),
                name: Some("Ada".into()),
                catches: 12,
                total_weight_kg: 30.5,
                biggest_catch_kg: Some(8.0),
            },
            StandingRow {
                user_id: me,
                name: None,
                catches: 3,
                total_weight_kg: 4.0,
                biggest_catch_kg: None,
            },
        ];
        let ranked = rank(rows, me);
        assert_eq!(ranked[0].rank, 1);
        assert!(!ranked[0].is_current_user);
        assert_eq!(ranked[1].rank, 2);
        assert!(ranked[1].is_current_user);
    }
}

use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::UserStatisticsRow;

#[derive(Debug, Clone)]
pub struct UpsertUserStatistics {
    pub user_id: Uuid,
    pub mode_id: i32,
    pub strength: f64,
    pub points: f64,
    pub rank: f64,
}

pub async fn get_for_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    mode_id: i32,
) -> SqlxResult<Option<UserStatisticsRow>> {
    sqlx::query_as::<_, UserStatisticsRow>(
        r#"
        SELECT user_id, mode_id, strength, points, rank, updated_at
        FROM user_statistics
        WHERE user_id = $1 AND mode_id = $2
        "#,
    )
    .bind(user_id)
    .bind(mode_id)
    .fetch_optional(executor)
    .await
}

pub async fn upsert<'e>(
    executor: impl PgExecutor<'e>,
    data: UpsertUserStatistics,
) -> SqlxResult<UserStatisticsRow> {
    sqlx::query_as::<_, UserStatisticsRow>(
        r#"
        INSERT INTO user_statistics (user_id, mode_id, strength, points, rank)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, mode_id) DO UPDATE
        SET strength = EXCLUDED.strength,
            points = EXCLUDED.points,
            rank = EXCLUDED.rank,
            updated_at = NOW()
        RETURNING user_id, mode_id, strength, points, rank, updated_at
        "#,
    )
    .bind(data.user_id)
    .bind(data.mode_id)
    .bind(data.strength)
    .bind(data.points)
    .bind(data.rank)
    .fetch_one(executor)
    .await
}

use async_trait::async_trait;
use infra::repos::user_statistics;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberStatistics {
    pub strength: f64,
    pub points: f64,
    pub rank: f64,
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("no statistics for user {user_id} in mode {mode_id}")]
    Missing { user_id: Uuid, mode_id: i32 },

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Source of up-to-date per-member metrics for a mode.
#[async_trait]
pub trait StatisticsProvider: Send + Sync {
    async fn refresh(&self, user_id: Uuid, mode_id: i32) -> Result<MemberStatistics, StatsError>;
}

/// Reads the statistics last stored for each member.
#[derive(Clone)]
pub struct PgStatisticsProvider {
    db: PgPool,
}

impl PgStatisticsProvider {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatisticsProvider for PgStatisticsProvider {
    async fn refresh(&self, user_id: Uuid, mode_id: i32) -> Result<MemberStatistics, StatsError> {
        let row = user_statistics::get_for_user(&self.db, user_id, mode_id)
            .await?
            .ok_or(StatsError::Missing { user_id, mode_id })?;

        Ok(MemberStatistics {
            strength: row.strength,
            points: row.points,
            rank: row.rank,
        })
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use super::{BracketStore, BracketTx, StoreError, StoreResult};
use crate::models::MatchupRow;
use crate::repos::matchups;

#[derive(Clone)]
pub struct PgBracketStore {
    db: PgPool,
}

impl PgBracketStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BracketStore for PgBracketStore {
    async fn begin(&self) -> StoreResult<Box<dyn BracketTx>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgBracketTx { tx }))
    }

    async fn matchup(&self, id: Uuid) -> StoreResult<Option<MatchupRow>> {
        Ok(matchups::get_by_id(&self.db, id).await?)
    }

    async fn live_potentials(&self, matchup_id: Uuid) -> StoreResult<Vec<MatchupRow>> {
        Ok(matchups::list_live_potentials(&self.db, matchup_id).await?)
    }
}

/// Rolls back on drop unless committed.
pub struct PgBracketTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BracketTx for PgBracketTx {
    async fn lock_matchup(&mut self, id: Uuid) -> StoreResult<Option<MatchupRow>> {
        Ok(matchups::get_by_id_for_update(&mut *self.tx, id).await?)
    }

    async fn next_matchups(&mut self, id: Uuid) -> StoreResult<Vec<MatchupRow>> {
        Ok(matchups::list_next(&mut *self.tx, id).await?)
    }

    async fn potentials_for(&mut self, id: Uuid) -> StoreResult<Vec<MatchupRow>> {
        Ok(matchups::list_potentials_for_update(&mut *self.tx, id).await?)
    }

    async fn save_matchup(&mut self, matchup: &mut MatchupRow) -> StoreResult<()> {
        match matchups::update_state(&mut *self.tx, matchup).await? {
            Some(version) => {
                matchup.version = version;
                Ok(())
            }
            None => {
                debug!(
                    matchup_id = %matchup.id,
                    version = matchup.version,
                    "Stale matchup version"
                );
                Err(StoreError::Conflict(matchup.id))
            }
        }
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

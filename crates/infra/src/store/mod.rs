//! Transactional access to the bracket graph.
//!
//! The progression engine only talks to [`BracketStore`] and [`BracketTx`], so
//! the same workflow runs against Postgres in production and against the
//! in-memory arena in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::MatchupRow;

pub mod memory;
pub mod postgres;

pub use memory::MemoryBracketStore;
pub use postgres::PgBracketStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("matchup {0} not found")]
    NotFound(Uuid),

    /// Optimistic version check failed: another transaction wrote the row first.
    #[error("matchup {0} was modified by a concurrent transaction")]
    Conflict(Uuid),

    #[error("constraint violated: {0}")]
    Constraint(String),
}

#[async_trait]
pub trait BracketStore: Send + Sync {
    /// Open a unit of work. Dropping the returned transaction without
    /// calling [`BracketTx::commit`] discards every write made through it.
    async fn begin(&self) -> StoreResult<Box<dyn BracketTx>>;

    /// Read a matchup without locking it.
    async fn matchup(&self, id: Uuid) -> StoreResult<Option<MatchupRow>>;

    /// Non-invalidated potentials for a matchup, outside of any transaction.
    async fn live_potentials(&self, matchup_id: Uuid) -> StoreResult<Vec<MatchupRow>>;
}

#[async_trait]
pub trait BracketTx: Send {
    /// Load a matchup and hold it against concurrent writers.
    async fn lock_matchup(&mut self, id: Uuid) -> StoreResult<Option<MatchupRow>>;

    /// Real matchups listing `id` as a winner or loser source, in generation order.
    async fn next_matchups(&mut self, id: Uuid) -> StoreResult<Vec<MatchupRow>>;

    /// All potentials for `id` (invalidated included), in generation order.
    async fn potentials_for(&mut self, id: Uuid) -> StoreResult<Vec<MatchupRow>>;

    /// Persist slot, winner and invalid state. `matchup.version` must be the
    /// version that was read; it is bumped on success.
    async fn save_matchup(&mut self, matchup: &mut MatchupRow) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

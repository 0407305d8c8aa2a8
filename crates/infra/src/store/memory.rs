//! Arena-backed bracket store.
//!
//! Matchups live in one map keyed by id; potentials point at their real
//! matchup through `potential_for`, never through an owning reference.
//! Transactions buffer their writes and apply them on commit after checking
//! that no row they read has moved to a newer version.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{BracketStore, BracketTx, StoreError, StoreResult};
use crate::models::MatchupRow;
use crate::repos::matchups::CreateMatchup;

#[derive(Debug, Default)]
struct Arena {
    matchups: HashMap<Uuid, MatchupRow>,
    next_sequence: i64,
}

fn sorted<'a>(rows: impl Iterator<Item = &'a MatchupRow>) -> Vec<MatchupRow> {
    let mut rows: Vec<MatchupRow> = rows.cloned().collect();
    rows.sort_by_key(|m| m.sequence);
    rows
}

#[derive(Clone, Default)]
pub struct MemoryBracketStore {
    arena: Arc<Mutex<Arena>>,
}

impl MemoryBracketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a matchup. Sources must already exist, which keeps the graph
    /// acyclic by construction.
    pub fn insert(&self, data: CreateMatchup) -> StoreResult<MatchupRow> {
        let mut arena = self.arena.lock();

        for source in data.winner_sources.iter().chain(&data.loser_sources) {
            if !arena.matchups.contains_key(source) {
                return Err(StoreError::NotFound(*source));
            }
        }
        if let Some(real) = data.potential_for {
            match arena.matchups.get(&real) {
                Some(m) if !m.is_potential() => {}
                Some(_) => {
                    return Err(StoreError::Constraint(format!(
                        "potential_for {real} points at another potential"
                    )))
                }
                None => return Err(StoreError::NotFound(real)),
            }
        }
        if data.team1_id.is_some() && data.team1_id == data.team2_id {
            return Err(StoreError::Constraint(
                "a team cannot occupy both slots".to_string(),
            ));
        }

        arena.next_sequence += 1;
        let now = Utc::now();
        let row = MatchupRow {
            id: Uuid::new_v4(),
            sequence: arena.next_sequence,
            team1_id: data.team1_id,
            team2_id: data.team2_id,
            winner_id: None,
            winner_sources: data.winner_sources,
            loser_sources: data.loser_sources,
            potential_for: data.potential_for,
            invalid: false,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        arena.matchups.insert(row.id, row.clone());

        Ok(row)
    }

    /// Record the result of a played matchup.
    pub fn record_winner(&self, id: Uuid, winner_id: Uuid) -> StoreResult<MatchupRow> {
        let mut arena = self.arena.lock();
        let matchup = arena
            .matchups
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        if matchup.is_potential() || matchup.winner_id.is_some() || !matchup.contains(winner_id) {
            return Err(StoreError::Constraint(format!(
                "team {winner_id} cannot be recorded as winner of matchup {id}"
            )));
        }
        if matchup.open_slot().is_some() {
            return Err(StoreError::Constraint(format!(
                "matchup {id} is missing a team"
            )));
        }

        matchup.winner_id = Some(winner_id);
        matchup.version += 1;
        matchup.updated_at = Utc::now();

        Ok(matchup.clone())
    }

    pub fn get(&self, id: Uuid) -> Option<MatchupRow> {
        self.arena.lock().matchups.get(&id).cloned()
    }

    /// Every potential for a matchup, invalidated ones included.
    pub fn potentials(&self, matchup_id: Uuid) -> Vec<MatchupRow> {
        let arena = self.arena.lock();
        sorted(
            arena
                .matchups
                .values()
                .filter(|m| m.potential_for == Some(matchup_id)),
        )
    }

    pub fn snapshot(&self) -> Vec<MatchupRow> {
        let arena = self.arena.lock();
        sorted(arena.matchups.values())
    }
}

#[async_trait]
impl BracketStore for MemoryBracketStore {
    async fn begin(&self) -> StoreResult<Box<dyn BracketTx>> {
        Ok(Box::new(MemoryBracketTx {
            arena: Arc::clone(&self.arena),
            writes: HashMap::new(),
            read_versions: HashMap::new(),
        }))
    }

    async fn matchup(&self, id: Uuid) -> StoreResult<Option<MatchupRow>> {
        Ok(self.get(id))
    }

    async fn live_potentials(&self, matchup_id: Uuid) -> StoreResult<Vec<MatchupRow>> {
        Ok(self
            .potentials(matchup_id)
            .into_iter()
            .filter(|m| !m.invalid)
            .collect())
    }
}

pub struct MemoryBracketTx {
    arena: Arc<Mutex<Arena>>,
    writes: HashMap<Uuid, MatchupRow>,
    read_versions: HashMap<Uuid, i32>,
}

impl MemoryBracketTx {
    /// Rows matching `filter` as seen by this transaction: committed state
    /// overlaid with this transaction's own writes.
    fn select(&mut self, filter: impl Fn(&MatchupRow) -> bool) -> Vec<MatchupRow> {
        let arena = self.arena.lock();
        let mut rows = Vec::new();

        for committed in arena.matchups.values() {
            let row = self.writes.get(&committed.id).unwrap_or(committed);
            if filter(row) {
                self.read_versions
                    .entry(committed.id)
                    .or_insert(committed.version);
                rows.push(row.clone());
            }
        }
        rows.sort_by_key(|m| m.sequence);

        rows
    }
}

#[async_trait]
impl BracketTx for MemoryBracketTx {
    async fn lock_matchup(&mut self, id: Uuid) -> StoreResult<Option<MatchupRow>> {
        Ok(self.select(|m| m.id == id).pop())
    }

    async fn next_matchups(&mut self, id: Uuid) -> StoreResult<Vec<MatchupRow>> {
        Ok(self.select(|m| {
            !m.is_potential() && (m.winner_sources.contains(&id) || m.loser_sources.contains(&id))
        }))
    }

    async fn potentials_for(&mut self, id: Uuid) -> StoreResult<Vec<MatchupRow>> {
        Ok(self.select(|m| m.potential_for == Some(id)))
    }

    async fn save_matchup(&mut self, matchup: &mut MatchupRow) -> StoreResult<()> {
        let current = match self.writes.get(&matchup.id) {
            Some(pending) => pending.version,
            None => {
                let arena = self.arena.lock();
                let committed = arena
                    .matchups
                    .get(&matchup.id)
                    .ok_or(StoreError::NotFound(matchup.id))?;
                self.read_versions
                    .entry(matchup.id)
                    .or_insert(committed.version);
                committed.version
            }
        };
        if current != matchup.version {
            return Err(StoreError::Conflict(matchup.id));
        }
        if matchup.team1_id.is_some() && matchup.team1_id == matchup.team2_id {
            return Err(StoreError::Constraint(format!(
                "matchup {} would hold the same team twice",
                matchup.id
            )));
        }

        let previous_invalid = self
            .writes
            .get(&matchup.id)
            .map(|m| m.invalid)
            .unwrap_or(false);
        matchup.invalid |= previous_invalid;
        matchup.version += 1;
        matchup.updated_at = Utc::now();
        self.writes.insert(matchup.id, matchup.clone());

        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryBracketTx {
            arena,
            writes,
            read_versions,
        } = *self;
        let mut arena = arena.lock();

        for (id, read_version) in &read_versions {
            let committed = arena.matchups.get(id).ok_or(StoreError::NotFound(*id))?;
            if committed.version != *read_version {
                debug!(
                    matchup_id = %id,
                    read_version,
                    committed = committed.version,
                    "Commit lost the race"
                );
                return Err(StoreError::Conflict(*id));
            }
        }
        for (id, mut row) in writes {
            let committed_invalid = arena.matchups.get(&id).map(|m| m.invalid).unwrap_or(false);
            row.invalid |= committed_invalid;
            arena.matchups.insert(id, row);
        }

        Ok(())
    }
}

use infra::models::Slot;
use infra::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProgressionError {
    #[error("matchup {0} not found")]
    NotFound(Uuid),

    #[error("matchup {matchup_id} {reason}")]
    IncompletePrerequisite {
        matchup_id: Uuid,
        reason: &'static str,
    },

    #[error("matchup {0} already has a winner assigned to it")]
    AlreadyDecided(Uuid),

    #[error("matchup {0} already has 2 teams assigned to it")]
    SlotsFull(Uuid),

    #[error("team {team_id} is already assigned to matchup {matchup_id} or one of its potentials")]
    DuplicateAssignment { matchup_id: Uuid, team_id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProgressionError {
    /// Precondition failures leave the bracket untouched and may succeed once
    /// the decided matchup is complete.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProgressionError::NotFound(_) | ProgressionError::IncompletePrerequisite { .. }
        )
    }
}

/// One team placed into one slot of a dependent matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub matchup_id: Uuid,
    pub team_id: Uuid,
    pub slot: Slot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialChanges {
    pub invalidated: usize,
    pub filled: usize,
}

impl PotentialChanges {
    pub fn merge(&mut self, other: PotentialChanges) {
        self.invalidated += other.invalidated;
        self.filled += other.filled;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOutcome {
    pub matchup_id: Uuid,
    pub winner_id: Uuid,
    pub loser_id: Uuid,
    pub assignments: Vec<SlotAssignment>,
    pub potentials: PotentialChanges,
}

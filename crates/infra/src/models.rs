use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which of the two team slots of a matchup a team occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Team1,
    Team2,
}

/// A bracket node. Real matchups and their speculative shadows ("potentials")
/// share this shape; a potential carries the id of the real matchup it
/// guesses about in `potential_for`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MatchupRow {
    pub id: Uuid,
    pub sequence: i64,
    pub team1_id: Option<Uuid>,
    pub team2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub winner_sources: Vec<Uuid>,
    pub loser_sources: Vec<Uuid>,
    pub potential_for: Option<Uuid>,
    pub invalid: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchupRow {
    pub fn is_potential(&self) -> bool {
        self.potential_for.is_some()
    }

    pub fn contains(&self, team_id: Uuid) -> bool {
        self.team1_id == Some(team_id) || self.team2_id == Some(team_id)
    }

    /// First empty slot in fixed team1 -> team2 order.
    pub fn open_slot(&self) -> Option<Slot> {
        if self.team1_id.is_none() {
            Some(Slot::Team1)
        } else if self.team2_id.is_none() {
            Some(Slot::Team2)
        } else {
            None
        }
    }

    /// Put `team_id` into the first open slot and report which one was used.
    pub fn fill_open_slot(&mut self, team_id: Uuid) -> Option<Slot> {
        let slot = self.open_slot()?;
        match slot {
            Slot::Team1 => self.team1_id = Some(team_id),
            Slot::Team2 => self.team2_id = Some(team_id),
        }
        Some(slot)
    }

    /// Winner and loser of a decided matchup, `None` until both teams and a
    /// winner drawn from them are recorded.
    pub fn outcome(&self) -> Option<(Uuid, Uuid)> {
        let (team1, team2, winner) = (self.team1_id?, self.team2_id?, self.winner_id?);
        if winner == team1 {
            Some((team1, team2))
        } else if winner == team2 {
            Some((team2, team1))
        } else {
            None
        }
    }

    pub fn feeds_winner_into(&self, next: &MatchupRow) -> bool {
        next.winner_sources.contains(&self.id)
    }

    pub fn feeds_loser_into(&self, next: &MatchupRow) -> bool {
        next.loser_sources.contains(&self.id)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub captain_id: Uuid,
    pub timezone_offset: i32,
    pub avatar_url: Option<String>,
    pub strength: f64,
    pub points_proxy: f64,
    pub rank_proxy: f64,
    pub seed: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserStatisticsRow {
    pub user_id: Uuid,
    pub mode_id: i32,
    pub strength: f64,
    pub points: f64,
    pub rank: f64,
    pub updated_at: DateTime<Utc>,
}

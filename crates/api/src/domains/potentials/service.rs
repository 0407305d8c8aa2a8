//! Maintenance of the speculative pairing graph.
//!
//! A potential guesses who will meet in a real matchup before its sources are
//! decided. Confirmed assignments prune the guesses they contradict and seed
//! the guesses one tier further downstream.

use infra::models::{MatchupRow, Slot};
use infra::store::BracketTx;
use tracing::debug;
use uuid::Uuid;

use crate::domains::progression::ProgressionError;

/// Mark every potential of `matchup_id` that does not hold `team_id` as
/// invalid. Returns how many records were newly invalidated.
pub async fn invalidate(
    tx: &mut dyn BracketTx,
    matchup_id: Uuid,
    team_id: Uuid,
) -> Result<usize, ProgressionError> {
    let mut invalidated = 0;

    for mut potential in tx.potentials_for(matchup_id).await? {
        if potential.invalid || potential.contains(team_id) {
            continue;
        }
        potential.invalid = true;
        tx.save_matchup(&mut potential).await?;
        invalidated += 1;
    }

    debug!(%matchup_id, %team_id, invalidated, "Invalidated potentials");
    Ok(invalidated)
}

/// Place `team_id`, now sitting in `slot` of `matchup_id`, into the potentials
/// of every matchup that `matchup_id` feeds.
///
/// Live potentials of a downstream matchup are assumed to be generated in two
/// halves, the first covering the team1 occupant of `matchup_id` and the
/// second its team2 occupant. Returns how many records were filled.
pub async fn propagate(
    tx: &mut dyn BracketTx,
    matchup_id: Uuid,
    team_id: Uuid,
    slot: Slot,
) -> Result<usize, ProgressionError> {
    let mut filled = 0;

    for next in tx.next_matchups(matchup_id).await? {
        let live: Vec<MatchupRow> = tx
            .potentials_for(next.id)
            .await?
            .into_iter()
            .filter(|p| !p.invalid)
            .collect();

        if live.iter().any(|p| p.contains(team_id)) {
            return Err(ProgressionError::DuplicateAssignment {
                matchup_id: next.id,
                team_id,
            });
        }

        let half = live.len().div_ceil(2);
        let (first, second) = live.split_at(half);
        let branch = match slot {
            Slot::Team1 => first,
            Slot::Team2 => second,
        };

        for potential in branch.iter().filter(|p| p.open_slot().is_some()).take(half) {
            let mut potential = potential.clone();
            potential.fill_open_slot(team_id);
            tx.save_matchup(&mut potential).await?;
            filled += 1;
        }

        debug!(
            %matchup_id,
            next_matchup_id = %next.id,
            %team_id,
            live = live.len(),
            "Propagated team into potentials"
        );
    }

    Ok(filled)
}

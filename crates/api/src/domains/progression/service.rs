use infra::store::{BracketStore, BracketTx};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::{AdvanceOutcome, PotentialChanges, ProgressionError, SlotAssignment};
use crate::domains::potentials;
use crate::services::Notifier;

/// Move the winner and loser of a decided matchup into every matchup that
/// lists it as a source.
///
/// All slot assignments and potential updates happen in one transaction. On
/// any failure nothing is kept, the notifier is told, and the error is
/// returned to the caller. There is no retry.
pub async fn advance(
    store: &dyn BracketStore,
    notifier: &dyn Notifier,
    matchup_id: Uuid,
) -> Result<AdvanceOutcome, ProgressionError> {
    match run_advance(store, matchup_id).await {
        Ok(outcome) => {
            info!(
                %matchup_id,
                winner_id = %outcome.winner_id,
                loser_id = %outcome.loser_id,
                assignments = outcome.assignments.len(),
                potentials_invalidated = outcome.potentials.invalidated,
                potentials_filled = outcome.potentials.filled,
                "Advanced matchup"
            );
            Ok(outcome)
        }
        Err(e) => {
            if e.is_precondition() {
                warn!(%matchup_id, error = %e, "Matchup cannot be advanced yet");
            } else {
                error!(%matchup_id, error = %e, "Failed to advance matchup");
            }
            notifier.notify(&failure_message(matchup_id, &e)).await;
            Err(e)
        }
    }
}

async fn run_advance(
    store: &dyn BracketStore,
    matchup_id: Uuid,
) -> Result<AdvanceOutcome, ProgressionError> {
    let mut tx = store.begin().await?;

    let decided = tx
        .lock_matchup(matchup_id)
        .await?
        .filter(|m| !m.is_potential())
        .ok_or(ProgressionError::NotFound(matchup_id))?;

    if decided.winner_id.is_none() {
        return Err(ProgressionError::IncompletePrerequisite {
            matchup_id,
            reason: "has no winner",
        });
    }
    if decided.open_slot().is_some() {
        return Err(ProgressionError::IncompletePrerequisite {
            matchup_id,
            reason: "has teams missing",
        });
    }
    let (winner_id, loser_id) = decided
        .outcome()
        .ok_or(ProgressionError::IncompletePrerequisite {
            matchup_id,
            reason: "has a winner that is not one of its teams",
        })?;

    let mut assignments = Vec::new();
    let mut changes = PotentialChanges::default();

    for next in tx.next_matchups(matchup_id).await? {
        // the loser takes the first slot when one matchup is fed both teams
        if decided.feeds_loser_into(&next) {
            let (assignment, delta) = assign_slot(tx.as_mut(), next.id, loser_id).await?;
            assignments.push(assignment);
            changes.merge(delta);
        }
        if decided.feeds_winner_into(&next) {
            let (assignment, delta) = assign_slot(tx.as_mut(), next.id, winner_id).await?;
            assignments.push(assignment);
            changes.merge(delta);
        }
    }

    tx.commit().await?;

    Ok(AdvanceOutcome {
        matchup_id,
        winner_id,
        loser_id,
        assignments,
        potentials: changes,
    })
}

/// Put `team_id` into the first open slot of `matchup_id`, then prune and
/// extend the potentials around it.
pub async fn assign_slot(
    tx: &mut dyn BracketTx,
    matchup_id: Uuid,
    team_id: Uuid,
) -> Result<(SlotAssignment, PotentialChanges), ProgressionError> {
    let mut matchup = tx
        .lock_matchup(matchup_id)
        .await?
        .ok_or(ProgressionError::NotFound(matchup_id))?;

    if matchup.winner_id.is_some() {
        return Err(ProgressionError::AlreadyDecided(matchup_id));
    }
    if matchup.open_slot().is_none() {
        return Err(ProgressionError::SlotsFull(matchup_id));
    }
    if matchup.contains(team_id) {
        return Err(ProgressionError::DuplicateAssignment {
            matchup_id,
            team_id,
        });
    }

    let slot = matchup
        .fill_open_slot(team_id)
        .ok_or(ProgressionError::SlotsFull(matchup_id))?;
    tx.save_matchup(&mut matchup).await?;

    let invalidated = potentials::invalidate(tx, matchup_id, team_id).await?;
    let filled = potentials::propagate(tx, matchup_id, team_id, slot).await?;

    Ok((
        SlotAssignment {
            matchup_id,
            team_id,
            slot,
        },
        PotentialChanges {
            invalidated,
            filled,
        },
    ))
}

fn failure_message(matchup_id: Uuid, error: &ProgressionError) -> String {
    match error {
        ProgressionError::NotFound(id) if *id == matchup_id => format!(
            "Failed to find matchup ID `{matchup_id}` to assign teams to their next matchup"
        ),
        ProgressionError::IncompletePrerequisite { reason, .. } => format!(
            "Matchup ID `{matchup_id}` {reason} to assign teams to their next matchup"
        ),
        other => format!(
            "Failed to assign teams to their next matchups from matchup ID `{matchup_id}`\n```{other}```"
        ),
    }
}

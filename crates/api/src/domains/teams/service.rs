use futures_util::future::try_join_all;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use infra::models::TeamRow;
use infra::repos::{teams, CompositeStats, TeamWithMembers};

use super::modes::ModeTable;
use super::seeding::{rank_teams, MatchupScore, SeedEntry};
use super::stats::StatisticsProvider;

#[derive(Debug, Error)]
pub enum TeamServiceError {
    #[error("team {0} not found")]
    TeamNotFound(Uuid),

    #[error("user {user_id} is not a member of team {team_id}")]
    NotMember { team_id: Uuid, user_id: Uuid },

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOutcome {
    Updated,
    /// The mode has no individual statistics; the team was not touched.
    NotApplicable,
    /// A member refresh failed and the composite fields were zeroed.
    Failed,
}

/// Average the members' statistics for `mode_id` into the team's composite
/// fields. Failures are absorbed: the fields are zeroed and `Failed` returned.
pub async fn recompute_composite(
    team: &mut TeamWithMembers,
    mode_id: i32,
    modes: &ModeTable,
    provider: &dyn StatisticsProvider,
) -> CompositeOutcome {
    if !modes.has_individual_statistics(mode_id) {
        return CompositeOutcome::NotApplicable;
    }

    let refreshes = team
        .members
        .iter()
        .map(|&user_id| provider.refresh(user_id, mode_id));

    match try_join_all(refreshes).await {
        Ok(stats) => {
            let divisor = stats.len().max(1) as f64;
            let sum = stats.iter().fold((0.0, 0.0, 0.0), |acc, s| {
                (acc.0 + s.strength, acc.1 + s.points, acc.2 + s.rank)
            });
            apply(
                &mut team.team,
                CompositeStats {
                    strength: sum.0 / divisor,
                    points_proxy: sum.1 / divisor,
                    rank_proxy: sum.2 / divisor,
                },
            );
            CompositeOutcome::Updated
        }
        Err(e) => {
            warn!(
                team_id = %team.team.id,
                mode_id,
                error = %e,
                "Failed to refresh member statistics, zeroing team composite"
            );
            apply(
                &mut team.team,
                CompositeStats {
                    strength: 0.0,
                    points_proxy: 0.0,
                    rank_proxy: 0.0,
                },
            );
            CompositeOutcome::Failed
        }
    }
}

fn apply(team: &mut TeamRow, stats: CompositeStats) {
    team.strength = stats.strength;
    team.points_proxy = stats.points_proxy;
    team.rank_proxy = stats.rank_proxy;
}

fn composite_of(team: &TeamRow) -> CompositeStats {
    CompositeStats {
        strength: team.strength,
        points_proxy: team.points_proxy,
        rank_proxy: team.rank_proxy,
    }
}

/// Recompute and persist a team's composite statistics.
pub async fn refresh_team_stats(
    pool: &PgPool,
    modes: &ModeTable,
    provider: &dyn StatisticsProvider,
    team_id: Uuid,
    mode_id: i32,
) -> Result<(TeamRow, CompositeOutcome), TeamServiceError> {
    let mut tx = pool.begin().await?;

    let team = teams::get_by_id_for_update(&mut *tx, team_id)
        .await?
        .ok_or(TeamServiceError::TeamNotFound(team_id))?;
    let members = teams::list_member_ids(&mut *tx, team_id).await?;

    let mut team = TeamWithMembers { team, members };
    let outcome = recompute_composite(&mut team, mode_id, modes, provider).await;
    if outcome == CompositeOutcome::NotApplicable {
        return Ok((team.team, outcome));
    }

    let row = teams::update_composite(&mut *tx, team_id, composite_of(&team.team)).await?;
    tx.commit().await?;
    info!(%team_id, mode_id, ?outcome, "Refreshed team statistics");

    Ok((row, outcome))
}

/// Remove a member and recompute the team's composite statistics from the
/// remaining roster.
pub async fn remove_member(
    pool: &PgPool,
    modes: &ModeTable,
    provider: &dyn StatisticsProvider,
    team_id: Uuid,
    user_id: Uuid,
    mode_id: i32,
) -> Result<(TeamRow, CompositeOutcome), TeamServiceError> {
    let mut tx = pool.begin().await?;

    let team = teams::get_by_id_for_update(&mut *tx, team_id)
        .await?
        .ok_or(TeamServiceError::TeamNotFound(team_id))?;

    if !teams::remove_member(&mut *tx, team_id, user_id).await? {
        return Err(TeamServiceError::NotMember { team_id, user_id });
    }
    let members = teams::list_member_ids(&mut *tx, team_id).await?;

    let mut team = TeamWithMembers { team, members };
    let outcome = recompute_composite(&mut team, mode_id, modes, provider).await;
    let row = if outcome == CompositeOutcome::NotApplicable {
        team.team
    } else {
        teams::update_composite(&mut *tx, team_id, composite_of(&team.team)).await?
    };

    tx.commit().await?;
    info!(%team_id, %user_id, ?outcome, "Removed team member");

    Ok((row, outcome))
}

/// Seed every team registered in a tournament from qualifier scores. Teams
/// without scores keep their previous seed.
pub async fn seed_teams(
    pool: &PgPool,
    tournament_id: Uuid,
    scores: &[MatchupScore],
    grouping_size: usize,
) -> Result<Vec<SeedEntry>, TeamServiceError> {
    let ranking = rank_teams(scores, grouping_size);

    let mut tx = pool.begin().await?;
    let registered = teams::list_by_tournament(&mut *tx, tournament_id).await?;

    let mut seeded = Vec::new();
    for team in registered {
        let Some(entry) = ranking.iter().find(|e| e.team_id == team.id) else {
            continue;
        };
        teams::update_seed(&mut *tx, team.id, Some(entry.placement)).await?;
        seeded.push(*entry);
    }

    tx.commit().await?;
    info!(%tournament_id, seeded = seeded.len(), "Seeded tournament teams");

    seeded.sort_by_key(|e| e.placement);
    Ok(seeded)
}

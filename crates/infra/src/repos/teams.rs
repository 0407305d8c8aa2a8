use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::TeamRow;

#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub abbreviation: String,
    pub captain_id: Uuid,
    pub timezone_offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeStats {
    pub strength: f64,
    pub points_proxy: f64,
    pub rank_proxy: f64,
}

#[derive(Debug, Clone)]
pub struct TeamWithMembers {
    pub team: TeamRow,
    pub members: Vec<Uuid>,
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateTeam) -> SqlxResult<TeamRow> {
    sqlx::query_as::<_, TeamRow>(
        r#"
        INSERT INTO teams (name, abbreviation, captain_id, timezone_offset)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, abbreviation, captain_id, timezone_offset, avatar_url,
                  strength, points_proxy, rank_proxy, seed, created_at, updated_at
        "#,
    )
    .bind(data.name)
    .bind(data.abbreviation)
    .bind(data.captain_id)
    .bind(data.timezone_offset)
    .fetch_one(executor)
    .await
}

pub async fn list_member_ids<'e>(
    executor: impl PgExecutor<'e>,
    team_id: Uuid,
) -> SqlxResult<Vec<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT user_id
        FROM team_members
        WHERE team_id = $1
        ORDER BY joined_at ASC, user_id ASC
        "#,
    )
    .bind(team_id)
    .fetch_all(executor)
    .await
}

/// Locks the team row so roster changes and composite writes serialize.
pub async fn get_by_id_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(
        r#"
        SELECT id, name, abbreviation, captain_id, timezone_offset, avatar_url,
               strength, points_proxy, rank_proxy, seed, created_at, updated_at
        FROM teams
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn add_member<'e>(
    executor: impl PgExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn remove_member<'e>(
    executor: impl PgExecutor<'e>,
    team_id: Uuid,
    user_id: Uuid,
) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
        .bind(team_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_composite<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    stats: CompositeStats,
) -> SqlxResult<TeamRow> {
    sqlx::query_as::<_, TeamRow>(
        r#"
        UPDATE teams
        SET strength = $2, points_proxy = $3, rank_proxy = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, abbreviation, captain_id, timezone_offset, avatar_url,
                  strength, points_proxy, rank_proxy, seed, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(stats.strength)
    .bind(stats.points_proxy)
    .bind(stats.rank_proxy)
    .fetch_one(executor)
    .await
}

pub async fn update_seed<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    seed: Option<i32>,
) -> SqlxResult<bool> {
    let result = sqlx::query("UPDATE teams SET seed = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(seed)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn register_for_tournament<'e>(
    executor: impl PgExecutor<'e>,
    tournament_id: Uuid,
    team_id: Uuid,
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        INSERT INTO tournament_teams (tournament_id, team_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(tournament_id)
    .bind(team_id)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn list_by_tournament<'e>(
    executor: impl PgExecutor<'e>,
    tournament_id: Uuid,
) -> SqlxResult<Vec<TeamRow>> {
    sqlx::query_as::<_, TeamRow>(
        r#"
        SELECT t.id, t.name, t.abbreviation, t.captain_id, t.timezone_offset, t.avatar_url,
               t.strength, t.points_proxy, t.rank_proxy, t.seed, t.created_at, t.updated_at
        FROM teams t
        JOIN tournament_teams tt ON tt.team_id = t.id
        WHERE tt.tournament_id = $1
        ORDER BY t.name ASC
        "#,
    )
    .bind(tournament_id)
    .fetch_all(executor)
    .await
}

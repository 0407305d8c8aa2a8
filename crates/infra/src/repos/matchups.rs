use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::MatchupRow;

// Source edges are aggregated into arrays so a matchup loads in one row.
const SELECT_MATCHUP: &str = r#"
    SELECT m.id, m.sequence, m.team1_id, m.team2_id, m.winner_id,
           ARRAY(
               SELECT s.source_id FROM matchup_sources s
               WHERE s.matchup_id = m.id AND s.kind = 'winner'
               ORDER BY s.position, s.source_id
           ) AS winner_sources,
           ARRAY(
               SELECT s.source_id FROM matchup_sources s
               WHERE s.matchup_id = m.id AND s.kind = 'loser'
               ORDER BY s.position, s.source_id
           ) AS loser_sources,
           m.potential_for, m.invalid, m.version, m.created_at, m.updated_at
    FROM matchups m
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Winner,
    Loser,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Winner => "winner",
            SourceKind::Loser => "loser",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateMatchup {
    pub team1_id: Option<Uuid>,
    pub team2_id: Option<Uuid>,
    pub winner_sources: Vec<Uuid>,
    pub loser_sources: Vec<Uuid>,
    pub potential_for: Option<Uuid>,
}

/// Insert a matchup row only. Source edges are written with [`add_source`];
/// use [`create`] for both inside one transaction.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    data: &CreateMatchup,
) -> SqlxResult<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO matchups (team1_id, team2_id, potential_for)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(data.team1_id)
    .bind(data.team2_id)
    .bind(data.potential_for)
    .fetch_one(executor)
    .await
}

pub async fn add_source<'e>(
    executor: impl PgExecutor<'e>,
    matchup_id: Uuid,
    source_id: Uuid,
    kind: SourceKind,
    position: i32,
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        INSERT INTO matchup_sources (matchup_id, source_id, kind, position)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(matchup_id)
    .bind(source_id)
    .bind(kind.as_str())
    .bind(position)
    .execute(executor)
    .await?;

    Ok(())
}

/// Create a matchup together with its source edges.
pub async fn create(pool: &sqlx::PgPool, data: CreateMatchup) -> SqlxResult<MatchupRow> {
    let mut tx = pool.begin().await?;

    let id = insert(&mut *tx, &data).await?;
    for (position, source_id) in data.winner_sources.iter().enumerate() {
        add_source(&mut *tx, id, *source_id, SourceKind::Winner, position as i32).await?;
    }
    for (position, source_id) in data.loser_sources.iter().enumerate() {
        add_source(&mut *tx, id, *source_id, SourceKind::Loser, position as i32).await?;
    }

    let row = get_by_id(&mut *tx, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    Ok(row)
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<MatchupRow>> {
    let query = format!("{SELECT_MATCHUP} WHERE m.id = $1");

    sqlx::query_as::<_, MatchupRow>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Same as [`get_by_id`] but takes a row lock held until the enclosing
/// transaction ends.
pub async fn get_by_id_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<MatchupRow>> {
    let query = format!("{SELECT_MATCHUP} WHERE m.id = $1 FOR UPDATE OF m");

    sqlx::query_as::<_, MatchupRow>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Real matchups that take the winner or loser of `source_id`, in generation order.
pub async fn list_next<'e>(
    executor: impl PgExecutor<'e>,
    source_id: Uuid,
) -> SqlxResult<Vec<MatchupRow>> {
    let query = format!(
        r#"{SELECT_MATCHUP}
        WHERE m.potential_for IS NULL
          AND EXISTS (
              SELECT 1 FROM matchup_sources s
              WHERE s.matchup_id = m.id AND s.source_id = $1
          )
        ORDER BY m.sequence ASC
        "#
    );

    sqlx::query_as::<_, MatchupRow>(&query)
        .bind(source_id)
        .fetch_all(executor)
        .await
}

/// Every potential (invalidated ones included) for a matchup, in generation
/// order, locked for the enclosing transaction.
pub async fn list_potentials_for_update<'e>(
    executor: impl PgExecutor<'e>,
    matchup_id: Uuid,
) -> SqlxResult<Vec<MatchupRow>> {
    let query = format!(
        r#"{SELECT_MATCHUP}
        WHERE m.potential_for = $1
        ORDER BY m.sequence ASC
        FOR UPDATE OF m
        "#
    );

    sqlx::query_as::<_, MatchupRow>(&query)
        .bind(matchup_id)
        .fetch_all(executor)
        .await
}

pub async fn list_live_potentials<'e>(
    executor: impl PgExecutor<'e>,
    matchup_id: Uuid,
) -> SqlxResult<Vec<MatchupRow>> {
    let query = format!(
        r#"{SELECT_MATCHUP}
        WHERE m.potential_for = $1 AND m.invalid = false
        ORDER BY m.sequence ASC
        "#
    );

    sqlx::query_as::<_, MatchupRow>(&query)
        .bind(matchup_id)
        .fetch_all(executor)
        .await
}

/// Write slot, winner and invalid state guarded by the row version.
/// Returns the new version, or `None` when the row changed underneath us.
pub async fn update_state<'e>(
    executor: impl PgExecutor<'e>,
    matchup: &MatchupRow,
) -> SqlxResult<Option<i32>> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE matchups
        SET team1_id = $3,
            team2_id = $4,
            winner_id = $5,
            invalid = invalid OR $6,
            version = version + 1,
            updated_at = NOW()
        WHERE id = $1 AND version = $2
        RETURNING version
        "#,
    )
    .bind(matchup.id)
    .bind(matchup.version)
    .bind(matchup.team1_id)
    .bind(matchup.team2_id)
    .bind(matchup.winner_id)
    .bind(matchup.invalid)
    .fetch_optional(executor)
    .await
}

/// Record the result of a played matchup.
pub async fn record_winner<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    winner_id: Uuid,
) -> SqlxResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE matchups
        SET winner_id = $2, version = version + 1, updated_at = NOW()
        WHERE id = $1
          AND winner_id IS NULL
          AND potential_for IS NULL
          AND (team1_id = $2 OR team2_id = $2)
        "#,
    )
    .bind(id)
    .bind(winner_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use infra::models::TeamRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::teams::{self, CompositeOutcome};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ModeQuery {
    pub mode: Option<i32>,
}

#[derive(Serialize)]
pub struct TeamStatsResponse {
    pub team: TeamRow,
    pub outcome: CompositeOutcome,
}

pub async fn refresh_stats(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    Query(query): Query<ModeQuery>,
) -> Result<Json<TeamStatsResponse>, AppError> {
    let mode_id = query.mode.unwrap_or(state.config().default_mode_id);
    let (team, outcome) = teams::refresh_team_stats(
        &state.db,
        &state.config().modes,
        state.stats(),
        team_id,
        mode_id,
    )
    .await?;

    Ok(Json(TeamStatsResponse { team, outcome }))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ModeQuery>,
) -> Result<Json<TeamStatsResponse>, AppError> {
    let mode_id = query.mode.unwrap_or(state.config().default_mode_id);
    let (team, outcome) = teams::remove_member(
        &state.db,
        &state.config().modes,
        state.stats(),
        team_id,
        user_id,
        mode_id,
    )
    .await?;

    Ok(Json(TeamStatsResponse { team, outcome }))
}

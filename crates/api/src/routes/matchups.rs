use axum::{
    extract::{Path, State},
    Json,
};
use infra::models::MatchupRow;
use infra::store::StoreError;
use uuid::Uuid;

use crate::domains::progression::{self, AdvanceOutcome};
use crate::error::AppError;
use crate::state::AppState;

pub async fn advance(
    State(state): State<AppState>,
    Path(matchup_id): Path<Uuid>,
) -> Result<Json<AdvanceOutcome>, AppError> {
    let outcome = progression::advance(state.store(), state.notifier(), matchup_id).await?;
    Ok(Json(outcome))
}

pub async fn live_potentials(
    State(state): State<AppState>,
    Path(matchup_id): Path<Uuid>,
) -> Result<Json<Vec<MatchupRow>>, AppError> {
    match state.store().matchup(matchup_id).await? {
        Some(matchup) if !matchup.is_potential() => {}
        _ => return Err(StoreError::NotFound(matchup_id).into()),
    }

    let potentials = state.store().live_potentials(matchup_id).await?;
    Ok(Json(potentials))
}

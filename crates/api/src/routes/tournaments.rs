use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domains::teams::{self, MatchupScore, SeedEntry};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRequest {
    pub scores: Vec<MatchupScore>,
    pub grouping_size: Option<usize>,
}

pub async fn seed(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    Json(body): Json<SeedRequest>,
) -> Result<Json<Vec<SeedEntry>>, AppError> {
    let grouping_size = body
        .grouping_size
        .unwrap_or(state.config().seed_grouping_size);
    if grouping_size == 0 {
        return Err(AppError::BadRequest(
            "groupingSize must be at least 1".to_string(),
        ));
    }

    let seeds = teams::seed_teams(&state.db, tournament_id, &body.scores, grouping_size).await?;
    Ok(Json(seeds))
}

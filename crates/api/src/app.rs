use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::routes::{matchups, teams, tournaments};
use crate::state::AppState;

/// Build the Axum router with the health probe and the bracket trigger routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Simple liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/matchups/{id}/advance", post(matchups::advance))
        .route("/matchups/{id}/potentials", get(matchups::live_potentials))
        .route("/teams/{id}/stats", post(teams::refresh_stats))
        .route(
            "/teams/{team_id}/members/{user_id}",
            delete(teams::remove_member),
        )
        .route("/tournaments/{id}/seeds", post(tournaments::seed))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
}

/// Liveness + quick DB probe.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok("ok")
}

use crate::auth::AuthenticatedPlayer;
use crate::error::AppError;
use crate::models::{MatchHistoryResponse, ProfileResponse};
use crate::state::AppState;
use axum::{extract::State, Json};

/// GET /v1/profile — balance and win/loss record for the caller
pub async fn get_profile(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
) -> Result<Json<ProfileResponse>, AppError> {
    let id = player.profile.player_id;
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:profile_query", id), 60, 1.0)?;

    state.ledger.ensure_account(id, state.starting_coins);
    Ok(Json(ProfileResponse::new(
        id,
        player.profile.username,
        state.ledger.balance(id),
        state.ledger.stats(id),
    )))
}

/// GET /v1/matches — the caller's settled matches, oldest first
pub async fn get_matches(
    State(state): State<AppState>,
    player: AuthenticatedPlayer,
) -> Result<Json<MatchHistoryResponse>, AppError> {
    let id = player.profile.player_id;
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:history_query", id), 60, 1.0)?;

    Ok(Json(MatchHistoryResponse {
        matches: state.ledger.records_for(id),
    }))
}

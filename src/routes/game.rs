use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::game::{GuessRequest, MatchStateDto, TeamRequest},
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Routes exposing the match to players.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/match", get(get_match))
        .route("/match/guess", post(submit_guess))
        .route("/match/pass", post(submit_pass))
        .route("/match/next-letter", post(next_letter))
}

/// Current match snapshot.
#[utoipa::path(
    get,
    path = "/match",
    tag = "match",
    responses(
        (status = 200, description = "Current match state", body = MatchStateDto)
    )
)]
pub async fn get_match(State(state): State<SharedState>) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::current_match(&state).await?;
    Ok(Json(snapshot))
}

/// Answer the current slot of the team holding the turn.
///
/// Out-of-turn or paused submissions are ignored and simply return the
/// unchanged state.
#[utoipa::path(
    post,
    path = "/match/guess",
    tag = "match",
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Guess processed", body = MatchStateDto),
        (status = 400, description = "Invalid guess payload")
    )
)]
pub async fn submit_guess(
    State(state): State<SharedState>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::submit_guess(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Pass on the current slot.
#[utoipa::path(
    post,
    path = "/match/pass",
    tag = "match",
    request_body = TeamRequest,
    responses(
        (status = 200, description = "Pass processed", body = MatchStateDto)
    )
)]
pub async fn submit_pass(
    State(state): State<SharedState>,
    Json(payload): Json<TeamRequest>,
) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::submit_pass(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Move the team pointer back to its first unresolved slot.
#[utoipa::path(
    post,
    path = "/match/next-letter",
    tag = "match",
    request_body = TeamRequest,
    responses(
        (status = 200, description = "Pointer resynchronized", body = MatchStateDto)
    )
)]
pub async fn next_letter(
    State(state): State<SharedState>,
    Json(payload): Json<TeamRequest>,
) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::next_letter(&state, payload).await?;
    Ok(Json(snapshot))
}

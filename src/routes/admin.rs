use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::{admin::CreateMatchRequest, game::MatchStateDto},
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Administrator endpoints driving the match lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/match", post(create_match))
        .route("/admin/match/pause", post(toggle_pause))
        .route("/admin/match/reset", post(reset_match))
}

/// Start a new match, discarding the current one.
#[utoipa::path(
    post,
    path = "/admin/match",
    tag = "admin",
    request_body = CreateMatchRequest,
    responses(
        (status = 200, description = "Match created", body = MatchStateDto),
        (status = 400, description = "A wheel lacks usable entries")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Json(payload): Json<CreateMatchRequest>,
) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::create_match(&state, payload).await?;
    Ok(Json(snapshot))
}

/// Pause a running match or resume a paused one.
#[utoipa::path(
    post,
    path = "/admin/match/pause",
    tag = "admin",
    responses(
        (status = 200, description = "Pause toggled", body = MatchStateDto)
    )
)]
pub async fn toggle_pause(
    State(state): State<SharedState>,
) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::toggle_pause(&state).await?;
    Ok(Json(snapshot))
}

/// Clear the match and stop both clocks.
#[utoipa::path(
    post,
    path = "/admin/match/reset",
    tag = "admin",
    responses(
        (status = 200, description = "Match cleared", body = MatchStateDto)
    )
)]
pub async fn reset_match(
    State(state): State<SharedState>,
) -> Result<Json<MatchStateDto>, AppError> {
    let snapshot = match_service::reset_match(&state).await?;
    Ok(Json(snapshot))
}

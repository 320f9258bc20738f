use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::{
        ranking::{LeaderboardResponse, PodiumResponse},
        session::SessionSnapshot,
    },
    error::AppError,
    services::public_service,
    state::SharedState,
};

/// Read-only endpoints for polling clients.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/games/{id}/snapshot", get(session_snapshot))
        .route("/games/{id}/leaderboard", get(leaderboard))
        .route("/games/{id}/podium", get(podium))
}

/// Current full snapshot, identical to the streamed one.
#[utoipa::path(
    get,
    path = "/games/{id}/snapshot",
    tag = "public",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Current snapshot", body = SessionSnapshot))
)]
pub async fn session_snapshot(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(public_service::session_snapshot(&state, &game_id).await?))
}

/// Current standings.
#[utoipa::path(
    get,
    path = "/games/{id}/leaderboard",
    tag = "public",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Current standings", body = LeaderboardResponse))
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(public_service::leaderboard(&state, &game_id).await?))
}

/// Final podium, once the session is finished.
#[utoipa::path(
    get,
    path = "/games/{id}/podium",
    tag = "public",
    params(("id" = String, Path, description = "Join code of the game")),
    responses(
        (status = 200, description = "Podium in ceremony order", body = PodiumResponse),
        (status = 409, description = "Session is not finished")
    )
)]
pub async fn podium(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<PodiumResponse>, AppError> {
    Ok(Json(public_service::podium(&state, &game_id).await?))
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        requests::{
            ActionResponse, AdvanceRequest, CreateSessionRequest, KickRequest, MuteRequest,
        },
        session::SessionSnapshot,
    },
    error::AppError,
    services::{moderation_service, session_service},
    state::SharedState,
};

/// Host-only endpoints driving a session's lifecycle and moderating its
/// players. Deployments front these with their own authentication layer;
/// the service itself only knows the host id recorded at session creation.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route(
            "/games/{id}/session",
            post(create_session).delete(close_session),
        )
        .route("/games/{id}/host/start", post(start_game))
        .route("/games/{id}/host/advance", post(advance_question))
        .route("/games/{id}/host/pause", post(pause_game))
        .route("/games/{id}/host/resume", post(resume_game))
        .route("/games/{id}/host/reveal-results", post(reveal_results))
        .route(
            "/games/{id}/host/reveal-leaderboard",
            post(reveal_leaderboard),
        )
        .route("/games/{id}/host/end", post(end_game))
        .route("/games/{id}/host/restart", post(restart_game))
        .route("/games/{id}/host/full-restart", post(full_restart_game))
        .route("/games/{id}/host/players/{player_id}/kick", post(kick_player))
        .route("/games/{id}/host/players/{player_id}/mute", post(mute_player))
        .route("/games/{id}/host/players/{player_id}/warn", post(warn_player))
}

/// Create a lobby session for a registered game.
#[utoipa::path(
    post,
    path = "/games/{id}/session",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionSnapshot),
        (status = 404, description = "Game not registered"),
        (status = 409, description = "Session already exists")
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(
        session_service::create_session(&state, &game_id, payload.host_id).await?,
    ))
}

/// Tear down a live session, dropping every player and subscriber.
#[utoipa::path(
    delete,
    path = "/games/{id}/session",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses(
        (status = 200, description = "Session closed", body = ActionResponse),
        (status = 404, description = "No live session for the game")
    )
)]
pub async fn close_session(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::close_session(&state, &game_id)?))
}

/// Open the first question.
#[utoipa::path(
    post,
    path = "/games/{id}/host/start",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses(
        (status = 200, description = "Game started", body = ActionResponse),
        (status = 409, description = "Not startable from the current status")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::start_game(&state, &game_id).await?))
}

/// Move the question cursor, or finish the quiz past the last question.
#[utoipa::path(
    post,
    path = "/games/{id}/host/advance",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    request_body = AdvanceRequest,
    responses((status = 200, description = "Cursor moved or quiz finished", body = ActionResponse))
)]
pub async fn advance_question(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<AdvanceRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        session_service::advance_question(&state, &game_id, payload.index).await?,
    ))
}

/// Suspend the countdown.
#[utoipa::path(
    post,
    path = "/games/{id}/host/pause",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Game paused", body = ActionResponse))
)]
pub async fn pause_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::pause_game(&state, &game_id).await?))
}

/// Resume a paused countdown with its preserved remaining time.
#[utoipa::path(
    post,
    path = "/games/{id}/host/resume",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Game resumed", body = ActionResponse))
)]
pub async fn resume_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::resume_game(&state, &game_id).await?))
}

/// Reveal the correct answer and per-player results for the live question.
#[utoipa::path(
    post,
    path = "/games/{id}/host/reveal-results",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Results revealed", body = ActionResponse))
)]
pub async fn reveal_results(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        session_service::reveal_results(&state, &game_id).await?,
    ))
}

/// Reveal the intermediate leaderboard.
#[utoipa::path(
    post,
    path = "/games/{id}/host/reveal-leaderboard",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Leaderboard revealed", body = ActionResponse))
)]
pub async fn reveal_leaderboard(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        session_service::reveal_leaderboard(&state, &game_id).await?,
    ))
}

/// Force the session to finished.
#[utoipa::path(
    post,
    path = "/games/{id}/host/end",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Game ended", body = ActionResponse))
)]
pub async fn end_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::end_game(&state, &game_id).await?))
}

/// Soft restart: back to the lobby with scores wiped, players kept.
#[utoipa::path(
    post,
    path = "/games/{id}/host/restart",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Game restarted", body = ActionResponse))
)]
pub async fn restart_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(session_service::restart_game(&state, &game_id).await?))
}

/// Hard restart: signal every client now, rebuild an empty lobby after the
/// grace delay.
#[utoipa::path(
    post,
    path = "/games/{id}/host/full-restart",
    tag = "session",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Restart signalled", body = ActionResponse))
)]
pub async fn full_restart_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        session_service::full_restart_game(&state, &game_id).await?,
    ))
}

/// Kick a player with a recorded reason.
#[utoipa::path(
    post,
    path = "/games/{id}/host/players/{player_id}/kick",
    tag = "moderation",
    params(
        ("id" = String, Path, description = "Join code of the game"),
        ("player_id" = Uuid, Path, description = "Player to kick")
    ),
    request_body = KickRequest,
    responses(
        (status = 200, description = "Player kicked", body = ActionResponse),
        (status = 409, description = "Player already kicked")
    )
)]
pub async fn kick_player(
    State(state): State<SharedState>,
    Path((game_id, player_id)): Path<(String, Uuid)>,
    Json(payload): Json<KickRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        moderation_service::kick_player(&state, &game_id, player_id, payload.reason).await?,
    ))
}

/// Mute or unmute a player.
#[utoipa::path(
    post,
    path = "/games/{id}/host/players/{player_id}/mute",
    tag = "moderation",
    params(
        ("id" = String, Path, description = "Join code of the game"),
        ("player_id" = Uuid, Path, description = "Player to mute or unmute")
    ),
    request_body = MuteRequest,
    responses((status = 200, description = "Mute flag updated", body = ActionResponse))
)]
pub async fn mute_player(
    State(state): State<SharedState>,
    Path((game_id, player_id)): Path<(String, Uuid)>,
    Json(payload): Json<MuteRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        moderation_service::set_muted(&state, &game_id, player_id, payload.muted).await?,
    ))
}

/// Issue a moderation warning to a player.
#[utoipa::path(
    post,
    path = "/games/{id}/host/players/{player_id}/warn",
    tag = "moderation",
    params(
        ("id" = String, Path, description = "Join code of the game"),
        ("player_id" = Uuid, Path, description = "Player to warn")
    ),
    responses((status = 200, description = "Warning issued", body = ActionResponse))
)]
pub async fn warn_player(
    State(state): State<SharedState>,
    Path((game_id, player_id)): Path<(String, Uuid)>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(
        moderation_service::warn_player(&state, &game_id, player_id).await?,
    ))
}

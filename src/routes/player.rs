use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::requests::{
        JoinRequest, JoinResponse, PresenceRequest, SubmitAnswerRequest, SubmitAnswerResponse,
    },
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Player-facing endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/games/{id}/players", post(join))
        .route("/games/{id}/players/{player_id}/answer", post(submit_answer))
        .route(
            "/games/{id}/players/{player_id}/presence",
            post(set_presence),
        )
}

/// Join the lobby of a live session.
#[utoipa::path(
    post,
    path = "/games/{id}/players",
    tag = "player",
    params(("id" = String, Path, description = "Join code of the game")),
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Joined", body = JoinResponse),
        (status = 409, description = "Session is no longer accepting players")
    )
)]
pub async fn join(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        player_service::join(&state, &game_id, payload.nickname, payload.avatar).await?,
    ))
}

/// Submit an answer to the live question.
#[utoipa::path(
    post,
    path = "/games/{id}/players/{player_id}/answer",
    tag = "player",
    params(
        ("id" = String, Path, description = "Join code of the game"),
        ("player_id" = Uuid, Path, description = "Submitting player")
    ),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 403, description = "Player is kicked"),
        (status = 409, description = "Already answered or answers closed")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path((game_id, player_id)): Path<(String, Uuid)>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    Ok(Json(
        player_service::submit_answer(&state, &game_id, player_id, payload.answer).await?,
    ))
}

/// Flip a player's connectivity flag.
#[utoipa::path(
    post,
    path = "/games/{id}/players/{player_id}/presence",
    tag = "player",
    params(
        ("id" = String, Path, description = "Join code of the game"),
        ("player_id" = Uuid, Path, description = "Player changing presence")
    ),
    request_body = PresenceRequest,
    responses(
        (status = 200, description = "Presence updated"),
        (status = 403, description = "Player is kicked")
    )
)]
pub async fn set_presence(
    State(state): State<SharedState>,
    Path((game_id, player_id)): Path<(String, Uuid)>,
    Json(payload): Json<PresenceRequest>,
) -> Result<(), AppError> {
    player_service::set_presence(&state, &game_id, player_id, payload.connected).await?;
    Ok(())
}

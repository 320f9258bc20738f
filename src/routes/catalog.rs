use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};
use validator::Validate;

use crate::{
    dto::requests::{RegisterGameRequest, RegisterGameResponse},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Catalog management endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/catalog/games/{id}", put(register_game))
}

/// Register or replace a game definition under a join code.
#[utoipa::path(
    put,
    path = "/catalog/games/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Join code to store the game under")),
    request_body = RegisterGameRequest,
    responses(
        (status = 200, description = "Game registered", body = RegisterGameResponse),
        (status = 400, description = "Malformed definition")
    )
)]
pub async fn register_game(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<RegisterGameRequest>,
) -> Result<Json<RegisterGameResponse>, AppError> {
    payload.validate()?;
    Ok(Json(session_service::register_game(
        &state,
        &game_id,
        payload.title,
        payload.questions,
    )?))
}

use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/games/{id}/events",
    tag = "sse",
    params(("id" = String, Path, description = "Join code of the game")),
    responses((status = 200, description = "Snapshot stream", content_type = "text/event-stream", body = String))
)]
/// Stream full session snapshots to a connected client.
pub async fn session_stream(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe(&state, &game_id).await?;
    info!(game_id, "new snapshot stream connection");
    Ok(sse_service::to_sse_stream(receiver, game_id))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{id}/events", get(session_stream))
}

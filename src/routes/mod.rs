use axum::Router;

use crate::state::SharedState;

pub mod catalog;
pub mod docs;
pub mod health;
pub mod player;
pub mod public;
pub mod session;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(catalog::router())
        .merge(session::router())
        .merge(player::router())
        .merge(public::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report service liveness together with the number of sessions in memory.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse::ok(state.live_session_count())
}

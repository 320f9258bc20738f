use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status, always `"ok"` while the process is serving.
    pub status: String,
    /// Number of live sessions currently held in memory.
    pub live_sessions: usize,
}

impl HealthResponse {
    /// Create a health response carrying the live session count.
    pub fn ok(live_sessions: usize) -> Self {
        Self {
            status: "ok".to_string(),
            live_sessions,
        }
    }
}

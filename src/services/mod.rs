/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Host moderation of players.
pub mod moderation_service;
/// Player-facing writes: join, answer, presence.
pub mod player_service;
/// Read-only views for polling clients.
pub mod public_service;
/// Session lifecycle commands and the game catalog.
pub mod session_service;
/// Full-state snapshot projection and broadcast.
pub mod snapshot;
/// Server-Sent Events plumbing.
pub mod sse_service;

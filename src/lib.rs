//! Library crate for quiz-live-back, exposing modules for binaries and integration tests.

/// Runtime configuration.
pub mod config;
/// Wire-format request, response, and snapshot types.
pub mod dto;
/// Service and HTTP error taxonomy.
pub mod error;
/// Question definitions and the answer validator.
pub mod question;
/// Tie-aware leaderboard and podium ranking.
pub mod ranking;
/// HTTP route trees.
pub mod routes;
/// Time-decayed scoring.
pub mod scoring;
/// Business logic behind the routes.
pub mod services;
/// Shared application state and the session document.
pub mod state;
/// Anchor-based countdown arithmetic.
pub mod timing;

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quiz Live Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::catalog::register_game,
        crate::routes::session::create_session,
        crate::routes::session::close_session,
        crate::routes::session::start_game,
        crate::routes::session::advance_question,
        crate::routes::session::pause_game,
        crate::routes::session::resume_game,
        crate::routes::session::reveal_results,
        crate::routes::session::reveal_leaderboard,
        crate::routes::session::end_game,
        crate::routes::session::restart_game,
        crate::routes::session::full_restart_game,
        crate::routes::session::kick_player,
        crate::routes::session::mute_player,
        crate::routes::session::warn_player,
        crate::routes::player::join,
        crate::routes::player::submit_answer,
        crate::routes::player::set_presence,
        crate::routes::public::session_snapshot,
        crate::routes::public::leaderboard,
        crate::routes::public::podium,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::requests::RegisterGameRequest,
            crate::dto::requests::RegisterGameResponse,
            crate::dto::requests::CreateSessionRequest,
            crate::dto::requests::AdvanceRequest,
            crate::dto::requests::JoinRequest,
            crate::dto::requests::JoinResponse,
            crate::dto::requests::SubmitAnswerRequest,
            crate::dto::requests::SubmitAnswerResponse,
            crate::dto::requests::PresenceRequest,
            crate::dto::requests::KickRequest,
            crate::dto::requests::MuteRequest,
            crate::dto::requests::ActionResponse,
            crate::dto::ranking::LeaderboardEntry,
            crate::dto::ranking::PodiumSlotDto,
            crate::dto::ranking::LeaderboardResponse,
            crate::dto::ranking::PodiumResponse,
            crate::dto::session::SessionSnapshot,
            crate::dto::session::QuestionSnapshot,
            crate::dto::session::QuestionKindSnapshot,
            crate::dto::session::SolutionSnapshot,
            crate::dto::session::PlayerSnapshot,
            crate::dto::session::PlayerAnswerSnapshot,
            crate::question::GameDefinition,
            crate::question::Question,
            crate::question::QuestionKind,
            crate::question::CandidateAnswer,
            crate::state::state_machine::SessionStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Game definition registration"),
        (name = "session", description = "Host lifecycle commands"),
        (name = "moderation", description = "Host moderation of players"),
        (name = "player", description = "Player joins, answers, and presence"),
        (name = "public", description = "Read-only session views"),
        (name = "sse", description = "Server-sent snapshot stream"),
    )
)]
pub struct ApiDoc;

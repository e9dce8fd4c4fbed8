use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Rosco Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::game::get_match,
        crate::routes::game::submit_guess,
        crate::routes::game::submit_pass,
        crate::routes::game::next_letter,
        crate::routes::admin::create_match,
        crate::routes::admin::toggle_pause,
        crate::routes::admin::reset_match,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::admin::CreateMatchRequest,
            crate::dto::admin::WordInput,
            crate::dto::game::MatchStateDto,
            crate::dto::game::WheelSlotDto,
            crate::dto::game::TeamStateDto,
            crate::dto::game::GuessRequest,
            crate::dto::game::TeamRequest,
            crate::dto::ws::ClientAction,
            crate::dto::sse::GuessCorrectEvent,
            crate::dto::sse::GuessWrongEvent,
            crate::dto::sse::WordPassedEvent,
            crate::dto::sse::TurnSwitchedEvent,
            crate::dto::sse::ClockTickEvent,
            crate::dto::sse::MatchEndedEvent,
            crate::dto::sse::MatchResetEvent,
            crate::dto::sse::ValidationErrorEvent,
            crate::state::match_state::WordKind,
            crate::state::match_state::SlotStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "websocket", description = "Full-duplex match actions and events"),
        (name = "match", description = "Player actions and match snapshot"),
        (name = "admin", description = "Match administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_match_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/match", "/match/guess", "/admin/match", "/sse/public", "/ws"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Task owning the match state and its clocks.
pub mod match_engine;
/// Rendering of match notices into outbound events.
pub mod match_events;
/// Match actions shared by the REST and WebSocket transports.
pub mod match_service;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;

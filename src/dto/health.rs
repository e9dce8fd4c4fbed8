use serde::Serialize;
use utoipa::ToSchema;

/// Overall service state reported by `/healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The match engine answers.
    Ok,
    /// The match engine stopped accepting commands.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether a match is currently being played (running or paused).
    pub match_active: bool,
}

impl HealthResponse {
    /// Engine reachable; `match_active` mirrors the current snapshot.
    pub fn ok(match_active: bool) -> Self {
        Self {
            status: HealthStatus::Ok,
            match_active,
        }
    }

    /// Engine unreachable.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
            match_active: false,
        }
    }
}

use tracing::warn;

use crate::{dto::health::HealthResponse, services::match_service, state::SharedState};

/// Probe the match engine with a snapshot request.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if !state.engine().is_running() {
        warn!("match engine is not running (degraded mode)");
        return HealthResponse::degraded();
    }

    match match_service::current_match(state).await {
        Ok(snapshot) => HealthResponse::ok(snapshot.is_active),
        Err(err) => {
            warn!(error = %err, "match engine did not answer health check");
            HealthResponse::degraded()
        }
    }
}

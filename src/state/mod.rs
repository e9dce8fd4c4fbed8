pub mod coordinator;
mod hub;
pub mod match_state;
pub mod state_machine;

use std::sync::Arc;

use crate::{config::AppConfig, services::match_engine::MatchHandle};

pub use self::hub::EventHub;
pub use self::match_state::{MatchAction, MatchError, MatchNotice, MatchState, TeamId};

pub type SharedState = Arc<AppState>;

/// Composition root shared by every handler: configuration, event hub and the
/// handle to the task that owns the match.
pub struct AppState {
    config: AppConfig,
    hub: EventHub,
    engine: MatchHandle,
}

impl AppState {
    /// Spawn the match engine and wrap everything in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: AppConfig) -> SharedState {
        let hub = EventHub::new(config.event_capacity());
        let engine = MatchHandle::spawn(&config, hub.clone());
        Arc::new(Self {
            config,
            hub,
            engine,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast hub carrying every outbound match event.
    pub fn hub(&self) -> &EventHub {
        &self.hub
    }

    /// Handle used to submit actions to the match engine.
    pub fn engine(&self) -> &MatchHandle {
        &self.engine
    }
}

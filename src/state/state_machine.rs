use thiserror::Error;

/// Lifecycle phases a match goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPhase {
    /// No match exists; wheels are empty and no clock runs.
    #[default]
    Idle,
    /// A match is being played and the active team's clock runs.
    Active,
    /// The administrator suspended both clocks without ending the match.
    Paused,
    /// Both teams completed and a winner has been decided.
    Ended,
}

impl MatchPhase {
    /// True while the match accepts gameplay (running or paused).
    pub fn is_active(self) -> bool {
        matches!(self, MatchPhase::Active | MatchPhase::Paused)
    }

    /// True while both clocks are suspended by the administrator.
    pub fn is_paused(self) -> bool {
        matches!(self, MatchPhase::Paused)
    }

    /// Compute the phase reached by applying `event`, rejecting invalid transitions.
    pub fn transition(self, event: PhaseEvent) -> Result<MatchPhase, InvalidTransition> {
        let next = match (self, event) {
            (_, PhaseEvent::Create) => MatchPhase::Active,
            (MatchPhase::Active, PhaseEvent::Pause) => MatchPhase::Paused,
            (MatchPhase::Paused, PhaseEvent::Resume) => MatchPhase::Active,
            (MatchPhase::Active, PhaseEvent::Finish) => MatchPhase::Ended,
            (_, PhaseEvent::Reset) => MatchPhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

/// Events that move a match between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// A new match was created, discarding whatever existed before.
    Create,
    /// The administrator paused the running match.
    Pause,
    /// The administrator resumed a paused match.
    Resume,
    /// Both teams completed.
    Finish,
    /// The administrator cleared the match.
    Reset,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the match was in when the invalid event was received.
    pub from: MatchPhase,
    /// The event that cannot be applied from this phase.
    pub event: PhaseEvent,
}

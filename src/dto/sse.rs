use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::game::MatchStateDto, state::TeamId};

#[derive(Clone, Debug, Serialize)]
/// Named event carried to observers, serialized as `{"event": .., "data": ..}` on
/// WebSockets and as an SSE event/data pair on the public stream.
pub struct ServerEvent {
    pub event: String,
    pub data: serde_json::Value,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the data field.
    pub fn json<T>(event: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            event: event.to_string(),
            data: serde_json::to_value(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a slot was answered correctly.
pub struct GuessCorrectEvent {
    #[schema(value_type = u8)]
    pub team: TeamId,
    pub letter: String,
    pub word: String,
    pub match_state: MatchStateDto,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a slot was answered incorrectly, revealing the expected word.
pub struct GuessWrongEvent {
    #[schema(value_type = u8)]
    pub team: TeamId,
    pub letter: String,
    pub correct_word: String,
    pub match_state: MatchStateDto,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a team passed on a slot.
pub struct WordPassedEvent {
    #[schema(value_type = u8)]
    pub team: TeamId,
    pub letter: String,
    pub match_state: MatchStateDto,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast after the turn moved to another team.
pub struct TurnSwitchedEvent {
    #[schema(value_type = u8)]
    pub active_team: TeamId,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Lightweight per-second clock update.
pub struct ClockTickEvent {
    #[schema(value_type = u8)]
    pub team: TeamId,
    pub time_left: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast once both teams completed.
pub struct MatchEndedEvent {
    #[schema(value_type = u8)]
    pub winner: TeamId,
    pub match_state: MatchStateDto,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after the match was cleared; carries no state.
pub struct MatchResetEvent {}

#[derive(Debug, Serialize, ToSchema)]
/// Sent to the originating client only when its request was rejected.
pub struct ValidationErrorEvent {
    pub message: String,
}

use serde::Deserialize;
use utoipa::ToSchema;

use crate::dto::{
    admin::CreateMatchRequest,
    game::{GuessRequest, TeamRequest},
};

#[derive(Debug, Deserialize, ToSchema)]
/// Actions accepted from WebSocket clients, e.g. `{"action": "submit-pass", "team": 1}`.
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientAction {
    CreateMatch(CreateMatchRequest),
    SubmitGuess(GuessRequest),
    SubmitPass(TeamRequest),
    TogglePause,
    ResetMatch,
    NextLetter(TeamRequest),
}

impl ClientAction {
    /// Parse a text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Action name as it appears on the wire, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientAction::CreateMatch(_) => "create-match",
            ClientAction::SubmitGuess(_) => "submit-guess",
            ClientAction::SubmitPass(_) => "submit-pass",
            ClientAction::TogglePause => "toggle-pause",
            ClientAction::ResetMatch => "reset-match",
            ClientAction::NextLetter(_) => "next-letter",
        }
    }
}

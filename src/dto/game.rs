use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::match_state::{
    MatchState, SlotStatus, TeamId, TeamState, WordItem, WordKind,
};

/// Full public projection of the match, sent on connect and after structural changes.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchStateDto {
    pub is_active: bool,
    pub is_paused: bool,
    pub wheel1: Vec<WheelSlotDto>,
    pub wheel2: Vec<WheelSlotDto>,
    #[schema(value_type = u8)]
    pub active_team: TeamId,
    pub team1: TeamStateDto,
    pub team2: TeamStateDto,
    #[schema(value_type = Option<u8>)]
    pub winner: Option<TeamId>,
}

/// One letter slot of a wheel.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WheelSlotDto {
    pub letter: String,
    pub word: String,
    pub definition: String,
    #[serde(rename = "type")]
    pub kind: WordKind,
    pub status: SlotStatus,
}

/// Progress of a single team.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamStateDto {
    /// `null` once the team has no slot left to answer.
    pub current_letter_index: Option<usize>,
    pub correct: u32,
    pub wrong: u32,
    pub time_left: u32,
    pub is_timer_running: bool,
    pub completed: bool,
}

/// Answer submitted by the team holding the turn. Any text is accepted; a
/// mismatch is scored as a wrong answer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GuessRequest {
    #[schema(value_type = u8)]
    pub team: TeamId,
    pub guess: String,
}

/// Payload naming the team performing a pass or a next-letter request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TeamRequest {
    #[schema(value_type = u8)]
    pub team: TeamId,
}

impl From<&MatchState> for MatchStateDto {
    fn from(state: &MatchState) -> Self {
        Self {
            is_active: state.is_active(),
            is_paused: state.is_paused(),
            wheel1: state.wheel1.iter().map(Into::into).collect(),
            wheel2: state.wheel2.iter().map(Into::into).collect(),
            active_team: state.active_team,
            team1: (&state.team1).into(),
            team2: (&state.team2).into(),
            winner: state.winner,
        }
    }
}

impl From<&WordItem> for WheelSlotDto {
    fn from(item: &WordItem) -> Self {
        Self {
            letter: item.letter.to_string(),
            word: item.word.clone(),
            definition: item.definition.clone(),
            kind: item.kind,
            status: item.status,
        }
    }
}

impl From<&TeamState> for TeamStateDto {
    fn from(team: &TeamState) -> Self {
        Self {
            current_letter_index: team.current_letter_index,
            correct: team.correct,
            wrong: team.wrong,
            time_left: team.time_left,
            is_timer_running: team.is_timer_running,
            completed: team.completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::match_state::tests::created;

    #[test]
    fn snapshot_uses_wire_field_names() {
        let mut state = created();
        state.team2.current_letter_index = None;
        state.wheel1[0].status = SlotStatus::Passed;

        let value = serde_json::to_value(MatchStateDto::from(&state)).unwrap();

        assert_eq!(value["isActive"], json!(true));
        assert_eq!(value["isPaused"], json!(false));
        assert_eq!(value["activeTeam"], json!(1));
        assert_eq!(value["winner"], json!(null));
        assert_eq!(value["team1"]["timeLeft"], json!(300));
        assert_eq!(value["team1"]["isTimerRunning"], json!(true));
        assert_eq!(value["team1"]["currentLetterIndex"], json!(0));
        assert_eq!(value["team2"]["currentLetterIndex"], json!(null));
        assert_eq!(
            value["wheel1"][0],
            json!({
                "letter": "A",
                "word": "ONEA",
                "definition": "clue for A",
                "type": "starts-with",
                "status": "passed",
            })
        );
    }

    #[test]
    fn guess_request_accepts_numeric_team() {
        let request: GuessRequest =
            serde_json::from_value(json!({ "team": 2, "guess": "casa" })).unwrap();
        assert_eq!(request.team, TeamId::Two);

        assert!(serde_json::from_value::<TeamRequest>(json!({ "team": 3 })).is_err());
    }
}

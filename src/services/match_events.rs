use tracing::warn;

use crate::{
    dto::{
        game::MatchStateDto,
        sse::{
            ClockTickEvent, GuessCorrectEvent, GuessWrongEvent, MatchEndedEvent, MatchResetEvent,
            ServerEvent, TurnSwitchedEvent, ValidationErrorEvent, WordPassedEvent,
        },
    },
    state::{EventHub, MatchNotice, MatchState},
};

pub const FULL_STATE: &str = "full-state";
pub const GUESS_CORRECT: &str = "guess-correct";
pub const GUESS_WRONG: &str = "guess-wrong";
pub const WORD_PASSED: &str = "word-passed";
pub const TURN_SWITCHED: &str = "turn-switched";
pub const CLOCK_TICK: &str = "clock-tick";
pub const MATCH_ENDED: &str = "match-ended";
pub const MATCH_RESET: &str = "match-reset";
pub const VALIDATION_ERROR: &str = "validation-error";

/// Broadcast the events for `notices`, in order, each carrying the state as it
/// stands once the whole action has been applied.
pub fn publish(hub: &EventHub, state: &MatchState, notices: &[MatchNotice]) {
    if notices.is_empty() {
        return;
    }

    let snapshot = MatchStateDto::from(state);
    for notice in notices {
        match render(notice, &snapshot) {
            Ok(event) => hub.broadcast(event),
            Err(err) => warn!(error = %err, ?notice, "failed to serialize match event"),
        }
    }
}

/// Convert one notice into its outbound event.
pub fn render(notice: &MatchNotice, snapshot: &MatchStateDto) -> serde_json::Result<ServerEvent> {
    match notice {
        MatchNotice::FullState => ServerEvent::json(FULL_STATE, snapshot),
        MatchNotice::GuessCorrect { team, letter, word } => ServerEvent::json(
            GUESS_CORRECT,
            &GuessCorrectEvent {
                team: *team,
                letter: letter.to_string(),
                word: word.clone(),
                match_state: snapshot.clone(),
            },
        ),
        MatchNotice::GuessWrong {
            team,
            letter,
            correct_word,
        } => ServerEvent::json(
            GUESS_WRONG,
            &GuessWrongEvent {
                team: *team,
                letter: letter.to_string(),
                correct_word: correct_word.clone(),
                match_state: snapshot.clone(),
            },
        ),
        MatchNotice::WordPassed { team, letter } => ServerEvent::json(
            WORD_PASSED,
            &WordPassedEvent {
                team: *team,
                letter: letter.to_string(),
                match_state: snapshot.clone(),
            },
        ),
        MatchNotice::TurnSwitched { active_team } => ServerEvent::json(
            TURN_SWITCHED,
            &TurnSwitchedEvent {
                active_team: *active_team,
            },
        ),
        MatchNotice::ClockTick { team, time_left } => ServerEvent::json(
            CLOCK_TICK,
            &ClockTickEvent {
                team: *team,
                time_left: *time_left,
            },
        ),
        MatchNotice::MatchEnded { winner } => ServerEvent::json(
            MATCH_ENDED,
            &MatchEndedEvent {
                winner: *winner,
                match_state: snapshot.clone(),
            },
        ),
        MatchNotice::MatchReset => ServerEvent::json(MATCH_RESET, &MatchResetEvent {}),
    }
}

/// Snapshot event sent to a newly connected or lagging observer.
pub fn full_state_event(snapshot: &MatchStateDto) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(FULL_STATE, snapshot)
}

/// Rejection notice addressed to a single client.
pub fn validation_error_event(message: &str) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(
        VALIDATION_ERROR,
        &ValidationErrorEvent {
            message: message.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::{TeamId, match_state::tests::created};

    #[test]
    fn guess_events_embed_the_snapshot() {
        let state = created();
        let snapshot = MatchStateDto::from(&state);

        let event = render(
            &MatchNotice::GuessWrong {
                team: TeamId::One,
                letter: "Ñ",
                correct_word: "ÑANDÚ".into(),
            },
            &snapshot,
        )
        .unwrap();

        assert_eq!(event.event, GUESS_WRONG);
        assert_eq!(event.data["team"], json!(1));
        assert_eq!(event.data["letter"], json!("Ñ"));
        assert_eq!(event.data["correctWord"], json!("ÑANDÚ"));
        assert_eq!(event.data["matchState"]["activeTeam"], json!(1));
    }

    #[test]
    fn lightweight_events_carry_no_state() {
        let snapshot = MatchStateDto::from(&created());

        let tick = render(
            &MatchNotice::ClockTick {
                team: TeamId::Two,
                time_left: 42,
            },
            &snapshot,
        )
        .unwrap();
        assert_eq!(tick.event, CLOCK_TICK);
        assert_eq!(tick.data, json!({ "team": 2, "timeLeft": 42 }));

        let switched = render(
            &MatchNotice::TurnSwitched {
                active_team: TeamId::Two,
            },
            &snapshot,
        )
        .unwrap();
        assert_eq!(switched.data, json!({ "activeTeam": 2 }));

        let reset = render(&MatchNotice::MatchReset, &snapshot).unwrap();
        assert_eq!(reset.event, MATCH_RESET);
        assert_eq!(reset.data, json!({}));
    }

    #[tokio::test]
    async fn publish_broadcasts_in_order_and_skips_empty_batches() {
        let hub = EventHub::new(8);
        let mut receiver = hub.subscribe();
        let state = created();

        publish(&hub, &state, &[]);
        publish(
            &hub,
            &state,
            &[
                MatchNotice::WordPassed {
                    team: TeamId::One,
                    letter: "A",
                },
                MatchNotice::TurnSwitched {
                    active_team: TeamId::Two,
                },
            ],
        );

        assert_eq!(receiver.recv().await.unwrap().event, WORD_PASSED);
        assert_eq!(receiver.recv().await.unwrap().event, TURN_SWITCHED);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn validation_error_wraps_message() {
        let event = validation_error_event("wheel 1 is short").unwrap();
        assert_eq!(event.event, VALIDATION_ERROR);
        assert_eq!(event.data, json!({ "message": "wheel 1 is short" }));
    }
}

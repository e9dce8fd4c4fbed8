use validator::Validate;

use crate::{
    dto::{
        admin::CreateMatchRequest,
        game::{GuessRequest, MatchStateDto, TeamRequest},
        ws::ClientAction,
    },
    error::ServiceError,
    state::{MatchAction, SharedState},
};

/// Validate a create-match request and start a new match.
pub async fn create_match(
    state: &SharedState,
    request: CreateMatchRequest,
) -> Result<MatchStateDto, ServiceError> {
    request.validate()?;
    let action = MatchAction::CreateMatch {
        wheel1: request.wheel1.into_iter().map(Into::into).collect(),
        wheel2: request.wheel2.into_iter().map(Into::into).collect(),
    };
    state.engine().dispatch(action).await
}

/// Submit an answer for the team's current slot.
pub async fn submit_guess(
    state: &SharedState,
    request: GuessRequest,
) -> Result<MatchStateDto, ServiceError> {
    state
        .engine()
        .dispatch(MatchAction::SubmitGuess {
            team: request.team,
            guess: request.guess,
        })
        .await
}

/// Skip the team's current slot.
pub async fn submit_pass(
    state: &SharedState,
    request: TeamRequest,
) -> Result<MatchStateDto, ServiceError> {
    state
        .engine()
        .dispatch(MatchAction::SubmitPass { team: request.team })
        .await
}

/// Re-point the team at its first unresolved slot.
pub async fn next_letter(
    state: &SharedState,
    request: TeamRequest,
) -> Result<MatchStateDto, ServiceError> {
    state
        .engine()
        .dispatch(MatchAction::NextLetter { team: request.team })
        .await
}

/// Pause a running match or resume a paused one.
pub async fn toggle_pause(state: &SharedState) -> Result<MatchStateDto, ServiceError> {
    state.engine().dispatch(MatchAction::TogglePause).await
}

/// Clear the match and stop every clock.
pub async fn reset_match(state: &SharedState) -> Result<MatchStateDto, ServiceError> {
    state.engine().dispatch(MatchAction::ResetMatch).await
}

/// Route an action received over a WebSocket.
pub async fn apply_client_action(
    state: &SharedState,
    action: ClientAction,
) -> Result<MatchStateDto, ServiceError> {
    match action {
        ClientAction::CreateMatch(request) => create_match(state, request).await,
        ClientAction::SubmitGuess(request) => submit_guess(state, request).await,
        ClientAction::SubmitPass(request) => submit_pass(state, request).await,
        ClientAction::TogglePause => toggle_pause(state).await,
        ClientAction::ResetMatch => reset_match(state).await,
        ClientAction::NextLetter(request) => next_letter(state, request).await,
    }
}

/// Snapshot of the match as exposed to clients.
pub async fn current_match(state: &SharedState) -> Result<MatchStateDto, ServiceError> {
    state.engine().snapshot().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::admin::WordInput,
        state::{
            AppState, TeamId,
            match_state::{LETTERS, SlotStatus},
        },
    };

    fn rows(prefix: &str, count: usize) -> Vec<WordInput> {
        LETTERS
            .iter()
            .cycle()
            .take(count)
            .map(|letter| WordInput {
                word: format!("{prefix}{letter}"),
                definition: format!("clue {letter}"),
                kind: None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn short_wheel_is_rejected_before_reaching_the_engine() {
        let state = AppState::new(AppConfig::default());

        let err = create_match(
            &state,
            CreateMatchRequest {
                wheel1: rows("a", 27),
                wheel2: rows("b", 3),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(message) if message.contains("wheel2")));
        assert!(!current_match(&state).await.unwrap().is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn long_guess_is_scored_as_wrong_answer() {
        let state = AppState::new(AppConfig::default());
        create_match(
            &state,
            CreateMatchRequest {
                wheel1: rows("uno", 27),
                wheel2: rows("dos", 27),
            },
        )
        .await
        .unwrap();

        let snapshot = submit_guess(
            &state,
            GuessRequest {
                team: TeamId::One,
                guess: "x".repeat(500),
            },
        )
        .await
        .unwrap();

        assert_eq!(snapshot.team1.wrong, 1);
        assert_eq!(snapshot.wheel1[0].status, SlotStatus::Wrong);
        assert_eq!(snapshot.active_team, TeamId::Two);
    }

    #[tokio::test(start_paused = true)]
    async fn client_actions_drive_the_match() {
        let state = AppState::new(AppConfig::default());

        apply_client_action(
            &state,
            ClientAction::CreateMatch(CreateMatchRequest {
                wheel1: rows("uno", 27),
                wheel2: rows("dos", 27),
            }),
        )
        .await
        .unwrap();
        apply_client_action(
            &state,
            ClientAction::SubmitPass(TeamRequest { team: TeamId::One }),
        )
        .await
        .unwrap();

        let snapshot = current_match(&state).await.unwrap();
        assert_eq!(snapshot.active_team, TeamId::Two);
        assert_eq!(snapshot.team1.current_letter_index, Some(1));

        apply_client_action(&state, ClientAction::ResetMatch)
            .await
            .unwrap();
        assert!(current_match(&state).await.unwrap().wheel1.is_empty());
    }
}

//! Task that exclusively owns the [`MatchState`] and serializes every mutation.
//!
//! Client actions arrive through a bounded command queue, clock ticks through an
//! internal channel fed by a ticker task. Both are handled by the same loop, so a
//! tick can never interleave with a guess: each action is applied, the running
//! clock is reconciled and the resulting events are broadcast before the next
//! message is read.

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    dto::game::MatchStateDto,
    error::ServiceError,
    services::match_events,
    state::{EventHub, MatchAction, MatchError, MatchNotice, MatchState, TeamId},
};

/// Resolution of the team clocks.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Messages accepted by the engine task.
enum EngineCommand {
    Apply {
        action: MatchAction,
        reply: oneshot::Sender<Result<MatchStateDto, MatchError>>,
    },
    Snapshot {
        reply: oneshot::Sender<MatchStateDto>,
    },
}

/// Cloneable handle used by transports to talk to the engine task.
#[derive(Clone)]
pub struct MatchHandle {
    commands: mpsc::Sender<EngineCommand>,
}

impl MatchHandle {
    /// Spawn the engine on the current Tokio runtime.
    pub fn spawn(config: &AppConfig, hub: EventHub) -> Self {
        let (commands, receiver) = mpsc::channel(config.command_capacity());
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        let engine = MatchEngine {
            state: MatchState::new(config.match_clock_seconds()),
            hub,
            clock: Clock {
                ticks: ticks_tx,
                ticker: None,
            },
        };

        tokio::spawn(engine.run(receiver, ticks_rx));
        Self { commands }
    }

    /// Apply an action and wait until its events have been broadcast.
    ///
    /// Returns the state exactly as this action left it, before any later tick
    /// or action is processed.
    pub async fn dispatch(&self, action: MatchAction) -> Result<MatchStateDto, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::Apply { action, reply })
            .await
            .map_err(|_| ServiceError::Unavailable)?;

        response
            .await
            .map_err(|_| ServiceError::Unavailable)?
            .map_err(Into::into)
    }

    /// Current public projection of the match.
    pub async fn snapshot(&self) -> Result<MatchStateDto, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(EngineCommand::Snapshot { reply })
            .await
            .map_err(|_| ServiceError::Unavailable)?;

        response.await.map_err(|_| ServiceError::Unavailable)
    }

    /// Whether the engine task is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

struct MatchEngine {
    state: MatchState,
    hub: EventHub,
    clock: Clock,
}

impl MatchEngine {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<EngineCommand>,
        mut ticks: mpsc::UnboundedReceiver<(TeamId, u64)>,
    ) {
        info!(clock_seconds = self.state.clock_seconds, "match engine started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some((team, epoch)) = ticks.recv() => {
                    let _ = self.apply(MatchAction::ClockTick { team, epoch });
                }
            }
        }

        self.clock.stop();
        warn!("match engine stopped");
    }

    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Apply { action, reply } => {
                let result = self.apply(action).map(|()| MatchStateDto::from(&self.state));
                let _ = reply.send(result);
            }
            EngineCommand::Snapshot { reply } => {
                let _ = reply.send(MatchStateDto::from(&self.state));
            }
        }
    }

    fn apply(&mut self, action: MatchAction) -> Result<(), MatchError> {
        let creating = matches!(action, MatchAction::CreateMatch { .. });
        let ticking = matches!(action, MatchAction::ClockTick { .. });

        let notices = match self.state.apply(action) {
            Ok(notices) => notices,
            Err(err) => {
                match &err {
                    MatchError::Validation(message) => {
                        debug!(%message, "rejected match input")
                    }
                    MatchError::InvalidTransition(_) => {
                        warn!(error = %err, "match lifecycle violation")
                    }
                }
                return Err(err);
            }
        };

        self.clock.sync(self.state.running_clock());

        if creating {
            info!(
                clock_seconds = self.state.clock_seconds,
                "match created"
            );
        }
        if notices.is_empty() && !ticking {
            debug!("action ignored in current match state");
        }
        for notice in &notices {
            match notice {
                MatchNotice::MatchEnded { winner } => {
                    info!(
                        winner = u8::from(*winner),
                        team1_correct = self.state.team1.correct,
                        team2_correct = self.state.team2.correct,
                        "match ended"
                    )
                }
                MatchNotice::MatchReset => info!("match reset"),
                _ => {}
            }
        }

        match_events::publish(&self.hub, &self.state, &notices);
        Ok(())
    }
}

/// Owns the ticker of the clock that is currently running, if any.
struct Clock {
    ticks: mpsc::UnboundedSender<(TeamId, u64)>,
    ticker: Option<Ticker>,
}

impl Clock {
    /// Make the running ticker match `wanted`, restarting it when the epoch changed.
    fn sync(&mut self, wanted: Option<(TeamId, u64)>) {
        let current = self.ticker.as_ref().map(|ticker| (ticker.team, ticker.epoch));
        if current == wanted {
            return;
        }

        self.ticker = wanted.map(|(team, epoch)| Ticker::spawn(team, epoch, self.ticks.clone()));
    }

    fn stop(&mut self) {
        self.ticker = None;
    }
}

struct Ticker {
    team: TeamId,
    epoch: u64,
    task: JoinHandle<()>,
}

impl Ticker {
    fn spawn(team: TeamId, epoch: u64, ticks: mpsc::UnboundedSender<(TeamId, u64)>) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + CLOCK_TICK, CLOCK_TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send((team, epoch)).is_err() {
                    break;
                }
            }
        });

        Self { team, epoch, task }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;
    use crate::{
        dto::sse::ServerEvent,
        state::match_state::tests::entries,
    };

    fn spawn(clock_seconds: u32) -> (MatchHandle, EventHub) {
        let config = AppConfig::default().with_match_clock_seconds(clock_seconds);
        let hub = EventHub::new(config.event_capacity());
        (MatchHandle::spawn(&config, hub.clone()), hub)
    }

    fn create() -> MatchAction {
        MatchAction::CreateMatch {
            wheel1: entries("one"),
            wheel2: entries("two"),
        }
    }

    fn drain(receiver: &mut tokio::sync::broadcast::Receiver<ServerEvent>) -> Vec<String> {
        let mut names = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            names.push(event.event);
        }
        names
    }

    #[tokio::test(start_paused = true)]
    async fn running_clock_counts_down_every_second() {
        let (handle, hub) = spawn(300);
        let mut events = hub.subscribe();

        handle.dispatch(create()).await.unwrap();
        sleep(Duration::from_millis(3_500)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.team1.time_left, 297);
        assert_eq!(snapshot.team2.time_left, 300);
        assert_eq!(
            drain(&mut events),
            vec!["full-state", "clock-tick", "clock-tick", "clock-tick"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_clocks_until_resumed() {
        let (handle, _hub) = spawn(300);
        handle.dispatch(create()).await.unwrap();
        sleep(Duration::from_millis(2_500)).await;

        handle.dispatch(MatchAction::TogglePause).await.unwrap();
        sleep(Duration::from_secs(60)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.is_paused);
        assert_eq!(snapshot.team1.time_left, 298);
        assert!(!snapshot.team1.is_timer_running && !snapshot.team2.is_timer_running);

        handle.dispatch(MatchAction::TogglePause).await.unwrap();
        sleep(Duration::from_millis(1_500)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.is_paused);
        assert_eq!(snapshot.team1.time_left, 297);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_input_is_reported_without_broadcast() {
        let (handle, hub) = spawn(300);
        let mut events = hub.subscribe();
        let mut short = entries("two");
        short.truncate(26);

        let err = handle
            .dispatch(MatchAction::CreateMatch {
                wheel1: entries("one"),
                wheel2: short,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(message) if message.contains("wheel 2")));
        assert!(drain(&mut events).is_empty());
        assert!(!handle.snapshot().await.unwrap().is_active);
    }

    #[tokio::test(start_paused = true)]
    async fn timeouts_hand_over_and_end_the_match() {
        let (handle, hub) = spawn(3);
        let mut events = hub.subscribe();
        handle.dispatch(create()).await.unwrap();

        sleep(Duration::from_millis(3_500)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.team1.completed);
        assert_eq!(snapshot.active_team, TeamId::Two);
        assert!(snapshot.team2.is_timer_running);

        sleep(Duration::from_secs(3)).await;
        let snapshot = handle.snapshot().await.unwrap();
        assert!(!snapshot.is_active);
        assert_eq!(snapshot.winner, Some(TeamId::One));

        let names = drain(&mut events);
        assert_eq!(names.iter().filter(|name| *name == "clock-tick").count(), 6);
        assert!(names.contains(&"turn-switched".to_string()));
        assert_eq!(names.last().map(String::as_str), Some("match-ended"));
    }

    #[tokio::test(start_paused = true)]
    async fn dispatch_returns_the_state_left_by_the_action() {
        let (handle, _hub) = spawn(300);

        let created = handle.dispatch(create()).await.unwrap();
        assert!(created.is_active);
        assert_eq!(created.wheel1.len(), 27);

        let passed = handle
            .dispatch(MatchAction::SubmitPass { team: TeamId::One })
            .await
            .unwrap();
        assert_eq!(passed.active_team, TeamId::Two);
        assert_eq!(passed.wheel1[0].status, crate::state::match_state::SlotStatus::Passed);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_the_clock() {
        let (handle, _hub) = spawn(300);
        handle.dispatch(create()).await.unwrap();
        handle.dispatch(MatchAction::ResetMatch).await.unwrap();
        sleep(Duration::from_secs(5)).await;

        let snapshot = handle.snapshot().await.unwrap();
        assert!(snapshot.wheel1.is_empty());
        assert_eq!(snapshot.team1.time_left, 300);
        assert!(!snapshot.team1.is_timer_running);
    }
}

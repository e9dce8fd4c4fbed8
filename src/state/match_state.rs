//! Canonical state of a rosco match and the reducer every action flows through.
//!
//! [`MatchState::apply`] is the only way the match mutates. It never blocks and
//! never performs I/O: it returns the list of [`MatchNotice`]s the caller must
//! broadcast, and exposes the clock that should currently run through
//! [`MatchState::running_clock`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::state_machine::{InvalidTransition, MatchPhase, PhaseEvent};

/// Number of slots in each wheel.
pub const WHEEL_SIZE: usize = 27;

/// Alphabet symbols assigned to wheel slots, in wheel order.
pub const LETTERS: [&str; WHEEL_SIZE] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "Ñ", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// Seconds on each team's clock when a match starts.
pub const DEFAULT_CLOCK_SECONDS: u32 = 300;

/// One of the two competing teams. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TeamId {
    /// First team; always opens the match.
    One,
    /// Second team.
    Two,
}

impl TeamId {
    /// The opposing team.
    pub fn other(self) -> Self {
        match self {
            TeamId::One => TeamId::Two,
            TeamId::Two => TeamId::One,
        }
    }
}

impl From<TeamId> for u8 {
    fn from(value: TeamId) -> Self {
        match value {
            TeamId::One => 1,
            TeamId::Two => 2,
        }
    }
}

impl TryFrom<u8> for TeamId {
    type Error = UnknownTeam;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TeamId::One),
            2 => Ok(TeamId::Two),
            other => Err(UnknownTeam(other)),
        }
    }
}

/// Raised when a payload names a team other than 1 or 2.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown team `{0}` (expected 1 or 2)")]
pub struct UnknownTeam(pub u8);

/// Whether the answer must start with or merely contain its slot letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WordKind {
    /// The answer starts with the slot letter.
    #[default]
    #[serde(alias = "starts")]
    StartsWith,
    /// The answer contains the slot letter somewhere.
    Contains,
}

/// Resolution state of a wheel slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStatus {
    /// Not yet presented or answered.
    #[default]
    Pending,
    /// Answered correctly.
    Correct,
    /// Answered incorrectly.
    Wrong,
    /// Skipped; will be presented again after a full lap.
    Passed,
}

impl SlotStatus {
    /// Pending and passed slots can still be answered.
    pub fn is_unresolved(self) -> bool {
        matches!(self, SlotStatus::Pending | SlotStatus::Passed)
    }
}

/// Raw entry submitted by the administrator when creating a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    /// Expected answer.
    pub word: String,
    /// Clue shown to the guessing team.
    pub definition: String,
    /// Optional placement rule, defaults to [`WordKind::StartsWith`].
    pub kind: Option<WordKind>,
}

impl WordEntry {
    /// Entries with a blank word or definition are skipped when building a wheel.
    pub fn is_usable(&self) -> bool {
        !self.word.trim().is_empty() && !self.definition.trim().is_empty()
    }
}

/// One letter slot of a wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordItem {
    /// Letter targeted by this slot.
    pub letter: &'static str,
    /// Expected answer, uppercase.
    pub word: String,
    /// Clue text.
    pub definition: String,
    /// Placement rule of the letter within the answer.
    pub kind: WordKind,
    /// Current resolution state.
    pub status: SlotStatus,
}

/// Progress of one team through its wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamState {
    /// Slot currently presented; `None` once no unresolved slot remains.
    pub current_letter_index: Option<usize>,
    /// Correct answers so far.
    pub correct: u32,
    /// Wrong answers so far.
    pub wrong: u32,
    /// Remaining seconds on the team clock.
    pub time_left: u32,
    /// Whether the team clock is counting down.
    pub is_timer_running: bool,
    /// Set once the wheel is exhausted or the clock ran out.
    pub completed: bool,
}

impl TeamState {
    /// Default progress for a team with a full clock.
    pub fn new(clock_seconds: u32) -> Self {
        Self {
            current_letter_index: Some(0),
            correct: 0,
            wrong: 0,
            time_left: clock_seconds,
            is_timer_running: false,
            completed: false,
        }
    }
}

/// Aggregate root holding the whole match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    /// Lifecycle phase; drives `isActive` and `isPaused`.
    pub phase: MatchPhase,
    /// Wheel played by team 1.
    pub wheel1: Vec<WordItem>,
    /// Wheel played by team 2.
    pub wheel2: Vec<WordItem>,
    /// Team holding the turn.
    pub active_team: TeamId,
    /// Progress of team 1.
    pub team1: TeamState,
    /// Progress of team 2.
    pub team2: TeamState,
    /// Decided once both teams completed.
    pub winner: Option<TeamId>,
    /// Starting value of each clock.
    pub clock_seconds: u32,
    /// Bumped every time a clock starts so ticks from a stopped clock can be told apart.
    pub clock_epoch: u64,
}

/// Actions accepted by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchAction {
    /// Start a new match from two word lists.
    CreateMatch {
        /// Entries for team 1.
        wheel1: Vec<WordEntry>,
        /// Entries for team 2.
        wheel2: Vec<WordEntry>,
    },
    /// Answer the current slot.
    SubmitGuess {
        /// Team answering.
        team: TeamId,
        /// Free-text answer.
        guess: String,
    },
    /// Skip the current slot.
    SubmitPass {
        /// Team passing.
        team: TeamId,
    },
    /// Pause or resume both clocks.
    TogglePause,
    /// Clear the match.
    ResetMatch,
    /// Point the team back at its first unresolved slot.
    NextLetter {
        /// Team asking for its next letter.
        team: TeamId,
    },
    /// One second elapsed on a running clock.
    ClockTick {
        /// Team whose clock ticked.
        team: TeamId,
        /// Epoch of the clock that produced the tick.
        epoch: u64,
    },
}

/// Facts produced by an action, to be broadcast in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchNotice {
    /// Observers should resynchronize from the whole state.
    FullState,
    /// A slot was answered correctly.
    GuessCorrect {
        /// Team that answered.
        team: TeamId,
        /// Slot letter.
        letter: &'static str,
        /// Accepted answer.
        word: String,
    },
    /// A slot was answered incorrectly.
    GuessWrong {
        /// Team that answered.
        team: TeamId,
        /// Slot letter.
        letter: &'static str,
        /// Answer that was expected.
        correct_word: String,
    },
    /// A slot was skipped.
    WordPassed {
        /// Team that passed.
        team: TeamId,
        /// Slot letter.
        letter: &'static str,
    },
    /// The turn moved to another team.
    TurnSwitched {
        /// Team now holding the turn.
        active_team: TeamId,
    },
    /// A clock lost one second.
    ClockTick {
        /// Team whose clock ticked.
        team: TeamId,
        /// Seconds remaining.
        time_left: u32,
    },
    /// Both teams completed.
    MatchEnded {
        /// Winning team.
        winner: TeamId,
    },
    /// The match was cleared.
    MatchReset,
}

/// Errors surfaced by the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Create-match input was rejected; reported to the sender only.
    #[error("{0}")]
    Validation(String),
    /// Lifecycle transition rejected; indicates an inconsistent state.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_SECONDS)
    }
}

impl MatchState {
    /// Empty, idle match whose clocks start at `clock_seconds`.
    pub fn new(clock_seconds: u32) -> Self {
        Self {
            phase: MatchPhase::Idle,
            wheel1: Vec::new(),
            wheel2: Vec::new(),
            active_team: TeamId::One,
            team1: TeamState::new(clock_seconds),
            team2: TeamState::new(clock_seconds),
            winner: None,
            clock_seconds,
            clock_epoch: 0,
        }
    }

    /// True from creation until both teams completed.
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    /// True while the administrator holds both clocks.
    pub fn is_paused(&self) -> bool {
        self.phase.is_paused()
    }

    /// Progress of `team`.
    pub fn team(&self, team: TeamId) -> &TeamState {
        match team {
            TeamId::One => &self.team1,
            TeamId::Two => &self.team2,
        }
    }

    pub(super) fn team_mut(&mut self, team: TeamId) -> &mut TeamState {
        match team {
            TeamId::One => &mut self.team1,
            TeamId::Two => &mut self.team2,
        }
    }

    /// Wheel played by `team`.
    pub fn wheel(&self, team: TeamId) -> &[WordItem] {
        match team {
            TeamId::One => &self.wheel1,
            TeamId::Two => &self.wheel2,
        }
    }

    pub(super) fn wheel_mut(&mut self, team: TeamId) -> &mut Vec<WordItem> {
        match team {
            TeamId::One => &mut self.wheel1,
            TeamId::Two => &mut self.wheel2,
        }
    }

    /// Apply `action`, returning the notices to broadcast.
    ///
    /// The action runs against a copy that replaces the state only on success, so
    /// a failing action never leaves a half-applied match behind. Illegal
    /// gameplay actions succeed with no notices and no change.
    pub fn apply(&mut self, action: MatchAction) -> Result<Vec<MatchNotice>, MatchError> {
        let mut next = self.clone();
        let mut notices = Vec::new();

        match action {
            MatchAction::CreateMatch { wheel1, wheel2 } => {
                next.create_match(wheel1, wheel2, &mut notices)?
            }
            MatchAction::SubmitGuess { team, guess } => {
                next.submit_guess(team, &guess, &mut notices)?
            }
            MatchAction::SubmitPass { team } => next.submit_pass(team, &mut notices)?,
            MatchAction::TogglePause => next.toggle_pause(&mut notices)?,
            MatchAction::ResetMatch => next.reset_match(&mut notices)?,
            MatchAction::NextLetter { team } => next.next_letter(team, &mut notices)?,
            MatchAction::ClockTick { team, epoch } => next.clock_tick(team, epoch, &mut notices)?,
        }

        *self = next;
        Ok(notices)
    }

    fn create_match(
        &mut self,
        wheel1: Vec<WordEntry>,
        wheel2: Vec<WordEntry>,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        let wheel1 = build_wheel(TeamId::One, wheel1)?;
        let wheel2 = build_wheel(TeamId::Two, wheel2)?;
        let phase = self.phase.transition(PhaseEvent::Create)?;

        self.stop_clocks();
        *self = MatchState {
            phase,
            wheel1,
            wheel2,
            clock_epoch: self.clock_epoch,
            ..MatchState::new(self.clock_seconds)
        };
        self.start_clock(TeamId::One);

        notices.push(MatchNotice::FullState);
        Ok(())
    }

    fn submit_guess(
        &mut self,
        team: TeamId,
        guess: &str,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        let Some(index) = self.playable_slot(team) else {
            return Ok(());
        };
        if !self.wheel(team)[index].status.is_unresolved() {
            return self.resync_pointer(team, index, notices);
        }

        let normalized = guess.trim().to_uppercase();
        let slot = &mut self.wheel_mut(team)[index];
        let letter = slot.letter;
        let word = slot.word.clone();
        let hit = normalized == slot.word;
        slot.status = if hit {
            SlotStatus::Correct
        } else {
            SlotStatus::Wrong
        };

        if hit {
            self.team_mut(team).correct += 1;
            notices.push(MatchNotice::GuessCorrect { team, letter, word });
        } else {
            self.team_mut(team).wrong += 1;
            notices.push(MatchNotice::GuessWrong {
                team,
                letter,
                correct_word: word,
            });
        }

        match self.advance_pointer(team, index) {
            None => self.complete_team(team, notices),
            Some(_) if !hit => {
                self.switch_turn(notices);
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }

    fn submit_pass(
        &mut self,
        team: TeamId,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        let Some(index) = self.playable_slot(team) else {
            return Ok(());
        };
        if !self.wheel(team)[index].status.is_unresolved() {
            return self.resync_pointer(team, index, notices);
        }

        let slot = &mut self.wheel_mut(team)[index];
        slot.status = SlotStatus::Passed;
        let letter = slot.letter;
        notices.push(MatchNotice::WordPassed { team, letter });

        match self.advance_pointer(team, index) {
            None => self.complete_team(team, notices),
            Some(_) => {
                self.switch_turn(notices);
                Ok(())
            }
        }
    }

    fn toggle_pause(&mut self, notices: &mut Vec<MatchNotice>) -> Result<(), MatchError> {
        match self.phase {
            MatchPhase::Active => {
                self.phase = self.phase.transition(PhaseEvent::Pause)?;
                self.stop_clocks();
            }
            MatchPhase::Paused => {
                self.phase = self.phase.transition(PhaseEvent::Resume)?;
                self.start_clock(self.active_team);
            }
            MatchPhase::Idle | MatchPhase::Ended => return Ok(()),
        }

        notices.push(MatchNotice::FullState);
        Ok(())
    }

    fn reset_match(&mut self, notices: &mut Vec<MatchNotice>) -> Result<(), MatchError> {
        let phase = self.phase.transition(PhaseEvent::Reset)?;
        self.stop_clocks();
        *self = MatchState {
            phase,
            clock_epoch: self.clock_epoch,
            ..MatchState::new(self.clock_seconds)
        };

        notices.push(MatchNotice::MatchReset);
        Ok(())
    }

    fn next_letter(
        &mut self,
        team: TeamId,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        if !self.holds_turn(team) || self.wheel(team).is_empty() {
            return Ok(());
        }

        let last = self.wheel(team).len() - 1;
        self.resync_pointer(team, last, notices)
    }

    fn clock_tick(
        &mut self,
        team: TeamId,
        epoch: u64,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        if self.phase != MatchPhase::Active
            || self.clock_epoch != epoch
            || !self.team(team).is_timer_running
        {
            return Ok(());
        }

        let state = self.team_mut(team);
        state.time_left = state.time_left.saturating_sub(1);
        let time_left = state.time_left;
        notices.push(MatchNotice::ClockTick { team, time_left });

        if time_left == 0 {
            self.complete_team(team, notices)?;
        }
        Ok(())
    }

    /// Move the pointer to the first unresolved slot after `from`, completing the
    /// team when none is left.
    fn resync_pointer(
        &mut self,
        team: TeamId,
        from: usize,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        let next = self.advance_pointer(team, from);
        notices.push(MatchNotice::FullState);
        match next {
            Some(_) => Ok(()),
            None => self.complete_team(team, notices),
        }
    }

    fn holds_turn(&self, team: TeamId) -> bool {
        self.phase == MatchPhase::Active && self.active_team == team
    }

    /// Index of the slot `team` may act on right now, if any.
    fn playable_slot(&self, team: TeamId) -> Option<usize> {
        if !self.holds_turn(team) {
            return None;
        }
        self.team(team)
            .current_letter_index
            .filter(|index| *index < self.wheel(team).len())
    }
}

/// Map raw entries onto the letter set, keeping the first usable ones.
fn build_wheel(team: TeamId, entries: Vec<WordEntry>) -> Result<Vec<WordItem>, MatchError> {
    let usable: Vec<WordEntry> = entries
        .into_iter()
        .filter(WordEntry::is_usable)
        .take(WHEEL_SIZE)
        .collect();

    if usable.len() < WHEEL_SIZE {
        return Err(MatchError::Validation(format!(
            "wheel {} needs at least {WHEEL_SIZE} entries with a word and a definition (got {})",
            u8::from(team),
            usable.len()
        )));
    }

    Ok(LETTERS
        .into_iter()
        .zip(usable)
        .map(|(letter, entry)| WordItem {
            letter,
            word: entry.word.trim().to_uppercase(),
            definition: entry.definition.trim().to_string(),
            kind: entry.kind.unwrap_or_default(),
            status: SlotStatus::Pending,
        })
        .collect())
}

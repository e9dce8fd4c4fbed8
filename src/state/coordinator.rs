//! Turn, clock and completion rules layered on top of [`MatchState`].

use std::cmp::Ordering;

use crate::state::{
    match_state::{MatchError, MatchNotice, MatchState, TeamId, TeamState, WordItem},
    state_machine::{MatchPhase, PhaseEvent},
};

/// Find the first unresolved slot after `from`, wrapping around the wheel.
///
/// The scan covers `from + 1 ..= end`, then `0 ..= from`, so a passed slot comes
/// back once every other slot has been visited. Returns `None` when every slot is
/// correct or wrong.
pub fn find_next_unresolved(wheel: &[WordItem], from: usize) -> Option<usize> {
    let len = wheel.len();
    (1..=len)
        .map(|step| (from + step) % len)
        .find(|index| wheel[*index].status.is_unresolved())
}

/// Pick the winner between two completed teams.
///
/// More correct answers wins; a tie goes to the team with at least as much time
/// left, and a full tie goes to team 1.
pub fn decide_winner(team1: &TeamState, team2: &TeamState) -> TeamId {
    match team1.correct.cmp(&team2.correct) {
        Ordering::Greater => TeamId::One,
        Ordering::Less => TeamId::Two,
        Ordering::Equal if team1.time_left >= team2.time_left => TeamId::One,
        Ordering::Equal => TeamId::Two,
    }
}

impl MatchState {
    /// Clock that should currently be counting down, with the epoch its ticks must carry.
    pub fn running_clock(&self) -> Option<(TeamId, u64)> {
        if self.phase != MatchPhase::Active {
            return None;
        }
        [TeamId::One, TeamId::Two]
            .into_iter()
            .find(|team| self.team(*team).is_timer_running)
            .map(|team| (team, self.clock_epoch))
    }

    /// Move the team pointer past `from`, returning the new slot.
    pub(super) fn advance_pointer(&mut self, team: TeamId, from: usize) -> Option<usize> {
        let next = find_next_unresolved(self.wheel(team), from);
        self.team_mut(team).current_letter_index = next;
        next
    }

    /// Start the clock of `team`, stopping any other first.
    pub(super) fn start_clock(&mut self, team: TeamId) {
        self.stop_clocks();
        self.clock_epoch += 1;
        self.team_mut(team).is_timer_running = true;
    }

    /// Stop both clocks. Safe to call when nothing runs.
    pub(super) fn stop_clocks(&mut self) {
        self.team1.is_timer_running = false;
        self.team2.is_timer_running = false;
    }

    /// Hand the turn to the other team and start its clock.
    ///
    /// A completed team never receives the turn; the current team keeps playing
    /// on its running clock instead.
    pub(super) fn switch_turn(&mut self, notices: &mut Vec<MatchNotice>) {
        let next = self.active_team.other();
        if self.team(next).completed {
            return;
        }

        self.stop_clocks();
        self.active_team = next;
        notices.push(MatchNotice::TurnSwitched { active_team: next });
        if self.phase == MatchPhase::Active {
            self.start_clock(next);
        }
    }

    /// Mark `team` as completed, then either end the match or hand the turn over.
    pub(super) fn complete_team(
        &mut self,
        team: TeamId,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        let state = self.team_mut(team);
        state.completed = true;
        state.is_timer_running = false;

        if self.team(team.other()).completed {
            return self.evaluate_winner(notices);
        }
        if self.active_team == team {
            self.switch_turn(notices);
        }
        Ok(())
    }

    /// Decide the winner once both teams completed.
    pub(super) fn evaluate_winner(
        &mut self,
        notices: &mut Vec<MatchNotice>,
    ) -> Result<(), MatchError> {
        if !(self.team1.completed && self.team2.completed) {
            return Ok(());
        }

        self.stop_clocks();
        self.phase = self.phase.transition(PhaseEvent::Finish)?;
        let winner = decide_winner(&self.team1, &self.team2);
        self.winner = Some(winner);
        notices.push(MatchNotice::MatchEnded { winner });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::match_state::{SlotStatus, WordKind, tests::created};

    fn wheel(statuses: &[SlotStatus]) -> Vec<WordItem> {
        statuses
            .iter()
            .map(|status| WordItem {
                letter: "A",
                word: "WORD".into(),
                definition: "clue".into(),
                kind: WordKind::StartsWith,
                status: *status,
            })
            .collect()
    }

    fn team(correct: u32, time_left: u32) -> TeamState {
        TeamState {
            correct,
            time_left,
            completed: true,
            ..TeamState::new(300)
        }
    }

    #[test]
    fn next_unresolved_scans_forward() {
        let slots = wheel(&[
            SlotStatus::Pending,
            SlotStatus::Correct,
            SlotStatus::Wrong,
            SlotStatus::Passed,
        ]);
        assert_eq!(find_next_unresolved(&slots, 0), Some(3));
    }

    #[test]
    fn next_unresolved_wraps_from_last_slot() {
        let mut statuses = vec![SlotStatus::Pending; 27];
        statuses[26] = SlotStatus::Correct;
        let slots = wheel(&statuses);

        assert_eq!(find_next_unresolved(&slots, 26), Some(0));
    }

    #[test]
    fn next_unresolved_returns_to_start_slot_last() {
        let mut statuses = vec![SlotStatus::Correct; 27];
        statuses[4] = SlotStatus::Passed;
        let slots = wheel(&statuses);

        assert_eq!(find_next_unresolved(&slots, 4), Some(4));
        assert_eq!(find_next_unresolved(&slots, 10), Some(4));
    }

    #[test]
    fn next_unresolved_is_none_when_all_resolved() {
        let slots = wheel(&[SlotStatus::Correct, SlotStatus::Wrong, SlotStatus::Correct]);
        assert_eq!(find_next_unresolved(&slots, 1), None);
        assert_eq!(find_next_unresolved(&[], 0), None);
    }

    #[test]
    fn winner_has_more_correct_answers() {
        assert_eq!(decide_winner(&team(10, 0), &team(9, 200)), TeamId::One);
        assert_eq!(decide_winner(&team(3, 200), &team(9, 0)), TeamId::Two);
    }

    #[test]
    fn tie_breaks_on_time_left_then_team_one() {
        assert_eq!(decide_winner(&team(5, 10), &team(5, 20)), TeamId::Two);
        assert_eq!(decide_winner(&team(5, 20), &team(5, 10)), TeamId::One);
        assert_eq!(decide_winner(&team(5, 10), &team(5, 10)), TeamId::One);
    }

    #[test]
    fn winner_evaluation_waits_for_both_teams() {
        let mut state = created();
        let mut notices = Vec::new();

        state.complete_team(TeamId::One, &mut notices).unwrap();
        assert!(state.winner.is_none());
        assert!(state.is_active());

        state.complete_team(TeamId::Two, &mut notices).unwrap();
        assert_eq!(state.winner, Some(TeamId::One));
        assert!(!state.is_active());
        assert_eq!(state.running_clock(), None);
        assert_eq!(
            notices,
            vec![
                MatchNotice::TurnSwitched {
                    active_team: TeamId::Two
                },
                MatchNotice::MatchEnded {
                    winner: TeamId::One
                },
            ]
        );
    }

    #[test]
    fn only_one_clock_runs_while_active() {
        let mut state = created();
        assert_eq!(state.running_clock(), Some((TeamId::One, state.clock_epoch)));

        let mut notices = Vec::new();
        state.switch_turn(&mut notices);
        assert_eq!(state.running_clock(), Some((TeamId::Two, state.clock_epoch)));
        assert!(!state.team1.is_timer_running);

        state.stop_clocks();
        state.stop_clocks();
        assert_eq!(state.running_clock(), None);
    }
}

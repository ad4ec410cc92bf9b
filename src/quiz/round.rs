//! Round timer and scorer
//!
//! A [`Round`] drives a single question: it counts the time limit down in
//! fixed ticks, accepts at most one submission, computes the points of that
//! submission and, once the countdown runs out, reveals the answer in
//! stages before signalling the sequencer that the round is over.
//!
//! Every alarm a round arms is tagged with its [`RoundId`]. Alarms tagged
//! with another round are never acted upon.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::Duration;

use crate::{
    config::Timing,
    constants::{scoring, timing},
    scheduler::{Scheduler, TimerScope},
    scorecard::{RoundOutcome, ScoreBreakdown},
    session::Tunnel,
};

use super::{question::Question, reveal};

/// Identity of a round within a session
///
/// The generation changes whenever the session restarts or exits, so two
/// rounds on the same question index remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId {
    /// Index of the question in the session
    pub index: usize,
    /// Session generation the round belongs to
    pub generation: u64,
}

/// Observable state of a round
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// The choice currently selected, if any
    pub selected_answer: Option<String>,
    /// Time left on the countdown
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub remaining: Duration,
    /// Whether the countdown is still ticking
    pub timer_running: bool,
    /// Whether the selected answer was submitted
    pub submitted: bool,
    /// Whether the countdown ran out
    pub timer_expired: bool,
    /// Whether the correct answer has been revealed
    pub answer_revealed: bool,
    /// Points earned for correctness
    pub awarded_base: u64,
    /// Points earned for speed
    pub awarded_bonus: u64,
    /// Progress of the reveal, from 0 to `REVEAL_STAGES`
    pub reveal_stage: u8,
}

impl RoundState {
    /// Creates the state of a round that is about to start
    pub fn new(time_limit: Duration) -> Self {
        Self {
            selected_answer: None,
            remaining: time_limit,
            timer_running: true,
            submitted: false,
            timer_expired: false,
            answer_revealed: false,
            awarded_base: 0,
            awarded_bonus: 0,
            reveal_stage: 0,
        }
    }
}

/// Update messages sent while a round is running
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateMessage {
    /// Time left after a tick
    Countdown {
        /// Remaining time
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
    },
    /// The player changed their selection
    AnswerSelected(String),
    /// The selection was submitted and locked in
    AnswerSubmitted(String),
    /// The correct answer is shown
    AnswerRevealed {
        /// The correct choice
        correct_answer: String,
        /// The submitted choice, if any
        submitted_answer: Option<String>,
        /// Points earned for correctness
        awarded_base: u64,
        /// Points earned for speed
        awarded_bonus: u64,
    },
    /// A reveal stage was reached
    RevealProgress(u8),
}

/// Alarms armed by a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Next countdown tick
    Tick {
        /// Round that armed the alarm
        round: RoundId,
    },
    /// Advances the reveal to `stage`
    RevealStage {
        /// Round that armed the alarm
        round: RoundId,
        /// Stage to reach
        stage: u8,
    },
    /// The reveal is complete
    Finish {
        /// Round that armed the alarm
        round: RoundId,
    },
}

impl AlarmMessage {
    /// Returns the round that armed the alarm
    pub fn round(&self) -> RoundId {
        match self {
            Self::Tick { round } | Self::RevealStage { round, .. } | Self::Finish { round } => *round,
        }
    }
}

/// Synchronization messages describing a round from scratch
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncMessage {
    /// The round accepts answers
    AwaitingAnswer {
        /// Index of the question
        index: usize,
        /// Number of questions in the session
        count: usize,
        /// The question text
        question: String,
        /// The answer choices
        choices: Vec<String>,
        /// Time left on the countdown
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
        /// The choice currently selected
        selected_answer: Option<String>,
        /// Whether the selection is locked in
        submitted: bool,
    },
    /// The answer is being revealed
    Revealing {
        /// Index of the question
        index: usize,
        /// Number of questions in the session
        count: usize,
        /// The question text
        question: String,
        /// The answer choices
        choices: Vec<String>,
        /// The correct choice
        correct_answer: String,
        /// The submitted choice, if any
        submitted_answer: Option<String>,
        /// Points earned for correctness
        awarded_base: u64,
        /// Points earned for speed
        awarded_bonus: u64,
        /// Reveal progress
        reveal_stage: u8,
    },
}

/// Computes the speed bonus of a correct answer
///
/// The bonus is the fraction of the time limit left, scaled to
/// `MAX_TIME_BONUS` and rounded down. Integer arithmetic keeps exact
/// fractions exact: half of the time left yields exactly half the bonus.
///
/// # Arguments
///
/// * `remaining` - Time left when the answer was submitted
/// * `time_limit` - Full time available for the question
///
/// # Returns
///
/// A bonus in `0..=MAX_TIME_BONUS`
pub fn calculate_time_bonus(remaining: Duration, time_limit: Duration) -> u64 {
    if time_limit.is_zero() {
        return 0;
    }
    let remaining = remaining.min(time_limit);
    let bonus = remaining.as_nanos() * u128::from(scoring::MAX_TIME_BONUS) / time_limit.as_nanos();
    u64::try_from(bonus).map_or(scoring::MAX_TIME_BONUS, |b| b.min(scoring::MAX_TIME_BONUS))
}

/// A single question being played
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    id: RoundId,
    question: Question,
    state: RoundState,
    timing: Timing,
    timers: TimerScope,
    finished: bool,
}

impl Round {
    /// Creates a round that has not started ticking yet
    pub fn new(id: RoundId, question: Question, timing: Timing) -> Self {
        Self {
            id,
            state: RoundState::new(question.time_limit),
            question,
            timing,
            timers: TimerScope::default(),
            finished: false,
        }
    }

    /// Returns the identity of this round
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// Returns the question being played
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Returns the observable state
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Returns `true` once the reveal has completed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Starts the countdown
    pub fn start<S: Scheduler>(&mut self, scheduler: &mut S) {
        if self.state.timer_running && self.timers.is_empty() {
            self.arm_tick(scheduler);
        }
    }

    fn arm_tick<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.timers.arm_ticker(
            scheduler,
            AlarmMessage::Tick { round: self.id }.into(),
            self.timing.tick_interval,
        );
    }

    /// Selects a choice
    ///
    /// Has no effect once the answer was submitted or revealed, or if
    /// `choice` is not one of the question's choices.
    ///
    /// # Returns
    ///
    /// `true` if the selection changed
    pub fn select_answer<T: Tunnel>(&mut self, choice: &str, tunnel: &T) -> bool {
        if self.state.submitted || self.state.answer_revealed || !self.question.is_choice(choice) {
            return false;
        }
        if self.state.selected_answer.as_deref() == Some(choice) {
            return false;
        }

        self.state.selected_answer = Some(choice.to_owned());
        tunnel.send_message(&UpdateMessage::AnswerSelected(choice.to_owned()).into());
        true
    }

    /// Submits the selected choice
    ///
    /// Only the first submission of a selected choice counts, and nothing
    /// can be submitted after the answer was revealed. The answer is
    /// revealed right away when no time is left; otherwise the reveal waits
    /// for the countdown to run out.
    ///
    /// # Returns
    ///
    /// The points earned, or `None` if the submission was ignored
    pub fn submit_answer<S: Scheduler, T: Tunnel>(
        &mut self,
        scheduler: &mut S,
        tunnel: &T,
    ) -> Option<ScoreBreakdown> {
        if self.state.submitted || self.state.answer_revealed {
            return None;
        }
        let selected = self.state.selected_answer.clone()?;

        self.state.submitted = true;
        if self.question.is_correct(&selected) {
            self.state.awarded_base = scoring::BASE_POINTS;
            self.state.awarded_bonus =
                calculate_time_bonus(self.state.remaining, self.question.time_limit);
        }
        tunnel.send_message(&UpdateMessage::AnswerSubmitted(selected).into());

        if self.state.remaining.is_zero() {
            self.reveal(scheduler, tunnel);
        }

        Some(ScoreBreakdown {
            base: self.state.awarded_base,
            bonus: self.state.awarded_bonus,
        })
    }

    /// Advances the countdown by one tick
    fn tick<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        if !self.state.timer_running {
            return;
        }

        let remaining = self.state.remaining.saturating_sub(self.timing.tick_interval);
        if remaining <= timing::EXPIRY_EPSILON {
            self.state.remaining = Duration::ZERO;
            self.state.timer_running = false;
            self.state.timer_expired = true;
            self.timers.stop_ticker(scheduler);
            tunnel.send_message(
                &UpdateMessage::Countdown {
                    remaining: Duration::ZERO,
                }
                .into(),
            );
            self.reveal(scheduler, tunnel);
        } else {
            self.state.remaining = remaining;
            self.arm_tick(scheduler);
            tunnel.send_message(&UpdateMessage::Countdown { remaining }.into());
        }
    }

    /// Reveals the answer and arms the reveal stages
    fn reveal<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        if self.state.answer_revealed {
            return;
        }
        self.state.answer_revealed = true;

        tunnel.send_message(
            &UpdateMessage::AnswerRevealed {
                correct_answer: self.question.correct_answer.clone(),
                submitted_answer: self.submitted_answer().map(ToOwned::to_owned),
                awarded_base: self.state.awarded_base,
                awarded_bonus: self.state.awarded_bonus,
            }
            .into(),
        );

        for (stage, delay) in reveal::stage_delays(&self.timing) {
            self.timers.arm_once(
                scheduler,
                AlarmMessage::RevealStage {
                    round: self.id,
                    stage,
                }
                .into(),
                delay,
            );
        }
        self.timers.arm_once(
            scheduler,
            AlarmMessage::Finish { round: self.id }.into(),
            reveal::finish_delay(&self.timing),
        );
    }

    fn submitted_answer(&self) -> Option<&str> {
        if self.state.submitted {
            self.state.selected_answer.as_deref()
        } else {
            None
        }
    }

    /// Processes an alarm armed by this round
    ///
    /// # Returns
    ///
    /// `true` if the alarm completed the reveal and the sequencer should
    /// move on
    pub fn receive_alarm<S: Scheduler, T: Tunnel>(
        &mut self,
        message: AlarmMessage,
        scheduler: &mut S,
        tunnel: &T,
    ) -> bool {
        if message.round() != self.id {
            return false;
        }

        match message {
            AlarmMessage::Tick { .. } => {
                self.tick(scheduler, tunnel);
                false
            }
            AlarmMessage::RevealStage { stage, .. } => {
                if self.state.answer_revealed
                    && stage > self.state.reveal_stage
                    && stage <= timing::REVEAL_STAGES
                {
                    self.state.reveal_stage = stage;
                    tunnel.send_message(&UpdateMessage::RevealProgress(stage).into());
                }
                false
            }
            AlarmMessage::Finish { .. } => {
                if !self.state.answer_revealed || self.finished {
                    return false;
                }
                self.state.reveal_stage = timing::REVEAL_STAGES;
                self.finished = true;
                true
            }
        }
    }

    /// Cancels every timer the round still holds
    pub fn release_timers<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.timers.release(scheduler);
    }

    /// Summarizes the round for the scorecard
    pub fn outcome(&self) -> RoundOutcome {
        RoundOutcome {
            question_id: self.question.id.clone(),
            submitted_answer: self.submitted_answer().map(ToOwned::to_owned),
            correct: self.state.awarded_base > 0,
            base: self.state.awarded_base,
            bonus: self.state.awarded_bonus,
        }
    }

    /// Returns the message necessary to synchronize a viewer with this round
    ///
    /// # Arguments
    ///
    /// * `count` - Number of questions in the session
    pub fn state_message(&self, count: usize) -> SyncMessage {
        let choices = self.question.choices.to_vec();
        if self.state.answer_revealed {
            SyncMessage::Revealing {
                index: self.id.index,
                count,
                question: self.question.text.clone(),
                choices,
                correct_answer: self.question.correct_answer.clone(),
                submitted_answer: self.submitted_answer().map(ToOwned::to_owned),
                awarded_base: self.state.awarded_base,
                awarded_bonus: self.state.awarded_bonus,
                reveal_stage: self.state.reveal_stage,
            }
        } else {
            SyncMessage::AwaitingAnswer {
                index: self.id.index,
                count,
                question: self.question.text.clone(),
                choices,
                remaining: self.state.remaining,
                selected_answer: self.state.selected_answer.clone(),
                submitted: self.state.submitted,
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        quiz::question::tests::capital_question, scheduler::ManualScheduler,
        session::tests::MockTunnel,
    };

    const ROUND: RoundId = RoundId {
        index: 0,
        generation: 1,
    };

    fn started_round(scheduler: &mut ManualScheduler) -> Round {
        let mut round = Round::new(ROUND, capital_question(), Timing::default());
        round.start(scheduler);
        round
    }

    /// Delivers every alarm due up to `deadline`, returning `true` if the round finished
    fn run_until(
        round: &mut Round,
        scheduler: &mut ManualScheduler,
        tunnel: &MockTunnel,
        deadline: Duration,
    ) -> bool {
        let mut finished = false;
        while let Some(alarm) = scheduler.pop_due(deadline) {
            if let crate::AlarmMessage::Round(alarm) = alarm {
                finished |= round.receive_alarm(alarm, scheduler, tunnel);
            }
        }
        scheduler.advance_to(deadline);
        finished
    }

    #[test]
    fn test_calculate_time_bonus() {
        let limit = Duration::from_secs(10);
        assert_eq!(calculate_time_bonus(Duration::from_secs(5), limit), 200);
        assert_eq!(calculate_time_bonus(limit, limit), 400);
        assert_eq!(calculate_time_bonus(Duration::ZERO, limit), 0);
        assert_eq!(calculate_time_bonus(Duration::from_millis(9_999), limit), 399);
        assert_eq!(calculate_time_bonus(Duration::from_secs(20), limit), 400);
        assert_eq!(calculate_time_bonus(Duration::from_secs(1), Duration::ZERO), 0);
    }

    #[test]
    fn test_new_round_state() {
        let state = RoundState::new(Duration::from_secs(10));
        assert_eq!(state.remaining, Duration::from_secs(10));
        assert!(state.timer_running);
        assert!(!state.submitted && !state.timer_expired && !state.answer_revealed);
        assert_eq!(state.reveal_stage, 0);
        assert_eq!(state.selected_answer, None);
    }

    #[test]
    fn test_correct_answer_at_half_time_scores_800() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(5));
        assert_eq!(round.state().remaining, Duration::from_secs(5));

        assert!(round.select_answer("Paris", &tunnel));
        let score = round.submit_answer(&mut scheduler, &tunnel).unwrap();
        assert_eq!(score.base, 600);
        assert_eq!(score.bonus, 200);
        assert_eq!(score.total(), 800);

        // the reveal waits for the countdown
        assert!(!round.state().answer_revealed);
        assert!(round.state().timer_running);
    }

    #[test]
    fn test_incorrect_answer_scores_nothing() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(1));
        round.select_answer("Berlin", &tunnel);
        let score = round.submit_answer(&mut scheduler, &tunnel).unwrap();

        assert_eq!(score.total(), 0);
        assert_eq!(round.state().awarded_bonus, 0);
        assert!(!round.outcome().correct);
    }

    #[test]
    fn test_submit_without_selection_is_ignored() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        assert!(round.submit_answer(&mut scheduler, &tunnel).is_none());
        assert!(!round.state().submitted);
    }

    #[test]
    fn test_double_submit_has_no_effect() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        round.select_answer("Paris", &tunnel);
        assert!(round.submit_answer(&mut scheduler, &tunnel).is_some());
        let before = round.state().clone();

        assert!(round.submit_answer(&mut scheduler, &tunnel).is_none());
        assert_eq!(round.state(), &before);
    }

    #[test]
    fn test_selection_locked_after_submit() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        round.select_answer("Paris", &tunnel);
        round.submit_answer(&mut scheduler, &tunnel);

        assert!(!round.select_answer("Madrid", &tunnel));
        assert_eq!(round.state().selected_answer.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_select_unknown_choice_is_ignored() {
        let tunnel = MockTunnel::new();
        let mut round = Round::new(ROUND, capital_question(), Timing::default());

        assert!(!round.select_answer("Rome", &tunnel));
        assert!(round.state().selected_answer.is_none());
        assert!(tunnel.messages().is_empty());
    }

    #[test]
    fn test_reselect_before_submit() {
        let tunnel = MockTunnel::new();
        let mut round = Round::new(ROUND, capital_question(), Timing::default());

        assert!(round.select_answer("Berlin", &tunnel));
        assert!(round.select_answer("Paris", &tunnel));
        assert!(!round.select_answer("Paris", &tunnel));
        assert_eq!(round.state().selected_answer.as_deref(), Some("Paris"));
    }

    #[test]
    fn test_expiry_without_selection_reveals() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(10));

        let state = round.state();
        assert_eq!(state.remaining, Duration::ZERO);
        assert!(!state.timer_running);
        assert!(state.timer_expired);
        assert!(state.answer_revealed);
        assert_eq!(state.awarded_base + state.awarded_bonus, 0);
        assert!(tunnel.messages().iter().any(|m| matches!(
            m,
            crate::UpdateMessage::Round(UpdateMessage::AnswerRevealed { correct_answer, submitted_answer: None, .. })
                if correct_answer == "Paris"
        )));
    }

    #[test]
    fn test_expiry_locks_round() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        round.select_answer("Paris", &tunnel);
        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(10));

        assert!(round.submit_answer(&mut scheduler, &tunnel).is_none());
        assert!(!round.select_answer("Berlin", &tunnel));
        assert_eq!(round.outcome().base, 0);
    }

    #[test]
    fn test_countdown_ticks_every_interval() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_millis(350));
        assert_eq!(round.state().remaining, Duration::from_millis(9_700));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_reveal_stages_are_monotonic_then_finish() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        let mut stages = Vec::new();
        let mut finished_at = None;
        let mut now = Duration::ZERO;
        while let Some(alarm) = scheduler.pop_due(Duration::from_secs(30)) {
            now = scheduler.now();
            if let crate::AlarmMessage::Round(alarm) = alarm {
                if round.receive_alarm(alarm, &mut scheduler, &tunnel) {
                    finished_at = Some(now);
                }
            }
            stages.push(round.state().reveal_stage);
        }

        assert!(stages.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(round.state().reveal_stage, 3);
        assert!(round.is_finished());
        assert_eq!(finished_at, Some(Duration::from_secs(18)));
        assert_eq!(now, Duration::from_secs(18));
    }

    #[test]
    fn test_reveal_progress_messages() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(14));
        assert_eq!(round.state().reveal_stage, 2);

        let progress: Vec<u8> = tunnel
            .messages()
            .iter()
            .filter_map(|m| match m {
                crate::UpdateMessage::Round(UpdateMessage::RevealProgress(stage)) => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![1, 2]);
    }

    #[test]
    fn test_out_of_order_stage_alarm_does_not_regress() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);
        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(14));

        round.receive_alarm(
            AlarmMessage::RevealStage {
                round: ROUND,
                stage: 1,
            },
            &mut scheduler,
            &tunnel,
        );
        assert_eq!(round.state().reveal_stage, 2);
    }

    #[test]
    fn test_alarm_for_other_round_is_ignored() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        let other = RoundId {
            index: 0,
            generation: 0,
        };
        assert!(!round.receive_alarm(AlarmMessage::Finish { round: other }, &mut scheduler, &tunnel));
        round.receive_alarm(AlarmMessage::Tick { round: other }, &mut scheduler, &tunnel);
        assert_eq!(round.state().remaining, Duration::from_secs(10));
    }

    #[test]
    fn test_finish_before_reveal_is_ignored() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        assert!(!round.receive_alarm(AlarmMessage::Finish { round: ROUND }, &mut scheduler, &tunnel));
        assert!(!round.is_finished());
    }

    #[test]
    fn test_submit_with_no_time_left_reveals_immediately() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = Round::new(ROUND, capital_question(), Timing::default());
        round.state.remaining = Duration::ZERO;
        round.state.timer_running = false;

        round.select_answer("Paris", &tunnel);
        let score = round.submit_answer(&mut scheduler, &tunnel).unwrap();

        assert_eq!(score.total(), 600);
        assert!(round.state().answer_revealed);
        assert_eq!(scheduler.pending(), 4);
    }

    #[test]
    fn test_release_timers() {
        let mut scheduler = ManualScheduler::new();
        let mut round = started_round(&mut scheduler);
        assert_eq!(scheduler.pending(), 1);

        round.release_timers(&mut scheduler);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_state_message_phases() {
        let mut scheduler = ManualScheduler::new();
        let tunnel = MockTunnel::new();
        let mut round = started_round(&mut scheduler);

        assert!(matches!(
            round.state_message(3),
            SyncMessage::AwaitingAnswer { index: 0, count: 3, .. }
        ));

        run_until(&mut round, &mut scheduler, &tunnel, Duration::from_secs(10));
        assert!(matches!(
            round.state_message(3),
            SyncMessage::Revealing { ref correct_answer, .. } if correct_answer == "Paris"
        ));
    }
}

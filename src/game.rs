//! Session flow and question sequencing
//!
//! This module contains the [`Session`], which owns the question list of a
//! quiz, plays its questions one after another through [`Round`]s, keeps
//! the running score and decides when the quiz is completed. Every
//! transition is driven either by a player [`Command`] or by an alarm that
//! the session itself armed through a [`Scheduler`].

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::Duration;

use crate::{
    config::Timing,
    quiz::{
        config::{Mode, QuestionSet},
        question::Question,
        round::{Round, RoundId},
    },
    room::RoomMetadata,
    scheduler::{Scheduler, TimerScope},
    scorecard::{ScoreBreakdown, Scorecard, Summary},
    session::Tunnel,
};

/// Represents the current phase of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum State {
    /// Waiting for the player to start
    Lobby,
    /// Counting down before the first question (seconds left)
    Countdown(u8),
    /// Playing a question
    Round(Box<Round>),
    /// Every question was played; the score is final until a restart
    Completed,
    /// The session was started without any question
    NoQuestions,
    /// The session was left; nothing happens anymore
    Exited,
}

/// Commands issued by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Leaves the lobby
    Start,
    /// Selects one of the current choices
    Select(String),
    /// Locks in the selected choice
    Submit,
    /// Plays the quiz again after completion
    Restart,
    /// Requests a full state synchronization
    Sync,
    /// Leaves the session
    Exit,
}

/// Update messages sent by the session
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateMessage {
    /// Seconds left before the first question
    Countdown(u8),
    /// A new question is being played
    QuestionAnnouncement {
        /// Index of the question
        index: usize,
        /// Number of questions in the session
        count: usize,
        /// The question text
        question: String,
        /// The answer choices
        choices: Vec<String>,
        /// Time available to answer
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        time_limit: Duration,
    },
    /// A submission was scored
    Score {
        /// Points earned by the submission
        awarded: ScoreBreakdown,
        /// Score over the whole session so far
        cumulative_score: u64,
    },
    /// The last question is done
    Completed(Summary),
    /// There is nothing to play
    NoQuestions,
    /// The room metadata changed
    Room(RoomMetadata),
}

/// Synchronization messages describing the session from scratch
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncMessage {
    /// Waiting for the player to start
    Lobby {
        /// Title of the question set
        title: String,
        /// Number of questions
        count: usize,
        /// The room being played, if any
        room: Option<RoomMetadata>,
    },
    /// Seconds left before the first question
    Countdown(u8),
    /// The final summary
    Completed(Summary),
    /// There is nothing to play
    NoQuestions,
    /// The session was left
    Exited,
}

/// Alarms armed by the session itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Next step of the start countdown
    StartCountdown {
        /// Session generation that armed the alarm
        generation: u64,
        /// Seconds left once the alarm fires
        remaining: u8,
    },
}

/// A quiz being played by one player
#[derive(Debug, Serialize, Deserialize)]
pub struct Session {
    /// Where the questions come from
    mode: Mode,
    /// The questions, in play order
    questions: QuestionSet,
    /// Index of the current question; equals the question count once completed
    current_index: usize,
    /// Points earned so far
    cumulative_score: u64,
    /// Changes on every restart and exit; stamps all alarms
    generation: u64,
    /// Round and reveal pacing
    timing: Timing,
    /// Outcomes of finished rounds
    scorecard: Scorecard,
    /// Start countdown timers
    timers: TimerScope,
    /// Latest metadata of the room being played
    room: Option<RoomMetadata>,
    /// Current phase
    state: State,
}

impl Session {
    /// Creates a session waiting in the lobby
    ///
    /// `timing` is trusted as is; a zero tick interval never lets a round
    /// expire. Use [`Session::try_new`] for timing that was not validated.
    ///
    /// # Arguments
    ///
    /// * `questions` - The questions to play
    /// * `mode` - Where the questions come from
    /// * `timing` - Round and reveal pacing
    pub fn new(questions: QuestionSet, mode: Mode, timing: Timing) -> Self {
        Self {
            mode,
            questions,
            current_index: 0,
            cumulative_score: 0,
            generation: 0,
            timing,
            scorecard: Scorecard::default(),
            timers: TimerScope::default(),
            room: None,
            state: State::Lobby,
        }
    }

    /// Creates a session waiting in the lobby after checking `timing`
    ///
    /// # Errors
    ///
    /// Returns the validation report if a delay of `timing` is out of
    /// bounds.
    pub fn try_new(questions: QuestionSet, mode: Mode, timing: Timing) -> Result<Self, garde::Report> {
        timing.validate()?;
        Ok(Self::new(questions, mode, timing))
    }

    /// Creates a session playing a single fixed question
    pub fn fixed(question: Question, timing: Timing) -> Self {
        Self::new(QuestionSet::new("Quiz", vec![question]), Mode::Static, timing)
    }

    /// Attaches the metadata of the room being played
    #[must_use]
    pub fn with_room(mut self, room: RoomMetadata) -> Self {
        self.room = Some(room);
        self
    }

    /// Returns the current phase
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns where the questions come from
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Returns the index of the current question
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Returns the number of questions
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Returns the points earned so far
    pub fn cumulative_score(&self) -> u64 {
        self.cumulative_score
    }

    /// Returns the outcomes of finished rounds
    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    /// Returns the latest room metadata
    pub fn room(&self) -> Option<&RoomMetadata> {
        self.room.as_ref()
    }

    /// Returns the question at the current index, if any
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Returns the round being played, if any
    pub fn current_round(&self) -> Option<&Round> {
        match &self.state {
            State::Round(round) => Some(round),
            _ => None,
        }
    }

    /// Returns `true` once every question was played
    pub fn is_completed(&self) -> bool {
        matches!(self.state, State::Completed)
    }

    /// Leaves the lobby
    ///
    /// Plays the start countdown if the mode has one, then the first
    /// question. A session without questions moves to
    /// [`State::NoQuestions`] instead.
    ///
    /// # Type Parameters
    ///
    /// * `S` - Scheduler receiving the session's alarms
    /// * `T` - Channel to the presentation layer
    pub fn start<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) {
        if !matches!(self.state, State::Lobby) {
            return;
        }

        if self.questions.is_empty() {
            tracing::info!("session started without questions");
            self.state = State::NoQuestions;
            tunnel.send_message(&UpdateMessage::NoQuestions.into());
            return;
        }

        match self.mode.start_countdown(&self.timing) {
            0 => self.begin_round(0, scheduler, tunnel),
            seconds => self.count_down(seconds, scheduler, tunnel),
        }
    }

    fn count_down<S: Scheduler, T: Tunnel>(&mut self, seconds: u8, scheduler: &mut S, tunnel: &T) {
        self.state = State::Countdown(seconds);
        tunnel.send_message(&UpdateMessage::Countdown(seconds).into());
        self.timers.arm_once(
            scheduler,
            AlarmMessage::StartCountdown {
                generation: self.generation,
                remaining: seconds - 1,
            }
            .into(),
            self.timing.start_countdown_step,
        );
    }

    /// Starts playing the question at `index`
    fn begin_round<S: Scheduler, T: Tunnel>(&mut self, index: usize, scheduler: &mut S, tunnel: &T) {
        self.current_index = index;
        let Some(question) = self.questions.get(index).cloned() else {
            self.complete(tunnel);
            return;
        };

        tunnel.send_message(
            &UpdateMessage::QuestionAnnouncement {
                index,
                count: self.questions.len(),
                question: question.text.clone(),
                choices: question.choices.to_vec(),
                time_limit: question.time_limit,
            }
            .into(),
        );

        let mut round = Round::new(
            RoundId {
                index,
                generation: self.generation,
            },
            question,
            self.timing,
        );
        round.start(scheduler);
        tracing::debug!(index, generation = self.generation, "round started");

        self.state = State::Round(Box::new(round));
    }

    fn complete<T: Tunnel>(&mut self, tunnel: &T) {
        self.current_index = self.questions.len();
        self.state = State::Completed;
        tracing::info!(score = self.cumulative_score, "quiz completed");
        tunnel.send_message(&UpdateMessage::Completed(self.scorecard.summary()).into());
    }

    /// Selects a choice of the current question
    ///
    /// # Returns
    ///
    /// `true` if the selection changed
    pub fn select_answer<T: Tunnel>(&mut self, choice: &str, tunnel: &T) -> bool {
        match &mut self.state {
            State::Round(round) => round.select_answer(choice, tunnel),
            _ => false,
        }
    }

    /// Submits the selected choice and adds its points to the score
    ///
    /// # Returns
    ///
    /// The points earned, or `None` if the submission was ignored
    pub fn submit_answer<S: Scheduler, T: Tunnel>(
        &mut self,
        scheduler: &mut S,
        tunnel: &T,
    ) -> Option<ScoreBreakdown> {
        let State::Round(round) = &mut self.state else {
            return None;
        };
        let awarded = round.submit_answer(scheduler, tunnel)?;

        self.cumulative_score += awarded.total();
        tunnel.send_message(
            &UpdateMessage::Score {
                awarded,
                cumulative_score: self.cumulative_score,
            }
            .into(),
        );
        Some(awarded)
    }

    /// Moves on to the next question once the current reveal is complete
    ///
    /// Does nothing while the reveal is still running and once the session
    /// is completed.
    ///
    /// # Returns
    ///
    /// `true` if the session moved on
    pub fn advance<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) -> bool {
        let State::Round(round) = &mut self.state else {
            return false;
        };
        if !round.is_finished() {
            return false;
        }

        round.release_timers(scheduler);
        self.scorecard.record(round.outcome());

        let next = self.current_index + 1;
        if next < self.questions.len() {
            self.begin_round(next, scheduler, tunnel);
        } else {
            self.complete(tunnel);
        }
        true
    }

    /// Plays the quiz again from the first question
    ///
    /// Only possible once the session is completed.
    ///
    /// # Returns
    ///
    /// `true` if the session restarted
    pub fn restart<S: Scheduler, T: Tunnel>(&mut self, scheduler: &mut S, tunnel: &T) -> bool {
        if !self.is_completed() {
            return false;
        }

        self.generation += 1;
        self.cumulative_score = 0;
        self.scorecard = Scorecard::default();
        tracing::debug!(generation = self.generation, "session restarted");
        self.begin_round(0, scheduler, tunnel);
        true
    }

    /// Leaves the session, cancelling every pending timer
    pub fn exit<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let State::Round(round) = &mut self.state {
            round.release_timers(scheduler);
        }
        self.timers.release(scheduler);
        self.generation += 1;
        self.state = State::Exited;
    }

    /// Replaces the displayed room metadata
    pub fn update_room<T: Tunnel>(&mut self, room: RoomMetadata, tunnel: &T) {
        tunnel.send_message(&UpdateMessage::Room(room.clone()).into());
        self.room = Some(room);
    }

    /// Processes a player command
    pub fn receive_command<S: Scheduler, T: Tunnel>(
        &mut self,
        command: Command,
        scheduler: &mut S,
        tunnel: &T,
    ) {
        match command {
            Command::Start => self.start(scheduler, tunnel),
            Command::Select(choice) => {
                self.select_answer(&choice, tunnel);
            }
            Command::Submit => {
                self.submit_answer(scheduler, tunnel);
            }
            Command::Restart => {
                self.restart(scheduler, tunnel);
            }
            Command::Sync => tunnel.send_state(&self.state_message()),
            Command::Exit => self.exit(scheduler),
        }
    }

    /// Processes an alarm previously handed to the scheduler
    ///
    /// Alarms stamped with another generation or round are discarded.
    pub fn receive_alarm<S: Scheduler, T: Tunnel>(
        &mut self,
        message: crate::AlarmMessage,
        scheduler: &mut S,
        tunnel: &T,
    ) {
        match message {
            crate::AlarmMessage::Game(AlarmMessage::StartCountdown {
                generation,
                remaining,
            }) => {
                if generation != self.generation || !matches!(self.state, State::Countdown(_)) {
                    tracing::trace!(generation, "discarding stale countdown alarm");
                    return;
                }
                self.timers.release(scheduler);
                if remaining == 0 {
                    self.begin_round(0, scheduler, tunnel);
                } else {
                    self.count_down(remaining, scheduler, tunnel);
                }
            }
            crate::AlarmMessage::Round(alarm) => {
                let finished = match &mut self.state {
                    State::Round(round) if round.id() == alarm.round() => {
                        round.receive_alarm(alarm, scheduler, tunnel)
                    }
                    _ => {
                        tracing::trace!(?alarm, "discarding stale round alarm");
                        false
                    }
                };
                if finished {
                    self.advance(scheduler, tunnel);
                }
            }
        }
    }

    /// Returns the message necessary to synchronize a view with the session
    pub fn state_message(&self) -> crate::SyncMessage {
        match &self.state {
            State::Lobby => SyncMessage::Lobby {
                title: self.questions.title().to_owned(),
                count: self.questions.len(),
                room: self.room.clone(),
            }
            .into(),
            State::Countdown(seconds) => SyncMessage::Countdown(*seconds).into(),
            State::Round(round) => round.state_message(self.questions.len()).into(),
            State::Completed => SyncMessage::Completed(self.scorecard.summary()).into(),
            State::NoQuestions => SyncMessage::NoQuestions.into(),
            State::Exited => SyncMessage::Exited.into(),
        }
    }
}

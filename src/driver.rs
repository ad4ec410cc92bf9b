//! Tokio session driver
//!
//! The [`Session`] is a plain state machine. This module runs it: alarms
//! are real tokio sleeps feeding an mpsc channel, player commands arrive on
//! another channel, and room metadata refreshes come from a `watch`
//! receiver. A single loop owns the session, so no state is ever shared
//! between tasks.

use std::collections::HashMap;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use web_time::Duration;

use crate::{
    AlarmMessage,
    config::Timing,
    game::{Command, Session},
    quiz::config::{Mode, QuestionSet},
    record_id::RecordId,
    room::{Room, RoomMetadata},
    scheduler::{Scheduler, TimerId},
    scorecard::Summary,
    session::Tunnel,
    store::{RoomStore, StoreError},
};

/// Scheduler spawning one sleeping task per alarm
///
/// Fired alarms are sent on the channel returned by [`TokioScheduler::new`].
/// Cancelling aborts the task; dropping the scheduler aborts all of them.
#[derive(Debug)]
pub struct TokioScheduler {
    alarms: mpsc::UnboundedSender<AlarmMessage>,
    next_timer: u64,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiving end of its alarms
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AlarmMessage>) {
        let (alarms, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            alarms,
            next_timer: 0,
            timers: HashMap::new(),
        };
        (scheduler, receiver)
    }

    /// Returns the number of alarms that have not fired yet
    pub fn pending(&self) -> usize {
        self.timers.values().filter(|handle| !handle.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, alarm: AlarmMessage, delay: Duration) -> TimerId {
        self.timers.retain(|_, handle| !handle.is_finished());

        self.next_timer += 1;
        let id = TimerId::new(self.next_timer);
        let alarms = self.alarms.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // the driver is gone if this fails
            let _ = alarms.send(alarm);
        });
        self.timers.insert(id, handle);
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(handle) = self.timers.remove(&timer) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

/// Runs a session until the player leaves
#[derive(Debug)]
pub struct Driver<T> {
    session: Session,
    scheduler: TokioScheduler,
    alarms: mpsc::UnboundedReceiver<AlarmMessage>,
    tunnel: T,
    room_updates: Option<watch::Receiver<RoomMetadata>>,
}

impl<T: Tunnel> Driver<T> {
    /// Creates a driver for `session`, reporting through `tunnel`
    pub fn new(session: Session, tunnel: T) -> Self {
        let (scheduler, alarms) = TokioScheduler::new();
        Self {
            session,
            scheduler,
            alarms,
            tunnel,
            room_updates: None,
        }
    }

    /// Forwards room metadata refreshes to the session
    #[must_use]
    pub fn with_room_updates(mut self, updates: watch::Receiver<RoomMetadata>) -> Self {
        self.room_updates = Some(updates);
        self
    }

    /// Returns the session being driven
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Processes alarms, room refreshes and commands until [`Command::Exit`]
    /// or until the command channel closes
    ///
    /// Alarms are always handled before commands that arrived at the same
    /// time, so an answer racing the end of the countdown is refused.
    ///
    /// # Returns
    ///
    /// The summary of the rounds played in the current run
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Summary {
        loop {
            tokio::select! {
                biased;
                Some(alarm) = self.alarms.recv() => {
                    self.session.receive_alarm(alarm, &mut self.scheduler, &self.tunnel);
                }
                Some(room) = next_room(&mut self.room_updates) => {
                    self.session.update_room(room, &self.tunnel);
                }
                command = commands.recv() => match command {
                    Some(Command::Exit) | None => break,
                    Some(command) => {
                        tracing::trace!(?command, "received command");
                        self.session.receive_command(command, &mut self.scheduler, &self.tunnel);
                    }
                },
            }
        }

        self.session.exit(&mut self.scheduler);
        let summary = self.session.scorecard().summary();
        tracing::info!(total = summary.total, rounds = summary.question_count, "session closed");
        self.tunnel.close();
        summary
    }
}

/// Waits for the next room refresh
///
/// Resolves to `None` right away when there is nothing to wait for, which
/// disables the branch for that pass of the loop.
async fn next_room(updates: &mut Option<watch::Receiver<RoomMetadata>>) -> Option<RoomMetadata> {
    let receiver = updates.as_mut()?;
    if receiver.changed().await.is_err() {
        *updates = None;
        return None;
    }
    Some(receiver.borrow_and_update().clone())
}

/// Builds a solo session over the shared question pool
///
/// `timing` is used as is, as by [`Session::new`].
///
/// # Errors
///
/// Returns the error of the failed request.
pub async fn solo_session<St: RoomStore + ?Sized>(store: &St, timing: Timing) -> Result<Session, StoreError> {
    let records = store.list_questions().await?;
    let questions = QuestionSet::from_records("Solo quiz", records);
    tracing::debug!(count = questions.len(), "loaded solo questions");
    Ok(Session::new(questions, Mode::Solo, timing))
}

/// Builds a session over the questions of a room
///
/// `timing` is used as is, as by [`Session::new`].
///
/// # Returns
///
/// The session and the room as fetched, to start a poller from
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if the room does not exist, or the
/// error of the failed request.
pub async fn room_session<St: RoomStore + ?Sized>(
    store: &St,
    id: &RecordId,
    timing: Timing,
) -> Result<(Session, Room), StoreError> {
    let room = store.get_room(id).await?;
    let session = Session::new(room.question_set(), Mode::Room(room.id.clone()), timing)
        .with_room(RoomMetadata::from(&room));
    Ok((session, room))
}

//! Cancelable alarm scheduling
//!
//! The quiz state machine never sleeps on its own. Every delayed transition
//! (countdown ticks, reveal stages, the start countdown) is handed to a
//! [`Scheduler`], which later feeds the alarm back through
//! `Session::receive_alarm`. Alarms carry the identity of the round that
//! armed them, so an alarm that fires after its round was superseded is
//! recognised and dropped by the receiver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::AlarmMessage;

/// Handle to a scheduled alarm, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Wraps a raw timer number
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Capability to deliver an alarm after a delay
///
/// Implementations must deliver every alarm that was not cancelled exactly
/// once. Cancelling an alarm that already fired has no effect.
pub trait Scheduler {
    /// Arranges for `alarm` to be delivered after `delay`
    ///
    /// # Arguments
    ///
    /// * `alarm` - The message to deliver
    /// * `delay` - How long to wait before delivering it
    ///
    /// # Returns
    ///
    /// A handle that can be passed to [`Scheduler::cancel`]
    fn schedule(&mut self, alarm: AlarmMessage, delay: Duration) -> TimerId;

    /// Cancels a pending alarm
    fn cancel(&mut self, timer: TimerId);
}

/// The set of timers owned by one phase of a session
///
/// A scope holds at most one repeating ticker (re-armed on every tick) and
/// any number of one-shot alarms. Releasing the scope cancels all of them,
/// which is done on every exit path before new timers are armed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TimerScope {
    ticker: Option<TimerId>,
    once: Vec<TimerId>,
}

impl TimerScope {
    /// Arms the next tick of the repeating ticker
    ///
    /// The previous tick handle is replaced; it is expected to have fired
    /// already.
    pub fn arm_ticker<S: Scheduler>(
        &mut self,
        scheduler: &mut S,
        alarm: AlarmMessage,
        delay: Duration,
    ) {
        self.ticker = Some(scheduler.schedule(alarm, delay));
    }

    /// Cancels the ticker if it is armed
    pub fn stop_ticker<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(timer) = self.ticker.take() {
            scheduler.cancel(timer);
        }
    }

    /// Arms a one-shot alarm
    pub fn arm_once<S: Scheduler>(&mut self, scheduler: &mut S, alarm: AlarmMessage, delay: Duration) {
        self.once.push(scheduler.schedule(alarm, delay));
    }

    /// Cancels every timer held by this scope
    pub fn release<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.stop_ticker(scheduler);
        for timer in self.once.drain(..) {
            scheduler.cancel(timer);
        }
    }

    /// Returns `true` if no timer is held
    pub fn is_empty(&self) -> bool {
        self.ticker.is_none() && self.once.is_empty()
    }
}

/// A scheduler driven by a virtual clock
///
/// Nothing fires on its own: the owner pulls due alarms with
/// [`ManualScheduler::pop_due`], which moves the clock forward to the due
/// time of the returned alarm. Alarms due at the same instant are delivered
/// in the order they were scheduled.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_timer: u64,
    pending: BTreeMap<(Duration, u64), AlarmMessage>,
}

impl ManualScheduler {
    /// Creates a scheduler whose clock starts at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns the number of alarms waiting to fire
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns the earliest alarm due at or before `deadline`
    ///
    /// The clock is moved to the due time of the returned alarm. When no
    /// alarm is due, the clock is left untouched and `None` is returned.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<AlarmMessage> {
        let (&(due, seq), _) = self.pending.first_key_value()?;
        if due > deadline {
            return None;
        }
        self.now = self.now.max(due);
        self.pending.remove(&(due, seq))
    }

    /// Moves the clock forward without delivering anything
    pub fn advance_to(&mut self, instant: Duration) {
        self.now = self.now.max(instant);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, alarm: AlarmMessage, delay: Duration) -> TimerId {
        let seq = self.next_timer;
        self.next_timer += 1;
        self.pending.insert((self.now + delay, seq), alarm);
        TimerId(seq)
    }

    fn cancel(&mut self, timer: TimerId) {
        self.pending.retain(|&(_, seq), _| seq != timer.0);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::game;

    fn countdown(remaining: u8) -> AlarmMessage {
        game::AlarmMessage::StartCountdown {
            generation: 0,
            remaining,
        }
        .into()
    }

    fn remaining_of(alarm: &AlarmMessage) -> u8 {
        match alarm {
            AlarmMessage::Game(game::AlarmMessage::StartCountdown { remaining, .. }) => *remaining,
            AlarmMessage::Round(_) => panic!("unexpected round alarm"),
        }
    }

    #[test]
    fn test_manual_scheduler_orders_by_due_time() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule(countdown(2), Duration::from_millis(200));
        scheduler.schedule(countdown(1), Duration::from_millis(100));

        let first = scheduler.pop_due(Duration::from_secs(1)).unwrap();
        assert_eq!(remaining_of(&first), 1);
        assert_eq!(scheduler.now(), Duration::from_millis(100));

        let second = scheduler.pop_due(Duration::from_secs(1)).unwrap();
        assert_eq!(remaining_of(&second), 2);
        assert!(scheduler.pop_due(Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_manual_scheduler_respects_deadline() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule(countdown(0), Duration::from_secs(2));

        assert!(scheduler.pop_due(Duration::from_secs(1)).is_none());
        assert_eq!(scheduler.now(), Duration::ZERO);
        assert!(scheduler.pop_due(Duration::from_secs(2)).is_some());
    }

    #[test]
    fn test_manual_scheduler_same_instant_keeps_insertion_order() {
        let mut scheduler = ManualScheduler::new();
        scheduler.schedule(countdown(5), Duration::from_secs(1));
        scheduler.schedule(countdown(6), Duration::from_secs(1));

        assert_eq!(remaining_of(&scheduler.pop_due(Duration::MAX).unwrap()), 5);
        assert_eq!(remaining_of(&scheduler.pop_due(Duration::MAX).unwrap()), 6);
    }

    #[test]
    fn test_cancel_removes_pending_alarm() {
        let mut scheduler = ManualScheduler::new();
        let timer = scheduler.schedule(countdown(1), Duration::from_secs(1));
        scheduler.cancel(timer);

        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.pop_due(Duration::MAX).is_none());
    }

    #[test]
    fn test_schedule_is_relative_to_virtual_now() {
        let mut scheduler = ManualScheduler::new();
        scheduler.advance_to(Duration::from_secs(10));
        scheduler.schedule(countdown(1), Duration::from_secs(1));

        assert!(scheduler.pop_due(Duration::from_secs(10)).is_none());
        assert!(scheduler.pop_due(Duration::from_secs(11)).is_some());
    }

    #[test]
    fn test_timer_scope_release_cancels_everything() {
        let mut scheduler = ManualScheduler::new();
        let mut scope = TimerScope::default();

        scope.arm_ticker(&mut scheduler, countdown(1), Duration::from_millis(100));
        scope.arm_once(&mut scheduler, countdown(2), Duration::from_secs(2));
        scope.arm_once(&mut scheduler, countdown(3), Duration::from_secs(4));
        assert_eq!(scheduler.pending(), 3);
        assert!(!scope.is_empty());

        scope.release(&mut scheduler);
        assert_eq!(scheduler.pending(), 0);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_timer_scope_stop_ticker_keeps_one_shots() {
        let mut scheduler = ManualScheduler::new();
        let mut scope = TimerScope::default();

        scope.arm_ticker(&mut scheduler, countdown(1), Duration::from_millis(100));
        scope.arm_once(&mut scheduler, countdown(2), Duration::from_secs(2));
        scope.stop_ticker(&mut scheduler);

        assert_eq!(scheduler.pending(), 1);
    }
}

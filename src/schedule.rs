//! Timed alarms
//!
//! The engine never sleeps. It asks a [`Scheduler`] to deliver an
//! [`AlarmMessage`] later and keeps the returned [`TaskId`] so that it can
//! cancel the alarm when it becomes stale. [`AlarmQueue`] is a virtual-time
//! scheduler that runs everything on the caller's thread.

use std::collections::BTreeMap;

use web_time::Duration;

use crate::AlarmMessage;

/// Handle to a scheduled alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// Something that can deliver alarms after a delay
pub trait Scheduler {
    /// Schedules `alarm` to be delivered after `delay`
    fn schedule(&mut self, alarm: AlarmMessage, delay: Duration) -> TaskId;

    /// Cancels a scheduled alarm; cancelling a delivered or unknown task does nothing
    fn cancel(&mut self, task: TaskId);
}

/// Deterministic scheduler driven by explicit time advances
///
/// Alarms due at the same instant are delivered in the order they were
/// scheduled.
#[derive(Debug, Default)]
pub struct AlarmQueue {
    now: Duration,
    next_task: u64,
    pending: BTreeMap<(Duration, TaskId), AlarmMessage>,
}

impl AlarmQueue {
    /// Creates an empty queue at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns the number of alarms still pending
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns whether no alarm is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns the earliest alarm due within `by` from now
    ///
    /// Virtual time moves to the alarm's due time. When nothing is due, time
    /// moves forward by `by` and `None` is returned.
    pub fn pop_due(&mut self, by: Duration) -> Option<AlarmMessage> {
        let deadline = self.now + by;
        let earliest = self.pending.first_key_value().map(|(&(due, _), _)| due);
        if earliest.is_some_and(|due| due <= deadline) {
            self.pop_next()
        } else {
            self.now = deadline;
            None
        }
    }

    /// Removes and returns the earliest pending alarm, whenever it is due
    pub fn pop_next(&mut self) -> Option<AlarmMessage> {
        let ((due, _), alarm) = self.pending.pop_first()?;
        self.now = due;
        Some(alarm)
    }
}

impl Scheduler for AlarmQueue {
    fn schedule(&mut self, alarm: AlarmMessage, delay: Duration) -> TaskId {
        let task = TaskId(self.next_task);
        self.next_task += 1;
        self.pending.insert((self.now + delay, task), alarm);
        task
    }

    fn cancel(&mut self, task: TaskId) {
        self.pending.retain(|(_, id), _| *id != task);
    }
}

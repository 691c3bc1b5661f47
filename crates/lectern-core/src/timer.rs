//! One-shot timers for debounced transitions.
//!
//! Timers never look at the wall clock themselves: the host passes the
//! current [`Instant`] when starting a timer and when asking which timers are
//! due. That keeps every transition on the host's event thread and makes the
//! timing fully reproducible in tests.
//!
//! Cancellation is idempotent. Cancelling a timer that already fired or was
//! already cancelled is a no-op that reports `false`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, TimerError};

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should fire.
    deadline: Instant,
}

/// An entry in the timer queue (min-heap by fire time, FIFO among equals).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
    seq: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manages the pending one-shot timers of a single owner.
#[derive(Debug)]
pub struct TimerManager {
    /// All pending timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires. May hold entries for cancelled
    /// timers; those are discarded lazily.
    queue: BinaryHeap<TimerQueueEntry>,
    /// Insertion counter used to keep equal deadlines in start order.
    next_seq: u64,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration) -> Result<TimerId> {
        let deadline = now
            .checked_add(duration)
            .ok_or(TimerError::DeadlineOverflow)?;

        let id = self.timers.insert(TimerData { deadline });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: deadline,
            seq: self.next_seq,
        });
        self.next_seq = self.next_seq.wrapping_add(1);

        tracing::trace!(target: "lectern_core::timer", ?id, ?duration, "timer started");
        Ok(id)
    }

    /// Cancel a timer.
    ///
    /// Returns `true` if a pending timer was cancelled, `false` if it had
    /// already fired or been cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let cancelled = self.timers.remove(id).is_some();
        if cancelled {
            tracing::trace!(target: "lectern_core::timer", ?id, "timer cancelled");
        }
        cancelled
    }

    /// Get the duration from `now` until the next timer fires, if any.
    ///
    /// Returns `Duration::ZERO` for timers that are already due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        // The queue may still hold cancelled entries; pending deadlines live
        // in the arena.
        self.timers
            .values()
            .map(|timer| timer.deadline)
            .min()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Remove and return every timer due at `now`, in deadline order.
    #[tracing::instrument(skip(self), target = "lectern_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek() {
            if entry.fire_time > now {
                break;
            }

            let Some(entry) = self.queue.pop() else {
                break;
            };

            if self.timers.remove(entry.id).is_some() {
                tracing::trace!(target: "lectern_core::timer", id = ?entry.id, "timer fired");
                fired.push(entry.id);
            }
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Timer system for treegrid.
//!
//! Provides one-shot timers with cancel-and-reschedule semantics. Timers are
//! not tied to a real clock: the owner's event loop passes the current
//! [`Instant`] to [`TimerManager::poll`], which makes scheduling
//! deterministic under test.
//!
//! [`Debouncer`] builds on the manager: scheduling a key that already has a
//! pending timer cancels the old timer, so only the latest request fires.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{CoreError, Result};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

#[derive(Debug)]
struct TimerData {
    fire_at: Instant,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_at: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at
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
        other.fire_at.cmp(&self.fire_at)
    }
}

/// Manages pending one-shot timers.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a one-shot timer that fires `delay` after `now`.
    pub fn start_one_shot(&mut self, now: Instant, delay: Duration) -> TimerId {
        let fire_at = now + delay;
        let id = self.timers.insert(TimerData { fire_at });
        self.queue.push(TimerQueueEntry { id, fire_at });
        tracing::trace!(target: targets::TIMER, ?id, ?delay, "timer started");
        id
    }

    /// Stop and remove a timer before it fires.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        // Stale heap entries are skipped lazily in `poll`.
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(CoreError::InvalidTimerId)
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Returns the number of pending timers.
    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Returns the time at which the next pending timer fires.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.fire_at).min()
    }

    /// Removes and returns all timers due at `now`, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_at > now {
                break;
            }
            self.queue.pop();
            if self.timers.remove(entry.id).is_some() {
                fired.push(entry.id);
            }
        }
        if !fired.is_empty() {
            tracing::trace!(target: targets::TIMER, count = fired.len(), "timers fired");
        }
        fired
    }
}

/// Keyed cancel-and-reschedule scheduling.
///
/// Each key has at most one pending timer. Scheduling a key again invalidates
/// the previous request.
#[derive(Debug)]
pub struct Debouncer<K> {
    timers: TimerManager,
    by_key: HashMap<K, TimerId>,
    keys: HashMap<TimerId, K>,
    delay: Duration,
}

impl<K: Clone + Eq + Hash> Debouncer<K> {
    /// Creates a debouncer with the given delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            timers: TimerManager::new(),
            by_key: HashMap::new(),
            keys: HashMap::new(),
            delay,
        }
    }

    /// Returns the configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `key` to fire after the delay, cancelling a pending request
    /// for the same key.
    ///
    /// Returns `true` if a pending request was replaced.
    pub fn schedule(&mut self, key: K, now: Instant) -> bool {
        let replaced = self.cancel(&key);
        let id = self.timers.start_one_shot(now, self.delay);
        self.by_key.insert(key.clone(), id);
        self.keys.insert(id, key);
        replaced
    }

    /// Cancels the pending request for `key`, if any.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.by_key.remove(key) {
            Some(id) => {
                self.keys.remove(&id);
                self.timers.stop(id).is_ok()
            }
            None => false,
        }
    }

    /// Cancels every pending request.
    pub fn cancel_all(&mut self) {
        for id in self.by_key.drain().map(|(_, id)| id) {
            let _ = self.timers.stop(id);
        }
        self.keys.clear();
    }

    /// Returns `true` if `key` has a pending request.
    pub fn is_pending(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// Returns the number of pending requests.
    pub fn pending_count(&self) -> usize {
        self.by_key.len()
    }

    /// Returns the keys whose delay has elapsed at `now`, in firing order.
    pub fn poll(&mut self, now: Instant) -> Vec<K> {
        self.timers
            .poll(now)
            .into_iter()
            .filter_map(|id| {
                let key = self.keys.remove(&id)?;
                self.by_key.remove(&key);
                Some(key)
            })
            .collect()
    }
}

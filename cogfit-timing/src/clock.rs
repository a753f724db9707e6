use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use tracing::warn;

/// Simulated time in seconds.
pub type SimTime = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallbackKind {
    Once,
    /// Recurring timer record. Re-queued at `fire_time + period` after each
    /// firing until cancelled or the clock stops.
    Periodic { period: SimTime },
}

#[derive(Debug, Clone)]
pub struct ScheduledCallback<A> {
    pub id: CallbackId,
    pub fire_time: SimTime,
    /// Registration order; breaks ties between equal fire times.
    pub seq: u64,
    pub kind: CallbackKind,
    pub action: A,
}

impl<A> ScheduledCallback<A> {
    pub fn is_periodic(&self) -> bool {
        matches!(self.kind, CallbackKind::Periodic { .. })
    }
}

/// The simulated clock a task is driven by.
///
/// Owns simulated time and the event queue. Time only moves forward, and
/// only by popping the next due callback.
pub trait Clock {
    type Action;

    fn now(&self) -> SimTime;
    fn schedule(&mut self, fire_time: SimTime, kind: CallbackKind, action: Self::Action)
        -> CallbackId;
    /// Revokes a pending callback, or ends a periodic chain. Returns false if
    /// the id is unknown or already consumed.
    fn cancel(&mut self, id: CallbackId) -> bool;
    fn stop(&mut self);
    fn is_stopped(&self) -> bool;
    /// Removes the earliest callback and advances `now` to its fire time.
    fn pop_due(&mut self) -> Option<ScheduledCallback<Self::Action>>;
    /// Puts a fired periodic callback back one period later under the same id.
    fn requeue(&mut self, callback: ScheduledCallback<Self::Action>) -> bool;
    fn pending(&self) -> usize;
    fn stats(&self) -> ClockStats;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockStats {
    pub scheduled: u64,
    pub fired: u64,
    pub cancelled: u64,
    pub max_queue_depth: usize,
    pub now: SimTime,
}

struct Queued<A>(ScheduledCallback<A>);

impl<A> PartialEq for Queued<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A> Eq for Queued<A> {}

impl<A> PartialOrd for Queued<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Queued<A> {
    // Reversed so the max-heap yields the earliest time, then the lowest seq.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .fire_time
            .total_cmp(&self.0.fire_time)
            .then_with(|| other.0.seq.cmp(&self.0.seq))
    }
}

/// Discrete-event clock backed by a binary heap.
pub struct EventClock<A> {
    now: SimTime,
    heap: BinaryHeap<Queued<A>>,
    live: HashSet<CallbackId>,
    next_id: u64,
    next_seq: u64,
    stopped: bool,
    stats: ClockStats,
}

impl<A> EventClock<A> {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    pub fn starting_at(now: SimTime) -> Self {
        Self {
            now,
            heap: BinaryHeap::new(),
            live: HashSet::new(),
            next_id: 0,
            next_seq: 0,
            stopped: false,
            stats: ClockStats {
                now,
                ..ClockStats::default()
            },
        }
    }

    fn push(&mut self, mut callback: ScheduledCallback<A>) {
        callback.seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued(callback));
        self.stats.max_queue_depth = self.stats.max_queue_depth.max(self.heap.len());
    }

    fn clamp(&self, fire_time: SimTime) -> SimTime {
        if fire_time.is_nan() || fire_time < self.now {
            self.now
        } else {
            fire_time
        }
    }
}

impl<A> Default for EventClock<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clock for EventClock<A> {
    type Action = A;

    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule(&mut self, fire_time: SimTime, kind: CallbackKind, action: A) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        let fire_time = self.clamp(fire_time);
        self.live.insert(id);
        self.stats.scheduled += 1;
        self.push(ScheduledCallback {
            id,
            fire_time,
            seq: 0,
            kind,
            action,
        });
        id
    }

    fn cancel(&mut self, id: CallbackId) -> bool {
        let removed = self.live.remove(&id);
        if removed {
            self.stats.cancelled += 1;
        }
        removed
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn pop_due(&mut self) -> Option<ScheduledCallback<A>> {
        if self.stopped {
            return None;
        }
        while let Some(Queued(callback)) = self.heap.pop() {
            if !self.live.contains(&callback.id) {
                continue;
            }
            if !callback.is_periodic() {
                self.live.remove(&callback.id);
            }
            self.now = self.now.max(callback.fire_time);
            self.stats.fired += 1;
            self.stats.now = self.now;
            return Some(callback);
        }
        None
    }

    fn requeue(&mut self, mut callback: ScheduledCallback<A>) -> bool {
        let CallbackKind::Periodic { period } = callback.kind else {
            return false;
        };
        if self.stopped || !self.live.contains(&callback.id) {
            return false;
        }
        if !(period.is_finite() && period > 0.0) {
            warn!(id = callback.id.0, period, "dropping periodic callback with non-positive period");
            self.live.remove(&callback.id);
            return false;
        }
        callback.fire_time += period;
        self.push(callback);
        true
    }

    fn pending(&self) -> usize {
        self.heap
            .iter()
            .filter(|q| self.live.contains(&q.0.id))
            .count()
    }

    fn stats(&self) -> ClockStats {
        self.stats.clone()
    }
}

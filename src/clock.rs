//! Simulation clock: a single-threaded cooperative discrete-event kernel.
//!
//! Time is simulation minutes (`f64`), starting at 0. The timeline advances by
//! popping the next scheduled event. Events at equal timestamps execute in
//! **insertion order** (stable FIFO, per the ordering guarantee processes rely
//! on) — broken by a monotonic `seq` counter rather than by event kind, unlike
//! a millisecond-granularity clock that can afford a fixed per-kind tie-break.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

/// What kind of process step this event resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SimulationStarted,
    SlotTick,
    ArrivalWake,
    BusStep,
}

/// Which entity an event targets, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Station(Entity),
    Bus(Entity),
}

/// A scheduled event. `timestamp` is simulation minutes; `seq` is the
/// insertion order used to break equal-timestamp ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub timestamp: f64,
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by timestamp; ties broken by insertion sequence (FIFO).
        other
            .timestamp
            .total_cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being processed, inserted by the runner before each
/// schedule execution.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Single-threaded cooperative event scheduler.
#[derive(Debug, Resource)]
pub struct EventScheduler {
    now: f64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            events: BinaryHeap::new(),
        }
    }
}

impl EventScheduler {
    /// Current simulation time, in minutes.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule an event at an absolute simulation timestamp. `at` must be
    /// `>= now()`.
    pub fn schedule_at(&mut self, at: f64, kind: EventKind, subject: Option<EventSubject>) {
        debug_assert!(at.is_finite(), "event timestamp must be finite");
        debug_assert!(at + 1e-9 >= self.now, "event timestamp must be >= now()");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp: at.max(self.now),
            seq,
            kind,
            subject,
        });
    }

    /// Schedule an event `delta` minutes from now (equivalent to `hold(delta)`
    /// followed by an activation). `delta` is clamped to `>= 0`.
    pub fn schedule_in(&mut self, delta: f64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now + delta.max(0.0), kind, subject);
    }

    /// Pop the next event (earliest timestamp, insertion order among ties).
    /// Advances `now` to that event's timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Timestamp of the next scheduled event, without popping it.
    pub fn next_event_time(&self) -> Option<f64> {
        self.events.peek().map(|e| e.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}

/// Simulation end bound (`real_end - real_start`, per `TimeContext`). The
/// runner stops once the next event would fire at or after this time.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTime(pub f64);

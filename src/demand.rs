//! Demand rule tables: per-station, non-overlapping `[t0, t1)` intervals each
//! bound to a [`Distribution`]. Looked up by binary search, per the rules-
//! lookup design note — a station's intervals are sorted once at build time
//! and never mutated afterward.

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;

use crate::distributions::Distribution;

/// One `[t0, t1) -> Distribution` rule.
#[derive(Debug, Clone)]
pub struct DemandInterval {
    pub t0: f64,
    pub t1: f64,
    pub distribution: Distribution,
}

/// Sorted, non-overlapping demand intervals for a single station.
#[derive(Debug, Clone, Default)]
pub struct StationRules {
    intervals: Vec<DemandInterval>,
}

impl StationRules {
    fn push(&mut self, interval: DemandInterval) {
        self.intervals.push(interval);
    }

    fn sort(&mut self) {
        self.intervals.sort_by(|a, b| a.t0.total_cmp(&b.t0));
    }

    /// The distribution active at `t`, if any interval covers it.
    pub fn active_at(&self, t: f64) -> Option<&Distribution> {
        // Binary search for the last interval whose t0 <= t, then check
        // t1 > t (intervals are non-overlapping per the data model invariant).
        let idx = self.intervals.partition_point(|iv| iv.t0 <= t);
        if idx == 0 {
            return None;
        }
        let candidate = &self.intervals[idx - 1];
        if candidate.t0 <= t && t < candidate.t1 {
            Some(&candidate.distribution)
        } else {
            None
        }
    }
}

/// Demand rule table keyed by station name, shared by interarrival and
/// alighting rule sets (both are `(station, t0, t1) -> Distribution` maps).
#[derive(Debug, Clone, Default, Resource)]
pub struct DemandTable {
    by_station: HashMap<String, StationRules>,
}

impl DemandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, station: &str, t0: f64, t1: f64, distribution: Distribution) {
        self.by_station
            .entry(station.to_string())
            .or_default()
            .push(DemandInterval { t0, t1, distribution });
    }

    /// Must be called once after all `insert` calls and before any lookup.
    pub fn finalize(&mut self) {
        for rules in self.by_station.values_mut() {
            rules.sort();
        }
    }

    pub fn active_at(&self, station: &str, t: f64) -> Option<&Distribution> {
        self.by_station.get(station)?.active_at(t)
    }
}

/// Interarrival demand rules, keyed by station.
#[derive(Debug, Clone, Default, Resource)]
pub struct InterarrivalRules(pub DemandTable);

/// Alighting demand rules, keyed by station.
#[derive(Debug, Clone, Default, Resource)]
pub struct AlightingRules(pub DemandTable);

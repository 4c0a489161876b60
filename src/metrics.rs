//! Slot-indexed metrics accumulation. Four monitor kinds: sample (arithmetic
//! mean), weighted (weighted mean), level (time-weighted mean of a step
//! function), and counted-sum (plain sum/count). Each is a small struct with
//! a `tally`/`mean` pair — simple enough that no external
//! stats crate is needed for them.

use std::collections::HashMap;

use bevy_ecs::prelude::Resource;

/// Arithmetic mean of tallied values.
#[derive(Debug, Clone, Default)]
pub struct SampleMonitor {
    sum: f64,
    count: u64,
}

impl SampleMonitor {
    pub fn tally(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    pub fn mean(&self, sentinel: f64) -> f64 {
        if self.count == 0 {
            sentinel
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Weighted mean `Σ v·w / Σ w`.
#[derive(Debug, Clone, Default)]
pub struct WeightedMonitor {
    weighted_sum: f64,
    total_weight: f64,
}

impl WeightedMonitor {
    pub fn tally(&mut self, v: f64, w: f64) {
        self.weighted_sum += v * w;
        self.total_weight += w;
    }

    pub fn mean(&self, sentinel: f64) -> f64 {
        if self.total_weight <= 0.0 {
            sentinel
        } else {
            self.weighted_sum / self.total_weight
        }
    }
}

/// Plain `sum/count`, used where a route's customer count needs a counted
/// sum rather than a sample mean (kept as a distinct type even though the
/// arithmetic is identical to `SampleMonitor`).
#[derive(Debug, Clone, Default)]
pub struct CountedSum {
    sum: f64,
    count: u64,
}

impl CountedSum {
    pub fn tally(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    pub fn mean(&self, sentinel: f64) -> f64 {
        if self.count == 0 {
            sentinel
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Time-weighted mean of a step function: each tally holds until the next
/// tally (or the query's end bound). Stores full history so a per-slot mean
/// can be queried over any `[t0, t1)` window, carrying forward the value in
/// effect at `t0` even if no tally landed inside the window.
#[derive(Debug, Clone, Default)]
pub struct LevelMonitor {
    history: Vec<(f64, f64)>,
}

impl LevelMonitor {
    pub fn tally(&mut self, time: f64, value: f64) {
        self.history.push((time, value));
    }

    /// Time-weighted mean over `[t0, t1)`. `sentinel` is returned if nothing
    /// was ever tallied before `t1`.
    pub fn mean_in_range(&self, t0: f64, t1: f64, sentinel: f64) -> f64 {
        if t1 <= t0 {
            return sentinel;
        }
        // Value in effect at the start of the window: the last tally at or
        // before t0, or the first tally if everything happened after t0.
        let mut carry = match self.history.iter().rposition(|(t, _)| *t <= t0) {
            Some(idx) => self.history[idx].1,
            None => match self.history.first() {
                Some((_, v)) => *v,
                None => return sentinel,
            },
        };
        let mut cursor = t0;
        let mut weighted_sum = 0.0;
        for (t, v) in &self.history {
            if *t <= t0 || *t >= t1 {
                continue;
            }
            weighted_sum += carry * (*t - cursor);
            cursor = *t;
            carry = *v;
        }
        weighted_sum += carry * (t1 - cursor);
        weighted_sum / (t1 - t0)
    }
}

/// Per-station accumulators for one slot.
#[derive(Debug, Clone, Default)]
pub struct StationSlotMetrics {
    pub waiting: SampleMonitor,
}

/// Per-route accumulators for one slot.
#[derive(Debug, Clone, Default)]
pub struct RouteSlotMetrics {
    pub waiting: SampleMonitor,
    pub util: WeightedMonitor,
    pub travel_time: SampleMonitor,
    pub travel_dist: SampleMonitor,
    pub customer_count: u64,
    pub queue: CountedSum,
}

#[derive(Debug, Clone, Default)]
pub struct SlotMetrics {
    pub station: HashMap<String, StationSlotMetrics>,
    pub route: HashMap<String, RouteSlotMetrics>,
}

/// Slot-indexed collection of monitors and counters, plus global summary
/// accumulators. Slots are pre-populated up front so every slot in the
/// window appears in output even if it saw no activity.
#[derive(Debug, Clone, Default, Resource)]
pub struct MetricsStore {
    pub slots: Vec<SlotMetrics>,
    /// One continuous step-function history per station, queried per-slot
    /// via `mean_in_range` rather than duplicated per slot.
    pub station_queue: HashMap<String, LevelMonitor>,
    pub global_waiting: SampleMonitor,
    pub global_util: WeightedMonitor,
    pub global_travel_time: SampleMonitor,
    pub global_travel_dist: SampleMonitor,
}

impl MetricsStore {
    /// Pre-populate every slot/station/route bucket so later reads never
    /// need a lazy-insert check.
    pub fn new(num_slots: usize, station_names: &[String], route_ids: &[String]) -> Self {
        let mut slots = Vec::with_capacity(num_slots);
        for _ in 0..num_slots {
            let mut slot = SlotMetrics::default();
            for name in station_names {
                slot.station.insert(name.clone(), StationSlotMetrics::default());
            }
            for route in route_ids {
                slot.route.insert(route.clone(), RouteSlotMetrics::default());
            }
            slots.push(slot);
        }
        let mut station_queue = HashMap::new();
        for name in station_names {
            station_queue.insert(name.clone(), LevelMonitor::default());
        }
        Self {
            slots,
            station_queue,
            global_waiting: SampleMonitor::default(),
            global_util: WeightedMonitor::default(),
            global_travel_time: SampleMonitor::default(),
            global_travel_dist: SampleMonitor::default(),
        }
    }

    pub fn tally_queue_depth(&mut self, station: &str, time: f64, depth: usize) {
        if let Some(monitor) = self.station_queue.get_mut(station) {
            monitor.tally(time, depth as f64);
        }
    }

    pub fn tally_boarding_wait(&mut self, slot: usize, station: &str, route_id: &str, wait: f64) {
        self.global_waiting.tally(wait);
        if let Some(slot) = self.slots.get_mut(slot) {
            if let Some(s) = slot.station.get_mut(station) {
                s.waiting.tally(wait);
            }
            if let Some(r) = slot.route.get_mut(route_id) {
                r.waiting.tally(wait);
                r.customer_count += 1;
            }
        }
    }

    pub fn tally_route_queue(&mut self, slot: usize, route_id: &str, depth: usize) {
        if let Some(slot) = self.slots.get_mut(slot) {
            if let Some(r) = slot.route.get_mut(route_id) {
                r.queue.tally(depth as f64);
            }
        }
    }

    pub fn tally_utilization(&mut self, slot: usize, route_id: &str, util: f64, weight: f64) {
        self.global_util.tally(util, weight);
        if let Some(slot) = self.slots.get_mut(slot) {
            if let Some(r) = slot.route.get_mut(route_id) {
                r.util.tally(util, weight);
            }
        }
    }

    pub fn tally_trip_completion(
        &mut self,
        slot: usize,
        route_id: &str,
        travel_time: f64,
        travel_dist: f64,
    ) {
        self.global_travel_time.tally(travel_time);
        self.global_travel_dist.tally(travel_dist);
        if let Some(slot) = self.slots.get_mut(slot) {
            if let Some(r) = slot.route.get_mut(route_id) {
                r.travel_time.tally(travel_time);
                r.travel_dist.tally(travel_dist);
            }
        }
    }
}

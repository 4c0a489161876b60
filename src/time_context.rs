//! Maps between wall-clock minutes and simulation time, and indexes
//! time-slots. Simulation time is minutes-from-zero; real time is
//! minutes-from-midnight.

use bevy_ecs::prelude::Resource;

use crate::error::SimError;

/// Parse `"hh.mm"` or `"hh:mm"` into minutes from midnight.
pub fn parse_hour_min(s: &str) -> Result<i64, SimError> {
    let normalized = s.replace(':', ".");
    let (h, m) = normalized
        .split_once('.')
        .ok_or_else(|| SimError::InvalidInput(format!("malformed time string: {s}")))?;
    let h: i64 = h
        .trim()
        .parse()
        .map_err(|_| SimError::InvalidInput(format!("malformed time string: {s}")))?;
    let m: i64 = m
        .trim()
        .parse()
        .map_err(|_| SimError::InvalidInput(format!("malformed time string: {s}")))?;
    Ok(h * 60 + m)
}

/// Parse `"hh.mm-hh.mm"` into a `(start, end)` pair of minutes from midnight.
pub fn parse_time_range(range: &str) -> Result<(i64, i64), SimError> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| SimError::InvalidInput(format!("malformed time range: {range}")))?;
    Ok((parse_hour_min(start)?, parse_hour_min(end)?))
}

/// Real window `[real_start, real_end)` in minutes from midnight, with a
/// `slot_length`-minute bucketing of simulation time.
#[derive(Debug, Clone, Copy, Resource)]
pub struct TimeContext {
    pub real_start: i64,
    pub real_end: i64,
    pub slot_length: i64,
    pub sim_duration: i64,
    pub num_slots: i64,
}

impl TimeContext {
    /// Build from a `"hh.mm-hh.mm"` real-clock window and a slot length in
    /// minutes.
    pub fn new(time_period: &str, slot_length: i64) -> Result<Self, SimError> {
        let (real_start, real_end) = parse_time_range(time_period)?;
        if real_start > real_end {
            return Err(SimError::InvalidInput(format!(
                "real_start ({real_start}) must be <= real_end ({real_end})"
            )));
        }
        if slot_length <= 0 {
            return Err(SimError::InvalidInput(format!(
                "slot_length must be > 0, got {slot_length}"
            )));
        }
        let sim_duration = real_end - real_start;
        let num_slots = (sim_duration / slot_length).max(1);
        Ok(Self {
            real_start,
            real_end,
            slot_length,
            sim_duration,
            num_slots,
        })
    }

    /// Convert a real-clock minute-of-day into simulation time (minutes from 0).
    pub fn to_sim(&self, real_minute: i64) -> f64 {
        (real_minute - self.real_start) as f64
    }

    /// Convert simulation time back to a `"hh:mm"` real-clock label.
    pub fn sim_to_real_label(&self, sim_time: f64) -> String {
        let total = sim_time.floor() as i64 + self.real_start;
        format!("{:02}:{:02}", total.div_euclid(60), total.rem_euclid(60))
    }

    /// Half-open-interval slot index for a simulation timestamp, clamped to
    /// `[0, num_slots - 1]`.
    pub fn slot_index(&self, sim_time: f64) -> usize {
        let idx = (sim_time / self.slot_length as f64).floor() as i64;
        idx.clamp(0, self.num_slots - 1) as usize
    }

    /// `"hh:mm-hh:mm"` label for a slot index.
    pub fn slot_label(&self, idx: usize) -> String {
        let start = self.real_start + idx as i64 * self.slot_length;
        let end = start + self.slot_length;
        format!(
            "{:02}:{:02}-{:02}:{:02}",
            start.div_euclid(60),
            start.rem_euclid(60),
            end.div_euclid(60),
            end.rem_euclid(60)
        )
    }

    /// Convert a `"hh.mm-hh.mm"` range into `(start_sim, end_sim)` simulation
    /// minutes, for demand-rule time ranges.
    pub fn range_to_sim(&self, range: &str) -> Result<(f64, f64), SimError> {
        let (s, e) = parse_time_range(range)?;
        Ok((self.to_sim(s), self.to_sim(e)))
    }
}

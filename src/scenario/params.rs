use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Precomputed per-route geometry: station order plus the travel time/
/// distance for each segment, indexed the same way as `stations[i..i+1]`.
#[derive(Debug, Clone)]
pub struct RouteDef {
    pub stations: Vec<Entity>,
    /// Minutes, one entry per adjacent station pair (`len == stations.len() - 1`).
    pub travel_times_min: Vec<f64>,
    /// Meters, one entry per adjacent station pair.
    pub travel_distances_m: Vec<f64>,
}

/// Route geometry keyed by `route_id`, built once by the scenario mapper.
#[derive(Debug, Clone, Default, Resource)]
pub struct RouteTables(pub HashMap<String, RouteDef>);

/// Per-route fleet admission state, mutated only by the bus system.
#[derive(Debug, Clone, Copy)]
pub struct FleetState {
    pub max_bus: u32,
    pub active_bus: u32,
    pub bus_seq: u32,
    pub max_distance_m: f64,
}

#[derive(Debug, Clone, Default, Resource)]
pub struct FleetControl(pub HashMap<String, FleetState>);

/// Dwell-time constants applied at every station stop. The condensed
/// request schema carries no dwell fields, so these are scenario-wide
/// defaults rather than per-request input (documented in DESIGN.md).
#[derive(Debug, Clone, Copy, Resource)]
pub struct DwellConfig {
    pub enabled: bool,
    /// Minutes per alighting passenger.
    pub alight_time_min: f64,
    /// Minutes per boarding passenger.
    pub board_time_min: f64,
    pub door_open_time_min: f64,
    pub door_close_time_min: f64,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            alight_time_min: 0.05,
            board_time_min: 0.1,
            door_open_time_min: 0.2,
            door_close_time_min: 0.2,
        }
    }
}

/// Single seeded RNG shared by every sampling call in a run, for
/// determinism given a fixed seed.
#[derive(Resource)]
pub struct RngResource(pub StdRng);

impl RngResource {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Parameters for building a scenario beyond what's in the request body —
/// currently just the determinism seed, since everything else is fully
/// specified by `SimulationRequest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioParams {
    pub seed: Option<u64>,
    pub dwell: Option<DwellConfig>,
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_dwell_config(mut self, dwell: DwellConfig) -> Self {
        self.dwell = Some(dwell);
        self
    }
}

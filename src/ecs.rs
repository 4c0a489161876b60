//! Entity Component System: components and state enums for stations, buses,
//! and passengers.
//!
//! This module defines the core data structures used in the simulation:
//!
//! - **Components**: `Station`, `WaitQueue`, `Passenger`, `Bus`
//! - **State enums**: `PassengerState`, `BusPhase`, `StationStep`
//!
//! Components are attached to entities in the ECS world, and systems query/
//! modify them based on popped events. States represent the lifecycle stage
//! of each entity.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Component, Entity};

/// A named stop. Identity is the `name`, unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Station {
    pub name: String,
}

/// Unbounded FIFO of passengers waiting at a station.
#[derive(Debug, Clone, Default, Component)]
pub struct WaitQueue(pub VecDeque<Entity>);

impl WaitQueue {
    pub fn push(&mut self, passenger: Entity) {
        self.0.push_back(passenger);
    }

    pub fn pop(&mut self) -> Option<Entity> {
        self.0.pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where a station's ArrivalGenerator loop currently sits: a wake either
/// completes a pending `hold(w)` by spawning a passenger, or (when no demand
/// rule covers the current time) just retries a beat later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalPhase {
    AwaitingRule,
    WaitingToSpawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct ArrivalGenerator {
    pub phase: ArrivalPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerState {
    Queued,
    OnBus,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Passenger {
    pub state: PassengerState,
    /// Station the passenger boarded the queue at.
    pub origin_station: Entity,
    /// Simulation time the passenger entered the queue.
    pub arrival_time: f64,
}

/// Sub-step within a station stop. `Travel` is the segment to the next
/// station; buses at the terminus skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStep {
    Alight,
    DoorOpen,
    Board,
    DoorClose,
    Travel,
}

/// Where a Bus process currently sits in its trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusPhase {
    /// Waiting for `depart_time`; not yet admitted.
    AwaitingDeparture,
    /// Stopped (or about to stop) at `station_index`, mid-`StationStep`.
    AtStation(StationStep),
    /// Trip finished, either by reaching the terminus or a forced stop.
    Done,
}

/// One scheduled bus trip. `stations` is the ordered list of station
/// entities for this route; `bus_id` is `<route_id>-#<seq>`.
#[derive(Debug, Clone, Component)]
pub struct Bus {
    pub route_id: String,
    pub bus_id: String,
    pub stations: Vec<Entity>,
    pub capacity: usize,
    pub depart_time: f64,
    pub initial_distance: f64,
    pub remaining_distance: f64,
    pub on_board: Vec<Entity>,
    pub total_travel_time: f64,
    pub total_travel_dist: f64,
    pub phase: BusPhase,
    pub station_index: usize,
    /// Passengers to alight at the current station, computed in the
    /// `Alight` step and consumed by `DoorOpen`/`DoorClose`/the utilization
    /// tally in `Travel`.
    pub alight_count: usize,
    /// Passengers boarded at the current station, computed in `Board`.
    pub boarded_count: usize,
    /// Total dwell time accrued at the current station (door_open +
    /// alight*alight_time + board*board_time + door_close), carried from
    /// `DoorClose` into the `Travel` utilization weight.
    pub dwell_total: f64,
    /// Whether a door cycle occurred at the current station, decided in
    /// `DoorOpen` and reused by `DoorClose` to decide its own hold.
    pub door_cycle: bool,
    /// Minutes per segment, `travel_times_min[i]` for `stations[i] -> stations[i+1]`.
    pub travel_times_min: Vec<f64>,
    /// Meters per segment, same indexing as `travel_times_min`.
    pub travel_distances_m: Vec<f64>,
}

impl Bus {
    pub fn is_last_station(&self) -> bool {
        self.station_index + 1 == self.stations.len()
    }

    pub fn current_station(&self) -> Entity {
        self.stations[self.station_index]
    }

    pub fn next_station(&self) -> Option<Entity> {
        self.stations.get(self.station_index + 1).copied()
    }
}

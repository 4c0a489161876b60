//! # Bus Transit Simulation Core
//!
//! A discrete-event simulation engine for modeling fixed-route bus transit
//! networks.
//!
//! ## Overview
//!
//! This crate provides the core simulation engine, including:
//!
//! - **Event Scheduling**: Minute-precision discrete event system
//! - **ECS Framework**: Entity Component System for station/bus/passenger state
//! - **Demand Fitting**: AIC-based distribution fitting for interarrival/alighting data
//! - **Metrics**: Slot-indexed queue, wait, utilization and trip-completion tallies
//!
//! ## Key Concepts
//!
//! - **Discrete Events**: All simulation progress happens through scheduled events
//! - **Targeted Events**: Events target specific entities (stations, buses)
//! - **Deterministic**: Seeded RNG ensures reproducible results
//! - **Bounded fleets**: Each route admits at most `max_bus` concurrent buses
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy_ecs::prelude::World;
//! use sim_core::scenario::{build_scenario, ScenarioParams, SimulationRequest};
//! use sim_core::runner::{initialize_simulation, run_until_empty, simulation_schedule};
//! use sim_core::result::finalize_results;
//!
//! # fn example(request: SimulationRequest) -> Result<(), sim_core::error::SimError> {
//! let mut world = World::new();
//! sim_core::scenario::build_scenario(&mut world, request, ScenarioParams::default().with_seed(42))?;
//! initialize_simulation(&mut world);
//!
//! let mut schedule = simulation_schedule();
//! run_until_empty(&mut world, &mut schedule, 1_000_000);
//! let result = finalize_results(&world);
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod demand;
pub mod distributions;
pub mod ecs;
pub mod error;
pub mod fitting;
pub mod metrics;
pub mod result;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;
pub mod time_context;

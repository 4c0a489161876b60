//! ECS Systems: event-driven logic that reacts to simulation events.
//!
//! Systems are functions that query and mutate the ECS world based on the
//! current event. Each system handles one process from the simulation
//! model:
//!
//! - **ArrivalGenerator**: spawns Passengers at each station
//! - **Bus**: the per-trip station-stop/travel state machine
//! - **SlotTicker**: keeps the per-slot metrics boundary ticking

pub mod arrival_generator;
pub mod bus;
pub mod slot_ticker;

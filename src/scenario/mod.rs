//! Scenario setup: parse a request into the resources and entities a run
//! needs.

mod build;
mod params;
pub mod request;

pub use build::build_scenario;
pub use params::{
    DwellConfig, FleetControl, FleetState, RngResource, RouteDef, RouteTables, ScenarioParams,
};
pub use request::SimulationRequest;

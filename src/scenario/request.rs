//! Request schema for building a simulation scenario. These are the
//! already-parsed inputs this crate accepts; request/response validation and
//! the HTTP surface live outside the crate.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StationInput {
    pub station_id: i64,
    pub station_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutePairInput {
    pub route_pair_id: i64,
    pub fst_station: String,
    pub snd_station: String,
    /// Minutes.
    pub travel_time: f64,
    /// Meters.
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemandRecordInput {
    pub station: String,
    #[serde(rename = "Distribution")]
    pub distribution: String,
    #[serde(rename = "ArgumentList")]
    pub argument_list: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemandDataInput {
    pub time_range: String,
    pub records: Vec<DemandRecordInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigurationData {
    pub station_list: Vec<StationInput>,
    pub route_pair: Vec<RoutePairInput>,
    pub alighting_data: Vec<DemandDataInput>,
    pub interarrival_data: Vec<DemandDataInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteScheduleEntry {
    pub departure_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusInformation {
    /// Km/h.
    pub bus_speed: f64,
    /// Km.
    pub max_distance: f64,
    pub max_bus: u32,
    pub bus_capacity: usize,
    /// Minutes.
    pub avg_travel_time: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioDataEntry {
    pub route_id: String,
    pub route_name: String,
    /// `<pair_id>$<pair_id>$…`.
    pub route_order: String,
    pub route_schedule: Vec<RouteScheduleEntry>,
    pub bus_information: BusInformation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    pub time_period: String,
    pub time_slot: i64,
    pub configuration_data: ConfigurationData,
    pub scenario_data: Vec<ScenarioDataEntry>,
}

use sim_core::scenario::request::{
    BusInformation, ConfigurationData, DemandDataInput, DemandRecordInput, RoutePairInput,
    RouteScheduleEntry, ScenarioDataEntry, SimulationRequest, StationInput,
};

/// Build a request for the *two-station shuttle* scenario: route [A,B], one
/// pair `tt=5min, td=1000m`, one bus, `capacity=10`, `max_distance=10000`,
/// passengers arriving at A every minute, none at B.
pub fn two_station_shuttle() -> SimulationRequest {
    SimulationRequest {
        time_period: "06.00-07.00".to_string(),
        time_slot: 15,
        configuration_data: ConfigurationData {
            station_list: vec![
                StationInput { station_id: 1, station_name: "A".to_string() },
                StationInput { station_id: 2, station_name: "B".to_string() },
            ],
            route_pair: vec![RoutePairInput {
                route_pair_id: 1,
                fst_station: "A".to_string(),
                snd_station: "B".to_string(),
                travel_time: 5.0,
                distance: 1000.0,
            }],
            alighting_data: vec![],
            interarrival_data: vec![DemandDataInput {
                time_range: "06.00-07.00".to_string(),
                records: vec![DemandRecordInput {
                    station: "A".to_string(),
                    distribution: "Constant".to_string(),
                    argument_list: "value=1".to_string(),
                }],
            }],
        },
        scenario_data: vec![ScenarioDataEntry {
            route_id: "R1".to_string(),
            route_name: "Shuttle".to_string(),
            route_order: "1".to_string(),
            route_schedule: vec![RouteScheduleEntry { departure_time: "06.00".to_string() }],
            bus_information: BusInformation {
                bus_speed: 20.0,
                max_distance: 10.0,
                max_bus: 1,
                bus_capacity: 10,
                avg_travel_time: 5.0,
            },
        }],
    }
}

/// Route [A,B,A] — three scheduled departures at t=0, `max_bus=1`, used for
/// the admission-cap scenario.
pub fn admission_cap_route() -> SimulationRequest {
    let mut req = two_station_shuttle();
    req.configuration_data.route_pair.push(RoutePairInput {
        route_pair_id: 2,
        fst_station: "B".to_string(),
        snd_station: "A".to_string(),
        travel_time: 5.0,
        distance: 1000.0,
    });
    req.configuration_data.interarrival_data.clear();
    req.scenario_data[0].route_order = "1$2".to_string();
    req.scenario_data[0].route_schedule = vec![
        RouteScheduleEntry { departure_time: "06.00".to_string() },
        RouteScheduleEntry { departure_time: "06.00".to_string() },
        RouteScheduleEntry { departure_time: "06.00".to_string() },
    ];
    req
}

/// Route [A,B,C] with `td = 600 + 600`, `max_distance = 700` — the first
/// segment fits the budget (bus reaches B) but the second doesn't, so the
/// bus force-stops partway to C.
pub fn distance_exhaustion_route() -> SimulationRequest {
    SimulationRequest {
        time_period: "06.00-07.00".to_string(),
        time_slot: 15,
        configuration_data: ConfigurationData {
            station_list: vec![
                StationInput { station_id: 1, station_name: "A".to_string() },
                StationInput { station_id: 2, station_name: "B".to_string() },
                StationInput { station_id: 3, station_name: "C".to_string() },
            ],
            route_pair: vec![
                RoutePairInput {
                    route_pair_id: 1,
                    fst_station: "A".to_string(),
                    snd_station: "B".to_string(),
                    travel_time: 2.0,
                    distance: 600.0,
                },
                RoutePairInput {
                    route_pair_id: 2,
                    fst_station: "B".to_string(),
                    snd_station: "C".to_string(),
                    travel_time: 2.0,
                    distance: 600.0,
                },
            ],
            alighting_data: vec![],
            interarrival_data: vec![DemandDataInput {
                time_range: "06.00-07.00".to_string(),
                records: vec![DemandRecordInput {
                    station: "A".to_string(),
                    distribution: "Constant".to_string(),
                    argument_list: "value=1".to_string(),
                }],
            }],
        },
        scenario_data: vec![ScenarioDataEntry {
            route_id: "R1".to_string(),
            route_name: "LongHaul".to_string(),
            route_order: "1$2".to_string(),
            route_schedule: vec![RouteScheduleEntry { departure_time: "06.00".to_string() }],
            bus_information: BusInformation {
                bus_speed: 20.0,
                max_distance: 0.7,
                max_bus: 1,
                bus_capacity: 10,
                avg_travel_time: 4.0,
            },
        }],
    }
}

/// One station A, a single-station loop route, `capacity=1`, `max_distance=0`
/// — the bus force-stops at its first event, never alighting anyone.
pub fn single_station_loopback() -> SimulationRequest {
    SimulationRequest {
        time_period: "06.00-07.00".to_string(),
        time_slot: 15,
        configuration_data: ConfigurationData {
            station_list: vec![StationInput { station_id: 1, station_name: "A".to_string() }],
            route_pair: vec![],
            alighting_data: vec![],
            interarrival_data: vec![DemandDataInput {
                time_range: "06.00-07.00".to_string(),
                records: vec![DemandRecordInput {
                    station: "A".to_string(),
                    // Fast, deterministic arrivals stand in for the named
                    // scenario's Poisson(lambda=10/min) process so the test
                    // doesn't depend on a specific RNG draw to see growth.
                    distribution: "Constant".to_string(),
                    argument_list: "value=0.1".to_string(),
                }],
            }],
        },
        scenario_data: vec![ScenarioDataEntry {
            route_id: "R1".to_string(),
            route_name: "A".to_string(),
            route_order: String::new(),
            route_schedule: vec![RouteScheduleEntry { departure_time: "06.00".to_string() }],
            bus_information: BusInformation {
                bus_speed: 20.0,
                max_distance: 0.0,
                max_bus: 1,
                bus_capacity: 1,
                avg_travel_time: 5.0,
            },
        }],
    }
}

//! ScenarioMapper: turns a parsed [`SimulationRequest`] into a populated
//! `World`, doing every unit conversion and rule-table build up front so
//! systems never touch raw request data.

use std::collections::{HashMap, HashSet};

use bevy_ecs::prelude::{Entity, World};

use crate::clock::{EventKind, EventScheduler, EventSubject, SimulationEndTime};
use crate::demand::{AlightingRules, DemandTable, InterarrivalRules};
use crate::distributions::DistributionFactory;
use crate::ecs::{ArrivalGenerator, ArrivalPhase, Bus, BusPhase, Station, WaitQueue};
use crate::error::SimError;
use crate::metrics::MetricsStore;
use crate::scenario::params::{
    FleetControl, FleetState, RngResource, RouteDef, RouteTables, ScenarioParams,
};
use crate::scenario::request::{DemandDataInput, RoutePairInput, ScenarioDataEntry, SimulationRequest};
use crate::telemetry::SimulationLog;
use crate::time_context::{parse_hour_min, TimeContext};

const KM_PER_HOUR_TO_M_PER_SEC: f64 = 1000.0 / 3600.0;

/// Build a fully-populated simulation `World` from a request. Inserts every
/// resource the systems need and spawns every Station/Bus entity; returns an
/// error without mutating `world` at all if the request is malformed. Every
/// field is validated and every table built before the first `world.spawn`.
pub fn build_scenario(
    world: &mut World,
    request: SimulationRequest,
    params: ScenarioParams,
) -> Result<(), SimError> {
    let time_context = TimeContext::new(&request.time_period, request.time_slot)?;
    let num_slots = time_context.num_slots as usize;

    let mut station_names: Vec<String> = Vec::new();
    let mut station_name_set: HashSet<String> = HashSet::new();
    for station in &request.configuration_data.station_list {
        if !station_name_set.insert(station.station_name.clone()) {
            return Err(SimError::InvalidInput(format!(
                "duplicate station name `{}`",
                station.station_name
            )));
        }
        station_names.push(station.station_name.clone());
    }

    let mut route_pairs: HashMap<i64, &RoutePairInput> = HashMap::new();
    for pair in &request.configuration_data.route_pair {
        if route_pairs.insert(pair.route_pair_id, pair).is_some() {
            return Err(SimError::InvalidInput(format!(
                "duplicate route_pair_id {}",
                pair.route_pair_id
            )));
        }
    }

    let mut interarrival_rules = DemandTable::new();
    build_demand_table(
        &mut interarrival_rules,
        &request.configuration_data.interarrival_data,
        &time_context,
    )?;
    interarrival_rules.finalize();

    let mut alighting_rules = DemandTable::new();
    build_demand_table(
        &mut alighting_rules,
        &request.configuration_data.alighting_data,
        &time_context,
    )?;
    alighting_rules.finalize();

    let mut route_ids: Vec<String> = Vec::new();
    let mut route_tables = RouteTables::default();
    let mut fleet_control = FleetControl::default();
    let mut bus_specs: Vec<(String, f64, Vec<String>, usize, f64, Vec<f64>, Vec<f64>)> = Vec::new();

    for entry in &request.scenario_data {
        route_ids.push(entry.route_id.clone());
        let (stations, travel_times_min, travel_distances_m) =
            resolve_route(entry, &route_pairs, &station_name_set)?;

        let max_distance_m = entry.bus_information.max_distance * 1000.0;
        route_tables.0.insert(
            entry.route_id.clone(),
            RouteDef {
                stations: stations.clone(),
                travel_times_min: travel_times_min.clone(),
                travel_distances_m: travel_distances_m.clone(),
            },
        );
        fleet_control.0.insert(
            entry.route_id.clone(),
            FleetState {
                max_bus: entry.bus_information.max_bus,
                active_bus: 0,
                bus_seq: 0,
                max_distance_m,
            },
        );

        for schedule_entry in &entry.route_schedule {
            let real_depart = parse_hour_min(&schedule_entry.departure_time)?;
            let sim_depart = time_context.to_sim(real_depart);
            bus_specs.push((
                entry.route_id.clone(),
                sim_depart,
                stations.clone(),
                entry.bus_information.bus_capacity,
                max_distance_m,
                travel_times_min.clone(),
                travel_distances_m.clone(),
            ));
        }
    }

    // Every field has now been validated and every table built; nothing below
    // this point can return `Err`, so it's safe to start mutating `world`.

    let mut station_entities: HashMap<String, Entity> = HashMap::new();
    for name in &station_names {
        let entity = world
            .spawn((
                Station { name: name.clone() },
                WaitQueue::default(),
                ArrivalGenerator { phase: ArrivalPhase::AwaitingRule },
            ))
            .id();
        station_entities.insert(name.clone(), entity);
    }

    world.insert_resource(time_context);
    world.insert_resource(SimulationEndTime(time_context.sim_duration as f64));
    world.insert_resource(EventScheduler::default());
    world.insert_resource(RngResource::new(params.seed.unwrap_or(0)));
    world.insert_resource(params.dwell.unwrap_or_default());
    world.insert_resource(InterarrivalRules(interarrival_rules));
    world.insert_resource(AlightingRules(alighting_rules));
    world.insert_resource(route_tables);
    world.insert_resource(fleet_control);
    world.insert_resource(MetricsStore::new(num_slots, &station_names, &route_ids));
    world.insert_resource(SimulationLog::default());

    for (route_id, depart_time, stations, capacity, max_distance_m, tt, td) in bus_specs {
        let stations: Vec<Entity> = stations.iter().map(|name| station_entities[name]).collect();
        let bus_entity = world
            .spawn(Bus {
                route_id,
                bus_id: String::new(),
                stations,
                capacity,
                depart_time,
                initial_distance: max_distance_m,
                remaining_distance: max_distance_m,
                on_board: Vec::new(),
                total_travel_time: 0.0,
                total_travel_dist: 0.0,
                phase: BusPhase::AwaitingDeparture,
                station_index: 0,
                alight_count: 0,
                boarded_count: 0,
                dwell_total: 0.0,
                door_cycle: false,
                travel_times_min: tt,
                travel_distances_m: td,
            })
            .id();
        world
            .resource_mut::<EventScheduler>()
            .schedule_at(depart_time, EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
    }

    for name in &station_names {
        let entity = station_entities[name];
        world
            .resource_mut::<EventScheduler>()
            .schedule_at(0.0, EventKind::ArrivalWake, Some(EventSubject::Station(entity)));
    }

    Ok(())
}

fn build_demand_table(
    table: &mut DemandTable,
    data: &[DemandDataInput],
    time_context: &TimeContext,
) -> Result<(), SimError> {
    for entry in data {
        let (t0, t1) = time_context.range_to_sim(&entry.time_range)?;
        for record in &entry.records {
            let dist = DistributionFactory::parse(&record.distribution, &record.argument_list)?;
            table.insert(&record.station, t0, t1, dist);
        }
    }
    Ok(())
}

/// Resolve a scenario entry's `route_order` into an ordered station-name
/// list plus precomputed per-segment travel time/distance. A route with an
/// empty `route_order` (no pairs) is a single-station loop whose station is
/// the entry's `route_name`, matched against `station_list`.
fn resolve_route(
    entry: &ScenarioDataEntry,
    route_pairs: &HashMap<i64, &RoutePairInput>,
    station_name_set: &HashSet<String>,
) -> Result<(Vec<String>, Vec<f64>, Vec<f64>), SimError> {
    let trimmed = entry.route_order.trim();
    if trimmed.is_empty() {
        if !station_name_set.contains(&entry.route_name) {
            return Err(SimError::InvalidInput(format!(
                "single-station route `{}` names an unknown station",
                entry.route_name
            )));
        }
        return Ok((vec![entry.route_name.clone()], Vec::new(), Vec::new()));
    }

    let mut pairs = Vec::new();
    for piece in trimmed.split('$') {
        let pair_id: i64 = piece.trim().parse().map_err(|_| {
            SimError::InvalidInput(format!("malformed route_pair_id `{piece}` in route_order"))
        })?;
        let pair = *route_pairs
            .get(&pair_id)
            .ok_or_else(|| SimError::MissingTable(format!("route_pair_id {pair_id} not found")))?;
        pairs.push(pair);
    }

    let mut stations = vec![pairs[0].fst_station.clone()];
    for pair in &pairs {
        stations.push(pair.snd_station.clone());
    }
    for name in &stations {
        if !station_name_set.contains(name) {
            return Err(SimError::InvalidInput(format!("route references unknown station `{name}`")));
        }
    }

    let total_dist: f64 = pairs.iter().map(|p| p.distance).sum();
    let speed_mps = entry.bus_information.bus_speed * KM_PER_HOUR_TO_M_PER_SEC;
    let avg_trip_time_sec = entry.bus_information.avg_travel_time * 60.0;

    let mut travel_times_min = Vec::with_capacity(pairs.len());
    let mut travel_distances_m = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let ideal_time_sec = pair.travel_time * 60.0;
        let by_speed = if speed_mps > 0.0 { pair.distance / speed_mps } else { f64::INFINITY };
        let by_share = if total_dist > 0.0 {
            pair.distance / total_dist * avg_trip_time_sec
        } else {
            0.0
        };
        let tt_sec = by_speed.max(by_share).max(ideal_time_sec);
        travel_times_min.push(tt_sec / 60.0);
        travel_distances_m.push(pair.distance);
    }

    Ok((stations, travel_times_min, travel_distances_m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::request::{
        BusInformation, ConfigurationData, DemandDataInput, DemandRecordInput, RouteScheduleEntry,
        StationInput,
    };

    fn minimal_request() -> SimulationRequest {
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
                alighting_data: vec![DemandDataInput {
                    time_range: "06.00-07.00".to_string(),
                    records: vec![DemandRecordInput {
                        station: "B".to_string(),
                        distribution: "Constant".to_string(),
                        argument_list: "value=1".to_string(),
                    }],
                }],
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

    #[test]
    fn builds_stations_routes_and_a_bus() {
        let mut world = World::new();
        build_scenario(&mut world, minimal_request(), ScenarioParams::default().with_seed(1)).unwrap();

        assert_eq!(world.query::<&Station>().iter(&world).count(), 2);
        assert_eq!(world.query::<&Bus>().iter(&world).count(), 1);
        let routes = world.resource::<RouteTables>();
        assert_eq!(routes.0["R1"].travel_times_min.len(), 1);
        assert!(!world.resource::<EventScheduler>().is_empty());
    }

    #[test]
    fn duplicate_route_pair_id_is_rejected() {
        let mut req = minimal_request();
        req.configuration_data.route_pair.push(RoutePairInput {
            route_pair_id: 1,
            fst_station: "A".to_string(),
            snd_station: "B".to_string(),
            travel_time: 5.0,
            distance: 1000.0,
        });
        let mut world = World::new();
        let err = build_scenario(&mut world, req, ScenarioParams::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput(_)));
        assert_eq!(world.query::<&Station>().iter(&world).count(), 0);
    }

    #[test]
    fn missing_route_pair_id_is_a_missing_table_error() {
        let mut req = minimal_request();
        req.scenario_data[0].route_order = "99".to_string();
        let mut world = World::new();
        let err = build_scenario(&mut world, req, ScenarioParams::default()).unwrap_err();
        assert!(matches!(err, SimError::MissingTable(_)));
    }

    #[test]
    fn empty_route_order_resolves_to_single_station_loop() {
        let mut req = minimal_request();
        req.scenario_data[0].route_order = String::new();
        req.scenario_data[0].route_name = "A".to_string();
        let mut world = World::new();
        build_scenario(&mut world, req, ScenarioParams::default()).unwrap();
        let routes = world.resource::<RouteTables>();
        assert!(routes.0["R1"].travel_times_min.is_empty());
        assert_eq!(routes.0["R1"].stations.len(), 1);
    }
}

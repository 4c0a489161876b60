//! Performance benchmarks for transit_sim_core using Criterion.rs.

use bevy_ecs::prelude::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sim_core::fitting::fit_interarrival;
use sim_core::runner::{initialize_simulation, run_until_empty, simulation_schedule};
use sim_core::scenario::request::{
    BusInformation, ConfigurationData, DemandDataInput, DemandRecordInput, RoutePairInput,
    RouteScheduleEntry, ScenarioDataEntry, SimulationRequest, StationInput,
};
use sim_core::scenario::{build_scenario, ScenarioParams};

fn build_linear_route_request(num_stations: usize, num_departures: usize) -> SimulationRequest {
    let station_list: Vec<StationInput> = (0..num_stations)
        .map(|i| StationInput { station_id: i as i64, station_name: format!("S{i}") })
        .collect();
    let route_pair: Vec<RoutePairInput> = (0..num_stations - 1)
        .map(|i| RoutePairInput {
            route_pair_id: i as i64 + 1,
            fst_station: format!("S{i}"),
            snd_station: format!("S{}", i + 1),
            travel_time: 3.0,
            distance: 800.0,
        })
        .collect();
    let route_order = (1..=route_pair.len()).map(|i| i.to_string()).collect::<Vec<_>>().join("$");

    SimulationRequest {
        time_period: "06.00-09.00".to_string(),
        time_slot: 15,
        configuration_data: ConfigurationData {
            station_list,
            route_pair,
            alighting_data: vec![],
            interarrival_data: vec![DemandDataInput {
                time_range: "06.00-09.00".to_string(),
                records: vec![DemandRecordInput {
                    station: "S0".to_string(),
                    distribution: "Constant".to_string(),
                    argument_list: "value=2".to_string(),
                }],
            }],
        },
        scenario_data: vec![ScenarioDataEntry {
            route_id: "R1".to_string(),
            route_name: "Bench".to_string(),
            route_order,
            route_schedule: (0..num_departures)
                .map(|i| RouteScheduleEntry { departure_time: format!("06.{:02}", (i * 5) % 60) })
                .collect(),
            bus_information: BusInformation {
                bus_speed: 25.0,
                max_distance: 50.0,
                max_bus: 10,
                bus_capacity: 40,
                avg_travel_time: 3.0,
            },
        }],
    }
}

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![("small", 5, 10), ("medium", 15, 30), ("large", 30, 60)];

    let mut group = c.benchmark_group("simulation_run");
    for (name, stations, departures) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(stations, departures),
            |b, &(stations, departures)| {
                b.iter(|| {
                    let mut world = World::new();
                    let request = build_linear_route_request(stations, departures);
                    let params = ScenarioParams::default().with_seed(42);
                    build_scenario(&mut world, request, params).unwrap();
                    initialize_simulation(&mut world);
                    let mut schedule = simulation_schedule();
                    black_box(run_until_empty(&mut world, &mut schedule, 1_000_000));
                });
            },
        );
    }
    group.finish();
}

fn bench_fitting_engine(c: &mut Criterion) {
    let raw: Vec<f64> = (0..500).map(|i| 1.0 + (i % 7) as f64 * 0.5).collect();

    let mut group = c.benchmark_group("fitting_engine");
    group.bench_function("fit_interarrival_500_samples", |b| {
        b.iter(|| black_box(fit_interarrival(&raw)));
    });
    group.finish();
}

criterion_group!(benches, bench_simulation_run, bench_fitting_engine);
criterion_main!(benches);

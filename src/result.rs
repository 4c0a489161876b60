//! Simulation output assembly. Reads the final `MetricsStore`/`SimulationLog`
//! and shapes them into the serializable result a caller gets back, applying
//! the sentinel policy for empty cells.

use bevy_ecs::prelude::World;
use serde::Serialize;

use crate::metrics::MetricsStore;
use crate::telemetry::SimulationLog;
use crate::time_context::TimeContext;

/// Sentinel for empty per-slot queue/wait cells.
pub const SLOT_SENTINEL: f64 = -99_999.9;
/// Default for empty global summary fields.
const GLOBAL_SENTINEL: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultSummary {
    pub average_waiting_time: f64,
    pub average_queue_length: f64,
    pub average_utilization: f64,
    pub average_travel_time: f64,
    pub average_travel_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TotalStation {
    pub station_waiting: f64,
    pub station_queue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultStation {
    pub station_name: String,
    pub station_waiting: f64,
    pub station_queue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRoute {
    pub route_id: String,
    pub route_waiting: f64,
    pub route_queue: f64,
    pub route_util: f64,
    pub route_travel_time: f64,
    pub route_travel_distance: f64,
    pub customers_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSlotResult {
    pub slot_name: String,
    pub result_total_station: TotalStation,
    pub result_station: Vec<ResultStation>,
    pub result_route: Vec<ResultRoute>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRow {
    pub time: String,
    pub component: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub result_summary: ResultSummary,
    pub slot_results: Vec<SimulationSlotResult>,
    pub logs: Vec<LogRow>,
}

/// Assemble the final result from a finished run's `World`.
pub fn finalize_results(world: &World) -> SimulationResult {
    let metrics = world.resource::<MetricsStore>();
    let log = world.resource::<SimulationLog>();
    let time_context = world.resource::<TimeContext>();

    let mut station_names: Vec<&String> = metrics.station_queue.keys().collect();
    station_names.sort();

    let mut slot_results = Vec::with_capacity(metrics.slots.len());
    let mut queue_means_for_global = Vec::new();

    for (idx, slot) in metrics.slots.iter().enumerate() {
        let t0 = idx as f64 * time_context.slot_length as f64;
        let t1 = t0 + time_context.slot_length as f64;

        let mut result_station = Vec::with_capacity(station_names.len());
        let mut waiting_sum = 0.0;
        let mut waiting_count = 0u64;
        let mut queue_sum = 0.0;
        let mut queue_count = 0u64;

        for name in &station_names {
            let station_waiting = slot
                .station
                .get(*name)
                .map(|s| s.waiting.mean(SLOT_SENTINEL))
                .unwrap_or(SLOT_SENTINEL);
            let station_queue = metrics
                .station_queue
                .get(*name)
                .map(|m| m.mean_in_range(t0, t1, SLOT_SENTINEL))
                .unwrap_or(SLOT_SENTINEL);

            if station_waiting != SLOT_SENTINEL {
                waiting_sum += station_waiting;
                waiting_count += 1;
            }
            if station_queue != SLOT_SENTINEL {
                queue_sum += station_queue;
                queue_count += 1;
                queue_means_for_global.push(station_queue);
            }

            result_station.push(ResultStation {
                station_name: (*name).clone(),
                station_waiting,
                station_queue,
            });
        }

        let result_total_station = TotalStation {
            station_waiting: if waiting_count > 0 { waiting_sum / waiting_count as f64 } else { SLOT_SENTINEL },
            station_queue: if queue_count > 0 { queue_sum / queue_count as f64 } else { SLOT_SENTINEL },
        };

        let mut route_ids: Vec<&String> = slot.route.keys().collect();
        route_ids.sort();
        let mut result_route = Vec::with_capacity(route_ids.len());
        for route_id in route_ids {
            let r = &slot.route[route_id];
            result_route.push(ResultRoute {
                route_id: route_id.clone(),
                route_waiting: r.waiting.mean(SLOT_SENTINEL),
                route_queue: r.queue.mean(SLOT_SENTINEL),
                route_util: r.util.mean(SLOT_SENTINEL),
                route_travel_time: r.travel_time.mean(SLOT_SENTINEL),
                route_travel_distance: r.travel_dist.mean(SLOT_SENTINEL),
                customers_count: r.customer_count,
            });
        }

        slot_results.push(SimulationSlotResult {
            slot_name: time_context.slot_label(idx),
            result_total_station,
            result_station,
            result_route,
        });
    }

    let average_queue_length = if queue_means_for_global.is_empty() {
        GLOBAL_SENTINEL
    } else {
        queue_means_for_global.iter().sum::<f64>() / queue_means_for_global.len() as f64
    };

    let result_summary = ResultSummary {
        average_waiting_time: metrics.global_waiting.mean(GLOBAL_SENTINEL),
        average_queue_length,
        average_utilization: metrics.global_util.mean(GLOBAL_SENTINEL),
        average_travel_time: metrics.global_travel_time.mean(GLOBAL_SENTINEL),
        average_travel_distance: metrics.global_travel_dist.mean(GLOBAL_SENTINEL),
    };

    let logs = log
        .to_output_rows(time_context)
        .into_iter()
        .map(|(time, component, message)| LogRow { time, component: component.to_string(), message })
        .collect();

    SimulationResult { result_summary, slot_results, logs }
}

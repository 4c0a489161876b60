//! Bus process: one state machine per scheduled trip, advanced one
//! `StationStep` per popped `BusStep` event. `hold(dt)` is realized as
//! "schedule the next step `dt` minutes from now"; steps with no dwell still
//! reschedule with `hold(0.0)` rather than being skipped, keeping control
//! flow uniform.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventScheduler, EventSubject};
use crate::demand::AlightingRules;
use crate::ecs::{Bus, BusPhase, Passenger, PassengerState, Station, StationStep, WaitQueue};
use crate::metrics::MetricsStore;
use crate::scenario::params::{DwellConfig, FleetControl, RngResource};
use crate::telemetry::SimulationLog;
use crate::time_context::TimeContext;

#[allow(clippy::too_many_arguments)]
pub fn bus_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<EventScheduler>,
    mut fleet: ResMut<FleetControl>,
    dwell: Res<DwellConfig>,
    alighting_rules: Res<AlightingRules>,
    time_context: Res<TimeContext>,
    mut rng: ResMut<RngResource>,
    mut metrics: ResMut<MetricsStore>,
    mut log: ResMut<SimulationLog>,
    mut commands: Commands,
    mut buses: Query<&mut Bus>,
    mut stations: Query<(&Station, &mut WaitQueue)>,
    mut passengers: Query<&mut Passenger>,
) {
    if event.0.kind != EventKind::BusStep {
        return;
    }
    let Some(EventSubject::Bus(bus_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut bus) = buses.get_mut(bus_entity) else {
        return;
    };

    let now = clock.now();
    let slot = time_context.slot_index(now);

    match bus.phase {
        BusPhase::AwaitingDeparture => {
            let state = fleet
                .0
                .get_mut(&bus.route_id)
                .unwrap_or_else(|| panic!("fleet control missing for route {}", bus.route_id));
            if state.active_bus >= state.max_bus {
                log.push(
                    now,
                    "bus",
                    format!("departure rejected for route {} (max_bus reached)", bus.route_id),
                );
                commands.entity(bus_entity).despawn();
                return;
            }
            state.active_bus += 1;
            state.bus_seq += 1;
            bus.bus_id = format!("{}-#{}", bus.route_id, state.bus_seq);
            bus.phase = BusPhase::AtStation(StationStep::Alight);
            log.push(now, "bus", format!("{} departed", bus.bus_id));
            clock.schedule_in(0.0, EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
        }
        BusPhase::AtStation(StationStep::Alight) => {
            let is_first = bus.station_index == 0;
            let is_last = bus.is_last_station();
            let station_name = {
                let (s, _) = stations.get(bus.current_station()).expect("bus station entity missing");
                s.name.clone()
            };

            let alight_count = if is_first {
                0
            } else if is_last {
                bus.on_board.len()
            } else {
                match alighting_rules.0.active_at(&station_name, now) {
                    Some(dist) => (dist.sample(&mut rng.0).floor().max(0.0) as usize)
                        .min(bus.on_board.len()),
                    None => 0,
                }
            };
            bus.alight_count = alight_count;
            bus.dwell_total = 0.0;

            for _ in 0..alight_count {
                let passenger_entity = bus.on_board.remove(0);
                if let Ok(mut p) = passengers.get_mut(passenger_entity) {
                    p.state = PassengerState::Exited;
                }
                commands.entity(passenger_entity).despawn();
            }
            if alight_count > 0 {
                log.push(
                    now,
                    "bus",
                    format!("{} alighted {alight_count} at {station_name}", bus.bus_id),
                );
            }

            let hold = if dwell.enabled && alight_count > 0 {
                alight_count as f64 * dwell.alight_time_min
            } else {
                0.0
            };
            bus.dwell_total += hold;
            bus.phase = BusPhase::AtStation(StationStep::DoorOpen);
            clock.schedule_in(hold, EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
        }
        BusPhase::AtStation(StationStep::DoorOpen) => {
            let is_last = bus.is_last_station();
            let queue_nonempty = {
                let (_, queue) = stations.get(bus.current_station()).expect("station");
                !queue.is_empty()
            };
            let door_cycle = bus.alight_count > 0 || (!is_last && queue_nonempty);
            bus.door_cycle = door_cycle;

            let hold = if dwell.enabled && door_cycle {
                dwell.door_open_time_min
            } else {
                0.0
            };
            bus.dwell_total += hold;
            bus.phase = BusPhase::AtStation(StationStep::Board);
            clock.schedule_in(hold, EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
        }
        BusPhase::AtStation(StationStep::Board) => {
            let is_last = bus.is_last_station();
            let (station_name, station_entity) = {
                let e = bus.current_station();
                let (s, _) = stations.get(e).expect("station");
                (s.name.clone(), e)
            };

            let depth = stations.get(station_entity).expect("station").1.len();
            metrics.tally_queue_depth(&station_name, now, depth);
            if depth > 0 {
                metrics.tally_route_queue(slot, &bus.route_id, depth);
            }

            let mut boarded = 0usize;
            if !is_last {
                loop {
                    if bus.on_board.len() >= bus.capacity {
                        break;
                    }
                    let popped = {
                        let (_, mut queue) = stations.get_mut(station_entity).expect("station");
                        queue.pop()
                    };
                    let Some(passenger_entity) = popped else { break };
                    let arrival_time = passengers
                        .get(passenger_entity)
                        .map(|p| p.arrival_time)
                        .unwrap_or(now);
                    let waiting = (now - arrival_time).max(0.0);
                    metrics.tally_boarding_wait(slot, &station_name, &bus.route_id, waiting);
                    if let Ok(mut p) = passengers.get_mut(passenger_entity) {
                        p.state = PassengerState::OnBus;
                    }
                    bus.on_board.push(passenger_entity);
                    boarded += 1;
                    let new_depth = stations.get(station_entity).expect("station").1.len();
                    metrics.tally_queue_depth(&station_name, now, new_depth);
                }
            }
            bus.boarded_count = boarded;
            if boarded > 0 {
                log.push(
                    now,
                    "bus",
                    format!("{} boarded {boarded} at {station_name}", bus.bus_id),
                );
            }

            let hold = if dwell.enabled && boarded > 0 {
                boarded as f64 * dwell.board_time_min
            } else {
                0.0
            };
            bus.dwell_total += hold;
            bus.phase = BusPhase::AtStation(StationStep::DoorClose);
            clock.schedule_in(hold, EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
        }
        BusPhase::AtStation(StationStep::DoorClose) => {
            let hold = if dwell.enabled && bus.door_cycle {
                dwell.door_close_time_min
            } else {
                0.0
            };
            bus.dwell_total += hold;
            bus.total_travel_time += bus.dwell_total;

            if bus.is_last_station() {
                finish_trip(&mut bus, &mut fleet, &mut metrics, &mut log, slot, now);
                commands.entity(bus_entity).despawn();
            } else {
                bus.phase = BusPhase::AtStation(StationStep::Travel);
                clock.schedule_in(hold, EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
            }
        }
        BusPhase::AtStation(StationStep::Travel) => {
            let i = bus.station_index;
            let tt = bus.travel_times_min[i];
            let td = bus.travel_distances_m[i];

            bus.remaining_distance -= td;
            if bus.remaining_distance < 0.0 {
                let route_id = bus.route_id.clone();
                for passenger_entity in bus.on_board.drain(..) {
                    if let Ok(mut p) = passengers.get_mut(passenger_entity) {
                        p.state = PassengerState::Exited;
                    }
                    commands.entity(passenger_entity).despawn();
                }
                if let Some(state) = fleet.0.get_mut(&route_id) {
                    state.active_bus = state.active_bus.saturating_sub(1);
                }
                bus.remaining_distance = bus.initial_distance;
                bus.phase = BusPhase::Done;
                log.push(
                    now,
                    "bus",
                    format!("{} force-stopped (distance exhausted)", bus.bus_id),
                );
                commands.entity(bus_entity).despawn();
                return;
            }

            let util = bus.on_board.len() as f64 / bus.capacity as f64;
            let weight = bus.dwell_total + tt;
            metrics.tally_utilization(slot, &bus.route_id, util, weight);
            bus.total_travel_time += tt;
            bus.total_travel_dist += td;

            bus.station_index += 1;
            bus.phase = BusPhase::AtStation(StationStep::Alight);
            clock.schedule_in(tt.max(1e-4), EventKind::BusStep, Some(EventSubject::Bus(bus_entity)));
        }
        BusPhase::Done => {}
    }
}

fn finish_trip(
    bus: &mut Bus,
    fleet: &mut FleetControl,
    metrics: &mut MetricsStore,
    log: &mut SimulationLog,
    slot: usize,
    now: f64,
) {
    metrics.tally_trip_completion(slot, &bus.route_id, bus.total_travel_time, bus.total_travel_dist);
    if let Some(state) = fleet.0.get_mut(&bus.route_id) {
        state.active_bus = state.active_bus.saturating_sub(1);
    }
    bus.remaining_distance = bus.initial_distance;
    bus.phase = BusPhase::Done;
    log.push(now, "bus", format!("{} completed trip", bus.bus_id));
}

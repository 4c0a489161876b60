//! Per-station ArrivalGenerator process: samples the active interarrival
//! distribution for the current slot and spawns Passengers, retrying a beat
//! later when no rule currently covers the station.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventScheduler, EventSubject};
use crate::demand::InterarrivalRules;
use crate::ecs::{ArrivalGenerator, ArrivalPhase, Passenger, PassengerState, Station, WaitQueue};
use crate::metrics::MetricsStore;
use crate::scenario::params::RngResource;
use crate::telemetry::SimulationLog;
use crate::time_context::TimeContext;

const MAX_RESAMPLE_ATTEMPTS: u32 = 10;
const FALLBACK_INTERARRIVAL_MIN: f64 = 10.0;
const MAX_PLAUSIBLE_INTERARRIVAL_MIN: f64 = 1440.0;
const NO_RULE_RETRY_MIN: f64 = 1.0;

#[allow(clippy::too_many_arguments)]
pub fn arrival_generator_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<EventScheduler>,
    rules: Res<InterarrivalRules>,
    time_context: Res<TimeContext>,
    mut rng: ResMut<RngResource>,
    mut metrics: ResMut<MetricsStore>,
    mut log: ResMut<SimulationLog>,
    mut commands: Commands,
    mut stations: Query<(&Station, &mut WaitQueue, &mut ArrivalGenerator)>,
) {
    if event.0.kind != EventKind::ArrivalWake {
        return;
    }
    let Some(EventSubject::Station(station_entity)) = event.0.subject else {
        return;
    };
    let Ok((station, mut queue, mut generator)) = stations.get_mut(station_entity) else {
        return;
    };

    let now = clock.now();

    if generator.phase == ArrivalPhase::WaitingToSpawn {
        let passenger = commands
            .spawn(Passenger {
                state: PassengerState::Queued,
                origin_station: station_entity,
                arrival_time: now,
            })
            .id();
        queue.push(passenger);
        metrics.tally_queue_depth(&station.name, now, queue.len());
        log.push(
            now,
            "arrival_generator",
            format!("passenger arrived at {}", station.name),
        );
    }

    let Some(dist) = rules.0.active_at(&station.name, now) else {
        generator.phase = ArrivalPhase::AwaitingRule;
        clock.schedule_in(
            NO_RULE_RETRY_MIN,
            EventKind::ArrivalWake,
            Some(EventSubject::Station(station_entity)),
        );
        return;
    };

    let mut sampled = dist.sample(&mut rng.0);
    let mut attempts = 0;
    while attempts < MAX_RESAMPLE_ATTEMPTS
        && (!sampled.is_finite() || sampled <= 0.0 || sampled > MAX_PLAUSIBLE_INTERARRIVAL_MIN)
    {
        sampled = dist.sample(&mut rng.0);
        attempts += 1;
    }
    let wait = if !sampled.is_finite() || sampled <= 0.0 || sampled > MAX_PLAUSIBLE_INTERARRIVAL_MIN
    {
        log.push(
            now,
            "arrival_generator",
            format!(
                "degenerate interarrival sample at {}, falling back to {FALLBACK_INTERARRIVAL_MIN} min",
                station.name
            ),
        );
        FALLBACK_INTERARRIVAL_MIN
    } else {
        sampled
    };

    generator.phase = ArrivalPhase::WaitingToSpawn;
    clock.schedule_in(
        wait.max(1e-4),
        EventKind::ArrivalWake,
        Some(EventSubject::Station(station_entity)),
    );
}

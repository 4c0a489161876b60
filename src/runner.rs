//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [EventScheduler], inserts it as [CurrentEvent],
//! then runs the schedule.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, EventScheduler, SimulationEndTime};
use crate::error::SimError;
use crate::result::{finalize_results, SimulationResult};
use crate::scenario::{build_scenario, ScenarioParams, SimulationRequest};
use crate::systems::arrival_generator::arrival_generator_system;
use crate::systems::bus::bus_system;
use crate::systems::slot_ticker::slot_ticker_system;

fn is_simulation_started(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::SimulationStarted).unwrap_or(false)
}

fn is_slot_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::SlotTick).unwrap_or(false)
}

fn is_arrival_wake(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::ArrivalWake).unwrap_or(false)
}

fn is_bus_step(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::BusStep).unwrap_or(false)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent],
/// then runs the schedule. Returns `true` if an event was processed, `false`
/// if the clock was empty or the next event is at or past
/// [SimulationEndTime] (when that resource is present).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let stop_at = world.get_resource::<SimulationEndTime>().map(|e| e.0);
    let next_ts = world.get_resource::<EventScheduler>().and_then(|c| c.next_event_time());
    if let (Some(end), Some(ts)) = (stop_at, next_ts) {
        if ts >= end {
            return false;
        }
    }

    let event = match world.resource_mut::<EventScheduler>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let stop_at = world.get_resource::<SimulationEndTime>().map(|e| e.0);
    let next_ts = world.get_resource::<EventScheduler>().and_then(|c| c.next_event_time());
    if let (Some(end), Some(ts)) = (stop_at, next_ts) {
        if ts >= end {
            return false;
        }
    }

    let event = match world.resource_mut::<EventScheduler>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs simulation steps until the event queue is empty or `max_steps` is
/// reached. Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs simulation steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    steps
}

/// Builds the default simulation schedule: all event-reacting systems plus
/// [apply_deferred] so spawned/despawned entities (passengers, buses) are
/// applied before the next step.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        arrival_generator_system.run_if(is_arrival_wake),
        bus_system.run_if(is_bus_step),
        slot_ticker_system.run_if(is_slot_tick),
        apply_deferred,
    ));
    schedule
}

/// Schedules the initial `SimulationStarted` marker event at time 0. Call
/// this after building the scenario and before running events; per-station
/// `ArrivalWake` and per-bus `BusStep` events are scheduled by
/// [crate::scenario::build_scenario] itself.
pub fn initialize_simulation(world: &mut World) {
    let mut clock = world.resource_mut::<EventScheduler>();
    clock.schedule_at(0.0, EventKind::SimulationStarted, None);
}

/// One-shot entry point: build the scenario, run it to completion (or until
/// `max_steps` events have fired), and return the assembled result. The
/// composition a thin outer HTTP layer would call.
pub fn run_scenario(
    request: SimulationRequest,
    params: ScenarioParams,
    max_steps: usize,
) -> Result<SimulationResult, SimError> {
    let mut world = World::new();
    build_scenario(&mut world, request, params)?;
    initialize_simulation(&mut world);

    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, max_steps);

    Ok(finalize_results(&world))
}

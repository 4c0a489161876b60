//! SlotTicker: periodic no-op that keeps the next tick scheduled.
//! `MetricsStore::new` pre-populates every slot up front, so there is no
//! per-tick accumulator to create; this system exists to keep the slot
//! boundary modeled as an explicit process rather than an implicit one.

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventScheduler};
use crate::time_context::TimeContext;

pub fn slot_ticker_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<EventScheduler>,
    time_context: Res<TimeContext>,
) {
    if event.0.kind != EventKind::SlotTick {
        return;
    }
    clock.schedule_in(time_context.slot_length as f64, EventKind::SlotTick, None);
}

//! Simulation log. Diagnostics are domain data, not log lines through a
//! logging facade — systems append directly to the `SimulationLog` resource
//! as they run.

use bevy_ecs::prelude::Resource;

use crate::time_context::TimeContext;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Simulation time the entry was emitted at.
    pub time: f64,
    pub component: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, Resource)]
pub struct SimulationLog {
    entries: Vec<LogEntry>,
}

impl SimulationLog {
    pub fn push(&mut self, time: f64, component: &'static str, message: impl Into<String>) {
        self.entries.push(LogEntry {
            time,
            component,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// `{time: "hh:mm", component, message}` rows, ordered by emission.
    pub fn to_output_rows(&self, time_context: &TimeContext) -> Vec<(String, &'static str, String)> {
        self.entries
            .iter()
            .map(|e| {
                (
                    time_context.sim_to_real_label(e.time),
                    e.component,
                    e.message.clone(),
                )
            })
            .collect()
    }
}

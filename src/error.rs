//! Error types surfaced to callers. Degenerate runtime conditions
//! (non-positive samples, admission rejection, forced stops) are recovered
//! in place and logged instead — they never become a [`SimError`].

use std::fmt;

/// Errors that stop a run before (or during) scenario construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Missing required field, malformed time string, unknown distribution
    /// name, non-positive slot length, duplicated route pair, etc.
    InvalidInput(String),
    /// A distribution's numeric guard was violated (e.g. `Uniform` with
    /// `high < low`, or a required parameter missing).
    InvalidDistribution(String),
    /// A route references a station pair with no travel-time/distance entry.
    MissingTable(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            SimError::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
            SimError::MissingTable(msg) => write!(f, "missing travel table entry: {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Marker for a hosted wall-clock timeout. This crate never starts a thread
/// or enforces this itself; a caller running [`crate::runner::run_until_empty`]
/// on its own thread constructs this if it abandons the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    pub after_secs: u64,
}

//! End-to-end: distance exhaustion.

mod support;

use sim_core::runner::run_scenario;
use sim_core::scenario::ScenarioParams;

#[test]
fn bus_reaches_b_then_force_stops_before_c() {
    let result = run_scenario(
        support::distance_exhaustion_route(),
        ScenarioParams::default().with_seed(9),
        100_000,
    )
    .unwrap();

    assert!(result.logs.iter().any(|row| row.message.contains("force-stopped")));
    // No trip ever completes normally, so no "completed trip" log appears
    // and every route's travel-time tally stays at the global sentinel.
    assert!(!result.logs.iter().any(|row| row.message.contains("completed trip")));
    assert_eq!(result.result_summary.average_travel_distance, 0.0);
}

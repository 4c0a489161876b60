//! End-to-end: single-station loopback. A route with no pairs is terminal at
//! its one station, so the bus never boards anyone and the queue only grows.

mod support;

use sim_core::runner::run_scenario;
use sim_core::scenario::ScenarioParams;

#[test]
fn no_one_ever_boards_and_the_queue_grows_across_slots() {
    let result = run_scenario(
        support::single_station_loopback(),
        ScenarioParams::default().with_seed(1),
        100_000,
    )
    .unwrap();

    let total_boarded: u64 = result
        .slot_results
        .iter()
        .flat_map(|s| &s.result_route)
        .map(|r| r.customers_count)
        .sum();
    assert_eq!(total_boarded, 0);

    let queue_means: Vec<f64> = result
        .slot_results
        .iter()
        .map(|s| s.result_station[0].station_queue)
        .filter(|v| *v != sim_core::result::SLOT_SENTINEL)
        .collect();
    assert!(queue_means.len() >= 2, "expected multiple slots with queue activity");
    for pair in queue_means.windows(2) {
        assert!(pair[1] > pair[0], "queue mean should strictly increase slot over slot: {queue_means:?}");
    }
}

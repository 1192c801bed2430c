//! Greedy memory-constrained policy

// Modules
mod common;

// Imports
use {
	keepsim::{
		app::AppCounters,
		sim::Exhaustion,
		AppId,
		GreedySystem,
		Policy,
		TickOutcome,
	},
	rand::Rng,
};

/// Replays `signals` through a new system, stopping at the first failed tick.
///
/// Returns the system and the failed tick, if any.
fn replay(total_mem: f64, ids: &[AppId], footprints: &[f64], signals: &[Vec<u32>]) -> (GreedySystem, Option<usize>) {
	let mut system =
		GreedySystem::new(total_mem, ids.iter().cloned(), footprints.iter().copied()).expect("Unable to create system");

	let day_len = signals.first().map_or(0, Vec::len);
	for tick in 0..day_len {
		let exec_now = signals.iter().map(|codes| codes[tick]).collect::<Vec<_>>();
		if let TickOutcome::Exhausted(_) = system.update(&exec_now) {
			return (system, Some(tick));
		}

		assert!(
			system.current_mem() <= total_mem,
			"Memory {} exceeds budget {total_mem} at tick {tick}",
			system.current_mem()
		);
		assert_eq!(system.current_mem(), system.apps().warm_memory());
	}

	(system, None)
}

#[test]
fn test_simultaneous_cold_starts_over_budget() {
	let ids = common::app_ids(2);
	let mut system = GreedySystem::new(15.0, ids, [10.0, 10.0]).expect("Unable to create system");

	let outcome = system.update(&[2, 2]);
	let TickOutcome::Exhausted(exhaustion) = outcome else {
		panic!("Expected exhaustion, found {outcome:?}");
	};
	assert_eq!(exhaustion, Exhaustion {
		deficit:   5.0,
		evictable: 0.0,
	});
}

#[test]
fn test_cold_start_evicts_eligible_idle() {
	let ids = common::app_ids(2);
	let mut system = GreedySystem::new(15.0, ids, [10.0, 10.0]).expect("Unable to create system");

	assert!(matches!(system.update(&[2, 0]), TickOutcome::Success));
	assert!(matches!(system.update(&[0, 2]), TickOutcome::Success));
	assert!(!system.apps().get(0).state);
	assert!(system.apps().get(1).state);
	assert_eq!(system.current_mem(), 10.0);
}

#[test]
fn test_budget_is_never_exceeded() {
	let mut rng = common::rng(4);
	let ids = common::app_ids(30);
	for total_mem in [20.0, 50.0, 100.0, 1000.0] {
		let footprints = ids.iter().map(|_| rng.gen_range(1.0..10.0)).collect::<Vec<f64>>();
		let signals = ids
			.iter()
			.map(|_| common::random_signal(&mut rng, 400, 0.02, 4, 4))
			.collect::<Vec<_>>();

		let (system, failed_tick) = self::replay(total_mem, &ids, &footprints, &signals);
		if total_mem >= footprints.iter().sum::<f64>() {
			assert_eq!(failed_tick, None, "Budget {total_mem} holds every application");
			assert_eq!(system.evictions(), 0);
		}
	}
}

#[test]
fn test_replay_is_deterministic() {
	let mut rng = common::rng(5);
	let ids = common::app_ids(25);

	// Note: Equal footprints make priority ties common
	let footprints = vec![4.0; ids.len()];
	let signals = ids
		.iter()
		.map(|_| common::random_signal(&mut rng, 300, 0.05, 2, 3))
		.collect::<Vec<_>>();

	let counters = |system: &GreedySystem| system.apps().iter().map(|(_, app)| app).collect::<Vec<AppCounters>>();

	let (lhs, lhs_failed) = self::replay(40.0, &ids, &footprints, &signals);
	let (rhs, rhs_failed) = self::replay(40.0, &ids, &footprints, &signals);
	assert_eq!(lhs_failed, rhs_failed);
	assert_eq!(counters(&lhs), counters(&rhs));
	assert_eq!(lhs.evictions(), rhs.evictions());
}

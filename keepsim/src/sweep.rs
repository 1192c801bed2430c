//! Sweep over days and policies
//!
//! Every `(day, policy)` pair is an independent task run on a thread pool.
//! Results are merged per policy, in day order, regardless of completion order.

// Imports
use {
	crate::{
		data::{DayError, DayFailure},
		metrics::Metrics,
		policies::{FixIntervalApp, FixIntervalSystem, GreedySystem, PolicyConfig},
		signal::ExecSignal,
		sim::{Exhaustion, Policy, RunOutput, Simulator},
	},
	itertools::Itertools,
	std::{
		panic::{self, AssertUnwindSafe},
		sync::{mpsc, Arc},
		time::Duration,
	},
	threadpool::ThreadPool,
};

/// Input of a single day
#[derive(Clone, Debug)]
pub struct DayInput {
	/// Execution signal
	pub signal: Arc<ExecSignal>,

	/// Memory footprint of each application of `signal`
	pub footprints: Arc<Vec<f64>>,
}

/// Outcome of a single `(day, policy)` task
#[derive(Clone, Debug)]
pub enum TaskOutcome {
	/// The day was fully simulated
	Completed(Metrics),

	/// The policy ran out of memory
	Failed { tick: usize, exhaustion: Exhaustion },

	/// The simulation errored or panicked
	Errored(String),
}

/// Sweep output
#[derive(Clone, Debug)]
pub struct SweepOutput {
	/// Output of each policy, in configuration order
	pub policies: Vec<PolicyOutput>,
}

/// Output of a single policy over all days
#[derive(Clone, Debug)]
pub struct PolicyOutput {
	/// Configuration
	pub config: PolicyConfig,

	/// Metrics of every completed day, concatenated in day order
	pub metrics: Metrics,

	/// Days that didn't complete
	pub failures: Vec<DayFailure>,
}

/// Sweep
#[derive(Clone, Debug)]
pub struct Sweep {
	/// Policies
	policies: Vec<PolicyConfig>,

	/// Worker threads
	workers: usize,

	/// Debug output period of each simulation
	debug_output_period: Duration,
}

impl Sweep {
	/// Creates a new sweep
	pub fn new(policies: Vec<PolicyConfig>, workers: usize, debug_output_period: Duration) -> Self {
		Self {
			policies,
			workers: workers.max(1),
			debug_output_period,
		}
	}

	/// Runs every policy over every day
	pub fn run(&self, days: &[DayInput]) -> SweepOutput {
		let pool = ThreadPool::new(self.workers);
		let (tx, rx) = mpsc::channel();

		let tasks = self.policies.len() * days.len();
		tracing::info!(tasks, workers = self.workers, "Starting sweep");
		let tasks_iter = self
			.policies
			.iter()
			.enumerate()
			.cartesian_product(days.iter().enumerate());
		for ((policy_idx, policy), (day_idx, day)) in tasks_iter {
			let tx = tx.clone();
			let policy = policy.clone();
			let day = day.clone();
			let debug_output_period = self.debug_output_period;
			pool.execute(move || {
				let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
					self::run_task(&policy, &day, debug_output_period)
				}))
				.unwrap_or_else(|err| {
					let message = err
						.downcast_ref::<&str>()
						.map(|msg| (*msg).to_owned())
						.or_else(|| err.downcast_ref::<String>().cloned())
						.unwrap_or_else(|| "Unknown panic".to_owned());
					TaskOutcome::Errored(format!("Panicked: {message}"))
				});

				tracing::debug!(%policy, day_idx, "Finished task");
				if tx.send((policy_idx, day_idx, outcome)).is_err() {
					tracing::warn!(%policy, day_idx, "Sweep stopped listening for results");
				}
			});
		}
		drop(tx);

		// Note: The channel closes once every task has sent (or dropped) its sender.
		let mut results = rx.iter().collect::<Vec<_>>();
		results.sort_by_key(|&(policy_idx, day_idx, _)| (policy_idx, day_idx));
		self.merge(days.len(), results)
	}

	/// Merges the sorted task results into each policy's output
	fn merge(&self, days: usize, results: Vec<(usize, usize, TaskOutcome)>) -> SweepOutput {
		let mut policies = self
			.policies
			.iter()
			.map(|config| PolicyOutput {
				config:   config.clone(),
				metrics:  Metrics::default(),
				failures: vec![],
			})
			.collect::<Vec<_>>();
		let mut reported = vec![vec![false; days]; self.policies.len()];

		for (policy_idx, day_idx, outcome) in results {
			reported[policy_idx][day_idx] = true;
			let output = &mut policies[policy_idx];
			match outcome {
				TaskOutcome::Completed(metrics) => output.metrics.extend(metrics),
				TaskOutcome::Failed { tick, exhaustion } => {
					tracing::warn!(policy = %output.config, day_idx, tick, ?exhaustion, "Policy ran out of memory");
					output.failures.push(DayFailure {
						day:   day_idx,
						error: DayError::Exhausted {
							tick,
							deficit: exhaustion.deficit,
							evictable: exhaustion.evictable,
						},
					});
				},
				TaskOutcome::Errored(message) => {
					tracing::warn!(policy = %output.config, day_idx, %message, "Task errored");
					output.failures.push(DayFailure {
						day:   day_idx,
						error: DayError::Errored { message },
					});
				},
			}
		}

		// Tasks whose worker died before reporting
		for (policy_idx, output) in policies.iter_mut().enumerate() {
			for day_idx in (0..days).filter(|&day_idx| !reported[policy_idx][day_idx]) {
				output.failures.push(DayFailure {
					day:   day_idx,
					error: DayError::Errored {
						message: "Task didn't report a result".to_owned(),
					},
				});
			}
			output.failures.sort_by_key(|failure| failure.day);
		}

		SweepOutput { policies }
	}
}

/// Runs a single policy over a single day
pub fn run_task(policy: &PolicyConfig, day: &DayInput, debug_output_period: Duration) -> TaskOutcome {
	let signal = &*day.signal;
	match *policy {
		PolicyConfig::FixIntervalApp { interval } => {
			let apps = (0..signal.len())
				.map(|idx| FixIntervalApp::new(interval, signal.app_codes(idx)))
				.collect::<Vec<_>>();
			TaskOutcome::Completed(Metrics::from_apps(&apps))
		},
		PolicyConfig::FixInterval { interval } => {
			let mut system = FixIntervalSystem::new(interval, signal.apps().iter().cloned());
			self::simulate(signal, &mut system, debug_output_period)
		},
		PolicyConfig::Greedy { total_mem } => {
			let mut system =
				match GreedySystem::new(total_mem, signal.apps().iter().cloned(), day.footprints.iter().copied()) {
					Ok(system) => system,
					Err(err) => return TaskOutcome::Errored(format!("{err:?}")),
				};
			self::simulate(signal, &mut system, debug_output_period)
		},
	}
}

/// Simulates `policy` over `signal`
fn simulate<P: Policy>(signal: &ExecSignal, policy: &mut P, debug_output_period: Duration) -> TaskOutcome {
	let mut sim = Simulator::new(debug_output_period);
	match sim.run(signal, policy) {
		RunOutput::Completed { .. } => TaskOutcome::Completed(Metrics::from_table(policy.apps())),
		RunOutput::Failed { tick, exhaustion } => TaskOutcome::Failed { tick, exhaustion },
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::app::AppId};

	fn day(apps: Vec<(AppId, Vec<u32>)>, footprints: Vec<f64>) -> DayInput {
		let day_len = apps.first().map_or(0, |(_, codes)| codes.len());
		DayInput {
			signal:     Arc::new(ExecSignal::from_apps(day_len, apps).expect("Unable to create signal")),
			footprints: Arc::new(footprints),
		}
	}

	#[test]
	fn merges_in_day_order() {
		let days = [
			self::day(vec![(AppId::new("o", "a"), vec![2, 0, 2])], vec![1.0]),
			self::day(vec![(AppId::new("o", "a"), vec![2, 0, 0, 0, 2])], vec![1.0]),
		];
		let sweep = Sweep::new(
			vec![PolicyConfig::FixIntervalApp { interval: 1 }, PolicyConfig::FixInterval { interval: 1 }],
			4,
			Duration::from_secs(3600),
		);

		let output = sweep.run(&days);
		assert_eq!(output.policies.len(), 2);
		for policy in &output.policies {
			assert!(policy.failures.is_empty());
			assert_eq!(policy.metrics.cold_rate, [0.5, 1.0]);
			assert_eq!(policy.metrics.mem_waste, [1.0 / 3.0, 1.0 / 3.0]);
		}
	}

	#[test]
	fn failures_are_isolated() {
		let days = [
			self::day(vec![(AppId::new("o", "a"), vec![2]), (AppId::new("o", "b"), vec![2])], vec![10.0, 10.0]),
			self::day(vec![(AppId::new("o", "a"), vec![2]), (AppId::new("o", "b"), vec![0])], vec![10.0, 10.0]),
		];
		let sweep = Sweep::new(
			vec![PolicyConfig::Greedy { total_mem: 15.0 }, PolicyConfig::FixInterval { interval: 10 }],
			2,
			Duration::from_secs(3600),
		);

		let output = sweep.run(&days);
		let greedy = &output.policies[0];
		assert_eq!(greedy.failures, [DayFailure {
			day:   0,
			error: DayError::Exhausted {
				tick:      0,
				deficit:   5.0,
				evictable: 0.0,
			},
		}]);
		assert_eq!(greedy.metrics.cold_rate, [1.0]);

		let fix_interval = &output.policies[1];
		assert!(fix_interval.failures.is_empty());
		assert_eq!(fix_interval.metrics.len(), 3);
	}

	#[test]
	fn invalid_greedy_setup_errors() {
		let day = self::day(vec![(AppId::new("o", "a"), vec![2])], vec![]);
		let outcome = run_task(&PolicyConfig::Greedy { total_mem: 1.0 }, &day, Duration::from_secs(3600));
		assert!(matches!(outcome, TaskOutcome::Errored(_)));
	}
}

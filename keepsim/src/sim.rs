//! Simulator

// Imports
use {
	crate::{
		app::AppTable,
		signal::{ExecCode, ExecSignal},
	},
	std::{
		fmt,
		time::{Duration, Instant},
	},
};

/// Simulator.
///
/// Replays a day's execution signal, tick by tick, through a policy.
#[derive(Debug)]
pub struct Simulator {
	/// Debug output period
	///
	/// Interval in which to output debug output for the policy
	debug_output_period: Duration,
}

impl Simulator {
	/// Creates a new simulator
	pub fn new(debug_output_period: Duration) -> Self {
		Self { debug_output_period }
	}

	/// Runs the simulator on every tick of `signal` with policy `policy`.
	///
	/// Stops at the first tick the policy can't satisfy.
	///
	/// # Panics
	/// Panics if `policy` doesn't manage exactly the applications of `signal`.
	pub fn run<P: Policy + ?Sized>(&mut self, signal: &ExecSignal, policy: &mut P) -> RunOutput {
		assert_eq!(
			signal.apps(),
			policy.apps().ids(),
			"Policy applications differ from the signal's"
		);

		// Note: Without a previous output, we output right away at the start
		let mut last_debug_time = None::<Instant>;

		let mut exec_now = Vec::with_capacity(signal.len());
		for tick in 0..signal.day_len() {
			signal.tick_into(tick, &mut exec_now);

			if let TickOutcome::Exhausted(exhaustion) = policy.on_tick(&exec_now) {
				tracing::debug!(tick, ?exhaustion, "Policy exhausted its capacity");
				return RunOutput::Failed { tick, exhaustion };
			}

			// Then show debug output, if it's been long enough
			let cur_time = Instant::now();
			if last_debug_time.map_or(true, |last| cur_time.duration_since(last) >= self.debug_output_period) {
				let ticks_processed_percentage = 100.0 * (tick as f64 / signal.day_len() as f64);
				tracing::info!(
					"[{ticks_processed_percentage:.2}%] Debug: {}",
					keepsim_util::DisplayWrapper::new(|f| policy.fmt_debug(f))
				);
				last_debug_time = Some(cur_time);
			}
		}

		RunOutput::Completed {
			ticks: signal.day_len(),
		}
	}
}

/// Output for [`Simulator::run`]
#[derive(Clone, Debug)]
pub enum RunOutput {
	/// Every tick was processed
	Completed {
		/// Ticks processed
		ticks: usize,
	},

	/// The policy couldn't satisfy a tick
	Failed {
		/// Tick that failed
		tick: usize,

		/// Capacity details
		exhaustion: Exhaustion,
	},
}

/// Resource-management policy.
///
/// Decides, tick by tick, which applications stay warm.
pub trait Policy {
	/// Processes a tick.
	///
	/// `exec_now` holds the execution code of every application, in [`Self::apps`] order.
	fn on_tick(&mut self, exec_now: &[ExecCode]) -> TickOutcome;

	/// Returns the application table
	fn apps(&self) -> &AppTable;

	/// Formats debug output to `f`.
	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error>;
}

/// Outcome of [`Policy::on_tick`]
#[derive(Clone, Copy, Debug)]
pub enum TickOutcome {
	/// The tick was satisfied
	Success,

	/// Not enough memory, even after evicting every eligible application
	Exhausted(Exhaustion),
}

/// Capacity exhaustion details
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Exhaustion {
	/// Memory missing to satisfy all new allocations
	pub deficit: f64,

	/// Memory that could have been reclaimed by eviction
	pub evictable: f64,
}

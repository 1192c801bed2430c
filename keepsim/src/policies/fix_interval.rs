//! Fixed idle-timeout policy

// Imports
use {
	crate::{
		app::{AppId, AppTable},
		signal::{self, ExecCode, CONTINUE, IDLE},
		sim::{Policy, TickOutcome},
	},
	std::fmt,
};

/// Fixed idle-timeout simulation of a single application.
///
/// Replays the whole signal on creation.
#[derive(Clone, Debug)]
pub struct FixIntervalApp {
	/// Idle ticks an instance is kept alive for
	interval: u64,

	/// Whether no invocation has started
	never_launched: bool,

	/// Ticks since the last execution, while warm
	idle_timer: u64,

	/// Whether an instance is provisioned
	state: bool,

	/// Whether an invocation is executing
	status: bool,

	// Invocation starts
	cold_start_count: u64,
	warm_start_count: u64,

	// Cumulative idle / busy ticks
	idle_time: u64,
	busy_time: u64,

	// Rates, only meaningful if launched
	cold_start_rate: f64,
	mem_waste_rate:  f64,
}

impl FixIntervalApp {
	/// Simulates an application with signal `codes`
	pub fn new(interval: u64, codes: &[ExecCode]) -> Self {
		let mut app = Self {
			interval,
			never_launched: true,
			idle_timer: 0,
			state: false,
			status: false,
			cold_start_count: 0,
			warm_start_count: 0,
			idle_time: 0,
			busy_time: 0,
			cold_start_rate: 0.0,
			mem_waste_rate: 0.0,
		};

		for &code in codes {
			app.step(code);
		}

		let starts = app.cold_start_count + app.warm_start_count;
		if starts > 0 {
			app.never_launched = false;
			app.cold_start_rate = app.cold_start_count as f64 / starts as f64;
			app.mem_waste_rate = app.idle_time as f64 / (app.idle_time + app.busy_time) as f64;
		}

		app
	}

	fn step(&mut self, code: ExecCode) {
		match code {
			IDLE => {
				self.status = false;
				if !self.state {
					return;
				}

				// Note: The tick that exceeds the interval evicts without counting as idle
				match self.idle_timer >= self.interval {
					true => {
						self.state = false;
						self.idle_timer = 0;
					},
					false => {
						self.idle_time += 1;
						self.idle_timer += 1;
					},
				}
			},
			CONTINUE => {
				self.busy_time += 1;
				self.idle_timer = 0;
			},
			_ => {
				let starts = u64::from(signal::starts(code));
				self.status = true;
				self.busy_time += 1;
				self.idle_timer = 0;
				match self.state {
					true => self.warm_start_count += starts,
					false => {
						self.state = true;
						self.cold_start_count += 1;
						self.warm_start_count += starts - 1;
					},
				}
			},
		}
	}

	/// Returns if no invocation ever started
	pub fn never_launched(&self) -> bool {
		self.never_launched
	}

	/// Returns the cold-start rate
	pub fn cold_start_rate(&self) -> f64 {
		self.cold_start_rate
	}

	/// Returns the memory-waste rate
	pub fn mem_waste_rate(&self) -> f64 {
		self.mem_waste_rate
	}

	/// Returns the cold and warm start counts
	pub fn start_counts(&self) -> (u64, u64) {
		(self.cold_start_count, self.warm_start_count)
	}

	/// Returns the idle and busy times
	pub fn times(&self) -> (u64, u64) {
		(self.idle_time, self.busy_time)
	}

	/// Returns if the application ended the day warm
	pub fn is_warm(&self) -> bool {
		self.state
	}
}

/// Fixed idle-timeout simulation of all applications of a day at once
#[derive(Clone, Debug)]
pub struct FixIntervalSystem {
	/// Idle ticks an instance is kept alive for
	interval: u64,

	/// Applications
	apps: AppTable,

	/// Evictions so far
	evictions: u64,
}

impl FixIntervalSystem {
	/// Creates a new system with every application cold
	pub fn new(interval: u64, ids: impl IntoIterator<Item = AppId>) -> Self {
		Self {
			interval,
			apps: AppTable::new(ids),
			evictions: 0,
		}
	}

	/// Processes one tick.
	///
	/// # Panics
	/// Panics if `exec_now` doesn't have one code per application.
	pub fn update(&mut self, exec_now: &[ExecCode]) {
		assert_eq!(exec_now.len(), self.apps.len(), "Expected one code per application");

		for (idx, &exec) in exec_now.iter().enumerate() {
			self.apps.observe(idx, exec);

			if exec > CONTINUE {
				self.apps.record_starts(idx, exec);
			}

			// Note: Every warm application is checked after its starts are recorded, so with a 0 interval
			//       an application is evicted on the tick it starts. Evicting before accruing ensures
			//       the evicting tick isn't counted as idle.
			if self.apps.state[idx] && self.apps.idle_timer[idx] >= self.interval {
				self.apps.evict(idx);
				self.evictions += 1;
			}

			match exec {
				IDLE => self.apps.accrue_idle(idx),
				CONTINUE => self.apps.accrue_busy(idx),
				_ => (),
			}
		}
	}

	/// Returns the idle interval
	pub fn interval(&self) -> u64 {
		self.interval
	}
}

impl Policy for FixIntervalSystem {
	fn on_tick(&mut self, exec_now: &[ExecCode]) -> TickOutcome {
		self.update(exec_now);
		TickOutcome::Success
	}

	fn apps(&self) -> &AppTable {
		&self.apps
	}

	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		let (cold_starts, warm_starts) = self.apps.total_starts();
		write!(
			f,
			"Interval {}: {} / {} warm, {cold_starts} cold starts, {warm_starts} warm starts, {} evictions",
			self.interval,
			self.apps.warm_len(),
			self.apps.len(),
			self.evictions
		)
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::app::AppCounters};

	fn run_system(interval: u64, codes: &[ExecCode]) -> AppCounters {
		let mut system = FixIntervalSystem::new(interval, [AppId::new("o", "a")]);
		for &code in codes {
			system.update(&[code]);
		}
		system.apps().get(0)
	}

	#[test]
	fn app_keeps_warm_for_interval() {
		let app = FixIntervalApp::new(3, &[0, 0, 2, 1, 1, 0, 0, 0, 0, 0]);
		assert_eq!(app.start_counts(), (1, 0));
		assert_eq!(app.times(), (3, 3));
		assert!(!app.never_launched());
		assert!(!app.is_warm());
		assert_eq!(app.cold_start_rate(), 1.0);
		assert_eq!(app.mem_waste_rate(), 0.5);
	}

	#[test]
	fn app_zero_interval_always_cold() {
		let app = FixIntervalApp::new(0, &[2, 0, 2, 0, 2]);
		assert_eq!(app.start_counts(), (3, 0));
		assert_eq!(app.times(), (0, 3));
	}

	#[test]
	fn app_survives_exactly_interval_idle_ticks() {
		// 2 idle ticks, then re-invoked: still warm
		let app = FixIntervalApp::new(2, &[2, 0, 0, 2]);
		assert_eq!(app.start_counts(), (1, 1));

		// 3 idle ticks: evicted on the third
		let app = FixIntervalApp::new(2, &[2, 0, 0, 0, 2]);
		assert_eq!(app.start_counts(), (2, 0));
		assert_eq!(app.times(), (2, 2));
	}

	#[test]
	fn app_concurrent_starts() {
		let app = FixIntervalApp::new(10, &[4, 1, 0, 3]);
		assert_eq!(app.start_counts(), (1, 2 + 2));
		assert_eq!(app.cold_start_rate(), 0.2);
	}

	#[test]
	fn app_never_invoked() {
		let app = FixIntervalApp::new(10, &[0; 20]);
		assert!(app.never_launched());
		assert_eq!(app.cold_start_rate(), 0.0);
		assert_eq!(app.mem_waste_rate(), 0.0);
	}

	#[test]
	fn system_keeps_warm_for_interval() {
		let app = self::run_system(3, &[0, 0, 2, 1, 1, 0, 0, 0, 0, 0]);
		assert_eq!(app.cold_start_count, 1);
		assert_eq!(app.warm_start_count, 0);
		assert_eq!(app.busy_time, 3);
		assert_eq!(app.idle_time, 3);
		assert!(!app.never_launched);
		assert!(!app.state);
	}

	#[test]
	fn system_zero_interval_always_cold() {
		let app = self::run_system(0, &[2, 0, 2, 0, 2]);
		assert_eq!(app.cold_start_count, 3);
		assert_eq!(app.warm_start_count, 0);
	}

	#[test]
	fn system_concurrent_starts() {
		// Cold start with 2 more concurrent, then 3 warm starts
		let app = self::run_system(10, &[4, 1, 0, 4]);
		assert_eq!(app.cold_start_count, 1);
		assert_eq!(app.warm_start_count, 2 + 3);
		assert_eq!(app.busy_time, 3);
		assert_eq!(app.idle_time, 1);
	}

	#[test]
	fn system_zero_interval_evicts_on_start() {
		let app = self::run_system(0, &[2, 2, 1, 2]);
		assert_eq!(app.cold_start_count, 3);
		assert_eq!(app.warm_start_count, 0);
		assert_eq!(app.busy_time, 4);
		assert_eq!(app.idle_time, 0);
		assert!(!app.state);

		// Concurrent starts on a cold start are still warm
		let app = self::run_system(0, &[3, 4]);
		assert_eq!((app.cold_start_count, app.warm_start_count), (2, 1 + 2));
	}

	#[test]
	fn system_applications_are_independent() {
		let mut system = FixIntervalSystem::new(1, [AppId::new("o", "a"), AppId::new("o", "b")]);
		for exec_now in [[2, 0], [0, 2], [0, 0], [2, 0]] {
			system.update(&exec_now);
		}

		let a = system.apps().get(0);
		let b = system.apps().get(1);
		assert_eq!((a.cold_start_count, a.warm_start_count), (2, 0));
		assert_eq!((b.cold_start_count, b.warm_start_count), (1, 0));
		assert_eq!(a.idle_time, 1);
		assert_eq!(b.idle_time, 1);
	}

	#[test]
	fn system_before_first_invocation_is_not_accounted() {
		let app = self::run_system(5, &[0, 0, 0, 0]);
		assert!(app.never_launched);
		assert_eq!(app.idle_time + app.busy_time, 0);
	}
}

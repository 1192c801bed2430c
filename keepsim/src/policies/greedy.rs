//! Greedy memory-constrained policy
//!
//! Applications stay warm until memory is needed by a cold start.
//! Eviction then picks idle applications by ascending priority, where
//! `priority = clock + frequency / memory` favors recently invoked applications,
//! and among those, the ones invoked often relative to their footprint.

// Imports
use {
	crate::{
		app::{AppId, AppIdx, AppTable},
		signal::{ExecCode, CONTINUE, IDLE},
		sim::{Exhaustion, Policy, TickOutcome},
	},
	std::fmt,
};

/// Greedy memory-constrained system
#[derive(Clone, Debug)]
pub struct GreedySystem {
	/// Memory budget
	total_mem: f64,

	/// Memory held by warm applications
	current_mem: f64,

	/// Fixed memory footprint of each application
	footprints: Vec<f64>,

	/// Applications
	apps: AppTable,

	/// Eviction priority of each application
	priority: Vec<f64>,

	/// Ticks each application started invocations on
	frequency: Vec<u64>,

	/// System clock of each application's last invocation
	clock: Vec<u64>,

	/// System clock
	system_clock: u64,

	/// Eviction candidates of the current tick
	evictable: Vec<AppIdx>,

	/// Evictions so far
	evictions: u64,
}

impl GreedySystem {
	/// Creates a new system with every application cold.
	///
	/// # Errors
	/// Returns an error if there isn't one footprint per application, if any footprint
	/// isn't positive or if the budget is negative.
	pub fn new(
		total_mem: f64,
		ids: impl IntoIterator<Item = AppId>,
		footprints: impl IntoIterator<Item = f64>,
	) -> Result<Self, anyhow::Error> {
		let apps = AppTable::new(ids);
		let footprints = footprints.into_iter().collect::<Vec<_>>();
		anyhow::ensure!(
			footprints.len() == apps.len(),
			"Expected {} footprints, found {}",
			apps.len(),
			footprints.len()
		);
		anyhow::ensure!(
			total_mem.is_finite() && total_mem >= 0.0,
			"Memory budget must be finite and non-negative, found {total_mem}"
		);
		if let Some((idx, footprint)) = footprints
			.iter()
			.enumerate()
			.find(|(_, footprint)| !(footprint.is_finite() && **footprint > 0.0))
		{
			anyhow::bail!("Application {} has invalid footprint {footprint}", apps.ids()[idx]);
		}

		let len = apps.len();
		Ok(Self {
			total_mem,
			current_mem: 0.0,
			footprints,
			apps,
			priority: vec![0.0; len],
			frequency: vec![0; len],
			clock: vec![0; len],
			system_clock: 0,
			evictable: Vec::with_capacity(len),
			evictions: 0,
		})
	}

	/// Processes one tick.
	///
	/// On [`TickOutcome::Exhausted`] the tick is abandoned and the
	/// system should no longer be used.
	///
	/// # Panics
	/// Panics if `exec_now` doesn't have one code per application.
	pub fn update(&mut self, exec_now: &[ExecCode]) -> TickOutcome {
		assert_eq!(exec_now.len(), self.apps.len(), "Expected one code per application");

		self.system_clock += 1;
		for (idx, &exec) in exec_now.iter().enumerate() {
			self.apps.observe(idx, exec);
		}

		// Memory needed by cold applications starting this tick, beyond what's free
		let new_mem = exec_now
			.iter()
			.enumerate()
			.filter(|&(idx, &exec)| exec > CONTINUE && !self.apps.state[idx])
			.map(|(idx, _)| self.footprints[idx])
			.sum::<f64>();
		let mut deficit = self.current_mem + new_mem - self.total_mem;

		// Warm applications without executions may be evicted.
		// Note: Applications starting this tick are either warm and executing or cold.
		self.evictable.clear();
		self.evictable.extend(
			exec_now
				.iter()
				.enumerate()
				.filter(|&(idx, &exec)| exec == IDLE && self.apps.state[idx])
				.map(|(idx, _)| idx),
		);
		let evictable_mem = self.evictable.iter().map(|&idx| self.apps.memory[idx]).sum::<f64>();
		if deficit > evictable_mem {
			let exhaustion = Exhaustion {
				deficit,
				evictable: evictable_mem,
			};
			tracing::trace!(system_clock = self.system_clock, ?exhaustion, "Unable to satisfy cold starts");
			return TickOutcome::Exhausted(exhaustion);
		}

		// Record the starts and refresh the priorities of invoked applications
		for (idx, &exec) in exec_now.iter().enumerate() {
			if exec > CONTINUE {
				self.apps.record_starts(idx, exec);
				self.apps.memory[idx] = self.footprints[idx];
				self.frequency[idx] += 1;
				self.clock[idx] = self.system_clock;
				self.priority[idx] = self.system_clock as f64 + self.frequency[idx] as f64 / self.footprints[idx];
			}
		}

		// Evict the lowest priorities until there's enough memory.
		// Note: Ties are broken by application index, which follows application id order.
		let mut evicted = 0;
		let sorted = deficit > 0.0;
		if sorted {
			self.sort_evictable();
			while deficit > 0.0 && evicted < self.evictable.len() {
				deficit -= self.evict_candidate(evicted);
				evicted += 1;
			}
		}

		// Note: `deficit` accumulates rounding errors, so the budget is checked against the warm memory itself
		let mut current_mem = self.apps.warm_memory();
		if current_mem > self.total_mem && !sorted {
			self.sort_evictable();
		}
		while current_mem > self.total_mem && evicted < self.evictable.len() {
			self.evict_candidate(evicted);
			evicted += 1;
			current_mem = self.apps.warm_memory();
		}
		self.current_mem = current_mem;

		// Then accrue idle and busy time
		for (idx, &exec) in exec_now.iter().enumerate() {
			match exec {
				IDLE => self.apps.accrue_idle(idx),
				CONTINUE => self.apps.accrue_busy(idx),
				_ => (),
			}
		}

		TickOutcome::Success
	}

	/// Sorts the eviction candidates by ascending `(priority, index)`
	fn sort_evictable(&mut self) {
		let priority = &self.priority;
		self.evictable
			.sort_unstable_by(|&lhs, &rhs| priority[lhs].total_cmp(&priority[rhs]).then(lhs.cmp(&rhs)));
	}

	/// Evicts the `candidate_idx`-th eviction candidate, returning the memory it released
	fn evict_candidate(&mut self, candidate_idx: usize) -> f64 {
		let idx = self.evictable[candidate_idx];
		let memory = self.apps.memory[idx];
		tracing::trace!(app = %self.apps.ids()[idx], priority = self.priority[idx], "Evicting application");
		self.apps.evict(idx);
		self.evictions += 1;

		memory
	}

	/// Returns the memory budget
	pub fn total_mem(&self) -> f64 {
		self.total_mem
	}

	/// Returns the memory held by warm applications
	pub fn current_mem(&self) -> f64 {
		self.current_mem
	}

	/// Returns the eviction priority of an application
	pub fn priority(&self, idx: AppIdx) -> f64 {
		self.priority[idx]
	}

	/// Returns the system clock of an application's last invocation
	pub fn last_invoked(&self, idx: AppIdx) -> u64 {
		self.clock[idx]
	}

	/// Returns the number of evictions so far
	pub fn evictions(&self) -> u64 {
		self.evictions
	}
}

impl Policy for GreedySystem {
	fn on_tick(&mut self, exec_now: &[ExecCode]) -> TickOutcome {
		self.update(exec_now)
	}

	fn apps(&self) -> &AppTable {
		&self.apps
	}

	fn fmt_debug(&mut self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
		let occupancy_percentage = match self.total_mem > 0.0 {
			true => 100.0 * self.current_mem / self.total_mem,
			false => 0.0,
		};
		write!(
			f,
			"Memory {:.1} / {:.1} ({occupancy_percentage:.2}%), {} / {} warm, {} evictions",
			self.current_mem,
			self.total_mem,
			self.apps.warm_len(),
			self.apps.len(),
			self.evictions
		)
	}
}

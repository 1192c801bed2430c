//! Applications
//!
//! All per-application state of a simulated day lives in a single [`AppTable`],
//! stored as a struct of arrays indexed by [`AppIdx`].

// Imports
use {
	crate::signal::{ExecCode, CONTINUE, IDLE},
	std::fmt,
};

/// Application identity, unique within a day
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AppId {
	/// Owner hash
	pub owner: String,

	/// Application hash
	pub app: String,
}

impl AppId {
	/// Creates a new application id
	pub fn new(owner: impl Into<String>, app: impl Into<String>) -> Self {
		Self {
			owner: owner.into(),
			app:   app.into(),
		}
	}
}

impl fmt::Display for AppId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.owner, self.app)
	}
}

/// Function identity
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub struct FunctionId {
	/// Owner hash
	pub owner: String,

	/// Application hash
	pub app: String,

	/// Function hash
	pub function: String,
}

impl FunctionId {
	/// Creates a new function id
	pub fn new(owner: impl Into<String>, app: impl Into<String>, function: impl Into<String>) -> Self {
		Self {
			owner:    owner.into(),
			app:      app.into(),
			function: function.into(),
		}
	}

	/// Returns the id of the application this function belongs to
	pub fn app_id(&self) -> AppId {
		AppId::new(&self.owner, &self.app)
	}
}

/// Application index into an [`AppTable`]
pub type AppIdx = usize;

/// Application table.
///
/// Holds the counters of every application of a day.
/// Every vector has exactly one entry per application.
#[derive(Clone, Debug)]
pub struct AppTable {
	/// Ids
	ids: Vec<AppId>,

	/// Whether an instance is provisioned (warm)
	pub(crate) state: Vec<bool>,

	/// Whether an invocation is executing
	pub(crate) status: Vec<bool>,

	/// Memory currently held
	pub(crate) memory: Vec<f64>,

	/// Ticks since the last execution, while warm
	pub(crate) idle_timer: Vec<u64>,

	// Cumulative idle / busy ticks
	pub(crate) idle_time: Vec<u64>,
	pub(crate) busy_time: Vec<u64>,

	// Invocation starts
	pub(crate) cold_start_count: Vec<u64>,
	pub(crate) warm_start_count: Vec<u64>,

	/// Whether no execution has been observed yet
	pub(crate) never_launched: Vec<bool>,
}

impl AppTable {
	/// Creates a table with every application cold and never launched
	pub fn new(ids: impl IntoIterator<Item = AppId>) -> Self {
		let ids = ids.into_iter().collect::<Vec<_>>();
		let len = ids.len();
		Self {
			ids,
			state: vec![false; len],
			status: vec![false; len],
			memory: vec![0.0; len],
			idle_timer: vec![0; len],
			idle_time: vec![0; len],
			busy_time: vec![0; len],
			cold_start_count: vec![0; len],
			warm_start_count: vec![0; len],
			never_launched: vec![true; len],
		}
	}

	/// Returns the number of applications
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Returns if there are no applications
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Returns all application ids
	pub fn ids(&self) -> &[AppId] {
		&self.ids
	}

	/// Returns a snapshot of an application's counters
	///
	/// # Panics
	/// Panics if `idx` is out of bounds.
	pub fn get(&self, idx: AppIdx) -> AppCounters {
		AppCounters {
			state:            self.state[idx],
			status:           self.status[idx],
			memory:           self.memory[idx],
			idle_timer:       self.idle_timer[idx],
			idle_time:        self.idle_time[idx],
			busy_time:        self.busy_time[idx],
			cold_start_count: self.cold_start_count[idx],
			warm_start_count: self.warm_start_count[idx],
			never_launched:   self.never_launched[idx],
		}
	}

	/// Returns an iterator over all applications' counters
	pub fn iter(&self) -> impl Iterator<Item = (&AppId, AppCounters)> + '_ {
		self.ids.iter().enumerate().map(|(idx, id)| (id, self.get(idx)))
	}

	/// Returns the number of warm applications
	pub fn warm_len(&self) -> usize {
		self.state.iter().filter(|&&state| state).count()
	}

	/// Returns the memory held by all warm applications
	pub fn warm_memory(&self) -> f64 {
		self.state
			.iter()
			.zip(&self.memory)
			.filter(|(&state, _)| state)
			.map(|(_, &memory)| memory)
			.sum()
	}

	/// Returns the total cold and warm starts
	pub fn total_starts(&self) -> (u64, u64) {
		let cold = self.cold_start_count.iter().sum();
		let warm = self.warm_start_count.iter().sum();
		(cold, warm)
	}

	/// Marks an application as launched if `exec` shows any execution
	pub(crate) fn observe(&mut self, idx: AppIdx, exec: ExecCode) {
		if exec != IDLE {
			self.never_launched[idx] = false;
		}
	}

	/// Records the invocations started this tick.
	///
	/// A code `exec > 1` stands for `exec - 1` concurrent starts.
	/// If the application was cold, the first one is a cold start, the rest are warm.
	pub(crate) fn record_starts(&mut self, idx: AppIdx, exec: ExecCode) {
		debug_assert!(exec > CONTINUE);
		let starts = u64::from(exec - 1);

		self.status[idx] = true;
		self.busy_time[idx] += 1;
		self.idle_timer[idx] = 0;

		match self.state[idx] {
			true => self.warm_start_count[idx] += starts,
			false => {
				self.state[idx] = true;
				self.cold_start_count[idx] += 1;
				self.warm_start_count[idx] += starts - 1;
			},
		}
	}

	/// Evicts an application, releasing its memory
	pub(crate) fn evict(&mut self, idx: AppIdx) {
		self.state[idx] = false;
		self.memory[idx] = 0.0;
		self.idle_timer[idx] = 0;
	}

	/// Accrues one tick of idleness for a warm application
	pub(crate) fn accrue_idle(&mut self, idx: AppIdx) {
		self.status[idx] = false;
		if self.state[idx] {
			self.idle_time[idx] += 1;
			self.idle_timer[idx] += 1;
		}
	}

	/// Accrues one tick of a continuing execution
	pub(crate) fn accrue_busy(&mut self, idx: AppIdx) {
		self.busy_time[idx] += 1;
		self.idle_timer[idx] = 0;
	}
}

/// Counters of a single application
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct AppCounters {
	pub state:            bool,
	pub status:           bool,
	pub memory:           f64,
	pub idle_timer:       u64,
	pub idle_time:        u64,
	pub busy_time:        u64,
	pub cold_start_count: u64,
	pub warm_start_count: u64,
	pub never_launched:   bool,
}

impl AppCounters {
	/// Returns the total number of invocation starts
	pub fn starts(&self) -> u64 {
		self.cold_start_count + self.warm_start_count
	}

	/// Returns the cold-start rate, if any invocation started
	pub fn cold_start_rate(&self) -> Option<f64> {
		match self.starts() {
			0 => None,
			starts => Some(self.cold_start_count as f64 / starts as f64),
		}
	}

	/// Returns the memory-waste rate, if any time was accounted
	pub fn mem_waste_rate(&self) -> Option<f64> {
		match self.idle_time + self.busy_time {
			0 => None,
			total => Some(self.idle_time as f64 / total as f64),
		}
	}
}

//! Execution signal
//!
//! A per-minute code for every application of a day:
//! - [`IDLE`]: nothing executing.
//! - [`CONTINUE`]: a previously started invocation is still executing.
//! - [`START`] and above: `code - 1` invocations start this minute.

// Imports
use {
	crate::{
		app::{AppId, AppIdx},
		trace::ExecSeries,
	},
	std::collections::{btree_map, BTreeMap},
};

/// Execution code
pub type ExecCode = u32;

/// No execution
pub const IDLE: ExecCode = 0;

/// Continuation of a previously started invocation
pub const CONTINUE: ExecCode = 1;

/// A single invocation starts
pub const START: ExecCode = 2;

/// Returns the code for `invocations` concurrent starts.
///
/// # Panics
/// Panics if `invocations` is 0.
pub fn start_code(invocations: u32) -> ExecCode {
	assert!(invocations > 0, "At least one invocation must start");
	invocations.saturating_add(1)
}

/// Returns the number of invocations started by `code`
pub fn starts(code: ExecCode) -> u32 {
	code.saturating_sub(1)
}

/// How the codes of an application's functions are merged
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Merge {
	/// Element-wise maximum
	#[default]
	Max,

	/// Logical or, dropping concurrency counts
	Any,
}

impl Merge {
	/// Merges two codes
	pub fn merge(self, lhs: ExecCode, rhs: ExecCode) -> ExecCode {
		match self {
			Self::Max => lhs.max(rhs),
			Self::Any => lhs.max(rhs).min(START),
		}
	}
}

/// Execution signal of a day.
///
/// Applications are sorted by id, codes are stored application-major.
#[derive(Clone, Debug)]
pub struct ExecSignal {
	/// Applications
	apps: Vec<AppId>,

	/// Day length, in ticks
	day_len: usize,

	/// Codes, `day_len` per application
	codes: Vec<ExecCode>,
}

impl ExecSignal {
	/// Creates a signal from each application's codes.
	///
	/// # Errors
	/// Returns an error if an application appears twice or its codes aren't `day_len` long.
	pub fn from_apps(
		day_len: usize,
		apps: impl IntoIterator<Item = (AppId, Vec<ExecCode>)>,
	) -> Result<Self, anyhow::Error> {
		let mut by_app = BTreeMap::new();
		for (app, codes) in apps {
			anyhow::ensure!(
				codes.len() == day_len,
				"Application {app} has {} codes, expected {day_len}",
				codes.len()
			);
			match by_app.entry(app) {
				btree_map::Entry::Vacant(entry) => {
					entry.insert(codes);
				},
				btree_map::Entry::Occupied(entry) => anyhow::bail!("Duplicate application {}", entry.key()),
			}
		}

		Ok(Self::from_sorted(day_len, by_app))
	}

	/// Creates a signal from per-function series, merging the functions of each application
	pub fn from_series(series: &ExecSeries, merge: Merge) -> Self {
		let day_len = series.day_len();
		let mut by_app = BTreeMap::<AppId, Vec<ExecCode>>::new();
		for (function, codes) in series.iter() {
			let app_codes = by_app.entry(function.app_id()).or_insert_with(|| vec![IDLE; day_len]);
			for (app_code, &code) in app_codes.iter_mut().zip(codes) {
				*app_code = merge.merge(*app_code, code);
			}
		}

		Self::from_sorted(day_len, by_app)
	}

	fn from_sorted(day_len: usize, by_app: BTreeMap<AppId, Vec<ExecCode>>) -> Self {
		let mut apps = Vec::with_capacity(by_app.len());
		let mut codes = Vec::with_capacity(by_app.len() * day_len);
		for (app, app_codes) in by_app {
			apps.push(app);
			codes.extend(app_codes);
		}

		Self { apps, day_len, codes }
	}

	/// Returns all applications
	pub fn apps(&self) -> &[AppId] {
		&self.apps
	}

	/// Returns the number of applications
	pub fn len(&self) -> usize {
		self.apps.len()
	}

	/// Returns if there are no applications
	pub fn is_empty(&self) -> bool {
		self.apps.is_empty()
	}

	/// Returns the day length
	pub fn day_len(&self) -> usize {
		self.day_len
	}

	/// Returns the codes of an application
	///
	/// # Panics
	/// Panics if `idx` is out of bounds.
	pub fn app_codes(&self, idx: AppIdx) -> &[ExecCode] {
		&self.codes[idx * self.day_len..(idx + 1) * self.day_len]
	}

	/// Writes the codes of all applications at `tick` into `exec_now`
	///
	/// # Panics
	/// Panics if `tick` is out of bounds.
	pub fn tick_into(&self, tick: usize, exec_now: &mut Vec<ExecCode>) {
		assert!(tick < self.day_len, "Tick {tick} out of bounds for day of {}", self.day_len);
		exec_now.clear();
		exec_now.extend(self.codes.iter().skip(tick).step_by(self.day_len).take(self.apps.len()));
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::app::FunctionId};

	#[test]
	fn merge_modes() {
		assert_eq!(Merge::Max.merge(1, 4), 4);
		assert_eq!(Merge::Any.merge(1, 4), START);
		assert_eq!(Merge::Any.merge(1, 0), CONTINUE);
		assert_eq!(Merge::Any.merge(0, 0), IDLE);
	}

	#[test]
	fn start_codes() {
		assert_eq!(start_code(1), START);
		assert_eq!(starts(start_code(3)), 3);
		assert_eq!(starts(CONTINUE), 0);
		assert_eq!(starts(IDLE), 0);
	}

	#[test]
	fn from_series_groups_and_sorts_apps() {
		let series = ExecSeries::from_functions(3, [
			(FunctionId::new("o2", "a", "f"), vec![0, 2, 1]),
			(FunctionId::new("o1", "a", "f1"), vec![2, 1, 0]),
			(FunctionId::new("o1", "a", "f2"), vec![0, 3, 0]),
		])
		.expect("Unable to create series");

		let signal = ExecSignal::from_series(&series, Merge::Max);
		assert_eq!(signal.apps(), [AppId::new("o1", "a"), AppId::new("o2", "a")]);
		assert_eq!(signal.app_codes(0), [2, 3, 0]);
		assert_eq!(signal.app_codes(1), [0, 2, 1]);

		let mut exec_now = vec![];
		signal.tick_into(1, &mut exec_now);
		assert_eq!(exec_now, [3, 2]);
		signal.tick_into(2, &mut exec_now);
		assert_eq!(exec_now, [0, 1]);
	}

	#[test]
	fn from_apps_validates() {
		assert!(ExecSignal::from_apps(2, [(AppId::new("o", "a"), vec![0, 2])]).is_ok());
		assert!(ExecSignal::from_apps(2, [(AppId::new("o", "a"), vec![0])]).is_err());
		assert!(ExecSignal::from_apps(1, [(AppId::new("o", "a"), vec![0]), (AppId::new("o", "a"), vec![2])]).is_err());
	}
}

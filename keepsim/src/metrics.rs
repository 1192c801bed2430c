//! Metrics

// Imports
use crate::{app::AppTable, policies::FixIntervalApp};

/// Per-application metrics of launched applications.
///
/// `cold_rate[i]` and `mem_waste[i]` belong to the same application.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct Metrics {
	/// Cold starts over all starts
	pub cold_rate: Vec<f64>,

	/// Idle time over warm time
	pub mem_waste: Vec<f64>,
}

impl Metrics {
	/// Creates metrics from the counters of a finished day.
	///
	/// Applications that were never launched, or that only continued
	/// invocations started on a previous day, are skipped.
	pub fn from_table(apps: &AppTable) -> Self {
		let (cold_rate, mem_waste) = apps
			.iter()
			.filter(|(_, app)| !app.never_launched)
			.filter_map(|(_, app)| app.cold_start_rate().zip(app.mem_waste_rate()))
			.unzip();

		Self { cold_rate, mem_waste }
	}

	/// Creates metrics from per-application simulations
	pub fn from_apps<'a>(apps: impl IntoIterator<Item = &'a FixIntervalApp>) -> Self {
		let (cold_rate, mem_waste) = apps
			.into_iter()
			.filter(|app| !app.never_launched())
			.map(|app| (app.cold_start_rate(), app.mem_waste_rate()))
			.unzip();

		Self { cold_rate, mem_waste }
	}

	/// Appends the metrics of `other`
	pub fn extend(&mut self, other: Self) {
		self.cold_rate.extend(other.cold_rate);
		self.mem_waste.extend(other.mem_waste);
	}

	/// Returns the number of applications
	pub fn len(&self) -> usize {
		self.cold_rate.len()
	}

	/// Returns if there are no applications
	pub fn is_empty(&self) -> bool {
		self.cold_rate.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{app::AppId, policies::FixIntervalSystem},
	};

	#[test]
	fn skips_never_launched() {
		let mut system = FixIntervalSystem::new(1, [AppId::new("o", "a"), AppId::new("o", "b"), AppId::new("o", "c")]);
		for exec_now in [[2, 0, 0], [0, 0, 1], [0, 0, 0], [2, 0, 0]] {
			system.update(&exec_now);
		}

		let metrics = Metrics::from_table(crate::sim::Policy::apps(&system));
		assert_eq!(metrics.len(), 1);
		assert_eq!(metrics.cold_rate, [1.0]);
		assert_eq!(metrics.mem_waste, [1.0 / 3.0]);
	}

	#[test]
	fn from_apps_pairs_rates() {
		let apps = [
			FixIntervalApp::new(2, &[2, 0, 2, 0, 0, 0]),
			FixIntervalApp::new(2, &[0, 0, 0]),
			FixIntervalApp::new(0, &[2, 0, 2]),
		];

		let metrics = Metrics::from_apps(&apps);
		assert_eq!(metrics.cold_rate, [0.5, 1.0]);
		assert_eq!(metrics.mem_waste, [3.0 / 5.0, 0.0]);
	}

	#[test]
	fn extend_concatenates() {
		let mut metrics = Metrics {
			cold_rate: vec![0.5],
			mem_waste: vec![0.1],
		};
		metrics.extend(Metrics {
			cold_rate: vec![1.0],
			mem_waste: vec![0.2],
		});
		assert_eq!(metrics.cold_rate, [0.5, 1.0]);
		assert_eq!(metrics.mem_waste, [0.1, 0.2]);
	}
}

//! Analysis of per-application metrics

// Imports
use std::fmt;

/// Default number of steps of [`cdf`]
pub const CDF_STEPS: usize = 100;

/// Returns the empirical cdf of `rates` at thresholds `0, 1/steps, .., 1`.
///
/// Each point is `(threshold, fraction of rates <= threshold)`.
/// Without any rates, every fraction is 0.
pub fn cdf(rates: &[f64], steps: usize) -> Vec<(f64, f64)> {
	let mut rates = rates.to_vec();
	rates.sort_by(f64::total_cmp);

	let step = 1.0 / steps as f64;
	let mut below = 0;
	(0..=steps)
		.map(|idx| {
			let threshold = idx as f64 * step;
			while below < rates.len() && rates[below] <= threshold {
				below += 1;
			}

			let fraction = match rates.is_empty() {
				true => 0.0,
				false => below as f64 / rates.len() as f64,
			};
			(threshold, fraction)
		})
		.collect()
}

/// Returns the `(cold_rate, mem_waste)` pair of the application at the 3rd quartile of cold-start rates.
///
/// Pairs are sorted by cold-start rate and the one at index `floor(0.75 * len)` is chosen.
///
/// # Panics
/// Panics if `cold_rate` and `mem_waste` have different lengths.
pub fn third_quartile(cold_rate: &[f64], mem_waste: &[f64]) -> Option<(f64, f64)> {
	assert_eq!(cold_rate.len(), mem_waste.len(), "Every cold-start rate must have a memory-waste rate");

	let mut pairs = cold_rate.iter().copied().zip(mem_waste.iter().copied()).collect::<Vec<_>>();
	pairs.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));

	let idx = (pairs.len() as f64 * 0.75) as usize;
	pairs.get(idx).copied()
}

/// Returns `values` as percentages of `values[baseline_idx]`.
///
/// Returns `None` if the baseline doesn't exist or is 0.
pub fn normalized(values: &[f64], baseline_idx: usize) -> Option<Vec<f64>> {
	let baseline = *values.get(baseline_idx)?;
	if baseline == 0.0 {
		return None;
	}

	Some(values.iter().map(|value| value / baseline * 100.0).collect())
}

/// Summary statistics of a sample
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Summary {
	/// Sample size
	pub count: usize,

	/// Mean
	pub mean: f64,

	/// Standard error of the mean
	pub std_err: f64,
}

impl Summary {
	/// Summarizes `values`.
	///
	/// Returns `None` if there are no values.
	pub fn of(values: &[f64]) -> Option<Self> {
		if values.is_empty() {
			return None;
		}

		let variance = values.iter().copied().collect::<average::Variance>();
		let count = values.len();
		let mean = variance.mean();
		let std_err = variance.error();

		Some(Self { count, mean, std_err })
	}
}

impl fmt::Display for Summary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:.4} ± {:.4} (n = {})", self.mean, self.std_err, self.count)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cdf_counts_at_or_below() {
		let points = cdf(&[0.5, 0.0, 1.0, 0.25], 4);
		assert_eq!(points, [(0.0, 0.25), (0.25, 0.5), (0.5, 0.75), (0.75, 0.75), (1.0, 1.0)]);

		let points = cdf(&[], CDF_STEPS);
		assert_eq!(points.len(), CDF_STEPS + 1);
		assert!(points.iter().all(|&(_, fraction)| fraction == 0.0));
	}

	#[test]
	fn third_quartile_follows_cold_rates() {
		let cold_rate = [0.4, 0.1, 0.3, 0.2];
		let mem_waste = [4.0, 1.0, 3.0, 2.0];
		assert_eq!(third_quartile(&cold_rate, &mem_waste), Some((0.4, 4.0)));

		assert_eq!(third_quartile(&[0.5], &[0.1]), Some((0.5, 0.1)));
		assert_eq!(third_quartile(&[], &[]), None);
	}

	#[test]
	fn normalized_to_baseline() {
		assert_eq!(normalized(&[1.0, 2.0, 4.0], 1), Some(vec![50.0, 100.0, 200.0]));
		assert_eq!(normalized(&[1.0, 0.0], 1), None);
		assert_eq!(normalized(&[1.0], 1), None);
	}

	#[test]
	fn summary() {
		let summary = Summary::of(&[1.0, 2.0, 3.0, 4.0]).expect("Expected summary");
		assert_eq!(summary.count, 4);
		assert_eq!(summary.mean, 2.5);
		assert!((summary.std_err - (5.0_f64 / 12.0).sqrt()).abs() < 1e-12);

		assert_eq!(summary.to_string(), "2.5000 ± 0.6455 (n = 4)");

		assert_eq!(Summary::of(&[]), None);
		assert_eq!(Summary::of(&[2.0]).map(|summary| summary.std_err), Some(0.0));
	}
}

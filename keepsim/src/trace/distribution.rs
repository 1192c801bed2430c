//! Distributions from percentiles

// Imports
use rand::{
	distributions::{Distribution as _, WeightedIndex},
	Rng,
};

/// Probability mass between consecutive percentiles `1, 25, 50, 75, 99`
const PERCENTILE_MASSES: [f64; 4] = [0.24, 0.25, 0.25, 0.24];

/// Discrete distribution
#[derive(Clone, Debug)]
pub struct Distribution {
	/// Values
	values: Vec<f64>,

	/// Index sampler over `values`
	index: WeightedIndex<f64>,
}

impl Distribution {
	/// Creates a distribution that always yields `value`
	pub fn point(value: f64) -> Self {
		Self {
			values: vec![value],
			index:  WeightedIndex::new([1.0]).expect("Single positive weight is valid"),
		}
	}

	/// Creates a distribution from `values` and their `weights`.
	///
	/// Returns `None` if there are no values, the lengths differ or the weights are invalid.
	pub fn new(values: Vec<f64>, weights: &[f64]) -> Option<Self> {
		if values.is_empty() || values.len() != weights.len() {
			return None;
		}

		let index = WeightedIndex::new(weights).ok()?;
		Some(Self { values, index })
	}

	/// Creates a distribution from the percentiles `1, 25, 50, 75, 99` of a sample.
	///
	/// Each percentile above the first is chosen with a probability proportional to
	/// the mass it covers over the width of its interval, so narrow intervals are denser.
	/// Empty intervals are skipped.
	///
	/// If the percentiles are all equal (or decreasing), falls back to always yielding `average`,
	/// unless it's 0, in which case there's no distribution.
	pub fn from_percentiles(percentiles: [f64; 5], average: f64) -> Option<Self> {
		let widths = std::array::from_fn::<_, 4, _>(|idx| percentiles[idx + 1] - percentiles[idx]);

		let (values, weights): (Vec<_>, Vec<_>) = widths
			.iter()
			.zip(PERCENTILE_MASSES)
			.zip(&percentiles[1..])
			.filter(|((&width, _), _)| width != 0.0)
			.map(|((&width, mass), &value)| (value, mass / width))
			.unzip();

		let is_valid = widths.iter().sum::<f64>() != 0.0 && weights.iter().all(|weight| weight.is_finite() && *weight > 0.0);
		match is_valid {
			true => Self::new(values, &weights),
			false => (average.is_finite() && average != 0.0).then(|| Self::point(average)),
		}
	}

	/// Returns all values
	pub fn values(&self) -> &[f64] {
		&self.values
	}

	/// Samples a value
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
		self.values[self.index.sample(rng)]
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		rand::{rngs::StdRng, SeedableRng},
	};

	#[test]
	fn from_percentiles_weights_by_density() {
		let dist = Distribution::from_percentiles([0.0, 1.0, 2.0, 4.0, 8.0], 3.0).expect("Expected distribution");
		assert_eq!(dist.values(), [1.0, 2.0, 4.0, 8.0]);

		// Densities 0.24, 0.25, 0.125, 0.06
		let mut rng = StdRng::seed_from_u64(0);
		let mut counts = [0_usize; 4];
		for _ in 0..10_000 {
			let value = dist.sample(&mut rng);
			let idx = dist.values().iter().position(|&v| v == value).expect("Sampled unknown value");
			counts[idx] += 1;
		}
		assert!(counts[1] > counts[2] && counts[2] > counts[3]);
		assert!(counts[0] > counts[2]);
	}

	#[test]
	fn from_percentiles_skips_empty_intervals() {
		let dist = Distribution::from_percentiles([5.0, 5.0, 5.0, 6.0, 6.0], 5.5).expect("Expected distribution");
		assert_eq!(dist.values(), [6.0]);
	}

	#[test]
	fn from_percentiles_falls_back_to_average() {
		let dist = Distribution::from_percentiles([7.0; 5], 7.0).expect("Expected distribution");
		assert_eq!(dist.values(), [7.0]);

		assert!(Distribution::from_percentiles([0.0; 5], 0.0).is_none());
		assert!(Distribution::from_percentiles([3.0, 2.0, 1.0, 1.0, 1.0], 0.0).is_none());
	}

	#[test]
	fn new_validates() {
		assert!(Distribution::new(vec![], &[]).is_none());
		assert!(Distribution::new(vec![1.0], &[1.0, 2.0]).is_none());
		assert!(Distribution::new(vec![1.0], &[-1.0]).is_none());
		assert!(Distribution::new(vec![1.0, 2.0], &[1.0, 0.0]).is_some());
	}
}

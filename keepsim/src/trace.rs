//! Trace ingestion.
//!
//! Reads an Azure Functions dataset, derives per-function duration and memory
//! distributions and synthesizes the execution series the simulation replays.

// Modules
pub mod dataset;
pub mod distribution;
pub mod exec_series;
pub mod invocations;
pub mod profiles;
pub mod synth;

// Exports
pub use self::{
	dataset::{Dataset, DayFiles},
	distribution::Distribution,
	exec_series::ExecSeries,
	invocations::Invocations,
	profiles::{ProfileSampler, Profiles},
	synth::{footprints, synthesize, Sampler},
};

// Imports
use {
	anyhow::Context,
	rand::{rngs::StdRng, SeedableRng},
	std::collections::HashMap,
};

/// Random number stream of a day
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum RngStream {
	/// Invocation durations
	Durations,

	/// Application footprints
	Footprints,
}

/// Returns the random number generator of `stream` for day `day_idx`.
///
/// Each day and stream is independent of every other, so results don't
/// depend on the order days are processed in.
pub fn day_rng(seed: u64, day_idx: usize, stream: RngStream) -> StdRng {
	let stream = match stream {
		RngStream::Durations => 0_u64,
		RngStream::Footprints => 1,
	};

	let mut rng_seed = [0; 32];
	rng_seed[..8].copy_from_slice(&seed.to_le_bytes());
	rng_seed[8..16].copy_from_slice(&(day_idx as u64).to_le_bytes());
	rng_seed[16..24].copy_from_slice(&stream.to_le_bytes());
	StdRng::from_seed(rng_seed)
}

/// Column indices of a csv header, by name
#[derive(Clone, Debug)]
struct Columns {
	/// Indices
	indices: HashMap<String, usize>,
}

impl Columns {
	/// Indexes the columns of `headers`
	fn new(headers: &csv::StringRecord) -> Self {
		Self {
			indices: headers
				.iter()
				.enumerate()
				.map(|(idx, name)| (name.trim().to_owned(), idx))
				.collect(),
		}
	}

	/// Returns the index of column `name`
	fn index(&self, name: &str) -> Result<usize, anyhow::Error> {
		self.indices
			.get(name)
			.copied()
			.with_context(|| format!("Missing column {name:?}"))
	}

	/// Returns the index of the column of each minute `1..=day_len`
	fn minutes(&self, day_len: usize) -> Result<Vec<usize>, anyhow::Error> {
		(1..=day_len).map(|minute| self.index(&minute.to_string())).collect()
	}

	/// Returns the number of consecutive minute columns, starting at `1`
	fn day_len(&self) -> usize {
		(1_usize..).take_while(|minute| self.indices.contains_key(&minute.to_string())).count()
	}
}

/// Returns field `idx` of `record`
fn field(record: &csv::StringRecord, idx: usize) -> Result<&str, anyhow::Error> {
	record
		.get(idx)
		.map(str::trim)
		.with_context(|| format!("Missing field {idx}"))
}

/// Parses field `idx` of `record`
fn parse_field<T>(record: &csv::StringRecord, idx: usize) -> Result<T, anyhow::Error>
where
	T: std::str::FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	let field = self::field(record, idx)?;
	field
		.parse()
		.with_context(|| format!("Unable to parse field {idx}: {field:?}"))
}

/// Parses a numeric field that may be written as a float, such as `3.0`
fn parse_count(record: &csv::StringRecord, idx: usize) -> Result<u32, anyhow::Error> {
	let field = self::field(record, idx)?;
	match field.parse::<u32>() {
		Ok(count) => Ok(count),
		Err(_) => {
			let count = field
				.parse::<f64>()
				.with_context(|| format!("Unable to parse field {idx}: {field:?}"))?;
			anyhow::ensure!(
				count >= 0.0 && count.fract() == 0.0 && count <= f64::from(u32::MAX),
				"Field {idx} isn't a count: {field:?}"
			);
			Ok(count as u32)
		},
	}
}

#[cfg(test)]
mod tests {
	use {super::*, rand::Rng};

	#[test]
	fn day_rngs_are_independent_and_reproducible() {
		let sample = |day_idx, stream| day_rng(7, day_idx, stream).gen::<u64>();
		assert_eq!(sample(0, RngStream::Durations), sample(0, RngStream::Durations));
		assert_ne!(sample(0, RngStream::Durations), sample(1, RngStream::Durations));
		assert_ne!(sample(0, RngStream::Durations), sample(0, RngStream::Footprints));
	}

	#[test]
	fn parse_count_accepts_whole_floats() {
		let record = csv::StringRecord::from(vec!["3", "4.0", "1.5", "-1", "x"]);
		assert_eq!(parse_count(&record, 0).ok(), Some(3));
		assert_eq!(parse_count(&record, 1).ok(), Some(4));
		assert!(parse_count(&record, 2).is_err());
		assert!(parse_count(&record, 3).is_err());
		assert!(parse_count(&record, 4).is_err());
		assert!(parse_count(&record, 5).is_err());
	}
}

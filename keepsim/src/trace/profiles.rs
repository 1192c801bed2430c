//! Function duration and application memory profiles

// Imports
use {
	super::{Columns, Distribution, Sampler},
	crate::app::{AppId, FunctionId},
	anyhow::Context,
	rand::Rng,
	std::{collections::HashMap, path::Path},
};

/// Duration percentile columns, in milliseconds
const DURATION_PERCENTILES: [&str; 5] = [
	"percentile_Average_1",
	"percentile_Average_25",
	"percentile_Average_50",
	"percentile_Average_75",
	"percentile_Average_99",
];

/// Average duration column, in milliseconds
const DURATION_AVERAGE: &str = "Average";

/// Memory percentile columns, in megabytes
const MEMORY_PERCENTILES: [&str; 5] = [
	"AverageAllocatedMb_pct1",
	"AverageAllocatedMb_pct25",
	"AverageAllocatedMb_pct50",
	"AverageAllocatedMb_pct75",
	"AverageAllocatedMb_pct99",
];

/// Average memory column, in megabytes
const MEMORY_AVERAGE: &str = "AverageAllocatedMb";

/// Milliseconds per minute
const MS_PER_MIN: f64 = 60_000.0;

/// Profiles of a day
#[derive(Clone, Default, Debug)]
pub struct Profiles {
	/// Duration distribution of each function, in milliseconds
	durations: HashMap<FunctionId, Distribution>,

	/// Memory distribution of each application, in megabytes
	memory: HashMap<AppId, Distribution>,
}

impl Profiles {
	/// Creates profiles from their distributions
	pub fn new(
		durations: impl IntoIterator<Item = (FunctionId, Distribution)>,
		memory: impl IntoIterator<Item = (AppId, Distribution)>,
	) -> Self {
		Self {
			durations: durations.into_iter().collect(),
			memory:    memory.into_iter().collect(),
		}
	}

	/// Loads the profiles of a day from its duration and memory percentile files.
	///
	/// Rows without a distribution (all percentiles equal and a zero average) or with
	/// unparsable values are skipped.
	pub fn load(durations_path: &Path, memory_path: &Path) -> Result<Self, anyhow::Error> {
		let durations = self::read_distributions(durations_path, &DURATION_PERCENTILES, DURATION_AVERAGE, |record, columns| {
			Ok(FunctionId::new(
				super::field(record, columns[0])?,
				super::field(record, columns[1])?,
				super::field(record, *columns.get(2).context("Missing column \"HashFunction\"")?)?,
			))
		})
		.context("Unable to read duration percentiles")?;
		let memory = self::read_distributions(memory_path, &MEMORY_PERCENTILES, MEMORY_AVERAGE, |record, columns| {
			Ok(AppId::new(
				super::field(record, columns[0])?,
				super::field(record, columns[1])?,
			))
		})
		.context("Unable to read memory percentiles")?;

		tracing::debug!(
			functions = durations.len(),
			apps = memory.len(),
			"Loaded profiles"
		);

		Ok(Self { durations, memory })
	}

	/// Returns the duration distribution of a function, in milliseconds.
	///
	/// Functions whose application has no memory distribution have no profile either.
	pub fn duration(&self, function: &FunctionId) -> Option<&Distribution> {
		let duration = self.durations.get(function)?;
		self.memory.contains_key(&function.app_id()).then_some(duration)
	}

	/// Returns the memory distribution of an application, in megabytes
	pub fn memory(&self, app: &AppId) -> Option<&Distribution> {
		self.memory.get(app)
	}
}

/// Reads a distribution per row of a percentile file.
///
/// `parse_key` receives the indices of the `HashOwner`, `HashApp` and `HashFunction` columns,
/// the latter only if present.
fn read_distributions<K: Eq + std::hash::Hash>(
	path: &Path,
	percentiles: &[&str; 5],
	average: &str,
	parse_key: impl Fn(&csv::StringRecord, &[usize]) -> Result<K, anyhow::Error>,
) -> Result<HashMap<K, Distribution>, anyhow::Error> {
	let mut reader = csv::Reader::from_path(path).with_context(|| format!("Unable to open {path:?}"))?;
	let columns = Columns::new(reader.headers().context("Unable to read headers")?);

	let mut key_idxs = vec![columns.index("HashOwner")?, columns.index("HashApp")?];
	key_idxs.extend(columns.index("HashFunction").ok());
	let percentile_idxs = percentiles
		.iter()
		.map(|name| columns.index(name))
		.collect::<Result<Vec<_>, _>>()?;
	let average_idx = columns.index(average)?;

	let mut distributions = HashMap::new();
	let mut skipped = 0_usize;
	for (row, record) in reader.records().enumerate() {
		let record = record.with_context(|| format!("Unable to read row {row}"))?;
		let key = parse_key(&record, &key_idxs).with_context(|| format!("Unable to parse key of row {row}"))?;

		let values = percentile_idxs
			.iter()
			.map(|&idx| super::parse_field::<f64>(&record, idx))
			.collect::<Result<Vec<_>, _>>()
			.and_then(|values| Ok((values, super::parse_field::<f64>(&record, average_idx)?)));
		let distribution = match values {
			Ok((values, average)) => {
				let percentiles = [values[0], values[1], values[2], values[3], values[4]];
				Distribution::from_percentiles(percentiles, average)
			},
			Err(err) => {
				tracing::trace!(?path, row, ?err, "Skipping row with invalid values");
				None
			},
		};

		match distribution {
			Some(distribution) => {
				distributions.insert(key, distribution);
			},
			None => skipped += 1,
		}
	}

	if skipped > 0 {
		tracing::debug!(?path, skipped, "Skipped rows without a distribution");
	}

	Ok(distributions)
}

/// Sampler backed by [`Profiles`]
#[derive(Debug)]
pub struct ProfileSampler<'a, R> {
	/// Profiles
	profiles: &'a Profiles,

	/// Random number generator
	rng: R,
}

impl<'a, R: Rng> ProfileSampler<'a, R> {
	/// Creates a new sampler
	pub fn new(profiles: &'a Profiles, rng: R) -> Self {
		Self { profiles, rng }
	}
}

impl<R: Rng> Sampler for ProfileSampler<'_, R> {
	fn duration_mins(&mut self, function: &FunctionId) -> Option<f64> {
		let duration = self.profiles.duration(function)?;
		Some(duration.sample(&mut self.rng) / MS_PER_MIN)
	}

	fn memory(&mut self, app: &AppId) -> Option<f64> {
		let memory = self.profiles.memory(app)?;
		Some(memory.sample(&mut self.rng))
	}
}

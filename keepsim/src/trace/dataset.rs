//! Dataset discovery

// Imports
use {
	anyhow::Context,
	std::{
		collections::BTreeMap,
		fs,
		path::{Path, PathBuf},
	},
};

/// File-name prefix of application memory percentiles
const MEMORY_PREFIX: char = 'a';

/// File-name prefix of function duration percentiles
const DURATIONS_PREFIX: char = 'f';

/// File-name prefix of per-minute function invocations
const INVOCATIONS_PREFIX: char = 'i';

/// Dataset directory.
///
/// Holds the files of days `1..=days` of each kind.
#[derive(Clone, Debug)]
pub struct Dataset {
	/// Directory
	dir: PathBuf,

	/// Application memory percentiles, per day
	memory: Vec<PathBuf>,

	/// Function duration percentiles, per day
	durations: Vec<PathBuf>,

	/// Function invocations, per day
	invocations: Vec<PathBuf>,
}

/// Files of a single day
#[derive(Clone, Copy, Debug)]
pub struct DayFiles<'a> {
	pub memory:      &'a Path,
	pub durations:   &'a Path,
	pub invocations: &'a Path,
}

impl Dataset {
	/// Discovers the dataset files within `dir`.
	///
	/// Files are classified by the first character of their name and numbered
	/// by the digits just before `.csv`. Only days present for every kind are kept.
	///
	/// # Errors
	/// Returns an error if `dir` can't be read, any kind has no files, or a day is missing
	/// within the common range.
	pub fn discover(dir: impl Into<PathBuf>) -> Result<Self, anyhow::Error> {
		let dir = dir.into();

		let mut memory = BTreeMap::new();
		let mut durations = BTreeMap::new();
		let mut invocations = BTreeMap::new();
		for entry in fs::read_dir(&dir).with_context(|| format!("Unable to read dataset directory {dir:?}"))? {
			let entry = entry.context("Unable to read dataset directory entry")?;
			let path = entry.path();
			let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
				continue;
			};
			let Some(day) = self::file_day(name) else {
				tracing::trace!(?path, "Ignoring non-day file");
				continue;
			};

			let files = match name.chars().next() {
				Some(MEMORY_PREFIX) => &mut memory,
				Some(DURATIONS_PREFIX) => &mut durations,
				Some(INVOCATIONS_PREFIX) => &mut invocations,
				_ => continue,
			};
			if let Some(prev) = files.insert(day, path.clone()) {
				tracing::warn!(?prev, ?path, "Found two files for day {day}, using the latter");
			}
		}

		// Note: Later days may be incomplete, so only keep days present for every kind
		let days = [("memory", &memory), ("duration", &durations), ("invocation", &invocations)]
			.into_iter()
			.map(|(kind, files)| {
				files
					.last_key_value()
					.map(|(&day, _)| day)
					.with_context(|| format!("No {kind} files found in {dir:?}"))
			})
			.collect::<Result<Vec<_>, _>>()?
			.into_iter()
			.min()
			.unwrap_or(0);

		let take_days = |kind: &str, mut files: BTreeMap<usize, PathBuf>| {
			(1..=days)
				.map(|day| {
					files
						.remove(&day)
						.with_context(|| format!("Missing {kind} file for day {day}"))
				})
				.collect::<Result<Vec<_>, anyhow::Error>>()
		};

		Ok(Self {
			memory: take_days("memory", memory)?,
			durations: take_days("duration", durations)?,
			invocations: take_days("invocation", invocations)?,
			dir,
		})
	}

	/// Returns the dataset directory
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Returns the number of days
	pub fn days(&self) -> usize {
		self.invocations.len()
	}

	/// Returns the files of day `day_idx` (0-based)
	///
	/// # Panics
	/// Panics if `day_idx` is out of bounds.
	pub fn day(&self, day_idx: usize) -> DayFiles<'_> {
		DayFiles {
			memory:      &self.memory[day_idx],
			durations:   &self.durations[day_idx],
			invocations: &self.invocations[day_idx],
		}
	}

	/// Returns the path of the cached execution series of day `day_idx` (0-based)
	pub fn exec_series_path(&self, day_idx: usize) -> PathBuf {
		self.dir.join(format!("execution_series_{}.csv", day_idx + 1))
	}
}

/// Returns the day number of a dataset file name, such as `invocations.d07.csv`
fn file_day(name: &str) -> Option<usize> {
	let stem = name.strip_suffix(".csv")?;
	let digits_start = stem
		.char_indices()
		.rev()
		.take_while(|(_, ch)| ch.is_ascii_digit())
		.last()
		.map(|(idx, _)| idx)?;

	stem[digits_start..].parse().ok()
}

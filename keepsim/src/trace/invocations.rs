//! Per-minute function invocations

// Imports
use {
	super::Columns,
	crate::app::FunctionId,
	anyhow::Context,
	std::{collections::BTreeMap, path::Path},
};

/// Invocation counts of every function in a day.
///
/// Functions are sorted by id, counts are stored function-major.
#[derive(Clone, Debug)]
pub struct Invocations {
	/// Day length, in minutes
	day_len: usize,

	/// Functions
	functions: Vec<FunctionId>,

	/// Counts, `day_len` per function
	counts: Vec<u32>,
}

impl Invocations {
	/// Creates invocations from each function's counts.
	///
	/// Rows of the same function are summed.
	///
	/// # Errors
	/// Returns an error if any function's counts aren't `day_len` long.
	pub fn from_functions(
		day_len: usize,
		functions: impl IntoIterator<Item = (FunctionId, Vec<u32>)>,
	) -> Result<Self, anyhow::Error> {
		let mut by_function = BTreeMap::<FunctionId, Vec<u32>>::new();
		for (function, counts) in functions {
			anyhow::ensure!(
				counts.len() == day_len,
				"Function {function:?} has {} counts, expected {day_len}",
				counts.len()
			);

			match by_function.get_mut(&function) {
				Some(prev) => {
					tracing::debug!(?function, "Summing duplicate invocation rows");
					for (prev, count) in prev.iter_mut().zip(counts) {
						*prev = prev.saturating_add(count);
					}
				},
				None => {
					by_function.insert(function, counts);
				},
			}
		}

		let mut ids = Vec::with_capacity(by_function.len());
		let mut all_counts = Vec::with_capacity(by_function.len() * day_len);
		for (function, counts) in by_function {
			ids.push(function);
			all_counts.extend(counts);
		}

		Ok(Self {
			day_len,
			functions: ids,
			counts: all_counts,
		})
	}

	/// Reads invocations from a `HashOwner,HashApp,HashFunction,...,1..day_len` csv file.
	///
	/// If `day_len` is `None`, it's the number of minute columns found.
	pub fn read_csv(path: &Path, day_len: Option<usize>) -> Result<Self, anyhow::Error> {
		let mut reader = csv::Reader::from_path(path).with_context(|| format!("Unable to open {path:?}"))?;
		let columns = Columns::new(reader.headers().context("Unable to read headers")?);

		let day_len = day_len.unwrap_or_else(|| columns.day_len());
		let owner_idx = columns.index("HashOwner")?;
		let app_idx = columns.index("HashApp")?;
		let function_idx = columns.index("HashFunction")?;
		let minute_idxs = columns.minutes(day_len)?;

		let functions = reader
			.records()
			.enumerate()
			.map(|(row, record)| {
				let record = record.with_context(|| format!("Unable to read row {row}"))?;
				let function = FunctionId::new(
					super::field(&record, owner_idx)?,
					super::field(&record, app_idx)?,
					super::field(&record, function_idx)?,
				);
				let counts = minute_idxs
					.iter()
					.map(|&idx| super::parse_count(&record, idx))
					.collect::<Result<Vec<_>, _>>()
					.with_context(|| format!("Unable to parse counts of row {row}"))?;

				Ok((function, counts))
			})
			.collect::<Result<Vec<_>, anyhow::Error>>()
			.with_context(|| format!("Unable to parse {path:?}"))?;

		Self::from_functions(day_len, functions)
	}

	/// Returns the day length
	pub fn day_len(&self) -> usize {
		self.day_len
	}

	/// Returns the number of functions
	pub fn len(&self) -> usize {
		self.functions.len()
	}

	/// Returns if there are no functions
	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}

	/// Returns an iterator over each function and its counts
	pub fn iter(&self) -> impl Iterator<Item = (&FunctionId, &[u32])> + '_ {
		self.functions.iter().zip(self.counts.chunks_exact(self.day_len.max(1)))
	}
}

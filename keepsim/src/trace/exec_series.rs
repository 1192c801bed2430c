//! Per-function execution series

// Imports
use {
	super::Columns,
	crate::{app::FunctionId, signal::ExecCode},
	anyhow::Context,
	std::{
		collections::{btree_map, BTreeMap},
		path::Path,
	},
};

/// Execution codes of every function in a day.
///
/// Functions are sorted by id, codes are stored function-major.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ExecSeries {
	/// Day length, in ticks
	day_len: usize,

	/// Functions
	functions: Vec<FunctionId>,

	/// Codes, `day_len` per function
	codes: Vec<ExecCode>,
}

impl ExecSeries {
	/// Creates a series from each function's codes.
	///
	/// # Errors
	/// Returns an error if a function appears twice or its codes aren't `day_len` long.
	pub fn from_functions(
		day_len: usize,
		functions: impl IntoIterator<Item = (FunctionId, Vec<ExecCode>)>,
	) -> Result<Self, anyhow::Error> {
		let mut by_function = BTreeMap::new();
		for (function, codes) in functions {
			anyhow::ensure!(
				codes.len() == day_len,
				"Function {function:?} has {} codes, expected {day_len}",
				codes.len()
			);
			match by_function.entry(function) {
				btree_map::Entry::Vacant(entry) => {
					entry.insert(codes);
				},
				btree_map::Entry::Occupied(entry) => anyhow::bail!("Duplicate function {:?}", entry.key()),
			}
		}

		let mut ids = Vec::with_capacity(by_function.len());
		let mut codes = Vec::with_capacity(by_function.len() * day_len);
		for (function, function_codes) in by_function {
			ids.push(function);
			codes.extend(function_codes);
		}

		Ok(Self {
			day_len,
			functions: ids,
			codes,
		})
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

	/// Returns an iterator over each function and its codes
	pub fn iter(&self) -> impl Iterator<Item = (&FunctionId, &[ExecCode])> + '_ {
		self.functions.iter().zip(self.codes.chunks_exact(self.day_len.max(1)))
	}

	/// Reads a series from a `HashOwner,HashApp,HashFunction,1..day_len` csv file.
	///
	/// Extra columns are ignored. If `day_len` is `None`, it's the number of tick columns found.
	pub fn read_csv(path: &Path, day_len: Option<usize>) -> Result<Self, anyhow::Error> {
		let mut reader = csv::Reader::from_path(path).with_context(|| format!("Unable to open {path:?}"))?;
		let columns = Columns::new(reader.headers().context("Unable to read headers")?);

		let day_len = day_len.unwrap_or_else(|| columns.day_len());
		let owner_idx = columns.index("HashOwner")?;
		let app_idx = columns.index("HashApp")?;
		let function_idx = columns.index("HashFunction")?;
		let tick_idxs = columns.minutes(day_len)?;

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
				let codes = tick_idxs
					.iter()
					.map(|&idx| super::parse_count(&record, idx))
					.collect::<Result<Vec<_>, _>>()
					.with_context(|| format!("Unable to parse codes of row {row}"))?;

				Ok((function, codes))
			})
			.collect::<Result<Vec<_>, anyhow::Error>>()
			.with_context(|| format!("Unable to parse {path:?}"))?;

		Self::from_functions(day_len, functions)
	}

	/// Writes this series as a csv file
	pub fn write_csv(&self, path: &Path) -> Result<(), anyhow::Error> {
		let mut writer = csv::Writer::from_path(path).with_context(|| format!("Unable to create {path:?}"))?;

		let header = ["HashOwner", "HashApp", "HashFunction"]
			.into_iter()
			.map(str::to_owned)
			.chain((1..=self.day_len).map(|tick| tick.to_string()));
		writer.write_record(header).context("Unable to write header")?;

		let mut record = Vec::with_capacity(3 + self.day_len);
		for (function, codes) in self.iter() {
			record.clear();
			record.extend([function.owner.clone(), function.app.clone(), function.function.clone()]);
			record.extend(codes.iter().map(ExecCode::to_string));
			writer
				.write_record(&record)
				.with_context(|| format!("Unable to write function {function:?}"))?;
		}

		writer.flush().context("Unable to flush writer")?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use {super::*, std::fs};

	#[test]
	fn csv_round_trip() {
		let series = ExecSeries::from_functions(4, [
			(FunctionId::new("o", "b", "f"), vec![0, 3, 1, 0]),
			(FunctionId::new("o", "a", "f"), vec![2, 0, 0, 2]),
		])
		.expect("Unable to create series");

		let path = std::env::temp_dir().join(format!("keepsim-exec-series-{}.csv", std::process::id()));
		series.write_csv(&path).expect("Unable to write series");
		let read = ExecSeries::read_csv(&path, None).expect("Unable to read series");
		fs::remove_file(&path).expect("Unable to remove file");

		assert_eq!(read, series);
		assert_eq!(read.iter().next().map(|(function, _)| function.app.as_str()), Some("a"));
	}

	#[test]
	fn duplicate_functions_are_rejected() {
		let res = ExecSeries::from_functions(1, [
			(FunctionId::new("o", "a", "f"), vec![0]),
			(FunctionId::new("o", "a", "f"), vec![2]),
		]);
		assert!(res.is_err());
	}
}

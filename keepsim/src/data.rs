//! Output data

// Imports
use {
	crate::{policies::PolicyConfig, sweep::SweepOutput},
	anyhow::Context,
	std::{
		fs,
		io::{BufReader, BufWriter, Write},
		path::Path,
	},
};

/// Output data
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct Data {
	/// Day length, in ticks
	pub day_len: usize,

	/// Days simulated
	pub days: usize,

	/// Results of each policy, in configuration order
	pub policies: Vec<PolicyData>,
}

/// Results of a single policy over all days
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct PolicyData {
	pub label:     String,
	pub config:    PolicyConfig,
	pub cold_rate: Vec<f64>,
	pub mem_waste: Vec<f64>,
	pub failures:  Vec<DayFailure>,
}

/// A day a policy couldn't finish
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct DayFailure {
	/// Day index (0-based)
	pub day:   usize,
	pub error: DayError,
}

/// Why a day couldn't be finished
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayError {
	/// Not enough memory to satisfy the cold starts of a tick
	Exhausted {
		tick:      usize,
		deficit:   f64,
		evictable: f64,
	},

	/// The simulation itself failed
	Errored { message: String },
}

impl Data {
	/// Creates the output data of a sweep
	pub fn from_sweep(day_len: usize, days: usize, output: SweepOutput) -> Self {
		let policies = output
			.policies
			.into_iter()
			.map(|policy| PolicyData {
				label:     policy.config.to_string(),
				config:    policy.config,
				cold_rate: policy.metrics.cold_rate,
				mem_waste: policy.metrics.mem_waste,
				failures:  policy.failures,
			})
			.collect();

		Self {
			day_len,
			days,
			policies,
		}
	}

	/// Writes this data to `path`.
	///
	/// Uses `bincode` if `path` ends in `.bin`, else json.
	pub fn write(&self, path: &Path) -> Result<(), anyhow::Error> {
		let file = fs::File::create(path).with_context(|| format!("Unable to create output file {path:?}"))?;
		let mut writer = BufWriter::new(file);
		match self::is_bincode(path) {
			true => {
				bincode::encode_into_std_write(self, &mut writer, bincode::config::standard())
					.context("Unable to encode output data")?;
			},
			false => serde_json::to_writer(&mut writer, self).context("Unable to write output data")?,
		}

		writer.flush().context("Unable to flush output file")?;
		Ok(())
	}

	/// Reads data written by [`Self::write`]
	pub fn read(path: &Path) -> Result<Self, anyhow::Error> {
		let file = fs::File::open(path).with_context(|| format!("Unable to open data file {path:?}"))?;
		let mut reader = BufReader::new(file);
		match self::is_bincode(path) {
			true => bincode::decode_from_std_read(&mut reader, bincode::config::standard())
				.context("Unable to decode data file"),
			false => serde_json::from_reader(reader).context("Unable to parse data file"),
		}
	}
}

/// Returns if `path` should hold `bincode` data
fn is_bincode(path: &Path) -> bool {
	path.extension().is_some_and(|ext| ext == "bin")
}

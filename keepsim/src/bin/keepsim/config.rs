//! Configuration

// Imports
use keepsim::{Merge, PolicyConfig};

/// Configuration
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// Day length, in minutes
	#[serde(default = "default_day_len")]
	pub day_len: usize,

	/// Worker threads.
	///
	/// Defaults to the available parallelism
	#[serde(default)]
	pub workers: Option<usize>,

	/// Seed of all sampling
	#[serde(default)]
	pub seed: u64,

	/// Debug output period (in seconds)
	#[serde(default = "default_debug_output_period_secs")]
	pub debug_output_period_secs: f64,

	/// How the functions of an application are merged
	#[serde(default)]
	pub merge: Merge,

	/// Footprint of applications without a memory profile
	#[serde(default = "default_fallback_memory")]
	pub fallback_memory: f64,

	/// Whether to save synthesized execution series into the dataset directory
	#[serde(default = "default_save_exec_series")]
	pub save_exec_series: bool,

	/// Policies
	pub policies: Vec<PolicyConfig>,
}

fn default_day_len() -> usize {
	1440
}

fn default_debug_output_period_secs() -> f64 {
	5.0
}

fn default_fallback_memory() -> f64 {
	128.0
}

fn default_save_exec_series() -> bool {
	true
}

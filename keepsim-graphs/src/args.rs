//! Arguments

// Imports
use std::path::PathBuf;

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Sub-command
	#[command(subcommand)]
	pub sub_cmd: SubCmd,
}

/// Sub-command
#[derive(Debug, clap::Subcommand)]
pub enum SubCmd {
	#[clap(name = "cold-rate-cdf")]
	ColdRateCdf(ColdRateCdf),

	#[clap(name = "mem-waste")]
	MemWaste(MemWaste),
}

/// Creates a graph of the cdf of application cold-start rates, one line per policy
#[derive(Debug, clap::Args)]
pub struct ColdRateCdf {
	/// Input
	pub input_file: PathBuf,

	/// Output
	#[clap(flatten)]
	pub output: Output,
}

/// Creates a graph of the wasted memory at the 3rd quartile of cold-start rates, one point per policy
#[derive(Debug, clap::Args)]
pub struct MemWaste {
	/// Input
	pub input_file: PathBuf,

	/// Output
	#[clap(flatten)]
	pub output: Output,

	/// Index of the policy the wasted memory is normalized to
	#[clap(long = "baseline-idx", default_value_t = 1)]
	pub baseline_idx: usize,
}

/// Output
#[derive(Debug, clap::Args)]
pub struct Output {
	/// Output file
	#[clap(short = 'o', long = "output")]
	pub file: PathBuf,

	/// Output file width
	#[clap(long = "output-width", default_value_t = 640)]
	pub width: u32,

	/// Output file height
	#[clap(long = "output-height", default_value_t = 480)]
	pub height: u32,
}

//! Keep-alive simulator (`keepsim`)

// Modules
mod args;
mod config;

// Imports
use {
	self::{args::Args, config::Config},
	anyhow::Context,
	clap::Parser,
	keepsim::{
		analysis::{self, Summary},
		data::Data,
		trace::{self, Dataset, ExecSeries, Invocations, ProfileSampler, Profiles, RngStream},
		DayInput,
		ExecSignal,
		Sweep,
	},
	keepsim_util::logger,
	std::{fs, num::NonZeroUsize, sync::Arc, thread, time::Duration},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file
	let config = {
		let config_file = fs::File::open(&args.config_file).context("Unable to open config file")?;
		serde_json::from_reader::<_, Config>(config_file).context("Unable to parse config file")?
	};
	tracing::debug!(?config, "Read config");
	anyhow::ensure!(config.day_len > 0, "Day length must be positive");
	anyhow::ensure!(!config.policies.is_empty(), "At least one policy must be configured");
	anyhow::ensure!(
		config.debug_output_period_secs.is_finite() && config.debug_output_period_secs >= 0.0,
		"Debug output period must be finite and non-negative"
	);

	// Discover the dataset
	let dataset = Dataset::discover(&args.dataset_dir).context("Unable to discover dataset")?;
	let days = match args.days {
		Some(days) => days.min(dataset.days()),
		None => dataset.days(),
	};
	tracing::info!(dir = ?dataset.dir(), available_days = dataset.days(), days, "Discovered dataset");

	// Then prepare every day's input
	let needs_footprints = config.policies.iter().any(|policy| policy.needs_footprints());
	let inputs = (0..days)
		.map(|day_idx| self::prepare_day(&config, &dataset, day_idx, needs_footprints))
		.collect::<Result<Vec<_>, _>>()?;

	// Run the sweep
	let workers = config.workers.unwrap_or_else(|| {
		thread::available_parallelism()
			.map(NonZeroUsize::get)
			.unwrap_or(1)
	});
	let sweep = Sweep::new(
		config.policies.clone(),
		workers,
		Duration::from_secs_f64(config.debug_output_period_secs),
	);
	let output = sweep.run(&inputs);

	// Summarize each policy
	for policy in &output.policies {
		let metrics = &policy.metrics;
		let cold_rate = Summary::of(&metrics.cold_rate);
		let mem_waste = Summary::of(&metrics.mem_waste);
		let third_quartile = analysis::third_quartile(&metrics.cold_rate, &metrics.mem_waste);
		tracing::info!(
			policy = %policy.config,
			apps = metrics.len(),
			failed_days = policy.failures.len(),
			cold_rate = %self::fmt_summary(cold_rate),
			mem_waste = %self::fmt_summary(mem_waste),
			?third_quartile,
			"Finished policy"
		);
	}

	if let Some(output_path) = &args.output_file {
		let data = Data::from_sweep(config.day_len, days, output);
		data.write(output_path).context("Unable to write output file")?;
		tracing::info!(?output_path, "Wrote output data");
	}

	Ok(())
}

/// Prepares the input of day `day_idx`.
///
/// Uses the cached execution series, if any, else synthesizes it from the day's invocations.
fn prepare_day(
	config: &Config,
	dataset: &Dataset,
	day_idx: usize,
	needs_footprints: bool,
) -> Result<DayInput, anyhow::Error> {
	let files = dataset.day(day_idx);

	// Note: Profiles are only needed for synthesis or footprints, so they're loaded lazily
	let mut profiles = None;
	let load_profiles = || -> Result<Profiles, anyhow::Error> {
		Profiles::load(files.durations, files.memory).with_context(|| format!("Unable to load profiles of day {day_idx}"))
	};

	let exec_series_path = dataset.exec_series_path(day_idx);
	let series = match exec_series_path.exists() {
		true => {
			tracing::info!(day_idx, path = ?exec_series_path, "Reading cached execution series");
			ExecSeries::read_csv(&exec_series_path, Some(config.day_len))
				.with_context(|| format!("Unable to read execution series of day {day_idx}"))?
		},
		false => {
			tracing::info!(day_idx, "Synthesizing execution series");
			let invocations = Invocations::read_csv(files.invocations, Some(config.day_len))
				.with_context(|| format!("Unable to read invocations of day {day_idx}"))?;
			let profiles = profiles.insert(load_profiles()?);

			let mut sampler = ProfileSampler::new(
				profiles,
				trace::day_rng(config.seed, day_idx, RngStream::Durations),
			);
			let series = trace::synthesize(&invocations, &mut sampler);
			if config.save_exec_series {
				series
					.write_csv(&exec_series_path)
					.with_context(|| format!("Unable to save execution series of day {day_idx}"))?;
			}

			series
		},
	};

	let signal = ExecSignal::from_series(&series, config.merge);
	tracing::info!(day_idx, functions = series.len(), apps = signal.len(), "Prepared execution signal");

	let footprints = match needs_footprints {
		true => {
			let profiles = match profiles {
				Some(profiles) => profiles,
				None => load_profiles()?,
			};
			let mut sampler = ProfileSampler::new(
				&profiles,
				trace::day_rng(config.seed, day_idx, RngStream::Footprints),
			);
			trace::footprints(signal.apps(), &mut sampler, config.fallback_memory)
		},
		false => vec![],
	};

	Ok(DayInput {
		signal:     Arc::new(signal),
		footprints: Arc::new(footprints),
	})
}

/// Formats an optional summary
fn fmt_summary(summary: Option<Summary>) -> String {
	match summary {
		Some(summary) => summary.to_string(),
		None => "-".to_owned(),
	}
}

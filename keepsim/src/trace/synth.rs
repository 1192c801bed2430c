//! Execution series synthesis

// Imports
use {
	super::{ExecSeries, Invocations},
	crate::{
		app::{AppId, FunctionId},
		signal::{self, ExecCode, CONTINUE, IDLE},
	},
};

/// Sampler of function durations and application footprints
pub trait Sampler {
	/// Samples the duration of an invocation of `function`, in minutes
	fn duration_mins(&mut self, function: &FunctionId) -> Option<f64>;

	/// Samples the memory footprint of `app`
	fn memory(&mut self, app: &AppId) -> Option<f64>;
}

/// Synthesizes the execution series of a day from its invocations.
///
/// Each minute with invocations draws one duration for all of them.
/// The execution then covers the ticks up to and including that minute, starting
/// with the start code and continuing with [`CONTINUE`]. Codes of overlapping
/// executions are combined by their maximum, so continuations never erase a start.
///
/// Minutes of functions without a duration are left idle.
pub fn synthesize<S: Sampler + ?Sized>(invocations: &Invocations, sampler: &mut S) -> ExecSeries {
	let day_len = invocations.day_len();

	let mut skipped = 0_usize;
	let functions = invocations
		.iter()
		.map(|(function, counts)| {
			let mut codes = vec![IDLE; day_len];
			for (minute, &count) in counts.iter().enumerate() {
				if count == 0 {
					continue;
				}

				let duration = match sampler.duration_mins(function) {
					Some(duration) if duration.is_finite() => duration,
					_ => {
						tracing::trace!(?function, minute, "Skipping invocations without a duration");
						skipped += 1;
						continue;
					},
				};

				for (idx, tick) in self::execution_ticks(minute, duration).enumerate() {
					let code = match idx {
						0 => signal::start_code(count),
						_ => CONTINUE,
					};
					codes[tick] = codes[tick].max(code);
				}
			}

			(function.clone(), codes)
		})
		.collect::<Vec<_>>();

	if skipped > 0 {
		tracing::debug!(skipped, "Skipped minutes of functions without a duration");
	}

	// Note: Functions are unique within `invocations`
	ExecSeries::from_functions(day_len, functions).expect("Synthesized series should be valid")
}

/// Returns the ticks covered by an execution ending at `minute` lasting `duration` minutes.
///
/// The execution starts at `max(0.01, minute + 1 - duration)` and covers every tick from
/// the one that start falls in up to `minute` itself, which is always covered.
fn execution_ticks(minute: usize, duration: f64) -> impl Iterator<Item = usize> {
	let end = (minute + 1) as f64;
	let start = f64::max(0.01, end - duration).min(end);
	let first = start.ceil() as usize - 1;

	first..=minute
}

/// Samples a memory footprint for each application.
///
/// Applications without a positive footprint use `fallback`.
pub fn footprints<S: Sampler + ?Sized>(apps: &[AppId], sampler: &mut S, fallback: f64) -> Vec<f64> {
	apps.iter()
		.map(|app| match sampler.memory(app) {
			Some(memory) if memory.is_finite() && memory > 0.0 => memory,
			_ => {
				tracing::trace!(%app, fallback, "Using fallback footprint");
				fallback
			},
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use {super::*, std::collections::HashMap};

	/// Sampler with fixed values
	#[derive(Default)]
	struct FixedSampler {
		durations: HashMap<FunctionId, f64>,
		memory:    HashMap<AppId, f64>,
	}

	impl Sampler for FixedSampler {
		fn duration_mins(&mut self, function: &FunctionId) -> Option<f64> {
			self.durations.get(function).copied()
		}

		fn memory(&mut self, app: &AppId) -> Option<f64> {
			self.memory.get(app).copied()
		}
	}

	fn series_of(duration: Option<f64>, counts: Vec<u32>) -> Vec<ExecCode> {
		let function = FunctionId::new("o", "a", "f");
		let mut sampler = FixedSampler::default();
		sampler.durations.extend(duration.map(|duration| (function.clone(), duration)));

		let invocations =
			Invocations::from_functions(counts.len(), [(function, counts)]).expect("Unable to create invocations");
		let series = synthesize(&invocations, &mut sampler);
		let (_, codes) = series.iter().next().expect("Missing function");
		codes.to_vec()
	}

	#[test]
	fn execution_ticks_span() {
		assert_eq!(execution_ticks(5, 0.5).collect::<Vec<_>>(), [5]);
		assert_eq!(execution_ticks(5, 1.0).collect::<Vec<_>>(), [4, 5]);
		assert_eq!(execution_ticks(5, 2.5).collect::<Vec<_>>(), [3, 4, 5]);
		assert_eq!(execution_ticks(1, 10.0).collect::<Vec<_>>(), [0, 1]);
		assert_eq!(execution_ticks(2, 0.0).collect::<Vec<_>>(), [2]);
		assert_eq!(execution_ticks(0, 3.0).collect::<Vec<_>>(), [0]);
	}

	#[test]
	fn short_invocation_is_single_start() {
		assert_eq!(series_of(Some(0.1), vec![0, 3, 0]), [0, 4, 0]);
	}

	#[test]
	fn long_invocation_continues_backwards() {
		assert_eq!(series_of(Some(2.5), vec![0, 0, 0, 1, 0]), [0, 2, 1, 1, 0]);
	}

	#[test]
	fn continuations_never_erase_starts() {
		assert_eq!(series_of(Some(1.5), vec![0, 1, 1, 0]), [2, 2, 1, 0]);
	}

	#[test]
	fn missing_duration_leaves_idle() {
		assert_eq!(series_of(None, vec![0, 2, 1]), [0, 0, 0]);
	}

	#[test]
	fn footprints_fall_back() {
		let mut sampler = FixedSampler::default();
		sampler.memory.insert(AppId::new("o", "a"), 64.0);
		sampler.memory.insert(AppId::new("o", "b"), 0.0);

		let apps = [AppId::new("o", "a"), AppId::new("o", "b"), AppId::new("o", "c")];
		assert_eq!(footprints(&apps, &mut sampler, 128.0), [64.0, 128.0, 128.0]);
	}
}

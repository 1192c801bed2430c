//! Common test utilities

// Imports
use {
	keepsim::{signal::ExecCode, AppId},
	rand::{rngs::StdRng, Rng, SeedableRng},
};

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
	assert!(x > y - eps && x < y + eps, "Expected {x} to be within {eps} of {y}");
}

/// Returns `len` application ids
pub fn app_ids(len: usize) -> Vec<AppId> {
	(0..len).map(|idx| AppId::new("owner", format!("app{idx:03}"))).collect()
}

/// Generates a random signal of `day_len` ticks.
///
/// Starts happen with probability `start_prob` and are followed by up to
/// `max_continue` continuations. Concurrent starts use codes up to `max_code`.
pub fn random_signal(rng: &mut StdRng, day_len: usize, start_prob: f64, max_continue: usize, max_code: ExecCode) -> Vec<ExecCode> {
	let mut codes = Vec::with_capacity(day_len);
	while codes.len() < day_len {
		match rng.gen_bool(start_prob) {
			true => {
				codes.push(rng.gen_range(2..=max_code));
				let continues = rng.gen_range(0..=max_continue);
				codes.extend(std::iter::repeat(1).take(continues));
			},
			false => codes.push(0),
		}
	}
	codes.truncate(day_len);

	codes
}

/// Returns a seeded rng
pub fn rng(seed: u64) -> StdRng {
	StdRng::seed_from_u64(seed)
}

//! Logger

// Imports
use {
	std::{fs, io, path::Path, sync::Mutex},
	tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter},
};

/// Initializes the logger.
///
/// Logs to stderr, filtered by `RUST_LOG` (`info` by default).
/// If `log_file` is passed, also logs to it, filtered by `RUST_LOG_FILE` (`debug` by default).
///
/// Any messages buffered through [`pre_init`] are emitted right after.
pub fn init(log_file: Option<&Path>, log_file_append: bool) {
	let term_layer = tracing_subscriber::fmt::layer()
		.with_writer(io::stderr)
		.with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

	// Note: We can't log the error yet, so keep it until the subscriber is up
	let mut log_file_err = None;
	let file_layer = log_file.and_then(|path| {
		let file = fs::OpenOptions::new()
			.create(true)
			.write(true)
			.append(log_file_append)
			.truncate(!log_file_append)
			.open(path);

		match file {
			Ok(file) => Some(
				tracing_subscriber::fmt::layer()
					.with_ansi(false)
					.with_writer(Mutex::new(file))
					.with_filter(env_filter("RUST_LOG_FILE", LevelFilter::DEBUG)),
			),
			Err(err) => {
				log_file_err = Some((path.to_path_buf(), err));
				None
			},
		}
	});

	if let Err(err) = tracing_subscriber::registry().with(term_layer).with(file_layer).try_init() {
		eprintln!("Unable to initialize logger: {err}");
	}

	if let Some((path, err)) = log_file_err {
		tracing::warn!(?path, ?err, "Unable to open log file");
	}

	pre_init::flush();
}

/// Creates an env filter from `var`, defaulting to `default`
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
	EnvFilter::builder()
		.with_default_directive(default.into())
		.with_env_var(var)
		.from_env_lossy()
}

/// Logging before the logger is initialized.
///
/// Messages are buffered and emitted once [`init`](super::init) is called.
pub mod pre_init {
	// Imports
	use std::{mem, sync::Mutex};

	/// Buffered messages
	static MESSAGES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

	#[derive(Clone, Copy, Debug)]
	enum Level {
		Debug,
		Info,
		Warn,
	}

	/// Buffers a debug message
	pub fn debug(message: impl Into<String>) {
		self::push(Level::Debug, message.into());
	}

	/// Buffers an info message
	pub fn info(message: impl Into<String>) {
		self::push(Level::Info, message.into());
	}

	/// Buffers a warning message
	pub fn warn(message: impl Into<String>) {
		self::push(Level::Warn, message.into());
	}

	fn push(level: Level, message: String) {
		let mut messages = MESSAGES.lock().unwrap_or_else(|err| err.into_inner());
		messages.push((level, message));
	}

	/// Emits all buffered messages
	pub(super) fn flush() {
		let messages = mem::take(&mut *MESSAGES.lock().unwrap_or_else(|err| err.into_inner()));
		for (level, message) in messages {
			match level {
				Level::Debug => tracing::debug!(target: "keepsim::pre_init", "{message}"),
				Level::Info => tracing::info!(target: "keepsim::pre_init", "{message}"),
				Level::Warn => tracing::warn!(target: "keepsim::pre_init", "{message}"),
			}
		}
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		#[test]
		fn flush_drains_buffer() {
			self::debug("a");
			self::info(String::from("b"));
			self::warn("c");
			assert!(MESSAGES.lock().expect("Poisoned").len() >= 3);

			self::flush();
			assert!(MESSAGES.lock().expect("Poisoned").is_empty());
		}
	}
}

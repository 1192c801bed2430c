//! Keep-alive simulator (`keepsim`)
//!
//! Replays per-minute execution signals of serverless applications through
//! keep-alive and memory eviction policies, measuring cold starts and wasted memory.

// Modules
pub mod analysis;
pub mod app;
pub mod data;
pub mod metrics;
pub mod policies;
pub mod signal;
pub mod sim;
pub mod sweep;
pub mod trace;

// Exports
pub use self::{
	app::{AppId, AppTable, FunctionId},
	metrics::Metrics,
	policies::{FixIntervalApp, FixIntervalSystem, GreedySystem, PolicyConfig},
	signal::{ExecCode, ExecSignal, Merge},
	sim::{Policy, Simulator, TickOutcome},
	sweep::{DayInput, Sweep, SweepOutput},
};

//! Policies

// Modules
pub mod fix_interval;
pub mod greedy;

// Exports
pub use self::{
	fix_interval::{FixIntervalApp, FixIntervalSystem},
	greedy::GreedySystem,
};

// Imports
use std::fmt;

/// Policy configuration
#[derive(PartialEq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
	/// Fixed idle timeout, simulated one application at a time
	FixIntervalApp {
		/// Idle ticks an instance is kept alive for
		interval: u64,
	},

	/// Fixed idle timeout, simulated for all applications at once
	FixInterval {
		/// Idle ticks an instance is kept alive for
		interval: u64,
	},

	/// Greedy eviction under a memory budget
	Greedy {
		/// Memory budget
		total_mem: f64,
	},
}

impl PolicyConfig {
	/// Returns if this policy needs application memory footprints
	pub fn needs_footprints(&self) -> bool {
		matches!(self, Self::Greedy { .. })
	}
}

impl fmt::Display for PolicyConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::FixIntervalApp { interval } => write!(f, "{interval}-min (per app)"),
			Self::FixInterval { interval } => write!(f, "{interval}-min"),
			Self::Greedy { total_mem } => write!(f, "greedy {total_mem}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserialize_tagged() {
		let policies = serde_json::from_str::<Vec<PolicyConfig>>(
			r#"[
				{ "kind": "fix_interval_app", "interval": 10 },
				{ "kind": "fix_interval", "interval": 20 },
				{ "kind": "greedy", "total_mem": 512.0 }
			]"#,
		)
		.expect("Unable to parse policies");

		assert_eq!(policies, [
			PolicyConfig::FixIntervalApp { interval: 10 },
			PolicyConfig::FixInterval { interval: 20 },
			PolicyConfig::Greedy { total_mem: 512.0 },
		]);
		assert!(policies[2].needs_footprints());
		assert_eq!(policies[1].to_string(), "20-min");
	}
}

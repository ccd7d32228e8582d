//! Hopfield associative memory
//!
//! Classical binary Hopfield network (1982). Patterns are bipolar vectors
//! (`-1.0` / `+1.0`), weights are built with the Hebbian outer-product rule
//! and recall relaxes a probe toward the nearest stored attractor.

pub mod memory;
pub mod network;
pub mod pattern;

pub use memory::{PatternMemory, StoreOutcome};
pub use network::HopfieldNetwork;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// How units are updated during one recall sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Every unit is recomputed from the previous full state
    #[default]
    Synchronous,
    /// Units are recomputed in index order, each seeing the earlier updates
    Asynchronous,
}

impl std::str::FromStr for UpdateMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sync" | "synchronous" => Ok(Self::Synchronous),
            "async" | "asynchronous" => Ok(Self::Asynchronous),
            other => Err(crate::Error::config(format!("unknown update mode: {other}"))),
        }
    }
}

/// Configuration for recall behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopfieldConfig {
    /// Unit update order
    pub mode: UpdateMode,
    /// Maximum number of sweeps before giving up on a fixed point
    pub max_iterations: usize,
}

impl Default for HopfieldConfig {
    fn default() -> Self {
        Self {
            mode: UpdateMode::Synchronous,
            max_iterations: 1000,
        }
    }
}

/// Result of pattern recall
#[derive(Debug, Clone)]
pub struct RecallResult {
    /// The final state
    pub pattern: Array1<f64>,
    /// Number of sweeps performed
    pub iterations: usize,
    /// Whether the last sweep left the state unchanged
    pub converged: bool,
    /// Energy of the final state
    pub energy: f64,
}

//! # Hopfield Gridworld
//!
//! Two small, independent learning engines:
//!
//! - A classical Hopfield network that stores bipolar patterns with the
//!   Hebbian outer-product rule and recovers noisy probes by relaxation.
//! - A tabular Q-learning agent that learns to walk a grid to a goal cell
//!   while avoiding obstacle cells, and reconstructs the greedy path.
//!
//! ## Modules
//!
//! - `hopfield` - Hopfield network, pattern memory and pattern helpers
//! - `gridworld` - Grid layout, actions and text rendering
//! - `agent` - Q-learning agent and exploration schedule
//! - `utils` - Application configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use hopfield_gridworld::prelude::*;
//!
//! fn main() -> hopfield_gridworld::Result<()> {
//!     let mut memory = PatternMemory::new(4);
//!     memory.store(&ndarray::arr1(&[1.0, -1.0, 1.0, -1.0]))?;
//!     let recalled = memory.recall(&ndarray::arr1(&[1.0, -1.0, 1.0, 1.0]))?;
//!     assert!(recalled.iterations >= 1);
//!
//!     let layout = GridLayout::new(3, 3, (0, 0), (2, 2), [])?;
//!     let mut learner = GridPolicyLearner::with_seed(layout, QLearningConfig::default(), 7)?;
//!     learner.train(200, 100);
//!     let _path = learner.best_path();
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod error;
pub mod gridworld;
pub mod hopfield;
pub mod utils;

pub use agent::{
    EpisodePhase, EpisodeReport, ExplorationSchedule, GridPolicyLearner, QLearningConfig,
    StepOutcome, TrainingStats,
};
pub use error::{Error, Result};
pub use gridworld::{Action, Cell, CellKind, GridLayout};
pub use hopfield::{HopfieldConfig, HopfieldNetwork, PatternMemory, RecallResult, UpdateMode};
pub use utils::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agent::{
        EpisodePhase, ExplorationSchedule, GridPolicyLearner, QLearningConfig, StepOutcome,
    };
    pub use crate::gridworld::{Action, Cell, GridLayout};
    pub use crate::hopfield::pattern;
    pub use crate::hopfield::{HopfieldConfig, HopfieldNetwork, PatternMemory, UpdateMode};
}

//! # Agent Module
//!
//! Tabular Q-learning agent for the grid world and its exploration schedule.

mod exploration;
mod q_learning;

pub use exploration::ExplorationSchedule;
pub use q_learning::{
    EpisodePhase, EpisodeReport, GridPolicyLearner, QLearningConfig, StepOutcome, TrainingStats,
};

//! Epsilon schedule for the grid agent.
//!
//! Successes and failures decay the exploration rate through two
//! independent knobs. Successes only start decaying once more than
//! `success_warmup` episodes have reached the goal; every failure decays by
//! `failure_decay`. Both are floored at `min`. A decay of `1.0` disables
//! that knob.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Exploration rate schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    /// Exploration rate at the start of training
    pub initial: f64,
    /// Floor for the exploration rate
    pub min: f64,
    /// Successful episodes required before success decay kicks in
    pub success_warmup: usize,
    /// Multiplicative decay applied after each success past the warm-up
    pub success_decay: f64,
    /// Multiplicative decay applied after each failure
    pub failure_decay: f64,
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self {
            initial: 1.0,
            min: 0.01,
            success_warmup: 10,
            success_decay: 0.95,
            failure_decay: 0.99,
        }
    }
}

impl ExplorationSchedule {
    /// Rate after an episode that reached the goal
    ///
    /// `successes` is the cumulative success count including this episode.
    pub fn after_success(&self, epsilon: f64, successes: usize) -> f64 {
        if successes > self.success_warmup {
            self.decay(epsilon, self.success_decay)
        } else {
            epsilon
        }
    }

    /// Rate after an episode that ended on an obstacle
    pub fn after_failure(&self, epsilon: f64) -> f64 {
        self.decay(epsilon, self.failure_decay)
    }

    fn decay(&self, epsilon: f64, factor: f64) -> f64 {
        if epsilon <= self.min {
            epsilon
        } else {
            (epsilon * factor).max(self.min)
        }
    }

    /// Check ranges of every knob
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min) || !(self.min..=1.0).contains(&self.initial) {
            return Err(Error::config(format!(
                "exploration rates must satisfy 0 <= min ({}) <= initial ({}) <= 1",
                self.min, self.initial
            )));
        }
        for (name, factor) in [
            ("success_decay", self.success_decay),
            ("failure_decay", self.failure_decay),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(Error::config(format!("{name} must be in (0, 1], got {factor}")));
            }
        }
        Ok(())
    }
}

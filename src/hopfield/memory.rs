//! Pattern memory: an owned collection of stored patterns plus the network
//! trained on them.

use super::network::HopfieldNetwork;
use super::pattern;
use super::{HopfieldConfig, RecallResult};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};
use tracing::{info, warn};

/// What happened when a pattern was stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Number of patterns now in memory
    pub pattern_count: usize,
    /// Soft capacity of the network
    pub capacity: usize,
    /// Whether the pattern count now exceeds the soft capacity
    pub over_capacity: bool,
}

/// Stored patterns and the Hopfield network built from them
///
/// Every mutation retrains the network from the full collection.
#[derive(Debug, Clone)]
pub struct PatternMemory {
    network: HopfieldNetwork,
    patterns: Vec<Array1<f64>>,
    config: HopfieldConfig,
}

impl PatternMemory {
    /// Create an empty memory with default recall settings
    pub fn new(size: usize) -> Self {
        Self::with_config(size, HopfieldConfig::default())
    }

    /// Create an empty memory with custom recall settings
    pub fn with_config(size: usize, config: HopfieldConfig) -> Self {
        Self {
            network: HopfieldNetwork::new(size),
            patterns: Vec::new(),
            config,
        }
    }

    /// Store a pattern and retrain
    ///
    /// Exceeding the soft capacity is allowed but logged.
    pub fn store(&mut self, pattern: &Array1<f64>) -> Result<StoreOutcome> {
        self.validate(pattern)?;
        if pattern.iter().all(|&x| x < 0.0) {
            return Err(Error::BlankPattern);
        }

        self.patterns.push(pattern.clone());
        self.retrain();

        let capacity = self.network.capacity();
        let outcome = StoreOutcome {
            pattern_count: self.patterns.len(),
            capacity,
            over_capacity: self.patterns.len() > capacity,
        };

        if outcome.over_capacity {
            warn!(
                patterns = outcome.pattern_count,
                capacity, "Exceeding capacity may cause unstable recall"
            );
        } else {
            info!(patterns = outcome.pattern_count, "Pattern stored");
        }

        Ok(outcome)
    }

    /// Remove the first stored pattern identical to `pattern` and retrain
    pub fn remove(&mut self, pattern: &Array1<f64>) -> Result<()> {
        self.validate(pattern)?;

        let index = self
            .patterns
            .iter()
            .position(|stored| stored == pattern)
            .ok_or(Error::PatternNotFound)?;

        self.patterns.remove(index);
        self.retrain();
        info!(index, remaining = self.patterns.len(), "Pattern removed");
        Ok(())
    }

    /// Drop every stored pattern; the weights become all zero
    pub fn clear(&mut self) {
        self.patterns.clear();
        self.retrain();
        info!("All patterns flushed");
    }

    /// Recall using the configured update mode and iteration budget
    pub fn recall(&self, probe: &Array1<f64>) -> Result<RecallResult> {
        self.validate(probe)?;
        Ok(self
            .network
            .recall(probe, self.config.mode, self.config.max_iterations))
    }

    /// Weight matrix contributed by a single stored pattern
    pub fn pattern_weights(&self, index: usize) -> Option<Array2<f64>> {
        let pattern = self.patterns.get(index)?;
        let n = pattern.len();
        let mut weights = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    weights[[i, j]] = pattern[i] * pattern[j];
                }
            }
        }
        Some(weights)
    }

    /// Index of the stored pattern closest to `state` by Hamming distance
    pub fn closest(&self, state: &Array1<f64>) -> Option<(usize, usize)> {
        if state.len() != self.network.size() {
            return None;
        }
        self.patterns
            .iter()
            .map(|stored| pattern::hamming_distance(stored, state))
            .enumerate()
            .min_by_key(|&(_, distance)| distance)
    }

    /// Stored patterns in insertion order
    pub fn patterns(&self) -> &[Array1<f64>] {
        &self.patterns
    }

    /// Number of stored patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern is stored
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Underlying network
    pub fn network(&self) -> &HopfieldNetwork {
        &self.network
    }

    /// Recall settings
    pub fn config(&self) -> &HopfieldConfig {
        &self.config
    }

    /// Whether more patterns are stored than the soft capacity
    pub fn is_over_capacity(&self) -> bool {
        self.patterns.len() > self.network.capacity()
    }

    fn retrain(&mut self) {
        self.network.train(&self.patterns);
    }

    fn validate(&self, pattern: &Array1<f64>) -> Result<()> {
        let expected = self.network.size();
        if pattern.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: pattern.len(),
            });
        }
        if let Some(index) = pattern::first_non_bipolar(pattern) {
            return Err(Error::InvalidPattern {
                index,
                value: pattern[index],
            });
        }
        Ok(())
    }
}

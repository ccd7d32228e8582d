//! Classical Hopfield network
//!
//! Binary units, symmetric weights with zero self-connections, Hebbian
//! training and sign-threshold relaxation.

use super::{RecallResult, UpdateMode};
use ndarray::{Array1, Array2};
use tracing::{debug, trace};

/// Classical Hopfield Network (binary patterns)
#[derive(Debug, Clone)]
pub struct HopfieldNetwork {
    /// Weight matrix (size x size)
    weights: Array2<f64>,
    /// Number of neurons
    size: usize,
    /// Number of patterns used by the last training call
    n_patterns: usize,
}

impl HopfieldNetwork {
    /// Create an untrained network with all-zero weights
    pub fn new(size: usize) -> Self {
        Self {
            weights: Array2::zeros((size, size)),
            size,
            n_patterns: 0,
        }
    }

    /// Rebuild the weights from scratch using Hebbian learning
    ///
    /// W = Σ_μ ξ^μ (ξ^μ)^T with the diagonal forced to zero.
    ///
    /// # Panics
    ///
    /// Panics if a pattern length differs from the network size.
    pub fn train(&mut self, patterns: &[Array1<f64>]) {
        self.weights.fill(0.0);

        for pattern in patterns {
            assert_eq!(pattern.len(), self.size, "Pattern must match network size");

            for i in 0..self.size {
                for j in 0..self.size {
                    if i != j {
                        self.weights[[i, j]] += pattern[i] * pattern[j];
                    }
                }
            }
        }

        self.n_patterns = patterns.len();
        debug!(
            patterns = self.n_patterns,
            size = self.size,
            "Hopfield weights rebuilt"
        );
    }

    /// Relax a probe and return the final state
    ///
    /// See [`HopfieldNetwork::recall`] for the termination rule.
    pub fn recover(&self, probe: &Array1<f64>, mode: UpdateMode, max_iterations: usize) -> Array1<f64> {
        self.recall(probe, mode, max_iterations).pattern
    }

    /// Relax a probe toward an attractor
    ///
    /// Stops after the first sweep that leaves the state unchanged, or after
    /// `max_iterations` sweeps. A unit whose local field is exactly zero
    /// keeps its previous value.
    ///
    /// # Panics
    ///
    /// Panics if the probe length differs from the network size.
    pub fn recall(&self, probe: &Array1<f64>, mode: UpdateMode, max_iterations: usize) -> RecallResult {
        assert_eq!(probe.len(), self.size, "Probe must match network size");

        let mut state = probe.clone();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iterations {
            let changed = match mode {
                UpdateMode::Synchronous => self.sweep_synchronous(&mut state),
                UpdateMode::Asynchronous => self.sweep_asynchronous(&mut state),
            };
            iterations += 1;

            if !changed {
                converged = true;
                break;
            }
        }

        let energy = self.energy(&state);
        debug!(?mode, iterations, converged, energy, "Recall finished");

        RecallResult {
            pattern: state,
            iterations,
            converged,
            energy,
        }
    }

    /// Update every unit from the previous full state
    fn sweep_synchronous(&self, state: &mut Array1<f64>) -> bool {
        let fields = self.weights.dot(&*state);
        let next = Array1::from_iter(
            fields
                .iter()
                .zip(state.iter())
                .map(|(&h, &previous)| threshold(h, previous)),
        );

        let changed = next != *state;
        *state = next;
        changed
    }

    /// Update units one at a time in index order
    fn sweep_asynchronous(&self, state: &mut Array1<f64>) -> bool {
        let mut changed = false;

        for i in 0..self.size {
            let h = self.weights.row(i).dot(&*state);
            let next = threshold(h, state[i]);
            if next != state[i] {
                trace!(unit = i, from = state[i], to = next, "Unit flipped");
                state[i] = next;
                changed = true;
            }
        }

        changed
    }

    /// Compute energy
    ///
    /// E(s) = -1/2 s^T W s
    ///
    /// # Panics
    ///
    /// Panics if the state length differs from the network size.
    pub fn energy(&self, state: &Array1<f64>) -> f64 {
        assert_eq!(state.len(), self.size, "State must match network size");
        -0.5 * state.dot(&self.weights.dot(state))
    }

    /// Soft capacity bound: floor(N / (2 log2 N))
    ///
    /// Recall fidelity degrades once more patterns than this are stored.
    pub fn capacity(&self) -> usize {
        if self.size < 2 {
            return 0;
        }
        let n = self.size as f64;
        (n / (2.0 * n.log2())).floor() as usize
    }

    /// Weight matrix
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Number of units
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of patterns the weights were built from
    pub fn pattern_count(&self) -> usize {
        self.n_patterns
    }
}

/// Sign threshold; a zero field keeps the previous value
fn threshold(field: f64, previous: f64) -> f64 {
    if field > 0.0 {
        1.0
    } else if field < 0.0 {
        -1.0
    } else {
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn single_flip_pattern(size: usize, flipped: usize) -> Array1<f64> {
        let mut pattern = Array1::from_elem(size, 1.0);
        pattern[flipped] = -1.0;
        pattern
    }

    #[test]
    fn test_weights_symmetric_zero_diagonal() {
        let mut network = HopfieldNetwork::new(6);
        network.train(&[
            arr1(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]),
            arr1(&[1.0, 1.0, -1.0, -1.0, 1.0, 1.0]),
        ]);

        let w = network.weights();
        for i in 0..6 {
            assert_eq!(w[[i, i]], 0.0);
            for j in 0..6 {
                assert_eq!(w[[i, j]], w[[j, i]]);
            }
        }
        assert_eq!(network.pattern_count(), 2);
    }

    #[test]
    fn test_training_rebuilds_from_scratch() {
        let a = arr1(&[1.0, -1.0, 1.0]);
        let b = arr1(&[-1.0, -1.0, 1.0]);

        let mut network = HopfieldNetwork::new(3);
        network.train(&[a.clone(), b.clone()]);
        network.train(&[b.clone()]);

        let mut fresh = HopfieldNetwork::new(3);
        fresh.train(&[b]);

        assert_eq!(network.weights(), fresh.weights());
    }

    #[test]
    fn test_stored_pattern_is_fixed_point() {
        let pattern = single_flip_pattern(25, 7);
        let mut network = HopfieldNetwork::new(25);
        network.train(&[pattern.clone()]);

        for mode in [UpdateMode::Synchronous, UpdateMode::Asynchronous] {
            let result = network.recall(&pattern, mode, 100);
            assert_eq!(result.pattern, pattern);
            assert_eq!(result.iterations, 1);
            assert!(result.converged);
        }
    }

    #[test]
    fn test_noisy_probe_recovers() {
        let pattern = single_flip_pattern(25, 3);
        let mut network = HopfieldNetwork::new(25);
        network.train(&[pattern.clone()]);

        let mut probe = pattern.clone();
        probe[10] = -probe[10];
        probe[20] = -probe[20];

        assert_eq!(network.recover(&probe, UpdateMode::Synchronous, 10), pattern);
        assert_eq!(network.recover(&probe, UpdateMode::Asynchronous, 10), pattern);
    }

    #[test]
    fn test_untrained_network_returns_probe() {
        let network = HopfieldNetwork::new(4);
        let probe = arr1(&[1.0, -1.0, -1.0, 1.0]);

        let result = network.recall(&probe, UpdateMode::Synchronous, 50);
        assert_eq!(result.pattern, probe);
        assert_eq!(result.energy, 0.0);
    }

    #[test]
    fn test_zero_budget_returns_probe() {
        let mut network = HopfieldNetwork::new(3);
        network.train(&[arr1(&[1.0, 1.0, 1.0])]);
        let probe = arr1(&[1.0, -1.0, -1.0]);

        let result = network.recall(&probe, UpdateMode::Asynchronous, 0);
        assert_eq!(result.pattern, probe);
        assert_eq!(result.iterations, 0);
        assert!(!result.converged);
    }

    #[test]
    fn test_zero_field_keeps_previous_value() {
        assert_eq!(threshold(0.0, -1.0), -1.0);
        assert_eq!(threshold(0.0, 1.0), 1.0);
        assert_eq!(threshold(-0.5, 1.0), -1.0);
        assert_eq!(threshold(2.0, -1.0), 1.0);
    }

    #[test]
    fn test_energy_lower_at_stored_pattern() {
        let pattern = arr1(&[1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0]);
        let mut network = HopfieldNetwork::new(8);
        network.train(&[pattern.clone()]);

        let mut noisy = pattern.clone();
        noisy[0] = -1.0;
        noisy[3] = -1.0;

        assert!(network.energy(&pattern) < network.energy(&noisy));
    }

    #[test]
    fn test_capacity() {
        assert_eq!(HopfieldNetwork::new(25).capacity(), 2);
        assert_eq!(HopfieldNetwork::new(100).capacity(), 7);
        assert_eq!(HopfieldNetwork::new(1).capacity(), 0);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_probe_panics() {
        let network = HopfieldNetwork::new(4);
        network.recover(&arr1(&[1.0, 1.0]), UpdateMode::Synchronous, 5);
    }
}

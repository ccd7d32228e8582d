//! Bipolar pattern helpers

use ndarray::Array1;
use rand::seq::index::sample;
use rand::Rng;

/// Convert on/off cells into a bipolar pattern (0 -> -1, anything else -> +1)
pub fn from_bits(bits: &[u8]) -> Array1<f64> {
    bits.iter()
        .map(|&b| if b == 0 { -1.0 } else { 1.0 })
        .collect()
}

/// Convert a bipolar pattern back into on/off cells
pub fn to_bits(pattern: &Array1<f64>) -> Vec<u8> {
    pattern.iter().map(|&x| u8::from(x > 0.0)).collect()
}

/// Index of the first unit that is not exactly -1 or +1
pub fn first_non_bipolar(pattern: &Array1<f64>) -> Option<usize> {
    pattern.iter().position(|&x| x != 1.0 && x != -1.0)
}

/// Check that every unit is -1 or +1
pub fn is_bipolar(pattern: &Array1<f64>) -> bool {
    first_non_bipolar(pattern).is_none()
}

/// Flip `floor(noise_level * len)` distinct, randomly chosen units
pub fn add_noise<R: Rng + ?Sized>(pattern: &Array1<f64>, noise_level: f64, rng: &mut R) -> Array1<f64> {
    let len = pattern.len();
    let num_flips = ((noise_level.clamp(0.0, 1.0) * len as f64) as usize).min(len);

    let mut noisy = pattern.clone();
    for idx in sample(rng, len, num_flips) {
        noisy[idx] = -noisy[idx];
    }
    noisy
}

/// Number of units that differ
pub fn hamming_distance(a: &Array1<f64>, b: &Array1<f64>) -> usize {
    assert_eq!(a.len(), b.len(), "Patterns must have same length");
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

/// Normalised overlap m = (1/N) Σ a_i b_i, in [-1, 1] for bipolar patterns
pub fn overlap(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    assert_eq!(a.len(), b.len(), "Patterns must have same length");
    if a.is_empty() {
        return 0.0;
    }
    a.dot(b) / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bits_conversion() {
        let pattern = from_bits(&[1, 0, 0, 1]);
        assert_eq!(pattern, arr1(&[1.0, -1.0, -1.0, 1.0]));
        assert_eq!(to_bits(&pattern), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_is_bipolar() {
        assert!(is_bipolar(&arr1(&[1.0, -1.0])));
        assert!(!is_bipolar(&arr1(&[1.0, 0.0])));
        assert_eq!(first_non_bipolar(&arr1(&[1.0, -1.0, 0.5])), Some(2));
    }

    #[test]
    fn test_add_noise_flips_exact_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let pattern = Array1::from_elem(25, 1.0);

        let noisy = add_noise(&pattern, 0.2, &mut rng);
        assert_eq!(hamming_distance(&pattern, &noisy), 5);
        assert!(is_bipolar(&noisy));

        let unchanged = add_noise(&pattern, 0.0, &mut rng);
        assert_eq!(unchanged, pattern);
    }

    #[test]
    fn test_overlap() {
        let a = arr1(&[1.0, 1.0, -1.0, -1.0]);
        assert_eq!(overlap(&a, &a), 1.0);
        assert_eq!(overlap(&a, &-&a), -1.0);
        assert_eq!(overlap(&a, &arr1(&[1.0, -1.0, 1.0, -1.0])), 0.0);
    }
}

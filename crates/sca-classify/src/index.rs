//! The MNDSI spectral index.

/// Normalized difference between the near-infrared and red bands.
///
/// Bounded in [-1, 1] for finite non-negative reflectance; 0 when the bands
/// are equal. Returns NaN when either band is missing or the pair is
/// degenerate (both zero), so invalid pixels fall out of every later count.
pub fn mndsi(nir: f32, red: f32) -> f32 {
    if !nir.is_finite() || !red.is_finite() {
        return f32::NAN;
    }

    let sum = nir + red;
    if sum == 0.0 {
        return f32::NAN;
    }

    (nir - red) / sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        // hand-computed reference pairs
        assert!((mndsi(0.5, 0.1) - 0.6666667).abs() < 1e-6);
        assert_eq!(mndsi(0.4, 0.4), 0.0);
        assert!((mndsi(0.9, 0.05) - 0.8947368).abs() < 1e-6);
        assert!((mndsi(0.2, 0.3) - (-0.2)).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(mndsi(0.37, 0.21), mndsi(0.37, 0.21));
    }

    #[test]
    fn test_bounded() {
        for &(nir, red) in &[(0.0, 1.0), (1.0, 0.0), (0.01, 0.99), (0.5, 0.5)] {
            let v = mndsi(nir, red);
            assert!((-1.0..=1.0).contains(&v), "mndsi({nir}, {red}) = {v}");
        }
    }

    #[test]
    fn test_missing_data_propagates() {
        assert!(mndsi(f32::NAN, 0.5).is_nan());
        assert!(mndsi(0.5, f32::NAN).is_nan());
        assert!(mndsi(0.0, 0.0).is_nan());
    }
}

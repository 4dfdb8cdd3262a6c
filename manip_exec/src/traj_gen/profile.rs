//! Quintic time scaling for trajectory sampling.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use util::maths::{clamp, poly_val};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map elapsed time onto normalised path progress in `[0, 1]`.
///
/// Uses the quintic smoothstep, which starts and ends with zero velocity and
/// acceleration so sampled paths need no separate blending at their
/// endpoints. Elapsed times outside `[0, duration]` are clamped.
pub(crate) fn smooth_step(elapsed_s: f64, duration_s: f64) -> f64 {
    let tau = clamp(&(elapsed_s / duration_s), &0.0, &1.0);

    // Coefficients of 6t^5 - 15t^4 + 10t^3, highest order first
    poly_val(&tau, &vec![6.0, -15.0, 10.0, 0.0, 0.0, 0.0])
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_endpoints() {
        assert!((smooth_step(0.0, 4.0) - 0.0).abs() < 1e-12);
        assert!((smooth_step(4.0, 4.0) - 1.0).abs() < 1e-12);
        assert!((smooth_step(2.0, 4.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_clamped_outside_duration() {
        assert_eq!(smooth_step(-1.0, 4.0), 0.0);
        assert_eq!(smooth_step(5.0, 4.0), 1.0);
    }

    #[test]
    fn test_monotonic() {
        let mut prev = 0.0;

        for i in 1..=100 {
            let s = smooth_step(i as f64 * 0.04, 4.0);
            assert!(s >= prev);
            prev = s;
        }
    }
}

use crate::FlError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FlError::NonFinite { what, value: v })
    }
}

/// Relative error of `value` against a nonzero `reference`.
///
/// Falls back to the absolute error when the reference is zero.
pub fn relative_error(value: Real, reference: Real) -> Real {
    if reference == 0.0 {
        (value - reference).abs()
    } else {
        ((value - reference) / reference).abs()
    }
}

/// Linear interpolation of `y` at `x` on the segment `(x0, y0)`-`(x1, y1)`.
///
/// Returns `y0` for a degenerate segment.
pub fn lerp(x: Real, x0: Real, y0: Real, x1: Real, y1: Real) -> Real {
    let dx = x1 - x0;
    if dx == 0.0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / dx
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn relative_error_basic() {
        assert!((relative_error(105.0, 100.0) - 0.05).abs() < 1e-12);
        assert!((relative_error(95.0, 100.0) - 0.05).abs() < 1e-12);
        assert_eq!(relative_error(2.0, 0.0), 2.0);
    }

    #[test]
    fn lerp_endpoints_and_degenerate() {
        assert_eq!(lerp(0.0, 0.0, 1.0, 1.0, 3.0), 1.0);
        assert_eq!(lerp(1.0, 0.0, 1.0, 1.0, 3.0), 3.0);
        assert_eq!(lerp(0.5, 0.0, 1.0, 1.0, 3.0), 2.0);
        assert_eq!(lerp(0.5, 1.0, 7.0, 1.0, 9.0), 7.0);
    }

    proptest! {
        #[test]
        fn lerp_stays_within_segment(t in 0.0f64..=1.0, y0 in -1e6f64..1e6, y1 in -1e6f64..1e6) {
            let y = lerp(t, 0.0, y0, 1.0, y1);
            let (lo, hi) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
            prop_assert!(y >= lo - 1e-6 && y <= hi + 1e-6);
        }
    }
}

//! Common utilities for component calculations.

use crate::error::{ComponentError, ComponentResult};
use fl_core::numeric::ensure_finite;
use std::f64::consts::PI;

/// Small epsilon for mass flow rate (kg/s); below this a component sees no flow.
pub const EPSILON_MDOT: f64 = 1e-9;

/// Ensure a value is finite, returning ComponentError if not.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Ensure a configuration value is strictly positive and finite.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ComponentError::InvalidArg { what });
    }
    Ok(())
}

/// Circular flow section (m²) for a bore diameter (m).
pub fn flow_area(diameter: f64) -> f64 {
    PI * diameter * diameter / 4.0
}

/// Mean velocity (m/s) from continuity: v = ṁ / (ρ·A).
pub fn mean_velocity(mdot: f64, rho: f64, diameter: f64) -> f64 {
    mdot / (rho * flow_area(diameter))
}

/// Reynolds number ρ·v·D/μ.
pub fn reynolds(rho: f64, velocity: f64, diameter: f64, viscosity: f64) -> f64 {
    rho * velocity * diameter / viscosity
}

/// Dynamic pressure ρ·v²/2.
pub fn dynamic_pressure(rho: f64, velocity: f64) -> f64 {
    0.5 * rho * velocity * velocity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::INFINITY, "test").is_err());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive(0.1, "test").is_ok());
        assert!(check_positive(0.0, "test").is_err());
        assert!(check_positive(-1.0, "test").is_err());
    }

    #[test]
    fn test_velocity_and_reynolds() {
        // 1 kg/s of water through a 16 mm bore
        let v = mean_velocity(1.0, 1000.0, 0.016);
        assert!((v - 4.9736).abs() < 1e-3);
        let re = reynolds(1000.0, v, 0.016, 8.9e-4);
        assert!((re - 89_413.0).abs() < 50.0);
        assert!((dynamic_pressure(1000.0, 2.0) - 2000.0).abs() < 1e-12);
    }
}

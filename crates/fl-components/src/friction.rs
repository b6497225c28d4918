//! Darcy-Weisbach friction with Reynolds-delimited regimes.
//!
//! - Laminar (Re < 2300): f = 64/Re
//! - Transitional (2300 ≤ Re < 63000): smooth-pipe Nikuradse fit f = 0.3164·Re^-0.25,
//!   blended linearly from the laminar value over 2300..4000 so f stays continuous
//! - Beyond 63000 the transitional fit is extrapolated and the result is flagged
//!   [`FlowRegime::BeyondRange`] so callers can report it.

use crate::common::{dynamic_pressure, mean_velocity, reynolds};

/// Upper bound of the laminar regime.
pub const RE_LAMINAR_MAX: f64 = 2300.0;

/// End of the laminar-to-Nikuradse blend.
pub const RE_BLEND_END: f64 = 4000.0;

/// Upper bound of the validated transitional fit.
pub const RE_TRANSITIONAL_MAX: f64 = 63_000.0;

/// Correlation branch used for a friction factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRegime {
    Laminar,
    Transitional,
    /// Outside every validated branch; nearest-branch extrapolation.
    BeyondRange,
}

/// Darcy friction factor with the regime it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrictionFactor {
    pub value: f64,
    pub regime: FlowRegime,
}

fn nikuradse(re: f64) -> f64 {
    0.3164 / re.powf(0.25)
}

/// Darcy friction factor for a Reynolds number. A non-positive Reynolds number means no flow.
pub fn darcy_friction_factor(re: f64) -> FrictionFactor {
    if re <= 0.0 {
        return FrictionFactor {
            value: 0.0,
            regime: FlowRegime::Laminar,
        };
    }

    if re < RE_LAMINAR_MAX {
        FrictionFactor {
            value: 64.0 / re,
            regime: FlowRegime::Laminar,
        }
    } else if re < RE_BLEND_END {
        let f_lam = 64.0 / RE_LAMINAR_MAX;
        let f_end = nikuradse(RE_BLEND_END);
        let w = (re - RE_LAMINAR_MAX) / (RE_BLEND_END - RE_LAMINAR_MAX);
        FrictionFactor {
            value: f_lam + w * (f_end - f_lam),
            regime: FlowRegime::Transitional,
        }
    } else if re < RE_TRANSITIONAL_MAX {
        FrictionFactor {
            value: nikuradse(re),
            regime: FlowRegime::Transitional,
        }
    } else {
        FrictionFactor {
            value: nikuradse(re),
            regime: FlowRegime::BeyondRange,
        }
    }
}

/// Pressure loss across a straight run plus lumped minor losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuctLoss {
    /// Pressure loss (Pa)
    pub dp: f64,
    pub reynolds: f64,
    pub friction: FrictionFactor,
}

/// Darcy-Weisbach loss ΔP = (f·L/D + K)·ρv²/2 for an incompressible flow.
///
/// All arguments are SI: kg/s, kg/m³, Pa·s, m, m.
pub fn duct_loss(
    mdot: f64,
    rho: f64,
    viscosity: f64,
    diameter: f64,
    length: f64,
    k_minor: f64,
) -> DuctLoss {
    let v = mean_velocity(mdot, rho, diameter);
    let re = reynolds(rho, v, diameter, viscosity);
    let friction = darcy_friction_factor(re);
    let dp = (friction.value * length / diameter + k_minor) * dynamic_pressure(rho, v);
    DuctLoss {
        dp,
        reynolds: re,
        friction,
    }
}

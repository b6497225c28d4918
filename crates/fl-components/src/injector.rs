//! Injector: terminal element with an empirical power-law characteristic.
//!
//! `mdot = a · (ΔP / 1 bar)^n`, inverted to give the pressure drop for a
//! prescribed mass flow. The fit is liquid-only.

use crate::common::{EPSILON_MDOT, check_finite, check_positive};
use crate::diagnostics::EvalContext;
use crate::error::ComponentResult;
use crate::state::ComponentState;
use crate::traits::{ChainComponent, PressureDrop, Step};
use fl_core::units::constants::PA_PER_BAR;
use fl_core::units::{Pressure, pa};
use fl_fluids::{Node, Substance};

#[derive(Debug, Clone)]
pub struct Injector {
    name: String,
    a: f64,
    n: f64,
}

impl Injector {
    pub fn new(name: impl Into<String>, a: f64, n: f64) -> ComponentResult<Self> {
        check_positive(a, "injector coefficient a must be positive")?;
        check_positive(n, "injector exponent n must be positive")?;
        Ok(Self {
            name: name.into(),
            a,
            n,
        })
    }

    pub fn coefficient(&self) -> f64 {
        self.a
    }

    pub fn exponent(&self) -> f64 {
        self.n
    }

    /// Mass flow (kg/s) delivered at pressure drop `dp` (Pa).
    pub fn mass_flow_at(&self, dp: f64) -> f64 {
        self.a * (dp.max(0.0) / PA_PER_BAR).powf(self.n)
    }
}

impl PressureDrop for Injector {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        if let Substance::Gas(_) = node.substance() {
            ctx.misuse(&self.name, "injector characteristic evaluated with a gas, drop taken as zero");
            return Ok(pa(0.0));
        }
        let mdot = node.mass_flow().value;
        if mdot < EPSILON_MDOT {
            return Ok(pa(0.0));
        }
        let dp = PA_PER_BAR * (mdot / self.a).powf(1.0 / self.n);
        check_finite(dp, "injector pressure drop")?;
        Ok(pa(dp))
    }
}

impl ChainComponent for Injector {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Injector"
    }

    fn step(
        &self,
        node: &Node,
        state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        Ok(Step::Drop(self.pressure_drop(node, state, ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, gas_node, liquid_node};

    #[test]
    fn injector_inverts_power_law() {
        let inj = Injector::new("I", 0.2269, 0.4459).unwrap();
        let dp = inj
            .pressure_drop(&liquid_node(1e5, 0.378), &mut ComponentState::Stateless, &mut ctx())
            .unwrap()
            .value;
        let expected = 1e5 * (0.378_f64 / 0.2269).powf(1.0 / 0.4459);
        assert!((dp - expected).abs() < 1e-6 * expected);
        assert!((inj.mass_flow_at(dp) - 0.378).abs() < 1e-9);
    }

    #[test]
    fn injector_gas_is_misuse() {
        let inj = Injector::new("I", 0.2269, 0.4459).unwrap();
        let mut ctx = ctx();
        let dp = inj
            .pressure_drop(&gas_node(10e5, 0.1), &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        assert_eq!(dp.value, 0.0);
        assert_eq!(ctx.warnings().len(), 1);
    }

    #[test]
    fn injector_rejects_bad_fit() {
        assert!(Injector::new("I", 0.0, 0.5).is_err());
        assert!(Injector::new("I", 0.2, -1.0).is_err());
    }
}

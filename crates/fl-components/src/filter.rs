//! Inline filter modelled as a fixed minor loss at its port diameter.

use crate::common::{EPSILON_MDOT, check_finite, check_positive, dynamic_pressure, mean_velocity};
use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::state::ComponentState;
use crate::traits::{ChainComponent, PressureDrop, Step};
use fl_core::units::{Length, Pressure, pa};
use fl_fluids::Node;

#[derive(Debug, Clone)]
pub struct Filter {
    name: String,
    diameter: Length,
    loss_coefficient: f64,
}

impl Filter {
    pub fn new(
        name: impl Into<String>,
        diameter: Length,
        loss_coefficient: f64,
    ) -> ComponentResult<Self> {
        check_positive(diameter.value, "filter diameter must be positive")?;
        if !loss_coefficient.is_finite() || loss_coefficient < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "filter loss coefficient must be non-negative",
            });
        }
        Ok(Self {
            name: name.into(),
            diameter,
            loss_coefficient,
        })
    }

    pub fn diameter(&self) -> Length {
        self.diameter
    }

    pub fn loss_coefficient(&self) -> f64 {
        self.loss_coefficient
    }
}

impl PressureDrop for Filter {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        _ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        let mdot = node.mass_flow().value;
        if mdot < EPSILON_MDOT {
            return Ok(pa(0.0));
        }
        let rho = node.density()?.value;
        let dp = self.loss_coefficient
            * dynamic_pressure(rho, mean_velocity(mdot, rho, self.diameter.value));
        check_finite(dp, "filter pressure drop")?;
        Ok(pa(dp))
    }
}

impl ChainComponent for Filter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Filter"
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

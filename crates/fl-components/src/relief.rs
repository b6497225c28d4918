//! Burst disk: passive in the flow path, latches when overpressured.

use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::state::{ComponentState, ReliefState};
use crate::traits::{ChainComponent, PressureDrop, Step};
use fl_core::units::{Pressure, pa};
use fl_fluids::Node;

#[derive(Debug, Clone)]
pub struct BurstDisk {
    name: String,
    burst_pressure: Pressure,
}

impl BurstDisk {
    pub fn new(name: impl Into<String>, burst_pressure: Pressure) -> ComponentResult<Self> {
        crate::common::check_positive(burst_pressure.value, "burst pressure must be positive")?;
        Ok(Self {
            name: name.into(),
            burst_pressure,
        })
    }

    pub fn burst_pressure(&self) -> Pressure {
        self.burst_pressure
    }

    /// Latch `state` if `pressure` exceeds the burst pressure. Returns true on the
    /// transition only.
    pub fn check(&self, pressure: Pressure, state: &mut ReliefState) -> bool {
        if state.triggered || pressure <= self.burst_pressure {
            return false;
        }
        state.triggered = true;
        tracing::warn!(
            component = %self.name,
            pressure_pa = pressure.value,
            burst_pa = self.burst_pressure.value,
            "burst disk triggered"
        );
        true
    }
}

impl PressureDrop for BurstDisk {
    fn pressure_drop(
        &self,
        node: &Node,
        state: &mut ComponentState,
        _ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        let relief = state
            .as_relief_mut()
            .ok_or_else(|| ComponentError::StateMismatch {
                component: self.name.clone(),
            })?;
        self.check(node.pressure(), relief);
        Ok(pa(0.0))
    }
}

impl ChainComponent for BurstDisk {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "BurstDisk"
    }

    fn initial_state(&self) -> ComponentState {
        ComponentState::Relief(ReliefState::default())
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

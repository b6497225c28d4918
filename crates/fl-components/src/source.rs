//! Pressurant source marking the upstream end of a chain.

use crate::common::check_positive;
use crate::diagnostics::EvalContext;
use crate::error::ComponentResult;
use crate::state::ComponentState;
use crate::traits::{ChainComponent, Step};
use fl_core::units::{Pressure, Volume};
use fl_fluids::Node;

/// Gas bottle. Never contributes a pressure delta; reaching it ends a traversal.
#[derive(Debug, Clone)]
pub struct Cylinder {
    name: String,
    pressure: Pressure,
    volume: Volume,
}

impl Cylinder {
    pub fn new(name: impl Into<String>, pressure: Pressure, volume: Volume) -> ComponentResult<Self> {
        check_positive(pressure.value, "cylinder pressure must be positive")?;
        check_positive(volume.value, "cylinder volume must be positive")?;
        Ok(Self {
            name: name.into(),
            pressure,
            volume,
        })
    }

    /// Nominal (filled) pressure.
    pub fn pressure(&self) -> Pressure {
        self.pressure
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }
}

impl ChainComponent for Cylinder {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Cylinder"
    }

    fn nominal_pressure(&self) -> Option<Pressure> {
        Some(self.pressure)
    }

    fn step(
        &self,
        _node: &Node,
        _state: &mut ComponentState,
        _ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        Ok(Step::Source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, gas_node};
    use fl_core::units::{m3, pa};

    #[test]
    fn cylinder_is_a_source() {
        let c = Cylinder::new("R1", pa(15e5), m3(5e-3)).unwrap();
        let step = c
            .step(&gas_node(10e5, 0.01), &mut c.initial_state(), &mut ctx())
            .unwrap();
        assert_eq!(step, Step::Source);
        assert_eq!(c.nominal_pressure(), Some(pa(15e5)));
    }

    #[test]
    fn cylinder_rejects_empty_volume() {
        assert!(Cylinder::new("R1", pa(15e5), m3(0.0)).is_err());
    }
}

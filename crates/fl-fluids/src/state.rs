//! Fluid state propagated along a hydraulic chain.

use crate::error::{FluidError, FluidResult};
use crate::substance::{Substance, SubstanceRef};
use fl_core::units::{Density, MassRate, Pressure, Temperature};

/// Fluid state at one position of the chain: pressure, mass flow, substance, temperature.
///
/// Nodes are values: every transformation returns a new node and leaves the
/// original untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    p: Pressure,
    mdot: MassRate,
    substance: SubstanceRef,
    t: Temperature,
}

impl Node {
    /// Create a node, validating that pressure and temperature are positive and
    /// mass flow is non-negative.
    pub fn new(
        p: Pressure,
        mdot: MassRate,
        substance: SubstanceRef,
        t: Temperature,
    ) -> FluidResult<Self> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        if !mdot.value.is_finite() || mdot.value < 0.0 {
            return Err(FluidError::NonPhysical {
                what: "mass flow must be non-negative and finite",
            });
        }
        Ok(Self {
            p,
            mdot,
            substance,
            t,
        })
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    pub fn mass_flow(&self) -> MassRate {
        self.mdot
    }

    pub fn substance(&self) -> &Substance {
        &self.substance
    }

    /// Shared handle to the substance, for building downstream nodes.
    pub fn substance_ref(&self) -> &SubstanceRef {
        &self.substance
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    /// Local density (ideal gas for gases).
    pub fn density(&self) -> FluidResult<Density> {
        self.substance.density(self.p, self.t)
    }

    /// Same state at a different pressure.
    pub fn with_pressure(&self, p: Pressure) -> FluidResult<Self> {
        Self::new(p, self.mdot, self.substance.clone(), self.t)
    }

    /// Same state with `dp` added to the pressure.
    pub fn with_added_pressure(&self, dp: Pressure) -> FluidResult<Self> {
        self.with_pressure(self.p + dp)
    }

    /// Same state carrying a different mass flow.
    pub fn with_mass_flow(&self, mdot: MassRate) -> FluidResult<Self> {
        Self::new(self.p, mdot, self.substance.clone(), self.t)
    }
}

//! Liquid and gas substance models.

use std::sync::Arc;

use crate::error::{FluidError, FluidResult};
use fl_core::units::{Density, DynVisc, GasConstant, Pressure, Temperature, kgpm3};

/// Shared handle to a substance; nodes and tanks refer to substances, never own them.
pub type SubstanceRef = Arc<Substance>;

fn check_positive(v: f64, what: &'static str) -> FluidResult<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(FluidError::NonPhysical { what });
    }
    Ok(())
}

/// Incompressible liquid.
#[derive(Debug, Clone, PartialEq)]
pub struct Liquid {
    name: String,
    density: Density,
    viscosity: DynVisc,
}

impl Liquid {
    pub fn new(name: impl Into<String>, density: Density, viscosity: DynVisc) -> FluidResult<Self> {
        check_positive(density.value, "liquid density must be positive and finite")?;
        check_positive(viscosity.value, "liquid viscosity must be positive and finite")?;
        Ok(Self {
            name: name.into(),
            density,
            viscosity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn viscosity(&self) -> DynVisc {
        self.viscosity
    }
}

/// Ideal gas described by its specific gas constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Gas {
    name: String,
    gas_constant: GasConstant,
    viscosity: DynVisc,
}

impl Gas {
    pub fn new(
        name: impl Into<String>,
        gas_constant: GasConstant,
        viscosity: DynVisc,
    ) -> FluidResult<Self> {
        check_positive(gas_constant.value, "gas constant must be positive and finite")?;
        check_positive(viscosity.value, "gas viscosity must be positive and finite")?;
        Ok(Self {
            name: name.into(),
            gas_constant,
            viscosity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gas_constant(&self) -> GasConstant {
        self.gas_constant
    }

    pub fn viscosity(&self) -> DynVisc {
        self.viscosity
    }

    /// Ideal-gas density ρ = P / (R·T).
    pub fn density(&self, p: Pressure, t: Temperature) -> FluidResult<Density> {
        check_positive(p.value, "pressure must be positive and finite")?;
        check_positive(t.value, "temperature must be positive and finite")?;
        Ok(kgpm3(p.value / (self.gas_constant.value * t.value)))
    }
}

/// Working substance at a point of the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Substance {
    Liquid(Liquid),
    Gas(Gas),
}

impl Substance {
    pub fn name(&self) -> &str {
        match self {
            Substance::Liquid(l) => l.name(),
            Substance::Gas(g) => g.name(),
        }
    }

    pub fn viscosity(&self) -> DynVisc {
        match self {
            Substance::Liquid(l) => l.viscosity(),
            Substance::Gas(g) => g.viscosity(),
        }
    }

    /// Density at the given local state. Liquids ignore pressure and temperature.
    pub fn density(&self, p: Pressure, t: Temperature) -> FluidResult<Density> {
        match self {
            Substance::Liquid(l) => Ok(l.density()),
            Substance::Gas(g) => g.density(p, t),
        }
    }

    pub fn is_liquid(&self) -> bool {
        matches!(self, Substance::Liquid(_))
    }

    pub fn as_liquid(&self) -> Option<&Liquid> {
        match self {
            Substance::Liquid(l) => Some(l),
            Substance::Gas(_) => None,
        }
    }

    pub fn as_gas(&self) -> Option<&Gas> {
        match self {
            Substance::Gas(g) => Some(g),
            Substance::Liquid(_) => None,
        }
    }

    /// Phase label for diagnostics.
    pub fn phase(&self) -> &'static str {
        match self {
            Substance::Liquid(_) => "liquid",
            Substance::Gas(_) => "gas",
        }
    }
}

impl From<Liquid> for Substance {
    fn from(l: Liquid) -> Self {
        Substance::Liquid(l)
    }
}

impl From<Gas> for Substance {
    fn from(g: Gas) -> Self {
        Substance::Gas(g)
    }
}

//! Error types for component operations.

use fl_fluids::FluidError;
use thiserror::Error;

/// Errors that can occur during component calculations.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(
        "No compatible pressure curve in '{component}' for mass flow {mass_flow_kgps} kg/s at outlet pressure {pressure_pa} Pa"
    )]
    NoCompatibleCurve {
        component: String,
        mass_flow_kgps: f64,
        pressure_pa: f64,
    },

    #[error("Run state of '{component}' does not match its kind")]
    StateMismatch { component: String },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

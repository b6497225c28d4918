//! Per-run mutable component state.
//!
//! Components are immutable configuration. Anything that evolves while a chain
//! is traversed lives in a [`ComponentState`] owned by the traversal and
//! created fresh from [`crate::ChainComponent::initial_state`] for every run.

use fl_core::units::{Length, Pressure};

/// Evolving state of a two-phase tank.
#[derive(Debug, Clone, PartialEq)]
pub struct TankState {
    /// Gas pressure inside the tank, just upstream of the outlet.
    pub pressure: Pressure,
    /// Liquid-gas interface position measured from the pressurant end.
    pub interface_position: Length,
    /// Set once the interface reaches the outlet end.
    pub drained: bool,
}

/// Latch of a relief device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReliefState {
    /// Set (never cleared) once local pressure exceeded the burst pressure.
    pub triggered: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ComponentState {
    #[default]
    Stateless,
    Tank(TankState),
    Relief(ReliefState),
}

impl ComponentState {
    pub fn as_tank(&self) -> Option<&TankState> {
        match self {
            ComponentState::Tank(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tank_mut(&mut self) -> Option<&mut TankState> {
        match self {
            ComponentState::Tank(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_relief(&self) -> Option<&ReliefState> {
        match self {
            ComponentState::Relief(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_relief_mut(&mut self) -> Option<&mut ReliefState> {
        match self {
            ComponentState::Relief(r) => Some(r),
            _ => None,
        }
    }
}

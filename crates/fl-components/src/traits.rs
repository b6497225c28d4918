//! Core traits for chain components.

use core::fmt;

use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::state::ComponentState;
use fl_core::units::Pressure;
use fl_fluids::Node;

/// Effect of one component on the running node while the chain is traversed
/// from the terminal end toward the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Pressure delta to add to the running node.
    Drop(Pressure),
    /// The component fixes the upstream pressure directly (regulators).
    Override(Pressure),
    /// The component replaces the running node (phase boundaries).
    Replace(Node),
    /// Upstream boundary of the chain; traversal stops here.
    Source,
}

/// Capability contract every chain component implements.
///
/// Components are immutable configuration. Per-run state is passed in
/// explicitly so repeated traversals start from the same initial conditions.
pub trait ChainComponent: Send + Sync + fmt::Debug {
    /// Component name (P&ID tag) for diagnostics and identification.
    fn name(&self) -> &str;

    /// Short kind label, e.g. `"Conduit"`.
    fn kind(&self) -> &'static str;

    /// Nominal pressure of a source component, reported alongside the
    /// computed requirement.
    fn nominal_pressure(&self) -> Option<Pressure> {
        None
    }

    /// Fresh run state for this component.
    fn initial_state(&self) -> ComponentState {
        ComponentState::Stateless
    }

    /// Evaluate the component against the node just downstream of it.
    ///
    /// Default implementation returns NotSupported, which a traversal reports
    /// as a configuration error.
    fn step(
        &self,
        _node: &Node,
        _state: &mut ComponentState,
        _ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        Err(ComponentError::NotSupported {
            what: "component has no chain behaviour",
        })
    }
}

/// Components whose whole effect is a pressure delta.
pub trait PressureDrop {
    /// Pressure delta (Pa) to add to the downstream node to obtain the inlet pressure.
    ///
    /// Mass flow and substance pass through unchanged.
    fn pressure_drop(
        &self,
        node: &Node,
        state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure>;
}

//! Chain propagation and flow-rate search for feed lines.
//!
//! [`propagate`] walks a [`HydraulicChain`] from its terminal boundary toward
//! the pressurant source and reports the pressure and mass flow required
//! there. [`solve_flow_rate`] wraps it in a search for the mass flow that a
//! known source pressure delivers.

pub mod chain;
pub mod error;
pub mod flow;
pub mod propagate;

pub use chain::{ChainState, HydraulicChain};
pub use error::{SolverError, SolverResult};
pub use flow::{
    FlowProgress, FlowSolution, FlowSolverConfig, solve_flow_rate, solve_flow_rate_with_progress,
};
pub use propagate::{
    PropagationOptions, PropagationOutcome, PropagationTrace, SourceInfo, StepKind, TraceRecord,
    propagate, propagate_with_state,
};

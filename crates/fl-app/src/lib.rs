//! Shared application service layer for feedline.
//!
//! Both the CLI and library users go through this crate to load a project,
//! compile it into a [`fl_solver::HydraulicChain`], and run a propagation or
//! a flow-rate search on it.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod runtime_compile;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use progress::{FlowSearchProgress, RunProgressEvent, RunStage};
pub use project_service::{
    ComponentSummary, list_components, load_project, save_project, validate_project,
};
pub use run_service::{
    FlowReport, PropagationReport, RunMode, RunOptions, RunReport, RunRequest, RunResponse,
    RunTimingSummary, SourceReport, TraceRow, ensure_run, ensure_run_with_progress, run_project,
};
pub use runtime_compile::{
    ChainRuntime, build_boundary, build_component, build_substances, compile_project,
};

//! Run execution service: propagation and flow-rate search over a project.

use std::path::Path;
use std::time::Instant;

use fl_core::units::{kgps, s};
use fl_fluids::Node;
use fl_project::schema::Project;
use fl_solver::{FlowProgress, PropagationOutcome, StepKind};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::progress::{FlowSearchProgress, RunProgressEvent, RunStage};
use crate::project_service;
use crate::runtime_compile::{self, ChainRuntime};

/// What a run computes.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Walk the chain once at the boundary mass flow.
    Propagate,
    /// Search the mass flow that matches a source pressure. `None` uses the
    /// project's solver target.
    SolveFlow { target_pa: Option<f64> },
}

impl RunMode {
    pub fn label(&self) -> &'static str {
        match self {
            RunMode::Propagate => "propagate",
            RunMode::SolveFlow { .. } => "solve-flow",
        }
    }
}

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Keep the per-component trace in the report.
    pub record_trace: bool,
    /// Replace the boundary mass flow of the project.
    pub mass_flow_kgps: Option<f64>,
    /// Replace the solver time step of the project.
    pub time_step_s: Option<f64>,
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub mode: RunMode,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub id: String,
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_pressure_pa: Option<f64>,
}

/// One visited component, terminal end first.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRow {
    pub position: usize,
    pub id: String,
    pub kind: &'static str,
    pub step: &'static str,
    pub pressure_delta_pa: f64,
    pub pressure_pa: f64,
    pub mass_flow_kgps: f64,
    pub substance: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropagationReport {
    pub required_pressure_pa: f64,
    pub mass_flow_kgps: f64,
    pub substance: String,
    pub temperature_k: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceReport>,
    pub warnings: Vec<String>,
    pub triggered_reliefs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceRow>,
}

impl PropagationReport {
    pub fn from_outcome(outcome: &PropagationOutcome) -> Self {
        let trace = outcome
            .trace
            .as_ref()
            .map(|t| t.records.iter().map(trace_row).collect())
            .unwrap_or_default();
        Self {
            required_pressure_pa: outcome.pressure().value,
            mass_flow_kgps: outcome.mass_flow().value,
            substance: outcome.node.substance().name().to_string(),
            temperature_k: outcome.node.temperature().value,
            source: outcome.source.as_ref().map(|src| SourceReport {
                id: src.name.clone(),
                position: src.id.position(),
                nominal_pressure_pa: src.nominal_pressure.map(|p| p.value),
            }),
            warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
            triggered_reliefs: outcome.triggered_reliefs.clone(),
            trace,
        }
    }
}

fn trace_row(record: &fl_solver::TraceRecord) -> TraceRow {
    TraceRow {
        position: record.id.position(),
        id: record.name.clone(),
        kind: record.kind,
        step: match record.step {
            StepKind::Drop => "drop",
            StepKind::Override => "override",
            StepKind::Replace => "replace",
            StepKind::Source => "source",
        },
        pressure_delta_pa: record.pressure_delta.value,
        pressure_pa: record.node.pressure().value,
        mass_flow_kgps: record.node.mass_flow().value,
        substance: record.node.substance().name().to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub target_pressure_pa: f64,
    pub mass_flow_kgps: f64,
    pub source_pressure_pa: f64,
    pub rel_error: f64,
    pub iterations: usize,
    pub propagation: PropagationReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunReport {
    Propagation(PropagationReport),
    Flow(FlowReport),
}

/// Response from a run execution.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub project: String,
    pub report: RunReport,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    mode: &RunMode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    flow: Option<FlowSearchProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            mode: mode.clone(),
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            flow,
        });
    }
}

/// Load a project file and execute the requested run.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Load a project file, execute the requested run, and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    emit_progress(
        &mut progress_cb,
        &request.mode,
        RunStage::LoadingProject,
        started,
        Some("Loading project".to_string()),
        None,
    );
    let project = project_service::load_project(request.project_path)?;
    let load_time_s = started.elapsed().as_secs_f64();

    let mut response = execute_run(
        &project,
        &request.mode,
        &request.options,
        progress_cb,
        started,
    )?;
    response.timing.load_time_s = load_time_s;
    Ok(response)
}

/// Execute a run on an already loaded project.
pub fn run_project(
    project: &Project,
    mode: &RunMode,
    options: &RunOptions,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    execute_run(project, mode, options, progress_cb, Instant::now())
}

fn execute_run(
    project: &Project,
    mode: &RunMode,
    options: &RunOptions,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<RunResponse> {
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::CompilingRuntime,
        started,
        Some("Compiling chain".to_string()),
        None,
    );
    let compile_started = Instant::now();
    let mut runtime = runtime_compile::compile_project(project)?;
    apply_overrides(&mut runtime, options)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    let solve_started = Instant::now();
    let report = match mode {
        RunMode::Propagate => {
            emit_progress(
                &mut progress_cb,
                mode,
                RunStage::Propagating,
                started,
                Some("Propagating boundary".to_string()),
                None,
            );
            let outcome =
                fl_solver::propagate(&runtime.chain, &runtime.boundary, &runtime.propagation)?;
            RunReport::Propagation(PropagationReport::from_outcome(&outcome))
        }
        RunMode::SolveFlow { target_pa } => {
            let target = target_pa
                .map(fl_core::units::pa)
                .or(runtime.target_source_pressure)
                .ok_or_else(|| {
                    AppError::InvalidInput(
                        "flow search needs a target source pressure".to_string(),
                    )
                })?;
            let max_iterations = runtime.flow.max_iterations;
            let mut on_trial = |p: FlowProgress| {
                emit_progress(
                    &mut progress_cb,
                    mode,
                    RunStage::SearchingFlow,
                    started,
                    None,
                    Some(FlowSearchProgress {
                        iteration: p.iteration,
                        max_iterations,
                        mass_flow_kgps: p.mass_flow.value,
                        source_pressure_pa: p.source_pressure.value,
                        rel_error: p.rel_error,
                        step_kgps: p.step.value,
                    }),
                );
            };
            let solution = fl_solver::solve_flow_rate_with_progress(
                &runtime.chain,
                &runtime.boundary,
                target,
                &runtime.flow,
                &mut on_trial,
            )?;
            tracing::info!(
                project = %project.name,
                mass_flow_kgps = solution.mass_flow.value,
                iterations = solution.iterations,
                "flow search converged"
            );
            RunReport::Flow(FlowReport {
                target_pressure_pa: target.value,
                mass_flow_kgps: solution.mass_flow.value,
                source_pressure_pa: solution.source_pressure.value,
                rel_error: solution.rel_error,
                iterations: solution.iterations,
                propagation: PropagationReport::from_outcome(&solution.outcome),
            })
        }
    };
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        mode,
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(RunResponse {
        project: project.name.clone(),
        report,
        timing,
    })
}

fn apply_overrides(runtime: &mut ChainRuntime, options: &RunOptions) -> AppResult<()> {
    if let Some(mdot) = options.mass_flow_kgps {
        runtime.boundary = with_mass_flow(&runtime.boundary, mdot)?;
    }
    if let Some(dt) = options.time_step_s {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "time step must be positive, got {dt}"
            )));
        }
        runtime.propagation.time_step = s(dt);
        runtime.flow.propagation.time_step = s(dt);
    }
    runtime.propagation.record_trace = options.record_trace;
    runtime.flow.propagation.record_trace = options.record_trace;
    Ok(())
}

fn with_mass_flow(boundary: &Node, mdot: f64) -> AppResult<Node> {
    boundary
        .with_mass_flow(kgps(mdot))
        .map_err(|e| AppError::InvalidInput(e.to_string()))
}

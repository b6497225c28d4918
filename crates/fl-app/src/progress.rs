use crate::run_service::RunMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CompilingRuntime,
    Propagating,
    SearchingFlow,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingProject => "loading",
            RunStage::CompilingRuntime => "compiling",
            RunStage::Propagating => "propagating",
            RunStage::SearchingFlow => "searching",
            RunStage::Completed => "done",
        }
    }
}

/// Snapshot of one flow-search trial.
#[derive(Debug, Clone, Default)]
pub struct FlowSearchProgress {
    pub iteration: usize,
    pub max_iterations: usize,
    pub mass_flow_kgps: f64,
    pub source_pressure_pa: f64,
    pub rel_error: f64,
    pub step_kgps: f64,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub mode: RunMode,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub flow: Option<FlowSearchProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        mode: RunMode,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            mode,
            stage,
            elapsed_wall_s,
            message,
            flow: None,
        }
    }
}

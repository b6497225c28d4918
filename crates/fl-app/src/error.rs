//! Error types for the fl-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives the frontends a single error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Runtime compilation failed: {0}")]
    Compile(String),

    /// The chain cannot be evaluated as configured, whatever the mass flow.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Flow search did not converge: {0}")]
    Convergence(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for fl-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<fl_project::ProjectError> for AppError {
    fn from(err: fl_project::ProjectError) -> Self {
        match err {
            fl_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<fl_solver::SolverError> for AppError {
    fn from(err: fl_solver::SolverError) -> Self {
        use fl_solver::SolverError;
        match &err {
            SolverError::Configuration { .. } => AppError::Configuration(err.to_string()),
            SolverError::ConvergenceFailed { .. } => AppError::Convergence(err.to_string()),
            SolverError::InvalidInput { .. } => AppError::InvalidInput(err.to_string()),
            SolverError::Component { .. } => AppError::Solver(err.to_string()),
        }
    }
}

impl From<fl_components::ComponentError> for AppError {
    fn from(err: fl_components::ComponentError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<fl_fluids::FluidError> for AppError {
    fn from(err: fl_fluids::FluidError) -> Self {
        AppError::Compile(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_solver::SolverError;

    #[test]
    fn solver_failures_keep_their_category() {
        let config = SolverError::Configuration {
            component: "REG".to_string(),
            position: 2,
            reason: "no compatible curve".to_string(),
        };
        assert!(matches!(AppError::from(config), AppError::Configuration(_)));

        let stalled = SolverError::ConvergenceFailed {
            iterations: 10,
            mass_flow_kgps: 0.1,
            rel_error: 0.2,
            reason: "iteration budget exhausted".to_string(),
        };
        assert!(matches!(AppError::from(stalled), AppError::Convergence(_)));

        let bad = SolverError::InvalidInput {
            what: "time step".to_string(),
        };
        assert!(matches!(AppError::from(bad), AppError::InvalidInput(_)));
    }
}

//! Error types for solver operations.

use fl_components::ComponentError;
use thiserror::Error;

/// Errors that can occur while propagating a chain or searching for a flow rate.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The chain cannot be evaluated as configured. Fatal to the run.
    #[error("Configuration error at '{component}' (position {position}): {reason}")]
    Configuration {
        component: String,
        position: usize,
        reason: String,
    },

    #[error(
        "Flow search did not converge after {iterations} iterations (last mass flow {mass_flow_kgps} kg/s, relative error {rel_error:.3e}): {reason}"
    )]
    ConvergenceFailed {
        iterations: usize,
        mass_flow_kgps: f64,
        rel_error: f64,
        reason: String,
    },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Component '{component}' (position {position}) failed: {source}")]
    Component {
        component: String,
        position: usize,
        #[source]
        source: ComponentError,
    },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Attach chain context to a component failure. Contract violations
    /// become configuration errors.
    pub fn at(component: &str, position: usize, err: ComponentError) -> Self {
        match err {
            ComponentError::NotSupported { .. } | ComponentError::NoCompatibleCurve { .. } => {
                SolverError::Configuration {
                    component: component.to_string(),
                    position,
                    reason: err.to_string(),
                }
            }
            source => SolverError::Component {
                component: component.to_string(),
                position,
                source,
            },
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, SolverError::Configuration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_curve_is_configuration() {
        let err = SolverError::at(
            "PR1",
            2,
            ComponentError::NoCompatibleCurve {
                component: "PR1".into(),
                mass_flow_kgps: 2.0,
                pressure_pa: 1e5,
            },
        );
        assert!(err.is_configuration());
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn physics_failure_keeps_source() {
        let err = SolverError::at("C1", 0, ComponentError::NonPhysical { what: "dp" });
        assert!(matches!(err, SolverError::Component { position: 0, .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}

//! Evaluation context and non-fatal model warnings.
//!
//! Out-of-range correlations and physically meaningless inputs never abort a
//! traversal. The component falls back to a defined value and records a
//! [`ModelWarning`] here; every warning is also emitted through `tracing`.

use core::fmt;
use fl_core::units::Time;

/// Non-fatal condition raised while evaluating a component.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelWarning {
    /// A correlation input fell outside its validated range; a fallback was used.
    OutOfRange {
        component: String,
        quantity: &'static str,
        value: f64,
        fallback: &'static str,
    },
    /// A correlation was invoked with a substance it does not model.
    PhysicalMisuse {
        component: String,
        what: &'static str,
    },
}

impl ModelWarning {
    pub fn component(&self) -> &str {
        match self {
            ModelWarning::OutOfRange { component, .. } => component,
            ModelWarning::PhysicalMisuse { component, .. } => component,
        }
    }
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelWarning::OutOfRange {
                component,
                quantity,
                value,
                fallback,
            } => write!(
                f,
                "{component}: {quantity} = {value:.4e} outside validated range, using {fallback}"
            ),
            ModelWarning::PhysicalMisuse { component, what } => {
                write!(f, "{component}: {what}")
            }
        }
    }
}

/// Ambient inputs and warning sink for one traversal.
#[derive(Debug, Clone)]
pub struct EvalContext {
    time_step: Time,
    warnings: Vec<ModelWarning>,
}

impl EvalContext {
    pub fn new(time_step: Time) -> Self {
        Self {
            time_step,
            warnings: Vec::new(),
        }
    }

    /// Explicit Euler step used by components with time-dependent state.
    pub fn time_step(&self) -> Time {
        self.time_step
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: ModelWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn out_of_range(
        &mut self,
        component: &str,
        quantity: &'static str,
        value: f64,
        fallback: &'static str,
    ) {
        self.warn(ModelWarning::OutOfRange {
            component: component.to_string(),
            quantity,
            value,
            fallback,
        });
    }

    pub fn misuse(&mut self, component: &str, what: &'static str) {
        self.warn(ModelWarning::PhysicalMisuse {
            component: component.to_string(),
            what,
        });
    }

    pub fn warnings(&self) -> &[ModelWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ModelWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_core::units::s;

    #[test]
    fn warnings_are_collected_in_order() {
        let mut ctx = EvalContext::new(s(0.1));
        ctx.out_of_range("C1", "Reynolds number", 1e5, "extrapolated Nikuradse fit");
        ctx.misuse("I1", "gas substance at injector");
        assert_eq!(ctx.warnings().len(), 2);
        assert_eq!(ctx.warnings()[0].component(), "C1");
        assert!(ctx.warnings()[1].to_string().contains("injector"));
        assert_eq!(ctx.time_step().value, 0.1);
    }
}

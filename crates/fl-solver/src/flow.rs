//! Flow-rate search.
//!
//! Given the terminal boundary (pressure, substance, temperature) and a known
//! source pressure, find the mass flow whose propagated source pressure
//! matches it. The search steps the trial mass flow toward the target and
//! halves the step every time it overshoots. Every trial starts from fresh
//! component state.

use std::time::{Duration, Instant};

use crate::chain::HydraulicChain;
use crate::error::{SolverError, SolverResult};
use crate::propagate::{PropagationOptions, PropagationOutcome, propagate};
use fl_core::numeric::relative_error;
use fl_core::units::{MassRate, Pressure, kgps};
use fl_fluids::Node;

#[derive(Debug, Clone)]
pub struct FlowSolverConfig {
    pub initial_mass_flow: MassRate,
    pub mass_flow_step: MassRate,
    /// Relative tolerance on the source pressure.
    pub rel_tol: f64,
    pub max_iterations: usize,
    /// Wall-clock budget; `None` leaves only the iteration bound.
    pub max_time: Option<Duration>,
    /// Lower clamp for trial mass flows.
    pub min_mass_flow: MassRate,
    pub propagation: PropagationOptions,
}

impl Default for FlowSolverConfig {
    fn default() -> Self {
        Self {
            initial_mass_flow: kgps(0.1),
            mass_flow_step: kgps(0.01),
            rel_tol: 0.05,
            max_iterations: 10_000,
            max_time: None,
            min_mass_flow: kgps(1e-4),
            propagation: PropagationOptions::default(),
        }
    }
}

impl FlowSolverConfig {
    fn validate(&self) -> SolverResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.initial_mass_flow.value) {
            return Err(invalid("initial mass flow must be positive"));
        }
        if !positive(self.mass_flow_step.value) {
            return Err(invalid("mass flow step must be positive"));
        }
        if !positive(self.rel_tol) {
            return Err(invalid("relative tolerance must be positive"));
        }
        if !positive(self.min_mass_flow.value) {
            return Err(invalid("minimum mass flow must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max iterations must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(what: &str) -> SolverError {
    SolverError::InvalidInput { what: what.into() }
}

/// One trial of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowProgress {
    pub iteration: usize,
    pub mass_flow: MassRate,
    pub source_pressure: Pressure,
    pub rel_error: f64,
    pub step: MassRate,
}

#[derive(Debug, Clone)]
pub struct FlowSolution {
    pub mass_flow: MassRate,
    pub source_pressure: Pressure,
    pub rel_error: f64,
    pub iterations: usize,
    /// Propagation at the converged mass flow.
    pub outcome: PropagationOutcome,
}

/// Search the boundary mass flow that yields `target` at the source.
///
/// The boundary's own mass flow is ignored; trials replace it.
pub fn solve_flow_rate(
    chain: &HydraulicChain,
    boundary: &Node,
    target: Pressure,
    config: &FlowSolverConfig,
) -> SolverResult<FlowSolution> {
    solve_flow_rate_with_progress(chain, boundary, target, config, |_| {})
}

pub fn solve_flow_rate_with_progress<F>(
    chain: &HydraulicChain,
    boundary: &Node,
    target: Pressure,
    config: &FlowSolverConfig,
    mut on_progress: F,
) -> SolverResult<FlowSolution>
where
    F: FnMut(FlowProgress),
{
    config.validate()?;
    if !target.value.is_finite() || target.value <= 0.0 {
        return Err(invalid("target source pressure must be positive"));
    }

    let started = Instant::now();
    let min_mdot = config.min_mass_flow.value;
    let mut mdot = config.initial_mass_flow.value.max(min_mdot);
    let mut step = config.mass_flow_step.value;
    let mut last_direction = 0.0_f64;
    let mut rel_error = f64::INFINITY;

    for iteration in 1..=config.max_iterations {
        if let Some(budget) = config.max_time {
            if started.elapsed() > budget {
                return Err(SolverError::ConvergenceFailed {
                    iterations: iteration - 1,
                    mass_flow_kgps: mdot,
                    rel_error,
                    reason: format!("time budget of {budget:?} exhausted"),
                });
            }
        }

        let trial = boundary
            .with_mass_flow(kgps(mdot))
            .map_err(|e| invalid(&format!("boundary node: {e}")))?;
        let outcome = propagate(chain, &trial, &config.propagation)?;
        let p = outcome.pressure();
        rel_error = relative_error(p.value, target.value);

        on_progress(FlowProgress {
            iteration,
            mass_flow: kgps(mdot),
            source_pressure: p,
            rel_error,
            step: kgps(step),
        });
        tracing::debug!(iteration, mdot, p_pa = p.value, rel_error, "flow trial");

        if rel_error <= config.rel_tol {
            tracing::info!(
                iterations = iteration,
                mdot,
                p_pa = p.value,
                rel_error,
                "flow search converged"
            );
            return Ok(FlowSolution {
                mass_flow: kgps(mdot),
                source_pressure: p,
                rel_error,
                iterations: iteration,
                outcome,
            });
        }

        // More flow costs more pressure.
        let direction = if p < target { 1.0 } else { -1.0 };
        if last_direction != 0.0 && direction != last_direction {
            step *= 0.5;
        }
        last_direction = direction;

        let next = (mdot + direction * step).max(min_mdot);
        if next == mdot && mdot == min_mdot {
            return Err(SolverError::ConvergenceFailed {
                iterations: iteration,
                mass_flow_kgps: mdot,
                rel_error,
                reason: "source pressure above target even at the minimum mass flow".into(),
            });
        }
        mdot = next;
    }

    Err(SolverError::ConvergenceFailed {
        iterations: config.max_iterations,
        mass_flow_kgps: mdot,
        rel_error,
        reason: "iteration budget exhausted".into(),
    })
}

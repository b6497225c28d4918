//! Chain propagator.
//!
//! Walks a chain from its terminal end toward the source, carrying a running
//! [`Node`]. Each component's [`Step`] decides how the node changes. A
//! [`Step::Source`] ends the walk; components upstream of it are never
//! visited.

use crate::chain::{ChainState, HydraulicChain};
use crate::error::{SolverError, SolverResult};
use fl_components::{EvalContext, ModelWarning, Step};
use fl_core::CompId;
use fl_core::units::{MassRate, Pressure, Time, s};
use fl_fluids::Node;

/// Default explicit Euler step for time-dependent component state (s).
pub const DEFAULT_TIME_STEP_S: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct PropagationOptions {
    /// Time step handed to components with time-dependent state.
    pub time_step: Time,
    /// Keep every intermediate node.
    pub record_trace: bool,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            time_step: s(DEFAULT_TIME_STEP_S),
            record_trace: false,
        }
    }
}

/// How a component changed the running node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Drop,
    Override,
    Replace,
    Source,
}

/// One visited component.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    pub id: CompId,
    pub name: String,
    pub kind: &'static str,
    pub step: StepKind,
    /// Pressure change across the component, inlet minus outlet.
    pub pressure_delta: Pressure,
    /// Node at the component inlet.
    pub node: Node,
}

/// Intermediate nodes of one propagation, terminal end first.
#[derive(Debug, Clone)]
pub struct PropagationTrace {
    pub boundary: Node,
    pub records: Vec<TraceRecord>,
}

impl PropagationTrace {
    /// Boundary pressure followed by the pressure after every visited component.
    pub fn pressures(&self) -> Vec<Pressure> {
        std::iter::once(self.boundary.pressure())
            .chain(self.records.iter().map(|r| r.node.pressure()))
            .collect()
    }
}

/// Source component reached by a propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub id: CompId,
    pub name: String,
    pub nominal_pressure: Option<Pressure>,
}

#[derive(Debug, Clone)]
pub struct PropagationOutcome {
    /// Running node at the source (or at the chain head if no source was met).
    pub node: Node,
    pub source: Option<SourceInfo>,
    pub warnings: Vec<ModelWarning>,
    /// Names of relief devices that latched during this run.
    pub triggered_reliefs: Vec<String>,
    pub trace: Option<PropagationTrace>,
    /// Component state at the end of the run.
    pub state: ChainState,
}

impl PropagationOutcome {
    /// Pressure required at the source.
    pub fn pressure(&self) -> Pressure {
        self.node.pressure()
    }

    /// Mass flow drawn from the source.
    pub fn mass_flow(&self) -> MassRate {
        self.node.mass_flow()
    }
}

/// Propagate `boundary` through `chain` with freshly initialised component state.
pub fn propagate(
    chain: &HydraulicChain,
    boundary: &Node,
    options: &PropagationOptions,
) -> SolverResult<PropagationOutcome> {
    propagate_with_state(chain, boundary, ChainState::fresh(chain), options)
}

/// Propagate starting from an explicit component state.
pub fn propagate_with_state(
    chain: &HydraulicChain,
    boundary: &Node,
    mut state: ChainState,
    options: &PropagationOptions,
) -> SolverResult<PropagationOutcome> {
    chain.validate()?;
    if state.len() != chain.len() {
        return Err(SolverError::InvalidInput {
            what: format!(
                "state has {} entries for a chain of {}",
                state.len(),
                chain.len()
            ),
        });
    }
    if !options.time_step.value.is_finite() || options.time_step.value <= 0.0 {
        return Err(SolverError::InvalidInput {
            what: "time step must be positive".into(),
        });
    }

    let mut ctx = EvalContext::new(options.time_step);
    let mut node = boundary.clone();
    let mut source = None;
    let mut records = Vec::new();
    let before: Vec<bool> = relief_flags(&state);

    for (position, component) in chain.iter().enumerate().rev() {
        let name = component.name();
        let id = CompId::from_position(position).map_err(|_| SolverError::InvalidInput {
            what: "chain too long".into(),
        })?;
        let comp_state = state.get_mut(id).ok_or_else(|| SolverError::InvalidInput {
            what: format!("no state for position {position}"),
        })?;

        let step = component
            .step(&node, comp_state, &mut ctx)
            .map_err(|e| SolverError::at(name, position, e))?;

        let p_out = node.pressure();
        let (kind, next) = match step {
            Step::Drop(dp) => (StepKind::Drop, node.with_added_pressure(dp)),
            Step::Override(p) => (StepKind::Override, node.with_pressure(p)),
            Step::Replace(n) => (StepKind::Replace, Ok(n)),
            Step::Source => {
                source = Some(SourceInfo {
                    id,
                    name: name.to_string(),
                    nominal_pressure: component.nominal_pressure(),
                });
                (StepKind::Source, Ok(node.clone()))
            }
        };
        node = next.map_err(|e| SolverError::at(name, position, e.into()))?;

        tracing::debug!(
            component = name,
            position,
            kind = component.kind(),
            dp_pa = (node.pressure() - p_out).value,
            p_pa = node.pressure().value,
            mdot = node.mass_flow().value,
            "propagated"
        );

        if options.record_trace {
            records.push(TraceRecord {
                id,
                name: name.to_string(),
                kind: component.kind(),
                step: kind,
                pressure_delta: node.pressure() - p_out,
                node: node.clone(),
            });
        }

        if kind == StepKind::Source {
            break;
        }
    }

    match &source {
        Some(src) => tracing::info!(
            source = %src.name,
            pressure_pa = node.pressure().value,
            mdot = node.mass_flow().value,
            "propagation reached source"
        ),
        None => tracing::info!(
            pressure_pa = node.pressure().value,
            mdot = node.mass_flow().value,
            "propagation reached chain head without a source"
        ),
    }

    let triggered_reliefs = relief_flags(&state)
        .into_iter()
        .zip(before)
        .enumerate()
        .filter(|(_, (now, was))| *now && !*was)
        .filter_map(|(i, _)| chain.get(i).map(|c| c.name().to_string()))
        .collect();

    Ok(PropagationOutcome {
        node,
        source,
        warnings: ctx.into_warnings(),
        triggered_reliefs,
        trace: options.record_trace.then(|| PropagationTrace {
            boundary: boundary.clone(),
            records,
        }),
        state,
    })
}

fn relief_flags(state: &ChainState) -> Vec<bool> {
    state
        .iter()
        .map(|(_, s)| s.as_relief().is_some_and(|r| r.triggered))
        .collect()
}

//! Valves and check valves.
//!
//! Liquid losses come from per-type minor-loss correlations, or from the
//! flow-factor relation when the valve is characterised only by its flow
//! coefficient. Gas losses always use the gas flow-factor relation with the
//! ideal-gas density at the local state.
//!
//! The open/closed flag is configuration: a valve on the chain is always
//! evaluated as flowing.

use crate::common::{EPSILON_MDOT, check_finite, check_positive, dynamic_pressure, mean_velocity};
use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::state::ComponentState;
use crate::traits::{ChainComponent, PressureDrop, Step};
use fl_core::units::constants::{PA_PER_BAR, R_AIR, RHO_WATER};
use fl_core::units::{Angle, Length, Pressure, deg, pa, to_bar, to_deg};
use fl_fluids::{Gas, Liquid, Node, Substance};

/// Constant of the gas flow-factor relation (L/min, bar, K).
const GAS_FLOW_FACTOR_CONSTANT: f64 = 8062.0;

/// Valve body type; selects the liquid loss correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveType {
    Ball,
    Butterfly,
    Gate,
    Globe,
    Solenoid,
    Needle,
    Generic,
}

/// How the valve is operated. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Actuation {
    #[default]
    Manual,
    Solenoid,
    Pneumatic,
}

/// Liquid flow-factor loss: ΔP = 1 bar · SG · (Q/Kf)², Q in m³/h.
pub fn flow_factor_liquid_drop(liquid: &Liquid, mdot: f64, flow_factor: f64) -> f64 {
    let rho = liquid.density().value;
    let sg = rho / RHO_WATER;
    let q_m3h = mdot / rho * 3600.0;
    PA_PER_BAR * sg * (q_m3h / flow_factor).powi(2)
}

/// Gas flow-factor loss: ΔP = 1 bar · SG · T · (Q/Kf)² / (8062² · P), Q in L/min, P in bar.
///
/// SG is the density ratio to air at the same state.
pub fn flow_factor_gas_drop(
    gas: &Gas,
    node: &Node,
    flow_factor: f64,
) -> ComponentResult<f64> {
    let rho = gas.density(node.pressure(), node.temperature())?.value;
    let sg = R_AIR / gas.gas_constant().value;
    let q_lpm = node.mass_flow().value / rho * 1000.0 * 60.0;
    let t = node.temperature().value;
    let p_bar = to_bar(node.pressure());
    Ok(PA_PER_BAR * sg * t * (q_lpm / flow_factor).powi(2)
        / (GAS_FLOW_FACTOR_CONSTANT.powi(2) * p_bar))
}

/// Normalise a configured flow coefficient: non-positive means "not supplied".
fn supplied(coefficient: f64) -> Option<f64> {
    (coefficient.is_finite() && coefficient > 0.0).then_some(coefficient)
}

fn flow_factor_or_unity(name: &str, coefficient: Option<f64>) -> f64 {
    coefficient.unwrap_or_else(|| {
        tracing::debug!(component = name, "no flow coefficient supplied, using 1.0");
        1.0
    })
}

/// Shutoff or control valve.
#[derive(Debug, Clone)]
pub struct Valve {
    name: String,
    valve_type: ValveType,
    actuation: Actuation,
    diameter: Length,
    flow_coefficient: Option<f64>,
    /// Closure angle for ball/butterfly bodies; 0 is fully open.
    closure_angle: Angle,
    /// Gate lift; `None` is fully open (lift = diameter).
    gate_lift: Option<Length>,
    open: bool,
}

impl Valve {
    /// Create an open, manually actuated valve.
    pub fn new(
        name: impl Into<String>,
        valve_type: ValveType,
        diameter: Length,
    ) -> ComponentResult<Self> {
        check_positive(diameter.value, "valve diameter must be positive")?;
        Ok(Self {
            name: name.into(),
            valve_type,
            actuation: Actuation::Manual,
            diameter,
            flow_coefficient: None,
            closure_angle: deg(0.0),
            gate_lift: None,
            open: true,
        })
    }

    pub fn with_actuation(mut self, actuation: Actuation) -> Self {
        self.actuation = actuation;
        self
    }

    /// Set the flow coefficient; a non-positive value means "not supplied".
    pub fn with_flow_coefficient(mut self, coefficient: f64) -> Self {
        self.flow_coefficient = supplied(coefficient);
        self
    }

    pub fn with_closure_angle(mut self, angle: Angle) -> ComponentResult<Self> {
        let a = to_deg(angle);
        if !a.is_finite() || !(0.0..90.0).contains(&a) {
            return Err(ComponentError::InvalidArg {
                what: "closure angle must be in [0, 90) degrees",
            });
        }
        self.closure_angle = angle;
        Ok(self)
    }

    pub fn with_gate_lift(mut self, lift: Length) -> ComponentResult<Self> {
        check_positive(lift.value, "gate lift must be positive")?;
        self.gate_lift = Some(lift);
        Ok(self)
    }

    pub fn valve_type(&self) -> ValveType {
        self.valve_type
    }

    pub fn actuation(&self) -> Actuation {
        self.actuation
    }

    pub fn diameter(&self) -> Length {
        self.diameter
    }

    pub fn flow_coefficient(&self) -> Option<f64> {
        self.flow_coefficient
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Minor-loss coefficient of the body, or `None` for flow-factor types.
    pub fn loss_coefficient(&self) -> Option<f64> {
        let d = self.diameter.value;
        let xi = match self.valve_type {
            ValveType::Ball => 0.0946 * (0.1106 * to_deg(self.closure_angle)).exp(),
            ValveType::Butterfly => 0.3166 * (0.0958 * to_deg(self.closure_angle)).exp(),
            ValveType::Gate => {
                let lift = self.gate_lift.map_or(d, |h| h.value.min(d));
                116.34 * (-7.98 * lift / d).exp()
            }
            ValveType::Globe => 1.0973 * d.powf(-0.5955),
            ValveType::Solenoid | ValveType::Needle | ValveType::Generic => return None,
        };
        Some(xi)
    }

    fn liquid_drop(&self, liquid: &Liquid, mdot: f64) -> f64 {
        match self.loss_coefficient() {
            Some(xi) => {
                let rho = liquid.density().value;
                xi * dynamic_pressure(rho, mean_velocity(mdot, rho, self.diameter.value))
            }
            None => flow_factor_liquid_drop(
                liquid,
                mdot,
                flow_factor_or_unity(&self.name, self.flow_coefficient),
            ),
        }
    }
}

impl PressureDrop for Valve {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        _ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        if !self.open {
            tracing::debug!(component = %self.name, "valve is configured closed; evaluated as flowing");
        }
        let mdot = node.mass_flow().value;
        if mdot < EPSILON_MDOT {
            return Ok(pa(0.0));
        }

        let dp = match node.substance() {
            Substance::Liquid(l) => self.liquid_drop(l, mdot),
            Substance::Gas(g) => flow_factor_gas_drop(
                g,
                node,
                flow_factor_or_unity(&self.name, self.flow_coefficient),
            )?,
        };
        check_finite(dp, "valve pressure drop")?;
        Ok(pa(dp))
    }
}

impl ChainComponent for Valve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Valve"
    }

    fn step(
        &self,
        node: &Node,
        state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        Ok(Step::Drop(self.pressure_drop(node, state, ctx)?))
    }
}

/// Non-return valve.
#[derive(Debug, Clone)]
pub struct CheckValve {
    name: String,
    actuation: Actuation,
    diameter: Length,
    flow_coefficient: Option<f64>,
    open: bool,
}

impl CheckValve {
    pub fn new(name: impl Into<String>, diameter: Length) -> ComponentResult<Self> {
        check_positive(diameter.value, "check valve diameter must be positive")?;
        Ok(Self {
            name: name.into(),
            actuation: Actuation::Manual,
            diameter,
            flow_coefficient: None,
            open: true,
        })
    }

    pub fn with_actuation(mut self, actuation: Actuation) -> Self {
        self.actuation = actuation;
        self
    }

    pub fn with_flow_coefficient(mut self, coefficient: f64) -> Self {
        self.flow_coefficient = supplied(coefficient);
        self
    }

    pub fn actuation(&self) -> Actuation {
        self.actuation
    }

    pub fn diameter(&self) -> Length {
        self.diameter
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Cubic fit of the loss coefficient in the bore diameter (m).
    pub fn loss_coefficient(&self) -> f64 {
        let d = self.diameter.value;
        1.07 + 5.16 * d - 6.71 * d * d + 4.93 * d * d * d
    }
}

impl PressureDrop for CheckValve {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        _ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        let mdot = node.mass_flow().value;
        if mdot < EPSILON_MDOT {
            return Ok(pa(0.0));
        }
        let dp = match node.substance() {
            Substance::Liquid(l) => {
                let rho = l.density().value;
                self.loss_coefficient()
                    * dynamic_pressure(rho, mean_velocity(mdot, rho, self.diameter.value))
            }
            Substance::Gas(g) => flow_factor_gas_drop(
                g,
                node,
                flow_factor_or_unity(&self.name, self.flow_coefficient),
            )?,
        };
        check_finite(dp, "check valve pressure drop")?;
        Ok(pa(dp))
    }
}

impl ChainComponent for CheckValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "CheckValve"
    }

    fn step(
        &self,
        node: &Node,
        state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        Ok(Step::Drop(self.pressure_drop(node, state, ctx)?))
    }
}

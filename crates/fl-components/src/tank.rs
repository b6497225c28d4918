//! Two-phase tank: liquid propellant pushed out by a pressurant gas.
//!
//! Traversed from the outlet, a tank converts the liquid-side node into the
//! gas-side node feeding it. One traversal advances the liquid-gas interface
//! by a single explicit Euler step of the context time step.

use std::f64::consts::PI;

use crate::common::{EPSILON_MDOT, check_finite, check_positive, dynamic_pressure, reynolds};
use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::friction::{FlowRegime, darcy_friction_factor};
use crate::state::{ComponentState, TankState};
use crate::traits::{ChainComponent, Step};
use fl_core::units::{Length, Pressure, Volume, kgps, m, pa};
use fl_fluids::{Gas, Liquid, Node, SubstanceRef};

/// Reynolds number above which the outlet contraction uses the turbulent coefficient.
const OUTLET_TURBULENT_RE: f64 = 1e4;

/// Tank inlet regimes on the pressurant side.
const INLET_TURBULENT_RE: f64 = 3.5e3;
const INLET_TRANSITION_RE: f64 = 500.0;
const INLET_LOW_RE: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Tank {
    name: String,
    initial_pressure: Pressure,
    volume: Volume,
    diameter: Length,
    inlet_diameter: Length,
    outlet_diameter: Length,
    pressurant: SubstanceRef,
    propellant: SubstanceRef,
    initial_interface: Length,
}

impl Tank {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        initial_pressure: Pressure,
        volume: Volume,
        diameter: Length,
        inlet_diameter: Length,
        outlet_diameter: Length,
        pressurant: SubstanceRef,
        propellant: SubstanceRef,
    ) -> ComponentResult<Self> {
        check_positive(initial_pressure.value, "tank pressure must be positive")?;
        check_positive(volume.value, "tank volume must be positive")?;
        check_positive(diameter.value, "tank diameter must be positive")?;
        check_positive(inlet_diameter.value, "tank inlet diameter must be positive")?;
        check_positive(outlet_diameter.value, "tank outlet diameter must be positive")?;
        if inlet_diameter > diameter || outlet_diameter > diameter {
            return Err(ComponentError::InvalidArg {
                what: "tank port diameters cannot exceed the tank diameter",
            });
        }
        if pressurant.as_gas().is_none() {
            return Err(ComponentError::InvalidArg {
                what: "tank pressurant must be a gas",
            });
        }
        if propellant.as_liquid().is_none() {
            return Err(ComponentError::InvalidArg {
                what: "tank propellant must be a liquid",
            });
        }
        Ok(Self {
            name: name.into(),
            initial_pressure,
            volume,
            diameter,
            inlet_diameter,
            outlet_diameter,
            pressurant,
            propellant,
            initial_interface: m(0.0),
        })
    }

    /// Start the interface away from the pressurant end.
    pub fn with_interface_position(mut self, position: Length) -> ComponentResult<Self> {
        if !position.value.is_finite() || position.value < 0.0 || position > self.length() {
            return Err(ComponentError::InvalidArg {
                what: "interface position must lie within the tank",
            });
        }
        self.initial_interface = position;
        Ok(self)
    }

    pub fn initial_pressure(&self) -> Pressure {
        self.initial_pressure
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn diameter(&self) -> Length {
        self.diameter
    }

    pub fn inlet_diameter(&self) -> Length {
        self.inlet_diameter
    }

    pub fn outlet_diameter(&self) -> Length {
        self.outlet_diameter
    }

    pub fn pressurant(&self) -> &SubstanceRef {
        &self.pressurant
    }

    pub fn propellant(&self) -> &SubstanceRef {
        &self.propellant
    }

    /// Internal length of the cylindrical tank, `4V / (πD²)`.
    pub fn length(&self) -> Length {
        m(4.0 * self.volume.value / (PI * self.diameter.value.powi(2)))
    }

    fn section_area(&self) -> f64 {
        PI * self.diameter.value.powi(2) / 4.0
    }

    fn gas(&self) -> ComponentResult<&Gas> {
        self.pressurant.as_gas().ok_or(ComponentError::InvalidArg {
            what: "tank pressurant must be a gas",
        })
    }

    fn liquid(&self) -> ComponentResult<&Liquid> {
        self.propellant.as_liquid().ok_or(ComponentError::InvalidArg {
            what: "tank propellant must be a liquid",
        })
    }

    pub fn initial_tank_state(&self) -> TankState {
        TankState {
            pressure: self.initial_pressure,
            interface_position: self.initial_interface,
            drained: self.initial_interface >= self.length(),
        }
    }

    /// Velocity at which the interface moves for an outlet mass flow `mdot`.
    pub fn emptying_speed(&self, mdot: f64) -> ComponentResult<f64> {
        let rho = self.liquid()?.density().value;
        Ok(4.0 * mdot / (PI * rho * self.diameter.value.powi(2)))
    }

    /// Pressure loss of the liquid leaving through the outlet, friction over
    /// the remaining liquid column included.
    fn outlet_loss(
        &self,
        mdot: f64,
        interface: f64,
        ctx: &mut EvalContext,
    ) -> ComponentResult<f64> {
        if mdot < EPSILON_MDOT {
            return Ok(0.0);
        }
        let liquid = self.liquid()?;
        let rho = liquid.density().value;
        let d = self.diameter.value;
        let v = mdot / (self.section_area() * rho);
        let re = reynolds(rho, v, d, liquid.viscosity().value);

        let xi = if re > OUTLET_TURBULENT_RE {
            0.5 * (1.0 - (self.outlet_diameter.value / d).powi(2))
        } else {
            6.8 * re.powf(-0.31)
        };
        let friction = darcy_friction_factor(re);
        if friction.regime == FlowRegime::BeyondRange {
            ctx.out_of_range(
                &self.name,
                "outlet Reynolds number",
                re,
                "extrapolated Nikuradse friction factor",
            );
        }
        let column = (self.length().value - interface).max(0.0);
        Ok((xi + friction.value * column / d) * dynamic_pressure(rho, v))
    }

    /// Minor-loss coefficient of the pressurant entering through the inlet.
    fn inlet_coefficient(&self, re: f64, ctx: &mut EvalContext) -> f64 {
        let ff = self.inlet_diameter.value / self.diameter.value;
        let a = (1.0 - ff).powi(2);
        let b = (1.0 - ff).powi(4);
        let xi = if re > INLET_TURBULENT_RE {
            a
        } else if re > INLET_TRANSITION_RE {
            let l = re.log10();
            -8.44556 - 26.163 * a - 5.3808 * b
                + l * (6.007 + 18.5372 * a + 3.9978 * b)
                + l * l * (-1.02318 - 3.091691 * a - 0.680943 * b)
        } else if re > INLET_LOW_RE {
            let inv = 1.0 / re.log10();
            3.62536 + 10.744 * a - 4.41041 * b
                + inv * (-18.13 - 56.77855 * a + 33.40344 * b)
                + inv.powi(2) * (30.8558 + 99.9542 * a - 62.78 * b)
                + inv.powi(3) * (-13.217 - 53.955 * a + 33.8053 * b)
        } else {
            ctx.out_of_range(&self.name, "inlet Reynolds number", re, "30/Re creeping-flow coefficient");
            30.0 / re
        };
        xi.max(0.0)
    }

    /// Advance the tank by one time step against the liquid-side node and
    /// return the gas-side node feeding it.
    pub fn advance(
        &self,
        state: &mut TankState,
        node: &Node,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Node> {
        if node.substance() != self.propellant.as_ref() {
            ctx.misuse(
                &self.name,
                "node substance differs from the tank propellant, propellant properties used",
            );
        }

        let p = node.pressure().value;
        let mdot = node.mass_flow().value;
        let t = node.temperature().value;
        let dt = ctx.time_step().value;

        let dp_out = self.outlet_loss(mdot, state.interface_position.value, ctx)?;
        check_finite(dp_out, "tank outlet loss")?;
        state.pressure = pa(p + dp_out);

        let length = self.length().value;
        let moved = state.interface_position.value + self.emptying_speed(mdot)? * dt;
        if moved >= length {
            if !state.drained {
                ctx.out_of_range(
                    &self.name,
                    "interface position",
                    moved,
                    "interface clamped at the tank outlet",
                );
            }
            state.drained = true;
            state.interface_position = m(length);
        } else {
            state.interface_position = m(moved);
        }

        let gas = self.gas()?;
        let r = gas.gas_constant().value;
        let rho_l = self.liquid()?.density().value;
        let p_tank = state.pressure.value;
        let mdot_in = mdot * p_tank / (r * t * rho_l);

        let dp_in = if mdot_in < EPSILON_MDOT {
            0.0
        } else {
            let rho_g = p_tank / (r * t);
            let w = mdot_in / (self.section_area() * rho_g);
            let re = reynolds(rho_g, w, self.diameter.value, gas.viscosity().value);
            self.inlet_coefficient(re, ctx) * dynamic_pressure(rho_g, w)
        };
        check_finite(dp_in, "tank inlet loss")?;

        tracing::debug!(
            component = %self.name,
            dp_out,
            dp_in,
            mdot_in,
            interface_m = state.interface_position.value,
            "tank advanced"
        );

        Ok(Node::new(
            pa(p + dp_out + dp_in),
            kgps(mdot_in),
            self.pressurant.clone(),
            node.temperature(),
        )?)
    }
}

impl ChainComponent for Tank {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Tank"
    }

    fn initial_state(&self) -> ComponentState {
        ComponentState::Tank(self.initial_tank_state())
    }

    fn step(
        &self,
        node: &Node,
        state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        let tank = state
            .as_tank_mut()
            .ok_or_else(|| ComponentError::StateMismatch {
                component: self.name.clone(),
            })?;
        Ok(Step::Replace(self.advance(tank, node, ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{air, ctx, gas_node, liquid_node, water};
    use fl_core::units::{m3, mm};

    fn rig_tank() -> Tank {
        Tank::new(
            "R2",
            pa(1e5),
            m3(5e-3),
            mm(160.0),
            mm(64.0),
            mm(64.0),
            air(),
            water(),
        )
        .unwrap()
    }

    #[test]
    fn length_from_volume() {
        let t = rig_tank();
        let expected = 4.0 * 5e-3 / (PI * 0.16 * 0.16);
        assert!((t.length().value - expected).abs() < 1e-12);
    }

    #[test]
    fn rejects_swapped_substances() {
        assert!(
            Tank::new("R", pa(1e5), m3(5e-3), mm(160.0), mm(64.0), mm(64.0), water(), air())
                .is_err()
        );
    }

    #[test]
    fn advance_switches_to_pressurant() {
        let tank = rig_tank();
        let mut state = tank.initial_tank_state();
        let mut ctx = ctx();
        let node = liquid_node(30e5, 0.9);
        let up = tank.advance(&mut state, &node, &mut ctx).unwrap();

        assert!(up.substance().as_gas().is_some());
        assert!(up.pressure() >= state.pressure);
        assert!(state.pressure >= node.pressure());
        // ideal-gas continuity between chambers
        let expected = 0.9 * state.pressure.value / (287.0 * 293.0 * 1000.0);
        assert!((up.mass_flow().value - expected).abs() < 1e-12);
        assert_eq!(up.temperature(), node.temperature());
    }

    #[test]
    fn interface_moves_by_drained_volume() {
        let tank = rig_tank();
        let mut state = tank.initial_tank_state();
        let mut ctx = ctx();
        let mdot = 0.5;
        tank.advance(&mut state, &liquid_node(20e5, mdot), &mut ctx)
            .unwrap();

        let area = PI * 0.16 * 0.16 / 4.0;
        let drained_volume = state.interface_position.value * area;
        let dt = ctx.time_step().value;
        assert!((drained_volume - mdot * dt / 1000.0).abs() < 1e-12);
        assert!(!state.drained);
    }

    #[test]
    fn drained_tank_clamps_and_warns_once() {
        let tank = rig_tank();
        let mut state = tank.initial_tank_state();
        state.interface_position = m(tank.length().value - 1e-4);
        let mut ctx = ctx();
        tank.advance(&mut state, &liquid_node(20e5, 0.9), &mut ctx)
            .unwrap();
        tank.advance(&mut state, &liquid_node(20e5, 0.9), &mut ctx)
            .unwrap();
        assert!(state.drained);
        assert_eq!(state.interface_position, tank.length());
        let clamps = ctx
            .warnings()
            .iter()
            .filter(|w| w.to_string().contains("interface position"))
            .count();
        assert_eq!(clamps, 1);
    }

    #[test]
    fn gas_node_is_misuse() {
        let tank = rig_tank();
        let mut state = tank.initial_tank_state();
        let mut ctx = ctx();
        tank.advance(&mut state, &gas_node(20e5, 0.01), &mut ctx)
            .unwrap();
        assert!(ctx.warnings().iter().any(|w| matches!(
            w,
            crate::diagnostics::ModelWarning::PhysicalMisuse { .. }
        )));
    }

    #[test]
    fn step_requires_tank_state() {
        let tank = rig_tank();
        let err = tank
            .step(&liquid_node(20e5, 0.5), &mut ComponentState::Stateless, &mut ctx())
            .unwrap_err();
        assert!(matches!(err, ComponentError::StateMismatch { .. }));
    }
}

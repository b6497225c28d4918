//! Straight tubes, bends and tees.
//!
//! Liquid losses use Darcy-Weisbach with the regime-dependent friction factor
//! plus a fitting coefficient. Gas-side friction in tubing is treated as
//! negligible against the liquid side and reported as exactly zero.

use crate::common::{EPSILON_MDOT, check_finite, check_positive};
use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::friction::{FlowRegime, duct_loss};
use crate::material::Material;
use crate::state::ComponentState;
use crate::traits::{ChainComponent, PressureDrop, Step};
use fl_core::units::{Angle, Length, Pressure, pa, to_deg};
use fl_fluids::{Node, Substance};

/// Relative roughness above which the smooth-pipe transitional fit is no longer representative.
pub const SMOOTH_WALL_REL_ROUGHNESS_MAX: f64 = 1e-3;

/// Default loss coefficient of the straight run through a tee.
pub const TEE_RUN_LOSS_COEFFICIENT: f64 = 0.4;

/// Shared geometry of all tubing elements.
#[derive(Debug, Clone)]
struct Bore {
    length: Length,
    diameter: Length,
    material: Material,
}

impl Bore {
    fn new(length: Length, diameter: Length, material: Material) -> ComponentResult<Self> {
        check_positive(diameter.value, "diameter must be positive")?;
        if length.value != 0.0 {
            check_positive(length.value, "length must be non-negative")?;
        }
        Ok(Self {
            length,
            diameter,
            material,
        })
    }

    fn relative_roughness(&self) -> f64 {
        self.material.roughness().value / self.diameter.value
    }

    /// Liquid loss through the bore plus `k_minor`; zero for gases.
    fn drop(
        &self,
        name: &str,
        node: &Node,
        k_minor: f64,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        let liquid = match node.substance() {
            Substance::Liquid(l) => l,
            Substance::Gas(_) => return Ok(pa(0.0)),
        };

        let mdot = node.mass_flow().value;
        if mdot < EPSILON_MDOT {
            return Ok(pa(0.0));
        }

        let loss = duct_loss(
            mdot,
            liquid.density().value,
            liquid.viscosity().value,
            self.diameter.value,
            self.length.value,
            k_minor,
        );
        check_finite(loss.dp, "pressure drop")?;

        if loss.friction.regime == FlowRegime::BeyondRange {
            ctx.out_of_range(
                name,
                "Reynolds number",
                loss.reynolds,
                "extrapolated Nikuradse friction factor",
            );
        }
        if loss.friction.regime != FlowRegime::Laminar
            && self.relative_roughness() > SMOOTH_WALL_REL_ROUGHNESS_MAX
        {
            ctx.out_of_range(
                name,
                "relative roughness",
                self.relative_roughness(),
                "smooth-wall friction factor",
            );
        }

        tracing::trace!(
            component = name,
            re = loss.reynolds,
            f = loss.friction.value,
            dp = loss.dp,
            "duct loss"
        );
        Ok(pa(loss.dp))
    }
}

/// Straight tube.
#[derive(Debug, Clone)]
pub struct Conduit {
    name: String,
    bore: Bore,
}

impl Conduit {
    pub fn new(
        name: impl Into<String>,
        length: Length,
        diameter: Length,
        material: Material,
    ) -> ComponentResult<Self> {
        Ok(Self {
            name: name.into(),
            bore: Bore::new(length, diameter, material)?,
        })
    }

    pub fn length(&self) -> Length {
        self.bore.length
    }

    pub fn diameter(&self) -> Length {
        self.bore.diameter
    }

    pub fn material(&self) -> &Material {
        &self.bore.material
    }
}

impl PressureDrop for Conduit {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        self.bore.drop(&self.name, node, 0.0, ctx)
    }
}

impl ChainComponent for Conduit {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Conduit"
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

/// Curved tube. The length is split evenly on both sides of the bend.
#[derive(Debug, Clone)]
pub struct Elbow {
    name: String,
    bore: Bore,
    angle: Angle,
    bend_radius: Length,
}

impl Elbow {
    pub fn new(
        name: impl Into<String>,
        length: Length,
        diameter: Length,
        material: Material,
        angle: Angle,
        bend_radius: Length,
    ) -> ComponentResult<Self> {
        let bore = Bore::new(length, diameter, material)?;
        let angle_deg = to_deg(angle);
        if !angle_deg.is_finite() || angle_deg <= 0.0 || angle_deg > 180.0 {
            return Err(ComponentError::InvalidArg {
                what: "bend angle must be in (0, 180] degrees",
            });
        }
        if !bend_radius.value.is_finite() || bend_radius.value < 0.5 * diameter.value {
            return Err(ComponentError::InvalidArg {
                what: "bend radius must be at least half the diameter",
            });
        }
        Ok(Self {
            name: name.into(),
            bore,
            angle,
            bend_radius,
        })
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn bend_radius(&self) -> Length {
        self.bend_radius
    }

    /// Weisbach bend coefficient, scaled linearly with the turning angle.
    pub fn bend_coefficient(&self) -> f64 {
        let d_over_r = self.bore.diameter.value / self.bend_radius.value;
        let k90 = 0.131 + 0.1632 * d_over_r.powf(3.5);
        k90 * to_deg(self.angle) / 90.0
    }
}

impl PressureDrop for Elbow {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        self.bore
            .drop(&self.name, node, self.bend_coefficient(), ctx)
    }
}

impl ChainComponent for Elbow {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Elbow"
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

/// Tee connector traversed along its straight run.
#[derive(Debug, Clone)]
pub struct Tee {
    name: String,
    bore: Bore,
    run_coefficient: f64,
}

impl Tee {
    pub fn new(
        name: impl Into<String>,
        length: Length,
        diameter: Length,
        material: Material,
    ) -> ComponentResult<Self> {
        Ok(Self {
            name: name.into(),
            bore: Bore::new(length, diameter, material)?,
            run_coefficient: TEE_RUN_LOSS_COEFFICIENT,
        })
    }

    /// Override the run loss coefficient.
    pub fn with_run_coefficient(mut self, k: f64) -> ComponentResult<Self> {
        if !k.is_finite() || k < 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "tee run coefficient must be non-negative",
            });
        }
        self.run_coefficient = k;
        Ok(self)
    }

    pub fn run_coefficient(&self) -> f64 {
        self.run_coefficient
    }
}

impl PressureDrop for Tee {
    fn pressure_drop(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        self.bore.drop(&self.name, node, self.run_coefficient, ctx)
    }
}

impl ChainComponent for Tee {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "Tee"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{aluminium, ctx, gas_node, liquid_node};
    use fl_core::units::{deg, m, mm};

    #[test]
    fn conduit_gas_drop_is_zero() {
        let c = Conduit::new("C1", mm(91.0), mm(16.0), aluminium()).unwrap();
        let mut ctx = ctx();
        let dp = c
            .pressure_drop(&gas_node(30e5, 0.05), &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        assert_eq!(dp.value, 0.0);
    }

    #[test]
    fn conduit_liquid_drop_matches_darcy() {
        // 0.1 kg/s water, 16 mm, 1 m: v = 0.497 m/s, Re ≈ 8940 -> Nikuradse
        let c = Conduit::new("C1", m(1.0), mm(16.0), aluminium()).unwrap();
        let mut ctx = ctx();
        let dp = c
            .pressure_drop(&liquid_node(1e5, 0.1), &mut ComponentState::Stateless, &mut ctx)
            .unwrap()
            .value;
        let v: f64 = 0.1 / (1000.0 * std::f64::consts::PI * 0.016 * 0.016 / 4.0);
        let re = 1000.0 * v * 0.016 / 8.9e-4;
        let expected = 0.3164 / re.powf(0.25) / 0.016 * 0.5 * 1000.0 * v * v;
        assert!((dp - expected).abs() < 1e-9 * expected.max(1.0));
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn conduit_high_reynolds_warns() {
        let c = Conduit::new("C8", mm(79.0), mm(6.0), aluminium()).unwrap();
        let mut ctx = ctx();
        let dp = c
            .pressure_drop(&liquid_node(1e5, 1.0), &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        assert!(dp.value > 0.0);
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].component(), "C8");
    }

    #[test]
    fn elbow_adds_bend_loss_over_straight_tube() {
        let straight = Conduit::new("C", mm(752.0), mm(10.0), aluminium()).unwrap();
        let bend = Elbow::new("B", mm(752.0), mm(10.0), aluminium(), deg(90.0), mm(479.0)).unwrap();
        let node = liquid_node(1e5, 0.2);
        let mut ctx = ctx();
        let a = straight
            .pressure_drop(&node, &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        let b = bend
            .pressure_drop(&node, &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        assert!(b.value > a.value);
        assert!((bend.bend_coefficient() - 0.131).abs() < 1e-3);
    }

    #[test]
    fn elbow_rejects_tight_radius() {
        assert!(Elbow::new("B", mm(40.0), mm(4.0), aluminium(), deg(90.0), mm(1.0)).is_err());
        assert!(Elbow::new("B", mm(40.0), mm(4.0), aluminium(), deg(0.0), mm(25.0)).is_err());
    }

    #[test]
    fn tee_run_coefficient() {
        let tee = Tee::new("T1", mm(30.0), mm(10.0), aluminium()).unwrap();
        assert_eq!(tee.run_coefficient(), TEE_RUN_LOSS_COEFFICIENT);
        assert!(tee.clone().with_run_coefficient(-1.0).is_err());
        let node = liquid_node(1e5, 0.2);
        let mut ctx = ctx();
        let dp = tee
            .pressure_drop(&node, &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        assert!(dp.value > 0.0);
    }

    #[test]
    fn rough_wall_warns_outside_laminar() {
        let rough = Material::new("Cast iron", mm(0.26)).unwrap();
        let c = Conduit::new("C", m(1.0), mm(16.0), rough).unwrap();
        let mut ctx = ctx();
        c.pressure_drop(&liquid_node(1e5, 0.1), &mut ComponentState::Stateless, &mut ctx)
            .unwrap();
        assert_eq!(ctx.warnings().len(), 1);
    }
}

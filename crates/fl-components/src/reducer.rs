//! Pressure reducer (regulator) driven by manufacturer performance curves.
//!
//! A reducer does not lose a pressure delta. Given the downstream state it
//! resolves the inlet pressure that would deliver that outlet pressure at the
//! current mass flow, by interpolating across the stored curves.

use crate::diagnostics::EvalContext;
use crate::error::{ComponentError, ComponentResult};
use crate::state::ComponentState;
use crate::traits::{ChainComponent, Step};
use fl_core::numeric::lerp;
use fl_core::units::{MassRate, Pressure, pa};
use fl_fluids::Node;

/// Output pressure of a reducer against mass flow, at one rated input pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureCurve {
    input_pressure: Pressure,
    mass_flow: Vec<MassRate>,
    output_pressure: Vec<Pressure>,
}

impl PressureCurve {
    pub fn new(
        input_pressure: Pressure,
        mass_flow: Vec<MassRate>,
        output_pressure: Vec<Pressure>,
    ) -> ComponentResult<Self> {
        if !input_pressure.value.is_finite() || input_pressure.value <= 0.0 {
            return Err(ComponentError::InvalidArg {
                what: "curve input pressure must be positive",
            });
        }
        if mass_flow.len() != output_pressure.len() {
            return Err(ComponentError::InvalidArg {
                what: "curve mass flow and output pressure lengths differ",
            });
        }
        if mass_flow.len() < 2 {
            return Err(ComponentError::InvalidArg {
                what: "curve needs at least two breakpoints",
            });
        }
        if mass_flow.iter().any(|m| !m.value.is_finite())
            || mass_flow.windows(2).any(|w| w[1].value <= w[0].value)
        {
            return Err(ComponentError::InvalidArg {
                what: "curve mass flow must be strictly increasing",
            });
        }
        if output_pressure
            .iter()
            .any(|p| !p.value.is_finite() || p.value <= 0.0)
        {
            return Err(ComponentError::InvalidArg {
                what: "curve output pressures must be positive",
            });
        }
        Ok(Self {
            input_pressure,
            mass_flow,
            output_pressure,
        })
    }

    pub fn input_pressure(&self) -> Pressure {
        self.input_pressure
    }

    pub fn mass_flow(&self) -> &[MassRate] {
        &self.mass_flow
    }

    pub fn output_pressure(&self) -> &[Pressure] {
        &self.output_pressure
    }

    /// Piecewise-linear output pressure at `mdot`, or `None` outside the curve's range.
    pub fn output_pressure_at(&self, mdot: MassRate) -> Option<Pressure> {
        let x = mdot.value;
        let seg = self
            .mass_flow
            .windows(2)
            .position(|w| w[0].value <= x && x <= w[1].value)?;
        let (x0, x1) = (self.mass_flow[seg].value, self.mass_flow[seg + 1].value);
        let (y0, y1) = (
            self.output_pressure[seg].value,
            self.output_pressure[seg + 1].value,
        );
        Some(pa(lerp(x, x0, y0, x1, y1)))
    }
}

#[derive(Debug, Clone)]
pub struct PressureReducer {
    name: String,
    curves: Vec<PressureCurve>,
}

impl PressureReducer {
    pub fn new(name: impl Into<String>, curves: Vec<PressureCurve>) -> ComponentResult<Self> {
        let mut reducer = Self {
            name: name.into(),
            curves: Vec::with_capacity(curves.len()),
        };
        for curve in curves {
            reducer.add_curve(curve)?;
        }
        Ok(reducer)
    }

    /// Add a curve; its rated input pressure must differ from every stored curve.
    pub fn add_curve(&mut self, curve: PressureCurve) -> ComponentResult<()> {
        if self
            .curves
            .iter()
            .any(|c| c.input_pressure == curve.input_pressure)
        {
            return Err(ComponentError::InvalidArg {
                what: "pressure curves must have distinct input pressures",
            });
        }
        self.curves.push(curve);
        Ok(())
    }

    pub fn curves(&self) -> &[PressureCurve] {
        &self.curves
    }

    /// Inlet pressure that delivers `node.pressure()` at `node.mass_flow()`.
    ///
    /// Curves whose mass-flow range does not cover the node are skipped. With a
    /// single usable curve the inlet pressure scales proportionally with the
    /// outlet pressure. With several, the inlet pressure is interpolated
    /// between the two curves whose outlet pressures bracket the node, or
    /// extrapolated from the nearest pair (with a warning) when none does.
    pub fn resolve_upstream_pressure(
        &self,
        node: &Node,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Pressure> {
        let mdot = node.mass_flow();
        let p = node.pressure().value;

        // (output at this mdot, rated input)
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(self.curves.len());
        for curve in &self.curves {
            match curve.output_pressure_at(mdot) {
                Some(out) => points.push((out.value, curve.input_pressure.value)),
                None => tracing::debug!(
                    component = %self.name,
                    input_pa = curve.input_pressure.value,
                    mdot = mdot.value,
                    "pressure curve does not cover mass flow, skipped"
                ),
            }
        }

        // Curves meeting at the same output: the lowest rated input wins.
        points.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        let mut kept: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for (out, rated) in points {
            match kept.last() {
                Some(&(prev_out, prev_rated)) if prev_out == out => tracing::debug!(
                    component = %self.name,
                    input_pa = rated,
                    kept_input_pa = prev_rated,
                    output_pa = out,
                    "pressure curve shares its output with a lower-input curve, discarded"
                ),
                _ => kept.push((out, rated)),
            }
        }
        let points = kept;

        let p_in = match points.len() {
            0 => {
                return Err(ComponentError::NoCompatibleCurve {
                    component: self.name.clone(),
                    mass_flow_kgps: mdot.value,
                    pressure_pa: p,
                });
            }
            1 => {
                let (p_out, p_rated) = points[0];
                tracing::debug!(component = %self.name, "single compatible curve, proportional inlet pressure");
                p_rated * p / p_out
            }
            _ => {
                let last = points.len() - 1;
                let seg = match points.windows(2).position(|w| w[0].0 <= p && p <= w[1].0) {
                    Some(seg) => seg,
                    None => {
                        ctx.out_of_range(
                            &self.name,
                            "outlet pressure",
                            p,
                            "extrapolation from the nearest pair of curves",
                        );
                        if p < points[0].0 { 0 } else { last - 1 }
                    }
                };
                let (lo, hi) = (points[seg], points[seg + 1]);
                lerp(p, lo.0, lo.1, hi.0, hi.1)
            }
        };

        if !p_in.is_finite() || p_in <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "resolved reducer inlet pressure",
            });
        }
        Ok(pa(p_in))
    }
}

impl ChainComponent for PressureReducer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "PressureReducer"
    }

    fn step(
        &self,
        node: &Node,
        _state: &mut ComponentState,
        ctx: &mut EvalContext,
    ) -> ComponentResult<Step> {
        Ok(Step::Override(self.resolve_upstream_pressure(node, ctx)?))
    }
}

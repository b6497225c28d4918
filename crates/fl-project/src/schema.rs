//! Project schema definitions.
//!
//! Components are listed in flow-path order, from the pressurant source to
//! the terminal element. Physical values carry their unit in the field name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub substances: Vec<SubstanceDef>,
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    pub boundary: BoundaryDef,
    #[serde(default)]
    pub solver: SolverDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubstanceDef {
    pub id: String,
    pub name: String,
    pub kind: SubstanceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SubstanceKind {
    Liquid {
        density_kg_m3: f64,
        viscosity_pa_s: f64,
    },
    Gas {
        gas_constant_j_per_kg_k: f64,
        viscosity_pa_s: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub id: String,
    pub name: String,
    pub roughness_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    /// Unique tag, matching the P&ID.
    pub id: String,
    pub kind: ComponentKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ComponentKind {
    Cylinder {
        pressure_pa: f64,
        volume_m3: f64,
    },
    Conduit {
        length_m: f64,
        diameter_m: f64,
        material: String,
    },
    Elbow {
        length_m: f64,
        diameter_m: f64,
        material: String,
        angle_deg: f64,
        bend_radius_m: f64,
    },
    Tee {
        length_m: f64,
        diameter_m: f64,
        material: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_loss_coefficient: Option<f64>,
    },
    Valve {
        valve_type: ValveTypeDef,
        #[serde(default)]
        actuation: ActuationDef,
        diameter_m: f64,
        /// Non-positive or absent means "not supplied".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_coefficient: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        closure_angle_deg: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gate_lift_m: Option<f64>,
        #[serde(default = "default_open")]
        open: bool,
    },
    CheckValve {
        #[serde(default)]
        actuation: ActuationDef,
        diameter_m: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_coefficient: Option<f64>,
        #[serde(default = "default_open")]
        open: bool,
    },
    PressureReducer {
        curves: Vec<PressureCurveDef>,
    },
    BurstDisk {
        burst_pressure_pa: f64,
    },
    Tank {
        pressure_pa: f64,
        volume_m3: f64,
        diameter_m: f64,
        inlet_diameter_m: f64,
        outlet_diameter_m: f64,
        /// Gas substance id.
        pressurant: String,
        /// Liquid substance id.
        propellant: String,
        #[serde(default)]
        interface_position_m: f64,
    },
    Injector {
        /// Linear coefficient of `mdot = a · ΔP[bar]^n`.
        a: f64,
        /// Exponent of the same fit.
        n: f64,
    },
    Filter {
        diameter_m: f64,
        loss_coefficient: f64,
    },
}

impl ComponentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentKind::Cylinder { .. } => "Cylinder",
            ComponentKind::Conduit { .. } => "Conduit",
            ComponentKind::Elbow { .. } => "Elbow",
            ComponentKind::Tee { .. } => "Tee",
            ComponentKind::Valve { .. } => "Valve",
            ComponentKind::CheckValve { .. } => "CheckValve",
            ComponentKind::PressureReducer { .. } => "PressureReducer",
            ComponentKind::BurstDisk { .. } => "BurstDisk",
            ComponentKind::Tank { .. } => "Tank",
            ComponentKind::Injector { .. } => "Injector",
            ComponentKind::Filter { .. } => "Filter",
        }
    }
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValveTypeDef {
    Ball,
    Butterfly,
    Gate,
    Globe,
    Solenoid,
    Needle,
    Generic,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ActuationDef {
    #[default]
    Manual,
    Solenoid,
    Pneumatic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PressureCurveDef {
    pub input_pressure_pa: f64,
    pub mass_flow_kgps: Vec<f64>,
    pub output_pressure_pa: Vec<f64>,
}

/// Terminal boundary: the state just downstream of the last component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryDef {
    pub pressure_pa: f64,
    pub mass_flow_kgps: f64,
    pub substance: String,
    pub temperature_k: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default = "default_time_step_s")]
    pub time_step_s: f64,
    /// Known source pressure for flow-rate searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_source_pressure_pa: Option<f64>,
    #[serde(default = "default_initial_mass_flow_kgps")]
    pub initial_mass_flow_kgps: f64,
    #[serde(default = "default_mass_flow_step_kgps")]
    pub mass_flow_step_kgps: f64,
    #[serde(default = "default_rel_tol")]
    pub rel_tol: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time_s: Option<f64>,
    #[serde(default = "default_min_mass_flow_kgps")]
    pub min_mass_flow_kgps: f64,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            time_step_s: default_time_step_s(),
            target_source_pressure_pa: None,
            initial_mass_flow_kgps: default_initial_mass_flow_kgps(),
            mass_flow_step_kgps: default_mass_flow_step_kgps(),
            rel_tol: default_rel_tol(),
            max_iterations: default_max_iterations(),
            max_time_s: None,
            min_mass_flow_kgps: default_min_mass_flow_kgps(),
        }
    }
}

fn default_time_step_s() -> f64 {
    0.1
}

fn default_initial_mass_flow_kgps() -> f64 {
    0.1
}

fn default_mass_flow_step_kgps() -> f64 {
    0.01
}

fn default_rel_tol() -> f64 {
    0.05
}

fn default_max_iterations() -> usize {
    10_000
}

fn default_min_mass_flow_kgps() -> f64 {
    1e-4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_kind_is_tagged() {
        let yaml = r#"
id: MV4
kind:
  type: Valve
  valve_type: Ball
  diameter_m: 0.004
  flow_coefficient: -1.0
"#;
        let def: ComponentDef = serde_yaml::from_str(yaml).unwrap();
        match def.kind {
            ComponentKind::Valve {
                valve_type,
                actuation,
                open,
                flow_coefficient,
                ..
            } => {
                assert_eq!(valve_type, ValveTypeDef::Ball);
                assert_eq!(actuation, ActuationDef::Manual);
                assert!(open);
                assert_eq!(flow_coefficient, Some(-1.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_component_type_is_rejected() {
        let yaml = r#"
id: X1
kind:
  type: HeatExchanger
  area_m2: 1.0
"#;
        assert!(serde_yaml::from_str::<ComponentDef>(yaml).is_err());
    }

    #[test]
    fn solver_defaults() {
        let solver: SolverDef = serde_yaml::from_str("target_source_pressure_pa: 1.0e7").unwrap();
        assert_eq!(solver.rel_tol, 0.05);
        assert_eq!(solver.max_iterations, 10_000);
        assert_eq!(solver.target_source_pressure_pa, Some(1.0e7));
        assert_eq!(solver.max_time_s, None);
    }
}

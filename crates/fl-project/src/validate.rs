//! Project validation logic.

use crate::schema::{
    BoundaryDef, ComponentDef, ComponentKind, MaterialDef, PressureCurveDef, Project, SolverDef,
    SubstanceDef, SubstanceKind,
};
use std::collections::{HashMap, HashSet};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Liquid,
    Gas,
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    let mut substances = HashMap::new();
    for substance in &project.substances {
        if substances.contains_key(substance.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: substance.id.clone(),
                context: "substances".to_string(),
            });
        }
        substances.insert(substance.id.as_str(), validate_substance(substance)?);
    }

    let mut materials = HashSet::new();
    for material in &project.materials {
        if !materials.insert(material.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: material.id.clone(),
                context: "materials".to_string(),
            });
        }
        validate_material(material)?;
    }

    if project.components.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "components".to_string(),
            value: "[]".to_string(),
            reason: "a chain needs at least one component".to_string(),
        });
    }

    let mut component_ids = HashSet::new();
    for (position, component) in project.components.iter().enumerate() {
        if !component_ids.insert(component.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: component.id.clone(),
                context: "components".to_string(),
            });
        }
        if matches!(component.kind, ComponentKind::Cylinder { .. }) && position != 0 {
            return Err(ValidationError::Unsupported {
                feature: format!("Cylinder '{}' at position {position}", component.id),
                reason: "a source must be the first component; nothing upstream of it is reached"
                    .to_string(),
            });
        }
        validate_component(component, &substances, &materials)?;
    }

    validate_boundary(&project.boundary, &substances)?;
    validate_solver(&project.solver)?;
    Ok(())
}

fn validate_substance(substance: &SubstanceDef) -> Result<Phase, ValidationError> {
    let ctx = format!("substance '{}'", substance.id);
    match &substance.kind {
        SubstanceKind::Liquid {
            density_kg_m3,
            viscosity_pa_s,
        } => {
            positive(&ctx, "density_kg_m3", *density_kg_m3)?;
            positive(&ctx, "viscosity_pa_s", *viscosity_pa_s)?;
            Ok(Phase::Liquid)
        }
        SubstanceKind::Gas {
            gas_constant_j_per_kg_k,
            viscosity_pa_s,
        } => {
            positive(&ctx, "gas_constant_j_per_kg_k", *gas_constant_j_per_kg_k)?;
            positive(&ctx, "viscosity_pa_s", *viscosity_pa_s)?;
            Ok(Phase::Gas)
        }
    }
}

fn validate_material(material: &MaterialDef) -> Result<(), ValidationError> {
    let ctx = format!("material '{}'", material.id);
    non_negative(&ctx, "roughness_m", material.roughness_m)
}

fn validate_component(
    component: &ComponentDef,
    substances: &HashMap<&str, Phase>,
    materials: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let ctx = format!("component '{}'", component.id);
    let material_ref = |id: &str| -> Result<(), ValidationError> {
        if materials.contains(id) {
            Ok(())
        } else {
            Err(ValidationError::MissingReference {
                id: id.to_string(),
                context: format!("{ctx} material"),
            })
        }
    };

    match &component.kind {
        ComponentKind::Cylinder {
            pressure_pa,
            volume_m3,
        } => {
            positive(&ctx, "pressure_pa", *pressure_pa)?;
            positive(&ctx, "volume_m3", *volume_m3)?;
        }
        ComponentKind::Conduit {
            length_m,
            diameter_m,
            material,
        } => {
            non_negative(&ctx, "length_m", *length_m)?;
            positive(&ctx, "diameter_m", *diameter_m)?;
            material_ref(material)?;
        }
        ComponentKind::Elbow {
            length_m,
            diameter_m,
            material,
            angle_deg,
            bend_radius_m,
        } => {
            non_negative(&ctx, "length_m", *length_m)?;
            positive(&ctx, "diameter_m", *diameter_m)?;
            positive(&ctx, "angle_deg", *angle_deg)?;
            if *angle_deg > 180.0 {
                return Err(invalid(&ctx, "angle_deg", *angle_deg, "must not exceed 180"));
            }
            if !bend_radius_m.is_finite() || *bend_radius_m < 0.5 * diameter_m {
                return Err(invalid(
                    &ctx,
                    "bend_radius_m",
                    *bend_radius_m,
                    "must be at least half the diameter",
                ));
            }
            material_ref(material)?;
        }
        ComponentKind::Tee {
            length_m,
            diameter_m,
            material,
            run_loss_coefficient,
        } => {
            non_negative(&ctx, "length_m", *length_m)?;
            positive(&ctx, "diameter_m", *diameter_m)?;
            if let Some(k) = run_loss_coefficient {
                non_negative(&ctx, "run_loss_coefficient", *k)?;
            }
            material_ref(material)?;
        }
        ComponentKind::Valve {
            diameter_m,
            closure_angle_deg,
            gate_lift_m,
            ..
        } => {
            positive(&ctx, "diameter_m", *diameter_m)?;
            if let Some(a) = closure_angle_deg {
                if !a.is_finite() || !(0.0..90.0).contains(a) {
                    return Err(invalid(&ctx, "closure_angle_deg", *a, "must be in [0, 90)"));
                }
            }
            if let Some(h) = gate_lift_m {
                positive(&ctx, "gate_lift_m", *h)?;
            }
        }
        ComponentKind::CheckValve { diameter_m, .. } => {
            positive(&ctx, "diameter_m", *diameter_m)?;
        }
        ComponentKind::PressureReducer { curves } => {
            if curves.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: format!("{ctx}.curves"),
                    value: "[]".to_string(),
                    reason: "at least one curve is required".to_string(),
                });
            }
            let mut inputs: Vec<f64> = Vec::with_capacity(curves.len());
            for curve in curves {
                validate_curve(&ctx, curve)?;
                if inputs.contains(&curve.input_pressure_pa) {
                    return Err(invalid(
                        &ctx,
                        "input_pressure_pa",
                        curve.input_pressure_pa,
                        "curves must have distinct input pressures",
                    ));
                }
                inputs.push(curve.input_pressure_pa);
            }
        }
        ComponentKind::BurstDisk { burst_pressure_pa } => {
            positive(&ctx, "burst_pressure_pa", *burst_pressure_pa)?;
        }
        ComponentKind::Tank {
            pressure_pa,
            volume_m3,
            diameter_m,
            inlet_diameter_m,
            outlet_diameter_m,
            pressurant,
            propellant,
            interface_position_m,
        } => {
            positive(&ctx, "pressure_pa", *pressure_pa)?;
            positive(&ctx, "volume_m3", *volume_m3)?;
            positive(&ctx, "diameter_m", *diameter_m)?;
            positive(&ctx, "inlet_diameter_m", *inlet_diameter_m)?;
            positive(&ctx, "outlet_diameter_m", *outlet_diameter_m)?;
            non_negative(&ctx, "interface_position_m", *interface_position_m)?;
            for (field, value) in [
                ("inlet_diameter_m", *inlet_diameter_m),
                ("outlet_diameter_m", *outlet_diameter_m),
            ] {
                if value > *diameter_m {
                    return Err(invalid(&ctx, field, value, "exceeds the tank diameter"));
                }
            }
            expect_phase(&ctx, "pressurant", pressurant, Phase::Gas, substances)?;
            expect_phase(&ctx, "propellant", propellant, Phase::Liquid, substances)?;
        }
        ComponentKind::Injector { a, n } => {
            positive(&ctx, "a", *a)?;
            positive(&ctx, "n", *n)?;
        }
        ComponentKind::Filter {
            diameter_m,
            loss_coefficient,
        } => {
            positive(&ctx, "diameter_m", *diameter_m)?;
            non_negative(&ctx, "loss_coefficient", *loss_coefficient)?;
        }
    }
    Ok(())
}

fn validate_curve(ctx: &str, curve: &PressureCurveDef) -> Result<(), ValidationError> {
    positive(ctx, "input_pressure_pa", curve.input_pressure_pa)?;
    if curve.mass_flow_kgps.len() != curve.output_pressure_pa.len() {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx}.curves"),
            value: format!(
                "{} mass flows, {} pressures",
                curve.mass_flow_kgps.len(),
                curve.output_pressure_pa.len()
            ),
            reason: "breakpoint arrays must have equal length".to_string(),
        });
    }
    if curve.mass_flow_kgps.len() < 2 {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx}.curves"),
            value: curve.mass_flow_kgps.len().to_string(),
            reason: "at least two breakpoints are required".to_string(),
        });
    }
    if curve
        .mass_flow_kgps
        .windows(2)
        .any(|w| !(w[1] > w[0]) || !w[0].is_finite() || !w[1].is_finite())
    {
        return Err(ValidationError::InvalidValue {
            field: format!("{ctx}.curves.mass_flow_kgps"),
            value: format!("{:?}", curve.mass_flow_kgps),
            reason: "must be strictly increasing".to_string(),
        });
    }
    for p in &curve.output_pressure_pa {
        positive(ctx, "output_pressure_pa", *p)?;
    }
    Ok(())
}

fn validate_boundary(
    boundary: &BoundaryDef,
    substances: &HashMap<&str, Phase>,
) -> Result<(), ValidationError> {
    let ctx = "boundary";
    positive(ctx, "pressure_pa", boundary.pressure_pa)?;
    non_negative(ctx, "mass_flow_kgps", boundary.mass_flow_kgps)?;
    positive(ctx, "temperature_k", boundary.temperature_k)?;
    if !substances.contains_key(boundary.substance.as_str()) {
        return Err(ValidationError::MissingReference {
            id: boundary.substance.clone(),
            context: "boundary substance".to_string(),
        });
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    let ctx = "solver";
    positive(ctx, "time_step_s", solver.time_step_s)?;
    positive(ctx, "initial_mass_flow_kgps", solver.initial_mass_flow_kgps)?;
    positive(ctx, "mass_flow_step_kgps", solver.mass_flow_step_kgps)?;
    positive(ctx, "rel_tol", solver.rel_tol)?;
    positive(ctx, "min_mass_flow_kgps", solver.min_mass_flow_kgps)?;
    if solver.max_iterations == 0 {
        return Err(invalid(ctx, "max_iterations", 0.0, "must be at least 1"));
    }
    if let Some(p) = solver.target_source_pressure_pa {
        positive(ctx, "target_source_pressure_pa", p)?;
    }
    if let Some(t) = solver.max_time_s {
        positive(ctx, "max_time_s", t)?;
    }
    Ok(())
}

fn expect_phase(
    ctx: &str,
    role: &str,
    id: &str,
    phase: Phase,
    substances: &HashMap<&str, Phase>,
) -> Result<(), ValidationError> {
    match substances.get(id) {
        None => Err(ValidationError::MissingReference {
            id: id.to_string(),
            context: format!("{ctx} {role}"),
        }),
        Some(p) if *p != phase => Err(ValidationError::InvalidValue {
            field: format!("{ctx}.{role}"),
            value: id.to_string(),
            reason: match phase {
                Phase::Gas => "must reference a gas".to_string(),
                Phase::Liquid => "must reference a liquid".to_string(),
            },
        }),
        Some(_) => Ok(()),
    }
}

fn invalid(ctx: &str, field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: format!("{ctx}.{field}"),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(ctx: &str, field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(ctx, field, value, "must be positive and finite"))
    }
}

fn non_negative(ctx: &str, field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(ctx, field, value, "must be non-negative and finite"))
    }
}

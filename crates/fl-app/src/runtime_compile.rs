//! Runtime compilation of a project definition into an executable chain.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fl_components::{
    Actuation, BurstDisk, ChainComponent, CheckValve, Conduit, Cylinder, Elbow, Filter, Injector,
    Material, PressureCurve, PressureReducer, Tank, Tee, Valve, ValveType,
};
use fl_core::units::{Pressure, deg, jpkgk, k, kgpm3, kgps, m, m3, pa, pas, s};
use fl_fluids::{Gas, Liquid, Node, Substance, SubstanceRef};
use fl_project::schema::{
    ActuationDef, BoundaryDef, ComponentDef, ComponentKind, PressureCurveDef, Project, SolverDef,
    SubstanceKind, ValveTypeDef,
};
use fl_solver::{FlowSolverConfig, HydraulicChain, PropagationOptions};

use crate::error::{AppError, AppResult};

/// Runtime representation of a compiled project.
#[derive(Debug)]
pub struct ChainRuntime {
    pub chain: HydraulicChain,
    /// Terminal boundary node the propagation starts from.
    pub boundary: Node,
    pub substances: HashMap<String, SubstanceRef>,
    pub propagation: PropagationOptions,
    pub flow: FlowSolverConfig,
    /// Source pressure the flow search aims for, if the project names one.
    pub target_source_pressure: Option<Pressure>,
}

/// Compile a project into runtime structures.
pub fn compile_project(project: &Project) -> AppResult<ChainRuntime> {
    let substances = build_substances(project)?;
    let materials = build_materials(project)?;

    let mut chain = HydraulicChain::new();
    for component in &project.components {
        chain.push(build_component(component, &substances, &materials)?);
    }
    chain.validate()?;

    let boundary = build_boundary(&project.boundary, &substances)?;
    let (propagation, flow) = build_solver_options(&project.solver)?;
    let target_source_pressure = project.solver.target_source_pressure_pa.map(pa);

    tracing::debug!(
        project = %project.name,
        components = chain.len(),
        substances = substances.len(),
        "compiled project"
    );

    Ok(ChainRuntime {
        chain,
        boundary,
        substances,
        propagation,
        flow,
        target_source_pressure,
    })
}

/// Build the substance table keyed by definition id.
pub fn build_substances(project: &Project) -> AppResult<HashMap<String, SubstanceRef>> {
    let mut substances = HashMap::with_capacity(project.substances.len());
    for def in &project.substances {
        let substance = match &def.kind {
            SubstanceKind::Liquid {
                density_kg_m3,
                viscosity_pa_s,
            } => Substance::Liquid(Liquid::new(
                &def.name,
                kgpm3(*density_kg_m3),
                pas(*viscosity_pa_s),
            )?),
            SubstanceKind::Gas {
                gas_constant_j_per_kg_k,
                viscosity_pa_s,
            } => Substance::Gas(Gas::new(
                &def.name,
                jpkgk(*gas_constant_j_per_kg_k),
                pas(*viscosity_pa_s),
            )?),
        };
        substances.insert(def.id.clone(), Arc::new(substance));
    }
    Ok(substances)
}

fn build_materials(project: &Project) -> AppResult<HashMap<String, Material>> {
    let mut materials = HashMap::with_capacity(project.materials.len());
    for def in &project.materials {
        materials.insert(def.id.clone(), Material::new(&def.name, m(def.roughness_m))?);
    }
    Ok(materials)
}

/// Build one chain component from its definition.
pub fn build_component(
    component: &ComponentDef,
    substances: &HashMap<String, SubstanceRef>,
    materials: &HashMap<String, Material>,
) -> AppResult<Box<dyn ChainComponent>> {
    let name = component.id.as_str();
    let boxed: Box<dyn ChainComponent> = match &component.kind {
        ComponentKind::Cylinder {
            pressure_pa,
            volume_m3,
        } => Box::new(Cylinder::new(name, pa(*pressure_pa), m3(*volume_m3))?),
        ComponentKind::Conduit {
            length_m,
            diameter_m,
            material,
        } => Box::new(Conduit::new(
            name,
            m(*length_m),
            m(*diameter_m),
            lookup_material(materials, material)?,
        )?),
        ComponentKind::Elbow {
            length_m,
            diameter_m,
            material,
            angle_deg,
            bend_radius_m,
        } => Box::new(Elbow::new(
            name,
            m(*length_m),
            m(*diameter_m),
            lookup_material(materials, material)?,
            deg(*angle_deg),
            m(*bend_radius_m),
        )?),
        ComponentKind::Tee {
            length_m,
            diameter_m,
            material,
            run_loss_coefficient,
        } => {
            let tee = Tee::new(
                name,
                m(*length_m),
                m(*diameter_m),
                lookup_material(materials, material)?,
            )?;
            match run_loss_coefficient {
                Some(k) => Box::new(tee.with_run_coefficient(*k)?),
                None => Box::new(tee),
            }
        }
        ComponentKind::Valve {
            valve_type,
            actuation,
            diameter_m,
            flow_coefficient,
            closure_angle_deg,
            gate_lift_m,
            open,
        } => {
            let mut valve = Valve::new(name, valve_type_from_def(*valve_type), m(*diameter_m))?
                .with_actuation(actuation_from_def(*actuation));
            if let Some(cv) = flow_coefficient {
                valve = valve.with_flow_coefficient(*cv);
            }
            if let Some(angle) = closure_angle_deg {
                valve = valve.with_closure_angle(deg(*angle))?;
            }
            if let Some(lift) = gate_lift_m {
                valve = valve.with_gate_lift(m(*lift))?;
            }
            valve.set_open(*open);
            Box::new(valve)
        }
        ComponentKind::CheckValve {
            actuation,
            diameter_m,
            flow_coefficient,
            open,
        } => {
            let mut valve =
                CheckValve::new(name, m(*diameter_m))?.with_actuation(actuation_from_def(*actuation));
            if let Some(cv) = flow_coefficient {
                valve = valve.with_flow_coefficient(*cv);
            }
            valve.set_open(*open);
            Box::new(valve)
        }
        ComponentKind::PressureReducer { curves } => {
            let curves = curves
                .iter()
                .map(build_curve)
                .collect::<AppResult<Vec<_>>>()?;
            Box::new(PressureReducer::new(name, curves)?)
        }
        ComponentKind::BurstDisk { burst_pressure_pa } => {
            Box::new(BurstDisk::new(name, pa(*burst_pressure_pa))?)
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
        } => Box::new(
            Tank::new(
                name,
                pa(*pressure_pa),
                m3(*volume_m3),
                m(*diameter_m),
                m(*inlet_diameter_m),
                m(*outlet_diameter_m),
                lookup_substance(substances, pressurant)?,
                lookup_substance(substances, propellant)?,
            )?
            .with_interface_position(m(*interface_position_m))?,
        ),
        ComponentKind::Injector { a, n } => Box::new(Injector::new(name, *a, *n)?),
        ComponentKind::Filter {
            diameter_m,
            loss_coefficient,
        } => Box::new(Filter::new(name, m(*diameter_m), *loss_coefficient)?),
    };
    Ok(boxed)
}

fn build_curve(def: &PressureCurveDef) -> AppResult<PressureCurve> {
    Ok(PressureCurve::new(
        pa(def.input_pressure_pa),
        def.mass_flow_kgps.iter().copied().map(kgps).collect(),
        def.output_pressure_pa.iter().copied().map(pa).collect(),
    )?)
}

/// Build the terminal boundary node.
pub fn build_boundary(
    boundary: &BoundaryDef,
    substances: &HashMap<String, SubstanceRef>,
) -> AppResult<Node> {
    let substance = lookup_substance(substances, &boundary.substance)?;
    Ok(Node::new(
        pa(boundary.pressure_pa),
        kgps(boundary.mass_flow_kgps),
        substance,
        k(boundary.temperature_k),
    )?)
}

fn build_solver_options(solver: &SolverDef) -> AppResult<(PropagationOptions, FlowSolverConfig)> {
    let propagation = PropagationOptions {
        time_step: s(solver.time_step_s),
        ..PropagationOptions::default()
    };
    let max_time = solver
        .max_time_s
        .map(|t| {
            Duration::try_from_secs_f64(t)
                .map_err(|_| AppError::InvalidInput(format!("invalid solver max_time_s: {t}")))
        })
        .transpose()?;
    let flow = FlowSolverConfig {
        initial_mass_flow: kgps(solver.initial_mass_flow_kgps),
        mass_flow_step: kgps(solver.mass_flow_step_kgps),
        rel_tol: solver.rel_tol,
        max_iterations: solver.max_iterations,
        max_time,
        min_mass_flow: kgps(solver.min_mass_flow_kgps),
        propagation: propagation.clone(),
    };
    Ok((propagation, flow))
}

fn lookup_substance(
    substances: &HashMap<String, SubstanceRef>,
    id: &str,
) -> AppResult<SubstanceRef> {
    substances
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::Compile(format!("Substance not found: {id}")))
}

fn lookup_material(materials: &HashMap<String, Material>, id: &str) -> AppResult<Material> {
    materials
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::Compile(format!("Material not found: {id}")))
}

fn valve_type_from_def(def: ValveTypeDef) -> ValveType {
    match def {
        ValveTypeDef::Ball => ValveType::Ball,
        ValveTypeDef::Butterfly => ValveType::Butterfly,
        ValveTypeDef::Gate => ValveType::Gate,
        ValveTypeDef::Globe => ValveType::Globe,
        ValveTypeDef::Solenoid => ValveType::Solenoid,
        ValveTypeDef::Needle => ValveType::Needle,
        ValveTypeDef::Generic => ValveType::Generic,
    }
}

fn actuation_from_def(def: ActuationDef) -> Actuation {
    match def {
        ActuationDef::Manual => Actuation::Manual,
        ActuationDef::Solenoid => Actuation::Solenoid,
        ActuationDef::Pneumatic => Actuation::Pneumatic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_project::schema::{MaterialDef, SubstanceDef};

    fn tiny_project() -> Project {
        Project {
            version: 1,
            name: "tiny".to_string(),
            description: None,
            substances: vec![SubstanceDef {
                id: "water".to_string(),
                name: "Water".to_string(),
                kind: SubstanceKind::Liquid {
                    density_kg_m3: 1000.0,
                    viscosity_pa_s: 8.9e-4,
                },
            }],
            materials: vec![MaterialDef {
                id: "al".to_string(),
                name: "Aluminium".to_string(),
                roughness_m: 1e-7,
            }],
            components: vec![
                ComponentDef {
                    id: "C1".to_string(),
                    kind: ComponentKind::Conduit {
                        length_m: 1.0,
                        diameter_m: 0.01,
                        material: "al".to_string(),
                    },
                },
                ComponentDef {
                    id: "F1".to_string(),
                    kind: ComponentKind::Filter {
                        diameter_m: 0.01,
                        loss_coefficient: 2.0,
                    },
                },
            ],
            boundary: BoundaryDef {
                pressure_pa: 1e6,
                mass_flow_kgps: 0.1,
                substance: "water".to_string(),
                temperature_k: 293.0,
            },
            solver: SolverDef::default(),
        }
    }

    #[test]
    fn compiles_chain_in_order() {
        let runtime = compile_project(&tiny_project()).unwrap();
        assert_eq!(runtime.chain.len(), 2);
        assert_eq!(runtime.chain.position_of("F1"), Some(1));
        assert_eq!(runtime.boundary.pressure().value, 1e6);
        assert!(runtime.target_source_pressure.is_none());
    }

    #[test]
    fn missing_material_is_a_compile_error() {
        let mut project = tiny_project();
        project.materials.clear();
        let err = compile_project(&project).unwrap_err();
        assert!(matches!(err, AppError::Compile(msg) if msg.contains("al")));
    }

    #[test]
    fn solver_section_maps_to_flow_config() {
        let mut project = tiny_project();
        project.solver.max_time_s = Some(2.5);
        project.solver.rel_tol = 0.01;
        let runtime = compile_project(&project).unwrap();
        assert_eq!(runtime.flow.max_time, Some(Duration::from_millis(2500)));
        assert_eq!(runtime.flow.rel_tol, 0.01);
        assert_eq!(runtime.flow.propagation.time_step.value, 0.1);
    }
}

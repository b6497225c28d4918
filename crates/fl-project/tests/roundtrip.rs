use fl_project::schema::*;
use fl_project::{load_json, load_yaml, save_json, save_yaml, validate_project};

fn minimal_project() -> Project {
    Project {
        version: 1,
        name: "Minimal".to_string(),
        description: None,
        substances: vec![
            SubstanceDef {
                id: "water".to_string(),
                name: "Water".to_string(),
                kind: SubstanceKind::Liquid {
                    density_kg_m3: 1000.0,
                    viscosity_pa_s: 8.9e-4,
                },
            },
            SubstanceDef {
                id: "air".to_string(),
                name: "Air".to_string(),
                kind: SubstanceKind::Gas {
                    gas_constant_j_per_kg_k: 287.0,
                    viscosity_pa_s: 1.8e-5,
                },
            },
        ],
        materials: vec![MaterialDef {
            id: "al".to_string(),
            name: "Aluminium".to_string(),
            roughness_m: 1e-7,
        }],
        components: vec![
            ComponentDef {
                id: "R1".to_string(),
                kind: ComponentKind::Cylinder {
                    pressure_pa: 15e5,
                    volume_m3: 5e-3,
                },
            },
            ComponentDef {
                id: "R2".to_string(),
                kind: ComponentKind::Tank {
                    pressure_pa: 1e5,
                    volume_m3: 5e-3,
                    diameter_m: 0.16,
                    inlet_diameter_m: 0.064,
                    outlet_diameter_m: 0.064,
                    pressurant: "air".to_string(),
                    propellant: "water".to_string(),
                    interface_position_m: 0.0,
                },
            },
            ComponentDef {
                id: "C1".to_string(),
                kind: ComponentKind::Conduit {
                    length_m: 0.15,
                    diameter_m: 0.016,
                    material: "al".to_string(),
                },
            },
            ComponentDef {
                id: "I1".to_string(),
                kind: ComponentKind::Injector { a: 0.2269, n: 0.4459 },
            },
        ],
        boundary: BoundaryDef {
            pressure_pa: 1e5,
            mass_flow_kgps: 0.378,
            substance: "water".to_string(),
            temperature_k: 293.0,
        },
        solver: SolverDef::default(),
    }
}

#[test]
fn roundtrip_yaml() {
    let project = minimal_project();
    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("fl_project_roundtrip.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json() {
    let project = minimal_project();
    let path = std::env::temp_dir().join("fl_project_roundtrip.json");
    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(project, loaded);
}

#[test]
fn load_dispatches_on_extension() {
    let project = minimal_project();
    let path = std::env::temp_dir().join("fl_project_dispatch.json");
    save_json(&path, &project).unwrap();
    assert_eq!(fl_project::load(&path).unwrap(), project);
}

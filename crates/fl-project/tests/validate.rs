use fl_project::schema::*;
use fl_project::{ValidationError, from_yaml_str, validate_project};

const BASE: &str = r#"
version: 1
name: base
substances:
  - id: water
    name: Water
    kind: { type: Liquid, density_kg_m3: 1000.0, viscosity_pa_s: 8.9e-4 }
  - id: air
    name: Air
    kind: { type: Gas, gas_constant_j_per_kg_k: 287.0, viscosity_pa_s: 1.8e-5 }
materials:
  - { id: al, name: Aluminium, roughness_m: 1.0e-7 }
components:
  - id: R1
    kind: { type: Cylinder, pressure_pa: 1.5e6, volume_m3: 5.0e-3 }
  - id: C1
    kind: { type: Conduit, length_m: 0.1, diameter_m: 0.01, material: al }
  - id: I1
    kind: { type: Injector, a: 0.2269, n: 0.4459 }
boundary: { pressure_pa: 1.0e5, mass_flow_kgps: 0.3, substance: water, temperature_k: 293.0 }
"#;

fn base() -> Project {
    from_yaml_str(BASE).unwrap()
}

#[test]
fn base_project_is_valid() {
    let p = base();
    assert_eq!(p.components.len(), 3);
    assert_eq!(p.solver, SolverDef::default());
}

#[test]
fn duplicate_component_id() {
    let mut p = base();
    let dup = p.components[1].clone();
    p.components.push(dup);
    assert!(matches!(
        validate_project(&p),
        Err(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn missing_material() {
    let mut p = base();
    p.components[1].kind = ComponentKind::Conduit {
        length_m: 0.1,
        diameter_m: 0.01,
        material: "steel".to_string(),
    };
    assert!(matches!(
        validate_project(&p),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn tank_substances_must_match_phase() {
    let mut p = base();
    p.components.insert(
        1,
        ComponentDef {
            id: "R2".to_string(),
            kind: ComponentKind::Tank {
                pressure_pa: 1e5,
                volume_m3: 5e-3,
                diameter_m: 0.16,
                inlet_diameter_m: 0.064,
                outlet_diameter_m: 0.064,
                pressurant: "water".to_string(),
                propellant: "air".to_string(),
                interface_position_m: 0.0,
            },
        },
    );
    assert!(matches!(
        validate_project(&p),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn reducer_curves_are_checked() {
    let mut p = base();
    p.components.insert(
        1,
        ComponentDef {
            id: "PR1".to_string(),
            kind: ComponentKind::PressureReducer {
                curves: vec![PressureCurveDef {
                    input_pressure_pa: 4e7,
                    mass_flow_kgps: vec![0.5, 0.1],
                    output_pressure_pa: vec![1.2e7, 1.2e7],
                }],
            },
        },
    );
    assert!(validate_project(&p).is_err());
}

#[test]
fn source_must_come_first() {
    let mut p = base();
    p.components.swap(0, 1);
    assert!(matches!(
        validate_project(&p),
        Err(ValidationError::Unsupported { .. })
    ));
}

#[test]
fn unsupported_version() {
    let mut p = base();
    p.version = 7;
    assert!(matches!(
        validate_project(&p),
        Err(ValidationError::UnsupportedVersion { version: 7 })
    ));
}

#[test]
fn unknown_boundary_substance() {
    let mut p = base();
    p.boundary.substance = "kerosene".to_string();
    assert!(validate_project(&p).is_err());
}

#[test]
fn empty_chain_rejected() {
    let mut p = base();
    p.components.clear();
    assert!(validate_project(&p).is_err());
}

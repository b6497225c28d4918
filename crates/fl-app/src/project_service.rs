//! Project loading, saving, validation, and introspection.

use std::path::Path;

use fl_project::schema::{ComponentKind, Project};

use crate::error::{AppError, AppResult};

/// One line of the chain listing, in flow order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ComponentSummary {
    pub position: usize,
    pub id: String,
    pub kind: &'static str,
    pub detail: String,
}

/// Load a project from YAML, or from JSON when the extension says so, and validate it.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let project = if is_json {
        fl_project::from_json_str(&content)?
    } else {
        fl_project::from_yaml_str(&content)?
    };
    tracing::debug!(
        path = %path.display(),
        components = project.components.len(),
        "loaded project"
    );
    Ok(project)
}

/// Save project as YAML.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    validate_project(project)?;
    let content = fl_project::to_yaml_string(project)?;
    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Validate project structure and references.
pub fn validate_project(project: &Project) -> AppResult<()> {
    fl_project::validate_project(project).map_err(|e| AppError::Validation(e.to_string()))
}

/// List the configured chain in flow order.
pub fn list_components(project: &Project) -> Vec<ComponentSummary> {
    project
        .components
        .iter()
        .enumerate()
        .map(|(position, c)| ComponentSummary {
            position,
            id: c.id.clone(),
            kind: c.kind.type_name(),
            detail: describe(&c.kind),
        })
        .collect()
}

fn mm(v: f64) -> f64 {
    v * 1e3
}

fn describe(kind: &ComponentKind) -> String {
    match kind {
        ComponentKind::Cylinder {
            pressure_pa,
            volume_m3,
        } => format!("{:.1} bar, {:.1} L", pressure_pa / 1e5, volume_m3 * 1e3),
        ComponentKind::Conduit {
            length_m,
            diameter_m,
            material,
        } => format!("L {:.0} mm, D {:.2} mm, {material}", mm(*length_m), mm(*diameter_m)),
        ComponentKind::Elbow {
            length_m,
            diameter_m,
            material,
            angle_deg,
            bend_radius_m,
        } => format!(
            "L {:.0} mm, D {:.2} mm, {material}, {angle_deg:.0} deg, R {:.0} mm",
            mm(*length_m),
            mm(*diameter_m),
            mm(*bend_radius_m)
        ),
        ComponentKind::Tee {
            length_m,
            diameter_m,
            material,
            ..
        } => format!("L {:.0} mm, D {:.2} mm, {material}", mm(*length_m), mm(*diameter_m)),
        ComponentKind::Valve {
            valve_type,
            actuation,
            diameter_m,
            flow_coefficient,
            open,
            ..
        } => {
            let cv = flow_coefficient
                .filter(|cv| *cv > 0.0)
                .map_or_else(|| "-".to_string(), |cv| format!("{cv}"));
            let state = if *open { "open" } else { "closed" };
            format!(
                "{valve_type:?}/{actuation:?}, D {:.2} mm, Cv {cv}, {state}",
                mm(*diameter_m)
            )
        }
        ComponentKind::CheckValve { diameter_m, .. } => format!("D {:.2} mm", mm(*diameter_m)),
        ComponentKind::PressureReducer { curves } => format!("{} curve(s)", curves.len()),
        ComponentKind::BurstDisk { burst_pressure_pa } => {
            format!("bursts at {:.1} bar", burst_pressure_pa / 1e5)
        }
        ComponentKind::Tank {
            volume_m3,
            diameter_m,
            pressurant,
            propellant,
            ..
        } => format!(
            "{propellant} under {pressurant}, {:.1} L, D {:.0} mm",
            volume_m3 * 1e3,
            mm(*diameter_m)
        ),
        ComponentKind::Injector { a, n } => format!("a {a}, n {n}"),
        ComponentKind::Filter {
            diameter_m,
            loss_coefficient,
        } => format!("D {:.2} mm, K {loss_coefficient}", mm(*diameter_m)),
    }
}

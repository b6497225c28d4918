use std::path::PathBuf;

#[test]
fn demos_validate() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let demos = [
        "demos/projects/aether_feed.yaml",
        "demos/projects/cold_flow_bench.yaml",
    ];

    for rel in demos {
        let path = root.join(rel);
        let result = fl_project::load_yaml(&path);
        assert!(
            result.is_ok(),
            "demo failed validation: {} => {:?}",
            path.display(),
            result.err()
        );
    }
}

#[test]
fn aether_demo_lists_chain_in_flow_order() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/projects");
    let project = fl_project::load_yaml(&root.join("aether_feed.yaml")).unwrap();
    let ids: Vec<&str> = project.components.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"R1"));
    assert_eq!(ids.last(), Some(&"I1"));
    assert_eq!(ids.len(), 12);
    assert_eq!(project.solver.target_source_pressure_pa, Some(1.0e7));
}

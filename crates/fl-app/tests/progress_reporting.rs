use std::path::PathBuf;

use fl_app::{RunMode, RunOptions, RunProgressEvent, RunRequest, RunStage, ensure_run_with_progress};

fn aether() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/projects/aether_feed.yaml")
}

#[test]
fn flow_search_streams_trials_in_order() {
    let path = aether();
    let request = RunRequest {
        project_path: &path,
        mode: RunMode::SolveFlow { target_pa: None },
        options: RunOptions::default(),
    };
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let mut cb = |event: RunProgressEvent| events.push(event);
    ensure_run_with_progress(&request, Some(&mut cb)).unwrap();

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(stages.first(), Some(&RunStage::LoadingProject));
    assert_eq!(stages.get(1), Some(&RunStage::CompilingRuntime));
    assert_eq!(stages.last(), Some(&RunStage::Completed));

    let trials: Vec<_> = events.iter().filter_map(|e| e.flow.as_ref()).collect();
    assert!(!trials.is_empty());
    assert!(trials.windows(2).all(|w| w[1].iteration == w[0].iteration + 1));
    assert!(trials.iter().all(|t| t.max_iterations == 10_000));
    assert!(
        events
            .windows(2)
            .all(|w| w[1].elapsed_wall_s >= w[0].elapsed_wall_s)
    );
}

#[test]
fn propagation_emits_no_trial_events() {
    let path = aether();
    let request = RunRequest {
        project_path: &path,
        mode: RunMode::Propagate,
        options: RunOptions::default(),
    };
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let mut cb = |event: RunProgressEvent| events.push(event);
    ensure_run_with_progress(&request, Some(&mut cb)).unwrap();

    assert!(events.iter().all(|e| e.flow.is_none()));
    assert!(events.iter().any(|e| e.stage == RunStage::Propagating));
    assert!(events.iter().all(|e| e.mode == RunMode::Propagate));
}

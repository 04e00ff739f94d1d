//! Event-trace shape and manifest deduplication

mod common;

use common::{assert_well_formed_trace, drain, facilities, terminal};
use pyforge_events::RunEvent;
use pyforge_scaffold::ProjectWorker;
use pyforge_types::{PackageSpec, ProjectOptions, ProjectSpec, StepId};

fn spec(target: &std::path::Path, packages: &[&str]) -> ProjectSpec {
    ProjectSpec {
        name: "demo".to_string(),
        target: target.to_path_buf(),
        packages: packages
            .iter()
            .map(|p| PackageSpec::parse(p).unwrap())
            .collect(),
        options: ProjectOptions {
            create_readme: true,
            init_git: true,
            cleanup_on_failure: true,
            ..ProjectOptions::default()
        },
    }
}

#[tokio::test]
async fn happy_path_trace_is_well_formed_and_summary_is_complete() {
    let dir = tempfile::tempdir().unwrap();
    let worker = ProjectWorker::new();
    let mut handle = worker
        .start(spec(dir.path(), &["flask", "requests"]), facilities())
        .unwrap();

    let events = drain(&mut handle).await;
    assert_well_formed_trace(&events);

    match terminal(&events) {
        RunEvent::Completed { summary } => {
            assert_eq!(summary.completed_steps, StepId::SEQUENCE);
            assert_eq!(summary.project_path, dir.path().join("demo"));
            assert_eq!(summary.installed_packages.len(), 2);
            assert!(summary.git_initialized);
            assert!(summary.project_size.is_some());
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn later_duplicate_wins_and_keeps_the_earlier_position() {
    let dir = tempfile::tempdir().unwrap();
    let worker = ProjectWorker::new();
    let mut handle = worker
        .start(
            spec(dir.path(), &["requests", "alpha", "requests==2.0"]),
            facilities(),
        )
        .unwrap();

    let events = drain(&mut handle).await;
    assert!(matches!(terminal(&events), RunEvent::Completed { .. }));

    let manifest =
        std::fs::read_to_string(dir.path().join("demo/requirements.txt")).unwrap();
    let lines: Vec<_> = manifest.lines().collect();
    assert_eq!(lines, vec!["requests==2.0", "alpha==1.0.0"]);
}

#[tokio::test]
async fn dotted_and_dashed_names_collapse_to_one_requirement() {
    let dir = tempfile::tempdir().unwrap();
    let worker = ProjectWorker::new();
    let mut handle = worker
        .start(
            spec(dir.path(), &["zope.interface", "zope-interface==5.4"]),
            facilities(),
        )
        .unwrap();

    let events = drain(&mut handle).await;
    assert!(matches!(terminal(&events), RunEvent::Completed { .. }));

    let manifest =
        std::fs::read_to_string(dir.path().join("demo/requirements.txt")).unwrap();
    // The duplicate is detected by normalized name, the kept entry is
    // the later spelling.
    assert_eq!(manifest, "zope-interface==5.4\n");
}

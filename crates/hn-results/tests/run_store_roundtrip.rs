use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use approx::assert_relative_eq;
use hn_results::{
    Frame, HistoryMode, Recorder, RecorderLayout, ResultsError, RunManifest, RunStore, Variable,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn recorder() -> Recorder {
    let layout = RecorderLayout {
        junctions: vec![
            "supply.S".into(),
            "return.S".into(),
            "supply.H".into(),
            "return.H".into(),
        ],
        pipes: vec!["supply.p1".into(), "return.p1".into()],
        consumers: vec!["H".into()],
        pumps: vec!["S".into()],
    };
    let mut rec = Recorder::new(layout, HistoryMode::Latest);
    for step in 0..3 {
        let t = step as f64 * 900.0;
        let frame = Frame {
            junction_pressure: vec![5e5, 2e5, 4.9e5, 2.1e5],
            junction_temperature: vec![353.15, 323.15 + t / 1e4, 352.9, 323.15],
            pipe_mass_flow: vec![0.08, 0.08],
            pipe_velocity: vec![0.0148, 0.0148],
            pipe_pressure_from: vec![5e5, 2.1e5],
            pipe_pressure_to: vec![4.9e5, 2e5],
            pipe_outlet_temperature: vec![352.9, 323.1],
            consumer_mass_flow: vec![0.08],
            consumer_outlet_temperature: vec![323.15],
            consumer_demand: vec![10_000.0],
            pump_mass_flow: vec![0.08],
            pump_return_temperature: vec![323.1],
            pump_heat_flow: vec![10_050.0],
        };
        rec.record(t, &frame).unwrap();
    }
    rec
}

#[test]
fn save_list_load_roundtrip() {
    let root = unique_temp_dir("hn_results_store");
    let store = RunStore::new(root.clone()).expect("failed to create run store");
    let rec = recorder();

    let manifest = RunManifest::now(
        "run-123",
        "demo",
        "0.1.0",
        900.0,
        2700.0,
        3,
        HistoryMode::Latest,
    );
    store.save_run(&manifest, &rec).expect("failed to save run");

    assert!(store.has_run("run-123"));
    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0], manifest);

    let table = store
        .load_table("run-123", Variable::JunctionTemperature)
        .expect("failed to load table");
    let original = rec.table(Variable::JunctionTemperature);
    assert_eq!(table.columns, original.columns);
    assert_eq!(table.time, original.time);
    for (a, b) in table.values.iter().flatten().zip(original.values.iter().flatten()) {
        assert_relative_eq!(*a, *b);
    }

    let raw = fs::read_to_string(root.join("run-123").join("pipe_mass_flow.csv")).unwrap();
    assert!(raw.starts_with("time_s;supply.p1;return.p1"));

    store.delete_run("run-123").unwrap();
    assert!(!store.has_run("run-123"));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_run_is_reported() {
    let root = unique_temp_dir("hn_results_missing");
    let store = RunStore::new(root.clone()).unwrap();
    let err = store.load_manifest("nope").unwrap_err();
    assert!(matches!(err, ResultsError::RunNotFound { .. }));
    let _ = fs::remove_dir_all(root);
}

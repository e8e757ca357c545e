//! Scenario files on disk through to reports.

use std::io::Write;

use gridsim_cli::commands::compare::compare_all;
use gridsim_cli::commands::{Overrides, simulate};
use gridsim_cli::{QueueSortKind, Scenario, ScoreKind};

const SAMPLE_TOML: &str = r#"
[scheduler]
seed = 7
max_workers = 4

[plugins]
queue_sort = "fifo"
score = "kubernetes"

[[nodes]]
name = "gpu-node"
cpu_milli = 8000
memory_mib = 16384
gpu_count = 2

[[nodes]]
name = "cpu-node"
cpu_milli = 8000
memory_mib = 16384

[[pods]]
name = "train"
cpu_milli = 2000
memory_mib = 4096
num_gpu = 1
gpu_milli = 500
duration = 10

[[pods]]
name = "web"
cpu_milli = 1000
memory_mib = 1024
duration = 5

[[pods]]
name = "infer"
cpu_milli = 2000
memory_mib = 4096
num_gpu = 1
gpu_milli = 1000
duration = 15
"#;

fn write_scenario(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml_by_extension() {
    let file = write_scenario(".toml", SAMPLE_TOML);
    let scenario = Scenario::from_file(file.path()).unwrap();

    assert_eq!(scenario.scheduler.seed, 7);
    assert_eq!(scenario.scheduler.max_workers, 4);
    assert_eq!(scenario.nodes.len(), 2);
    assert_eq!(scenario.pods.len(), 3);
    assert_eq!(scenario.nodes[1].gpu_count, 0);
    scenario.validate().unwrap();
}

#[test]
fn loads_json_by_extension() {
    let json = r#"{
        "plugins": { "queue_sort": "sjf", "score": "drift" },
        "nodes": [
            { "name": "n1", "cpu_milli": 4000, "memory_mib": 4096, "gpu_count": 1, "gpu_share_enabled": false }
        ],
        "pods": [
            { "name": "p1", "cpu_milli": 100, "memory_mib": 64, "num_gpu": 1, "gpu_milli": 300, "creation_time": 2, "duration": 9 }
        ]
    }"#;
    let file = write_scenario(".json", json);
    let scenario = Scenario::from_file(file.path()).unwrap();

    assert_eq!(scenario.plugins.queue_sort, QueueSortKind::Sjf);
    assert_eq!(scenario.plugins.score, ScoreKind::Drift);
    assert!(!scenario.nodes[0].gpu_share_enabled);
    assert_eq!(scenario.pods[0].creation_time, 2);
    assert_eq!(scenario.scheduler.seed, 42);
}

#[test]
fn unknown_extension_rejected() {
    let file = write_scenario(".yaml", SAMPLE_TOML);
    let err = Scenario::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("unsupported scenario format"));
}

#[test]
fn duplicate_pod_names_fail_validation() {
    let toml = r#"
[[pods]]
name = "p"
cpu_milli = 1
memory_mib = 1
duration = 1

[[pods]]
name = "p"
cpu_milli = 1
memory_mib = 1
duration = 1
"#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    let err = scenario.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate pod name"));
}

#[test]
fn oversized_gpu_request_fails_validation() {
    let toml = r#"
[[pods]]
name = "p"
cpu_milli = 1
memory_mib = 1
num_gpu = 1
gpu_milli = 1500
duration = 1
"#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    assert!(scenario.validate().is_err());
}

#[test]
fn simulate_sample_scenario() {
    let scenario = Scenario::from_toml_str(SAMPLE_TOML).unwrap();
    let report = simulate(&scenario, &Overrides::default(), scenario.plugins.score).unwrap();

    assert_eq!(report.makespan, 15);
    assert_eq!(report.completed_pods, 3);
    assert_eq!(report.queue_sort, "fifo");
}

#[test]
fn overrides_take_precedence() {
    let scenario = Scenario::from_toml_str(SAMPLE_TOML).unwrap();
    let overrides = Overrides {
        queue_sort: Some(QueueSortKind::Sjf),
        seed: Some(99),
        max_workers: Some(1),
        gpu_share: Some(false),
        ..Overrides::default()
    };
    let report = simulate(&scenario, &overrides, ScoreKind::Binpack).unwrap();

    assert_eq!(report.queue_sort, "sjf");
    assert_eq!(report.score, "binpack");
    assert_eq!(report.completed_pods, 3);
}

#[test]
fn compare_runs_every_score_policy() {
    let scenario = Scenario::from_toml_str(SAMPLE_TOML).unwrap();
    let reports = compare_all(&scenario, &Overrides::default()).unwrap();

    let scores: Vec<_> = reports.iter().map(|r| r.score.as_str()).collect();
    assert_eq!(scores, vec!["kubernetes", "binpack", "drift"]);
    assert!(reports.iter().all(|r| r.completed_pods == 3));
}

//! Integration tests for the estimate command.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;

const EVENT_LIST: &str = r#"[
    {
        "id": "4062",
        "name": "Boys 50 Freestyle",
        "category": "ind",
        "heats": {"1": ["30.00", "31.50"], "2": ["29.00"]}
    }
]"#;

fn events_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file.flush().unwrap();
    file
}

/// A single individual event: 31.5 + 60 + 29.0 + 180 = 300.5 seconds.
#[test]
fn estimate_offline_renders_total() {
    let file = events_file(EVENT_LIST);

    let mt_binary = env!("CARGO_BIN_EXE_mt");
    let output = Command::new(mt_binary)
        .arg("estimate")
        .arg(file.path())
        .arg("--offline")
        .output()
        .expect("Failed to run mt estimate");

    assert!(
        output.status.success(),
        "Estimate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Estimated total meet time: 0h 5m 0s"),
        "Expected total line in output: {stdout}"
    );
    assert!(
        stdout.contains("Heat 1: slowest time 31.50s"),
        "Expected per-heat breakdown in output: {stdout}"
    );
}

#[test]
fn estimate_json_output_is_machine_readable() {
    let file = events_file(EVENT_LIST);

    let mt_binary = env!("CARGO_BIN_EXE_mt");
    let output = Command::new(mt_binary)
        .arg("estimate")
        .arg(file.path())
        .arg("--offline")
        .arg("--json")
        .output()
        .expect("Failed to run mt estimate --json");

    assert!(
        output.status.success(),
        "Estimate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .expect("stdout should be valid JSON");
    let total = parsed["total_seconds"].as_f64().unwrap();
    assert!((total - 300.5).abs() < 1e-9, "unexpected total: {total}");
    assert_eq!(parsed["breakdown"]["minutes"], 5);
}

#[test]
fn estimate_reads_event_list_from_stdin() {
    let mt_binary = env!("CARGO_BIN_EXE_mt");
    let mut child = Command::new(mt_binary)
        .arg("estimate")
        .arg("-")
        .arg("--offline")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn mt estimate");

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(EVENT_LIST.as_bytes()).unwrap();
    }

    let output = child
        .wait_with_output()
        .expect("Failed to wait for mt estimate");

    assert!(
        output.status.success(),
        "Estimate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Estimated total meet time: 0h 5m 0s"),
        "Expected total line in output: {stdout}"
    );
}

#[test]
fn estimate_rejects_malformed_event_list() {
    let file = events_file("this is not json");

    let mt_binary = env!("CARGO_BIN_EXE_mt");
    let output = Command::new(mt_binary)
        .arg("estimate")
        .arg(file.path())
        .output()
        .expect("Failed to run mt estimate");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("event list"),
        "Expected parse error in stderr: {stderr}"
    );
}

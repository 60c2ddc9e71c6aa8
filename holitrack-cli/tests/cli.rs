use std::process::Command;

use serde_json::Value;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "holitrack-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn holitrack() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_holitrack"));
    command
        .env_remove("HOLITRACK_MOCK_TIME")
        .env_remove("HOLITRACK_MOCK_DATE")
        .env("NO_COLOR", "1");
    command
}

fn read_json(path: &std::path::Path) -> Value {
    let content = std::fs::read_to_string(path).expect("read output");
    serde_json::from_str(&content).expect("valid json")
}

#[test]
fn cli_list_cities_writes_output() {
    let output_path = temp_path("cities");
    let status = holitrack()
        .args(["--list-cities", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available cities"));
    assert!(content.contains("kiritimati"));
    assert!(content.contains("UTC+05:30"));
}

#[test]
fn cli_schedule_starts_east_of_the_date_line() {
    let output_path = temp_path("schedule");
    let status = holitrack()
        .args([
            "--schedule",
            "--mock-date",
            "2025-04-01",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let schedule = read_json(&output_path);
    assert_eq!(schedule["holiday"], "2025-04-20T00:00:00Z");
    let entries = schedule["entries"].as_array().expect("entries");
    assert_eq!(entries[0]["city"]["id"], "kiritimati");
    assert_eq!(entries[0]["arrival"], "2025-04-19T10:00:00Z");
    assert_eq!(entries.last().unwrap()["city"]["id"], "honolulu");
}

#[test]
fn cli_replays_the_journey_with_a_mocked_clock() {
    let output_path = temp_path("replay");
    let status = holitrack()
        .args([
            "--holiday",
            "christmas",
            "--mock-time",
            "2025-12-24T12:00:00Z",
            "--step-minutes",
            "60",
            "--ticks",
            "4",
            "--viewer-lat",
            "-33.87",
            "--viewer-lon",
            "151.21",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let report = read_json(&output_path);
    assert_eq!(report["holiday"], "christmas");
    assert_eq!(report["characterName"], "Santa");
    let snapshots = report["snapshots"].as_array().expect("snapshots");
    assert_eq!(snapshots.len(), 4);
    let completion: Vec<f64> = snapshots
        .iter()
        .map(|snap| snap["completionPercentage"].as_f64().unwrap())
        .collect();
    assert!(completion.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(snapshots.iter().all(|snap| snap["position"].is_object()));
    assert_eq!(report["status"]["estimatedArrival"], "14:00");
}

#[test]
fn cli_off_season_console_report_invites_viewers_back() {
    let output_path = temp_path("idle");
    let output = holitrack()
        .args(["--query", "?mock_date=2025-07-01", "--output"])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Come back on Sunday, April 5, 2026"), "{content}");
}

#[test]
fn cli_rejects_a_missing_data_dir() {
    let output = holitrack()
        .args(["--data-dir", "/definitely/not/a/holitrack/dir", "--list-cities"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cities.json"), "{stderr}");
}

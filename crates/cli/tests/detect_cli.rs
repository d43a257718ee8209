use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const FAST_CONFIG: &str = r#"
[upload]
tick_ms = 1
max_increment = 50.0

[processing]
tick_ms = 1
max_increment = 50.0
settle_ms = 0
"#;

fn make_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    write_file(
        &home.path().join(".config/eventscope/eventscope.toml"),
        FAST_CONFIG,
    );
    home
}

fn write_file(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, body).expect("write file");
}

fn create_video(home: &Path, name: &str) -> PathBuf {
    let path = home.join("videos").join(name);
    write_file(&path, "not really a video");
    path
}

fn run_detect(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_eventscope"))
        .arg("detect")
        .args(args)
        .env("HOME", home)
        .env_remove("EVENTSCOPE_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("run eventscope detect")
}

fn parse_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "detect failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("detect output json")
}

#[test]
fn catalog_detection_reports_timeline_and_exports() {
    let home = make_home();
    let video = create_video(home.path(), "clip.mp4");
    let export_dir = home.path().join("exports");

    let output = run_detect(
        home.path(),
        &[
            video.to_str().expect("utf8 path"),
            "--event",
            "Person Walking in the hallway",
            "--seed",
            "7",
            "--duration",
            "180",
            "--at",
            "00:16",
            "--min-confidence",
            "80",
            "--export",
            export_dir.to_str().expect("utf8 path"),
            "--format",
            "json",
        ],
    );
    let report = parse_json(&output);

    assert_eq!(report["video"], "clip.mp4");
    assert_eq!(report["query"], "Person Walking in the hallway");
    assert_eq!(report["settings"]["sensitivity"], "medium");
    assert_eq!(report["settings"]["confidenceThreshold"], 75);
    assert_eq!(report["duration"], "03:00");

    let events = report["events"].as_array().expect("events");
    let starts: Vec<&str> = events
        .iter()
        .map(|e| e["startTime"].as_str().expect("start"))
        .collect();
    assert_eq!(starts, vec!["00:15", "01:23", "02:45"]);
    let confidences: Vec<u64> = events
        .iter()
        .map(|e| e["confidence"].as_u64().expect("confidence"))
        .collect();
    assert_eq!(confidences, vec![87, 92, 78]);
    assert!(events
        .iter()
        .all(|e| e["event"] == "Person Walking in the hallway"));
    assert_eq!(events[1]["tier"], "high");

    assert_eq!(report["active"], serde_json::json!([0]));
    assert_eq!(report["visible"], serde_json::json!([0, 1]));
    assert_eq!(report["markers"].as_array().expect("markers").len(), 3);

    let export_path = report["exportPath"].as_str().expect("export path");
    assert!(export_path.contains("detection-results-"));
    let exported: Value =
        serde_json::from_str(&fs::read_to_string(export_path).expect("read export"))
            .expect("export json");
    assert_eq!(exported["video"], "clip.mp4");
    assert_eq!(
        exported["detectionSettings"]["event"],
        "Person Walking in the hallway"
    );
    assert_eq!(exported["results"].as_array().expect("results").len(), 3);
}

#[test]
fn unmatched_query_synthesizes_random_events() {
    let home = make_home();
    let video = create_video(home.path(), "clip.webm");

    let output = run_detect(
        home.path(),
        &[
            video.to_str().expect("utf8 path"),
            "--event",
            "foo bar baz",
            "--seed",
            "42",
            "--format",
            "json",
        ],
    );
    let report = parse_json(&output);

    let events = report["events"].as_array().expect("events");
    assert!((2..=5).contains(&events.len()));
    for event in events {
        let confidence = event["confidence"].as_u64().expect("confidence");
        assert!((75..=95).contains(&confidence));
        assert_eq!(event["event"], "foo bar baz");
    }
    assert!(report["markers"].as_array().expect("markers").is_empty());
    assert!(report["exportPath"].is_null());
}

#[test]
fn text_output_lists_events() {
    let home = make_home();
    let video = create_video(home.path(), "clip.mov");

    let output = run_detect(
        home.path(),
        &[
            video.to_str().expect("utf8 path"),
            "--event",
            "car driving",
            "--at",
            "00:46",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("Video:     clip.mov"));
    assert!(stdout.contains("#1  00:45"));
    assert!(stdout.contains("Active at 00:46: #1"));
}

#[test]
fn unsupported_video_is_rejected() {
    let home = make_home();
    let video = create_video(home.path(), "notes.txt");

    let output = run_detect(
        home.path(),
        &[video.to_str().expect("utf8 path"), "--event", "car driving"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {stderr}");
    assert!(stderr.contains(".txt"), "stderr: {stderr}");
}

#[test]
fn blank_event_is_rejected() {
    let home = make_home();
    let video = create_video(home.path(), "clip.mp4");

    let output = run_detect(
        home.path(),
        &[video.to_str().expect("utf8 path"), "--event", "   "],
    );
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_video_is_reported() {
    let home = make_home();
    let output = run_detect(
        home.path(),
        &[
            home.path().join("absent.mp4").to_str().expect("utf8 path"),
            "--event",
            "car driving",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read video"), "stderr: {stderr}");
}

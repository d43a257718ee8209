use std::process::Command;

fn run_timestamp(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_eventscope"))
        .arg("timestamp")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run eventscope timestamp")
}

fn stdout_line(output: &std::process::Output) -> String {
    assert!(
        output.status.success(),
        "timestamp failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone())
        .expect("utf8 stdout")
        .trim()
        .to_string()
}

#[test]
fn timestamp_to_seconds() {
    assert_eq!(stdout_line(&run_timestamp(&["01:23"])), "83");
    assert_eq!(stdout_line(&run_timestamp(&["00:00"])), "0");
}

#[test]
fn seconds_to_timestamp() {
    assert_eq!(stdout_line(&run_timestamp(&["83"])), "01:23");
    assert_eq!(stdout_line(&run_timestamp(&["3600"])), "60:00");
}

#[test]
fn add_floors_the_delta() {
    assert_eq!(
        stdout_line(&run_timestamp(&["00:15", "--add", "4.9"])),
        "00:19"
    );
    assert_eq!(
        stdout_line(&run_timestamp(&["00:15", "--add", "-20"])),
        "00:00"
    );
}

#[test]
fn malformed_timestamp_fails() {
    let output = run_timestamp(&["ab:cd"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr: {stderr}");
}

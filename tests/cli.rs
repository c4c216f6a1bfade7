use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::tempdir;

fn data_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn vaxpool() -> Command {
    Command::cargo_bin("vaxpool").unwrap()
}

#[test]
fn prints_one_line_per_day() {
    let output = vaxpool().args(["--days", "5"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Day: 1\tInfected: 117.89"));
    assert!(lines[4].starts_with("Day: 5\tInfected: "));
}

#[test]
fn writes_reports_to_output_dir() {
    let temp_dir = tempdir().unwrap();
    vaxpool()
        .args([
            "--config",
            &data_path("reference_scenario.json"),
            "--days",
            "3",
            "--recovery-mode",
            "accumulate",
            "--pool-report",
            "--output-dir",
        ])
        .arg(temp_dir.path())
        .assert()
        .success();

    let daily = std::fs::read_to_string(temp_dir.path().join("daily_totals.csv")).unwrap();
    let mut lines = daily.lines();
    assert_eq!(lines.next(), Some("day,infected,dead,population,doses"));
    assert_eq!(lines.count(), 3);
    assert!(temp_dir.path().join("pool_report.csv").exists());
}

#[test]
fn vaccination_order_can_be_overridden() {
    let output = vaxpool()
        .args(["--days", "1", "--vaccination-order", "0,10,70,20"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Day: 1\tInfected: 117.89258"));
}

#[test]
fn unknown_age_band_fails() {
    let output = vaxpool()
        .args(["--config", &data_path("unknown_age_band.json")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unknown age band 15"));
}

#[test]
fn missing_config_fails() {
    vaxpool()
        .args(["--config", "no/such/config.json"])
        .assert()
        .failure()
        .code(1);
}

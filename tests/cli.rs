use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn fixtures() -> Vec<PathBuf> {
    (1..=3)
        .map(|n| data(&format!("short-test-data-{n}.csv")))
        .collect()
}

fn cmd() -> Command {
    Command::cargo_bin("xcsv_plot_map").unwrap()
}

#[test]
fn cli_shows_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("xcsv_plot_map"))
        .stdout(predicate::str::contains("--plot-on-map"));
}

#[test]
fn cli_prints_version() {
    cmd()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2.0"));
}

#[test]
fn index_and_label_for_same_axis_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");
    cmd()
        .args(["-x", "0", "-X", "time (year)", "-o"])
        .arg(&out)
        .arg(data("short-test-data-1.csv"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
    assert!(!out.exists());

    cmd()
        .args(["-y", "1", "-Y", "depth"])
        .arg(data("short-test-data-1.csv"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_coordinates_name_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never.png");
    cmd()
        .arg("-o")
        .arg(&out)
        .arg(data("no-coordinates.csv"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("latitude"));
    assert!(!out.exists());
}

#[test]
fn no_map_needs_no_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("plot.svg");
    cmd()
        .arg("--no-map")
        .arg("-o")
        .arg(&out)
        .arg(data("no-coordinates.csv"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote plot to"));
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("No coordinates here"));
}

#[test]
fn writes_plot_beside_map_as_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("sites.svg");
    cmd()
        .arg("-o")
        .arg(&out)
        .args(["--label-key", "title"])
        .args(fixtures())
        .assert()
        .success();
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.contains("The title"));
    assert!(svg.contains("Site B"));
}

#[test]
fn plot_on_map_with_scatter_and_options_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("on_map.png");
    cmd()
        .args(["-m", "-S", "-P", r#"{"marker": "x"}"#, "-s", "5", "5", "-o"])
        .arg(&out)
        .args(fixtures())
        .assert()
        .success();
    let meta = std::fs::metadata(&out).unwrap();
    assert!(meta.len() > 0);
}

#[test]
fn unknown_projection_is_rejected() {
    cmd()
        .args(["-p", "DummyNonExistentCRS", "-o", "never.png"])
        .arg(data("short-test-data-1.csv"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("DummyNonExistentCRS"));
}

#[test]
fn malformed_plot_options_are_rejected() {
    cmd()
        .args(["-P", "{marker: x", "-o", "never.png"])
        .arg(data("short-test-data-1.csv"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("plot options"));
}

#[test]
fn missing_input_file_is_reported() {
    cmd()
        .args(["-o", "never.png"])
        .arg(data("does-not-exist.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.csv"));
}

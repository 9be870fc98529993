use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn write_description(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn generate_help() {
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("generate").arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate the recognizer tables"));
}

#[test]
fn check_help() {
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("check").arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Check a machine description"));
}

#[test]
fn generates_tables_from_a_description() {
    let dir = tempdir().unwrap();
    let input = write_description(
        &dir,
        "pipeline.dfa",
        "unit alu, mul\ninsn add 1 = alu\ninsn imul 3 = mul\n",
    );
    let output = dir.path().join("tables.json");
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("generate")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Tables written to"));
    let json = fs::read_to_string(&output).unwrap();
    assert!(json.contains("advance_cycle_code"));
}

#[test]
fn writes_the_report_when_requested() {
    let dir = tempdir().unwrap();
    let input = write_description(
        &dir,
        "pipeline.dfa",
        "unit alu\ninsn add 1 = alu\n",
    );
    let report = dir.path().join("report.txt");
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("generate")
        .arg("--input")
        .arg(&input)
        .arg("--report")
        .arg(&report);
    cmd.assert().success();
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("insn reservation add"));
    assert!(text.contains("statistics:"));
}

#[test]
fn check_accepts_a_valid_description() {
    let dir = tempdir().unwrap();
    let input = write_description(&dir, "pipeline.dfa", "unit alu\ninsn add 1 = alu\n");
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("check").arg("--input").arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Description is valid"));
}

#[test]
fn check_rejects_a_reservation_cycle() {
    let dir = tempdir().unwrap();
    let input = write_description(
        &dir,
        "pipeline.dfa",
        "unit u\nreservation r = s\nreservation s = r\ninsn i 1 = r\n",
    );
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("check").arg("--input").arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cycle in definition"));
}

#[test]
fn missing_input_fails_cleanly() {
    let mut cmd = Command::cargo_bin("pipegen_rust").unwrap();
    cmd.arg("generate").arg("--input").arg("no_such_file.dfa");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

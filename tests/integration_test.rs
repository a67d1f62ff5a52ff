//! Integration tests for natalprobe

use std::process::Command;

#[test]
fn test_help_command() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("comparing LLM readings of a natal chart"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--regions"));
    assert!(stdout.contains("--debug"));
}

#[test]
fn test_version_command() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("natalprobe"));
    assert!(stdout.contains("0.1.0"));
}

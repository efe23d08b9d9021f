//! Tests for the `bpmn-print` binary: arguments, exit codes and output.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn bpmn_print(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bpmn-print"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn version_matches_package() {
    for flag in ["-v", "--version"] {
        let out = bpmn_print(&[flag]);
        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert_eq!(
            stdout.trim(),
            format!("bpmn-print {}", env!("CARGO_PKG_VERSION"))
        );
    }
}

#[test]
fn help_lists_the_keep_flag() {
    let out = bpmn_print(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Print BPMN workflow for developer readings"));
    assert!(stdout.contains("--keep"));
}

#[test]
fn missing_arguments_are_a_usage_error() {
    let out = bpmn_print(&["only-one"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_input_folder_exits_with_two_and_no_output() {
    let scratch = tempfile::tempdir().unwrap();
    let input = scratch.path().join("nope");
    let output = scratch.path().join("out");

    let out = bpmn_print(&[input.to_str().unwrap(), output.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(
        stderr.matches("Input folder does not exist").count(),
        1,
        "{stderr}"
    );
    assert!(stderr.contains("Error: Input folder does not exist"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn malformed_document_exits_with_two() {
    let input = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("broken.bpmn"),
        "<definitions><process>",
    )
    .unwrap();
    let output = tempfile::tempdir().unwrap();

    let out = bpmn_print(&[
        input.path().to_str().unwrap(),
        output.path().to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error: Malformed BPMN file"), "{stderr}");
}

#[test]
fn converts_and_keeps_pngs() {
    let input = tempfile::tempdir().unwrap();
    for name in ["minimal.bpmn", "order.bpmn"] {
        fs::copy(fixture(name), input.path().join(name)).unwrap();
    }
    let output = tempfile::tempdir().unwrap();

    let out = bpmn_print(&[
        "-k",
        "-n",
        "printed",
        input.path().to_str().unwrap(),
        output.path().to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "Done.");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Found 2 BPMN file(s) to process"), "{stderr}");
    assert!(stderr.contains("Processing order.bpmn..."), "{stderr}");

    assert!(output.path().join("printed.pdf").exists());
    assert!(output.path().join("minimal.png").exists());
    assert!(output.path().join("order.png").exists());
}

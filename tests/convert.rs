//! Folder conversion tests against the BPMN files in `tests/fixtures/`.

use std::fs;
use std::path::{Path, PathBuf};

use bpmn_print::{ConvertOptions, Error, convert_folder};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Fresh input folder holding copies of the named fixtures.
fn input_with(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        fs::copy(fixtures_dir().join(name), dir.path().join(name)).unwrap();
    }
    dir
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn pdf_pages(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

const ALL: [&str; 3] = ["minimal.bpmn", "order.bpmn", "review.bpmn"];

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn one_page_per_bpmn_file() {
    let input = input_with(&ALL);
    let output = tempfile::tempdir().unwrap();
    let options = ConvertOptions {
        pdf_name: Some("workflows".into()),
        ..Default::default()
    };

    let report = convert_folder(input.path(), output.path(), &options).unwrap();
    assert_eq!(report.documents, 3);
    assert_eq!(report.pdf_files, vec![output.path().join("workflows.pdf")]);
    assert_eq!(pdf_pages(&report.pdf_files[0]), 3);
}

#[test]
fn intermediate_pngs_are_removed_by_default() {
    let input = input_with(&ALL);
    let output = tempfile::tempdir().unwrap();

    let report = convert_folder(input.path(), output.path(), &ConvertOptions::default()).unwrap();
    assert!(report.png_files.is_empty());
    assert!(files_with_extension(output.path(), "png").is_empty());
    assert_eq!(files_with_extension(output.path(), "pdf").len(), 1);
}

#[test]
fn keep_retains_one_png_per_file() {
    let input = input_with(&ALL);
    let output = tempfile::tempdir().unwrap();
    let options = ConvertOptions {
        keep_png: true,
        ..Default::default()
    };

    let report = convert_folder(input.path(), output.path(), &options).unwrap();
    assert_eq!(
        files_with_extension(output.path(), "png"),
        vec!["minimal.png", "order.png", "review.png"]
    );
    assert_eq!(report.png_files.len(), 3);
    let png = fs::read(output.path().join("order.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn missing_input_creates_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let input = scratch.path().join("does-not-exist");
    let output = scratch.path().join("out");

    let err = convert_folder(&input, &output, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));
    assert!(!output.exists());
}

#[test]
fn folder_without_bpmn_files_is_an_error() {
    let input = tempfile::tempdir().unwrap();
    fs::write(input.path().join("readme.txt"), "not a process").unwrap();
    let output = tempfile::tempdir().unwrap();

    let err = convert_folder(input.path(), output.path(), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NoBpmnFiles { .. }));
    assert!(err.to_string().starts_with("No BPMN files found in"));
}

#[test]
fn malformed_file_fails_the_run_and_cleans_up() {
    let input = input_with(&["minimal.bpmn"]);
    fs::write(input.path().join("zz-broken.bpmn"), "<definitions><process>").unwrap();
    let output = tempfile::tempdir().unwrap();

    let err = convert_folder(input.path(), output.path(), &ConvertOptions::default()).unwrap_err();
    match err {
        Error::MalformedBpmn { path, .. } => assert!(path.ends_with("zz-broken.bpmn")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(files_with_extension(output.path(), "png").is_empty());
    assert!(files_with_extension(output.path(), "pdf").is_empty());
}

#[test]
fn repeated_runs_produce_identical_pdfs() {
    let input = input_with(&ALL);
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let options = ConvertOptions {
        pdf_name: Some("same".into()),
        ..Default::default()
    };

    convert_folder(input.path(), first.path(), &options).unwrap();
    convert_folder(input.path(), second.path(), &options).unwrap();
    // rerun into the first folder to overwrite in place
    convert_folder(input.path(), first.path(), &options).unwrap();

    let a = fs::read(first.path().join("same.pdf")).unwrap();
    let b = fs::read(second.path().join("same.pdf")).unwrap();
    assert_eq!(a, b);
    assert!(files_with_extension(first.path(), "png").is_empty());
}

#[test]
fn split_writes_one_pdf_per_file() {
    let input = input_with(&ALL);
    let output = tempfile::tempdir().unwrap();
    let options = ConvertOptions {
        split: true,
        ..Default::default()
    };

    let report = convert_folder(input.path(), output.path(), &options).unwrap();
    assert_eq!(
        files_with_extension(output.path(), "pdf"),
        vec!["minimal.pdf", "order.pdf", "review.pdf"]
    );
    for pdf in &report.pdf_files {
        assert_eq!(pdf_pages(pdf), 1);
    }
}

#[test]
fn output_folder_is_created_with_parents() {
    let input = input_with(&["minimal.bpmn"]);
    let scratch = tempfile::tempdir().unwrap();
    let output = scratch.path().join("a/b/c");

    convert_folder(input.path(), &output, &ConvertOptions::default()).unwrap();
    assert_eq!(files_with_extension(&output, "pdf").len(), 1);
}

#[test]
fn invalid_options_are_rejected_before_any_work() {
    let input = input_with(&["minimal.bpmn"]);
    let scratch = tempfile::tempdir().unwrap();
    let output = scratch.path().join("out");
    let options = ConvertOptions {
        scale: -1.0,
        ..Default::default()
    };

    let err = convert_folder(input.path(), &output, &options).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "scale", .. }));
    assert!(!output.exists());
}

#[test]
fn case_variant_extension_does_not_clobber_outputs() {
    let input = input_with(&["order.bpmn"]);
    fs::copy(
        fixtures_dir().join("review.bpmn"),
        input.path().join("order.BPMN"),
    )
    .unwrap();
    let output = tempfile::tempdir().unwrap();
    let options = ConvertOptions {
        keep_png: true,
        split: true,
        ..Default::default()
    };

    let report = convert_folder(input.path(), output.path(), &options).unwrap();
    assert_eq!(report.documents, 1);
    assert_eq!(report.png_files, vec![output.path().join("order.png")]);
    assert_eq!(report.pdf_files, vec![output.path().join("order.pdf")]);
    assert_eq!(files_with_extension(output.path(), "png"), vec!["order.png"]);
    assert_eq!(files_with_extension(output.path(), "pdf"), vec!["order.pdf"]);
}

//! Command-line behavior that does not need a real OCR engine.

use assert_cmd::Command;
use predicates::prelude::*;

fn invwatch() -> Command {
    Command::cargo_bin("invwatch").unwrap()
}

#[test]
fn test_help_lists_commands() {
    invwatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_config_show_reads_given_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"watch": {"directory": "scanned-bills"}}"#).unwrap();

    invwatch()
        .args(["--config", path.to_str().unwrap(), "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scanned-bills"))
        .stdout(predicate::str::contains("invoices.xlsx"));
}

#[test]
fn test_config_get_nested_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").unwrap();

    invwatch()
        .args(["--config", path.to_str().unwrap(), "config", "get", "ocr.languages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("heb"));

    invwatch()
        .args(["--config", path.to_str().unwrap(), "config", "get", "ocr.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let path_arg = path.to_str().unwrap();

    invwatch().args(["config", "init", "--output", path_arg]).assert().success();
    assert!(path.exists());

    invwatch()
        .args(["config", "init", "--output", path_arg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    invwatch()
        .args(["config", "init", "--output", path_arg, "--force"])
        .assert()
        .success();
}

#[test]
fn test_process_rejects_unaccepted_extension() {
    let dir = tempfile::tempdir().unwrap();
    let gif = dir.path().join("photo.gif");
    std::fs::write(&gif, b"GIF89a").unwrap();
    let ledger = dir.path().join("ledger.csv");

    invwatch()
        .args(["process", gif.to_str().unwrap(), "--ledger", ledger.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));

    assert!(!ledger.exists());
}

#[test]
fn test_process_missing_file() {
    invwatch()
        .args(["process", "definitely/not/here.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_reports_missing_ocr_engine() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("scan.png");
    image::RgbImage::new(4, 4).save(&image).unwrap();

    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{"ocr": {"tesseract_command": "invwatch-no-such-tesseract-binary"}}"#,
    )
    .unwrap();
    let ledger = dir.path().join("ledger.xlsx");

    invwatch()
        .args([
            "--config",
            config.to_str().unwrap(),
            "process",
            image.to_str().unwrap(),
            "--ledger",
            ledger.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to run"));

    assert!(!ledger.exists());
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not an invoice").unwrap();
    let pattern = format!("{}/*", dir.path().display());

    invwatch()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

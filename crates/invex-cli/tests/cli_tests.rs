//! Integration tests for the `invex` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KLINGSPOR_INVOICE: &str = "\
KLINGSPOR Schleifsysteme GmbH & Co. KG
Rechnungs-Nr.: 9012345
Rechnungsdatum: 15.03.2024
Ihre Bestellung: PO-4711
Pos. Artikel-Nr. Bezeichnung Menge ME Preis Betrag
1 302917 Schleifband CS 310 X 10 ST 10,00 100,00
2 312345 Fiberscheibe CS 561 5 ST 5,00 25,00
Warenwert 125,00
";

/// Helper to create a CLI command isolated from the user's config directory
fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_invex"));
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_process_text_as_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_text(dir.path(), "klingspor.txt", KLINGSPOR_INVOICE);

    cli(dir.path())
        .arg("process")
        .arg(&input)
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("orderReference;invoiceIdentifier"))
        .stdout(predicate::str::contains(
            "PO-4711;9012345;N/A;Klingspor;14.04.2024;15.03.2024;N/A;302917",
        ))
        .stdout(predicate::str::contains(";5;5,000;19"));
}

#[test]
fn test_process_text_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write_text(dir.path(), "klingspor.txt", KLINGSPOR_INVOICE);

    cli(dir.path())
        .args(["process", "--document-type", "invoice"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"vendor\": \"klingspor\""))
        .stdout(predicate::str::contains("\"unit_price_net\": \"10,000\""));
}

#[test]
fn test_process_text_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_text(dir.path(), "klingspor.txt", KLINGSPOR_INVOICE);

    cli(dir.path())
        .arg("process")
        .arg(&input)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Klingspor invoice: 9012345"))
        .stdout(predicate::str::contains("Creditor: 70010"))
        .stdout(predicate::str::contains("Net total: 125,00"));
}

#[test]
fn test_process_missing_file() {
    let dir = TempDir::new().unwrap();

    cli(dir.path())
        .arg("process")
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unknown_vendor() {
    let dir = TempDir::new().unwrap();
    let input = write_text(dir.path(), "other.txt", "Stadtwerke Musterstadt\nRechnung 1\n");

    cli(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("vendor could not be identified"));
}

#[test]
fn test_process_without_parser_for_document_type() {
    let dir = TempDir::new().unwrap();
    let input = write_text(dir.path(), "sia.txt", "sia Abrasives Deutschland GmbH\n");

    cli(dir.path())
        .args(["process", "-t", "orderConfirmation"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no orderConfirmation parser registered for vendor sia",
        ));
}

#[test]
fn test_batch_empty_folder() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();

    cli(dir.path())
        .arg("batch")
        .arg(&input)
        .arg(dir.path().join("archive"))
        .arg(dir.path().join("out"))
        .arg(dir.path().join("all.csv"))
        .arg("invoice")
        .assert()
        .success()
        .stdout(predicate::str::contains("No PDF files found"));
}

#[test]
fn test_batch_leaves_unreadable_document_in_place() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in");
    fs::create_dir(&input).unwrap();
    let broken = write_text(&input, "broken.PDF", "not a pdf at all");
    let aggregate = dir.path().join("all.csv");

    cli(dir.path())
        .arg("batch")
        .arg(&input)
        .arg(dir.path().join("archive"))
        .arg(dir.path().join("out"))
        .arg(&aggregate)
        .arg("invoice")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 files to process"))
        .stdout(predicate::str::contains("0 successful, 0 skipped, 1 failed"));

    assert!(broken.exists());
    assert!(!aggregate.exists());
}

#[test]
fn test_batch_rejects_unknown_document_type() {
    let dir = TempDir::new().unwrap();

    cli(dir.path())
        .arg("batch")
        .arg(dir.path())
        .arg(dir.path())
        .arg(dir.path())
        .arg(dir.path().join("all.csv"))
        .arg("lieferschein")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn test_config_init_and_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("invex.json");

    cli(dir.path())
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "batch.jobs", "3"])
        .assert()
        .success();

    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "batch.jobs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn test_config_set_rejects_unusable_values() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("invex.json");

    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.date_format", "%Q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("extraction.date_format"));
    assert!(!config.exists());

    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "output.delimiter", "§"])
        .assert()
        .failure();

    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["config", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output.delimiter"))
        .stdout(predicate::str::contains("%d.%m.%Y"));
}

#[test]
fn test_process_rejects_unusable_date_format_in_config() {
    let dir = TempDir::new().unwrap();
    let input = write_text(dir.path(), "klingspor.txt", KLINGSPOR_INVOICE);
    let config = write_text(
        dir.path(),
        "invex.json",
        r#"{ "extraction": { "date_format": "%Q" } }"#,
    );

    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&input)
        .args(["--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

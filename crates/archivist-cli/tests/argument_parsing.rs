//! Focused CLI argument parsing tests.
//!
//! Tests that verify command-line argument parsing works correctly without
//! touching a catalog.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn archivist() -> Command {
    Command::cargo_bin("archivist").unwrap()
}

// ============================================================================
// Informational Commands
// ============================================================================

#[test]
fn version_command_succeeds() {
    archivist()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("archivist-cli"));
}

#[test]
fn version_flag_shows_version() {
    archivist()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("archivist"));
}

#[test]
fn help_flag_shows_usage() {
    archivist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("card catalog"))
        .stdout(predicate::str::contains("shelve"))
        .stdout(predicate::str::contains("add-edition"));
}

#[test]
fn no_subcommand_is_an_error() {
    archivist().assert().failure();
}

#[test]
fn unknown_subcommand_is_an_error() {
    archivist()
        .arg("catalogue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ============================================================================
// Argument Validation
// ============================================================================

#[test]
fn shelve_requires_payload() {
    archivist()
        .arg("shelve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn show_rejects_non_numeric_id() {
    archivist()
        .args(["show", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn edition_requires_number() {
    archivist()
        .args(["edition", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn add_edition_requires_id_and_payload() {
    archivist()
        .arg("add-edition")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn tag_attach_requires_name() {
    archivist()
        .args(["tag", "attach", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn tag_help_lists_subcommands() {
    archivist()
        .args(["tag", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("attach"))
        .stdout(predicate::str::contains("list"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn init_creates_directory() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("new-shelf");

    archivist()
        .args(["init", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized Archivist project"));

    assert!(path.join("archivist.toml").exists());
    assert!(path.join(".gitignore").exists());
    assert!(path.join(".archivist/data").is_dir());
}

#[test]
fn init_with_development_flag_disables_fsync() {
    let temp = TempDir::new().unwrap();

    archivist()
        .args(["init", temp.path().to_str().unwrap(), "--development"])
        .assert()
        .success()
        .stdout(predicate::str::contains("development"));

    let config = std::fs::read_to_string(temp.path().join("archivist.toml")).unwrap();
    assert!(config.contains("fsync = false"));
}

#[test]
fn init_twice_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().to_str().unwrap();

    archivist().args(["init", path]).assert().success();
    archivist()
        .args(["init", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

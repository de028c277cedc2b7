//! Smoke tests for the hallador CLI
//!
//! Every command except `fill` runs without a browser, so these exercise
//! the binary end to end.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the hallador binary
fn hallador() -> Command {
    let mut cmd = Command::cargo_bin("hallador").expect("hallador binary should exist");
    cmd.env_remove("RUST_LOG");
    cmd
}

const TINY_CATALOG: &str = r#"
version: "1.0"
name: tiny
fields:
  - name: "Tiêu đề"
    kind: { type: text_input }
    candidates: ['input[name="title"]', 'textarea[placeholder*="tiêu đề"]']
    on_failure: fatal
  - name: "Nội thất"
    kind:
      type: hidden_select
      option_matchers: ["thất"]
    value_map:
      "Đầy đủ": full_furniture
    on_failure: degraded
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_version_flag() {
    hallador()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    hallador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("candidates"))
        .stdout(predicate::str::contains("fill"));
}

#[test]
fn test_no_args_fails() {
    hallador().assert().failure();
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_builtin_listing() {
    hallador()
        .args(["--color", "never", "check", "--builtin", "listing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catalog: new_post (v1.0)"))
        .stdout(predicate::str::contains("Hình ảnh"))
        .stderr(predicate::str::contains("OK catalog 'new_post' is valid (18 fields)"));
}

#[test]
fn test_check_quiet_keeps_stdout_only() {
    hallador()
        .args(["-q", "check", "--builtin", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("username"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_check_catalog_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "tiny.yaml", TINY_CATALOG);
    hallador()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tiêu đề"))
        .stdout(predicate::str::contains("[degraded]"));
}

#[test]
fn test_check_rejects_duplicate_field() {
    let dir = TempDir::new().unwrap();
    let duplicated = format!(
        "{TINY_CATALOG}  - name: \"Tiêu đề\"\n    kind: {{ type: text_input }}\n"
    );
    let path = write(&dir, "dup.yaml", &duplicated);
    hallador()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("declared twice"));
}

#[test]
fn test_check_missing_file() {
    hallador()
        .args(["check", "/nonexistent/catalog.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_check_rejects_two_sources() {
    hallador()
        .args(["check", "form.yaml", "--builtin", "listing"])
        .assert()
        .failure();
}

// ============================================================================
// candidates / map
// ============================================================================

#[test]
fn test_candidates_for_combobox() {
    hallador()
        .args([
            "candidates",
            "--builtin",
            "listing",
            "--field",
            "Loại bất động sản",
            "--current",
            "Nhà riêng",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "button[role=\"combobox\"]:has-text(\"Nhà riêng\")",
        ))
        .stdout(predicate::str::contains("role=combobox"));
}

#[test]
fn test_candidates_unknown_field() {
    hallador()
        .args(["candidates", "--builtin", "listing", "--field", "Hồ bơi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hồ bơi"));
}

#[test]
fn test_map_synonym() {
    hallador()
        .args(["map", "--builtin", "listing", "-f", "Hướng nhà/ đất", "-l", "Đông Nam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("value:       east_south"))
        .stdout(predicate::str::contains("Hướng Đông Nam, Đông Nam"));
}

#[test]
fn test_map_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "tiny.yaml", TINY_CATALOG);
    hallador()
        .arg("map")
        .arg(&path)
        .args(["--field", "Nội thất", "--label", "Thô"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mapped:      no"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_defaults() {
    hallador()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("default_timeout_ms: 1000"))
        .stdout(predicate::str::contains("upload_timeout_ms: 15000"));
}

#[test]
fn test_config_file_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "hallar.yaml", "option_render_ms: 900\n");
    hallador()
        .arg("config")
        .arg("--file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("option_render_ms: 900"))
        .stdout(predicate::str::contains("default_timeout_ms: 1000"));
}

// ============================================================================
// fill
// ============================================================================

#[test]
fn test_fill_help() {
    hallador()
        .args(["fill", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--values"))
        .stdout(predicate::str::contains("--headless"));
}

#[cfg(not(feature = "browser"))]
#[test]
fn test_fill_needs_browser_feature() {
    hallador()
        .args([
            "fill",
            "--builtin",
            "login",
            "--url",
            "http://localhost:3000",
            "--values",
            "values.yaml",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--features browser"));
}

#[cfg(feature = "browser")]
#[test]
fn test_fill_rejects_missing_values_before_launch() {
    hallador()
        .args([
            "fill",
            "--builtin",
            "login",
            "--url",
            "http://localhost:3000",
            "--values",
            "/nonexistent/values.yaml",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

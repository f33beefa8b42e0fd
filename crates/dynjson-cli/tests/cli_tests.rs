//! Integration tests for the `dynjson` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the format, minify
//! and check subcommands through the actual binary, including stdin/stdout
//! piping, file I/O and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the sample.json fixture.
fn sample_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.json")
}

const SAMPLE_MINIFIED: &str = concat!(
    r#"{"name":"Alice","etag":"\"3f9a\"","scores":[95,87.5,-1e-7],"#,
    r#""profile":{"city":"Zürich","etag":"x","active":true,"manager":null}}"#,
);

/// Helper: a per-test output path in the system temp directory.
fn temp_output(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("dynjson-cli-{}-{name}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn dynjson() -> Command {
    Command::cargo_bin("dynjson").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Format subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn format_stdin_to_stdout() {
    dynjson()
        .arg("format")
        .write_stdin("[1,{\"a\":true}]")
        .assert()
        .success()
        .stdout("[\n  1,\n  {\n    \"a\": true\n  }\n]\n");
}

#[test]
fn format_with_indent_width() {
    dynjson()
        .args(["format", "--indent", "4"])
        .write_stdin("{\"a\":[]}")
        .assert()
        .success()
        .stdout("{\n    \"a\": []\n}\n");
}

#[test]
fn format_with_indent_zero_is_compact() {
    dynjson()
        .args(["format", "--indent", "0"])
        .write_stdin("{ \"a\" : [ 1 ] }")
        .assert()
        .success()
        .stdout("{\"a\":[1]}\n");
}

#[test]
fn format_with_indent_string() {
    dynjson()
        .args(["format", "--indent-str", "\t"])
        .write_stdin("{\"a\":1}")
        .assert()
        .success()
        .stdout("{\n\t\"a\": 1\n}\n");
}

#[test]
fn format_indent_flags_conflict() {
    dynjson()
        .args(["format", "--indent", "2", "--indent-str", "  "])
        .write_stdin("1")
        .assert()
        .failure();
}

#[test]
fn format_file_to_file() {
    let output = temp_output("format.json");
    dynjson()
        .args(["format", "-i", sample_json_path(), "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output).expect("output file must exist");
    assert!(content.starts_with("{\n  \"name\": \"Alice\",\n"));
    assert!(content.ends_with("}\n"));
    let original: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(sample_json_path()).unwrap()).unwrap();
    let formatted: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(original, formatted);
    let _ = std::fs::remove_file(&output);
}

#[test]
fn format_respects_max_depth() {
    dynjson()
        .args(["format", "--max-depth", "2"])
        .write_stdin("[[[1]]]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum nesting depth of 2"));
}

#[test]
fn format_caps_output_depth() {
    let depth = 3_000;
    dynjson()
        .args(["format", "--max-depth", "1000000"])
        .write_stdin(format!("{}0{}", "[".repeat(depth), "]".repeat(depth)))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to serialize JSON"))
        .stderr(predicate::str::contains("maximum nesting depth of 1024"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Minify subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn minify_file_to_stdout() {
    dynjson()
        .args(["minify", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(format!("{SAMPLE_MINIFIED}\n"));
}

#[test]
fn minify_with_omit_drops_members_at_any_depth() {
    dynjson()
        .args(["minify", "--omit", "etag, scores", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("etag").not())
        .stdout(predicate::str::contains("scores").not())
        .stdout(predicate::str::contains(r#""city":"Zürich""#));
}

#[test]
fn minify_with_empty_omit_keeps_everything() {
    dynjson()
        .args(["minify", "--omit", "", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout(format!("{SAMPLE_MINIFIED}\n"));
}

#[test]
fn minify_normalizes_numbers_and_escapes() {
    dynjson()
        .arg("minify")
        .write_stdin(r#"[1.0, -0, 1E21, "A\/"]"#)
        .assert()
        .success()
        .stdout("[1,0,1e+21,\"A/\"]\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Check subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_valid_input() {
    dynjson()
        .args(["check", "-i", sample_json_path()])
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_reports_syntax_error_position() {
    dynjson()
        .arg("check")
        .write_stdin("[1,2,]")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to parse JSON"))
        .stderr(predicate::str::contains(
            "SyntaxError: Unexpected token at position 5",
        ));
}

#[test]
fn check_reports_unexpected_end() {
    dynjson()
        .arg("check")
        .write_stdin("{\"a\":")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected end of string"));
}

#[test]
fn check_missing_file_fails() {
    dynjson()
        .args(["check", "-i", "/nonexistent/dynjson-input.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipelines and usage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn format_then_minify_roundtrip() {
    let formatted = dynjson()
        .args(["format", "-i", sample_json_path()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    dynjson()
        .arg("minify")
        .write_stdin(formatted)
        .assert()
        .success()
        .stdout(format!("{SAMPLE_MINIFIED}\n"));
}

#[test]
fn help_flag_shows_usage() {
    dynjson()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("format"))
        .stdout(predicate::str::contains("minify"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn missing_subcommand_fails() {
    dynjson().assert().failure();
}

#[test]
fn unknown_subcommand_fails() {
    dynjson().arg("frobnicate").assert().failure();
}

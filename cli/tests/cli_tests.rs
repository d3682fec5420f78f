//! CLI binary integration tests using assert_cmd + predicates.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("jsonschema-descriptor").expect("binary should exist")
}

fn simple_schema() -> String {
    serde_json::json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer" }
        },
        "required": ["name"]
    })
    .to_string()
}

fn recursive_document() -> String {
    serde_json::json!({
        "$defs": {
            "node": {
                "type": "object",
                "properties": {
                    "next": { "$ref": "#/$defs/node" }
                }
            }
        }
    })
    .to_string()
}

// ── Compile to File ─────────────────────────────────────────────────────────

#[test]
fn test_compile_to_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let output = dir.path().join("out.txt");

    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap()])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&output).expect("output file should exist");
    assert_eq!(
        content.trim_end(),
        r#"{"type": "object", "properties": {"name": {"type": "string"}, "age": {"type": "number", "int": true, "isOptional": true}}}"#
    );
}

// ── Compile to Stdout ───────────────────────────────────────────────────────

#[test]
fn test_compile_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "object""#));
}

// ── Pointer Compilation ─────────────────────────────────────────────────────

#[test]
fn test_compile_pointer_resolves_refs() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.json");
    let document = serde_json::json!({
        "$defs": {
            "id": { "type": "string", "minLength": 1 },
            "item": {
                "type": "object",
                "properties": { "id": { "$ref": "#/$defs/id" } },
                "required": ["id"]
            }
        }
    });
    fs::write(&input, document.to_string()).unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap()])
        .args(["--pointer", "#/$defs/item"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"type": "object", "properties": {"id": {"type": "string", "minLength": 1}}}"#,
        ));
}

#[test]
fn test_compile_pointer_missing_component() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.json");
    fs::write(&input, simple_schema()).unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap()])
        .args(["--pointer", "#/$defs/missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to compile component"));
}

// ── Cycle Control ───────────────────────────────────────────────────────────

#[test]
fn test_compile_recursive_with_depth_limit() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.json");
    fs::write(&input, recursive_document()).unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap()])
        .args(["--pointer", "#/$defs/node"])
        .args(["--depth-limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"type": "object", "properties": {"next": {"type": "object", "properties": {"next": {"type": "any"}}}}}"#,
        ));
}

// ── Annotation Switches ─────────────────────────────────────────────────────

#[test]
fn test_suppress_descriptions() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    let schema = serde_json::json!({
        "type": "string",
        "description": "a name",
        "default": "anon"
    });
    fs::write(&input, schema.to_string()).unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap(), "--suppress-descriptions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("description").not())
        .stdout(predicate::str::contains(r#""defaultValue": "anon""#));

    cmd()
        .args(["compile", input.to_str().unwrap(), "--suppress-defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("defaultValue").not())
        .stdout(predicate::str::contains(r#""description": "a name""#));
}

// ── Pretty Output ───────────────────────────────────────────────────────────

#[test]
fn test_pretty_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();

    let assert = cmd()
        .args(["compile", input.to_str().unwrap(), "--pretty"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("\n  "), "pretty output should be indented");
    let _: serde_json::Value =
        serde_json::from_str(&stdout).expect("pretty output should be valid JSON");
}

// ── Components ──────────────────────────────────────────────────────────────

#[test]
fn test_components_listing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.json");
    let document = serde_json::json!({
        "$defs": { "a": { "type": "string" } },
        "definitions": { "b": { "type": "number" } }
    });
    fs::write(&input, document.to_string()).unwrap();

    cmd()
        .args(["components", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::diff("#/$defs/a\n#/definitions/b\n"));
}

// ── Invalid Input ───────────────────────────────────────────────────────────

#[test]
fn test_invalid_input_path() {
    cmd()
        .args(["compile", "/nonexistent/path/schema.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open input file"));
}

#[test]
fn test_invalid_input_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(&input, "{ not json").unwrap();

    cmd()
        .args(["compile", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse schema"));
}

// ── Help Output ─────────────────────────────────────────────────────────────

#[test]
fn test_help_output() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("components"));
}

#[test]
fn test_compile_help() {
    cmd()
        .args(["compile", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pointer"))
        .stdout(predicate::str::contains("--depth-limit"))
        .stdout(predicate::str::contains("--suppress-descriptions"));
}

//! End-to-end tests for the `vigil` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const SCHEMA: &str = r#"{
  "rules": {
    "name|Name": "require|max:10",
    "age": "number|between:1,120",
    "email": "email"
  },
  "messages": {"age.between": ":attribute is out of range"},
  "scenes": {
    "edit": ["name", "email"],
    "adult": {"remove": {"age": "between"}, "append": {"age": "require|egt:18"}}
  }
}"#;

const TOML_SCHEMA: &str = r#"
[rules]
code = "require|alphaNum"
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("rules.json"), SCHEMA).unwrap();
        fs::write(dir.path().join("rules.toml"), TOML_SCHEMA).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn data(&self, body: &str) -> PathBuf {
        let path = self.path("data.json");
        fs::write(&path, body).unwrap();
        path
    }

    fn vigil(&self) -> Command {
        let mut cmd = Command::cargo_bin("vigil").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("VIGIL_LOG")
            .env_remove("VIGIL_CONFIG");
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_accepts_valid_data() {
    let fx = Fixture::new();
    let data = fx.data(r#"{"name": "Ann", "age": 30}"#);
    let output = fx
        .vigil()
        .args(["check", "--schema", "rules.json", "--data"])
        .arg(&data)
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["valid"], true);
    assert_eq!(body["data"]["name"], "Ann");
}

#[test]
fn test_rejection_exits_one_with_errors() {
    let fx = Fixture::new();
    let data = fx.data(r#"{"age": 500, "email": "nope"}"#);
    let output = fx
        .vigil()
        .args(["check", "-s", "rules.json", "--batch", "-d"])
        .arg(&data)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let body = stdout_json(&output);
    assert_eq!(body["valid"], false);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0]["field"], "name");
    assert_eq!(errors[0]["message"], "Name is required");
    assert_eq!(errors[1]["message"], "age is out of range");
    assert_eq!(errors[2]["rule"], "email");
}

#[test]
fn test_fail_fast_reports_one_error() {
    let fx = Fixture::new();
    let output = fx
        .vigil()
        .args(["check", "-s", "rules.json"])
        .write_stdin(r#"{"age": 500}"#)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["errors"].as_array().unwrap().len(), 1);
}

#[test]
fn test_scene_flag() {
    let fx = Fixture::new();
    fx.vigil()
        .args(["check", "-s", "rules.json", "--scene", "edit"])
        .write_stdin(r#"{"name": "Ann", "age": 500}"#)
        .assert()
        .success();

    fx.vigil()
        .args(["check", "-s", "rules.json", "--scene", "adult"])
        .write_stdin(r#"{"name": "Ann", "age": 16}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("greater than or equal to 18"));

    fx.vigil()
        .args(["check", "-s", "rules.json", "--scene", "nope"])
        .write_stdin("{}")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown scene"));
}

#[test]
fn test_security_flag() {
    let fx = Fixture::new();
    fx.vigil()
        .args(["check", "-s", "rules.json", "--security"])
        .write_stdin(r#"{"name": "Ann", "admin": true}"#)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("admin invalid"));
}

#[test]
fn test_filter_nulls_from_config_file() {
    let fx = Fixture::new();
    fs::write(fx.path("vigil.toml"), "filter_nulls = true\n").unwrap();
    let output = fx
        .vigil()
        .args(["check", "-s", "rules.json"])
        .write_stdin(r#"{"name": "Ann", "email": null, "extra": null}"#)
        .output()
        .unwrap();
    assert!(output.status.success());
    let data = &stdout_json(&output)["data"];
    assert!(data.get("email").is_none());
    assert!(data.get("extra").is_some());
}

#[test]
fn test_toml_schema() {
    let fx = Fixture::new();
    fx.vigil()
        .args(["check", "-s", "rules.toml"])
        .write_stdin(r#"{"code": "AB-1"}"#)
        .assert()
        .code(1);
}

#[test]
fn test_scenes_listing() {
    let fx = Fixture::new();
    let output = fx
        .vigil()
        .args(["scenes", "-s", "rules.json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["edit"], serde_json::json!(["name", "email"]));
    assert_eq!(body["adult"], serde_json::json!(["name", "age", "email"]));
}

#[test]
fn test_bad_inputs_exit_two() {
    let fx = Fixture::new();
    fx.vigil()
        .args(["check", "-s", "missing.json"])
        .write_stdin("{}")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read schema"));

    fx.vigil()
        .args(["check", "-s", "rules.json"])
        .write_stdin("[1, 2]")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("JSON object"));

    fx.vigil()
        .args(["--config", "absent.toml", "check", "-s", "rules.json"])
        .write_stdin("{}")
        .assert()
        .code(2);
}

//! End-to-end tests for the depshift CLI
//!
//! These tests verify:
//! - Argument handling (help, version, conflicting flags)
//! - Listing parsed dependencies without network access
//! - Exit codes and error reporting for broken dependency files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GO_MOD: &str = "module example.com/app

go 1.21

require (
\trsc.io/quote v1.4.0
\tgolang.org/x/text v0.3.0 // indirect
\texample.com/local v0.1.0
)

replace example.com/local => ../local
";

const POM: &str = r#"<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.12</version>
    </dependency>
  </dependencies>
</project>
"#;

fn depshift() -> Command {
    Command::cargo_bin("depshift").unwrap()
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

#[test]
fn test_help() {
    depshift()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Go modules and Maven"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version() {
    depshift()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("depshift "));
}

#[test]
fn test_json_conflicts_with_diff() {
    depshift()
        .args(["--json", "--diff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_list_go_dependencies() {
    let dir = project(&[("go.mod", GO_MOD)]);

    depshift()
        .arg(dir.path())
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("rsc.io/quote 1.4.0"))
        .stdout(predicate::str::contains("golang.org/x/text 0.3.0 (indirect)"));
}

#[test]
fn test_list_json() {
    let dir = project(&[("go.mod", GO_MOD), ("pom.xml", POM)]);

    let output = depshift()
        .arg(dir.path())
        .args(["--list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ecosystems = json.as_array().unwrap();
    assert_eq!(ecosystems.len(), 2);
    assert_eq!(ecosystems[0]["ecosystem"], "go_modules");
    assert_eq!(ecosystems[0]["dependencies"][0]["name"], "rsc.io/quote");
    assert_eq!(ecosystems[1]["ecosystem"], "maven");
    assert_eq!(ecosystems[1]["dependencies"][0]["name"], "junit:junit");
}

#[test]
fn test_list_only_selected_ecosystem() {
    let dir = project(&[("go.mod", GO_MOD), ("pom.xml", POM)]);

    depshift()
        .arg(dir.path())
        .args(["--list", "--maven"])
        .assert()
        .success()
        .stdout(predicate::str::contains("junit:junit 4.12"))
        .stdout(predicate::str::contains("rsc.io/quote").not());
}

#[test]
fn test_garbage_manifest_exit_code() {
    let dir = project(&[("pom.xml", "this is not xml")]);

    depshift()
        .arg(dir.path())
        .arg("--list")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pom.xml is not parseable"));
}

#[test]
fn test_dry_run_with_nothing_to_check() {
    let dir = project(&[("go.mod", GO_MOD)]);

    // only the path-replaced module is selected, so no registry is contacted
    depshift()
        .arg(dir.path())
        .args(["--dry-run", "--verbose", "--only", "example.com/local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local path dependency"))
        .stdout(predicate::str::contains("(dry-run)"));

    assert_eq!(fs::read_to_string(dir.path().join("go.mod")).unwrap(), GO_MOD);
}

#[test]
fn test_invalid_config_file() {
    let dir = project(&[("go.mod", GO_MOD), (".depshift.toml", "max_resolution_attempts = \"many\"")]);

    depshift()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(".depshift.toml"));
}

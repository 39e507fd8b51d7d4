use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn yamlfix(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("yamlfix").unwrap();
    cmd.current_dir(dir.path()).env("HOME", dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_fix_reports_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pod.yaml"), "apiVersion v1\nkind: Pod\n").unwrap();

    let output = yamlfix(&dir)
        .args(["fix", "pod.yaml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let file = &parsed.as_array().unwrap()[0];
    assert_eq!(file["filePath"], "pod.yaml");
    assert_eq!(file["isValid"], true);
    assert_eq!(file["fixed"], "apiVersion: v1\nkind: Pod\n");

    // Without --write the file is left alone.
    assert_eq!(
        fs::read_to_string(dir.path().join("pod.yaml")).unwrap(),
        "apiVersion v1\nkind: Pod\n"
    );
}

#[test]
fn test_fix_write_in_place() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("manifests")).unwrap();
    fs::write(
        dir.path().join("manifests").join("deploy.yml"),
        "kind: Deployment\nspec:\n  replicas three\n",
    )
    .unwrap();

    yamlfix(&dir)
        .args(["fix", "manifests", "--write"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy.yml"));

    assert_eq!(
        fs::read_to_string(dir.path().join("manifests").join("deploy.yml")).unwrap(),
        "kind: Deployment\nspec:\n  replicas: 3\n"
    );
}

#[test]
fn test_fix_stdin_to_stdout() {
    let dir = TempDir::new().unwrap();
    yamlfix(&dir)
        .args(["fix", "-", "--write"])
        .write_stdin("apiVersion v1\nkind: Pod\n")
        .assert()
        .success()
        .stdout("apiVersion: v1\nkind: Pod\n");
}

#[test]
fn test_fix_unfixable_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.yaml"), "kind: Pod\nfrobnicate\n").unwrap();

    yamlfix(&dir)
        .args(["fix", "bad.yaml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("UNKNOWN_FIELD"));
}

#[test]
fn test_validate_exit_codes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("good.yaml"), "apiVersion: v1\nkind: Pod\n").unwrap();
    fs::write(dir.path().join("bad.yaml"), "apiVersion v1\nkind: Pod\n").unwrap();

    yamlfix(&dir).args(["validate", "good.yaml"]).assert().success();

    yamlfix(&dir)
        .args(["validate", "bad.yaml"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("MISSING_COLON"));

    assert_eq!(
        fs::read_to_string(dir.path().join("bad.yaml")).unwrap(),
        "apiVersion v1\nkind: Pod\n"
    );
}

#[test]
fn test_config_file_sets_indent_step() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".yamlfix.toml"), "[fix]\nindent_step = 4\n").unwrap();
    fs::write(dir.path().join("a.yaml"), "spec:\n replicas: 2\n").unwrap();

    yamlfix(&dir).args(["fix", "a.yaml", "--write"]).assert().success();
    assert_eq!(
        fs::read_to_string(dir.path().join("a.yaml")).unwrap(),
        "spec:\n    replicas: 2\n"
    );

    // Flags win over the file.
    fs::write(dir.path().join("a.yaml"), "spec:\n replicas: 2\n").unwrap();
    yamlfix(&dir)
        .args(["fix", "a.yaml", "--write", "--indent-step", "2"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(dir.path().join("a.yaml")).unwrap(),
        "spec:\n  replicas: 2\n"
    );
}

#[test]
fn test_bad_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".yamlfix.toml"), "[fix\n").unwrap();
    fs::write(dir.path().join("a.yaml"), "kind: Pod\n").unwrap();

    yamlfix(&dir)
        .args(["validate", "a.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(".yamlfix.toml"));
}

#[test]
fn test_missing_path() {
    let dir = TempDir::new().unwrap();
    yamlfix(&dir)
        .args(["validate", "nope.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

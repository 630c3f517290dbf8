use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn infergate(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("infergate").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

fn empty_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("deploy.json");
    fs::write(&path, "{}").unwrap();
    path
}

#[test]
fn backends_lists_every_engine() {
    Command::cargo_bin("infergate")
        .unwrap()
        .arg("backends")
        .assert()
        .success()
        .stdout(predicate::str::contains("onnxruntime"))
        .stdout(predicate::str::contains("model.param model.bin"))
        .stdout(predicate::str::contains("snpe"));
}

#[test]
fn config_init_then_get() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deploy.json");

    infergate(&path)
        .args(["config", "init", "--backend", "ncnn", "--task", "classification"])
        .assert()
        .success();

    infergate(&path)
        .args(["config", "get", "backend_config.type"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ncnn\""));

    infergate(&path)
        .args(["config", "get", "codebase_config.task"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Classification\""));
}

#[test]
fn config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_round_trips_through_typed_config() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["config", "set", "backend_config.use_vulkan", "true"])
        .assert()
        .success();

    infergate(&path)
        .args(["config", "get", "backend_config.use_vulkan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    infergate(&path)
        .args(["config", "set", "ir_config.input_names", "not-a-list"])
        .assert()
        .failure();
}

#[test]
fn inspect_unknown_backend_fails() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["inspect", "--backend", "coreml", "model.mlmodel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported backend"));
}

#[test]
fn inspect_ncnn_with_one_artifact_fails() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["inspect", "--backend", "ncnn", "end2end.param"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires 2 artifact(s), 1 supplied"));
}

#[test]
fn inspect_sdk_without_task_fails() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["inspect", "--backend", "sdk", "model_dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing configuration"));
}

#[test]
fn inspect_external_backend_is_not_linked() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["inspect", "--backend", "tensorrt", "end2end.engine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no adapter linked"));
}

#[test]
fn inspect_without_backend_fails() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["inspect", "end2end.onnx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No backend given"));
}

#[test]
fn run_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);

    infergate(&path)
        .args(["run", "--backend", "onnxruntime", "end2end.onnx", "--input"])
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn run_missing_model_fails_at_construction() {
    let dir = TempDir::new().unwrap();
    let path = empty_config(&dir);
    let input = dir.path().join("input.json");
    fs::write(&input, r#"{"shape": [1, 2], "data": [0.5, 0.5]}"#).unwrap();

    infergate(&path)
        .args(["run", "--backend", "onnxruntime"])
        .arg(dir.path().join("missing.onnx"))
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to construct onnxruntime adapter"));
}

#[test]
fn inspect_missing_model_fails_at_construction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("deploy.json");
    fs::write(&path, r#"{"ir_config": {"output_names": ["probs"]}}"#).unwrap();

    infergate(&path)
        .args(["inspect", "--backend", "onnxruntime"])
        .arg(dir.path().join("missing.onnx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to construct onnxruntime adapter"));
}

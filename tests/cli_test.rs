//! Integration tests for the taskline binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_tasks(tasks: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let tasks_dir = temp.path().join("tasks");
    fs::create_dir_all(&tasks_dir).unwrap();
    for (name, contents) in tasks {
        fs::write(tasks_dir.join(name), contents).unwrap();
    }
    temp
}

fn taskline(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("taskline"));
    cmd.current_dir(temp.path())
        .env_remove("TASKLINE_TASKS_DIR")
        .env_remove("RUST_LOG")
        .args(["--colors", "false", "--animate", "false"]);
    cmd
}

const BUILD_TASK: &str = r#"
steps:
  - name: compile
  - name: package
    steps:
      - name: archive
"#;

const DEPLOY_TASK: &str = r#"
steps:
  - name: build
  - name: deploy
    fail: no credentials
  - name: verify
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("taskline"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--tasks-dir"))
        .stdout(predicate::str::contains("progress tree"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("taskline"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_task_name() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("taskline"));
    cmd.assert().failure();
    Ok(())
}

#[test]
fn cli_missing_task_fails_with_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[]);
    taskline(&temp)
        .arg("nope")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "the task file path doesn't exist:",
        ))
        .stderr(predicate::str::contains("nope.yml"));
    Ok(())
}

#[test]
fn cli_invalid_task_fails_with_detail() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[("broken.yml", "steps:\n  - nmae: typo\n")]);
    taskline(&temp)
        .arg("broken")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doesn't define a valid task"))
        .stderr(predicate::str::contains("broken.yml"));
    Ok(())
}

#[test]
fn cli_runs_task_and_draws_tree() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[("build.yml", BUILD_TASK)]);
    taskline(&temp)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ compile"))
        .stdout(predicate::str::contains("✓ package"))
        .stdout(predicate::str::contains("  ✓ archive"));
    Ok(())
}

#[test]
fn cli_finds_yaml_extension() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[("build.yaml", BUILD_TASK)]);
    taskline(&temp).arg("build").assert().success();
    Ok(())
}

#[test]
fn cli_tasks_dir_flag() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[]);
    let other = temp.path().join("ci");
    fs::create_dir_all(&other)?;
    fs::write(other.join("lint.yml"), "steps:\n  - name: clippy\n")?;

    taskline(&temp)
        .args(["--tasks-dir", "ci", "lint"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ clippy"));
    Ok(())
}

#[test]
fn cli_failure_exits_one_and_stops() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[("deploy.yml", DEPLOY_TASK)]);
    taskline(&temp)
        .arg("deploy")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✓ build"))
        .stdout(predicate::str::contains("✗ deploy → no credentials"))
        .stdout(predicate::str::contains("  verify"));
    Ok(())
}

#[test]
fn cli_print_false_draws_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[("build.yml", BUILD_TASK)]);
    taskline(&temp)
        .args(["--print", "false", "build"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_trailing_args_reach_commands() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[(
        "greet.yml",
        "steps:\n  - name: greet\n    run: echo \"hello ${name}\"\n",
    )]);
    taskline(&temp)
        .args(["greet", "--", "--name", "world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ greet"))
        .stdout(predicate::str::contains("hello world"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_logs_go_to_stderr_without_renderer() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[(
        "greet.yml",
        "steps:\n  - run: echo \"from the shell\"\n",
    )]);
    taskline(&temp)
        .args(["--print", "false", "greet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("from the shell"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_command_failure_reports_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[(
        "check.yml",
        "steps:\n  - name: check\n    run: exit 2\n  - name: never\n",
    )]);
    taskline(&temp)
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✗ check → Command failed"))
        .stdout(predicate::str::contains("  never"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_missing_cwd_names_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[(
        "build.yml",
        "steps:\n  - name: compile\n    run: echo hi\n    cwd: no-such-dir\n",
    )]);
    taskline(&temp)
        .arg("build")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✗ compile → Failed to run `echo hi` in no-such-dir"));
    Ok(())
}

#[test]
fn cli_unknown_variable_fails_step() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_tasks(&[(
        "vars.yml",
        "steps:\n  - name: use\n    run: echo ${missing}\n",
    )]);
    taskline(&temp)
        .arg("vars")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✗ use → Unknown variable: missing"));
    Ok(())
}

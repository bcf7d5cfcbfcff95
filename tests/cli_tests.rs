mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

use common::{setup_project, write_config};

fn plugin_matrix() -> Command {
    let mut cmd = Command::cargo_bin("plugin-matrix").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("NOX_PYTHON_VERSIONS");
    cmd
}

/// `list` prints the full matrix with the default versions and both install
/// modes for every discovered plugin.
///
/// `list` 打印完整矩阵，包含默认版本以及每个已发现插件的两种安装方式。
#[test]
fn test_list_shows_default_matrix() {
    let project = setup_project(&["example"]);

    plugin_matrix()
        .args(["--lang", "en", "list", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessions defined for this project:"))
        .stdout(predicate::str::contains("* test_core-2.7 ->"))
        .stdout(predicate::str::contains("* test_core-3.7 ->"))
        .stdout(predicate::str::contains(
            "* test_plugin-3.5(install_cmd='pip install -e .', plugin_name='example') ->",
        ))
        .stdout(predicate::str::contains("* coverage ->"));
}

#[test]
fn test_list_marks_deselected_sessions() {
    let project = setup_project(&["example"]);

    plugin_matrix()
        .args(["--lang", "en", "list", "-s", "coverage", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("* coverage ->"))
        .stdout(predicate::str::contains("- test_core-3.6 ->"));
}

#[test]
fn test_env_override_changes_versions() {
    let project = setup_project(&[]);

    plugin_matrix()
        .env("NOX_PYTHON_VERSIONS", "3.8")
        .args(["--lang", "en", "list", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("test_core-3.8"))
        .stdout(predicate::str::contains("test_core-2.7").not());
}

#[test]
fn test_list_in_chinese() {
    let project = setup_project(&[]);

    plugin_matrix()
        .args(["--lang", "zh-CN", "list", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("此项目定义的会话："));
}

#[test]
fn test_configured_language_is_used() {
    let project = setup_project(&[]);
    write_config(project.path(), "language = \"zh-CN\"\n");

    plugin_matrix()
        .args(["list", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("此项目定义的会话："));
}

#[test]
fn test_missing_plugins_directory_fails() {
    let project = setup_project(&[]);
    fs::remove_dir_all(project.path().join("plugins")).unwrap();

    plugin_matrix()
        .args(["--lang", "en", "list", "--project-dir"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

/// A session whose interpreter is not installed is skipped, and the run
/// still succeeds.
///
/// 解释器未安装的会话会被跳过，运行仍然成功。
#[test]
fn test_missing_interpreter_is_skipped() {
    let project = setup_project(&[]);

    plugin_matrix()
        .env("NOX_PYTHON_VERSIONS", "0.1")
        .args(["--lang", "en", "run", "-s", "test_core", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("test_core-0.1"))
        .stdout(predicate::str::contains("Interpreter python0.1 not found"))
        .stdout(predicate::str::contains("ALL SESSIONS PASSED"));
}

#[test]
fn test_missing_interpreter_fails_when_requested() {
    let project = setup_project(&[]);

    plugin_matrix()
        .env("NOX_PYTHON_VERSIONS", "0.1")
        .args([
            "--lang",
            "en",
            "run",
            "-s",
            "test_core",
            "--error-on-missing-interpreters",
            "--project-dir",
        ])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed sessions: test_core-0.1"));
}

#[test]
fn test_run_writes_json_report() {
    let project = setup_project(&[]);
    let report = project.path().join("report.json");

    plugin_matrix()
        .env("NOX_PYTHON_VERSIONS", "0.1")
        .args(["--lang", "en", "run", "-s", "test_core", "--json"])
        .arg(&report)
        .arg("--project-dir")
        .arg(project.path())
        .assert()
        .success();

    let content = fs::read_to_string(&report).unwrap();
    assert!(content.contains("\"skipped\": 1"));
}

#[test]
fn test_nothing_selected_is_a_success() {
    let project = setup_project(&[]);

    plugin_matrix()
        .args(["--lang", "en", "run", "-k", "no-such-session", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions to run."));
}

#[test]
fn test_runner_index_requires_total() {
    let project = setup_project(&[]);

    plugin_matrix()
        .args(["--lang", "en", "run", "--runner-index", "0", "--project-dir"])
        .arg(project.path())
        .assert()
        .failure();
}

#[test]
fn test_init_non_interactive_writes_defaults() {
    let project = setup_project(&[]);
    let config_path = project.path().join("SessionMatrix.toml");

    plugin_matrix()
        .args(["--lang", "en", "init", "--non-interactive", "--project-dir"])
        .arg(project.path())
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("python_versions"));
    assert!(content.contains("pip install -e ."));
    assert!(content.contains("fail_under = 80"));
}

#[test]
fn test_init_keeps_existing_file_without_force() {
    let project = setup_project(&[]);
    let config_path = write_config(project.path(), "python_versions = [\"3.9\"]\n");

    plugin_matrix()
        .args(["--lang", "en", "init", "--non-interactive", "--project-dir"])
        .arg(project.path())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "python_versions = [\"3.9\"]\n"
    );

    plugin_matrix()
        .args(["--lang", "en", "init", "--non-interactive", "--force", "--project-dir"])
        .arg(project.path())
        .assert()
        .success();
    assert!(fs::read_to_string(&config_path).unwrap().contains("3.7"));
}

/// Shell scripts standing in for the interpreter, `virtualenv`, `pip` and
/// `pytest`, so `run` can execute a whole session without Python installed.
#[cfg(unix)]
fn fake_toolchain(root: &std::path::Path, pytest_body: &str) -> std::ffi::OsString {
    use std::os::unix::fs::PermissionsExt;

    let bin = root.join("fake-bin");
    fs::create_dir_all(&bin).unwrap();
    let scripts = [
        ("python9.9", "exit 0"),
        ("virtualenv", "mkdir -p \"$3\""),
        ("pip", "echo \"pip $*\""),
        ("pytest", pytest_body),
    ];
    for (name, body) in scripts {
        let path = bin.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let mut paths = vec![bin];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).unwrap()
}

#[cfg(unix)]
#[test]
fn test_verbose_prints_captured_output() {
    let project = setup_project(&[]);
    let path = fake_toolchain(project.path(), "echo 'collected 3 items'");

    plugin_matrix()
        .env("PATH", &path)
        .env("NOX_PYTHON_VERSIONS", "9.9")
        .args(["--lang", "en", "run", "-s", "test_core", "-v", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("collected 3 items"))
        .stdout(predicate::str::contains("ALL SESSIONS PASSED"));

    plugin_matrix()
        .env("PATH", &path)
        .env("NOX_PYTHON_VERSIONS", "9.9")
        .args(["--lang", "en", "run", "-s", "test_core", "--project-dir"])
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("collected 3 items").not());
}

/// Ctrl-C during a session stops the run with a failing exit code.
///
/// 会话期间按下 Ctrl-C 会以失败退出码停止运行。
#[cfg(unix)]
#[test]
fn test_interrupted_run_exits_with_failure() {
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    let project = setup_project(&[]);
    let marker = project.path().join("pytest-started");
    let pytest_body = format!("touch '{}'\nexec sleep 30", marker.display());
    let path = fake_toolchain(project.path(), &pytest_body);

    let child = Command::new(assert_cmd::cargo::cargo_bin("plugin-matrix"))
        .env("NO_COLOR", "1")
        .env("PATH", &path)
        .env("NOX_PYTHON_VERSIONS", "9.9")
        .args(["--lang", "en", "run", "-s", "test_core", "--project-dir"])
        .arg(project.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(20);
    while !marker.exists() {
        assert!(Instant::now() < deadline, "pytest never started");
        std::thread::sleep(Duration::from_millis(50));
    }

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("interrupted"), "stdout: {}", stdout);
    assert!(!stdout.contains("ALL SESSIONS PASSED"));
    assert!(stderr.contains("Run interrupted"), "stderr: {}", stderr);
}

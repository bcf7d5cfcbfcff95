// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use plugin_matrix::core::config::VenvBackend;
use plugin_matrix::core::discovery;
use plugin_matrix::core::execution::RunOptions;
use plugin_matrix::core::session::SessionOptions;
use plugin_matrix::core::sessions::ProjectLayout;
use plugin_matrix::infra::command::{Captured, CommandRunner, Invocation};
use tempfile::{TempDir, tempdir};

/// A command runner that records every invocation and answers from a script
/// instead of spawning processes.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<Invocation>>,
    exact: Vec<(String, Captured)>,
    containing: Vec<(String, Captured)>,
    slow: Vec<(String, Duration)>,
    missing: Vec<String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `captured` when the command line equals `command`.
    pub fn respond_exact(mut self, command: &str, captured: Captured) -> Self {
        self.exact.push((command.to_string(), captured));
        self
    }

    /// Answer `captured` when the command line contains `needle`.
    pub fn respond_containing(mut self, needle: &str, captured: Captured) -> Self {
        self.containing.push((needle.to_string(), captured));
        self
    }

    /// Sleep for `delay` before answering a command line that contains `needle`.
    pub fn respond_slowly(mut self, needle: &str, delay: Duration) -> Self {
        self.slow.push((needle.to_string(), delay));
        self
    }

    /// Pretend `program` is not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines in call order, arguments joined by single spaces.
    pub fn commands(&self) -> Vec<String> {
        self.invocations().iter().map(command_line).collect()
    }
}

/// Program and arguments joined by single spaces, without shell quoting.
pub fn command_line(invocation: &Invocation) -> String {
    std::iter::once(invocation.program.as_str())
        .chain(invocation.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<Captured> {
        let line = command_line(invocation);
        self.calls.lock().unwrap().push(invocation.clone());

        let delay = self
            .slow
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((_, captured)) = self.exact.iter().find(|(command, _)| *command == line) {
            return Ok(captured.clone());
        }
        if let Some((_, captured)) = self
            .containing
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
        {
            return Ok(captured.clone());
        }
        Ok(Captured::ok(""))
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        if self.missing.iter().any(|m| m == program) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(program))
        }
    }
}

/// Classifier output of a plugin that supports the given versions.
pub fn classifiers_for(versions: &[&str]) -> String {
    let mut out = String::from("Development Status :: 4 - Beta\nProgramming Language :: Python\n");
    for version in versions {
        out.push_str(&format!("Programming Language :: Python :: {}\n", version));
    }
    out.push_str("Operating System :: OS Independent\n");
    out
}

/// Creates a project with a `plugins/` directory holding the given plugins,
/// each with a stub `setup.py`.
pub fn setup_project(plugins: &[&str]) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let root = temp_dir.path();
    fs::write(root.join("setup.py"), "from setuptools import setup\nsetup(name='hydra')\n")
        .expect("Failed to write setup.py");

    let plugins_root = root.join("plugins");
    fs::create_dir_all(&plugins_root).expect("Failed to create plugins directory");
    for plugin in plugins {
        let dir = plugins_root.join(plugin);
        fs::create_dir_all(&dir).expect("Failed to create plugin directory");
        fs::write(
            dir.join("setup.py"),
            format!("from setuptools import setup\nsetup(name='{}')\n", plugin),
        )
        .expect("Failed to write plugin setup.py");
    }
    temp_dir
}

/// Writes a `SessionMatrix.toml` into the project.
pub fn write_config(root: &Path, content: &str) -> PathBuf {
    let path = root.join("SessionMatrix.toml");
    fs::write(&path, content).expect("Failed to write SessionMatrix.toml");
    path
}

pub fn layout_for(root: &Path) -> ProjectLayout {
    ProjectLayout {
        root: root.to_path_buf(),
        plugins_dir: PathBuf::from("plugins"),
        plugins: discovery::all_plugins(&root.join("plugins"), "hydra_plugins")
            .expect("Failed to discover plugins"),
        core_import: "from hydra import Hydra".to_string(),
        fail_under: 80,
    }
}

pub fn run_options(root: &Path) -> RunOptions {
    RunOptions {
        env_root: root.join(".nox"),
        venv_backend: VenvBackend::Virtualenv,
        default_interpreter: "python3".to_string(),
        session: SessionOptions::default(),
        error_on_missing_interpreters: false,
        stop_on_first_error: false,
    }
}

//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the session
//! runner: install commands, discovered plugins, planned sessions and the
//! result of running one.
//!
//! 此模块定义了整个会话运行器中使用的核心数据结构：
//! 安装命令、已发现的插件、计划的会话以及运行会话的结果。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::infra::t;

/// One way of installing a plugin, e.g. `pip install -e .`. The plugin path is
/// appended as the last argument, so the default commands install
/// `pip install -e . plugins/<name>`.
///
/// 一种安装插件的方式，例如 `pip install -e .`。插件路径作为最后一个参数追加。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallCommand {
    argv: Vec<String>,
}

impl InstallCommand {
    /// `argv` must not be empty.
    pub fn new(argv: Vec<String>) -> Self {
        debug_assert!(!argv.is_empty());
        Self { argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// The full command line for installing the package at `target`.
    /// 安装 `target` 处软件包的完整命令行。
    pub fn for_target(&self, target: &str) -> Vec<String> {
        let mut argv = self.argv.clone();
        argv.push(target.to_string());
        argv
    }
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// A plugin found under the plugins directory.
/// 在插件目录下找到的插件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    /// Directory name, also used as the session parameter.
    /// 目录名称，同时用作会话参数。
    pub name: String,
    /// Fully qualified Python module, e.g. `hydra_plugins.example`.
    /// 完全限定的 Python 模块，例如 `hydra_plugins.example`。
    pub module: String,
}

/// What a session does.
/// 会话的类型。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionKind {
    /// Install and test the core library.
    TestCore,
    /// Install the core library and every plugin with `install_cmd`, then
    /// test `plugin_name`.
    TestPlugin {
        install_cmd: InstallCommand,
        plugin_name: String,
    },
    /// Aggregate coverage over the core library and all plugins.
    Coverage,
}

impl SessionKind {
    /// The session name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            SessionKind::TestCore => "test_core",
            SessionKind::TestPlugin { .. } => "test_plugin",
            SessionKind::Coverage => "coverage",
        }
    }

    /// Localized one-line description shown by `list`.
    /// `list` 命令显示的本地化单行描述。
    pub fn description(&self) -> String {
        match self {
            SessionKind::TestCore => t!("session.describe_test_core").to_string(),
            SessionKind::TestPlugin { .. } => t!("session.describe_test_plugin").to_string(),
            SessionKind::Coverage => t!("session.describe_coverage").to_string(),
        }
    }
}

/// One entry of the session matrix.
/// 会话矩阵中的一个条目。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionSpec {
    pub kind: SessionKind,
    /// Interpreter version, `None` for sessions that use the default interpreter.
    /// 解释器版本，使用默认解释器的会话为 `None`。
    pub python: Option<String>,
}

impl SessionSpec {
    pub fn new(kind: SessionKind, python: Option<String>) -> Self {
        Self { kind, python }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Unique identifier, e.g. `test_core-3.6` or
    /// `test_plugin-3.6(install_cmd='pip install .', plugin_name='example')`.
    ///
    /// 唯一标识符。
    pub fn id(&self) -> String {
        let mut id = self.name().to_string();
        if let Some(python) = &self.python {
            id.push('-');
            id.push_str(python);
        }
        if let SessionKind::TestPlugin {
            install_cmd,
            plugin_name,
        } = &self.kind
        {
            id.push_str(&format!(
                "(install_cmd='{}', plugin_name='{}')",
                install_cmd, plugin_name
            ));
        }
        id
    }
}

impl fmt::Display for SessionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Why a session did not succeed, in terms a report can show.
/// 会话未成功的原因，以报告可以显示的形式。
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Failure {
    /// The command that failed, as typed. Empty when the session broke
    /// before any command ran.
    pub command: String,
    /// Exit code of that command, if it exited normally.
    pub code: Option<i32>,
    /// Human-readable summary.
    pub message: String,
    /// Captured output of the failing command.
    pub output: String,
}

/// Represents the final result of a single session.
///
/// 表示单个会话的最终结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionResult {
    /// Every command of the session exited successfully.
    /// 会话的每个命令都成功退出。
    Success { session: SessionSpec, duration: Duration },
    /// The session decided not to run, e.g. because the plugin does not
    /// support the interpreter, or the interpreter is missing.
    /// 会话决定不运行，例如插件不支持该解释器，或解释器缺失。
    Skipped {
        session: SessionSpec,
        reason: String,
        duration: Duration,
    },
    /// A command failed; nothing after it ran.
    /// 某个命令失败；其后的命令均未运行。
    Failed {
        session: SessionSpec,
        failure: Failure,
        duration: Duration,
    },
}

impl SessionResult {
    pub fn session(&self) -> &SessionSpec {
        match self {
            SessionResult::Success { session, .. }
            | SessionResult::Skipped { session, .. }
            | SessionResult::Failed { session, .. } => session,
        }
    }

    pub fn session_id(&self) -> String {
        self.session().id()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SessionResult::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SessionResult::Skipped { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SessionResult::Success { .. })
    }

    pub fn duration(&self) -> Duration {
        match self {
            SessionResult::Success { duration, .. }
            | SessionResult::Skipped { duration, .. }
            | SessionResult::Failed { duration, .. } => *duration,
        }
    }

    /// Machine-friendly status used by the JSON report and CSS classes.
    pub fn status_key(&self) -> &'static str {
        match self {
            SessionResult::Success { .. } => "success",
            SessionResult::Skipped { .. } => "skipped",
            SessionResult::Failed { .. } => "failed",
        }
    }

    /// Gets the status of the result as a localized string for display.
    /// 以本地化字符串形式获取结果状态以供显示。
    pub fn status_str(&self) -> String {
        match self {
            SessionResult::Success { .. } => t!("report.status_success").to_string(),
            SessionResult::Skipped { .. } => t!("report.status_skipped").to_string(),
            SessionResult::Failed { .. } => t!("report.status_failed").to_string(),
        }
    }

    /// Skip reason or failure message; empty for successful sessions.
    /// 跳过原因或失败消息；成功的会话为空。
    pub fn detail(&self) -> &str {
        match self {
            SessionResult::Success { .. } => "",
            SessionResult::Skipped { reason, .. } => reason,
            SessionResult::Failed { failure, .. } => &failure.message,
        }
    }

    /// Captured output of the failing command, if any.
    pub fn output(&self) -> &str {
        match self {
            SessionResult::Failed { failure, .. } => &failure.output,
            _ => "",
        }
    }
}

impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            "" => write!(f, "{}: {}", self.session_id(), self.status_key()),
            detail => write!(f, "{}: {} ({})", self.session_id(), self.status_key(), detail),
        }
    }
}

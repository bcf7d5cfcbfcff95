//! # Session Planner Module / 会话计划模块
//!
//! This module expands the configuration into the full session matrix,
//! applies the command-line selection and, on CI, splits the result across
//! several runner processes.
//!
//! 此模块将配置展开为完整的会话矩阵，应用命令行选择，
//! 并在 CI 上将结果分配给多个运行器进程。

use anyhow::{Result, bail};

use crate::core::models::{InstallCommand, SessionKind, SessionSpec};
use crate::infra::t;

/// Builds every session in definition order: `test_core` for each version,
/// then `test_plugin` for each version × install command × plugin, then a
/// single `coverage` session.
///
/// Duplicate versions, install commands or plugin names are collapsed, so
/// each combination appears exactly once.
///
/// 按定义顺序构建所有会话：每个版本的 `test_core`，
/// 然后是每个版本 × 安装命令 × 插件的 `test_plugin`，最后是单个 `coverage` 会话。
pub fn expand_sessions(
    python_versions: &[String],
    install_commands: &[InstallCommand],
    plugin_names: &[String],
) -> Vec<SessionSpec> {
    let python_versions = unique(python_versions);
    let install_commands = unique(install_commands);
    let plugin_names = unique(plugin_names);

    let mut sessions = Vec::with_capacity(
        python_versions.len() * (1 + install_commands.len() * plugin_names.len()) + 1,
    );

    for python in &python_versions {
        sessions.push(SessionSpec::new(SessionKind::TestCore, Some(python.clone())));
    }

    for python in &python_versions {
        for install_cmd in &install_commands {
            for plugin_name in &plugin_names {
                sessions.push(SessionSpec::new(
                    SessionKind::TestPlugin {
                        install_cmd: install_cmd.clone(),
                        plugin_name: plugin_name.clone(),
                    },
                    Some(python.clone()),
                ));
            }
        }
    }

    sessions.push(SessionSpec::new(SessionKind::Coverage, None));
    sessions
}

fn unique<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// Command-line session selection. Empty lists select everything.
/// 命令行会话选择。空列表表示全部选择。
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// `--session`: a session name (`test_plugin`) or a full session id.
    pub sessions: Vec<String>,
    /// `--python`: interpreter versions. Sessions without a version are
    /// deselected when this is non-empty.
    pub pythons: Vec<String>,
    /// `--keyword`: substrings that must all appear in the session id.
    pub keywords: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.pythons.is_empty() && self.keywords.is_empty()
    }

    pub fn matches(&self, session: &SessionSpec) -> bool {
        let id = session.id();

        let by_name = self.sessions.is_empty()
            || self
                .sessions
                .iter()
                .any(|wanted| wanted == session.name() || *wanted == id);

        let by_python = self.pythons.is_empty()
            || session
                .python
                .as_ref()
                .is_some_and(|python| self.pythons.contains(python));

        let by_keyword = self.keywords.iter().all(|keyword| id.contains(keyword.as_str()));

        by_name && by_python && by_keyword
    }
}

/// Represents a complete execution plan for one runner process.
/// 表示一个运行器进程的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Sessions this process runs, in order.
    /// 此进程按顺序运行的会话。
    pub sessions_to_run: Vec<SessionSpec>,
    /// Sessions in the matrix that the selection excluded.
    /// 被选择条件排除的矩阵会话数量。
    pub deselected_count: usize,
    /// Whether the sessions are split across multiple runners (CI environment).
    /// 会话是否分布在多个运行器上（CI 环境）。
    pub is_distributed: bool,
}

/// Creates an execution plan from the expanded matrix.
///
/// With `total_runners` and `runner_index`, the selected sessions are dealt
/// round-robin so that separate processes together cover the matrix once.
///
/// 根据展开的矩阵创建执行计划。提供 `total_runners` 和 `runner_index` 时，
/// 选中的会话以轮询方式分配，使各独立进程合起来恰好覆盖矩阵一次。
pub fn plan_execution(
    matrix: Vec<SessionSpec>,
    selection: &Selection,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let total = matrix.len();
    let selected: Vec<SessionSpec> = matrix
        .into_iter()
        .filter(|session| selection.matches(session))
        .collect();
    let deselected_count = total - selected.len();

    let (sessions_to_run, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("{}", t!("plan.runner_index_out_of_range"));
            }
            let distributed = selected
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, session)| session)
                .collect();
            (distributed, true)
        }
        (None, None) => (selected, false),
        _ => bail!("{}", t!("plan.runner_args_incomplete")),
    };

    Ok(ExecutionPlan {
        sessions_to_run,
        deselected_count,
        is_distributed,
    })
}

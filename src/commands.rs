//! # Commands Module / 命令模块
//!
//! Implementations of the CLI subcommands, plus the project loading shared by
//! `run` and `list`.
//!
//! CLI 子命令的实现，以及 `run` 和 `list` 共用的项目加载逻辑。

pub mod init;
pub mod list;
pub mod run;

use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::path::{Path, PathBuf};

use crate::core::config::{PYTHON_VERSIONS_ENV, SessionMatrix};
use crate::core::models::SessionSpec;
use crate::core::planner::{self, Selection};
use crate::core::{discovery, sessions::ProjectLayout};
use crate::infra::{fs as infra_fs, t};

/// Arguments shared by every command that needs the session matrix.
/// 所有需要会话矩阵的命令共享的参数。
#[derive(Debug, Clone, Default)]
pub struct ProjectArgs {
    pub project_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub selection: Selection,
    /// `--lang` was given; the configured language must not override it.
    pub explicit_language: bool,
}

/// A project with its configuration loaded and its matrix expanded.
/// 已加载配置并展开矩阵的项目。
#[derive(Debug)]
pub struct LoadedProject {
    pub config: SessionMatrix,
    pub config_path: Option<PathBuf>,
    pub layout: ProjectLayout,
    pub python_versions: Vec<String>,
    pub matrix: Vec<SessionSpec>,
}

/// Resolves the project root, loads the configuration, discovers plugins and
/// expands the full session matrix.
///
/// 解析项目根目录、加载配置、发现插件并展开完整的会话矩阵。
pub fn load_project(args: &ProjectArgs) -> Result<LoadedProject> {
    let project_root = infra_fs::absolute_path(&args.project_dir)
        .with_context(|| t!("project.dir_not_found", path = args.project_dir.display()).to_string())?;

    let (config, config_path) = SessionMatrix::resolve(args.config.as_deref(), &project_root)?;
    if config_path.is_some() && !args.explicit_language {
        rust_i18n::set_locale(crate::resolve_locale(&config.language));
    }

    let env_versions = env::var(PYTHON_VERSIONS_ENV).ok();
    let python_versions = config.effective_python_versions(env_versions.as_deref());
    let install_commands = config.parsed_install_commands()?;

    let plugins_root = config.project_path(&project_root, &config.plugins_dir)?;
    let plugins = discovery::all_plugins(&plugins_root, &config.plugin_namespace)?;
    let plugin_names: Vec<String> = plugins.iter().map(|p| p.name.clone()).collect();

    let matrix = planner::expand_sessions(&python_versions, &install_commands, &plugin_names);

    let layout = ProjectLayout {
        plugins_dir: relative_to(&plugins_root, &project_root),
        root: project_root,
        plugins,
        core_import: config.core_import.clone(),
        fail_under: config.coverage.fail_under,
    };

    Ok(LoadedProject {
        config,
        config_path,
        layout,
        python_versions,
        matrix,
    })
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Prints where the project and its configuration were found.
pub fn print_project_banner(project: &LoadedProject) {
    println!(
        "{}",
        t!("project.root_detected", path = project.layout.root.display())
    );
    match &project.config_path {
        Some(path) => println!("{}", t!("project.config_loaded", path = path.display())),
        None => println!("{}", t!("project.config_defaults").dimmed()),
    }
    println!(
        "{}",
        t!(
            "project.python_versions",
            versions = project.python_versions.join(", ")
        )
        .cyan()
    );
    println!(
        "{}",
        t!("project.plugins_found", count = project.layout.plugins.len()).cyan()
    );
}

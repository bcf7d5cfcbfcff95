//! # Configuration Module / 配置模块
//!
//! Loads `SessionMatrix.toml`, the file that describes the project layout and
//! the session matrix. Every field has a default, so an empty file (or no file
//! at all) gives the stock matrix: Python 2.7, 3.5, 3.6 and 3.7, plugins under
//! `plugins/`, installed with `pip install .` and `pip install -e .`.
//!
//! 加载 `SessionMatrix.toml`，该文件描述项目布局和会话矩阵。
//! 每个字段都有默认值，因此空文件（或没有文件）会得到默认矩阵。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::models::InstallCommand;
use crate::infra::t;

/// Environment variable that overrides the interpreter version list.
/// 覆盖解释器版本列表的环境变量。
pub const PYTHON_VERSIONS_ENV: &str = "NOX_PYTHON_VERSIONS";

/// File looked up in the project directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "SessionMatrix.toml";

pub const DEFAULT_PYTHON_VERSIONS: [&str; 4] = ["2.7", "3.5", "3.6", "3.7"];

pub const DEFAULT_INSTALL_COMMANDS: [&str; 2] = ["pip install .", "pip install -e ."];

/// How session virtualenvs are created.
/// 会话虚拟环境的创建方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VenvBackend {
    /// `virtualenv -p pythonX.Y <dir>`; works for Python 2 as well.
    #[default]
    Virtualenv,
    /// `pythonX.Y -m venv <dir>`
    Venv,
}

/// Settings of the coverage session.
/// 覆盖率会话的设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Minimum total coverage percentage passed to `coverage report --fail-under`.
    /// 传递给 `coverage report --fail-under` 的最低总覆盖率百分比。
    pub fail_under: u8,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self { fail_under: 80 }
    }
}

/// Represents the entire session matrix configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个会话矩阵配置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionMatrix {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    pub language: String,

    /// Interpreter versions the parametrized sessions run on.
    /// Overridden by `NOX_PYTHON_VERSIONS` when that is set.
    /// 参数化会话所运行的解释器版本。设置 `NOX_PYTHON_VERSIONS` 时会被其覆盖。
    pub python_versions: Vec<String>,

    /// Interpreter used by sessions that are not parametrized by version.
    /// 未按版本参数化的会话所使用的解释器。
    pub default_interpreter: String,

    /// Directory holding one subdirectory per plugin, relative to the project root.
    /// 每个插件一个子目录的目录，相对于项目根目录。
    pub plugins_dir: String,

    /// Python namespace package the plugins are importable under.
    /// 插件可被导入的 Python 命名空间包。
    pub plugin_namespace: String,

    /// Python statement that must succeed once the core library is installed.
    /// 核心库安装后必须成功执行的 Python 语句。
    pub core_import: String,

    /// The ways each plugin is installed in `test_plugin` sessions.
    /// `test_plugin` 会话中安装每个插件的方式。
    pub install_commands: Vec<String>,

    /// Root directory for session virtualenvs, relative to the project root.
    /// 会话虚拟环境的根目录，相对于项目根目录。
    pub envdir: String,

    pub venv_backend: VenvBackend,

    pub coverage: CoverageConfig,
}

impl Default for SessionMatrix {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            python_versions: DEFAULT_PYTHON_VERSIONS.iter().map(|v| v.to_string()).collect(),
            default_interpreter: "python3".to_string(),
            plugins_dir: "plugins".to_string(),
            plugin_namespace: "hydra_plugins".to_string(),
            core_import: "from hydra import Hydra".to_string(),
            install_commands: DEFAULT_INSTALL_COMMANDS.iter().map(|c| c.to_string()).collect(),
            envdir: ".nox".to_string(),
            venv_backend: VenvBackend::default(),
            coverage: CoverageConfig::default(),
        }
    }
}

impl SessionMatrix {
    /// Reads and parses a configuration file.
    /// 读取并解析配置文件。
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| t!("config.parse_failed").to_string())
    }

    /// Finds the configuration for a project.
    ///
    /// An explicit path must exist. Without one, `SessionMatrix.toml` in the
    /// project root is used when present, and the defaults otherwise.
    /// Returns the configuration and the file it came from, if any.
    ///
    /// 查找项目的配置。显式路径必须存在；否则如果项目根目录中存在
    /// `SessionMatrix.toml` 则使用它，不存在则使用默认值。
    pub fn resolve(explicit: Option<&Path>, project_root: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let path = fs::canonicalize(path)
                .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
            return Ok((Self::load(&path)?, Some(path)));
        }

        let candidate = project_root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Ok((Self::load(&candidate)?, Some(candidate)))
        } else {
            Ok((Self::default(), None))
        }
    }

    /// The interpreter versions to parametrize over.
    ///
    /// `env_override` is the raw value of `NOX_PYTHON_VERSIONS`; when present
    /// it replaces the configured list. Entries are trimmed, empty entries are
    /// dropped and duplicates keep their first position.
    ///
    /// 需要参数化的解释器版本。`env_override` 是 `NOX_PYTHON_VERSIONS` 的原始值。
    pub fn effective_python_versions(&self, env_override: Option<&str>) -> Vec<String> {
        let versions: Vec<String> = match env_override {
            Some(raw) => raw.split(',').map(|v| v.trim().to_string()).collect(),
            None => self.python_versions.iter().map(|v| v.trim().to_string()).collect(),
        };

        let mut unique: Vec<String> = Vec::with_capacity(versions.len());
        for version in versions {
            if !version.is_empty() && !unique.contains(&version) {
                unique.push(version);
            }
        }
        unique
    }

    /// Parses the configured install commands into argument vectors.
    /// Environment variables and `~` are expanded before shell-style splitting.
    ///
    /// 将配置的安装命令解析为参数向量。在按 shell 规则拆分前展开环境变量和 `~`。
    pub fn parsed_install_commands(&self) -> Result<Vec<InstallCommand>> {
        let mut commands: Vec<InstallCommand> = Vec::with_capacity(self.install_commands.len());
        for raw in &self.install_commands {
            let expanded = shellexpand::full(raw)
                .with_context(|| t!("config.expand_failed", command = raw).to_string())?;
            let argv = shlex::split(&expanded)
                .ok_or_else(|| anyhow::anyhow!("{}", t!("config.command_parse_failed", command = raw)))?;
            if argv.is_empty() {
                bail!("{}", t!("config.command_empty"));
            }
            let command = InstallCommand::new(argv);
            if !commands.contains(&command) {
                commands.push(command);
            }
        }
        if commands.is_empty() {
            bail!("{}", t!("config.no_install_commands"));
        }
        Ok(commands)
    }

    /// Expands `~` and environment variables in a configured path and anchors
    /// relative paths at the project root.
    /// 展开配置路径中的 `~` 和环境变量，并将相对路径锚定到项目根目录。
    pub fn project_path(&self, project_root: &Path, configured: &str) -> Result<PathBuf> {
        let expanded = shellexpand::full(configured)
            .with_context(|| t!("config.expand_failed", command = configured).to_string())?;
        Ok(project_root.join(&*expanded))
    }
}

//! # Sessions Module / 会话定义模块
//!
//! The bodies of the three sessions. Each one is a straight sequence of
//! installer, interpreter and test-runner calls; the first failing call ends
//! the session.
//!
//! 三个会话的主体。每个会话都是安装器、解释器和测试运行器调用的直接序列；
//! 第一个失败的调用会结束会话。

use std::path::{Path, PathBuf};

use crate::core::classifiers;
use crate::core::models::{InstallCommand, Plugin};
use crate::core::session::{Session, SessionError};
use crate::infra::command::CommandRunner;

/// Where things live in the project under test.
/// 被测项目中各部分的位置。
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Absolute project root; sessions start here.
    pub root: PathBuf,
    /// Plugins directory as configured, relative to `root`.
    pub plugins_dir: PathBuf,
    /// Every discovered plugin, sorted by name.
    pub plugins: Vec<Plugin>,
    /// Import statement proving the core library is installed.
    pub core_import: String,
    /// Threshold for `coverage report --fail-under`.
    pub fail_under: u8,
}

impl ProjectLayout {
    /// Path of a plugin relative to the project root, as passed to installers.
    pub fn plugin_path(&self, plugin_name: &str) -> String {
        self.plugins_dir.join(plugin_name).to_string_lossy().into_owned()
    }

    pub fn plugin_dir(&self, plugin_name: &str) -> PathBuf {
        self.root.join(&self.plugins_dir).join(plugin_name)
    }
}

const UPGRADE_INSTALLER: [&str; 3] = ["--upgrade", "setuptools", "pip"];

/// Installs the core library into the environment and runs its tests.
///
/// 将核心库安装到环境中并运行其测试。
pub async fn test_core<R: CommandRunner>(
    session: &mut Session<'_, R>,
    layout: &ProjectLayout,
) -> Result<(), SessionError> {
    session.install(&UPGRADE_INSTALLER).await?;
    session.install(&["pytest"]).await?;
    session.chdir(&layout.root);
    session.run(&["pip", "install", "."], true).await?;
    session.run(&["pytest"], true).await?;
    Ok(())
}

/// Installs the core library and every plugin with `install_cmd`, checks that
/// everything imports, then runs the tests of one plugin.
///
/// The session is skipped when the plugin does not declare the session's
/// interpreter version among its classifiers.
///
/// 使用 `install_cmd` 安装核心库和每个插件，检查所有内容均可导入，然后运行某个插件的测试。
/// 当插件的分类器中未声明会话的解释器版本时，跳过该会话。
pub async fn test_plugin<R: CommandRunner>(
    session: &mut Session<'_, R>,
    layout: &ProjectLayout,
    install_cmd: &InstallCommand,
    plugin_name: &str,
) -> Result<(), SessionError> {
    session.install(&UPGRADE_INSTALLER).await?;

    let setup_py = layout.plugin_dir(plugin_name).join("setup.py");
    let supported = plugin_python_versions(session, &setup_py).await?;
    let python = session.python().unwrap_or_default().to_string();
    if !classifiers::is_supported(&python, &supported) {
        return session.skip(classifiers::skip_reason(plugin_name, &python, &supported));
    }

    // clean install of the core library
    session.chdir(&layout.root);
    session.run(&["python", "setup.py", "clean"], true).await?;
    session.run(&["pip", "install", "."], true).await?;

    for plugin in &layout.plugins {
        let argv = install_cmd.for_target(&layout.plugin_path(&plugin.name));
        session.run(&argv, true).await?;
    }

    session.run(&["python", "-c", layout.core_import.as_str()], true).await?;
    for plugin in &layout.plugins {
        let import = format!("import {}", plugin.module);
        session.run(&["python", "-c", import.as_str()], false).await?;
    }

    session.chdir(layout.plugin_dir(plugin_name));
    session.install(&["pytest"]).await?;
    session.run(&["pytest"], true).await?;
    Ok(())
}

/// Runs every test suite under `coverage` and enforces the threshold.
///
/// 在 `coverage` 下运行所有测试套件并强制执行阈值。
pub async fn coverage<R: CommandRunner>(
    session: &mut Session<'_, R>,
    layout: &ProjectLayout,
) -> Result<(), SessionError> {
    session.install(&UPGRADE_INSTALLER).await?;
    session.install(&["coverage", "pytest"]).await?;
    session.run(&["python", "setup.py", "clean"], true).await?;

    session.run(&["pip", "install", "-e", "."], true).await?;
    for plugin in &layout.plugins {
        let path = layout.plugin_path(&plugin.name);
        session.run(&["pip", "install", "-e", path.as_str()], true).await?;
    }

    session.run(&["coverage", "erase"], false).await?;
    session
        .run(&["coverage", "run", "--append", "-m", "pytest"], true)
        .await?;
    for plugin in &layout.plugins {
        let path = layout.plugin_path(&plugin.name);
        session
            .run(&["coverage", "run", "--append", "-m", "pytest", path.as_str()], true)
            .await?;
    }

    let fail_under = format!("--fail-under={}", layout.fail_under);
    session
        .run(&["coverage", "report", fail_under.as_str()], false)
        .await?;
    session.run(&["coverage", "erase"], false).await?;
    Ok(())
}

/// Asks a plugin's `setup.py` which interpreter versions it supports.
/// 询问插件的 `setup.py` 支持哪些解释器版本。
pub async fn plugin_python_versions<R: CommandRunner>(
    session: &Session<'_, R>,
    setup_py: &Path,
) -> Result<Vec<String>, SessionError> {
    let setup_py = setup_py.to_string_lossy().into_owned();
    let output = session
        .run(&["python", setup_py.as_str(), "--classifiers"], true)
        .await?;
    Ok(classifiers::supported_versions(&output))
}

//! # Session Matrix Initialization Module / 会话矩阵初始化模块
//!
//! Creates a `SessionMatrix.toml` in the project directory, either with the
//! defaults (`--non-interactive`) or through a short interactive wizard.
//!
//! 在项目目录中创建 `SessionMatrix.toml`，可以使用默认值（`--non-interactive`），
//! 也可以通过简短的交互式向导。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: interpreter versions, plugin layout, install modes and coverage threshold
//! - **Plugin Detection**: reports the plugins already present under the chosen directory
//! - **Overwrite Protection**: confirmation (or `--force`) before replacing an existing file
//!
//! - **交互式向导**: 解释器版本、插件布局、安装方式和覆盖率阈值
//! - **插件检测**: 报告所选目录下已存在的插件
//! - **覆盖保护**: 替换现有文件前需要确认（或 `--force`）

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, MultiSelect, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{DEFAULT_CONFIG_FILE, SessionMatrix, VenvBackend};
use crate::core::discovery;
use crate::infra::t;

/// Arguments of the `init` command.
#[derive(Debug, Clone)]
pub struct InitArgs {
    pub project_dir: PathBuf,
    pub non_interactive: bool,
    pub force: bool,
    /// Language written into the new configuration.
    pub language: String,
}

/// Runs the wizard (or writes the defaults) and returns the path written, if any.
///
/// 运行向导（或写入默认值），并返回写入的路径（如有）。
pub fn execute(args: InitArgs) -> Result<Option<PathBuf>> {
    let config_path = args.project_dir.join(DEFAULT_CONFIG_FILE);
    let mut matrix = SessionMatrix {
        language: args.language.clone(),
        ..SessionMatrix::default()
    };

    if args.non_interactive {
        if config_path.exists() && !args.force {
            println!(
                "{}",
                t!("init.file_exists", path = config_path.display()).red()
            );
            println!("{}", t!("init.use_force").yellow());
            return Ok(None);
        }
        write_config(&config_path, &matrix)?;
        return Ok(Some(config_path));
    }

    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init.wizard_welcome").cyan().bold());
    println!("{}", t!("init.wizard_description"));

    if config_path.exists() && !args.force {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", path = config_path.display()).to_string())
            .default(false)
            .interact()
            .context(t!("init.user_input_failed").to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted"));
            return Ok(None);
        }
    }

    let versions: String = Input::with_theme(&theme)
        .with_prompt(t!("init.python_versions_prompt").to_string())
        .default(matrix.python_versions.join(","))
        .interact_text()
        .context(t!("init.user_input_failed").to_string())?;
    matrix.python_versions = split_list(&versions);

    matrix.plugins_dir = Input::with_theme(&theme)
        .with_prompt(t!("init.plugins_dir_prompt").to_string())
        .default(matrix.plugins_dir.clone())
        .interact_text()
        .context(t!("init.user_input_failed").to_string())?;
    report_detected_plugins(&args.project_dir.join(&matrix.plugins_dir));

    matrix.plugin_namespace = Input::with_theme(&theme)
        .with_prompt(t!("init.namespace_prompt").to_string())
        .default(matrix.plugin_namespace.clone())
        .interact_text()
        .context(t!("init.user_input_failed").to_string())?;

    matrix.core_import = Input::with_theme(&theme)
        .with_prompt(t!("init.core_import_prompt").to_string())
        .default(matrix.core_import.clone())
        .interact_text()
        .context(t!("init.user_input_failed").to_string())?;

    let selections = MultiSelect::with_theme(&theme)
        .with_prompt(t!("init.install_commands_prompt").to_string())
        .items(&matrix.install_commands)
        .defaults(&vec![true; matrix.install_commands.len()])
        .interact()
        .context(t!("init.user_input_failed").to_string())?;
    if selections.is_empty() {
        println!("{}", t!("init.no_install_commands_selected").yellow());
    } else {
        matrix.install_commands = selections
            .into_iter()
            .map(|i| matrix.install_commands[i].clone())
            .collect();
    }

    let use_venv = Confirm::with_theme(&theme)
        .with_prompt(t!("init.venv_backend_prompt").to_string())
        .default(false)
        .interact()
        .context(t!("init.user_input_failed").to_string())?;
    if use_venv {
        matrix.venv_backend = VenvBackend::Venv;
    }

    matrix.coverage.fail_under = Input::with_theme(&theme)
        .with_prompt(t!("init.fail_under_prompt").to_string())
        .default(matrix.coverage.fail_under)
        .validate_with(|value: &u8| -> Result<(), String> {
            if *value <= 100 {
                Ok(())
            } else {
                Err(t!("init.fail_under_invalid").to_string())
            }
        })
        .interact_text()
        .context(t!("init.user_input_failed").to_string())?;

    write_config(&config_path, &matrix)?;
    Ok(Some(config_path))
}

/// Splits a comma separated answer, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn report_detected_plugins(plugins_root: &Path) {
    match discovery::plugin_names(plugins_root) {
        Ok(names) if !names.is_empty() => println!(
            "{}",
            t!("init.detected_plugins", plugins = names.join(", ")).green()
        ),
        _ => println!("{}", t!("init.no_plugins_detected").yellow()),
    }
}

fn write_config(path: &Path, matrix: &SessionMatrix) -> Result<()> {
    let toml_string =
        toml::to_string_pretty(matrix).context(t!("init.serialize_failed").to_string())?;

    fs::write(path, toml_string)
        .with_context(|| t!("init.write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success_created", path = path.display()).bold()
    );
    println!("{}", t!("init.usage_hint"));

    Ok(())
}

//! # Plugin Matrix Library / Plugin Matrix 库
//!
//! This library provides the core functionality for Plugin Matrix, a
//! configuration-driven session runner that tests a core Python library and
//! its plugins across interpreter versions and plugin install modes.
//!
//! 此库为 Plugin Matrix 提供核心功能，
//! 这是一个配置驱动的会话运行器，用于在多个解释器版本和插件安装方式下测试核心 Python 库及其插件。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, session matrix planning and session execution
//! - `infra` - Command execution and file system helpers
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` / `commands` - Command-line interface and its subcommands
//!
//! - `core` - 配置、会话矩阵规划和会话执行
//! - `infra` - 命令执行和文件系统辅助功能
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` / `commands` - 命令行接口及其子命令

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// Tries the full locale first (e.g. "zh-CN"), then the language part only
/// (e.g. "en" from "en-US"), and finally falls back to "en".
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(resolve_locale(&locale));
}

/// Maps a requested locale onto one of the bundled translations.
/// 将请求的语言环境映射到内置的翻译之一。
pub fn resolve_locale(requested: &str) -> &str {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&requested) {
        return requested;
    }
    requested
        .split(['-', '_'])
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

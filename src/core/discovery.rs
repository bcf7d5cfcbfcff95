//! # Plugin Discovery Module / 插件发现模块
//!
//! The set of plugins is whatever lives under the plugins directory: every
//! subdirectory is a plugin, named after the directory.
//!
//! 插件集合就是插件目录下的内容：每个子目录都是一个插件，以目录名命名。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::Plugin;
use crate::infra::t;

/// Lists plugin names in sorted order.
///
/// Regular files and hidden directories (tool caches such as
/// `.pytest_cache`) are not plugins. A missing plugins directory is an error.
///
/// 按排序顺序列出插件名称。普通文件和隐藏目录不是插件；插件目录缺失会报错。
pub fn plugin_names(plugins_root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(plugins_root).with_context(|| {
        t!("discovery.read_failed", path = plugins_root.display()).to_string()
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| {
            t!("discovery.read_failed", path = plugins_root.display()).to_string()
        })?;
        if !entry.path().is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// Pairs each plugin name with the module it is imported as.
/// 将每个插件名称与其导入时的模块配对。
pub fn all_plugins(plugins_root: &Path, namespace: &str) -> Result<Vec<Plugin>> {
    Ok(plugin_names(plugins_root)?
        .into_iter()
        .map(|name| plugin(name, namespace))
        .collect())
}

pub fn plugin(name: String, namespace: &str) -> Plugin {
    let module = if namespace.is_empty() {
        name.clone()
    } else {
        format!("{}.{}", namespace, name)
    };
    Plugin { name, module }
}

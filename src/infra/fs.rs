//! # File System Operations Module / 文件系统操作模块
//!
//! Helpers for the per-session virtualenv directories and for resolving the
//! project root.
//!
//! 用于每个会话虚拟环境目录和解析项目根目录的辅助功能。

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Turns a session id into a directory name that is safe on every platform.
/// `test_plugin-3.6(install_cmd='pip install .', plugin_name='a')` becomes
/// `test_plugin-3-6-install_cmd-pip-install-plugin_name-a`.
///
/// 将会话 ID 转换为在所有平台上都安全的目录名称。
pub fn sanitize_session_id(session_id: &str) -> String {
    let mut sanitized = String::with_capacity(session_id.len());
    for c in session_id.chars() {
        if c.is_alphanumeric() || c == '_' {
            sanitized.push(c);
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    while sanitized.ends_with('-') {
        sanitized.pop();
    }
    sanitized
}

/// Directory name of a session's virtualenv: the sanitized id followed by
/// the first 8 hex digits of the SHA-256 of the raw id. Ids that sanitize to
/// the same text (`a.b` and `a-b`) still get separate environments.
///
/// 会话虚拟环境的目录名称：清理后的 ID 加上原始 ID 的 SHA-256 前 8 位十六进制。
pub fn env_dir_name(session_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    let hash_hex = format!("{:x}", hasher.finalize());
    format!("{}-{}", sanitize_session_id(session_id), &hash_hex[..8])
}

/// Location of the virtualenv for a session under the environment root.
/// 会话虚拟环境在环境根目录下的位置。
pub fn session_env_dir(env_root: &Path, session_id: &str) -> PathBuf {
    env_root.join(env_dir_name(session_id))
}

/// Prepares the directory a virtualenv will be created in.
///
/// Returns `false` when an existing environment is kept (`reuse`), in which
/// case the caller must not recreate it. Otherwise any stale environment is
/// removed, the parent directory is created and `true` is returned.
///
/// 准备将要创建虚拟环境的目录。保留现有环境（`reuse`）时返回 `false`；
/// 否则删除旧环境、创建父目录并返回 `true`。
pub fn prepare_env_dir(location: &Path, reuse: bool) -> io::Result<bool> {
    if location.exists() {
        if reuse {
            return Ok(false);
        }
        fs::remove_dir_all(location)?;
    }
    if let Some(parent) = location.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(true)
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

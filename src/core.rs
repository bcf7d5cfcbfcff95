//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Plugin Matrix: the
//! configuration, plugin discovery, the session matrix planner, the session
//! command surface and the sessions themselves.
//!
//! 此模块包含 Plugin Matrix 的核心功能：
//! 配置、插件发现、会话矩阵规划器、会话命令接口以及会话本身。

pub mod classifiers;
pub mod config;
pub mod discovery;
pub mod execution;
pub mod models;
pub mod planner;
pub mod session;
pub mod sessions;

// Re-exports
pub use config::SessionMatrix;
pub use execution::run_session;
pub use models::SessionResult;

//! # Reporting Module / 报告模块
//!
//! This module handles the display and export of session results: a colored
//! console summary, a standalone HTML page and a JSON document for CI tooling.
//!
//! 此模块处理会话结果的显示和导出：彩色控制台摘要、独立的 HTML 页面以及供 CI 工具使用的 JSON 文档。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;

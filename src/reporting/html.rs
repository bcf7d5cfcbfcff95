//! # HTML Reporting Module / HTML 报告模块
//!
//! This module generates a standalone HTML page with summary counts and a
//! table of sessions. Failed sessions carry a collapsible block with the
//! captured output of the failing command.
//!
//! 此模块生成一个独立的 HTML 页面，包含汇总计数和会话表格。
//! 失败的会话带有一个可折叠区块，显示失败命令的捕获输出。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::SessionResult;
use crate::infra::t;

const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2em; color: #24292e; }
h1 { font-weight: 600; }
.generated { color: #6a737d; font-size: 0.9em; }
.summary-container { display: flex; gap: 1.5em; margin: 1.5em 0; }
.summary-item { display: flex; flex-direction: column; align-items: center; padding: 0.8em 1.5em; border: 1px solid #e1e4e8; border-radius: 6px; }
.summary-item .count { font-size: 1.8em; font-weight: 600; }
.passed-text { color: #22863a; } .failed-text { color: #cb2431; } .skipped-text { color: #b08800; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 0.5em 0.8em; border-bottom: 1px solid #e1e4e8; vertical-align: top; }
.status-cell { display: inline-block; padding: 0.1em 0.6em; border-radius: 3px; color: #fff; }
.status-success { background: #28a745; } .status-failed { background: #d73a49; } .status-skipped { background: #dbab09; }
.duration-cell { text-align: right; white-space: nowrap; }
details summary { cursor: pointer; color: #0366d6; }
pre.output-content { background: #f6f8fa; padding: 1em; overflow-x: auto; max-height: 40em; }
"#;

/// Builds the report page.
/// 构建报告页面。
pub fn render_html_report(results: &[SessionResult], generated_at: DateTime<Utc>) -> Markup {
    let passed = results.iter().filter(|r| r.is_success()).count();
    let skipped = results.iter().filter(|r| r.is_skipped()).count();
    let failed = results.iter().filter(|r| r.is_failure()).count();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title")) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header")) }
                p.generated { (t!("html_report.generated_at", time = generated_at.format("%Y-%m-%d %H:%M:%S UTC"))) }
                div.summary-container {
                    (summary_item(results.len(), "", &t!("html_report.summary.total")))
                    (summary_item(passed, "passed-text", &t!("html_report.summary.passed")))
                    (summary_item(skipped, "skipped-text", &t!("html_report.summary.skipped")))
                    (summary_item(failed, "failed-text", &t!("html_report.summary.failed")))
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.header.session")) }
                            th { (t!("html_report.table.header.status")) }
                            th.duration-cell { (t!("html_report.table.header.duration")) }
                            th { (t!("html_report.table.header.details")) }
                        }
                    }
                    tbody {
                        @for result in results {
                            (session_row(result))
                        }
                    }
                }
            }
        }
    }
}

fn summary_item(count: usize, class: &str, label: &str) -> Markup {
    html! {
        div.summary-item {
            span class={ "count " (class) } { (count) }
            span.label { (label) }
        }
    }
}

fn session_row(result: &SessionResult) -> Markup {
    html! {
        tr {
            td { code { (result.session_id()) } }
            td {
                div class={ "status-cell status-" (result.status_key()) } { (result.status_str()) }
            }
            td.duration-cell { (format!("{:.2}s", result.duration().as_secs_f64())) }
            td {
                (result.detail())
                @if !result.output().trim().is_empty() {
                    details {
                        summary { (t!("html_report.toggle_output")) }
                        pre.output-content { (result.output()) }
                    }
                }
            }
        }
    }
}

/// Generates the HTML report and writes it to `output_path`.
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
/// 如果无法写入文件，则返回错误。
pub fn generate_html_report(results: &[SessionResult], output_path: &Path) -> Result<()> {
    let markup = render_html_report(results, Utc::now());
    fs::write(output_path, markup.into_string())
        .with_context(|| t!("report.write_failed", path = output_path.display()).to_string())?;
    Ok(())
}

//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the end-of-run summary and, for failed sessions, the command that
//! failed together with its captured output.
//!
//! 打印运行结束时的摘要，并为失败的会话打印失败的命令及其捕获的输出。

use colored::*;

use crate::core::models::SessionResult;
use crate::infra::t;

/// Prints one line per session, colored by status.
///
/// # Output Format / 输出格式
/// ```text
/// --- Session Summary ---
/// * test_core-3.6: success (12.30s)
/// * test_plugin-2.7(install_cmd='pip install .', plugin_name='example'): skipped (Not testing example on Python 2.7, supports [3.6])
/// * coverage: failed (Command coverage report --fail-under=80 failed with exit code 2)
/// ```
pub fn print_summary(results: &[SessionResult]) {
    println!("\n{}", t!("report.summary_banner").bold());

    for result in results {
        let status = match result {
            SessionResult::Success { .. } => result.status_str().green(),
            SessionResult::Skipped { .. } => result.status_str().yellow(),
            SessionResult::Failed { .. } => result.status_str().red(),
        };
        let detail = match result {
            SessionResult::Success { duration, .. } => format!("{:.2?}", duration),
            _ => result.detail().to_string(),
        };
        println!("* {}: {} ({})", result.session_id(), status, detail);
    }

    let passed = results.iter().filter(|r| r.is_success()).count();
    let skipped = results.iter().filter(|r| r.is_skipped()).count();
    let failed = results.iter().filter(|r| r.is_failure()).count();
    println!(
        "\n{}",
        t!(
            "report.totals",
            total = results.len(),
            passed = passed,
            skipped = skipped,
            failed = failed
        )
    );
}

/// Prints the failing command and its output for every failed session.
///
/// 为每个失败的会话打印失败的命令及其输出。
pub fn print_failure_details(failures: &[&SessionResult]) {
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("report.failure_banner").red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        let SessionResult::Failed { failure, .. } = result else {
            continue;
        };
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            t!("report.failure_header").red(),
            result.session_id().cyan()
        );
        println!("{}", failure.message);

        if !failure.output.trim().is_empty() {
            println!("\n--- {} ---\n", t!("report.command_log").yellow());
            println!("{}", failure.output.trim_end());
        }
        println!("\n{}", "-".repeat(80));
    }
}

//! # JSON Reporting Module / JSON 报告模块
//!
//! Writes session results as a JSON document for CI dashboards.
//!
//! 将会话结果写为 JSON 文档，供 CI 仪表板使用。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::models::{Failure, SessionResult};
use crate::infra::t;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub sessions: Vec<JsonSession<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonSession<'a> {
    pub id: String,
    pub name: &'a str,
    pub python: Option<&'a str>,
    pub status: &'a str,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'a Failure>,
}

impl<'a> JsonReport<'a> {
    pub fn new(results: &'a [SessionResult], generated_at: DateTime<Utc>) -> Self {
        let sessions = results
            .iter()
            .map(|result| JsonSession {
                id: result.session_id(),
                name: result.session().name(),
                python: result.session().python.as_deref(),
                status: result.status_key(),
                duration_secs: result.duration().as_secs_f64(),
                reason: match result {
                    SessionResult::Skipped { reason, .. } => Some(reason.as_str()),
                    _ => None,
                },
                failure: match result {
                    SessionResult::Failed { failure, .. } => Some(failure),
                    _ => None,
                },
            })
            .collect();

        Self {
            generated_at,
            total: results.len(),
            passed: results.iter().filter(|r| r.is_success()).count(),
            skipped: results.iter().filter(|r| r.is_skipped()).count(),
            failed: results.iter().filter(|r| r.is_failure()).count(),
            sessions,
        }
    }
}

/// Serializes the results and writes them to `output_path`.
/// 序列化结果并写入 `output_path`。
pub fn write_json_report(results: &[SessionResult], output_path: &Path) -> Result<()> {
    let report = JsonReport::new(results, Utc::now());
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(output_path, json)
        .with_context(|| t!("report.write_failed", path = output_path.display()).to_string())?;
    Ok(())
}

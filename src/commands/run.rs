//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which executes the selected
//! sessions of the matrix and reports the outcome.
//!
//! 此模块实现了 `run` 命令，执行矩阵中被选中的会话并报告结果。

use anyhow::{Result, bail};
use colored::*;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    commands::{LoadedProject, ProjectArgs, load_project, print_project_banner},
    core::{
        execution::{RunOptions, run_sessions},
        models::SessionResult,
        planner,
        session::SessionOptions,
    },
    infra::{command::SystemRunner, t},
    reporting::{generate_html_report, print_failure_details, print_summary, write_json_report},
};

/// Arguments of the `run` command.
/// `run` 命令的参数。
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub project: ProjectArgs,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub reuse_venvs: bool,
    pub error_on_missing_interpreters: bool,
    pub stop_on_first_error: bool,
    pub verbose: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `Ok` when no session failed and the run was not interrupted; an error
/// naming the failed sessions, or reporting the interruption, otherwise.
pub async fn execute(args: RunArgs) -> Result<()> {
    let project = load_project(&args.project)?;
    print_project_banner(&project);

    let stop_token = setup_signal_handler();

    let LoadedProject {
        config,
        layout,
        matrix,
        ..
    } = project;

    let plan = planner::plan_execution(
        matrix,
        &args.project.selection,
        args.total_runners,
        args.runner_index,
    )?;

    if plan.deselected_count > 0 {
        println!(
            "{}",
            t!("run.deselected_sessions", count = plan.deselected_count).cyan()
        );
    }

    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "run.running_as_split_runner",
                index = index + 1,
                total = total,
                count = plan.sessions_to_run.len()
            )
            .bold()
        );
    } else {
        println!("{}", t!("run.running_as_single_runner").bold());
    }

    if plan.sessions_to_run.is_empty() {
        println!("{}", t!("run.no_sessions").green());
        return Ok(());
    }

    let options = RunOptions {
        env_root: config.project_path(&layout.root, &config.envdir)?,
        venv_backend: config.venv_backend,
        default_interpreter: config.default_interpreter.clone(),
        session: SessionOptions {
            reuse_venvs: args.reuse_venvs,
            verbose: args.verbose,
        },
        error_on_missing_interpreters: args.error_on_missing_interpreters,
        stop_on_first_error: args.stop_on_first_error,
    };

    let results = run_sessions(
        plan.sessions_to_run,
        &SystemRunner,
        &layout,
        &options,
        stop_token.clone(),
    )
    .await;

    print_summary(&results);
    write_reports(&results, &args);

    conclude(&results, stop_token.is_cancelled())
}

/// Turns the session results into the exit status of the run.
///
/// An interrupted run is never a success, even when every session that got
/// to run passed. Failure details are printed either way.
///
/// 将会话结果转换为运行的退出状态。被中断的运行永远不算成功，即使所有已运行的会话都通过了。
pub fn conclude(results: &[SessionResult], interrupted: bool) -> Result<()> {
    let failures: Vec<&SessionResult> = results.iter().filter(|r| r.is_failure()).collect();
    print_failure_details(&failures);

    if interrupted {
        let skipped = results.iter().filter(|r| r.is_skipped()).count();
        bail!("{}", t!("run.interrupted", skipped = skipped));
    }
    if !failures.is_empty() {
        let names: Vec<String> = failures.iter().map(|r| r.session_id()).collect();
        bail!("{}", t!("run.sessions_failed", sessions = names.join(", ")));
    }

    println!("\n{}", t!("run.all_sessions_passed").green().bold());
    Ok(())
}

fn write_reports(results: &[SessionResult], args: &RunArgs) {
    if let Some(report_path) = &args.html {
        println!("\n{}", t!("report.generating_html", path = report_path.display()));
        if let Err(e) = generate_html_report(results, report_path) {
            eprintln!("{} {:#}", t!("report.html_failed").red(), e);
        }
    }
    if let Some(report_path) = &args.json {
        println!("{}", t!("report.generating_json", path = report_path.display()));
        if let Err(e) = write_json_report(results, report_path) {
            eprintln!("{} {:#}", t!("report.json_failed").red(), e);
        }
    }
}

fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("run.shutdown_signal").yellow());
                token_clone.cancel();
            }
            Err(e) => eprintln!("{}", t!("run.signal_listen_failed", error = e)),
        }
    });

    token
}

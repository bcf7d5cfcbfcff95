//! # Session Execution Module / 会话执行模块
//!
//! Runs planned sessions one after another. Each session gets a fresh
//! virtualenv, runs its body, and ends as a [`SessionResult`]. Sessions are
//! never run concurrently within one process; splitting the matrix across
//! processes is the planner's job.
//!
//! 依次运行计划中的会话。每个会话获得一个新的虚拟环境，运行其主体，
//! 最终产生一个 [`SessionResult`]。同一进程内的会话从不并发运行；
//! 在进程间拆分矩阵是计划器的职责。

use colored::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::config::VenvBackend;
use crate::core::models::{Failure, SessionKind, SessionResult, SessionSpec};
use crate::core::session::{Session, SessionError, SessionOptions, VirtualEnv};
use crate::core::sessions::{self, ProjectLayout};
use crate::infra::command::CommandRunner;
use crate::infra::{fs as infra_fs, t};

/// Options that apply to every session of a run.
/// 适用于一次运行中所有会话的选项。
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root directory of the session virtualenvs.
    pub env_root: PathBuf,
    pub venv_backend: VenvBackend,
    /// Interpreter for sessions that are not parametrized by version.
    pub default_interpreter: String,
    pub session: SessionOptions,
    /// Fail, rather than skip, sessions whose interpreter is missing.
    pub error_on_missing_interpreters: bool,
    /// Skip every remaining session after the first failure.
    pub stop_on_first_error: bool,
}

/// The interpreter executable a session is built from.
/// 构建会话所用的解释器可执行文件。
pub fn interpreter_for(session: &SessionSpec, default_interpreter: &str) -> String {
    match &session.python {
        Some(version) => format!("python{}", version),
        None => default_interpreter.to_string(),
    }
}

/// The main entry point for running a single session.
///
/// Checks that the interpreter exists, creates the virtualenv and dispatches
/// to the session body. Every outcome, including setup problems, is folded
/// into the returned [`SessionResult`].
///
/// 运行单个会话的主入口。检查解释器是否存在，创建虚拟环境并分派到会话主体。
/// 所有结果（包括设置问题）都会折叠到返回的 [`SessionResult`] 中。
pub async fn run_session<R: CommandRunner>(
    spec: &SessionSpec,
    runner: &R,
    layout: &ProjectLayout,
    options: &RunOptions,
) -> SessionResult {
    let id = spec.id();
    let start_time = Instant::now();
    println!("{}", t!("run.session_start", name = &id).blue().bold());

    let outcome = execute_session(spec, &id, runner, layout, options).await;
    let duration = start_time.elapsed();
    let result = into_result(spec.clone(), outcome, duration, options);

    match &result {
        SessionResult::Success { .. } => println!(
            "{}",
            t!("run.session_success", name = &id, duration = format!("{:.2?}", duration)).green()
        ),
        SessionResult::Skipped { reason, .. } => println!(
            "{}",
            t!("run.session_skipped", name = &id, reason = reason).yellow()
        ),
        SessionResult::Failed { failure, .. } => println!(
            "{}",
            t!("run.session_failed", name = &id, reason = &failure.message).red()
        ),
    }
    result
}

async fn execute_session<R: CommandRunner>(
    spec: &SessionSpec,
    id: &str,
    runner: &R,
    layout: &ProjectLayout,
    options: &RunOptions,
) -> Result<(), SessionError> {
    let interpreter = interpreter_for(spec, &options.default_interpreter);
    if runner.locate(&interpreter).is_none() {
        return Err(SessionError::MissingInterpreter(interpreter));
    }

    let venv = VirtualEnv::new(
        infra_fs::session_env_dir(&options.env_root, id),
        interpreter,
        options.venv_backend,
    );
    let mut session = Session::new(
        id,
        spec.python.clone(),
        venv,
        layout.root.clone(),
        runner,
        options.session,
    );
    session.create_venv().await?;

    match &spec.kind {
        SessionKind::TestCore => sessions::test_core(&mut session, layout).await,
        SessionKind::TestPlugin {
            install_cmd,
            plugin_name,
        } => sessions::test_plugin(&mut session, layout, install_cmd, plugin_name).await,
        SessionKind::Coverage => sessions::coverage(&mut session, layout).await,
    }
}

fn into_result(
    session: SessionSpec,
    outcome: Result<(), SessionError>,
    duration: Duration,
    options: &RunOptions,
) -> SessionResult {
    let error = match outcome {
        Ok(()) => return SessionResult::Success { session, duration },
        Err(error) => error,
    };

    match error {
        SessionError::Skipped(reason) => SessionResult::Skipped {
            session,
            reason,
            duration,
        },
        SessionError::MissingInterpreter(_) if !options.error_on_missing_interpreters => {
            SessionResult::Skipped {
                session,
                reason: error.to_string(),
                duration,
            }
        }
        SessionError::CommandFailed {
            ref command,
            code,
            ref output,
        } => SessionResult::Failed {
            session,
            failure: Failure {
                command: command.clone(),
                code,
                message: error.to_string(),
                output: output.clone(),
            },
            duration,
        },
        SessionError::Spawn { ref command, .. } => SessionResult::Failed {
            session,
            failure: Failure {
                command: command.clone(),
                code: None,
                message: error.to_string(),
                output: String::new(),
            },
            duration,
        },
        SessionError::MissingInterpreter(_) | SessionError::Env { .. } => SessionResult::Failed {
            session,
            failure: Failure {
                command: String::new(),
                code: None,
                message: error.to_string(),
                output: String::new(),
            },
            duration,
        },
    }
}

/// Runs sessions strictly one after another.
///
/// Cancelling `stop_token` (Ctrl-C) aborts the running session, killing its
/// child process, and marks it and every later session as skipped. With
/// `stop_on_first_error`, sessions after the first failure are skipped too.
///
/// 严格依次运行会话。取消 `stop_token`（Ctrl-C）会中止正在运行的会话并终止其子进程，
/// 并将其及之后所有会话标记为跳过。启用 `stop_on_first_error` 时，首次失败后的会话也会被跳过。
pub async fn run_sessions<R: CommandRunner>(
    sessions: Vec<SessionSpec>,
    runner: &R,
    layout: &ProjectLayout,
    options: &RunOptions,
    stop_token: CancellationToken,
) -> Vec<SessionResult> {
    let mut results = Vec::with_capacity(sessions.len());
    let mut stopped_by_failure = false;

    for session in sessions {
        if stop_token.is_cancelled() {
            results.push(skipped(session, t!("run.skipped_interrupted").to_string()));
            continue;
        }
        if stopped_by_failure {
            results.push(skipped(session, t!("run.skipped_after_failure").to_string()));
            continue;
        }

        let result = tokio::select! {
            biased;
            _ = stop_token.cancelled() => {
                println!("{}", t!("run.session_interrupted", name = session.id()).yellow());
                skipped(session.clone(), t!("run.skipped_interrupted").to_string())
            }
            result = run_session(&session, runner, layout, options) => result,
        };

        if result.is_failure() && options.stop_on_first_error {
            stopped_by_failure = true;
        }
        results.push(result);
    }

    results
}

fn skipped(session: SessionSpec, reason: String) -> SessionResult {
    SessionResult::Skipped {
        session,
        reason,
        duration: Duration::ZERO,
    }
}

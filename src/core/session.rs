//! # Session Module / 会话模块
//!
//! A `Session` is the command surface a session body works with: it owns a
//! virtualenv and a working directory, and runs commands inside that
//! environment through a [`CommandRunner`]. Failures of the invoked tools are
//! passed through untouched as [`SessionError::CommandFailed`]; there is no
//! retry.
//!
//! `Session` 是会话主体使用的命令接口：它拥有一个虚拟环境和一个工作目录，
//! 并通过 [`CommandRunner`] 在该环境中运行命令。被调用工具的失败以
//! [`SessionError::CommandFailed`] 原样传递；不会重试。

use colored::*;
use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::config::VenvBackend;
use crate::infra::command::{CommandRunner, Invocation};
use crate::infra::{fs as infra_fs, t};

/// Prefix of every echoed command line.
pub const LOG_PREFIX: &str = "plugin-matrix >";

/// Everything that can stop a session early.
/// 所有可能使会话提前结束的情况。
#[derive(Debug)]
pub enum SessionError {
    /// The session chose not to run. Not a failure.
    /// 会话选择不运行。这不是失败。
    Skipped(String),
    /// The interpreter the session needs is not on `PATH`.
    /// 会话所需的解释器不在 `PATH` 中。
    MissingInterpreter(String),
    /// A command exited unsuccessfully.
    /// 命令未成功退出。
    CommandFailed {
        command: String,
        code: Option<i32>,
        output: String,
    },
    /// A command could not be started at all.
    /// 命令根本无法启动。
    Spawn { command: String, source: io::Error },
    /// The virtualenv directory could not be prepared.
    /// 无法准备虚拟环境目录。
    Env { location: PathBuf, source: io::Error },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Skipped(reason) => f.write_str(reason),
            SessionError::MissingInterpreter(interpreter) => write!(
                f,
                "{}",
                t!("session.missing_interpreter", interpreter = interpreter)
            ),
            SessionError::CommandFailed { command, code, .. } => match code {
                Some(code) => write!(
                    f,
                    "{}",
                    t!("session.command_failed", command = command, code = code)
                ),
                None => write!(
                    f,
                    "{}",
                    t!("session.command_killed", command = command)
                ),
            },
            SessionError::Spawn { command, source } => write!(
                f,
                "{}",
                t!("session.spawn_failed", command = command, error = source)
            ),
            SessionError::Env { location, source } => write!(
                f,
                "{}",
                t!("session.env_failed", path = location.display(), error = source)
            ),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Spawn { source, .. } | SessionError::Env { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The virtualenv a session runs in.
/// 会话运行所在的虚拟环境。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEnv {
    pub location: PathBuf,
    /// Interpreter the environment is built from, e.g. `python3.6`.
    pub interpreter: String,
    pub backend: VenvBackend,
}

impl VirtualEnv {
    pub fn new(location: PathBuf, interpreter: impl Into<String>, backend: VenvBackend) -> Self {
        Self {
            location,
            interpreter: interpreter.into(),
            backend,
        }
    }

    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.location.join("Scripts")
        } else {
            self.location.join("bin")
        }
    }

    /// The command that creates this environment.
    /// 创建此环境的命令。
    pub fn creation_command(&self, cwd: &Path) -> Invocation {
        let location = self.location.to_string_lossy().into_owned();
        match self.backend {
            VenvBackend::Virtualenv => Invocation::new(
                "virtualenv",
                ["-p".to_string(), self.interpreter.clone(), location],
                cwd,
            ),
            VenvBackend::Venv => Invocation::new(
                self.interpreter.clone(),
                ["-m".to_string(), "venv".to_string(), location],
                cwd,
            ),
        }
    }

    /// Prefers the environment's own copy of a program.
    /// 优先使用环境中自带的程序。
    pub fn resolve_program(&self, program: &str) -> String {
        let bin = self.bin_dir();
        let candidates = [bin.join(program), bin.join(format!("{program}.exe"))];
        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .map(|candidate| candidate.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_string())
    }

    /// `PATH` with the environment's binaries first.
    fn path_var(&self) -> String {
        let mut paths = vec![self.bin_dir()];
        if let Some(existing) = env::var_os("PATH") {
            paths.extend(env::split_paths(&existing));
        }
        env::join_paths(paths)
            .map(|joined| joined.to_string_lossy().into_owned())
            .unwrap_or_else(|_| self.bin_dir().to_string_lossy().into_owned())
    }
}

/// Switches that change how a session runs its commands.
/// 改变会话运行命令方式的开关。
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Keep an existing virtualenv instead of recreating it.
    pub reuse_venvs: bool,
    /// Echo the captured output of silent commands.
    pub verbose: bool,
}

pub struct Session<'r, R> {
    id: String,
    python: Option<String>,
    venv: VirtualEnv,
    cwd: PathBuf,
    runner: &'r R,
    options: SessionOptions,
}

impl<'r, R: CommandRunner> Session<'r, R> {
    pub fn new(
        id: impl Into<String>,
        python: Option<String>,
        venv: VirtualEnv,
        cwd: PathBuf,
        runner: &'r R,
        options: SessionOptions,
    ) -> Self {
        Self {
            id: id.into(),
            python,
            venv,
            cwd,
            runner,
            options,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The interpreter version this session is parametrized with.
    pub fn python(&self) -> Option<&str> {
        self.python.as_deref()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn venv(&self) -> &VirtualEnv {
        &self.venv
    }

    /// Creates the session's virtualenv, or keeps the existing one when
    /// reuse is enabled.
    ///
    /// 创建会话的虚拟环境；启用复用时保留现有环境。
    pub async fn create_venv(&self) -> Result<(), SessionError> {
        let location = &self.venv.location;
        let fresh = infra_fs::prepare_env_dir(location, self.options.reuse_venvs).map_err(
            |source| SessionError::Env {
                location: location.clone(),
                source,
            },
        )?;

        if !fresh {
            println!(
                "{} {}",
                LOG_PREFIX.cyan(),
                t!("session.reusing_env", path = location.display())
            );
            return Ok(());
        }

        println!(
            "{} {}",
            LOG_PREFIX.cyan(),
            t!(
                "session.creating_env",
                interpreter = &self.venv.interpreter,
                path = location.display()
            )
        );
        let invocation = self.venv.creation_command(&self.cwd).silent(true);
        self.execute(invocation).await.map(|_| ())
    }

    /// Changes the working directory for subsequent commands. Relative paths
    /// are resolved against the current one.
    ///
    /// 更改后续命令的工作目录。相对路径基于当前目录解析。
    pub fn chdir(&mut self, dir: impl AsRef<Path>) {
        self.cwd = self.cwd.join(dir.as_ref());
        println!("{} cd {}", LOG_PREFIX.cyan(), self.cwd.display());
    }

    /// `pip install <args>` inside the session's environment, silently.
    /// 在会话环境中静默执行 `pip install <args>`。
    pub async fn install(&self, args: &[&str]) -> Result<(), SessionError> {
        let mut argv = vec!["pip"];
        argv.push("install");
        argv.extend_from_slice(args);
        self.run(&argv, true).await.map(|_| ())
    }

    /// Runs a command inside the session's environment.
    ///
    /// With `silent`, the output is captured and returned instead of being
    /// streamed; it is still printed when the command fails or `--verbose`
    /// is on.
    ///
    /// 在会话环境中运行命令。`silent` 时捕获并返回输出而不是流式输出；
    /// 命令失败或启用 `--verbose` 时仍会打印。
    pub async fn run<S: AsRef<str>>(&self, argv: &[S], silent: bool) -> Result<String, SessionError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(SessionError::Spawn {
                command: String::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, t!("session.empty_command").to_string()),
            });
        };

        let invocation = Invocation::new(
            self.venv.resolve_program(program.as_ref()),
            args.iter().map(|arg| arg.as_ref().to_string()),
            self.cwd.clone(),
        )
        .env("PATH", self.venv.path_var())
        .env("VIRTUAL_ENV", self.venv.location.to_string_lossy())
        .silent(silent);

        self.execute(invocation).await
    }

    /// Ends the session as skipped.
    /// 以跳过状态结束会话。
    pub fn skip<T>(&self, reason: impl Into<String>) -> Result<T, SessionError> {
        Err(SessionError::Skipped(reason.into()))
    }

    async fn execute(&self, invocation: Invocation) -> Result<String, SessionError> {
        let command = invocation.display();
        println!("{} {}", LOG_PREFIX.cyan(), command);

        let captured = self
            .runner
            .run(&invocation)
            .await
            .map_err(|source| SessionError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = captured.output;
        if invocation.silent
            && (self.options.verbose || !captured.success)
            && !output.trim().is_empty()
        {
            println!("{}", output.trim_end());
        }

        if captured.success {
            Ok(output)
        } else {
            Err(SessionError::CommandFailed {
                command,
                code: captured.code,
                output,
            })
        }
    }
}

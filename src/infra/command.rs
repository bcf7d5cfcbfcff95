//! # Command Execution Module / 命令执行模块
//!
//! Everything a session does ends in an external process: the package
//! installer, the interpreter, the test runner or the coverage tool. This
//! module describes such a call (`Invocation`), runs it (`CommandRunner`) and
//! captures what it printed.
//!
//! 会话所做的一切最终都是一个外部进程：包安装器、解释器、测试运行器或覆盖率工具。
//! 此模块描述这样的调用（`Invocation`），执行它（`CommandRunner`）并捕获其输出。

use std::ffi::OsStr;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::SplitStream;

use crate::infra::t;

/// A single external command, fully resolved and ready to spawn.
/// 一个完全解析、可直接派生的外部命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path / 程序名称或路径
    pub program: String,
    /// Arguments passed to the program / 传递给程序的参数
    pub args: Vec<String>,
    /// Working directory of the child process / 子进程的工作目录
    pub cwd: PathBuf,
    /// Extra environment variables layered over the inherited environment.
    /// 叠加在继承环境之上的额外环境变量。
    pub env: Vec<(String, String)>,
    /// Capture the output instead of streaming it to the terminal.
    /// 捕获输出，而不是将其流式输出到终端。
    pub silent: bool,
}

impl Invocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
            env: Vec::new(),
            silent: false,
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Renders the command line the way a user would type it.
    /// 以用户输入的方式呈现命令行。
    pub fn display(&self) -> String {
        render_command(
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str)),
        )
    }
}

/// What came back from a finished command.
/// 已完成命令的返回结果。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Captured {
    /// Exit code, `None` when the process was terminated by a signal.
    /// 退出码，进程被信号终止时为 `None`。
    pub code: Option<i32>,
    pub success: bool,
    /// Combined stdout and stderr. Empty for commands that were not silent.
    /// 合并后的 stdout 和 stderr。非静默命令为空。
    pub output: String,
}

impl Captured {
    pub fn from_status(status: ExitStatus, output: String) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
            output,
        }
    }

    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            success: false,
            output: output.into(),
        }
    }
}

/// Runs external commands on behalf of a session.
///
/// The production implementation is [`SystemRunner`]; tests substitute a
/// recording runner so session sequencing can be checked without any Python
/// toolchain installed.
///
/// 代表会话运行外部命令。生产实现是 [`SystemRunner`]；
/// 测试中会替换为记录型运行器，从而无需安装 Python 工具链即可检查会话顺序。
pub trait CommandRunner {
    /// Spawns the invocation and waits for it. A non-zero exit is not an
    /// error here; only failing to spawn or wait is.
    fn run(&self, invocation: &Invocation) -> impl Future<Output = io::Result<Captured>> + Send;

    /// Looks an executable up on `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<Captured> {
        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);

        if invocation.silent {
            let (status, output) = spawn_and_capture(cmd).await;
            Ok(Captured::from_status(status?, output))
        } else {
            let status = cmd.status().await?;
            Ok(Captured::from_status(status, String::new()))
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        find_on_path(program, std::env::var_os("PATH").as_deref())
    }
}

/// Spawns a command, captures its stdout and stderr.
/// Both streams are read concurrently and interleaved line by line into a
/// single string. Invalid UTF-8 is replaced rather than aborting the read.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 两个流被并发读取，并逐行交错合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (io::Result<ExitStatus>, String) {
    let mut child = match cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn() {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(io::Error::other(t!("command.capture_failed").to_string())),
            String::new(),
        );
    };

    let stdout_lines = SplitStream::new(BufReader::new(stdout).split(b'\n'));
    let stderr_lines = SplitStream::new(BufReader::new(stderr).split(b'\n'));
    let mut lines = stdout_lines.merge(stderr_lines);

    let mut output = String::new();
    while let Some(line) = lines.next().await {
        match line {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                output.push_str(text.trim_end_matches('\r'));
                output.push('\n');
            }
            Err(e) => {
                eprintln!("{}", t!("command.read_failed", error = e));
                break;
            }
        }
    }
    // Close both pipes so a child blocked on a full pipe can still exit.
    drop(lines);

    (child.wait().await, output)
}

/// Joins a command line with shell quoting where an argument needs it.
/// 在参数需要时使用 shell 引号拼接命令行。
pub fn render_command<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = parts.into_iter().collect();
    shlex::try_join(parts.iter().copied()).unwrap_or_else(|_| parts.join(" "))
}

/// Searches the directories of a `PATH`-style value for an executable.
/// 在 `PATH` 风格的值所列目录中查找可执行文件。
pub fn find_on_path(program: &str, path: Option<&OsStr>) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    std::env::split_paths(path?).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

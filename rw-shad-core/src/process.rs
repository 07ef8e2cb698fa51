//! External process execution
//!
//! Commands run to completion with their stdout and stderr captured into one
//! buffer. Nothing is streamed to the terminal and stdin is closed, so a tool
//! that unexpectedly prompts fails instead of hanging the run.
//!
//! Ctrl-C while a child runs kills the child. Listening for Ctrl-C replaces
//! the default SIGINT handler for the rest of the process, so binaries run
//! [`watch_interrupts`] to handle the interrupts that arrive between children.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Result, ShadError};

/// Exit code of a run stopped by Ctrl-C
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static RUNNING_CHILDREN: AtomicUsize = AtomicUsize::new(0);

/// Counts a child as running until dropped
struct ChildGuard;

impl ChildGuard {
    fn enter() -> Self {
        RUNNING_CHILDREN.fetch_add(1, Ordering::SeqCst);
        ChildGuard
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        RUNNING_CHILDREN.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Call `on_interrupt` for every Ctrl-C that arrives while no child runs
///
/// Interrupts during a child run are left to [`TokioRunner`], which kills the
/// child and fails with [`INTERRUPTED_EXIT_CODE`].
pub async fn watch_interrupts<F>(mut on_interrupt: F)
where
    F: FnMut() + Send,
{
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            return;
        }

        if RUNNING_CHILDREN.load(Ordering::SeqCst) == 0 {
            on_interrupt();
        } else {
            debug!("Ctrl-C while a child is running, leaving it to the runner");
        }
    }
}

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Build from a `[program, args...]` word list
    pub fn from_words(words: &[String], cwd: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = words
            .split_first()
            .ok_or_else(|| ShadError::Config("Command cannot be empty".to_string()))?;
        Ok(Self::new(program.clone(), cwd).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-quoted command line, for messages
    pub fn display(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self { output: output.into() }
    }
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion
    ///
    /// A non-zero exit status is an [`ShadError::ExternalProcess`] error
    /// carrying the exit code and the captured output.
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    Interrupted,
}

#[async_trait]
impl CommandRunner for TokioRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        debug!("Spawning `{}` in {}", command.display(), command.cwd.display());

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ShadError::ExternalProcess {
                message: format!("Failed to start `{}`", command.display()),
                output: e.to_string(),
                exit_code: None,
            })?;
        let _running = ChildGuard::enter();

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let outcome = {
            let finished = async {
                let (out, err) = tokio::join!(
                    drain(stdout, &mut stdout_buf),
                    drain(stderr, &mut stderr_buf)
                );
                out?;
                err?;
                child.wait().await
            };

            tokio::select! {
                status = finished => Outcome::Exited(status),
                _ = tokio::signal::ctrl_c() => Outcome::Interrupted,
            }
        };

        let output = combine(&stdout_buf, &stderr_buf);

        match outcome {
            Outcome::Interrupted => {
                debug!("Interrupted, killing `{}`", command.program);
                let _ = child.kill().await;
                Err(ShadError::ExternalProcess {
                    message: format!("`{}` was interrupted", command.display()),
                    output,
                    exit_code: Some(INTERRUPTED_EXIT_CODE),
                })
            }
            Outcome::Exited(Err(e)) => Err(ShadError::ExternalProcess {
                message: format!("Failed to wait for `{}`", command.display()),
                output: format!("{output}\n{e}"),
                exit_code: None,
            }),
            Outcome::Exited(Ok(status)) if status.success() => {
                debug!("`{}` completed successfully", command.program);
                Ok(CommandOutput { output })
            }
            Outcome::Exited(Ok(status)) => {
                debug!("`{}` failed with {}", command.program, status);
                Err(ShadError::ExternalProcess {
                    message: format!("`{}` failed with {}", command.display(), status),
                    output,
                    exit_code: status.code(),
                })
            }
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, buf: &mut Vec<u8>) -> std::io::Result<()> {
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(buf).await?;
    }
    Ok(())
}

fn combine(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    match (stdout.trim_end(), stderr.trim_end()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{out}\n{err}"),
    }
}

/// Minimum supported yarn major version
pub const MIN_YARN_MAJOR: u64 = 3;

/// Check the output of `yarn --version`
pub fn check_yarn_version(version_output: &str) -> Result<()> {
    let version = version_output.trim();
    let major = match semver::Version::parse(version) {
        Ok(parsed) => parsed.major,
        // Fall back to the leading number for non-semver output like "4.1"
        Err(_) => version
            .split('.')
            .next()
            .and_then(|part| part.parse::<u64>().ok())
            .unwrap_or(0),
    };

    if major < MIN_YARN_MAJOR {
        return Err(ShadError::Project(format!(
            "You are using yarn {version}. Please upgrade to yarn {MIN_YARN_MAJOR} or above"
        )));
    }
    Ok(())
}

/// Run `yarn --version` in `cwd` and check the result
pub async fn ensure_supported_yarn(runner: &dyn CommandRunner, cwd: &Path) -> Result<()> {
    let output = runner
        .run(&CommandSpec::new("yarn", cwd).arg("--version"))
        .await?;
    check_yarn_version(&output.output)
}

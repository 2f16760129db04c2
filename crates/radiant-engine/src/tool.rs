//! External tool invocation
//!
//! Every Radiance program is run through a [`ToolRunner`]. The real runner
//! spawns a child process; tests substitute a fake that records invocations.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// How often a running child is polled for exit, timeout and cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors from running an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The program could not be started
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the program or wiring its output failed
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully
    #[error("{tool} failed ({}): {}", exit_status_text(.exit_code.as_ref()), .stderr.trim())]
    Failed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The program ran past its time limit and was killed
    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    /// The run was cancelled and the program killed
    #[error("{tool} was cancelled")]
    Cancelled { tool: String },

    /// The program succeeded but its output made no sense
    #[error("Could not parse {tool} output: {output:?}")]
    UnparsableOutput { tool: String, output: String },
}

fn exit_status_text(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Shared flag for stopping a running tool from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a tool's standard output goes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StdoutTarget {
    /// Collected into [`ToolOutput::stdout`]
    #[default]
    Capture,
    /// Written straight to a file (e.g. a picture produced on stdout)
    File(PathBuf),
}

/// One run of an external program
///
/// Arguments are passed as a vector, never through a shell.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Program path, usually from the [`Toolchain`](crate::Toolchain)
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Written to the child's stdin, which is then closed
    pub stdin: Option<String>,
    pub stdout: StdoutTarget,
    /// Working directory; the parent's when absent
    pub current_dir: Option<PathBuf>,
    /// Kill the child after this long
    pub timeout: Option<Duration>,
    /// Kill the child once cancelled
    pub cancel: Option<CancelToken>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
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

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = StdoutTarget::File(path.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancel(mut self, token: Option<CancelToken>) -> Self {
        self.cancel = token;
        self
    }

    /// Short name used in logs and errors
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Resolve a path the way the child sees it
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.current_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// What a successful tool run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Empty when stdout was redirected to a file
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Runs external programs
///
/// Implementations must report a non-zero exit as [`ToolError::Failed`].
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let tool = invocation.tool_name();
        let io_error = |source| ToolError::Io {
            tool: invocation.tool_name(),
            source,
        };

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped());
        match &invocation.stdout {
            StdoutTarget::Capture => {
                command.stdout(Stdio::piped());
            }
            StdoutTarget::File(path) => {
                let file = File::create(invocation.resolve(path)).map_err(io_error)?;
                command.stdout(Stdio::from(file));
            }
        }
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        debug!("Running {} {}", invocation.program.display(), invocation.args.join(" "));
        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            tool: tool.clone(),
            source,
        })?;

        // Feed stdin and drain both pipes on their own threads so a chatty
        // child never blocks on a full pipe while we poll it.
        if let (Some(input), Some(mut pipe)) = (invocation.stdin.clone(), child.stdin.take()) {
            thread::spawn(move || {
                let _ = pipe.write_all(input.as_bytes());
            });
        }
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    terminate(&mut child);
                    return Err(io_error(source));
                }
            }

            if invocation.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                warn!("Cancelling {}", tool);
                terminate(&mut child);
                return Err(ToolError::Cancelled { tool });
            }

            if let Some(limit) = invocation.timeout
                && started.elapsed() >= limit
            {
                warn!("{} exceeded {:?}, killing it", tool, limit);
                terminate(&mut child);
                return Err(ToolError::Timeout { tool, after: limit });
            }

            thread::sleep(POLL_INTERVAL);
        };

        let output = ToolOutput {
            stdout: stdout.map(collect).unwrap_or_default(),
            stderr: stderr.map(collect).unwrap_or_default(),
            exit_code: status.code(),
        };
        debug!("{} exited with {:?}", tool, output.exit_code);

        if !status.success() {
            return Err(ToolError::Failed {
                tool,
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    })
}

fn collect(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Kill and reap a child
///
/// Reader threads are left to finish on their own: grandchildren may still
/// hold the pipes open.
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

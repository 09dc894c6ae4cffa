//! External build-command tool with bounded execution.
//!
//! Runs a configured build program (`mvn`, `cargo`, `make`, ...) as a child
//! process and folds every way that can go wrong into a distinct
//! [`FailureReason`]: a non-zero exit carries the captured stderr verbatim
//! (up to the capture cap), a process that could not start reports the
//! spawn error, and a process that outlives its time limit is killed and
//! reported as timed out.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use wait_timeout::ChildExt;

use troupe_core::tool::{
    FailureReason, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome, ToolSchema,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// Bytes of stdout/stderr kept per stream; the rest is drained, counted,
// and reported through a truncation note on the captured text.
const OUTPUT_LIMIT_BYTES: usize = 512 * 1024;

/// Tool that runs a configured build program with caller-supplied arguments.
///
/// The program itself is fixed at construction; the call supplies the
/// argument string (split on whitespace) and optionally a working
/// directory. Output is captured concurrently while the child runs so a
/// chatty build cannot deadlock the pipe. Each stream is kept up to a
/// 512 KiB cap; past it the pipe keeps draining, and the kept text ends
/// with a note stating how many bytes were dropped.
pub struct RunBuildCommand {
    program: String,
    default_dir: Option<PathBuf>,
    timeout: Duration,
}

impl RunBuildCommand {
    /// Create a build-command tool for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            default_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the working directory used when the call supplies none.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_dir = Some(dir.into());
        self
    }

    /// Bound how long one invocation may run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Tool for RunBuildCommand {
    fn name(&self) -> &str {
        "run_build_command"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(format!(
            "Runs the '{}' build tool with the given command arguments.",
            self.program
        ))
        .with_param(ParamSpec::required("command", ParamType::Text))
        .with_param(ParamSpec::optional("working_dir", ParamType::Text))
    }

    fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        let command = match args.text("command") {
            Ok(command) => command,
            Err(err) => return ToolOutcome::invalid_arguments(err.to_string()),
        };
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return ToolOutcome::invalid_arguments("Command must not be empty");
        }

        let working_dir = args
            .text_opt("working_dir")
            .map(PathBuf::from)
            .or_else(|| self.default_dir.clone());

        let mut cmd = Command::new(&self.program);
        cmd.args(&parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &working_dir {
            cmd.current_dir(dir);
        }

        debug!(program = %self.program, command = %command, "Spawning build command");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ToolOutcome::failure(FailureReason::SpawnFailed {
                    message: format!("Could not start '{}': {}", self.program, err),
                });
            }
        };

        // Readers must run while the child does, or a full pipe stalls it.
        let stdout_handle = match child.stdout.take() {
            Some(stream) => thread::spawn(move || read_stream_limited(stream)),
            None => {
                return ToolOutcome::failure(FailureReason::Raised {
                    message: "Child stdout was not piped".to_string(),
                });
            }
        };
        let stderr_handle = match child.stderr.take() {
            Some(stream) => thread::spawn(move || read_stream_limited(stream)),
            None => {
                return ToolOutcome::failure(FailureReason::Raised {
                    message: "Child stderr was not piped".to_string(),
                });
            }
        };

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs(),
                    "Build command timed out, killing"
                );
                if let Err(err) = child.kill() {
                    debug!(error = %err, "Kill after timeout failed");
                }
                let _ = child.wait();
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return ToolOutcome::failure(FailureReason::TimedOut {
                    limit_secs: self.timeout.as_secs(),
                });
            }
            Err(err) => {
                return ToolOutcome::failure(FailureReason::Raised {
                    message: format!("Failed to wait for '{}': {}", self.program, err),
                });
            }
        };

        let (stdout, stdout_truncated) = match join_output(stdout_handle) {
            Ok(output) => output,
            Err(message) => return ToolOutcome::failure(FailureReason::Raised { message }),
        };
        let (stderr, stderr_truncated) = match join_output(stderr_handle) {
            Ok(output) => output,
            Err(message) => return ToolOutcome::failure(FailureReason::Raised { message }),
        };
        if stdout_truncated > 0 || stderr_truncated > 0 {
            warn!(stdout_truncated, stderr_truncated, "Build output truncated");
        }

        debug!(exit_code = ?status.code(), "Build command finished");
        if status.success() {
            ToolOutcome::success(captured_text(&stdout, stdout_truncated))
        } else {
            ToolOutcome::failure(FailureReason::ExitNonZero {
                code: status.code(),
                stderr: captured_text(&stderr, stderr_truncated),
            })
        }
    }
}

/// Render captured bytes, flagging any data the cap dropped.
fn captured_text(bytes: &[u8], dropped: usize) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if dropped > 0 {
        text.push_str(&format!("\n[output truncated; {} bytes dropped]", dropped));
    }
    text
}

fn read_stream_limited(mut stream: impl Read) -> std::io::Result<(Vec<u8>, usize)> {
    let mut kept = Vec::new();
    let mut discarded = 0usize;
    let mut buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let room = OUTPUT_LIMIT_BYTES.saturating_sub(kept.len());
        let take = room.min(n);
        kept.extend_from_slice(&buf[..take]);
        discarded += n - take;
    }
    Ok((kept, discarded))
}

fn join_output(
    handle: thread::JoinHandle<std::io::Result<(Vec<u8>, usize)>>,
) -> Result<(Vec<u8>, usize), String> {
    match handle.join() {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(format!("Failed to capture command output: {}", err)),
        Err(_) => Err("Output reader thread panicked".to_string()),
    }
}

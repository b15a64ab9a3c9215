use crate::error::{Result, ScoreWdError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
/// How long the pipe readers may run on once the tool itself has ended.
const PIPE_GRACE: Duration = Duration::from_secs(2);

/// How an external process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExitOutcome {
    Exited(i32),
    /// Killed by a signal the tool did not raise itself.
    Terminated,
    TimedOut(Duration),
    Cancelled,
}

impl ExitOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitOutcome::Exited(code),
            None => ExitOutcome::Terminated,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exit code {}", code),
            ExitOutcome::Terminated => write!(f, "terminated by signal"),
            ExitOutcome::TimedOut(limit) => write!(f, "timed out after {}s", limit.as_secs()),
            ExitOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub outcome: ExitOutcome,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.outcome.success()
    }

    /// Both streams as text, stdout first.
    pub fn captured_output(&self) -> String {
        let stdout = String::from_utf8_lossy(&self.stdout);
        let stderr = String::from_utf8_lossy(&self.stderr);
        match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.into_owned(),
            (true, false) => stderr.into_owned(),
            (false, false) => format!("{}\n{}", stdout.trim_end(), stderr),
        }
    }
}

/// Capability to run the notation editor once and report how it went.
///
/// Implementations must block until the tool has finished.
pub trait ExternalTool: Send + Sync {
    fn executable(&self) -> &Path;

    fn invoke(&self, args: &[OsString]) -> Result<ToolOutput>;
}

pub struct ProcessTool {
    executable: PathBuf,
    timeout: Option<Duration>,
    running: Arc<AtomicBool>,
}

impl ProcessTool {
    pub fn new<P: Into<PathBuf>>(executable: P) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a running flag; clearing it kills the current child.
    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn wait_for_exit(&self, child: &mut Child, started: Instant) -> Result<ExitOutcome> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(ExitOutcome::from_status(status)),
                Ok(None) => {}
                Err(e) => {
                    kill_process_group(child);
                    return Err(e.into());
                }
            }

            if !self.is_running() {
                kill_process_group(child);
                return Ok(ExitOutcome::Cancelled);
            }

            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    tracing::warn!(
                        executable = %self.executable.display(),
                        timeout_secs = limit.as_secs(),
                        "Killing external tool after timeout"
                    );
                    kill_process_group(child);
                    return Ok(ExitOutcome::TimedOut(limit));
                }
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl ExternalTool for ProcessTool {
    fn executable(&self) -> &Path {
        &self.executable
    }

    fn invoke(&self, args: &[OsString]) -> Result<ToolOutput> {
        tracing::debug!(
            executable = %self.executable.display(),
            args = ?args,
            "Invoking external tool"
        );

        let started = Instant::now();
        let mut command = Command::new(&self.executable);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // The tool leads its own group so a kill also reaches its helpers.
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|e| ScoreWdError::ToolLaunch {
            executable: self.executable.display().to_string(),
            source: e,
        })?;

        // Drain both pipes while waiting so a chatty tool cannot block on a full pipe.
        let stdout_reader = child.stdout.take().map(spawn_drain);
        let stderr_reader = child.stderr.take().map(spawn_drain);

        let outcome = self.wait_for_exit(&mut child, started)?;

        // Leftover holders of the pipes must not stall the run.
        let deadline = Instant::now() + PIPE_GRACE;
        let stdout = collect(stdout_reader, deadline);
        let stderr = collect(stderr_reader, deadline);
        if stdout.is_none() || stderr.is_none() {
            tracing::warn!(
                executable = %self.executable.display(),
                "Output pipes still open after the tool ended; killing its process group"
            );
            kill_process_group(&mut child);
        }
        let stdout = stdout.unwrap_or_default();
        let stderr = stderr.unwrap_or_default();

        let elapsed = started.elapsed();
        tracing::debug!(
            outcome = %outcome,
            duration_ms = elapsed.as_millis() as u64,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "External tool finished"
        );

        Ok(ToolOutput {
            outcome,
            stdout,
            stderr,
            elapsed,
        })
    }
}

fn spawn_drain<R: Read + Send + 'static>(mut reader: R) -> Receiver<Vec<u8>> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = reader.read_to_end(&mut buffer);
        let _ = sender.send(buffer);
    });
    receiver
}

/// `None` when the reader is still blocked at `deadline`.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    match reader {
        Some(receiver) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match receiver.recv_timeout(remaining) {
                Ok(buffer) => Some(buffer),
                Err(mpsc::RecvTimeoutError::Disconnected) => Some(Vec::new()),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
            }
        }
        None => Some(Vec::new()),
    }
}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    // The child was spawned with `process_group(0)`, so its pid is the group id.
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: killpg only sends a signal; a stale group id yields ESRCH.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

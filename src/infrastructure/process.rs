//! Child Process Execution
//!
//! Every local command (git, rsync, ssh) goes through `ProcessRunner`, which
//! either captures output for diagnostics or streams it straight to the
//! caller's terminal, and enforces an optional time limit. On expiry the
//! child's whole process group gets SIGTERM, then SIGKILL after a grace
//! period.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::shell;
use crate::error::{DeployGateError, DeployGateResult};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit status and captured output of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when terminated by a signal
    pub code: Option<i32>,
    /// Empty in streaming mode
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout then stderr, skipping empty streams
    pub fn combined(&self) -> String {
        [self.stdout.trim_end(), self.stderr.trim_end()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Where the child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Piped and returned in `CommandOutput`
    Capture,
    /// Inherited, so output appears as it is produced
    Stream,
    /// Like `Stream`, but the child's stdout lands on our stderr, keeping
    /// stdout free for machine-readable records
    StreamToStderr,
}

#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    kill_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ProcessRunner {
    pub fn new(kill_grace: Duration) -> Self {
        Self { kill_grace }
    }

    /// Run to completion. A non-zero exit is not an error here.
    pub fn run(
        &self,
        cmd: &mut Command,
        mode: OutputMode,
        timeout: Option<Duration>,
    ) -> DeployGateResult<CommandOutput> {
        let program = program_name(cmd);
        debug!(command = %describe(cmd), ?timeout, "running");

        cmd.stdin(Stdio::null());
        match mode {
            OutputMode::Capture => cmd.stdout(Stdio::piped()).stderr(Stdio::piped()),
            OutputMode::Stream => cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
            OutputMode::StreamToStderr => cmd
                .stdout(Stdio::from(std::io::stderr()))
                .stderr(Stdio::inherit()),
        };
        isolate_process_group(cmd);

        let mut child = cmd.spawn().map_err(|source| DeployGateError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child, timeout)?;
        let output = CommandOutput {
            code: status.and_then(|s| s.code()),
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        match (status, timeout) {
            (None, Some(after)) => {
                warn!(%program, secs = after.as_secs(), "command timed out");
                Err(DeployGateError::TimedOut { program, after })
            }
            _ => Ok(output),
        }
    }

    /// Like `run`, but a non-zero exit becomes `CommandFailed`
    pub fn run_checked(
        &self,
        cmd: &mut Command,
        mode: OutputMode,
        timeout: Option<Duration>,
    ) -> DeployGateResult<CommandOutput> {
        let output = self.run(cmd, mode, timeout)?;
        if output.success() {
            return Ok(output);
        }
        Err(DeployGateError::CommandFailed {
            program: program_name(cmd),
            code: output.code,
            output: output.combined(),
        })
    }

    /// `Ok(None)` means the limit expired and the child was terminated.
    fn wait(
        &self,
        child: &mut Child,
        timeout: Option<Duration>,
    ) -> DeployGateResult<Option<ExitStatus>> {
        let Some(limit) = timeout else {
            return Ok(Some(child.wait()?));
        };

        let deadline = Instant::now() + limit;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                self.terminate(child)?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn terminate(&self, child: &mut Child) -> DeployGateResult<()> {
        interrupt(child);

        let deadline = Instant::now() + self.kill_grace;
        while Instant::now() < deadline {
            if child.try_wait()?.is_some() {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }

        kill(child);
        child.wait()?;
        Ok(())
    }
}

fn drain<R>(pipe: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn program_name(cmd: &Command) -> String {
    let program = std::path::Path::new(cmd.get_program());
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Command line as it would be typed into a shell
pub fn describe(cmd: &Command) -> String {
    let words: Vec<String> = std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|w| w.to_string_lossy().into_owned())
        .collect();
    shell::join(words)
}

#[cfg(unix)]
fn isolate_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_cmd: &mut Command) {}

#[cfg(unix)]
fn signal_group(child: &Child, signal: libc::c_int) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill(2) takes plain integers; a negative pid targets the process
    // group created for this child by `isolate_process_group`.
    let rc = unsafe { libc::kill(-pgid, signal) };
    if rc != 0 {
        debug!(pgid, signal, error = %std::io::Error::last_os_error(), "kill failed");
    }
}

#[cfg(unix)]
fn interrupt(child: &mut Child) {
    signal_group(child, libc::SIGTERM);
}

#[cfg(unix)]
fn kill(child: &mut Child) {
    signal_group(child, libc::SIGKILL);
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill(child: &mut Child) {
    let _ = child.kill();
}

//! `nvidia-smi` subprocess telemetry source
//!
//! Runs the tool once per sample with a bounded wait and parses its CSV
//! output.

use super::parse::{parse_csv, QUERY_FIELDS};
use super::traits::TelemetrySource;
use crate::domain::TelemetrySnapshot;
use crate::error::TelemetryError;

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Default executable name, resolved through PATH
pub const DEFAULT_PROGRAM: &str = "nvidia-smi";

/// Default upper bound on a single invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Telemetry source backed by the `nvidia-smi` command
#[derive(Debug, Clone)]
pub struct NvidiaSmi {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl NvidiaSmi {
    /// Query the given `nvidia-smi` executable with the standard field list
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![
                format!("--query-gpu={}", QUERY_FIELDS.join(",")),
                "--format=csv,noheader,nounits".to_string(),
            ],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Run an arbitrary command whose stdout uses the same CSV layout
    pub fn command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the maximum time to wait for the process
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The executable being run
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the process and return its stdout
    ///
    /// The whole invocation, including reading both pipes to EOF, is bounded
    /// by the timeout. A background process that inherits the pipes can keep
    /// them open after the direct child exits.
    fn run(&self) -> Result<String, TelemetryError> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Drain pipes on their own threads so a chatty child can't block on
        // a full pipe while we wait for it to exit.
        let (tx, rx) = mpsc::channel();
        let mut pending = 0;
        if let Some(pipe) = child.stdout.take() {
            drain(Stream::Stdout, pipe, tx.clone());
            pending += 1;
        }
        if let Some(pipe) = child.stderr.take() {
            drain(Stream::Stderr, pipe, tx.clone());
            pending += 1;
        }
        drop(tx);

        let status = self.wait_until(&mut child, deadline)?;
        let (stdout, stderr) = self.collect(&rx, pending, deadline)?;

        if !status.success() {
            return Err(TelemetryError::ExitStatus {
                command: self.program.clone(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        String::from_utf8(stdout).map_err(|_| TelemetryError::Encoding)
    }

    fn wait_until(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus, TelemetryError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(self.timed_out());
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(self.spawn_error(e)),
            }
        }
    }

    /// Wait for both pipe readers, giving up at the deadline
    fn collect(
        &self,
        rx: &Receiver<(Stream, Vec<u8>)>,
        pending: usize,
        deadline: Instant,
    ) -> Result<(Vec<u8>, Vec<u8>), TelemetryError> {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        for _ in 0..pending {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((Stream::Stdout, buf)) => stdout = buf,
                Ok((Stream::Stderr, buf)) => stderr = buf,
                Err(mpsc::RecvTimeoutError::Timeout) => return Err(self.timed_out()),
                // A reader thread died without sending; use what we have
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        Ok((stdout, stderr))
    }

    fn timed_out(&self) -> TelemetryError {
        TelemetryError::Timeout {
            command: self.program.clone(),
            timeout: self.timeout,
        }
    }

    fn spawn_error(&self, err: io::Error) -> TelemetryError {
        if err.kind() == io::ErrorKind::NotFound {
            TelemetryError::CommandNotFound(self.program.clone())
        } else {
            TelemetryError::Spawn {
                command: self.program.clone(),
                message: err.to_string(),
            }
        }
    }
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl TelemetrySource for NvidiaSmi {
    fn sample(&self) -> TelemetrySnapshot {
        let output = self.run()?;
        parse_csv(&output)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Read a pipe to EOF on a detached thread and send the bytes back
///
/// The thread outlives a timed-out sample if something still holds the pipe
/// open; the send then fails quietly once the receiver is gone.
fn drain<R: Read + Send + 'static>(stream: Stream, mut pipe: R, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send((stream, buf));
    });
}

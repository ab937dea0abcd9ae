//! Trace sessions: launch the helper, stream its records
//!
//! A [`TraceSession`] owns one exclusive temporary output file and the
//! handle of the helper it launched. Iterating the session follows the
//! output file and yields a [`SyscallRecord`] per parseable line until the
//! helper writes [`SENTINEL`].
//!
//! Stream completion is decided by the sentinel line alone. The session
//! never blocks on or kills the helper: it may still be flushing or cleaning
//! up after the sentinel, and it applies any timeout itself. Once the stream
//! ends or the session is dropped, the helper's exit status is collected
//! immediately if it has already exited, otherwise on a detached reaper
//! thread, so finished helpers do not linger as zombies.
//!
//! A helper that neither writes the sentinel nor removes the file leaves the
//! iterator blocked indefinitely. A sentinel written as the final bytes of
//! the file without a newline is still recognized.

use crate::config::TraceConfig;
use crate::error::{Result, TraceError};
use crate::follow::FileLines;
use crate::helper::HelperInvocation;
use crate::syscall::{parse_syscall, SyscallRecord};
use std::path::Path;
use std::process::Child;
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Final line the helper writes after a complete trace
pub const SENTINEL: &str = "## dtruss.sh done ##";

/// What to trace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceRequest {
    /// Executable to launch under the helper
    pub target: String,
    /// Target's own arguments, appended verbatim
    pub args: Vec<String>,
    /// Forwarded to the helper, which enforces it
    pub timeout: Option<Duration>,
    /// Restrict tracing to this one syscall
    pub syscall: Option<String>,
}

impl TraceRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn syscall(mut self, name: impl Into<String>) -> Self {
        self.syscall = Some(name.into());
        self
    }

    /// Reject requests that cannot name a target or a filter
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(TraceError::InvalidArgument(
                "target for dtruss must not be empty".to_string(),
            ));
        }
        if matches!(self.syscall.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(TraceError::InvalidArgument(
                "syscall filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One running trace, consumed as an iterator of records
#[derive(Debug)]
pub struct TraceSession {
    /// None once the stream is finished and the file handle released
    lines: Option<FileLines>,
    /// Removed from disk on drop
    output: Option<NamedTempFile>,
    /// None once handed off for reaping
    helper: Option<Child>,
    helper_pid: u32,
    invocation: HelperInvocation,
}

impl TraceSession {
    /// Create the output file, launch the helper and return the stream
    ///
    /// The request is validated before anything is created or launched.
    pub fn start(config: &TraceConfig, request: &TraceRequest) -> Result<Self> {
        request.validate()?;

        let output = match &config.temp_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(TraceError::TempFile)?;
        let reader = output.reopen().map_err(TraceError::TempFile)?;

        let invocation = HelperInvocation::new(
            &config.shell,
            &config.helper,
            output.path(),
            request.timeout,
            request.syscall.as_deref(),
            &request.target,
            &request.args,
        );

        let helper = invocation
            .to_command()
            .spawn()
            .map_err(|source| TraceError::Spawn {
                helper: config.helper.clone(),
                source,
            })?;

        tracing::debug!(
            pid = helper.id(),
            output = %output.path().display(),
            command = %invocation.command_line(),
            "helper launched"
        );

        let lines = FileLines::new(reader)
            .with_poll_interval(config.poll_interval())
            .watch_path(output.path())
            .accept_unterminated(SENTINEL);

        Ok(Self {
            lines: Some(lines),
            output: Some(output),
            helper_pid: helper.id(),
            helper: Some(helper),
            invocation,
        })
    }

    /// Process id of the launched helper
    pub fn helper_pid(&self) -> u32 {
        self.helper_pid
    }

    /// Backing output file, until the stream finishes
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_ref().map(NamedTempFile::path)
    }

    /// Command line the helper was launched with
    pub fn invocation(&self) -> &HelperInvocation {
        &self.invocation
    }

    /// Whether the stream has ended and its file been released
    pub fn is_finished(&self) -> bool {
        self.lines.is_none()
    }

    fn release(&mut self) {
        self.lines = None;
        if let Some(output) = self.output.take() {
            if let Err(e) = output.close() {
                tracing::debug!(error = %e, "failed to remove trace output file");
            }
        }
        self.reap_helper();
    }

    /// Collect the helper's exit status without blocking the caller
    fn reap_helper(&mut self) {
        let Some(mut child) = self.helper.take() else {
            return;
        };
        let pid = self.helper_pid;
        match child.try_wait() {
            Ok(Some(status)) => tracing::debug!(pid, %status, "helper exited"),
            Ok(None) => {
                let spawned = thread::Builder::new()
                    .name("dtruss-reaper".to_string())
                    .spawn(move || match child.wait() {
                        Ok(status) => tracing::debug!(pid, %status, "helper reaped"),
                        Err(e) => tracing::debug!(pid, error = %e, "failed to reap helper"),
                    });
                if let Err(e) = spawned {
                    tracing::debug!(pid, error = %e, "failed to start reaper thread");
                }
            }
            Err(e) => tracing::debug!(pid, error = %e, "failed to query helper status"),
        }
    }
}

impl Drop for TraceSession {
    fn drop(&mut self) {
        self.reap_helper();
    }
}

impl Iterator for TraceSession {
    type Item = SyscallRecord;

    fn next(&mut self) -> Option<SyscallRecord> {
        loop {
            let raw = self.lines.as_mut()?.next();
            let Some(raw) = raw else {
                tracing::debug!("trace output ended before sentinel");
                self.release();
                return None;
            };

            let line = raw.trim();
            if line == SENTINEL {
                tracing::debug!("sentinel seen, trace complete");
                self.release();
                return None;
            }
            if let Some(record) = parse_syscall(line) {
                return Some(record);
            }
        }
    }
}

impl std::iter::FusedIterator for TraceSession {}

/// Start tracing `target` and return its record stream
///
/// Fails with [`TraceError::InvalidArgument`] for an empty target before any
/// file is created or process launched.
pub fn trace(
    config: &TraceConfig,
    target: &str,
    args: &[String],
    timeout: Option<Duration>,
    syscall: Option<&str>,
) -> Result<TraceSession> {
    let request = TraceRequest {
        target: target.to_string(),
        args: args.to_vec(),
        timeout,
        syscall: syscall.map(str::to_string),
    };
    TraceSession::start(config, &request)
}

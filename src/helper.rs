//! Helper process command line
//!
//! The helper is run as `<shell> <helper> -W <output> -f [-K secs] [-t name]
//! <target> [target args...]`. `-W` names the output file, `-f` follows
//! forked children, `-K` is a helper-enforced timeout in seconds and `-t`
//! restricts tracing to one syscall.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Escape characters that would split the target path when the helper
/// re-expands it through the shell
pub fn sanitize_target_path(path: &str) -> String {
    path.replace(' ', "\\ ")
}

/// Whole seconds for the helper's `-K` flag, rounding fractions up
pub fn timeout_arg(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

/// Fully built helper invocation
#[derive(Debug, Clone, PartialEq)]
pub struct HelperInvocation {
    shell: PathBuf,
    /// Everything after the shell, starting with the helper script
    args: Vec<OsString>,
}

impl HelperInvocation {
    /// Build the argv for one trace session
    ///
    /// `target` is sanitized here; `target_args` are appended verbatim.
    pub fn new(
        shell: &Path,
        helper: &Path,
        output: &Path,
        timeout: Option<Duration>,
        syscall: Option<&str>,
        target: &str,
        target_args: &[String],
    ) -> Self {
        let mut args: Vec<OsString> = vec![
            helper.as_os_str().to_owned(),
            "-W".into(),
            output.as_os_str().to_owned(),
            "-f".into(),
        ];
        if let Some(timeout) = timeout {
            args.push("-K".into());
            args.push(timeout_arg(timeout).to_string().into());
        }
        if let Some(name) = syscall {
            args.push("-t".into());
            args.push(name.into());
        }
        args.push(sanitize_target_path(target).into());
        args.extend(target_args.iter().map(OsString::from));

        Self {
            shell: shell.to_path_buf(),
            args,
        }
    }

    /// Interpreter that runs the helper
    pub fn program(&self) -> &Path {
        &self.shell
    }

    /// Arguments passed to the interpreter
    pub fn args(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    /// Space-joined command line for logs and inspection
    pub fn command_line(&self) -> String {
        std::iter::once(self.shell.as_os_str())
            .chain(self.args())
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Command with all standard streams detached from the caller
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

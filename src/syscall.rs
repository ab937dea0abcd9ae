//! Syscall records and the helper line parser
//!
//! The helper writes one JSON object per line:
//!
//! ```text
//! {"syscall":"open","args":["/tmp/a"],"retval":3,"errno":0,"pid":100,"timestamp":1.0}
//! ```
//!
//! Lines are read while the helper is still writing them, so truncated or
//! interleaved lines are routine. [`parse_syscall`] turns anything it cannot
//! decode into `None` rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-character escape the helper leaves inside string fields for NUL bytes
const NULL_ESCAPE: &str = "\\0";

/// One observed system call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyscallRecord {
    /// Syscall name (e.g., "open", "read")
    #[serde(rename = "syscall")]
    pub name: String,
    /// Arguments as formatted by the helper, in call order
    pub args: Vec<String>,
    /// Return value
    #[serde(rename = "retval")]
    pub result: i64,
    /// Error code (0 = no error)
    pub errno: i64,
    /// Process that made the call
    pub pid: i64,
    /// Helper-defined time marker, monotonic within one session only
    pub timestamp: Timestamp,
}

/// Time marker exactly as the helper wrote it
///
/// Integer markers (e.g. nanosecond counters) are kept as integers so values
/// above 2^53 stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Int(i64),
    Float(f64),
}

impl Timestamp {
    /// Approximate value for arithmetic; integers above 2^53 are rounded
    pub fn as_f64(self) -> f64 {
        match self {
            Timestamp::Int(v) => v as f64,
            Timestamp::Float(v) => v,
        }
    }
}

impl From<i64> for Timestamp {
    fn from(v: i64) -> Self {
        Timestamp::Int(v)
    }
}

impl From<f64> for Timestamp {
    fn from(v: f64) -> Self {
        Timestamp::Float(v)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Int(v) => write!(f, "{}", v),
            Timestamp::Float(v) => write!(f, "{}", v),
        }
    }
}

impl SyscallRecord {
    /// Whether the call reported an error code
    pub fn failed(&self) -> bool {
        self.errno != 0
    }
}

impl fmt::Display for SyscallRecord {
    /// Classic dtruss layout: `open(/tmp/a) -> 0x3`, with `(errno = N)`
    /// appended only for failed calls
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) -> ", self.name, self.args.join(", "))?;
        if self.result < 0 {
            write!(f, "-{:#x}", self.result.unsigned_abs())?;
        } else {
            write!(f, "{:#x}", self.result)?;
        }
        if self.failed() {
            write!(f, " (errno = {})", self.errno)?;
        }
        Ok(())
    }
}

/// Remove the helper's literal `\0` artifacts from a raw line
pub fn strip_null_escapes(line: &str) -> String {
    line.replace(NULL_ESCAPE, "")
}

/// Parse one trimmed helper line into a record
///
/// Returns `None` for anything that is not exactly a record object: bad JSON,
/// wrong field types, missing fields or extra fields. No range checks are
/// applied to the decoded values.
pub fn parse_syscall(line: &str) -> Option<SyscallRecord> {
    let cleaned = strip_null_escapes(line);
    match serde_json::from_str(&cleaned) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::trace!(error = %e, line = %cleaned, "skipping unparseable line");
            None
        }
    }
}

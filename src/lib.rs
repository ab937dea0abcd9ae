//! dtruss-stream - typed system call streams from a dtruss-style helper
//!
//! This library launches an external tracing helper against a target,
//! follows the helper's output file while it is being written, and yields
//! parsed [`SyscallRecord`]s until the helper signals completion.
//!
//! ```no_run
//! use dtruss_stream::{trace, TraceConfig};
//!
//! # fn main() -> Result<(), dtruss_stream::TraceError> {
//! let config = TraceConfig::with_helper("/usr/local/share/dtruss-stream/dtruss.sh");
//! for call in trace(&config, "/bin/ls", &["-la".to_string()], None, Some("open"))? {
//!     println!("{}", call);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod follow;
pub mod helper;
pub mod output;
pub mod session;
pub mod syscall;

pub use config::TraceConfig;
pub use error::TraceError;
pub use session::{trace, TraceRequest, TraceSession, SENTINEL};
pub use syscall::{parse_syscall, SyscallRecord, Timestamp};

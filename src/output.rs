//! Record rendering for the command-line tool

use crate::cli::OutputFormat;
use crate::syscall::SyscallRecord;
use std::io::{self, Write};

/// Write one record as a single line
pub fn write_record<W: Write>(
    out: &mut W,
    record: &SyscallRecord,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", record),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)
        }
    }
}

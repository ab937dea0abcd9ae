//! Errors raised by the trace session
//!
//! Only precondition and resource-acquisition failures surface here.
//! Anything that goes wrong while the record stream is being read
//! (unparseable lines, the output file vanishing) ends or thins the
//! stream instead of producing an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors for trace session setup
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to create trace output file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to launch helper {}: {source}", helper.display())]
    Spawn {
        helper: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TraceError>;

//! CLI argument parsing for dtruss-stream

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for syscall records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dtruss-stream")]
#[command(version)]
#[command(about = "Stream system calls of a target through a dtruss helper", long_about = None)]
pub struct Cli {
    /// Trace only this syscall (e.g., -t open)
    #[arg(short = 't', long = "syscall", value_name = "NAME")]
    pub syscall: Option<String>,

    /// Let the helper stop tracing after this many seconds
    #[arg(short = 'K', long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Helper script to run (overrides the config file)
    #[arg(long = "helper", value_name = "PATH")]
    pub helper: Option<PathBuf>,

    /// Interpreter for the helper script (overrides the config file)
    #[arg(long = "shell", value_name = "PATH")]
    pub shell: Option<PathBuf>,

    /// Wait between reads of the helper output, in milliseconds
    #[arg(long = "poll-interval-ms", value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output on stderr
    #[arg(long = "debug")]
    pub debug: bool,

    /// Executable to trace
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Arguments for the target (everything after --)
    #[arg(last = true)]
    pub args: Vec<String>,
}

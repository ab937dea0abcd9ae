use anyhow::{Context, Result};
use clap::Parser;
use dtruss_stream::{cli::Cli, output, TraceConfig, TraceRequest, TraceSession};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file first, then individual command-line overrides
fn load_config(args: &Cli) -> Result<TraceConfig> {
    let mut config = match &args.config {
        Some(path) => TraceConfig::from_file(path)?,
        None => TraceConfig::default(),
    };
    if let Some(helper) = &args.helper {
        config.helper = helper.clone();
    }
    if let Some(shell) = &args.shell {
        config.shell = shell.clone();
    }
    if let Some(ms) = args.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;

    let mut request = TraceRequest::new(args.target.as_str()).args(args.args.iter().cloned());
    if let Some(secs) = args.timeout {
        request = request.timeout(Duration::from_secs(secs));
    }
    if let Some(name) = &args.syscall {
        request = request.syscall(name.as_str());
    }

    let session = TraceSession::start(&config, &request)
        .with_context(|| format!("Failed to start trace of {}", args.target))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in session {
        output::write_record(&mut out, &record, args.format).context("Failed to write record")?;
        out.flush().context("Failed to flush output")?;
    }

    Ok(())
}

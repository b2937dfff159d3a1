mod cli;
mod error;
mod export;
mod model;
mod orchestrator;
mod render;
mod text_summary;
mod transform;
mod transport;
#[cfg(feature = "tui")]
mod tui;
mod validate;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Headless runs log to stderr. The TUI owns the terminal, so it only logs
/// when pointed at a file.
fn init_logging(args: &cli::Cli) -> Result<()> {
    let filter = |default: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter("info"))
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else if args.is_headless() {
        tracing_subscriber::fmt()
            .with_env_filter(filter("warn"))
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Where a failed run is reported. Each failure is reported exactly once.
#[derive(Debug, PartialEq, Eq)]
enum FailureSink {
    /// Plain message on stderr, then exit 1.
    Stderr,
    /// An `error!` event for the log file; the TUI has already left the screen.
    Log,
}

fn failure_sink(is_headless: bool) -> FailureSink {
    if is_headless {
        FailureSink::Stderr
    } else {
        FailureSink::Log
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(&args)?;
    let is_headless = args.is_headless();

    match cli::run(args).await {
        Ok(()) => Ok(()),
        Err(e) => match failure_sink(is_headless) {
            FailureSink::Stderr => {
                eprintln!("{e:#}");
                std::process::exit(1);
            }
            FailureSink::Log => {
                tracing::error!(error = %format!("{e:#}"), "run failed");
                Err(e)
            }
        },
    }
}

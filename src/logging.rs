use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log lines go.
pub enum LogSink<'a> {
    /// One-shot commands: plain stderr.
    Stderr,
    /// Appends to a file; the TUI owns the terminal.
    File(&'a Path),
    /// Nothing is printed.
    Off,
}

/// Installs the global subscriber. `RUST_LOG` overrides the default level.
pub fn init(sink: LogSink<'_>, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);

    match sink {
        LogSink::Stderr => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .context("install log subscriber")?,
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .try_init()
                .context("install log subscriber")?
        }
        LogSink::Off => registry
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
            .context("install log subscriber")?,
    }
    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use worksheets::config::{ClientConfig, DEFAULT_FILE};
use worksheets::logging::{self, LogSink};
use worksheets::routes::Route;

use crate::Commands;

#[derive(Parser)]
#[command(name = "worksheets")]
#[command(about = "Worksheet viewer and editor", long_about = None)]
pub(crate) struct Cli {
    /// Config file
    #[arg(long, env = "CODALAB_CONFIG", default_value = DEFAULT_FILE, global = true)]
    config: PathBuf,

    /// Server base URL, e.g. http://localhost:2900
    #[arg(long, env = "CODALAB_SERVER", global = true)]
    server: Option<String>,

    /// Worksheet to open (name or uuid)
    #[arg(long, env = "CODALAB_WORKSHEET", global = true)]
    worksheet: Option<String>,

    /// Write logs here while the TUI runs
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Settings shared by every subcommand.
pub(crate) struct Ctx {
    pub(crate) config_path: PathBuf,
    pub(crate) config: ClientConfig,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    let sink = match (&cli.command, &cli.log_file) {
        (None, Some(path)) => LogSink::File(path),
        (None, None) => LogSink::Off,
        (Some(_), _) => LogSink::Stderr,
    };
    logging::init(sink, cli.verbose)?;

    let config = ClientConfig::load(&cli.config)
        .with_context(|| format!("load config {}", cli.config.display()))?
        .with_overrides(cli.server.as_deref(), cli.worksheet.as_deref());
    tracing::debug!(base_url = %config.base_url, "config loaded");

    match cli.command {
        None => {
            let start = match config.default_worksheet.as_deref() {
                Some(spec) => Route::for_worksheet(spec),
                None => Route::Home,
            };
            worksheets::tui::run_with_options(worksheets::tui::TuiRunOptions { config, start })?;
        }
        Some(command) => {
            if cli.log_file.is_some() {
                anyhow::bail!("`--log-file` is only supported when running the TUI (no subcommand)");
            }
            let ctx = Ctx {
                config_path: cli.config,
                config,
            };
            crate::cli_exec::handle_command(&ctx, command)?
        }
    }

    Ok(())
}

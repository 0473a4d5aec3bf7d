use std::path::PathBuf;

use clap::Subcommand;

mod cli_exec;
mod cli_runtime;

#[derive(Subcommand)]
enum Commands {
    /// Print a worksheet's blocks
    Show {
        /// Worksheet name or uuid (defaults to the configured worksheet)
        worksheet: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a command against a worksheet, as typed in the terminal pane
    Cli {
        /// Command line, e.g. `ls` or `run 'echo hi'`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
        /// Emit the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// List completions for a partial command line
    Complete { prefix: String },

    /// Show a bundle and where it is in its lifecycle
    Bundle {
        uuid: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a bundle's contents
    Download {
        uuid: String,
        /// Destination file (defaults to the bundle uuid)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the bundle state ladder
    States {
        /// Bundle type: run, dataset, make or private
        #[arg(long = "type")]
        bundle_type: Option<String>,
        /// Explain one state
        #[arg(long)]
        state: Option<String>,
    },

    /// Send a message to the server's help address
    Feedback { message: String },

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "CODALAB_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        affiliation: Option<String>,
        #[arg(long, default_value = "")]
        captcha_token: String,
    },

    /// Client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    if let Err(err) = cli_runtime::run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

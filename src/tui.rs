use anyhow::Result;

use crate::config::ClientConfig;
use crate::routes::Route;

#[derive(Clone, Debug)]
pub struct TuiRunOptions {
    pub config: ClientConfig,
    /// First page to open.
    pub start: Route,
}

pub fn run_with_options(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(opts)
}

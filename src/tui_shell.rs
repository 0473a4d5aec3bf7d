use anyhow::Result;

mod app;
mod blocks;
mod modal;
mod render;
mod runtime;
mod time_utils;
mod worker;

use app::App;
use modal::{Modal, TextInputAction};

pub fn run(opts: crate::tui::TuiRunOptions) -> Result<()> {
    runtime::run(opts)
}

pub mod bundle_states;
pub mod config;
pub mod gateway;
pub mod keys;
pub mod logging;
pub mod model;
pub mod routes;
pub mod schema;
pub mod terminal;
pub mod tui;
pub mod worksheet;

mod tui_shell;

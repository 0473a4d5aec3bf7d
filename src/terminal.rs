//! Command terminal: a state object driven by a pure reducer.
//!
//! [`TerminalSession`] never performs I/O. Submitting a command or asking for
//! completions returns an [`Effect`]; the owner runs it against the gateway
//! and feeds the result back with the request id it was given.

mod actions;
mod input;
mod output;
mod session;

pub use self::actions::{Navigator, UiAction, dispatch, parse_ui_actions};
pub use self::input::LineInput;
pub use self::output::{RenderedOutput, Segment, is_full_uuid, rewrite_refs, trim_output};
pub use self::session::{
    Effect, EntryKind, MAX_HEIGHT_PERCENT, MIN_HEIGHT, TerminalEntry, TerminalSession,
};

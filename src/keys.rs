//! Scoped keyboard bindings.
//!
//! Scopes form a stack: the owner pushes one when a block gains focus and pops
//! it on blur, which drops every binding registered under it.

mod chord;
mod dispatcher;

pub use self::chord::{KeyChord, parse_sequence};
pub use self::dispatcher::{BLOCK_KEYS, Dispatch, KeyDispatcher, KeyError, ScopeToken};

//! Schema block engine: in-place editing of table schemas and their
//! serialization back into worksheet source directives.

use thiserror::Error;

mod autofill;
mod directive;
mod editor;
mod registry;
mod sanitize;

pub use self::autofill::{AUTOFILL_TABLE, autofill_post_processor};
pub use self::directive::{Directive, deserialize, parse_directive, serialize, tokenize};
pub use self::editor::{
    CellCursor, EditorState, SaveBlocked, SchemaEditor, SchemaUpdate, adjusted_after_sort_key,
};
pub use self::registry::EditorRegistry;
pub use self::sanitize::{sanitize_schema_name, sanitize_value};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("empty directive")]
    Empty,

    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),

    #[error("unknown directive `{0}`")]
    UnknownDirective(String),

    #[error("`{directive}` expects {expected} argument(s), got {got}")]
    Arity {
        directive: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("first directive must be `schema <name>`")]
    MissingSchemaHeader,

    #[error("unknown schema `{0}` in addschema")]
    UnknownSchema(String),
}

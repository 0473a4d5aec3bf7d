mod block;
mod bundle;
mod schema;
mod worksheet;

pub use self::block::{
    Block, BlockBody, BlockMode, BundleRowBlock, GraphBlock, ImageBlock, MarkdownBlock,
    PlaceholderBlock, RecordBlock, RecordRow, SubworksheetsBlock, TableBlock, WorksheetRef, props_equal,
};
pub use self::bundle::{BundleInfo, BundleState, BundleType};
pub use self::schema::{FieldKey, SCHEMA_HEADER, SchemaBlock, SchemaRow};
pub use self::worksheet::{Worksheet, WorksheetSummary};

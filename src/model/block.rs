use serde::{Deserialize, Serialize};

use super::{BundleInfo, SchemaBlock};

/// A worksheet block: server-owned source line ids, a sort key, and a
/// mode-tagged payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub ids: Vec<i64>,
    pub sort_key: i64,

    #[serde(flatten)]
    pub body: BlockBody,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BlockBody {
    Markdown(MarkdownBlock),
    BundleRow(BundleRowBlock),
    TableBlock(TableBlock),
    SchemaBlock(SchemaBlock),
    SubworksheetsBlock(SubworksheetsBlock),
    ImageBlock(ImageBlock),
    RecordBlock(RecordBlock),
    GraphBlock(GraphBlock),
    Placeholder(PlaceholderBlock),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockMode {
    Markdown,
    BundleRow,
    Table,
    Schema,
    Subworksheets,
    Image,
    Record,
    Graph,
    Placeholder,
}

impl BlockMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockMode::Markdown => "markdown",
            BlockMode::BundleRow => "bundle_row",
            BlockMode::Table => "table_block",
            BlockMode::Schema => "schema_block",
            BlockMode::Subworksheets => "subworksheets_block",
            BlockMode::Image => "image_block",
            BlockMode::Record => "record_block",
            BlockMode::Graph => "graph_block",
            BlockMode::Placeholder => "placeholder",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkdownBlock {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleRowBlock {
    pub bundle_info: BundleInfo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub header: Vec<String>,
    #[serde(default)]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub bundle_infos: Vec<BundleInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorksheetRef {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubworksheetsBlock {
    #[serde(default)]
    pub subworksheet_infos: Vec<WorksheetRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub bundle_info: Option<BundleInfo>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordBlock {
    #[serde(default)]
    pub bundle_info: Option<BundleInfo>,
    #[serde(default)]
    pub rows: Vec<RecordRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordRow {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphBlock {
    #[serde(default)]
    pub trajectories: Vec<serde_json::Value>,
    #[serde(default)]
    pub bundle_infos: Vec<BundleInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderBlock {
    #[serde(default)]
    pub directive: String,
}

impl Block {
    pub fn mode(&self) -> BlockMode {
        match &self.body {
            BlockBody::Markdown(_) => BlockMode::Markdown,
            BlockBody::BundleRow(_) => BlockMode::BundleRow,
            BlockBody::TableBlock(_) => BlockMode::Table,
            BlockBody::SchemaBlock(_) => BlockMode::Schema,
            BlockBody::SubworksheetsBlock(_) => BlockMode::Subworksheets,
            BlockBody::ImageBlock(_) => BlockMode::Image,
            BlockBody::RecordBlock(_) => BlockMode::Record,
            BlockBody::GraphBlock(_) => BlockMode::Graph,
            BlockBody::Placeholder(_) => BlockMode::Placeholder,
        }
    }

    /// Number of addressable sub-elements (rows) for sub-focus.
    pub fn sub_count(&self) -> usize {
        match &self.body {
            BlockBody::TableBlock(t) => t.rows.len(),
            BlockBody::SchemaBlock(s) => s.field_rows.len(),
            BlockBody::SubworksheetsBlock(s) => s.subworksheet_infos.len(),
            BlockBody::RecordBlock(r) => r.rows.len(),
            BlockBody::Markdown(_)
            | BlockBody::BundleRow(_)
            | BlockBody::ImageBlock(_)
            | BlockBody::GraphBlock(_)
            | BlockBody::Placeholder(_) => 0,
        }
    }

    /// `(min_id, max_id)` over the source lines this block occupies.
    pub fn min_max_keys(&self) -> Option<(i64, i64)> {
        let min = self.ids.iter().copied().min()?;
        let max = self.ids.iter().copied().max()?;
        Some((min, max))
    }

    pub fn schema(&self) -> Option<&SchemaBlock> {
        match &self.body {
            BlockBody::SchemaBlock(s) => Some(s),
            _ => None,
        }
    }

    /// Bundle referenced by this block at the given sub-element, if any.
    pub fn bundle_at(&self, sub: Option<usize>) -> Option<&BundleInfo> {
        match &self.body {
            BlockBody::BundleRow(b) => Some(&b.bundle_info),
            BlockBody::TableBlock(t) => t.bundle_infos.get(sub.unwrap_or(0)),
            BlockBody::ImageBlock(i) => i.bundle_info.as_ref(),
            BlockBody::RecordBlock(r) => r.bundle_info.as_ref(),
            BlockBody::GraphBlock(g) => g.bundle_infos.get(sub.unwrap_or(0)),
            _ => None,
        }
    }

    pub fn worksheet_at(&self, sub: Option<usize>) -> Option<&WorksheetRef> {
        match &self.body {
            BlockBody::SubworksheetsBlock(s) => s.subworksheet_infos.get(sub.unwrap_or(0)),
            _ => None,
        }
    }

    /// blake3 digest of the mode-specific payload.
    pub fn payload_digest(&self) -> blake3::Hash {
        let bytes = serde_json::to_vec(&self.body).unwrap_or_default();
        blake3::hash(&bytes)
    }
}

/// Render-suppression equality: ids, sort key, mode and payload digest agree.
pub fn props_equal(prev: &Block, next: &Block) -> bool {
    prev.ids == next.ids
        && prev.sort_key == next.sort_key
        && prev.mode() == next.mode()
        && prev.payload_digest() == next.payload_digest()
}

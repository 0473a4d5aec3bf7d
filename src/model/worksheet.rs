use serde::{Deserialize, Serialize};

use super::Block;

/// A worksheet as returned by `GET /rest/worksheets/<uuid>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub uuid: String,
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    /// Monotonic server cursor; bumps on every accepted mutation.
    #[serde(default, alias = "last_item_id")]
    pub revision: i64,

    #[serde(default)]
    pub edit_permission: bool,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Entry of the `GET /rest/worksheets?specs=` lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

use serde::{Deserialize, Serialize};

/// Column keys of every schema row, in display order.
pub const SCHEMA_HEADER: [&str; 3] = ["field", "generalized-path", "post-processor"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Field,
    GeneralizedPath,
    PostProcessor,
}

impl FieldKey {
    pub const ALL: [FieldKey; 3] = [
        FieldKey::Field,
        FieldKey::GeneralizedPath,
        FieldKey::PostProcessor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Field => SCHEMA_HEADER[0],
            FieldKey::GeneralizedPath => SCHEMA_HEADER[1],
            FieldKey::PostProcessor => SCHEMA_HEADER[2],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        FieldKey::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn next(self) -> Self {
        match self {
            FieldKey::Field => FieldKey::GeneralizedPath,
            FieldKey::GeneralizedPath | FieldKey::PostProcessor => FieldKey::PostProcessor,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FieldKey::Field | FieldKey::GeneralizedPath => FieldKey::Field,
            FieldKey::PostProcessor => FieldKey::GeneralizedPath,
        }
    }
}

/// One column definition inside a schema block.
///
/// `None` and `Some("")` serialize identically, but a `None` post-processor is
/// still eligible for autofill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRow {
    #[serde(default)]
    pub field: Option<String>,

    #[serde(rename = "generalized-path", default)]
    pub generalized_path: Option<String>,

    #[serde(rename = "post-processor", default)]
    pub post_processor: Option<String>,

    pub from_schema_name: String,
}

impl SchemaRow {
    /// Blank row owned by `schema_name`, as inserted by the editor.
    pub fn blank(schema_name: &str) -> Self {
        Self {
            field: Some(String::new()),
            generalized_path: Some(String::new()),
            post_processor: None,
            from_schema_name: schema_name.to_string(),
        }
    }

    pub fn local(schema_name: &str, field: &str, path: Option<&str>, post: Option<&str>) -> Self {
        Self {
            field: Some(field.to_string()),
            generalized_path: path.map(str::to_string),
            post_processor: post.map(str::to_string),
            from_schema_name: schema_name.to_string(),
        }
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        match key {
            FieldKey::Field => self.field.as_deref(),
            FieldKey::GeneralizedPath => self.generalized_path.as_deref(),
            FieldKey::PostProcessor => self.post_processor.as_deref(),
        }
    }

    pub fn set(&mut self, key: FieldKey, value: Option<String>) {
        match key {
            FieldKey::Field => self.field = value,
            FieldKey::GeneralizedPath => self.generalized_path = value,
            FieldKey::PostProcessor => self.post_processor = value,
        }
    }

    pub fn is_inherited(&self, schema_name: &str) -> bool {
        self.from_schema_name != schema_name
    }

    pub fn field_is_empty(&self) -> bool {
        self.field.as_deref().is_none_or(str::is_empty)
    }

    /// Collapses the null/empty distinction the source format cannot express.
    pub fn normalized(&self) -> Self {
        fn norm(v: &Option<String>) -> Option<String> {
            v.as_ref().filter(|s| !s.is_empty()).cloned()
        }
        Self {
            field: norm(&self.field),
            generalized_path: norm(&self.generalized_path),
            post_processor: norm(&self.post_processor),
            from_schema_name: self.from_schema_name.clone(),
        }
    }
}

fn default_header() -> Vec<String> {
    SCHEMA_HEADER.iter().map(|s| s.to_string()).collect()
}

/// Payload of a `schema_block`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBlock {
    pub schema_name: String,

    #[serde(default = "default_header")]
    pub header: Vec<String>,

    #[serde(default)]
    pub field_rows: Vec<SchemaRow>,
}

impl SchemaBlock {
    pub fn new(schema_name: &str, field_rows: Vec<SchemaRow>) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            header: default_header(),
            field_rows,
        }
    }

    /// Equality after dropping empty-field local rows and normalizing nulls.
    pub fn equivalent(&self, other: &SchemaBlock) -> bool {
        let keep = |s: &SchemaBlock| -> Vec<SchemaRow> {
            s.field_rows
                .iter()
                .filter(|r| r.is_inherited(&s.schema_name) || !r.field_is_empty())
                .map(SchemaRow::normalized)
                .collect()
        };
        self.schema_name == other.schema_name && keep(self) == keep(other)
    }

    /// Inherited rows must arrive as contiguous runs per origin schema.
    pub fn inheritance_is_contiguous(&self) -> bool {
        let mut closed: Vec<&str> = Vec::new();
        let mut current: Option<&str> = None;
        for row in &self.field_rows {
            let origin = if row.is_inherited(&self.schema_name) {
                Some(row.from_schema_name.as_str())
            } else {
                None
            };
            if origin != current {
                if let Some(prev) = current {
                    closed.push(prev);
                }
                if let Some(o) = origin
                    && closed.contains(&o)
                {
                    return false;
                }
                current = origin;
            }
        }
        true
    }
}

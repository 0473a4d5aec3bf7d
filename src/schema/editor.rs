use serde::Serialize;
use thiserror::Error;

use crate::model::{FieldKey, SchemaBlock, SchemaRow};
use crate::worksheet::MoveDirection;

use super::{autofill_post_processor, sanitize_schema_name, sanitize_value, serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    Collapsed,
    Expanded,
    Editing,
    Saving,
    ConfirmDelete,
}

/// Cell targeted by the editor's cell cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellCursor {
    pub row: usize,
    pub key: FieldKey,
}

/// Body of the block update call: replace source lines `ids` with
/// `directives`, inserted after `after_sort_key`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaUpdate {
    pub ids: Vec<i64>,
    pub after_sort_key: Option<i64>,
    pub directives: Vec<String>,
    pub create: bool,
    pub delete: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SaveBlocked {
    #[error("schema name is required")]
    MissingSchemaName,
    #[error("no edit permission")]
    PermissionDenied,
    #[error("a save is already in flight")]
    InFlight,
    #[error("no pending edits")]
    NotEditing,
    #[error("schema name `{0}` is already pulled in by addschema")]
    NameConflict(String),
}

/// `max(computed - 1, original)`.
///
/// The backend inserts replacement lines one position below the key it is
/// given, so the computed key is shifted back by one. A block created at an
/// explicit position never moves above it.
pub fn adjusted_after_sort_key(computed: Option<i64>, original: Option<i64>) -> Option<i64> {
    match (computed.map(|k| k - 1), original) {
        (Some(c), Some(o)) => Some(c.max(o)),
        (c, o) => c.or(o),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InFlight {
    Save,
    Delete,
}

#[derive(Clone, Debug)]
pub struct SchemaEditor {
    state: EditorState,
    before_confirm: EditorState,
    in_flight: Option<InFlight>,

    original: SchemaBlock,
    schema: SchemaBlock,
    ids: Vec<i64>,
    after_sort_key: Option<i64>,
    original_after_sort_key: Option<i64>,

    editable: bool,
    create: bool,
    dirty: bool,
    missing_schema_name: bool,
    name_conflict: Option<String>,
    error: Option<String>,
    cursor: Option<CellCursor>,
}

impl SchemaEditor {
    /// Editor for a schema block already on the worksheet.
    pub fn new(
        schema: SchemaBlock,
        ids: Vec<i64>,
        after_sort_key: Option<i64>,
        editable: bool,
    ) -> Self {
        Self {
            state: EditorState::Collapsed,
            before_confirm: EditorState::Collapsed,
            in_flight: None,
            original: schema.clone(),
            schema,
            ids,
            after_sort_key,
            original_after_sort_key: None,
            editable,
            create: false,
            dirty: false,
            missing_schema_name: false,
            name_conflict: None,
            error: None,
            cursor: None,
        }
    }

    /// Editor for a block that does not exist yet; it will be inserted after
    /// `after_sort_key` when saved.
    pub fn create(after_sort_key: Option<i64>, editable: bool) -> Self {
        let schema = SchemaBlock::new("", Vec::new());
        Self {
            state: EditorState::Editing,
            before_confirm: EditorState::Editing,
            in_flight: None,
            original: schema.clone(),
            schema,
            ids: Vec::new(),
            after_sort_key: None,
            original_after_sort_key: after_sort_key,
            editable,
            create: true,
            dirty: false,
            missing_schema_name: false,
            name_conflict: None,
            error: None,
            cursor: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn schema(&self) -> &SchemaBlock {
        &self.schema
    }

    pub fn rows(&self) -> &[SchemaRow] {
        &self.schema.field_rows
    }

    pub fn schema_name(&self) -> &str {
        &self.schema.schema_name
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn cursor(&self) -> Option<CellCursor> {
        self.cursor
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_create(&self) -> bool {
        self.create
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn missing_schema_name(&self) -> bool {
        self.missing_schema_name
    }

    /// Rejected rename target, set until a valid name is entered.
    pub fn name_conflict(&self) -> Option<&str> {
        self.name_conflict.as_deref()
    }

    pub fn is_expanded(&self) -> bool {
        self.state != EditorState::Collapsed
    }

    /// Whether the cell editors of row `i` accept input.
    pub fn row_editable(&self, i: usize) -> bool {
        self.editable
            && self
                .schema
                .field_rows
                .get(i)
                .is_some_and(|r| !r.is_inherited(&self.schema.schema_name))
    }

    /// Adopts a reloaded server copy of the block. Pending local edits win.
    pub fn sync(
        &mut self,
        schema: SchemaBlock,
        ids: Vec<i64>,
        after_sort_key: Option<i64>,
        editable: bool,
    ) {
        self.ids = ids;
        self.after_sort_key = after_sort_key;
        self.editable = editable;
        self.create = false;
        if matches!(
            self.state,
            EditorState::Editing | EditorState::Saving | EditorState::ConfirmDelete
        ) && self.dirty
        {
            self.original = schema;
            return;
        }
        self.original = schema.clone();
        self.schema = schema;
        self.dirty = false;
        self.clamp_cursor();
    }

    pub fn toggle_disclosure(&mut self) {
        self.state = match self.state {
            EditorState::Collapsed => EditorState::Expanded,
            EditorState::Expanded => EditorState::Collapsed,
            other => other,
        };
    }

    pub fn set_cursor_row(&mut self, row: Option<usize>) {
        self.cursor = row
            .filter(|r| *r < self.schema.field_rows.len())
            .map(|row| CellCursor {
                row,
                key: self.cursor.map(|c| c.key).unwrap_or(FieldKey::Field),
            });
    }

    pub fn move_cursor_key(&mut self, forward: bool) {
        if let Some(c) = self.cursor.as_mut() {
            c.key = if forward { c.key.next() } else { c.key.prev() };
        }
    }

    fn clamp_cursor(&mut self) {
        let n = self.schema.field_rows.len();
        self.cursor = self.cursor.and_then(|c| {
            (n > 0).then(|| CellCursor {
                row: c.row.min(n - 1),
                key: c.key,
            })
        });
    }

    /// Enters `Editing` for an edit attempt; false when edits are not allowed.
    fn begin_edit(&mut self) -> bool {
        if !self.editable {
            return false;
        }
        match self.state {
            EditorState::Expanded | EditorState::Editing => {
                self.state = EditorState::Editing;
                true
            }
            EditorState::Collapsed | EditorState::Saving | EditorState::ConfirmDelete => false,
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    /// Inserts a blank local row after `i` (at the top for `None`) and moves
    /// the cursor to its first cell. After an inherited row the new row goes
    /// below the end of that row's run.
    pub fn add_row_after(&mut self, i: Option<usize>) -> bool {
        let rows = &self.schema.field_rows;
        let at = match i {
            Some(i) if i < rows.len() => {
                let mut at = i + 1;
                if rows[i].is_inherited(&self.schema.schema_name) {
                    let origin = &rows[i].from_schema_name;
                    while at < rows.len() && rows[at].from_schema_name == *origin {
                        at += 1;
                    }
                }
                at
            }
            Some(_) => return false,
            None => 0,
        };
        if !self.begin_edit() {
            return false;
        }
        let row = SchemaRow::blank(&self.schema.schema_name);
        self.schema.field_rows.insert(at, row);
        self.cursor = Some(CellCursor {
            row: at,
            key: FieldKey::Field,
        });
        self.touch();
        true
    }

    pub fn remove_row(&mut self, i: usize) -> bool {
        if !self.row_editable(i) || !self.begin_edit() {
            return false;
        }
        self.schema.field_rows.remove(i);
        self.clamp_cursor();
        self.touch();
        true
    }

    /// Moves local row `i` one step, hopping over a whole inherited run so an
    /// `addschema` group is never split. Returns the row's new index.
    pub fn move_row(&mut self, i: usize, direction: MoveDirection) -> Option<usize> {
        if !self.row_editable(i) {
            return None;
        }
        let name = self.schema.schema_name.clone();
        let len = self.schema.field_rows.len();
        let step = |pos: usize| -> Option<usize> {
            match direction {
                MoveDirection::Up => pos.checked_sub(1),
                MoveDirection::Down => (pos + 1 < len).then_some(pos + 1),
            }
        };

        step(i)?;
        if !self.begin_edit() {
            return None;
        }

        let rows = &mut self.schema.field_rows;
        let mut pos = i;
        while let Some(next) = step(pos) {
            let partner = rows[next].from_schema_name.clone();
            rows.swap(pos, next);
            pos = next;
            if partner == name {
                break;
            }
            let still_inside = step(pos).is_some_and(|n| rows[n].from_schema_name == partner);
            if !still_inside {
                break;
            }
        }

        if let Some(c) = self.cursor.as_mut()
            && c.row == i
        {
            c.row = pos;
        }
        self.touch();
        Some(pos)
    }

    /// Assigns a sanitized cell value. Setting the path autofills a
    /// post-processor that was never set.
    pub fn set_field(&mut self, i: usize, key: FieldKey, value: &str) -> bool {
        if !self.row_editable(i) || !self.begin_edit() {
            return false;
        }
        let value = sanitize_value(value);
        let row = &mut self.schema.field_rows[i];
        row.set(key, Some(value.clone()));
        if key == FieldKey::GeneralizedPath
            && row.post_processor.is_none()
            && let Some(post) = autofill_post_processor(&value)
        {
            row.post_processor = Some(post.to_string());
        }
        self.touch();
        true
    }

    /// Renames the schema; local rows follow the new name. A name already
    /// used by an inherited run is refused and blocks saving until replaced.
    pub fn set_schema_name(&mut self, name: &str) -> bool {
        if !self.begin_edit() {
            return false;
        }
        let name = sanitize_schema_name(name);
        let current = &self.schema.schema_name;
        if name != *current
            && self
                .schema
                .field_rows
                .iter()
                .any(|r| r.is_inherited(current) && r.from_schema_name == name)
        {
            self.name_conflict = Some(name);
            return false;
        }
        self.name_conflict = None;
        let old = std::mem::replace(&mut self.schema.schema_name, name.clone());
        for row in &mut self.schema.field_rows {
            if row.from_schema_name == old {
                row.from_schema_name = name.clone();
            }
        }
        self.missing_schema_name = name.is_empty();
        self.touch();
        true
    }

    pub fn directives(&self) -> Vec<String> {
        serialize(&self.schema)
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    /// `Enter` while focused: expand a collapsed block, or save a named dirty
    /// schema that is being edited.
    pub fn on_enter(&mut self) -> Option<SchemaUpdate> {
        match self.state {
            EditorState::Collapsed => {
                self.state = EditorState::Expanded;
                None
            }
            EditorState::Editing if self.dirty && !self.schema.schema_name.is_empty() => {
                self.request_save().ok()
            }
            _ => None,
        }
    }

    pub fn request_save(&mut self) -> Result<SchemaUpdate, SaveBlocked> {
        if !self.editable {
            return Err(SaveBlocked::PermissionDenied);
        }
        match self.state {
            EditorState::Saving => return Err(SaveBlocked::InFlight),
            EditorState::Editing => {}
            _ => return Err(SaveBlocked::NotEditing),
        }
        if let Some(name) = &self.name_conflict {
            return Err(SaveBlocked::NameConflict(name.clone()));
        }
        if self.schema.schema_name.is_empty() {
            self.missing_schema_name = true;
            return Err(SaveBlocked::MissingSchemaName);
        }

        self.state = EditorState::Saving;
        self.in_flight = Some(InFlight::Save);
        self.error = None;
        Ok(SchemaUpdate {
            ids: self.ids.clone(),
            after_sort_key: adjusted_after_sort_key(
                self.after_sort_key,
                self.original_after_sort_key,
            ),
            directives: self.directives(),
            create: self.create,
            delete: false,
        })
    }

    /// Drops local edits and returns to `Expanded`.
    pub fn revert(&mut self) {
        if self.state != EditorState::Editing {
            return;
        }
        self.schema = self.original.clone();
        self.dirty = false;
        self.missing_schema_name = false;
        self.name_conflict = None;
        self.error = None;
        self.clamp_cursor();
        if !self.create {
            self.state = EditorState::Expanded;
        }
    }

    /// Focus left the block. Unsaved edits and an unanswered delete
    /// confirmation are dropped; a save in flight is left alone.
    pub fn blur(&mut self) {
        if self.state == EditorState::ConfirmDelete {
            self.state = self.before_confirm;
        }
        self.revert();
        self.cursor = None;
    }

    /// `Backspace`/`Del` while focused. Blocks not yet on the server have
    /// nothing to delete.
    pub fn request_delete(&mut self) -> bool {
        if !self.editable || self.create {
            return false;
        }
        match self.state {
            EditorState::Saving | EditorState::ConfirmDelete => false,
            prior => {
                self.before_confirm = prior;
                self.state = EditorState::ConfirmDelete;
                true
            }
        }
    }

    /// Answer to the delete confirmation. A confirmed delete yields the
    /// update to send; a refusal restores the prior state untouched.
    pub fn resolve_delete(&mut self, confirmed: bool) -> Option<SchemaUpdate> {
        if self.state != EditorState::ConfirmDelete {
            return None;
        }
        if !confirmed {
            self.state = self.before_confirm;
            return None;
        }
        self.state = EditorState::Saving;
        self.in_flight = Some(InFlight::Delete);
        Some(SchemaUpdate {
            ids: self.ids.clone(),
            after_sort_key: adjusted_after_sort_key(
                self.after_sort_key,
                self.original_after_sort_key,
            ),
            directives: Vec::new(),
            create: false,
            delete: true,
        })
    }

    /// Completion of the update call started by a save or a delete.
    pub fn finish_save(&mut self, result: Result<(), String>) {
        if self.state != EditorState::Saving {
            return;
        }
        let op = self.in_flight.take();
        match result {
            Ok(()) => {
                self.error = None;
                self.dirty = false;
                self.original = self.schema.clone();
                self.create = false;
                self.state = match op {
                    Some(InFlight::Delete) => EditorState::Collapsed,
                    _ => EditorState::Expanded,
                };
            }
            Err(message) => {
                self.error = Some(message);
                self.state = EditorState::Editing;
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/schema/editor_tests.rs"]
mod tests;

use crate::schema::{EditorState, SaveBlocked, SchemaEditor};
use crate::worksheet::MoveDirection;

use super::super::modal::ModalOutcome;
use super::super::worker::SaveTarget;
use super::super::{Modal, TextInputAction};
use super::actions::SchemaAction;
use super::{App, Draft};

impl App {
    fn editor_mut(&mut self, target: &SaveTarget) -> Option<&mut SchemaEditor> {
        match target {
            SaveTarget::Draft => self.draft.as_mut().map(|d| &mut d.editor),
            SaveTarget::Block(ids) => self.editors.by_ids_mut(ids),
        }
    }

    /// Save target for the schema block at `index`, creating its editor.
    pub(super) fn block_target(&mut self, index: usize) -> Option<SaveTarget> {
        self.editor_at(index)?;
        let block = self.worksheet.as_ref()?.blocks().get(index)?;
        Some(SaveTarget::Block(block.ids.clone()))
    }

    /// Editor that text-input modals write into: the draft when one is open,
    /// otherwise the focused schema block.
    fn edit_target(&self) -> Option<SaveTarget> {
        if self.draft.is_some() {
            return Some(SaveTarget::Draft);
        }
        let block = self.worksheet.as_ref()?.focused_block()?;
        block.schema()?;
        Some(SaveTarget::Block(block.ids.clone()))
    }

    /// Opens an unsaved schema block below the focused block.
    pub(super) fn start_draft(&mut self) -> bool {
        if self.draft.is_some() {
            return false;
        }
        let Some(ws) = &self.worksheet else {
            return false;
        };
        if !ws.edit_permission() {
            return false;
        }
        let anchor = ws.focus().map(|f| f.index);
        let after = ws.insert_after_sort_key(anchor);
        self.draft = Some(Draft {
            anchor,
            editor: SchemaEditor::create(after, true),
        });
        self.bind_draft_scope();
        self.modal = Some(Modal::text_input(
            "New schema",
            "schema name",
            "",
            TextInputAction::RenameSchema,
        ));
        true
    }

    pub(super) fn discard_draft(&mut self) {
        self.draft = None;
        if let Some(token) = self.draft_scope.take() {
            self.keys.pop_scope(token);
        }
    }

    /// `Backspace`/`Del` on a schema block: ask before deleting.
    pub(super) fn schema_delete(&mut self, index: usize) -> bool {
        let Some(target) = self.block_target(index) else {
            return false;
        };
        let Some(editor) = self.editor_mut(&target) else {
            return false;
        };
        if !editor.request_delete() {
            return false;
        }
        let name = editor.schema_name().to_string();
        self.modal = Some(Modal::confirm_delete(target, &name));
        true
    }

    /// Validation failures surface in the status line; permission denials
    /// stay silent.
    fn save(&mut self, target: SaveTarget) -> bool {
        let Some(editor) = self.editor_mut(&target) else {
            return false;
        };
        match editor.request_save() {
            Ok(update) => {
                self.send_save(target, update);
                true
            }
            Err(SaveBlocked::NotEditing | SaveBlocked::PermissionDenied) => false,
            Err(blocked) => {
                self.set_error(blocked.to_string());
                true
            }
        }
    }

    pub(super) fn schema_action(&mut self, index: Option<usize>, action: SchemaAction) -> bool {
        let target = match index {
            Some(index) => match self.block_target(index) {
                Some(target) => target,
                None => return false,
            },
            None => SaveTarget::Draft,
        };
        match action {
            SchemaAction::Save => self.save(target),
            SchemaAction::Revert => {
                if target == SaveTarget::Draft {
                    self.discard_draft();
                    return true;
                }
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                match editor.state() {
                    EditorState::Editing => editor.revert(),
                    EditorState::Expanded => editor.toggle_disclosure(),
                    _ => return false,
                }
                true
            }
            SchemaAction::ToggleDisclosure => {
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                editor.toggle_disclosure();
                true
            }
            SchemaAction::AddRow => {
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                let after = editor.cursor().map(|c| c.row);
                editor.add_row_after(after)
            }
            SchemaAction::RemoveRow => {
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                match editor.cursor() {
                    Some(c) => editor.remove_row(c.row),
                    None => false,
                }
            }
            SchemaAction::MoveRowUp | SchemaAction::MoveRowDown => {
                let direction = if action == SchemaAction::MoveRowUp {
                    MoveDirection::Up
                } else {
                    MoveDirection::Down
                };
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                let Some(c) = editor.cursor() else {
                    return false;
                };
                editor.move_row(c.row, direction).is_some()
            }
            SchemaAction::NextColumn | SchemaAction::PrevColumn => {
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                if editor.cursor().is_none() {
                    return false;
                }
                editor.move_cursor_key(action == SchemaAction::NextColumn);
                true
            }
            SchemaAction::EditCell => self.open_cell_editor(&target),
            SchemaAction::Rename => {
                let Some(editor) = self.editor_mut(&target) else {
                    return false;
                };
                if !editor.editable() || !editor.is_expanded() {
                    return false;
                }
                let current = editor.schema_name().to_string();
                self.modal = Some(Modal::text_input(
                    "Rename schema",
                    "schema name",
                    &current,
                    TextInputAction::RenameSchema,
                ));
                true
            }
            SchemaAction::CursorDown => {
                if self.step_cursor(&target, MoveDirection::Down) {
                    return true;
                }
                match index {
                    Some(_) => self.step_block(MoveDirection::Down),
                    None => true,
                }
            }
            SchemaAction::CursorUp => {
                if self.step_cursor(&target, MoveDirection::Up) {
                    return true;
                }
                match index {
                    Some(_) => self.step_block(MoveDirection::Up),
                    None => true,
                }
            }
        }
    }

    /// Moves the cell cursor one row; false when it would leave the block.
    fn step_cursor(&mut self, target: &SaveTarget, direction: MoveDirection) -> bool {
        let Some(editor) = self.editor_mut(target) else {
            return false;
        };
        if !editor.is_expanded() || editor.rows().is_empty() {
            return false;
        }
        let rows = editor.rows().len();
        let next = match (direction, editor.cursor().map(|c| c.row)) {
            (MoveDirection::Down, None) => Some(Some(0)),
            (MoveDirection::Down, Some(r)) if r + 1 < rows => Some(Some(r + 1)),
            (MoveDirection::Up, Some(0)) => Some(None),
            (MoveDirection::Up, Some(r)) => Some(Some(r - 1)),
            _ => None,
        };
        match next {
            Some(row) => {
                editor.set_cursor_row(row);
                true
            }
            None => false,
        }
    }

    /// Inherited rows are read-only here; the cell editor does not open.
    fn open_cell_editor(&mut self, target: &SaveTarget) -> bool {
        let Some(editor) = self.editor_mut(target) else {
            return false;
        };
        let Some(c) = editor.cursor() else {
            return false;
        };
        if !editor.row_editable(c.row) {
            return false;
        }
        let current = editor.rows()[c.row].get(c.key).unwrap_or("").to_string();
        self.modal = Some(Modal::text_input(
            &format!("Row {}", c.row + 1),
            c.key.as_str(),
            &current,
            TextInputAction::EditCell {
                row: c.row,
                key: c.key,
            },
        ));
        true
    }

    pub(super) fn apply_modal_outcome(&mut self, outcome: ModalOutcome) {
        match outcome {
            ModalOutcome::None => {}
            ModalOutcome::Close => self.modal = None,
            ModalOutcome::Delete { target, confirmed } => {
                self.modal = None;
                let update = self
                    .editor_mut(&target)
                    .and_then(|editor| editor.resolve_delete(confirmed));
                if let Some(update) = update {
                    self.send_save(target, update);
                }
            }
            ModalOutcome::Submit { action, value } => {
                self.modal = None;
                let Some(target) = self.edit_target() else {
                    return;
                };
                let Some(editor) = self.editor_mut(&target) else {
                    return;
                };
                let applied = match action {
                    TextInputAction::EditCell { row, key } => editor.set_field(row, key, &value),
                    TextInputAction::RenameSchema => editor.set_schema_name(&value),
                };
                if applied {
                    return;
                }
                if let Some(name) = editor.name_conflict() {
                    let msg = SaveBlocked::NameConflict(name.to_string()).to_string();
                    self.set_error(msg);
                }
            }
        }
    }
}

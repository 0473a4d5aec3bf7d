use std::collections::BTreeMap;

use crate::worksheet::WorksheetModel;

use super::{EditorState, SchemaEditor};

struct Entry {
    /// Block index the editor was last seen at.
    index: usize,
    editor: SchemaEditor,
}

/// Schema editors of the open worksheet, keyed by the server ids of the block
/// they edit. A reload that puts a different block at an index never hands
/// that block another block's editor.
#[derive(Default)]
pub struct EditorRegistry {
    editors: BTreeMap<Vec<i64>, Entry>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    pub fn clear(&mut self) {
        self.editors.clear();
    }

    pub fn get(&self, ids: &[i64]) -> Option<&SchemaEditor> {
        self.editors.get(ids).map(|e| &e.editor)
    }

    pub fn by_ids_mut(&mut self, ids: &[i64]) -> Option<&mut SchemaEditor> {
        self.editors.get_mut(ids).map(|e| &mut e.editor)
    }

    /// Editor for the schema block at `index`, created on first use. Blocks
    /// that are not schemas, or have no server ids yet, get none.
    pub fn editor_at(&mut self, ws: &WorksheetModel, index: usize) -> Option<&mut SchemaEditor> {
        let block = ws.blocks().get(index)?;
        let schema = block.schema()?;
        if block.ids.is_empty() {
            return None;
        }
        let entry = self.editors.entry(block.ids.clone()).or_insert_with(|| Entry {
            index,
            editor: SchemaEditor::new(
                schema.clone(),
                block.ids.clone(),
                ws.compute_after_sort_key(block),
                ws.edit_permission(),
            ),
        });
        entry.index = index;
        Some(&mut entry.editor)
    }

    /// Focus left the block with these ids.
    pub fn blur(&mut self, ids: &[i64]) {
        if let Some(entry) = self.editors.get_mut(ids) {
            entry.editor.blur();
        }
    }

    /// Re-points editors at a reloaded worksheet.
    ///
    /// An editor whose ids still name a schema block follows that block. A
    /// clean editor whose ids vanished (the server renumbers rows on save)
    /// moves to the schema block now at its old index when that block has
    /// the same name and no editor of its own. Editors with a save in flight
    /// wait for the result under their old ids. Anything else is dropped,
    /// unsaved edits included.
    pub fn sync(&mut self, ws: &WorksheetModel) {
        let editable = ws.edit_permission();
        let mut stale = std::mem::take(&mut self.editors);

        for (index, block) in ws.blocks().iter().enumerate() {
            let Some(schema) = block.schema() else {
                continue;
            };
            if let Some(mut entry) = stale.remove(&block.ids) {
                entry.index = index;
                entry.editor.sync(
                    schema.clone(),
                    block.ids.clone(),
                    ws.compute_after_sort_key(block),
                    editable,
                );
                self.editors.insert(block.ids.clone(), entry);
            }
        }

        for (ids, mut entry) in stale {
            if entry.editor.state() == EditorState::Saving {
                self.editors.insert(ids, entry);
                continue;
            }
            if entry.editor.is_dirty() {
                tracing::warn!(?ids, "schema block changed under pending edits; dropping them");
                continue;
            }
            let Some(block) = ws.blocks().get(entry.index) else {
                continue;
            };
            let Some(schema) = block.schema() else {
                continue;
            };
            if block.ids.is_empty()
                || schema.schema_name != entry.editor.schema_name()
                || self.editors.contains_key(&block.ids)
            {
                continue;
            }
            entry.editor.sync(
                schema.clone(),
                block.ids.clone(),
                ws.compute_after_sort_key(block),
                editable,
            );
            self.editors.insert(block.ids.clone(), entry);
        }
    }
}

#[cfg(test)]
#[path = "../tests/schema/registry_tests.rs"]
mod tests;

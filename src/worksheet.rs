//! Worksheet item model: the ordered block list plus the focus pointer.
//!
//! The model is a value. Every verb returns a new [`WorksheetModel`] that the
//! owner swaps in; nothing mutates a model other code may still hold.

use std::sync::Arc;

use thiserror::Error;

use crate::model::{Block, Worksheet, props_equal};

mod focus;

pub use self::focus::{Focus, FocusChange, MoveDirection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorksheetError {
    #[error("blocks share sort key {0}")]
    DuplicateSortKey(i64),

    #[error("schema `{0}` interleaves inherited rows from the same addschema origin")]
    NonContiguousInheritance(String),
}

#[derive(Clone, Debug)]
pub struct WorksheetModel {
    uuid: String,
    name: String,
    title: Option<String>,
    revision: i64,
    edit_permission: bool,
    blocks: Arc<Vec<Block>>,
    focus: Option<Focus>,
    dirty: Arc<Vec<bool>>,
}

/// Result of a verb: the next model and the focus change it caused, if any.
#[derive(Clone, Debug)]
pub struct Update {
    pub model: WorksheetModel,
    pub change: Option<FocusChange>,
}

impl WorksheetModel {
    /// Orders blocks by sort key and validates the worksheet invariants.
    pub fn from_worksheet(ws: Worksheet) -> Result<Self, WorksheetError> {
        let mut blocks = ws.blocks;
        blocks.sort_by_key(|b| b.sort_key);
        for pair in blocks.windows(2) {
            if pair[0].sort_key == pair[1].sort_key {
                return Err(WorksheetError::DuplicateSortKey(pair[0].sort_key));
            }
        }
        for block in &blocks {
            if let Some(schema) = block.schema()
                && !schema.inheritance_is_contiguous()
            {
                return Err(WorksheetError::NonContiguousInheritance(
                    schema.schema_name.clone(),
                ));
            }
        }

        let dirty = vec![true; blocks.len()];
        Ok(Self {
            uuid: ws.uuid,
            name: ws.name,
            title: ws.title,
            revision: ws.revision,
            edit_permission: ws.edit_permission,
            blocks: Arc::new(blocks),
            focus: None,
            dirty: Arc::new(dirty),
        })
    }

    /// Adopts a freshly loaded revision of the same worksheet.
    ///
    /// Blocks equal under [`props_equal`] to the block previously at the same
    /// position are marked clean; focus is kept and clamped.
    pub fn reload(&self, ws: Worksheet) -> Result<Update, WorksheetError> {
        let mut next = Self::from_worksheet(ws)?;
        let dirty: Vec<bool> = next
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| self.blocks.get(i).is_none_or(|prev| !props_equal(prev, b)))
            .collect();
        next.dirty = Arc::new(dirty);
        next.focus = self
            .focus
            .and_then(|f| focus::clamp(&next.blocks, f.index, f.sub));
        let change = (next.focus != self.focus).then_some(FocusChange {
            from: self.focus,
            to: next.focus,
        });
        Ok(Update { model: next, change })
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    pub fn edit_permission(&self) -> bool {
        self.edit_permission
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    pub fn focused_block(&self) -> Option<&Block> {
        self.focus.and_then(|f| self.blocks.get(f.index))
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        self.dirty.get(index).copied().unwrap_or(false)
    }

    /// Marks every block as rendered.
    pub fn mark_clean(&self) -> Self {
        let mut next = self.clone();
        next.dirty = Arc::new(vec![false; self.blocks.len()]);
        next
    }

    /// Sets focus to `(block, sub)`, clamping both indices. `None` unfocuses.
    pub fn set_focus(&self, target: Option<(usize, Option<usize>)>) -> Update {
        let clamped = target.and_then(|(i, sub)| focus::clamp(&self.blocks, i, sub));
        self.with_focus(clamped)
    }

    pub fn move_focus(&self, direction: MoveDirection) -> Update {
        let next = focus::step(&self.blocks, self.focus, direction);
        self.with_focus(next)
    }

    fn with_focus(&self, next: Option<Focus>) -> Update {
        let mut model = self.clone();
        let change = (next != self.focus).then_some(FocusChange {
            from: self.focus,
            to: next,
        });
        model.focus = next;
        Update { model, change }
    }

    /// Largest sort key strictly below `block`'s, or `None` when it is first.
    pub fn compute_after_sort_key(&self, block: &Block) -> Option<i64> {
        self.blocks
            .iter()
            .map(|b| b.sort_key)
            .filter(|k| *k < block.sort_key)
            .max()
    }

    /// Sort key to insert a new block directly below `index`.
    pub fn insert_after_sort_key(&self, index: Option<usize>) -> Option<i64> {
        index
            .and_then(|i| self.blocks.get(i))
            .map(|b| b.sort_key)
    }
}

#[cfg(test)]
#[path = "tests/worksheet/model_tests.rs"]
mod tests;

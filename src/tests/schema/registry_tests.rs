use super::*;
use crate::model::{Block, BlockBody, FieldKey, MarkdownBlock, SchemaBlock, SchemaRow, Worksheet};

fn schema(sort_key: i64, ids: &[i64], name: &str, fields: &[&str]) -> Block {
    let rows = fields
        .iter()
        .map(|f| SchemaRow::local(name, f, None, None))
        .collect();
    Block {
        ids: ids.to_vec(),
        sort_key,
        body: BlockBody::SchemaBlock(SchemaBlock::new(name, rows)),
    }
}

fn markdown(sort_key: i64, ids: &[i64]) -> Block {
    Block {
        ids: ids.to_vec(),
        sort_key,
        body: BlockBody::Markdown(MarkdownBlock {
            text: "notes".to_string(),
        }),
    }
}

fn model(blocks: Vec<Block>) -> WorksheetModel {
    WorksheetModel::from_worksheet(Worksheet {
        uuid: "0xws".to_string(),
        name: "home".to_string(),
        title: None,
        revision: 1,
        edit_permission: true,
        blocks,
    })
    .expect("model")
}

fn dirty_editor(reg: &mut EditorRegistry, ws: &WorksheetModel, index: usize, field: &str) {
    let editor = reg.editor_at(ws, index).expect("schema editor");
    editor.toggle_disclosure();
    assert!(editor.set_field(0, FieldKey::Field, field));
}

#[test]
fn only_schema_blocks_get_editors() {
    let ws = model(vec![markdown(1, &[1]), schema(2, &[2, 3], "a", &["x"])]);
    let mut reg = EditorRegistry::new();
    assert!(reg.editor_at(&ws, 0).is_none());
    assert!(reg.editor_at(&ws, 1).is_some());
    assert!(reg.editor_at(&ws, 2).is_none());
    assert_eq!(reg.len(), 1);
    assert!(reg.get(&[2, 3]).is_some());
}

#[test]
fn pending_edits_follow_their_block_when_it_shifts() {
    let ws = model(vec![schema(2, &[2, 3], "a", &["x"])]);
    let mut reg = EditorRegistry::new();
    dirty_editor(&mut reg, &ws, 0, "edited");

    let ws = model(vec![markdown(1, &[1]), schema(2, &[2, 3], "a", &["x"])]);
    reg.sync(&ws);
    let editor = reg.editor_at(&ws, 1).expect("shifted editor");
    assert!(editor.is_dirty());
    assert_eq!(editor.rows()[0].field.as_deref(), Some("edited"));
}

#[test]
fn a_block_moved_under_a_dirty_editor_gets_its_own_editor() {
    let ws = model(vec![
        schema(1, &[1, 2], "a", &["a1"]),
        schema(2, &[3, 4], "b", &["b1"]),
    ]);
    let mut reg = EditorRegistry::new();
    dirty_editor(&mut reg, &ws, 0, "edited");

    // Block `a` was deleted elsewhere; `b` now sits at index 0.
    let ws = model(vec![schema(2, &[3, 4], "b", &["b1"])]);
    reg.sync(&ws);
    assert!(reg.is_empty());

    let editor = reg.editor_at(&ws, 0).expect("editor for b");
    assert!(!editor.is_dirty());
    assert_eq!(editor.schema_name(), "b");
    editor.toggle_disclosure();
    assert!(editor.set_field(0, FieldKey::Field, "b2"));
    let update = editor.request_save().expect("save");
    assert_eq!(update.ids, vec![3, 4]);
    assert_eq!(update.directives, vec!["schema b", "add 'b2'"]);
}

#[test]
fn clean_editor_survives_renumbered_ids() {
    let ws = model(vec![schema(1, &[1, 2], "a", &["x"])]);
    let mut reg = EditorRegistry::new();
    reg.editor_at(&ws, 0).expect("editor").toggle_disclosure();

    let ws = model(vec![schema(1, &[7, 8, 9], "a", &["x", "y"])]);
    reg.sync(&ws);
    assert!(reg.get(&[1, 2]).is_none());
    let editor = reg.get(&[7, 8, 9]).expect("re-keyed");
    assert!(editor.is_expanded());
    assert_eq!(editor.rows().len(), 2);

    let ws = model(vec![schema(1, &[10, 11], "renamed", &["x"])]);
    reg.sync(&ws);
    assert!(reg.is_empty());
}

#[test]
fn save_in_flight_waits_under_its_old_ids() {
    let ws = model(vec![schema(1, &[1, 2], "a", &["x"])]);
    let mut reg = EditorRegistry::new();
    dirty_editor(&mut reg, &ws, 0, "edited");
    reg.by_ids_mut(&[1, 2])
        .expect("editor")
        .request_save()
        .expect("save");

    let ws = model(vec![schema(1, &[5, 6], "a", &["edited"])]);
    reg.sync(&ws);
    let editor = reg.by_ids_mut(&[1, 2]).expect("still tracked");
    assert_eq!(editor.state(), EditorState::Saving);
    editor.finish_save(Ok(()));

    reg.sync(&ws);
    assert!(reg.get(&[1, 2]).is_none());
    assert!(reg.get(&[5, 6]).is_some());
}

#[test]
fn blur_drops_pending_edits() {
    let ws = model(vec![schema(1, &[1, 2], "a", &["x"])]);
    let mut reg = EditorRegistry::new();
    dirty_editor(&mut reg, &ws, 0, "edited");
    reg.blur(&[1, 2]);
    let editor = reg.get(&[1, 2]).expect("editor");
    assert!(!editor.is_dirty());
    assert_eq!(editor.rows()[0].field.as_deref(), Some("x"));
}

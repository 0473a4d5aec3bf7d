use super::super::TextInputAction;
use super::super::modal::ModalOutcome;
use super::actions::SchemaAction;
use super::*;
use crate::model::{Block, FieldKey, SchemaBlock, SchemaRow, Worksheet};
use crate::tui::TuiRunOptions;

fn schema(sort_key: i64, ids: &[i64], name: &str, rows: Vec<SchemaRow>) -> Block {
    Block {
        ids: ids.to_vec(),
        sort_key,
        body: BlockBody::SchemaBlock(SchemaBlock::new(name, rows)),
    }
}

fn inherited(sort_key: i64, ids: &[i64]) -> Block {
    schema(
        sort_key,
        ids,
        "base",
        vec![
            SchemaRow::local("base", "localfield", None, None),
            SchemaRow::local("other", "o1", None, None),
        ],
    )
}

fn plain(sort_key: i64, ids: &[i64], name: &str) -> Block {
    schema(
        sort_key,
        ids,
        name,
        vec![SchemaRow::local(name, "f", None, None)],
    )
}

fn worksheet(edit_permission: bool, blocks: Vec<Block>) -> Worksheet {
    Worksheet {
        uuid: "0xws".to_string(),
        name: "home".to_string(),
        title: None,
        revision: 1,
        edit_permission,
        blocks,
    }
}

fn app_with(ws: Worksheet) -> App {
    let mut app = App::load(TuiRunOptions {
        config: ClientConfig::default(),
        start: Route::Home,
    })
    .expect("app");
    let model = WorksheetModel::from_worksheet(ws).expect("model");
    app.apply_update(model.set_focus(Some((0, None))));
    app.page = Page::Worksheet;
    app
}

fn focus(app: &mut App, index: usize) {
    let update = app
        .worksheet
        .as_ref()
        .expect("worksheet")
        .set_focus(Some((index, None)));
    app.apply_update(update);
}

#[test]
fn read_only_worksheet_ignores_edits_without_a_banner() {
    let mut app = app_with(worksheet(false, vec![plain(1, &[1, 2], "s")]));
    assert!(!app.start_draft());
    assert!(app.draft.is_none());

    assert!(app.schema_action(Some(0), SchemaAction::ToggleDisclosure));
    assert!(!app.schema_action(Some(0), SchemaAction::AddRow));
    assert!(!app.schema_action(Some(0), SchemaAction::Save));
    assert!(app.status.is_none());
    assert!(!app.editors.get(&[1, 2]).expect("editor").is_dirty());
}

#[test]
fn inherited_row_does_not_open_the_cell_editor() {
    let mut app = app_with(worksheet(true, vec![inherited(1, &[1, 2, 3])]));
    assert!(app.schema_action(Some(0), SchemaAction::ToggleDisclosure));
    app.editor_at(0).expect("editor").set_cursor_row(Some(1));

    assert!(!app.schema_action(Some(0), SchemaAction::EditCell));
    assert!(app.modal.is_none());
    assert!(app.status.is_none());
}

#[test]
fn rename_onto_an_inherited_origin_is_reported() {
    let mut app = app_with(worksheet(true, vec![inherited(1, &[1, 2, 3])]));
    assert!(app.schema_action(Some(0), SchemaAction::ToggleDisclosure));
    app.apply_modal_outcome(ModalOutcome::Submit {
        action: TextInputAction::RenameSchema,
        value: "other".to_string(),
    });
    let status = app.status.as_ref().expect("validation banner");
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.contains("other"));

    assert!(app.schema_action(Some(0), SchemaAction::Save));
    let editor = app.editors.get(&[1, 2, 3]).expect("editor");
    assert_eq!(editor.schema_name(), "base");
    assert_eq!(editor.state(), crate::schema::EditorState::Editing);
}

#[test]
fn leaving_a_block_drops_its_unsaved_edits() {
    let mut app = app_with(worksheet(
        true,
        vec![plain(1, &[1, 2], "a"), plain(2, &[3, 4], "b")],
    ));
    assert!(app.schema_action(Some(0), SchemaAction::ToggleDisclosure));
    let editor = app.editor_at(0).expect("editor");
    assert!(editor.set_field(0, FieldKey::Field, "pending"));
    assert!(editor.is_dirty());

    focus(&mut app, 1);
    let editor = app.editors.get(&[1, 2]).expect("editor");
    assert!(!editor.is_dirty());
    assert_eq!(editor.rows()[0].field.as_deref(), Some("f"));
}

#[test]
fn reload_never_pairs_an_editor_with_another_block() {
    let mut app = app_with(worksheet(
        true,
        vec![plain(1, &[1, 2], "a"), plain(2, &[3, 4], "b")],
    ));
    assert!(app.schema_action(Some(0), SchemaAction::ToggleDisclosure));
    assert!(
        app.editor_at(0)
            .expect("editor")
            .set_field(0, FieldKey::Field, "pending")
    );

    let update = app
        .worksheet
        .as_ref()
        .expect("worksheet")
        .reload(worksheet(true, vec![plain(2, &[3, 4], "b")]))
        .expect("reload");
    app.apply_update(update);
    app.sync_editors();

    assert!(app.editors.get(&[1, 2]).is_none());
    assert_eq!(app.block_target(0), Some(SaveTarget::Block(vec![3, 4])));
    let editor = app.editor_at(0).expect("editor for b");
    assert_eq!(editor.schema_name(), "b");
    assert!(!editor.is_dirty());
    assert_eq!(editor.rows()[0].field.as_deref(), Some("f"));
}

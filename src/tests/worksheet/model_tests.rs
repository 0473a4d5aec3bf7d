use super::*;
use crate::model::{BlockBody, MarkdownBlock, SchemaBlock, SchemaRow};

fn markdown(sort_key: i64, ids: &[i64], text: &str) -> Block {
    Block {
        ids: ids.to_vec(),
        sort_key,
        body: BlockBody::Markdown(MarkdownBlock {
            text: text.to_string(),
        }),
    }
}

fn schema(sort_key: i64, ids: &[i64], rows: usize) -> Block {
    let rows = (0..rows)
        .map(|i| SchemaRow::local("s", &format!("f{}", i), None, None))
        .collect();
    Block {
        ids: ids.to_vec(),
        sort_key,
        body: BlockBody::SchemaBlock(SchemaBlock::new("s", rows)),
    }
}

fn worksheet(blocks: Vec<Block>) -> Worksheet {
    Worksheet {
        uuid: "0xws".to_string(),
        name: "home".to_string(),
        title: None,
        revision: 7,
        edit_permission: true,
        blocks,
    }
}

#[test]
fn blocks_are_ordered_by_sort_key() {
    let model = WorksheetModel::from_worksheet(worksheet(vec![
        markdown(30, &[5], "c"),
        markdown(10, &[1], "a"),
        markdown(20, &[3], "b"),
    ]))
    .expect("model");
    let keys: Vec<i64> = model.blocks().iter().map(|b| b.sort_key).collect();
    assert_eq!(keys, vec![10, 20, 30]);
}

#[test]
fn duplicate_sort_keys_are_rejected() {
    let err = WorksheetModel::from_worksheet(worksheet(vec![
        markdown(10, &[1], "a"),
        markdown(10, &[2], "b"),
    ]))
    .expect_err("duplicate");
    assert_eq!(err, WorksheetError::DuplicateSortKey(10));
}

#[test]
fn interleaved_addschema_runs_are_rejected() {
    let rows = vec![
        SchemaRow::local("other", "a", None, None),
        SchemaRow::local("s", "b", None, None),
        SchemaRow::local("other", "c", None, None),
    ];
    let block = Block {
        ids: vec![1, 2, 3, 4],
        sort_key: 1,
        body: BlockBody::SchemaBlock(SchemaBlock::new("s", rows)),
    };
    let err = WorksheetModel::from_worksheet(worksheet(vec![block])).expect_err("interleaved");
    assert_eq!(err, WorksheetError::NonContiguousInheritance("s".to_string()));
}

#[test]
fn set_focus_clamps_and_reports_change() {
    let model = WorksheetModel::from_worksheet(worksheet(vec![
        markdown(1, &[1], "a"),
        schema(2, &[2, 3, 4], 3),
    ]))
    .expect("model");

    let up = model.set_focus(Some((9, Some(9))));
    assert_eq!(
        up.model.focus(),
        Some(Focus {
            index: 1,
            sub: Some(2)
        })
    );
    let change = up.change.expect("change");
    assert_eq!(change.from, None);
    assert!(change.block_changed());

    let same = up.model.set_focus(Some((1, Some(2))));
    assert!(same.change.is_none());

    let markdown_focus = up.model.set_focus(Some((0, Some(4))));
    assert_eq!(
        markdown_focus.model.focus(),
        Some(Focus {
            index: 0,
            sub: None
        })
    );

    let cleared = up.model.set_focus(None);
    assert_eq!(cleared.model.focus(), None);
    // The original value is untouched.
    assert!(up.model.focus().is_some());
}

#[test]
fn move_focus_walks_rows_then_blocks() {
    let model = WorksheetModel::from_worksheet(worksheet(vec![
        markdown(1, &[1], "a"),
        schema(2, &[2, 3, 4], 2),
        markdown(3, &[5], "c"),
    ]))
    .expect("model");

    let mut m = model;
    let mut seen = Vec::new();
    for _ in 0..6 {
        m = m.move_focus(MoveDirection::Down).model;
        let f = m.focus().expect("focus");
        seen.push((f.index, f.sub));
    }
    assert_eq!(
        seen,
        vec![
            (0, None),
            (1, Some(0)),
            (1, Some(1)),
            (2, None),
            (2, None),
            (2, None)
        ]
    );

    let back = m.move_focus(MoveDirection::Up).model;
    assert_eq!(
        back.focus(),
        Some(Focus {
            index: 1,
            sub: Some(1)
        })
    );
}

#[test]
fn after_sort_key_and_min_max_keys() {
    let model = WorksheetModel::from_worksheet(worksheet(vec![
        markdown(4, &[1, 2], "a"),
        schema(9, &[7, 3, 5], 1),
    ]))
    .expect("model");
    let first = &model.blocks()[0];
    let second = &model.blocks()[1];
    assert_eq!(model.compute_after_sort_key(first), None);
    assert_eq!(model.compute_after_sort_key(second), Some(4));
    assert_eq!(second.min_max_keys(), Some((3, 7)));
    assert_eq!(markdown(1, &[], "x").min_max_keys(), None);
}

#[test]
fn reload_marks_only_changed_blocks_dirty() {
    let model = WorksheetModel::from_worksheet(worksheet(vec![
        markdown(1, &[1], "a"),
        markdown(2, &[2], "b"),
    ]))
    .expect("model")
    .mark_clean();
    let focused = model.set_focus(Some((1, None))).model;
    assert!(!focused.is_dirty(0));

    let next = focused
        .reload(worksheet(vec![
            markdown(1, &[1], "a"),
            markdown(2, &[2], "b changed"),
        ]))
        .expect("reload");
    assert!(!next.model.is_dirty(0));
    assert!(next.model.is_dirty(1));
    assert!(next.change.is_none());
    assert_eq!(next.model.focus().map(|f| f.index), Some(1));
}

#[test]
fn props_equal_compares_payload_digest() {
    let a = markdown(1, &[1], "a");
    let mut b = a.clone();
    assert!(props_equal(&a, &b));
    b.body = BlockBody::Markdown(MarkdownBlock {
        text: "b".to_string(),
    });
    assert!(!props_equal(&a, &b));
    let mut c = a.clone();
    c.ids.push(2);
    assert!(!props_equal(&a, &c));
}

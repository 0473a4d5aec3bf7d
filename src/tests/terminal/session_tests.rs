use std::collections::BTreeMap;

use serde_json::json;

use super::*;
use crate::gateway::{RefTarget, StructuredResult};
use crate::routes::Route;
use crate::terminal::{Navigator, dispatch};

const BUNDLE_UUID: &str = "0x0123456789abcdef0123456789abcdef";

fn session() -> TerminalSession {
    let mut s = TerminalSession::new(MIN_HEIGHT, 12);
    s.attach("0xws");
    s
}

fn typed(s: &mut TerminalSession, line: &str) {
    s.input_mut().expect("input enabled").insert_str(line);
}

fn submit(s: &mut TerminalSession, line: &str) -> u64 {
    typed(s, line);
    match s.submit() {
        Some(Effect::Execute { request_id, .. }) => request_id,
        other => panic!("expected execute, got {:?}", other),
    }
}

#[derive(Default)]
struct RecordingNavigator {
    navigated: Vec<Route>,
    new_tabs: Vec<Route>,
    edit_mode: Option<bool>,
    uploads: usize,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: Route) {
        self.navigated.push(route);
    }
    fn open_new_tab(&mut self, route: Route) {
        self.new_tabs.push(route);
    }
    fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = Some(on);
    }
    fn open_upload(&mut self) {
        self.uploads += 1;
    }
}

#[test]
fn submit_pauses_until_the_response_and_restores_enabled_state() {
    let mut s = session();
    assert!(s.is_enabled());
    let id = submit(&mut s, "cl ls");
    assert!(!s.is_enabled());
    assert!(s.input_mut().is_none());
    assert!(s.submit().is_none(), "one command in flight at a time");

    s.execute_resolved(id, Ok(CliResponse::default()));
    assert!(s.is_enabled());
    assert_eq!(s.input().history, vec!["cl ls".to_string()]);
}

#[test]
fn failed_execute_also_resumes_input() {
    let mut s = session();
    let id = submit(&mut s, "cl run");
    s.execute_resolved(id, Err(GatewayError::network("connection refused")));
    assert!(s.is_enabled());
    let last = s.entries().last().expect("entry");
    assert_eq!(last.kind, EntryKind::Error);
    assert_eq!(last.segments[0].text(), "connection refused");
}

#[test]
fn submit_without_worksheet_or_text_does_nothing() {
    let mut s = TerminalSession::new(MIN_HEIGHT, 12);
    typed(&mut s, "cl ls");
    assert!(s.submit().is_none());

    let mut s = session();
    typed(&mut s, "   ");
    assert!(s.submit().is_none());
    assert!(s.is_enabled());
}

#[test]
fn output_refs_become_new_tab_links() {
    let mut s = session();
    let id = submit(&mut s, "cl info b1");
    let mut refs = BTreeMap::new();
    refs.insert(
        "b1".to_string(),
        RefTarget {
            uuid: Some(BUNDLE_UUID.to_string()),
            kind: Some("bundle".to_string()),
        },
    );
    let actions = s.execute_resolved(
        id,
        Ok(CliResponse {
            output: "uuid of b1\n".to_string(),
            exception: None,
            structured_result: Some(StructuredResult {
                refs,
                ui_actions: Vec::new(),
            }),
            completions: Vec::new(),
        }),
    );
    assert!(actions.is_empty());

    let out = s
        .entries()
        .iter()
        .find(|e| e.kind == EntryKind::Output)
        .expect("output entry");
    assert_eq!(
        out.segments,
        vec![
            Segment::Text("uuid of ".to_string()),
            Segment::Link {
                text: "b1".to_string(),
                href: format!("/bundles/{}", BUNDLE_UUID),
                new_tab: true,
            },
        ]
    );
}

#[test]
fn exception_is_shown_alongside_output() {
    let mut s = session();
    let id = submit(&mut s, "cl rm x");
    s.execute_resolved(
        id,
        Ok(CliResponse {
            output: "partial\n".to_string(),
            exception: Some("NotFoundError: x".to_string()),
            ..Default::default()
        }),
    );
    let kinds: Vec<EntryKind> = s.entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EntryKind::Command, EntryKind::Output, EntryKind::Error]
    );
}

#[test]
fn ui_actions_navigate_and_open_bundles_in_new_tab() {
    let mut s = session();
    let id = submit(&mut s, "cl work other");
    let actions = s.execute_resolved(
        id,
        Ok(CliResponse {
            structured_result: Some(StructuredResult {
                refs: BTreeMap::new(),
                ui_actions: vec![
                    json!(["openWorksheet", "U1"]),
                    json!(["openBundle", "U2"]),
                    json!(["teleport", "U3"]),
                    json!(["setEditMode", true]),
                    json!(["upload", null]),
                ],
            }),
            ..Default::default()
        }),
    );
    assert_eq!(actions.len(), 4);

    let mut nav = RecordingNavigator::default();
    dispatch(&actions, &mut nav);
    assert_eq!(nav.navigated, vec![Route::Worksheet("U1".into())]);
    assert_eq!(nav.new_tabs, vec![Route::Bundle("U2".into())]);
    assert_eq!(nav.new_tabs[0].to_string(), "/bundles/U2/");
    assert_eq!(nav.edit_mode, Some(true));
    assert_eq!(nav.uploads, 1);
}

#[test]
fn responses_for_other_requests_are_ignored() {
    let mut s = session();
    let id = submit(&mut s, "cl ls");
    let actions = s.execute_resolved(
        id + 7,
        Ok(CliResponse {
            output: "late".to_string(),
            ..Default::default()
        }),
    );
    assert!(actions.is_empty());
    assert!(!s.is_enabled());
    assert_eq!(s.entries().len(), 1);
}

#[test]
fn only_the_latest_completion_is_applied() {
    let mut s = session();
    typed(&mut s, "cl ");
    let Some(Effect::Complete {
        request_id: first,
        prefix: first_prefix,
        ..
    }) = s.request_completion()
    else {
        panic!("expected completion request");
    };
    typed(&mut s, "r");
    let Some(Effect::Complete {
        request_id: second,
        prefix: second_prefix,
        ..
    }) = s.request_completion()
    else {
        panic!("expected completion request");
    };
    assert!(second > first);

    assert!(!s.completion_resolved(first, &first_prefix, Ok(vec!["cl ls".into()])));
    assert!(s.completions().is_empty());

    assert!(s.completion_resolved(
        second,
        &second_prefix,
        Ok(vec!["run".into(), "rm".into()])
    ));
    assert_eq!(s.completions(), ["run".to_string(), "rm".to_string()]);

    assert!(s.accept_completion(1));
    assert_eq!(s.input().buf, "cl rm");
}

#[test]
fn completion_after_a_wide_space_keeps_the_head_intact() {
    let mut s = session();
    typed(&mut s, "cl\u{3000}ru");
    let Some(Effect::Complete {
        request_id, prefix, ..
    }) = s.request_completion()
    else {
        panic!("expected completion request");
    };
    assert!(s.completion_resolved(request_id, &prefix, Ok(vec!["run".into()])));
    assert!(s.accept_completion(0));
    assert_eq!(s.input().buf, "cl\u{3000}run");
}

#[test]
fn completion_is_dropped_when_the_line_changed() {
    let mut s = session();
    typed(&mut s, "cl");
    let Some(Effect::Complete {
        request_id, prefix, ..
    }) = s.request_completion()
    else {
        panic!("expected completion request");
    };
    typed(&mut s, "x");
    assert!(!s.completion_resolved(request_id, &prefix, Ok(vec!["cl".into()])));
}

#[test]
fn focus_controls_height_and_resize_is_clamped() {
    let mut s = session();
    assert_eq!(s.height(), MIN_HEIGHT);
    s.focus();
    assert_eq!(s.height(), 12);

    s.resize(100, 40);
    assert_eq!(s.height(), 36);
    s.resize(1, 40);
    assert_eq!(s.height(), MIN_HEIGHT);

    s.blur();
    assert_eq!(s.height(), MIN_HEIGHT);
}

#[test]
fn ctrl_c_clears_the_line_and_insert_reference_focuses() {
    let mut s = session();
    typed(&mut s, "cl info");
    s.clear_line();
    assert!(s.input().buf.is_empty());

    s.insert_reference("cl info");
    s.insert_reference("0x12");
    assert!(s.is_focused());
    assert_eq!(s.input().buf, "cl info 0x12");
}

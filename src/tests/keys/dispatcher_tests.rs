use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::*;

fn chord(code: KeyCode, modifiers: KeyModifiers) -> KeyChord {
    KeyChord::from_event(KeyEvent::new(code, modifiers)).expect("supported key")
}

fn ch(c: char) -> KeyChord {
    chord(KeyCode::Char(c), KeyModifiers::NONE)
}

#[test]
fn parses_named_keys_modifiers_and_sequences() {
    assert_eq!(
        KeyChord::parse("ctrl+enter"),
        Ok(chord(KeyCode::Enter, KeyModifiers::CONTROL))
    );
    assert_eq!(
        KeyChord::parse("shift+enter"),
        Ok(chord(KeyCode::Enter, KeyModifiers::SHIFT))
    );
    assert_eq!(
        KeyChord::parse("del"),
        Ok(chord(KeyCode::Delete, KeyModifiers::NONE))
    );
    assert_eq!(
        KeyChord::parse("K"),
        Ok(chord(KeyCode::Char('K'), KeyModifiers::SHIFT))
    );
    assert_eq!(KeyChord::parse("?"), Ok(chord(KeyCode::Char('?'), KeyModifiers::SHIFT)));
    assert_eq!(parse_sequence("a s"), Ok(vec![ch('a'), ch('s')]));
    assert!(KeyChord::parse("hyper+x").is_err());
    assert!(parse_sequence("  ").is_err());
    assert_eq!(KeyChord::parse("ctrl+s").map(|c| c.to_string()), Ok("ctrl+s".to_string()));
}

#[test]
fn topmost_scope_wins_and_popping_drops_its_bindings() {
    let mut d = KeyDispatcher::new();
    let outer = d.push_scope();
    let inner = d.push_scope();
    d.bind(outer, "j", "outer-j").unwrap();
    d.bind(inner, "j", "inner-j").unwrap();

    assert_eq!(d.dispatch(ch('j')), Dispatch::Matched("inner-j"));
    assert!(d.pop_scope(inner));
    assert!(!d.is_active(inner));
    assert_eq!(d.dispatch(ch('j')), Dispatch::Matched("outer-j"));
    assert!(!d.pop_scope(inner));
    assert_eq!(d.bind(inner, "k", "late"), Err(KeyError::InactiveScope));
}

#[test]
fn block_keys_belong_to_the_focused_scope_only() {
    let mut d = KeyDispatcher::new();
    let lower = d.push_scope();
    d.bind(lower, "enter", "lower-enter").unwrap();
    let _focused = d.push_scope();

    assert_eq!(
        d.dispatch(chord(KeyCode::Enter, KeyModifiers::NONE)),
        Dispatch::Unmatched
    );
    assert_eq!(
        d.bind_global("x", "global-x"),
        Err(KeyError::Reserved("x".to_string()))
    );
}

#[test]
fn sequences_wait_for_the_next_chord() {
    let mut d = KeyDispatcher::new();
    let block = d.push_scope();
    d.bind(block, "a s", "download").unwrap();
    d.bind(block, "j", "down").unwrap();

    assert_eq!(d.dispatch(ch('a')), Dispatch::Pending);
    assert_eq!(d.pending(), [ch('a')]);
    assert_eq!(d.dispatch(ch('s')), Dispatch::Matched("download"));
    assert!(d.pending().is_empty());

    // A broken sequence retries the last chord on its own.
    assert_eq!(d.dispatch(ch('a')), Dispatch::Pending);
    assert_eq!(d.dispatch(ch('j')), Dispatch::Matched("down"));
}

#[test]
fn input_focus_leaves_only_globals() {
    let mut d = KeyDispatcher::new();
    let block = d.push_scope();
    d.bind(block, "q", "scoped-q").unwrap();
    d.bind_global("ctrl+c", "global-interrupt").unwrap();

    d.set_input_focused(true);
    assert_eq!(d.dispatch(ch('q')), Dispatch::Unmatched);
    assert_eq!(
        d.dispatch(chord(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Dispatch::Matched("global-interrupt")
    );

    assert_eq!(d.unbind_global("ctrl+c"), Ok(true));
    assert_eq!(
        d.dispatch(chord(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Dispatch::Unmatched
    );
}

#[test]
fn handle_consumes_only_when_the_action_succeeds() {
    let mut d = KeyDispatcher::new();
    let block = d.push_scope();
    d.bind(block, "enter", "save").unwrap();
    let enter = chord(KeyCode::Enter, KeyModifiers::NONE);

    assert!(!d.handle(enter, |_| false));
    let mut ran = Vec::new();
    assert!(d.handle(enter, |a| {
        ran.push(*a);
        true
    }));
    assert_eq!(ran, vec!["save"]);
    assert!(!d.handle(ch('z'), |_| true));
}

#[test]
fn duplicate_bindings_in_one_scope_are_rejected() {
    let mut d = KeyDispatcher::new();
    let s = d.push_scope();
    d.bind(s, "o", 1).unwrap();
    assert_eq!(d.bind(s, "o", 2), Err(KeyError::Duplicate("o".to_string())));
}

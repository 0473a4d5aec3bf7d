use super::*;

fn typed(s: &str) -> LineInput {
    let mut input = LineInput::default();
    input.insert_str(s);
    input
}

#[test]
fn editing_respects_multibyte_chars() {
    let mut input = typed("héllo");
    input.move_left();
    input.move_left();
    input.move_left();
    input.move_left();
    assert_eq!(input.cursor_col(), 1);
    input.backspace();
    assert_eq!(input.buf, "éllo");
    input.delete();
    assert_eq!(input.buf, "llo");
    input.insert_char('ü');
    assert_eq!(input.buf, "üllo");
    assert_eq!(input.cursor_col(), 1);
}

#[test]
fn history_skips_blank_and_repeated_lines() {
    let mut input = LineInput::default();
    input.push_history("ls");
    input.push_history("  ");
    input.push_history("ls ");
    input.push_history("info x");
    assert_eq!(input.history, vec!["ls".to_string(), "info x".to_string()]);
}

#[test]
fn history_walks_back_and_forward_to_empty() {
    let mut input = LineInput::default();
    input.push_history("one");
    input.push_history("two");

    input.history_up();
    assert_eq!(input.buf, "two");
    input.history_up();
    assert_eq!(input.buf, "one");
    input.history_up();
    assert_eq!(input.buf, "one");

    input.history_down();
    assert_eq!(input.buf, "two");
    input.history_down();
    assert_eq!(input.buf, "");
    assert_eq!(input.history_pos, None);
}

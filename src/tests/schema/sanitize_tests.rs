use super::*;
use crate::schema::autofill_post_processor;

#[test]
fn newline_runs_collapse_to_one_space() {
    assert_eq!(sanitize_value("a\n\n\r\nb"), "a b");
    assert_eq!(sanitize_value("line\n"), "line ");
}

#[test]
fn single_quotes_are_dropped() {
    assert_eq!(sanitize_value("it's"), "its");
    assert_eq!(sanitize_value("'quoted'"), "quoted");
}

#[test]
fn schema_names_lose_all_whitespace() {
    assert_eq!(sanitize_schema_name(" my schema\nname "), "myschemaname");
    assert_eq!(sanitize_schema_name("a'b"), "ab");
}

#[test]
fn autofill_matches_known_paths_case_insensitively() {
    assert_eq!(autofill_post_processor("time"), Some("duration"));
    assert_eq!(autofill_post_processor("Data_Size"), Some("size"));
    assert_eq!(autofill_post_processor("uuid"), Some("[0:8]"));
    assert_eq!(autofill_post_processor("/time"), None);
    assert_eq!(autofill_post_processor("name"), None);
}

use super::*;

const U: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn target(uuid: &str, kind: Option<&str>) -> RefTarget {
    RefTarget {
        uuid: Some(uuid.to_string()),
        kind: kind.map(str::to_string),
    }
}

#[test]
fn full_uuid_accepts_prefixed_and_bare_hex() {
    assert!(is_full_uuid(U));
    assert!(is_full_uuid(&U[2..]));
    assert!(!is_full_uuid("0xaaaa"));
    assert!(!is_full_uuid("0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"));
}

#[test]
fn trims_one_trailing_newline() {
    assert_eq!(trim_output("a\n"), "a");
    assert_eq!(trim_output("a\n\n"), "a\n");
    assert_eq!(trim_output("a"), "a");
}

#[test]
fn longest_token_wins_and_matches_do_not_overlap() {
    let mut refs = BTreeMap::new();
    refs.insert("run".to_string(), target(U, Some("bundle")));
    refs.insert("run-2".to_string(), target(U, Some("worksheet")));
    let out = rewrite_refs("run-2 run", &refs);
    let hrefs: Vec<&str> = out
        .segments
        .iter()
        .filter_map(|s| match s {
            Segment::Link { href, .. } => Some(href.as_str()),
            Segment::Text(_) => None,
        })
        .collect();
    assert_eq!(
        hrefs,
        vec![format!("/worksheets/{}", U), format!("/bundles/{}", U)]
    );
    assert_eq!(out.segments[1], Segment::Text(" ".to_string()));
}

#[test]
fn unqualified_or_unknown_refs_stay_plain_with_diagnostics() {
    let mut refs = BTreeMap::new();
    refs.insert("short".to_string(), target("0x12", Some("bundle")));
    refs.insert("group".to_string(), target(U, Some("group")));
    let out = rewrite_refs("short group", &refs);
    assert_eq!(out.segments, vec![Segment::Text("short group".to_string())]);
    assert_eq!(out.diagnostics.len(), 2);
}

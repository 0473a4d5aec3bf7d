use super::*;

fn strings(ds: &[Directive]) -> Vec<String> {
    ds.iter().map(|d| d.to_string()).collect()
}

#[test]
fn tokenize_handles_quotes_and_empty_tokens() {
    assert_eq!(
        tokenize("add 'run time' '' 'duration'").expect("tokens"),
        vec!["add", "run time", "", "duration"]
    );
    assert_eq!(tokenize("  schema   base ").expect("tokens"), vec!["schema", "base"]);
    assert_eq!(
        tokenize("add 'oops").expect_err("unterminated"),
        SchemaError::UnterminatedQuote("add 'oops".to_string())
    );
}

#[test]
fn parse_directive_checks_arity() {
    assert_eq!(
        parse_directive("add 'x' '/stdout'").expect("add"),
        Directive::Add {
            field: "x".to_string(),
            path: Some("/stdout".to_string()),
            post_processor: None,
        }
    );
    assert!(matches!(
        parse_directive("schema a b"),
        Err(SchemaError::Arity { directive: "schema", .. })
    ));
    assert!(matches!(
        parse_directive("add"),
        Err(SchemaError::Arity { directive: "add", .. })
    ));
    assert_eq!(
        parse_directive("display table"),
        Err(SchemaError::UnknownDirective("display".to_string()))
    );
}

#[test]
fn serialize_emits_one_addschema_per_inherited_run() {
    let schema = SchemaBlock::new(
        "base",
        vec![
            SchemaRow::local("base", "localfield", None, None),
            SchemaRow::local("other", "o1", Some("uuid"), None),
            SchemaRow::local("other", "o2", None, None),
            SchemaRow::local("base", "", Some("ignored"), None),
            SchemaRow::local("base", "t", Some("time"), Some("duration")),
            SchemaRow::local("third", "z", None, None),
        ],
    );
    assert_eq!(
        strings(&serialize(&schema)),
        vec![
            "schema base",
            "add 'localfield'",
            "addschema other",
            "add 't' 'time' 'duration'",
            "addschema third",
        ]
    );
}

#[test]
fn post_processor_without_path_keeps_an_empty_path_slot() {
    let schema = SchemaBlock::new("s", vec![SchemaRow::local("s", "f", None, Some("size"))]);
    let lines = strings(&serialize(&schema));
    assert_eq!(lines[1], "add 'f' '' 'size'");
    let back = deserialize(lines.iter().map(String::as_str), |_| None).expect("parse");
    assert!(back.equivalent(&schema));
}

#[test]
fn deserialize_serialize_round_trips_modulo_empty_rows() {
    let other_rows = vec![
        SchemaRow::local("other", "o1", Some("uuid"), Some("[0:8]")),
        SchemaRow::local("other", "o2", None, None),
    ];
    let mut rows = vec![SchemaRow::local("base", "a", Some("/stdout"), None)];
    rows.extend(other_rows.clone());
    rows.push(SchemaRow::blank("base"));
    rows.push(SchemaRow::local("base", "b", Some("data_size"), Some("size")));
    let schema = SchemaBlock::new("base", rows);

    let lines = strings(&serialize(&schema));
    let back = deserialize(lines.iter().map(String::as_str), |name| {
        (name == "other").then(|| other_rows.clone())
    })
    .expect("parse");

    assert!(back.equivalent(&schema));
    assert_eq!(back.field_rows.len(), 4);
}

#[test]
fn deserialize_requires_header_and_known_schemas() {
    assert_eq!(
        deserialize(["add 'x'"], |_| None).expect_err("header"),
        SchemaError::MissingSchemaHeader
    );
    assert_eq!(
        deserialize(["schema a", "addschema nope"], |_| None).expect_err("unknown"),
        SchemaError::UnknownSchema("nope".to_string())
    );
}

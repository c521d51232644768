use rolodex::extract::{parse_records, records_or_fallback, strip_fences};

#[test]
fn bare_object_becomes_one_element_list() {
    let records = parse_records(r#"{"Name": "Jane Doe", "Email": "jane@example.com"}"#).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name.as_deref(), Some("Jane Doe"));
    assert_eq!(records[0].email.as_deref(), Some("jane@example.com"));
}

#[test]
fn array_yields_all_records() {
    let records = parse_records(
        r#"[{"Name": "Jane Doe"}, {"Name": "John Smith", "Company/Org": "Acme"}]"#,
    )
    .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].company.as_deref(), Some("Acme"));
}

#[test]
fn fenced_output_is_parsed() {
    let raw = "```json\n{\"Name\": \"Jane Doe\"}\n```";
    let records = parse_records(raw).unwrap();
    assert_eq!(records[0].name.as_deref(), Some("Jane Doe"));

    // plain fence without language tag
    let raw = "```\n[{\"Name\": \"Jane Doe\"}]\n```";
    assert_eq!(parse_records(raw).unwrap().len(), 1);
}

#[test]
fn fence_stripping_leaves_plain_text_alone() {
    assert_eq!(strip_fences("  {\"Name\": null}  "), "{\"Name\": null}");
    assert_eq!(
        strip_fences("```json\n{\"a\": 1}\n```"),
        "{\"a\": 1}"
    );
}

#[test]
fn malformed_output_falls_back_to_notes_record() {
    let raw = "I'm sorry, I can't produce JSON for that.";
    let records = records_or_fallback(raw);
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.notes.as_deref(), Some(raw));
    assert!(rec.name.is_none());
    assert!(rec.company.is_none());
    assert!(rec.email.is_none());
    assert!(rec.tags.is_none());
}

#[test]
fn non_object_json_is_a_parse_error() {
    assert!(parse_records("\"just a string\"").is_err());
    assert!(parse_records("42").is_err());
    // the fallback still preserves the raw text
    let records = records_or_fallback("42");
    assert_eq!(records[0].notes.as_deref(), Some("42"));
}

#[test]
fn null_fields_and_unknown_keys_are_tolerated() {
    let records = parse_records(
        r#"{"Name": "Jane Doe", "Email": null, "Favorite Color": "teal"}"#,
    )
    .unwrap();
    assert_eq!(records[0].name.as_deref(), Some("Jane Doe"));
    assert!(records[0].email.is_none());
}

#[test]
fn tags_accept_one_or_many() {
    let one = parse_records(r#"{"Name": "Jane Doe", "Tags": "VC"}"#).unwrap();
    assert_eq!(one[0].tags.as_deref(), Some(&["VC".to_string()][..]));

    let many = parse_records(r#"{"Name": "Jane Doe", "Tags": ["VC", "Deal"]}"#).unwrap();
    assert_eq!(
        many[0].tags.as_deref(),
        Some(&["VC".to_string(), "Deal".to_string()][..])
    );
}

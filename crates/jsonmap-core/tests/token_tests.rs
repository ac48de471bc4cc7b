use jsonmap_core::{DecodeError, JsonParser, JsonToken, JsonWriter};

/// Helper: drain every token from `input`.
fn tokens(input: &str) -> Vec<JsonToken> {
    let mut parser = JsonParser::new(input);
    let mut out = Vec::new();
    while let Some(token) = parser.next_token().unwrap() {
        out.push(token);
    }
    out
}

/// Helper: drain tokens until the first error.
fn first_error(input: &str) -> DecodeError {
    let mut parser = JsonParser::new(input);
    loop {
        match parser.next_token() {
            Ok(Some(_)) => continue,
            Ok(None) => panic!("expected a syntax error for {input:?}"),
            Err(e) => return e,
        }
    }
}

// ============================================================================
// Token stream
// ============================================================================

#[test]
fn object_token_sequence() {
    use JsonToken::*;
    assert_eq!(
        tokens(r#"{"a": 1, "b": [true, null, 2.5], "c": {"d": "x"}}"#),
        vec![
            StartObject, FieldName, NumberInt, FieldName, StartArray, True, Null, NumberFloat,
            EndArray, FieldName, StartObject, FieldName, String, EndObject, EndObject,
        ]
    );
}

#[test]
fn root_scalar_then_end() {
    assert_eq!(tokens("  42  "), vec![JsonToken::NumberInt]);
    assert_eq!(tokens(r#""hi""#), vec![JsonToken::String]);
}

#[test]
fn empty_input_has_no_tokens() {
    assert!(tokens("").is_empty());
    assert!(tokens("   \n").is_empty());
}

#[test]
fn empty_containers() {
    use JsonToken::*;
    assert_eq!(tokens("{}"), vec![StartObject, EndObject]);
    assert_eq!(tokens("[[]]"), vec![StartArray, StartArray, EndArray, EndArray]);
}

#[test]
fn field_name_and_text() {
    let mut parser = JsonParser::new(r#"{"name": "Ada", "n": -12e3}"#);
    parser.next_token().unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(JsonToken::FieldName));
    assert_eq!(parser.current_name(), "name");
    assert_eq!(parser.next_token().unwrap(), Some(JsonToken::String));
    assert_eq!(parser.text(), "Ada");
    parser.next_token().unwrap();
    assert_eq!(parser.current_name(), "n");
    assert_eq!(parser.next_token().unwrap(), Some(JsonToken::NumberFloat));
    assert_eq!(parser.text(), "-12e3");
    assert_eq!(parser.double_value(), Some(-12000.0));
}

#[test]
fn escaped_strings_are_unescaped() {
    let mut parser = JsonParser::new(r#""line\nbreak \"q\" é 😀""#);
    parser.next_token().unwrap();
    assert_eq!(parser.text(), "line\nbreak \"q\" é 😀");
}

#[test]
fn escaped_field_names_are_unescaped() {
    let mut parser = JsonParser::new(r#"{"a\tb": 1}"#);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert_eq!(parser.current_name(), "a\tb");
}

// ============================================================================
// skip_children / finish_container
// ============================================================================

#[test]
fn skip_children_consumes_nested_structure() {
    let mut parser = JsonParser::new(r#"{"skip": {"a": [1, {"b": []}]}, "keep": 7}"#);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert_eq!(parser.next_token().unwrap(), Some(JsonToken::StartObject));
    parser.skip_children().unwrap();
    assert_eq!(parser.current_token(), Some(JsonToken::EndObject));
    assert_eq!(parser.next_token().unwrap(), Some(JsonToken::FieldName));
    assert_eq!(parser.current_name(), "keep");
}

#[test]
fn skip_children_on_scalar_is_noop() {
    let mut parser = JsonParser::new("[1, 2]");
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    parser.skip_children().unwrap();
    assert_eq!(parser.current_token(), Some(JsonToken::NumberInt));
    assert_eq!(parser.text(), "1");
}

#[test]
fn finish_container_skips_remaining_elements() {
    let mut parser = JsonParser::new(r#"[["a", {"x": 1}, [2, 3], "tail"], 9]"#);
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    let depth = parser.depth();
    parser.next_token().unwrap();
    parser.finish_container(depth).unwrap();
    assert_eq!(parser.current_token(), Some(JsonToken::EndArray));
    assert_eq!(parser.next_token().unwrap(), Some(JsonToken::NumberInt));
    assert_eq!(parser.text(), "9");
}

// ============================================================================
// Coercing accessors
// ============================================================================

#[test]
fn coercing_accessors() {
    let mut parser = JsonParser::new(r#"[" 17 ", 3.9, true, " true ", 0, "x", null]"#);
    parser.next_token().unwrap();

    parser.next_token().unwrap();
    assert_eq!(parser.value_as_int(), 17);
    parser.next_token().unwrap();
    assert_eq!(parser.value_as_int(), 3);
    assert_eq!(parser.value_as_double(), 3.9);
    parser.next_token().unwrap();
    assert_eq!(parser.value_as_long(), 1);
    assert!(parser.value_as_bool());
    parser.next_token().unwrap();
    assert!(parser.value_as_bool());
    parser.next_token().unwrap();
    assert!(!parser.value_as_bool());
    parser.next_token().unwrap();
    assert_eq!(parser.value_as_int(), 0);
    parser.next_token().unwrap();
    assert_eq!(parser.value_as_double(), 0.0);
}

#[test]
fn bool_view_matches_only_integers_and_exact_true() {
    let mut parser = JsonParser::new(r#"[-3, 0.5, "TRUE", "True", 1e2, -0]"#);
    parser.next_token().unwrap();

    parser.next_token().unwrap();
    assert!(parser.value_as_bool(), "non-zero integer");
    for text in ["0.5", "\"TRUE\"", "\"True\"", "1e2", "-0"] {
        parser.next_token().unwrap();
        assert!(!parser.value_as_bool(), "{text}");
    }
}

#[test]
fn int_view_saturates_out_of_range_integers() {
    let mut parser = JsonParser::new(r#"[3000000000, -3000000000, "3000000000", 3000000000.0]"#);
    parser.next_token().unwrap();

    for expected in [i32::MAX, i32::MIN, i32::MAX, i32::MAX] {
        parser.next_token().unwrap();
        assert_eq!(parser.value_as_int(), expected);
    }
}

#[test]
fn non_finite_spellings_read_as_doubles() {
    let mut parser = JsonParser::new(r#"["NaN", "Infinity", "-Infinity", "nan", "inf"]"#);
    parser.next_token().unwrap();

    parser.next_token().unwrap();
    assert!(parser.double_value().is_some_and(f64::is_nan));
    assert!(parser.value_as_double().is_nan());
    parser.next_token().unwrap();
    assert_eq!(parser.double_value(), Some(f64::INFINITY));
    assert_eq!(parser.value_as_double(), f64::INFINITY);
    parser.next_token().unwrap();
    assert_eq!(parser.double_value(), Some(f64::NEG_INFINITY));
    assert_eq!(parser.value_as_double(), f64::NEG_INFINITY);

    // Only the writer's spellings count as numbers for exact reads.
    parser.next_token().unwrap();
    assert_eq!(parser.double_value(), None);
    parser.next_token().unwrap();
    assert_eq!(parser.double_value(), None);
}

#[test]
fn long_value_requires_integer_literal() {
    let mut parser = JsonParser::new("[9223372036854775807, 1.0, 99999999999999999999]");
    parser.next_token().unwrap();
    parser.next_token().unwrap();
    assert_eq!(parser.long_value(), Some(i64::MAX));
    parser.next_token().unwrap();
    assert_eq!(parser.long_value(), None);
    parser.next_token().unwrap();
    assert_eq!(parser.long_value(), None);
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn syntax_errors() {
    for input in [
        r#"{"a": 1,}"#,
        r#"{"a" 1}"#,
        r#"{"a": 1 "b": 2}"#,
        "[1, 2,]",
        r#""unterminated"#,
        "tru",
        "{} x",
        "[1",
        "-",
        "1.",
        "{1: 2}",
    ] {
        assert!(
            matches!(first_error(input), DecodeError::Syntax { .. }),
            "expected syntax error for {input:?}"
        );
    }
}

#[test]
fn syntax_error_reports_offset() {
    match first_error("[1, @]") {
        DecodeError::Syntax { offset, .. } => assert_eq!(offset, 4),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// JsonWriter
// ============================================================================

#[test]
fn writer_inserts_separators() {
    let mut w = JsonWriter::new();
    w.start_array();
    w.int(1);
    w.start_object();
    w.field_name("a");
    w.null();
    w.field_name("b");
    w.bool(true);
    w.end_object();
    w.string("x");
    w.end_array();
    assert_eq!(w.finish(), r#"[1,{"a":null,"b":true},"x"]"#);
}

#[test]
fn writer_escapes_strings() {
    let mut w = JsonWriter::new();
    w.string("q\"b\\n\n\t\u{1}é");
    assert_eq!(w.finish(), r#""q\"b\\n\n\t\u0001é""#);
}

#[test]
fn writer_floats() {
    let mut w = JsonWriter::new();
    w.start_array();
    w.double(2.0);
    w.double(0.1);
    w.float(1.5);
    w.double(f64::NAN);
    w.float(f32::INFINITY);
    w.double(f64::NEG_INFINITY);
    w.long(-9);
    w.end_array();
    assert_eq!(w.finish(), r#"[2.0,0.1,1.5,"NaN","Infinity","-Infinity",-9]"#);
}

#[test]
fn writer_output_reparses() {
    let mut w = JsonWriter::new();
    w.start_object();
    w.field_name("k\"ey");
    w.string("line\u{0}end");
    w.end_object();
    let text = w.finish();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["k\"ey"], "line\u{0}end");
}

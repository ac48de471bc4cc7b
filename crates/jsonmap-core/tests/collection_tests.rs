use std::collections::VecDeque;
use std::sync::Arc;

use indexmap::IndexMap;
use jsonmap_core::{Codec, FieldSchema, ParseType, Record, SchemaRef, TypeSchema, Value};

/// Helper: schema `Holder` with one field plus a trailing `after: i32`.
fn holder(field: FieldSchema) -> Arc<TypeSchema> {
    TypeSchema::builder("Holder")
        .field(field)
        .field(FieldSchema::new("after", ParseType::Int))
        .build()
        .unwrap()
}

fn decode(schema: &Arc<TypeSchema>, json: &str) -> Record {
    Codec::new().decode_str(schema, json).unwrap().unwrap()
}

fn encode(record: &Record) -> String {
    Codec::new().encode_to_string(record).unwrap()
}

fn ints(values: &[i32]) -> Vec<Option<Value>> {
    values.iter().map(|n| Some(Value::Int(*n))).collect()
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn list_drops_null_elements() {
    let schema = holder(FieldSchema::list("values", ParseType::Int));
    let record = decode(&schema, r#"{"values": [1, null, 3, 4], "after": 9}"#);
    assert_eq!(record.get("values"), Some(&Value::List(ints(&[1, 3, 4]))));
    assert_eq!(record.get_int("after"), Some(9));
}

#[test]
fn list_nulls_dropped_through_round_trip() {
    let schema = holder(FieldSchema::list("values", ParseType::Int));
    let record = Record::new(&schema).with(
        "values",
        Value::List(vec![Some(Value::Int(1)), None, Some(Value::Int(3)), Some(Value::Int(4))]),
    );
    let text = encode(&record);
    assert_eq!(text, r#"{"values":[1,3,4],"after":0}"#);
    let back = decode(&schema, &text);
    assert_eq!(back.get("values"), Some(&Value::List(ints(&[1, 3, 4]))));
}

#[test]
fn list_drops_nulls_for_every_element_type() {
    let bools = holder(FieldSchema::list("values", ParseType::Bool));
    let record = decode(&bools, r#"{"values": [true, null, false]}"#);
    let expected = vec![Some(Value::Bool(true)), Some(Value::Bool(false))];
    assert_eq!(record.get("values"), Some(&Value::List(expected)));

    let doubles = holder(FieldSchema::list("values", ParseType::Double));
    let record = decode(&doubles, r#"{"values": [null, 1.5, null]}"#);
    assert_eq!(record.get("values"), Some(&Value::List(vec![Some(Value::Double(1.5))])));

    let strings = holder(FieldSchema::list("values", ParseType::String));
    let record = decode(&strings, r#"{"values": [null, "a"]}"#);
    assert_eq!(record.get("values"), Some(&Value::List(vec![Some(Value::from("a"))])));
}

#[test]
fn exact_list_drops_mismatched_elements() {
    let schema = holder(FieldSchema::list("values", ParseType::Int).exact());
    let record = decode(&schema, r#"{"values": [1, "two", true, {"x": 1}, 3], "after": 2}"#);
    assert_eq!(record.get("values"), Some(&Value::List(ints(&[1, 3]))));
    assert_eq!(record.get_int("after"), Some(2));
}

#[test]
fn list_requires_array_token() {
    let schema = holder(FieldSchema::list("values", ParseType::String));
    for json in [
        r#"{"values": "abc", "after": 1}"#,
        r#"{"values": {"a": [1]}, "after": 1}"#,
        r#"{"values": null, "after": 1}"#,
    ] {
        let record = decode(&schema, json);
        assert_eq!(record.get("values"), None, "{json}");
        assert_eq!(record.get_int("after"), Some(1), "{json}");
    }
}

#[test]
fn empty_list_is_present() {
    let schema = holder(FieldSchema::list("values", ParseType::String));
    let record = decode(&schema, r#"{"values": []}"#);
    assert_eq!(record.get("values"), Some(&Value::List(vec![])));
    assert_eq!(encode(&record), r#"{"values":[],"after":0}"#);
}

#[test]
fn absent_list_is_omitted() {
    let schema = holder(FieldSchema::list("values", ParseType::String));
    assert_eq!(encode(&Record::new(&schema)), r#"{"after":0}"#);
}

#[test]
fn list_of_objects_skips_bad_elements() {
    let point = TypeSchema::builder("Point")
        .field(FieldSchema::new("x", ParseType::Int))
        .build()
        .unwrap();
    let schema = holder(FieldSchema::list(
        "points",
        ParseType::Object(SchemaRef::new(point.clone())),
    ));
    let record = decode(
        &schema,
        r#"{"points": [{"x": 1}, [1, 2], "nope", null, {"x": 2, "y": [3]}], "after": 5}"#,
    );
    let expected = Value::list([
        Value::from(Record::new(&point).with("x", 1)),
        Value::from(Record::new(&point).with("x", 2)),
    ]);
    assert_eq!(record.get("points"), Some(&expected));
    assert_eq!(record.get_int("after"), Some(5));
    assert_eq!(encode(&record), r#"{"points":[{"x":1},{"x":2}],"after":5}"#);
}

// ============================================================================
// Sets and queues
// ============================================================================

#[test]
fn set_discards_duplicates_and_ignores_order() {
    let schema = holder(FieldSchema::set("tags", ParseType::String));
    let record = decode(&schema, r#"{"tags": ["a", "b", "a", null, "c"]}"#);
    let expected = Value::Set(vec![
        Some(Value::from("c")),
        Some(Value::from("a")),
        Some(Value::from("b")),
    ]);
    assert_eq!(record.get("tags"), Some(&expected));
}

#[test]
fn set_equality_counts_elements() {
    let a = Value::Set(vec![Some(Value::Int(1)), Some(Value::Int(1))]);
    let b = Value::Set(vec![Some(Value::Int(1)), Some(Value::Int(2))]);
    assert_ne!(a, b);
}

#[test]
fn queue_preserves_order() {
    let schema = holder(FieldSchema::queue("jobs", ParseType::Long));
    let record = decode(&schema, r#"{"jobs": [3, 1, null, 2]}"#);
    let expected: VecDeque<Option<Value>> =
        [3i64, 1, 2].into_iter().map(|n| Some(Value::Long(n))).collect();
    assert_eq!(record.get("jobs"), Some(&Value::Queue(expected)));
    assert_eq!(encode(&record), r#"{"jobs":[3,1,2],"after":0}"#);
}

// ============================================================================
// Maps
// ============================================================================

#[test]
fn map_preserves_explicit_nulls() {
    let schema = holder(FieldSchema::map("scores", ParseType::Int));
    let record = decode(&schema, r#"{"scores": {"a": 1, "b": null, "c": 3}}"#);
    let map = record.get("scores").and_then(Value::as_map).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get("a"), Some(&Some(Value::Int(1))));
    assert_eq!(map.get("b"), Some(&None));
    assert_eq!(map.get("c"), Some(&Some(Value::Int(3))));
}

#[test]
fn map_nulls_round_trip() {
    let schema = holder(FieldSchema::map("scores", ParseType::Int));
    let mut entries = IndexMap::new();
    entries.insert("z".to_string(), Some(Value::Int(26)));
    entries.insert("missing".to_string(), None);
    let record = Record::new(&schema).with("scores", Value::Map(entries));

    let text = encode(&record);
    assert_eq!(text, r#"{"scores":{"z":26,"missing":null},"after":0}"#);
    assert_eq!(decode(&schema, &text), record);
}

#[test]
fn non_finite_doubles_round_trip() {
    let schema = holder(FieldSchema::map("m", ParseType::Double));
    let mut entries = IndexMap::new();
    entries.insert("pos".to_string(), Some(Value::Double(f64::INFINITY)));
    entries.insert("neg".to_string(), Some(Value::Double(f64::NEG_INFINITY)));
    entries.insert("nan".to_string(), Some(Value::Double(f64::NAN)));
    entries.insert("none".to_string(), None);
    let record = Record::new(&schema).with("m", Value::Map(entries));

    let text = encode(&record);
    assert_eq!(
        text,
        r#"{"m":{"pos":"Infinity","neg":"-Infinity","nan":"NaN","none":null},"after":0}"#
    );
    assert_eq!(decode(&schema, &text), record);

    let schema = holder(FieldSchema::list("values", ParseType::Float).exact());
    let record = Record::new(&schema).with(
        "values",
        Value::List(vec![Some(Value::Float(f32::NEG_INFINITY)), Some(Value::Float(0.5))]),
    );
    let text = encode(&record);
    assert_eq!(text, r#"{"values":["-Infinity",0.5],"after":0}"#);
    assert_eq!(decode(&schema, &text), record);
}

#[test]
fn map_drops_values_that_decode_to_nothing() {
    let schema = holder(FieldSchema::map("scores", ParseType::Int).exact());
    let record = decode(
        &schema,
        r#"{"scores": {"a": 1, "b": "x", "c": [1], "d": null}, "after": 4}"#,
    );
    let map = record.get("scores").and_then(Value::as_map).unwrap();
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "d"]);
    assert_eq!(record.get_int("after"), Some(4));
}

#[test]
fn map_requires_object_token() {
    let schema = holder(FieldSchema::map("scores", ParseType::Int));
    let record = decode(&schema, r#"{"scores": [1, 2], "after": 3}"#);
    assert_eq!(record.get("scores"), None);
    assert_eq!(record.get_int("after"), Some(3));
}

#[test]
fn map_of_objects() {
    let point = TypeSchema::builder("Point")
        .field(FieldSchema::new("x", ParseType::Int))
        .build()
        .unwrap();
    let schema = holder(FieldSchema::map("points", ParseType::Object(point.into())));
    let text = r#"{"points":{"origin":{"x":0},"gone":null},"after":0}"#;
    let record = decode(&schema, text);
    assert_eq!(encode(&record), text);
}

#[test]
fn encode_rejects_mismatched_container() {
    let schema = holder(FieldSchema::map("scores", ParseType::Int));
    let record = Record::new(&schema).with("scores", Value::list([Value::Int(1)]));
    assert!(Codec::new().encode_to_string(&record).is_err());
}

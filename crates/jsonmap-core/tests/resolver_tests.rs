use std::sync::Arc;

use jsonmap_core::{
    resolve, CollectionKind, ConfigError, EnumAdapter, FieldSchema, ParseType, SchemaRef,
    TypeSchema, Value,
};

fn no_names(_: &str) -> Option<ParseType> {
    None
}

fn builtin(declared: &str) -> (ParseType, CollectionKind) {
    resolve(declared, no_names).unwrap()
}

fn point() -> Arc<TypeSchema> {
    TypeSchema::builder("Point")
        .field(FieldSchema::new("x", ParseType::Int))
        .build()
        .unwrap()
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn scalar_spellings() {
    for (declared, expected) in [
        ("bool", ParseType::Bool),
        ("i32", ParseType::Int),
        ("i64", ParseType::Long),
        ("f32", ParseType::Float),
        ("f64", ParseType::Double),
        ("String", ParseType::String),
        ("Option<bool>", ParseType::BoxedBool),
        ("Option<i32>", ParseType::BoxedInt),
        ("Option<i64>", ParseType::BoxedLong),
        ("Option<f32>", ParseType::BoxedFloat),
        ("Option<f64>", ParseType::BoxedDouble),
        ("Option<String>", ParseType::String),
    ] {
        assert_eq!(builtin(declared), (expected, CollectionKind::None), "{declared}");
    }
}

#[test]
fn whitespace_is_tolerated() {
    assert_eq!(builtin(" Option < i32 > "), (ParseType::BoxedInt, CollectionKind::None));
    assert_eq!(
        builtin("HashMap< String ,i64 >"),
        (ParseType::BoxedLong, CollectionKind::Map)
    );
}

#[test]
fn unknown_names_are_unsupported() {
    assert_eq!(builtin("Uuid"), (ParseType::Unsupported, CollectionKind::None));
    assert_eq!(builtin("Box<i32>"), (ParseType::Unsupported, CollectionKind::None));
    assert_eq!(builtin("u8"), (ParseType::Unsupported, CollectionKind::None));
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn container_heads() {
    for (declared, kind) in [
        ("Vec<i32>", CollectionKind::List),
        ("List<i32>", CollectionKind::List),
        ("LinkedList<i32>", CollectionKind::List),
        ("VecDeque<i32>", CollectionKind::Queue),
        ("Queue<i32>", CollectionKind::Queue),
        ("HashSet<i32>", CollectionKind::Set),
        ("BTreeSet<i32>", CollectionKind::Set),
        ("IndexSet<i32>", CollectionKind::Set),
        ("Set<i32>", CollectionKind::Set),
        ("HashMap<String, i32>", CollectionKind::Map),
        ("BTreeMap<String, i32>", CollectionKind::Map),
        ("IndexMap<String, i32>", CollectionKind::Map),
        ("Map<String, i32>", CollectionKind::Map),
    ] {
        assert_eq!(builtin(declared), (ParseType::BoxedInt, kind), "{declared}");
    }
}

#[test]
fn container_elements_are_nullable() {
    assert_eq!(builtin("Vec<bool>").0, ParseType::BoxedBool);
    assert_eq!(builtin("Vec<Option<f64>>").0, ParseType::BoxedDouble);
    assert_eq!(builtin("Vec<String>").0, ParseType::String);
}

#[test]
fn optional_container_is_the_container() {
    assert_eq!(builtin("Option<Vec<i64>>"), (ParseType::BoxedLong, CollectionKind::List));
    assert_eq!(
        builtin("Option<HashMap<String, String>>"),
        (ParseType::String, CollectionKind::Map)
    );
}

#[test]
fn nested_containers_are_rejected() {
    for declared in [
        "Vec<Vec<i32>>",
        "HashMap<String, Vec<i32>>",
        "HashSet<HashMap<String, i32>>",
        "Vec<Option<Vec<i32>>>",
    ] {
        assert!(
            matches!(resolve(declared, no_names), Err(ConfigError::NestedContainer { .. })),
            "{declared}"
        );
    }
}

#[test]
fn map_keys_must_be_strings() {
    let err = resolve("HashMap<i32, String>", no_names).unwrap_err();
    assert_eq!(
        err,
        ConfigError::NonStringMapKey {
            declared: "HashMap<i32, String>".into()
        }
    );
}

#[test]
fn malformed_declarations() {
    for declared in [
        "",
        "Vec<",
        "Vec<>",
        "Vec<i32",
        "Vec<i32>>",
        "<i32>",
        "HashMap<String>",
        "Vec<i32, i64>",
        "Option<i32, i64>",
        "Vec<i32,>",
        "i32,",
    ] {
        assert!(
            matches!(resolve(declared, no_names), Err(ConfigError::MalformedType { .. })),
            "{declared:?}"
        );
    }
}

// ============================================================================
// Named types
// ============================================================================

#[test]
fn named_types_go_through_lookup() {
    let point = point();
    let color = Arc::new(EnumAdapter::from_table(
        "Color",
        ParseType::String,
        [("Red", Value::from("red"))],
    ));
    let named = |name: &str| match name {
        "Point" => Some(ParseType::Object(SchemaRef::new(point.clone()))),
        "Color" => Some(ParseType::Enum(color.clone())),
        _ => None,
    };

    let (parse_type, kind) = resolve("Point", named).unwrap();
    assert_eq!(kind, CollectionKind::None);
    assert!(matches!(&parse_type, ParseType::Object(r) if r.id() == "Point"));

    let (parse_type, kind) = resolve("Vec<Option<Point>>", named).unwrap();
    assert_eq!(kind, CollectionKind::List);
    assert!(matches!(parse_type, ParseType::Object(_)));

    let (parse_type, kind) = resolve("Map<String, Color>", named).unwrap();
    assert_eq!(kind, CollectionKind::Map);
    assert!(matches!(&parse_type, ParseType::Enum(a) if a.name() == "Color"));

    assert_eq!(resolve("Line", named).unwrap().0, ParseType::Unsupported);
}

#[test]
fn builtin_names_win_over_lookup() {
    let (parse_type, _) = resolve("String", |_| Some(ParseType::Unsupported)).unwrap();
    assert_eq!(parse_type, ParseType::String);
}

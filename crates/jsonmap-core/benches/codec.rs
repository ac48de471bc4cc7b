use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use jsonmap_core::{Codec, FieldSchema, ParseType, Record, TypeSchema, Value};

fn order_schema() -> Arc<TypeSchema> {
    let base = TypeSchema::builder("Entity")
        .abstract_type()
        .field(FieldSchema::new("id", ParseType::Long))
        .build()
        .unwrap();
    TypeSchema::builder("Order")
        .parent(base)
        .field(FieldSchema::new("customer", ParseType::String))
        .field(FieldSchema::new("total", ParseType::Double))
        .field(FieldSchema::list("quantities", ParseType::Int))
        .field(FieldSchema::map("notes", ParseType::String))
        .build()
        .unwrap()
}

fn sample_document(items: usize) -> String {
    let quantities: Vec<String> = (0..items).map(|i| i.to_string()).collect();
    format!(
        concat!(
            r#"{{"customer":"Ada","total":1234.5,"quantities":[{}],"#,
            r#""notes":{{"gift":"yes","rush":null}},"id":42,"ignored":{{"deep":[1,[2,[3]]]}}}}"#,
        ),
        quantities.join(",")
    )
}

fn bench_decode(c: &mut Criterion) {
    let schema = order_schema();
    let codec = Codec::new();
    let text = sample_document(100);
    c.bench_function("decode_order_100_items", |b| {
        b.iter(|| codec.decode_str(&schema, black_box(&text)).unwrap())
    });
}

fn bench_encode(c: &mut Criterion) {
    let schema = order_schema();
    let codec = Codec::new();
    let record = Record::new(&schema)
        .with("customer", "Ada")
        .with("total", 1234.5f64)
        .with("id", 42i64)
        .with("quantities", Value::list((0..100).map(Value::Int)));
    c.bench_function("encode_order_100_items", |b| {
        b.iter(|| codec.encode_to_string(black_box(&record)).unwrap())
    });
}

criterion_group!(codec_benches, bench_decode, bench_encode);
criterion_main!(codec_benches);

//! List, set, queue and string-keyed map fields.
//!
//! Sequences and maps treat nulls differently, and both behaviors are relied
//! on by round trips:
//!
//! - **Sequences** drop every element that decodes to nothing, including
//!   explicit JSON nulls. Null elements held in memory are skipped on encode.
//! - **Maps** keep an explicit JSON null as a key mapped to `None`, and write
//!   such entries back as `null`. A non-null value that decodes to nothing is
//!   dropped.
//!
//! Elements are always decoded as nullable, so a bad element is dropped rather
//! than failing the document.

use std::collections::VecDeque;

use indexmap::IndexMap;
use tracing::debug;

use crate::codec::Codec;
use crate::error::{DecodeResult, EncodeError, EncodeResult};
use crate::object;
use crate::schema::FieldSchema;
use crate::token::{JsonParser, JsonToken};
use crate::types::CollectionKind;
use crate::value::Value;
use crate::writer::JsonWriter;

/// Decode a container field. The value is left absent unless the cursor is on
/// the container's opening token.
pub(crate) fn decode(
    parser: &mut JsonParser<'_>,
    field: &FieldSchema,
    codec: &Codec,
) -> DecodeResult<Option<Value>> {
    let kind = field.collection_kind();
    if kind == CollectionKind::Map {
        return decode_map(parser, field, codec);
    }

    if parser.current_token() != Some(JsonToken::StartArray) {
        debug!(
            field = field.name(),
            kind = kind.name(),
            "expected array, leaving field absent"
        );
        return Ok(None);
    }

    let element = field.parse_type().boxed();
    let mut items: Vec<Option<Value>> = Vec::new();
    while let Some(token) = parser.next_token()? {
        match token {
            JsonToken::EndArray => break,
            JsonToken::Null => continue,
            _ => {}
        }
        let item = object::decode_single(parser, field, &element, codec)?;
        parser.skip_children()?;
        if let Some(item) = item {
            let duplicate = kind == CollectionKind::Set
                && items.iter().any(|seen| seen.as_ref() == Some(&item));
            if !duplicate {
                items.push(Some(item));
            }
        }
    }

    Ok(Some(match kind {
        CollectionKind::Set => Value::Set(items),
        CollectionKind::Queue => Value::Queue(VecDeque::from(items)),
        _ => Value::List(items),
    }))
}

fn decode_map(
    parser: &mut JsonParser<'_>,
    field: &FieldSchema,
    codec: &Codec,
) -> DecodeResult<Option<Value>> {
    if parser.current_token() != Some(JsonToken::StartObject) {
        debug!(field = field.name(), "expected object for map, leaving field absent");
        return Ok(None);
    }

    let element = field.parse_type().boxed();
    let mut entries: IndexMap<String, Option<Value>> = IndexMap::new();
    while parser.next_token()? == Some(JsonToken::FieldName) {
        let key = parser.current_name().to_string();
        if parser.next_token()? == Some(JsonToken::Null) {
            entries.insert(key, None);
            continue;
        }
        let item = object::decode_single(parser, field, &element, codec)?;
        parser.skip_children()?;
        if let Some(item) = item {
            entries.insert(key, Some(item));
        }
    }
    Ok(Some(Value::Map(entries)))
}

/// Encode a present container value.
pub(crate) fn encode(
    writer: &mut JsonWriter,
    field: &FieldSchema,
    value: &Value,
    codec: &Codec,
) -> EncodeResult<()> {
    let element = field.parse_type().boxed();
    match (field.collection_kind(), value) {
        (CollectionKind::List, Value::List(items)) | (CollectionKind::Set, Value::Set(items)) => {
            encode_sequence(writer, field, items.iter(), codec)
        }
        (CollectionKind::Queue, Value::Queue(items)) => {
            encode_sequence(writer, field, items.iter(), codec)
        }
        (CollectionKind::Map, Value::Map(entries)) => {
            writer.start_object();
            for (key, item) in entries {
                writer.field_name(key);
                match item {
                    Some(item) => object::encode_single(writer, field, &element, item, codec)?,
                    None => writer.null(),
                }
            }
            writer.end_object();
            Ok(())
        }
        (kind, _) => Err(EncodeError::ValueMismatch {
            field: field.name().to_string(),
            expected: kind.name(),
        }),
    }
}

fn encode_sequence<'v>(
    writer: &mut JsonWriter,
    field: &FieldSchema,
    items: impl Iterator<Item = &'v Option<Value>>,
    codec: &Codec,
) -> EncodeResult<()> {
    let element = field.parse_type().boxed();
    writer.start_array();
    for item in items.flatten() {
        object::encode_single(writer, field, &element, item, codec)?;
    }
    writer.end_array();
    Ok(())
}

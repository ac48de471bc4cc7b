//! Object codec: decode and encode one structured type through its schema,
//! including the inherited fields of every ancestor.
//!
//! # Decoding
//!
//! The cursor must sit on the value to decode. Anything other than `{` is a
//! soft mismatch: the value is skipped and the result is `None`. Inside the
//! object each key is matched against the most-derived schema first, then
//! each ancestor in turn; unknown keys are ignored. Whatever the matched codec
//! consumed, the rest of the value is skipped before the next key is read, so
//! a malformed value never desynchronizes the parser.
//!
//! # Encoding
//!
//! Own fields are written first in declaration order, then each ancestor's,
//! all inside the same object. A name shared by a type and an ancestor is
//! written once, from the most-derived declaration.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::codec::Codec;
use crate::collection;
use crate::error::{ConfigError, DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::schema::{FieldSchema, TypeSchema};
use crate::scalar;
use crate::token::{JsonParser, JsonToken};
use crate::types::ParseType;
use crate::value::{Record, Value};
use crate::writer::JsonWriter;

/// Decode the value under the cursor as an instance of `schema`.
///
/// Returns `Ok(None)` for a shape mismatch. Fails with
/// [`ConfigError::AbstractEntryPoint`] for abstract and interface schemas.
pub fn decode(
    parser: &mut JsonParser<'_>,
    schema: &Arc<TypeSchema>,
    codec: &Codec,
) -> DecodeResult<Option<Record>> {
    if !schema.generates_terminal_decode() {
        return Err(ConfigError::AbstractEntryPoint {
            type_id: schema.id().to_string(),
        }
        .into());
    }

    if parser.current_token() != Some(JsonToken::StartObject) {
        debug!(
            type_id = schema.id(),
            found = parser.current_token().map_or("end of input", |t| t.describe()),
            "expected object, skipping value"
        );
        parser.skip_children()?;
        return Ok(None);
    }

    let mut record = Record::new(schema);
    while parser.next_token()? == Some(JsonToken::FieldName) {
        let key = parser.current_name().to_string();
        parser.next_token()?;

        match schema.find_field(&key) {
            Some(field) => {
                let value = decode_field(parser, field, codec)?;
                let value = match field.assign_hook() {
                    Some(assign) => assign(value),
                    None => value,
                };
                record.set_value(field.name(), value);
            }
            None => trace!(type_id = schema.id(), field = %key, "ignoring unknown field"),
        }

        parser.skip_children()?;
    }

    check_required(&record, codec)?;

    let hook = schema.lineage().find_map(TypeSchema::postprocess_hook);
    Ok(Some(match hook {
        Some(postprocess) => postprocess(record),
        None => record,
    }))
}

/// Report absent required fields to the codec's decode callback, if any.
fn check_required(record: &Record, codec: &Codec) -> DecodeResult<()> {
    let Some(callback) = codec.decode_callback() else {
        return Ok(());
    };
    for level in record.schema().lineage() {
        for field in level.fields().iter().filter(|f| f.is_required()) {
            if record.get(field.name()).is_none() {
                callback
                    .on_unexpected_null(field.name(), level.id())
                    .map_err(|message| DecodeError::UnexpectedNull {
                        field: field.name().to_string(),
                        type_id: level.id().to_string(),
                        message,
                    })?;
            }
        }
    }
    Ok(())
}

/// Decode one field's value, container or single.
pub(crate) fn decode_field(
    parser: &mut JsonParser<'_>,
    field: &FieldSchema,
    codec: &Codec,
) -> DecodeResult<Option<Value>> {
    if field.collection_kind().is_collection() {
        collection::decode(parser, field, codec)
    } else {
        decode_single(parser, field, field.parse_type(), codec)
    }
}

/// Decode a single value of type `target` for `field`: the field itself, or
/// one element of its container.
pub(crate) fn decode_single(
    parser: &mut JsonParser<'_>,
    field: &FieldSchema,
    target: &ParseType,
    codec: &Codec,
) -> DecodeResult<Option<Value>> {
    if let Some(extract) = field.extract_hook() {
        return extract(parser, codec);
    }
    match target {
        ParseType::Object(target) => {
            let schema = target.get()?;
            let record = if schema.is_interface() {
                codec.decode_polymorphic(parser)?
            } else {
                decode(parser, schema, codec)?
            };
            Ok(record.map(Value::from))
        }
        ParseType::Enum(adapter) => adapter.decode(parser, field.mapping_policy(), field.name()),
        ParseType::Unsupported => Ok(None),
        scalar_type => scalar::decode(parser, scalar_type, field.mapping_policy(), field.name()),
    }
}

/// Encode `record`, optionally wrapped in `{` `}`.
///
/// Without delimiters the fields are written into an object the caller has
/// already opened.
pub fn encode(
    writer: &mut JsonWriter,
    record: &Record,
    write_delimiters: bool,
    codec: &Codec,
) -> EncodeResult<()> {
    if write_delimiters {
        writer.start_object();
    }
    let mut written: HashSet<&str> = HashSet::new();
    for level in record.schema().lineage() {
        for field in level.fields() {
            if written.insert(field.name()) {
                encode_field(writer, field, record.get(field.name()), codec)?;
            }
        }
    }
    if write_delimiters {
        writer.end_object();
    }
    Ok(())
}

/// Write one field, key included, or nothing when it is omitted.
fn encode_field(
    writer: &mut JsonWriter,
    field: &FieldSchema,
    value: Option<&Value>,
    codec: &Codec,
) -> EncodeResult<()> {
    if let Some(serialize) = field.serialize_hook() {
        return serialize(writer, field, value);
    }

    let Some(value) = value else {
        if field.always_written() {
            if let Some(default) = field.default_value() {
                writer.field_name(field.name());
                scalar::encode(writer, field.parse_type(), &default, field.name())?;
            }
        }
        return Ok(());
    };

    writer.field_name(field.name());
    if field.collection_kind().is_collection() {
        collection::encode(writer, field, value, codec)
    } else {
        encode_single(writer, field, field.parse_type(), value, codec)
    }
}

/// Write a single value of type `target` for `field`.
pub(crate) fn encode_single(
    writer: &mut JsonWriter,
    field: &FieldSchema,
    target: &ParseType,
    value: &Value,
    codec: &Codec,
) -> EncodeResult<()> {
    match target {
        ParseType::Object(target) => {
            let Value::Object(record) = value else {
                return Err(mismatch(field, "object"));
            };
            if target.get()?.is_interface() {
                codec.encode_polymorphic(writer, record)
            } else {
                encode(writer, record, true, codec)
            }
        }
        ParseType::Enum(adapter) => {
            let Value::Enum(variant) = value else {
                return Err(mismatch(field, "enum"));
            };
            adapter.encode(writer, variant, field.name())
        }
        ParseType::Unsupported => {
            writer.null();
            Ok(())
        }
        scalar_type => scalar::encode(writer, scalar_type, value, field.name()),
    }
}

fn mismatch(field: &FieldSchema, expected: &'static str) -> EncodeError {
    EncodeError::ValueMismatch {
        field: field.name().to_string(),
        expected,
    }
}

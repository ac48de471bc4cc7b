//! Scalar decode/encode for every boolean, numeric and string [`ParseType`].
//!
//! Decoding reads only the parser's current token and never advances it; the
//! caller is responsible for moving past the value.
//!
//! # Matching policies
//!
//! - **Exact**: the token kind must match the target. A mismatch on a
//!   non-nullable target is a [`DecodeError::TypeMismatch`]; on a nullable
//!   target (boxed scalars and `String`) it yields an absent value. A JSON
//!   `null` counts as a mismatch.
//! - **Coerced**: never fails. Numbers, booleans and numeric strings are
//!   converted best-effort, and anything else (JSON `null` included) reads as
//!   `false`/`0`/`0.0` for boxed and primitive targets alike. `String` maps
//!   `null` and structural tokens to absent and otherwise takes the raw token
//!   text.

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::token::{JsonParser, JsonToken};
use crate::types::{MappingPolicy, ParseType};
use crate::value::Value;
use crate::writer::JsonWriter;

/// Decode the current token as `target`.
pub fn decode(
    parser: &JsonParser<'_>,
    target: &ParseType,
    mapping: MappingPolicy,
    field: &str,
) -> DecodeResult<Option<Value>> {
    match mapping {
        MappingPolicy::Exact => decode_exact(parser, target, field),
        MappingPolicy::Coerced => Ok(decode_coerced(parser, target)),
    }
}

fn decode_exact(
    parser: &JsonParser<'_>,
    target: &ParseType,
    field: &str,
) -> DecodeResult<Option<Value>> {
    let token = parser.current_token();
    let value = match target {
        ParseType::Bool | ParseType::BoxedBool => match token {
            Some(JsonToken::True) => Some(Value::Bool(true)),
            Some(JsonToken::False) => Some(Value::Bool(false)),
            _ => None,
        },
        ParseType::Int => exact_integer(parser, true)
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int),
        ParseType::BoxedInt => exact_integer(parser, false)
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int),
        ParseType::Long => exact_integer(parser, true).map(Value::Long),
        ParseType::BoxedLong => exact_integer(parser, false).map(Value::Long),
        ParseType::Float | ParseType::BoxedFloat => {
            parser.double_value().map(|n| Value::Float(n as f32))
        }
        ParseType::Double | ParseType::BoxedDouble => parser.double_value().map(Value::Double),
        ParseType::String => match token {
            Some(JsonToken::String) => Some(Value::String(parser.text().to_string())),
            _ => None,
        },
        ParseType::Object(_) | ParseType::Enum(_) | ParseType::Unsupported => None,
    };

    if value.is_none() && !target.is_nullable() {
        return Err(DecodeError::TypeMismatch {
            field: field.to_string(),
            expected: target.name(),
            found: token.map_or("end of input", |t| t.describe()).to_string(),
        });
    }
    Ok(value)
}

/// Integer literal as `i64`. Primitive targets also accept a float literal,
/// truncated, when it lies in range.
fn exact_integer(parser: &JsonParser<'_>, accept_float: bool) -> Option<i64> {
    match parser.current_token() {
        Some(JsonToken::NumberInt) => parser.long_value(),
        Some(JsonToken::NumberFloat) if accept_float => parser
            .double_value()
            .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64),
        _ => None,
    }
}

fn decode_coerced(parser: &JsonParser<'_>, target: &ParseType) -> Option<Value> {
    let token = parser.current_token();
    match target {
        ParseType::Bool | ParseType::BoxedBool => Some(Value::Bool(parser.value_as_bool())),
        ParseType::Int | ParseType::BoxedInt => Some(Value::Int(parser.value_as_int())),
        ParseType::Long | ParseType::BoxedLong => Some(Value::Long(parser.value_as_long())),
        ParseType::Float | ParseType::BoxedFloat => {
            Some(Value::Float(parser.value_as_double() as f32))
        }
        ParseType::Double | ParseType::BoxedDouble => {
            Some(Value::Double(parser.value_as_double()))
        }
        ParseType::String => match token {
            None | Some(JsonToken::Null) => None,
            Some(t) if t.is_structure_start() => None,
            _ => Some(Value::String(parser.text().to_string())),
        },
        ParseType::Object(_) | ParseType::Enum(_) | ParseType::Unsupported => None,
    }
}

/// Write `value` as `target`. The value's variant must match the target.
pub fn encode(
    writer: &mut JsonWriter,
    target: &ParseType,
    value: &Value,
    field: &str,
) -> EncodeResult<()> {
    match (target, value) {
        (ParseType::Bool | ParseType::BoxedBool, Value::Bool(b)) => writer.bool(*b),
        (ParseType::Int | ParseType::BoxedInt, Value::Int(n)) => writer.int(*n),
        (ParseType::Long | ParseType::BoxedLong, Value::Long(n)) => writer.long(*n),
        (ParseType::Float | ParseType::BoxedFloat, Value::Float(n)) => writer.float(*n),
        (ParseType::Double | ParseType::BoxedDouble, Value::Double(n)) => writer.double(*n),
        (ParseType::String, Value::String(s)) => writer.string(s),
        _ => {
            return Err(EncodeError::ValueMismatch {
                field: field.to_string(),
                expected: target.name(),
            })
        }
    }
    Ok(())
}

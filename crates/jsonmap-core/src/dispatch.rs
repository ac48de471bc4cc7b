//! Polymorphic dispatch for interface-typed values.
//!
//! An interface value travels as a two-element array, `[typeName, payload]`.
//! The type name selects a [`PolymorphicHandler`] from a name-keyed registry,
//! and the handler decodes or encodes the payload.
//!
//! # Failure classes
//!
//! A wrong shape (no array, or a first element that is not a string) is a
//! soft mismatch and yields `None`. A type name with no registered handler is
//! a hard failure on both decode and encode.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::Codec;
use crate::error::{ConfigError, ConfigResult, DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::object;
use crate::schema::TypeSchema;
use crate::token::{JsonParser, JsonToken};
use crate::value::Record;
use crate::writer::JsonWriter;

/// Decodes and encodes the payload of one concrete implementation.
pub trait PolymorphicHandler: Send + Sync {
    /// Decode the payload under the cursor.
    fn decode(&self, parser: &mut JsonParser<'_>, codec: &Codec) -> DecodeResult<Option<Record>>;

    /// Encode `record` as the payload, delimiters included.
    fn encode(&self, writer: &mut JsonWriter, record: &Record, codec: &Codec) -> EncodeResult<()>;
}

/// Handler that maps the payload through a concrete [`TypeSchema`].
#[derive(Debug, Clone)]
pub struct SchemaHandler {
    schema: Arc<TypeSchema>,
}

impl SchemaHandler {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }
}

impl PolymorphicHandler for SchemaHandler {
    fn decode(&self, parser: &mut JsonParser<'_>, codec: &Codec) -> DecodeResult<Option<Record>> {
        object::decode(parser, &self.schema, codec)
    }

    fn encode(&self, writer: &mut JsonWriter, record: &Record, codec: &Codec) -> EncodeResult<()> {
        object::encode(writer, record, true, codec)
    }
}

/// Type-name-keyed handler table, safe to share across threads.
///
/// Meant to be filled during startup; lookups take a read lock.
#[derive(Default)]
pub struct PolymorphicRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn PolymorphicHandler>>>,
}

impl PolymorphicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. Fails with [`ConfigError::DuplicateHandler`] if the
    /// name is taken; the existing handler is kept.
    pub fn register(
        &self,
        type_name: impl Into<String>,
        handler: Arc<dyn PolymorphicHandler>,
    ) -> ConfigResult<()> {
        let type_name = type_name.into();
        let mut handlers = self.handlers.write();
        if handlers.contains_key(&type_name) {
            return Err(ConfigError::DuplicateHandler { type_name });
        }
        debug!(type_name = %type_name, "registered polymorphic handler");
        handlers.insert(type_name, handler);
        Ok(())
    }

    /// Remove a handler. Returns whether one was present; removing an unknown
    /// name is not an error.
    pub fn unregister(&self, type_name: &str) -> bool {
        let removed = self.handlers.write().remove(type_name).is_some();
        if removed {
            debug!(type_name, "unregistered polymorphic handler");
        }
        removed
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn PolymorphicHandler>> {
        self.handlers.read().get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.handlers.read().contains_key(type_name)
    }

    /// Registered names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl fmt::Debug for PolymorphicRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicRegistry")
            .field("type_names", &self.type_names())
            .finish()
    }
}

/// Decode a `[typeName, payload]` array under the cursor.
///
/// The cursor ends on the array's closing `]`; trailing elements after the
/// payload are skipped.
pub fn decode(parser: &mut JsonParser<'_>, codec: &Codec) -> DecodeResult<Option<Record>> {
    if parser.current_token() != Some(JsonToken::StartArray) {
        debug!(
            found = parser.current_token().map_or("end of input", |t| t.describe()),
            "expected polymorphic array, skipping value"
        );
        parser.skip_children()?;
        return Ok(None);
    }
    let depth = parser.depth();

    if parser.next_token()? != Some(JsonToken::String) {
        debug!("polymorphic array does not start with a type name, skipping value");
        parser.finish_container(depth)?;
        return Ok(None);
    }

    let type_name = parser.text().to_string();
    let handler = codec
        .get_handler(&type_name)
        .ok_or(DecodeError::UnknownType { type_name })?;

    parser.next_token()?;
    let record = handler.decode(parser, codec)?;
    parser.finish_container(depth)?;
    Ok(record)
}

/// Encode `record` as `[typeName, payload]` using its schema's type name.
pub fn encode(writer: &mut JsonWriter, record: &Record, codec: &Codec) -> EncodeResult<()> {
    let type_name = record.schema().type_name();
    let handler = codec
        .get_handler(type_name)
        .ok_or_else(|| EncodeError::UnknownType {
            type_name: type_name.to_string(),
        })?;

    writer.start_array();
    writer.string(type_name);
    handler.encode(writer, record, codec)?;
    writer.end_array();
    Ok(())
}

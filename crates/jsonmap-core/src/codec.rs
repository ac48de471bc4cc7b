//! [`Codec`]: the runtime configuration every decode and encode runs under.
//!
//! A codec owns the polymorphic handler registry and an optional
//! [`DecodeCallback`]. Build one at startup, register handlers, then share it
//! (it is `Clone`, and clones share the registry) across threads.

use std::fmt;
use std::sync::Arc;

use crate::dispatch::{self, PolymorphicHandler, PolymorphicRegistry, SchemaHandler};
use crate::error::{ConfigResult, DecodeResult, EncodeResult};
use crate::object;
use crate::schema::{SchemaKind, TypeSchema};
use crate::token::JsonParser;
use crate::value::Record;
use crate::writer::JsonWriter;

/// Notified when a required field is still absent after its object has been
/// read.
pub trait DecodeCallback: Send + Sync {
    /// Return `Err(message)` to abort the decode with
    /// [`crate::DecodeError::UnexpectedNull`].
    fn on_unexpected_null(&self, field: &str, type_id: &str) -> Result<(), String>;
}

/// Entry point for decoding and encoding records.
#[derive(Clone, Default)]
pub struct Codec {
    registry: Arc<PolymorphicRegistry>,
    callback: Option<Arc<dyn DecodeCallback>>,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check required fields through `callback` on every decode.
    pub fn with_callback(mut self, callback: Arc<dyn DecodeCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn registry(&self) -> &PolymorphicRegistry {
        &self.registry
    }

    pub(crate) fn decode_callback(&self) -> Option<&Arc<dyn DecodeCallback>> {
        self.callback.as_ref()
    }

    // ------------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------------

    /// Decode the value under the cursor as `schema`.
    ///
    /// Interface schemas are read through the polymorphic registry. Abstract
    /// schemas have no entry point and fail with
    /// [`crate::ConfigError::AbstractEntryPoint`].
    pub fn decode(
        &self,
        schema: &Arc<TypeSchema>,
        parser: &mut JsonParser<'_>,
    ) -> DecodeResult<Option<Record>> {
        match schema.kind() {
            SchemaKind::Interface => dispatch::decode(parser, self),
            SchemaKind::Concrete | SchemaKind::Abstract => object::decode(parser, schema, self),
        }
    }

    /// Open a cursor over `text`, advance to its first token and decode.
    pub fn decode_str(&self, schema: &Arc<TypeSchema>, text: &str) -> DecodeResult<Option<Record>> {
        let mut parser = JsonParser::new(text);
        parser.next_token()?;
        self.decode(schema, &mut parser)
    }

    /// Decode a `[typeName, payload]` array under the cursor.
    pub fn decode_polymorphic(&self, parser: &mut JsonParser<'_>) -> DecodeResult<Option<Record>> {
        dispatch::decode(parser, self)
    }

    pub fn decode_polymorphic_str(&self, text: &str) -> DecodeResult<Option<Record>> {
        let mut parser = JsonParser::new(text);
        parser.next_token()?;
        dispatch::decode(&mut parser, self)
    }

    // ------------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------------

    /// Encode `record` into `writer`. With `write_delimiters == false` the
    /// fields are written into an object the caller has already opened.
    pub fn encode(
        &self,
        writer: &mut JsonWriter,
        record: &Record,
        write_delimiters: bool,
    ) -> EncodeResult<()> {
        object::encode(writer, record, write_delimiters, self)
    }

    pub fn encode_to_string(&self, record: &Record) -> EncodeResult<String> {
        let mut writer = JsonWriter::new();
        self.encode(&mut writer, record, true)?;
        Ok(writer.finish())
    }

    /// Encode `record` as `[typeName, payload]`.
    pub fn encode_polymorphic(&self, writer: &mut JsonWriter, record: &Record) -> EncodeResult<()> {
        dispatch::encode(writer, record, self)
    }

    pub fn encode_polymorphic_to_string(&self, record: &Record) -> EncodeResult<String> {
        let mut writer = JsonWriter::new();
        self.encode_polymorphic(&mut writer, record)?;
        Ok(writer.finish())
    }

    // ------------------------------------------------------------------------
    // Handler registry
    // ------------------------------------------------------------------------

    pub fn register_handler(
        &self,
        type_name: impl Into<String>,
        handler: Arc<dyn PolymorphicHandler>,
    ) -> ConfigResult<()> {
        self.registry.register(type_name, handler)
    }

    /// Register a [`SchemaHandler`] for `schema` under its type name.
    pub fn register_schema(&self, schema: &Arc<TypeSchema>) -> ConfigResult<()> {
        self.registry
            .register(schema.type_name(), Arc::new(SchemaHandler::new(Arc::clone(schema))))
    }

    /// Idempotent; returns whether a handler was removed.
    pub fn unregister_handler(&self, type_name: &str) -> bool {
        self.registry.unregister(type_name)
    }

    pub fn get_handler(&self, type_name: &str) -> Option<Arc<dyn PolymorphicHandler>> {
        self.registry.get(type_name)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("registry", &self.registry)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

//! Enum adapters and their registry.
//!
//! An enum field is carried on the wire as a scalar of the adapter's wire
//! type. Conversion in both directions is delegated entirely to the adapter;
//! there is no default mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult, DecodeResult, EncodeError, EncodeResult};
use crate::scalar;
use crate::token::{JsonParser, JsonToken};
use crate::types::{MappingPolicy, ParseType};
use crate::value::Value;
use crate::writer::JsonWriter;

/// A decoded enum variant, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue(pub String);

impl EnumValue {
    pub fn new(variant: impl Into<String>) -> Self {
        Self(variant.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire scalar to variant. `None` for unknown wire values.
pub type EnumFromFn = Arc<dyn Fn(&Value) -> Option<EnumValue> + Send + Sync>;

/// Variant to wire scalar. `None` for unknown variants.
pub type EnumToFn = Arc<dyn Fn(&EnumValue) -> Option<Value> + Send + Sync>;

/// User-supplied conversion pair for one enum type.
pub struct EnumAdapter {
    name: String,
    wire: ParseType,
    from_json: EnumFromFn,
    to_json: EnumToFn,
}

impl EnumAdapter {
    /// `wire` is the scalar type the enum travels as, e.g. `ParseType::String`.
    pub fn new(
        name: impl Into<String>,
        wire: ParseType,
        from_json: EnumFromFn,
        to_json: EnumToFn,
    ) -> Self {
        Self {
            name: name.into(),
            wire,
            from_json,
            to_json,
        }
    }

    /// Adapter backed by a fixed variant/wire-value table.
    pub fn from_table<I, S>(name: impl Into<String>, wire: ParseType, table: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let table: Arc<Vec<(EnumValue, Value)>> = Arc::new(
            table
                .into_iter()
                .map(|(variant, wire)| (EnumValue::new(variant), wire))
                .collect(),
        );
        let lookup = Arc::clone(&table);
        Self::new(
            name,
            wire,
            Arc::new(move |value: &Value| {
                lookup
                    .iter()
                    .find(|(_, w)| w == value)
                    .map(|(variant, _)| variant.clone())
            }),
            Arc::new(move |variant: &EnumValue| {
                table
                    .iter()
                    .find(|(v, _)| v == variant)
                    .map(|(_, w)| w.clone())
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_type(&self) -> &ParseType {
        &self.wire
    }

    /// Read the current token as the wire scalar and convert it. The wire
    /// scalar is read as nullable, so a JSON null, a mismatched token or an
    /// unknown wire value all leave the field absent.
    pub fn decode(
        &self,
        parser: &JsonParser<'_>,
        mapping: MappingPolicy,
        field: &str,
    ) -> DecodeResult<Option<Value>> {
        if parser.current_token() == Some(JsonToken::Null) {
            return Ok(None);
        }
        let scalar = scalar::decode(parser, &self.wire.boxed(), mapping, field)?;
        Ok(scalar.and_then(|wire| (self.from_json)(&wire)).map(Value::Enum))
    }

    pub fn encode(
        &self,
        writer: &mut JsonWriter,
        value: &EnumValue,
        field: &str,
    ) -> EncodeResult<()> {
        let wire = (self.to_json)(value).ok_or_else(|| EncodeError::ValueMismatch {
            field: field.to_string(),
            expected: "a known enum variant",
        })?;
        scalar::encode(writer, &self.wire, &wire, field)
    }
}

impl fmt::Debug for EnumAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumAdapter")
            .field("name", &self.name)
            .field("wire", &self.wire)
            .finish_non_exhaustive()
    }
}

/// Name-keyed set of enum adapters.
#[derive(Debug, Default, Clone)]
pub struct EnumRegistry {
    adapters: HashMap<String, Arc<EnumAdapter>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter under its own name. Names must be unique.
    pub fn register(&mut self, adapter: EnumAdapter) -> ConfigResult<Arc<EnumAdapter>> {
        if self.adapters.contains_key(adapter.name()) {
            return Err(ConfigError::Declaration(format!(
                "enum {} is declared twice",
                adapter.name()
            )));
        }
        let adapter = Arc::new(adapter);
        self.adapters
            .insert(adapter.name().to_string(), Arc::clone(&adapter));
        Ok(adapter)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EnumAdapter>> {
        self.adapters.get(name)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

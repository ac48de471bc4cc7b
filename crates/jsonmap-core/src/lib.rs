//! # jsonmap-core
//!
//! Schema-driven JSON object mapping. A [`TypeSchema`] describes the fields of
//! one structured type; the codec decodes a JSON token stream into a
//! [`Record`] of that type and encodes records back into JSON.
//!
//! The interesting part is the decode policy: scalar tokens are matched
//! exactly or coerced per field, lists drop nulls while maps keep them,
//! inherited fields are flattened into one object, interface values travel as
//! `[typeName, payload]`, and a value of the wrong shape is skipped without
//! losing the parser's place.
//!
//! ## Quick start
//!
//! ```rust
//! use jsonmap_core::{Codec, FieldSchema, ParseType, TypeSchema};
//!
//! let point = TypeSchema::builder("Point")
//!     .field(FieldSchema::new("x", ParseType::Int))
//!     .field(FieldSchema::new("label", ParseType::String))
//!     .build()
//!     .unwrap();
//!
//! let codec = Codec::new();
//! let record = codec
//!     .decode_str(&point, r#"{"label":"origin","x":3,"extra":[1,2]}"#)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(record.get_int("x"), Some(3));
//!
//! // Fields are written in declaration order; unknown input keys are gone.
//! let json = codec.encode_to_string(&record).unwrap();
//! assert_eq!(json, r#"{"x":3,"label":"origin"}"#);
//! ```
//!
//! ## Modules
//!
//! - [`token`]: `JsonParser` pull cursor over JSON text
//! - [`writer`]: `JsonWriter` compact JSON sink
//! - [`types`]: `ParseType`, `CollectionKind`, `MappingPolicy`
//! - [`resolver`]: declared type string to `ParseType` + `CollectionKind`
//! - [`scalar`]: exact/coerced scalar decode and scalar encode
//! - [`collection`]: list/set/queue/map fields
//! - [`object`]: object decode/encode with inheritance flattening
//! - [`dispatch`]: polymorphic `[typeName, payload]` handlers and registry
//! - [`enums`]: enum adapters and their registry
//! - [`schema`]: `FieldSchema`, `TypeSchema`, `SchemaRef`
//! - [`value`]: `Record` and `Value`
//! - [`codec`]: `Codec` runtime configuration and entry points
//! - [`catalog`] / [`declaration`]: build schemas from a JSON declaration document
//! - [`error`]: `DecodeError`, `EncodeError`, `ConfigError`

pub mod catalog;
pub mod codec;
pub mod collection;
pub mod declaration;
pub mod dispatch;
pub mod enums;
pub mod error;
pub mod object;
pub mod resolver;
pub mod scalar;
pub mod schema;
pub mod token;
pub mod types;
pub mod value;
pub mod writer;

pub use catalog::SchemaCatalog;
pub use codec::{Codec, DecodeCallback};
pub use declaration::Declaration;
pub use dispatch::{PolymorphicHandler, PolymorphicRegistry, SchemaHandler};
pub use enums::{EnumAdapter, EnumRegistry, EnumValue};
pub use error::{ConfigError, DecodeError, EncodeError};
pub use resolver::resolve;
pub use schema::{FieldSchema, SchemaKind, SchemaRef, TypeSchema};
pub use token::{JsonParser, JsonToken};
pub use types::{CollectionKind, MappingPolicy, ParseType};
pub use value::{Record, Value};
pub use writer::JsonWriter;

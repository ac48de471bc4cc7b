//! Error types for schema construction, decoding and encoding.
//!
//! Decoding distinguishes two failure classes. Soft shape mismatches (an array
//! where an object was expected, and so on) never surface here: the codec skips
//! the offending value and leaves the destination absent. Hard failures abort
//! the whole enclosing decode and are reported as [`DecodeError`].

use thiserror::Error;

/// Errors raised while building schemas, resolving declared types or mutating
/// the polymorphic registry. These are setup-time failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A polymorphic handler is already registered under this type name.
    #[error("Duplicate handler type name: {type_name} is already registered")]
    DuplicateHandler { type_name: String },

    /// Two fields of the same type share a JSON name.
    #[error("Duplicate field '{field}' in type {type_id}")]
    DuplicateField { type_id: String, field: String },

    /// A declared parent type does not exist in the catalog.
    #[error("Type {type_id} names unknown parent {parent}")]
    UnknownParent { type_id: String, parent: String },

    /// The declared parent chain loops back onto itself.
    #[error("Inheritance cycle through type {type_id}")]
    InheritanceCycle { type_id: String },

    /// A deferred schema reference was used before it was bound.
    #[error("Schema reference {type_id} was never bound")]
    UnboundSchema { type_id: String },

    /// An abstract type or interface was used where a concrete decode entry
    /// point is required.
    #[error("Type {type_id} is abstract and has no decode entry point")]
    AbstractEntryPoint { type_id: String },

    /// Containers of containers are not supported.
    #[error("Nested container type is not supported: {declared}")]
    NestedContainer { declared: String },

    /// Map keys must be strings.
    #[error("Map keys must be String: {declared}")]
    NonStringMapKey { declared: String },

    /// A declared type could not be parsed.
    #[error("Malformed type declaration: {declared}")]
    MalformedType { declared: String },

    /// A declaration document was structurally invalid.
    #[error("Invalid declaration: {0}")]
    Declaration(String),
}

/// Errors that abort a decode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// An exact-mapped, non-nullable scalar received a token of the wrong kind.
    #[error("Type mismatch on field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// A polymorphic payload named a type with no registered handler.
    #[error("No handler registered for type name: {type_name}")]
    UnknownType { type_name: String },

    /// The decode callback rejected an absent required field.
    #[error("Required field '{field}' of {type_id} is null: {message}")]
    UnexpectedNull {
        field: String,
        type_id: String,
        message: String,
    },

    /// The input text is not well-formed JSON.
    #[error("JSON syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The schema in use is not decodable as configured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that abort an encode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A polymorphic value's runtime type name has no registered handler.
    #[error("No handler registered for type name: {type_name}")]
    UnknownType { type_name: String },

    /// A record slot holds a value of a different kind than its field declares.
    #[error("Field '{field}' holds a value that is not {expected}")]
    ValueMismatch {
        field: String,
        expected: &'static str,
    },

    /// The schema in use is not encodable as configured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience alias for decode results.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Convenience alias for encode results.
pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Convenience alias for setup results.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

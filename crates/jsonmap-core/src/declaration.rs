//! Declaration documents: a JSON description of types, enums and interfaces
//! that [`crate::SchemaCatalog::from_declaration`] turns into schemas.
//!
//! ```json
//! {
//!   "types": [
//!     { "id": "Base", "kind": "abstract", "fields": [{ "name": "id", "type": "i64" }] },
//!     { "id": "Macaron", "parent": "Base", "typeName": "macaron",
//!       "fields": [{ "name": "flavor", "type": "Flavor", "mapping": "exact" }] }
//!   ],
//!   "enums": [
//!     { "id": "Flavor", "wire": "String", "variants": { "Pistachio": "pistachio" } }
//!   ],
//!   "interfaces": [
//!     { "id": "Dessert", "implementations": ["Macaron"] }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::types::MappingPolicy;

/// A whole declaration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub enums: Vec<EnumDecl>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
}

impl Declaration {
    /// Parse a declaration document.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|e| ConfigError::Declaration(e.to_string()))
    }
}

/// Structured type declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TypeDecl {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub kind: TypeKindDecl,
    /// Polymorphic wire name; defaults to `id`.
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKindDecl {
    #[default]
    Concrete,
    Abstract,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    /// Declared type, in the resolver's grammar.
    #[serde(rename = "type")]
    pub declared: String,
    #[serde(default)]
    pub alternates: Vec<String>,
    #[serde(default)]
    pub mapping: MappingPolicy,
    #[serde(default)]
    pub required: bool,
}

/// Enum declared as a variant-to-wire-value table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDecl {
    pub id: String,
    /// Scalar wire type, e.g. `String` or `i32`.
    pub wire: String,
    pub variants: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceDecl {
    pub id: String,
    #[serde(default)]
    pub implementations: Vec<String>,
}

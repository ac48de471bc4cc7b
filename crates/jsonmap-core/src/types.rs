//! Field type vocabulary: what a field holds, how it is contained, and how
//! strictly its scalar tokens are matched.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::enums::EnumAdapter;
use crate::schema::SchemaRef;

/// The element type of a field.
///
/// `Boxed*` variants are nullable scalars; the plain numeric and boolean
/// variants are not. `String`, `Object`, `Enum` and `Unsupported` are nullable.
#[derive(Clone)]
pub enum ParseType {
    Bool,
    BoxedBool,
    Int,
    BoxedInt,
    Long,
    BoxedLong,
    Float,
    BoxedFloat,
    Double,
    BoxedDouble,
    String,
    Object(SchemaRef),
    Enum(Arc<EnumAdapter>),
    Unsupported,
}

impl ParseType {
    /// Whether an absent value is representable for this type.
    pub fn is_nullable(&self) -> bool {
        !matches!(
            self,
            ParseType::Bool
                | ParseType::Int
                | ParseType::Long
                | ParseType::Float
                | ParseType::Double
        )
    }

    /// True for the boolean, numeric and string variants.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            ParseType::Object(_) | ParseType::Enum(_) | ParseType::Unsupported
        )
    }

    /// The nullable counterpart of a non-nullable scalar; other types are
    /// returned unchanged.
    pub fn boxed(&self) -> ParseType {
        match self {
            ParseType::Bool => ParseType::BoxedBool,
            ParseType::Int => ParseType::BoxedInt,
            ParseType::Long => ParseType::BoxedLong,
            ParseType::Float => ParseType::BoxedFloat,
            ParseType::Double => ParseType::BoxedDouble,
            other => other.clone(),
        }
    }

    /// Declared spelling, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ParseType::Bool => "bool",
            ParseType::BoxedBool => "Option<bool>",
            ParseType::Int => "i32",
            ParseType::BoxedInt => "Option<i32>",
            ParseType::Long => "i64",
            ParseType::BoxedLong => "Option<i64>",
            ParseType::Float => "f32",
            ParseType::BoxedFloat => "Option<f32>",
            ParseType::Double => "f64",
            ParseType::BoxedDouble => "Option<f64>",
            ParseType::String => "String",
            ParseType::Object(_) => "object",
            ParseType::Enum(_) => "enum",
            ParseType::Unsupported => "unsupported",
        }
    }
}

impl fmt::Debug for ParseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseType::Object(target) => write!(f, "Object({})", target.id()),
            ParseType::Enum(adapter) => write!(f, "Enum({})", adapter.name()),
            other => f.write_str(other.name()),
        }
    }
}

/// Object types compare by schema id and enums by adapter name.
impl PartialEq for ParseType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParseType::Object(a), ParseType::Object(b)) => a.id() == b.id(),
            (ParseType::Enum(a), ParseType::Enum(b)) => a.name() == b.name(),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

/// How a field contains its [`ParseType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionKind {
    /// A single value.
    #[default]
    None,
    List,
    Set,
    Queue,
    /// String-keyed map.
    Map,
}

impl CollectionKind {
    pub fn is_collection(self) -> bool {
        self != CollectionKind::None
    }

    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::None => "value",
            CollectionKind::List => "list",
            CollectionKind::Set => "set",
            CollectionKind::Queue => "queue",
            CollectionKind::Map => "map",
        }
    }
}

/// Scalar matching policy for a field.
///
/// `Exact` requires the token kind to match the target; `Coerced` converts on
/// a best-effort basis. Containers and objects ignore the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingPolicy {
    Exact,
    #[default]
    Coerced,
}

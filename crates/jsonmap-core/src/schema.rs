//! Field and type schemas.
//!
//! A [`TypeSchema`] is the immutable description of one structured type: its
//! fields in declaration order, an optional parent, and an optional
//! postprocess hook. Schemas are built once through [`TypeSchema::builder`]
//! and shared as `Arc<TypeSchema>`.
//!
//! # Key design decisions
//!
//! - **Inheritance as an explicit chain**: each schema holds its parent's
//!   `Arc`. [`TypeSchema::lineage`] walks most-derived first, which is the
//!   order used both for field lookup on decode and for field emission on
//!   encode.
//! - **Deferred references**: nested-object fields point at a [`SchemaRef`],
//!   which can be created before its target exists and bound once. This is how
//!   a type refers to itself or to a type declared later.
//! - **Override hooks**: a field can replace value extraction, transform the
//!   value before it is stored, or take over its own serialization entirely.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::codec::Codec;
use crate::error::{ConfigError, ConfigResult, DecodeResult, EncodeResult};
use crate::token::JsonParser;
use crate::types::{CollectionKind, MappingPolicy, ParseType};
use crate::value::{Record, Value};
use crate::writer::JsonWriter;

/// Replaces standard decoding of one value (one element, for collections).
pub type ExtractFn =
    Arc<dyn Fn(&mut JsonParser<'_>, &Codec) -> DecodeResult<Option<Value>> + Send + Sync>;

/// Transforms a decoded value before it is stored in the record.
pub type AssignFn = Arc<dyn Fn(Option<Value>) -> Option<Value> + Send + Sync>;

/// Replaces standard encoding of a whole field, key included.
pub type SerializeFn =
    Arc<dyn Fn(&mut JsonWriter, &FieldSchema, Option<&Value>) -> EncodeResult<()> + Send + Sync>;

/// Runs once on a fully decoded record.
pub type PostprocessFn = Arc<dyn Fn(Record) -> Record + Send + Sync>;

// ============================================================================
// FieldSchema
// ============================================================================

/// One field of a [`TypeSchema`].
#[derive(Clone)]
pub struct FieldSchema {
    name: String,
    alternates: Vec<String>,
    parse_type: ParseType,
    collection: CollectionKind,
    mapping: MappingPolicy,
    required: bool,
    declaration_order: usize,
    extract: Option<ExtractFn>,
    assign: Option<AssignFn>,
    serialize: Option<SerializeFn>,
}

impl FieldSchema {
    /// A single-valued field with coerced scalar mapping.
    pub fn new(name: impl Into<String>, parse_type: ParseType) -> Self {
        Self {
            name: name.into(),
            alternates: Vec::new(),
            parse_type,
            collection: CollectionKind::None,
            mapping: MappingPolicy::default(),
            required: false,
            declaration_order: 0,
            extract: None,
            assign: None,
            serialize: None,
        }
    }

    pub fn list(name: impl Into<String>, element: ParseType) -> Self {
        Self::new(name, element).collection(CollectionKind::List)
    }

    pub fn set(name: impl Into<String>, element: ParseType) -> Self {
        Self::new(name, element).collection(CollectionKind::Set)
    }

    pub fn queue(name: impl Into<String>, element: ParseType) -> Self {
        Self::new(name, element).collection(CollectionKind::Queue)
    }

    /// A string-keyed map field.
    pub fn map(name: impl Into<String>, value: ParseType) -> Self {
        Self::new(name, value).collection(CollectionKind::Map)
    }

    pub fn collection(mut self, kind: CollectionKind) -> Self {
        self.collection = kind;
        self
    }

    pub fn mapping(mut self, mapping: MappingPolicy) -> Self {
        self.mapping = mapping;
        self
    }

    /// Shorthand for `.mapping(MappingPolicy::Exact)`.
    pub fn exact(self) -> Self {
        self.mapping(MappingPolicy::Exact)
    }

    /// Accept `name` as an incoming key for this field. Alternates are checked
    /// after the primary name, in the order added.
    pub fn alternate(mut self, name: impl Into<String>) -> Self {
        self.alternates.push(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_extract(mut self, f: ExtractFn) -> Self {
        self.extract = Some(f);
        self
    }

    pub fn with_assign(mut self, f: AssignFn) -> Self {
        self.assign = Some(f);
        self
    }

    pub fn with_serialize(mut self, f: SerializeFn) -> Self {
        self.serialize = Some(f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternate_names(&self) -> &[String] {
        &self.alternates
    }

    pub fn parse_type(&self) -> &ParseType {
        &self.parse_type
    }

    pub fn collection_kind(&self) -> CollectionKind {
        self.collection
    }

    pub fn mapping_policy(&self) -> MappingPolicy {
        self.mapping
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Position among the owning type's own fields.
    pub fn declaration_order(&self) -> usize {
        self.declaration_order
    }

    pub fn has_custom_extract(&self) -> bool {
        self.extract.is_some()
    }

    pub fn has_custom_assign(&self) -> bool {
        self.assign.is_some()
    }

    pub fn has_custom_serialize(&self) -> bool {
        self.serialize.is_some()
    }

    pub(crate) fn extract_hook(&self) -> Option<&ExtractFn> {
        self.extract.as_ref()
    }

    pub(crate) fn assign_hook(&self) -> Option<&AssignFn> {
        self.assign.as_ref()
    }

    pub(crate) fn serialize_hook(&self) -> Option<&SerializeFn> {
        self.serialize.as_ref()
    }

    /// Whether an incoming JSON key selects this field.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.alternates.iter().any(|alt| alt == key)
    }

    /// The slot value of a freshly created record.
    pub(crate) fn default_value(&self) -> Option<Value> {
        if self.collection.is_collection() {
            return None;
        }
        match self.parse_type {
            ParseType::Bool => Some(Value::Bool(false)),
            ParseType::Int => Some(Value::Int(0)),
            ParseType::Long => Some(Value::Long(0)),
            ParseType::Float => Some(Value::Float(0.0)),
            ParseType::Double => Some(Value::Double(0.0)),
            _ => None,
        }
    }

    /// True when the field must be written even if its slot is absent.
    pub(crate) fn always_written(&self) -> bool {
        !self.collection.is_collection() && !self.parse_type.is_nullable()
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("alternates", &self.alternates)
            .field("parse_type", &self.parse_type)
            .field("collection", &self.collection)
            .field("mapping", &self.mapping)
            .field("required", &self.required)
            .field("declaration_order", &self.declaration_order)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TypeSchema
// ============================================================================

/// Whether a type can be decoded on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaKind {
    #[default]
    Concrete,
    /// Only reachable through a subtype's field matching.
    Abstract,
    /// Decoded and encoded through the polymorphic registry.
    Interface,
}

impl SchemaKind {
    pub fn name(self) -> &'static str {
        match self {
            SchemaKind::Concrete => "concrete",
            SchemaKind::Abstract => "abstract",
            SchemaKind::Interface => "interface",
        }
    }
}

/// Immutable description of one structured type.
pub struct TypeSchema {
    id: String,
    type_name: String,
    kind: SchemaKind,
    fields: Vec<FieldSchema>,
    parent: Option<Arc<TypeSchema>>,
    postprocess: Option<PostprocessFn>,
}

impl TypeSchema {
    pub fn builder(id: impl Into<String>) -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            id: id.into(),
            type_name: None,
            kind: SchemaKind::Concrete,
            fields: Vec::new(),
            parent: None,
            postprocess: None,
        }
    }

    /// Qualified identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name written in the polymorphic `[typeName, payload]` wrapper.
    /// Defaults to the id.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    pub fn is_abstract(&self) -> bool {
        self.kind == SchemaKind::Abstract
    }

    pub fn is_interface(&self) -> bool {
        self.kind == SchemaKind::Interface
    }

    /// Whether this type has its own decode entry point.
    pub fn generates_terminal_decode(&self) -> bool {
        self.kind == SchemaKind::Concrete
    }

    /// Own fields, in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn parent(&self) -> Option<&Arc<TypeSchema>> {
        self.parent.as_ref()
    }

    pub fn postprocess_hook(&self) -> Option<&PostprocessFn> {
        self.postprocess.as_ref()
    }

    /// This schema followed by each ancestor, most-derived first.
    pub fn lineage(&self) -> impl Iterator<Item = &TypeSchema> {
        std::iter::successors(Some(self), |s| s.parent.as_deref())
    }

    /// Find the field an incoming key selects, trying this type's own fields
    /// before each ancestor's.
    pub fn find_field(&self, key: &str) -> Option<&FieldSchema> {
        self.lineage()
            .find_map(|level| level.fields.iter().find(|f| f.matches(key)))
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .field("parent", &self.parent.as_ref().map(|p| p.id()))
            .field("postprocess", &self.postprocess.is_some())
            .finish()
    }
}

/// Builder for [`TypeSchema`].
pub struct TypeSchemaBuilder {
    id: String,
    type_name: Option<String>,
    kind: SchemaKind,
    fields: Vec<FieldSchema>,
    parent: Option<Arc<TypeSchema>>,
    postprocess: Option<PostprocessFn>,
}

impl TypeSchemaBuilder {
    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn parent(mut self, parent: Arc<TypeSchema>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.kind = SchemaKind::Abstract;
        self
    }

    pub fn interface(mut self) -> Self {
        self.kind = SchemaKind::Interface;
        self
    }

    pub fn kind(mut self, kind: SchemaKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    pub fn postprocess(mut self, hook: PostprocessFn) -> Self {
        self.postprocess = Some(hook);
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Fails with [`ConfigError::DuplicateField`] when two own fields accept
    /// the same JSON key. A field that reuses an ancestor's name is accepted
    /// with a warning; the most-derived declaration wins.
    pub fn build(self) -> ConfigResult<Arc<TypeSchema>> {
        let mut keys: HashSet<&str> = HashSet::new();
        for field in &self.fields {
            let names = std::iter::once(field.name.as_str())
                .chain(field.alternates.iter().map(String::as_str));
            for key in names {
                if !keys.insert(key) {
                    return Err(ConfigError::DuplicateField {
                        type_id: self.id.clone(),
                        field: key.to_string(),
                    });
                }
            }
        }

        if let Some(parent) = &self.parent {
            for field in &self.fields {
                if let Some(ancestor) = parent
                    .lineage()
                    .find(|level| level.fields.iter().any(|f| f.name == field.name))
                {
                    tracing::warn!(
                        type_id = %self.id,
                        field = %field.name,
                        ancestor = %ancestor.id,
                        "field shadows an inherited field"
                    );
                }
            }
        }

        let fields = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(order, mut field)| {
                field.declaration_order = order;
                field
            })
            .collect();

        Ok(Arc::new(TypeSchema {
            type_name: self.type_name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            kind: self.kind,
            fields,
            parent: self.parent,
            postprocess: self.postprocess,
        }))
    }
}

// ============================================================================
// SchemaRef
// ============================================================================

/// A shareable, possibly deferred reference to a [`TypeSchema`].
///
/// Clones share the same slot, so binding one binds all of them.
#[derive(Clone)]
pub struct SchemaRef {
    id: Arc<str>,
    slot: Arc<OnceLock<Arc<TypeSchema>>>,
}

impl SchemaRef {
    /// A reference that is already bound.
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        let slot = OnceLock::new();
        let id: Arc<str> = Arc::from(schema.id());
        let _ = slot.set(schema);
        Self {
            id,
            slot: Arc::new(slot),
        }
    }

    /// An unbound reference to the type `id`.
    pub fn deferred(id: impl Into<String>) -> Self {
        Self {
            id: Arc::from(id.into()),
            slot: Arc::new(OnceLock::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Bind the target. A reference can be bound only once.
    pub fn bind(&self, schema: Arc<TypeSchema>) -> ConfigResult<()> {
        self.slot
            .set(schema)
            .map_err(|_| {
                ConfigError::Declaration(format!("schema reference {} is already bound", self.id))
            })
    }

    /// The target schema, or [`ConfigError::UnboundSchema`].
    pub fn get(&self) -> ConfigResult<&Arc<TypeSchema>> {
        self.slot.get().ok_or_else(|| ConfigError::UnboundSchema {
            type_id: self.id.to_string(),
        })
    }
}

impl From<Arc<TypeSchema>> for SchemaRef {
    fn from(schema: Arc<TypeSchema>) -> Self {
        SchemaRef::new(schema)
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRef")
            .field("id", &self.id)
            .field("bound", &self.is_bound())
            .finish()
    }
}

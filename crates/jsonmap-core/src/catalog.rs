//! [`SchemaCatalog`]: named types, enums and interface implementations.
//!
//! The catalog is the named-type lookup for the resolver and the usual way to
//! build a whole family of schemas at once from a [`Declaration`].
//!
//! # Key design decisions
//!
//! - **Parent-first construction**: a type's parent is built before the type
//!   itself, following `parent` links depth-first. A link back to a type still
//!   under construction is an inheritance cycle.
//! - **Deferred references for fields**: every declared type and interface
//!   gets a [`SchemaRef`] before anything is built, so a field may name any
//!   type in the document, including its own.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::codec::Codec;
use crate::declaration::{Declaration, EnumDecl, TypeDecl, TypeKindDecl};
use crate::enums::{EnumAdapter, EnumRegistry};
use crate::error::{ConfigError, ConfigResult};
use crate::resolver;
use crate::schema::{FieldSchema, SchemaKind, SchemaRef, TypeSchema};
use crate::types::{CollectionKind, ParseType};
use crate::value::Value;

/// Name-keyed collection of built schemas and enum adapters.
#[derive(Debug, Default, Clone)]
pub struct SchemaCatalog {
    types: IndexMap<String, Arc<TypeSchema>>,
    enums: EnumRegistry,
    implementations: IndexMap<String, Vec<String>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and build a declaration document.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Self::from_declaration(&Declaration::from_json(text)?)
    }

    /// Build every enum, interface and type in `decl`.
    pub fn from_declaration(decl: &Declaration) -> ConfigResult<Self> {
        let mut enums = EnumRegistry::new();
        for e in &decl.enums {
            enums.register(enum_adapter(e)?)?;
        }

        let mut refs: HashMap<&str, SchemaRef> = HashMap::new();
        let ids = decl
            .types
            .iter()
            .map(|t| t.id.as_str())
            .chain(decl.interfaces.iter().map(|i| i.id.as_str()));
        for id in ids {
            if refs.contains_key(id) || enums.get(id).is_some() {
                return Err(ConfigError::Declaration(format!("type {id} is declared twice")));
            }
            refs.insert(id, SchemaRef::deferred(id));
        }

        let mut interfaces = Vec::with_capacity(decl.interfaces.len());
        for iface in &decl.interfaces {
            let schema = TypeSchema::builder(&iface.id).interface().build()?;
            bind(&refs, &iface.id, &schema)?;
            interfaces.push(schema);
        }

        let mut builder = CatalogBuilder {
            decls: decl.types.iter().map(|t| (t.id.as_str(), t)).collect(),
            refs: &refs,
            enums: &enums,
            built: HashMap::new(),
            visiting: HashSet::new(),
        };
        for t in &decl.types {
            builder.build(&t.id)?;
        }
        let mut built = builder.built;

        let mut catalog = SchemaCatalog {
            types: IndexMap::new(),
            enums,
            implementations: IndexMap::new(),
        };
        for t in &decl.types {
            if let Some(schema) = built.remove(t.id.as_str()) {
                catalog.insert_type(schema)?;
            }
        }
        for schema in interfaces {
            catalog.insert_type(schema)?;
        }
        for iface in &decl.interfaces {
            for implementation in &iface.implementations {
                catalog.add_implementation(&iface.id, implementation)?;
            }
        }

        tracing::debug!(
            types = catalog.types.len(),
            enums = catalog.enums.len(),
            "built schema catalog"
        );
        Ok(catalog)
    }

    /// Add a built schema under its id.
    pub fn insert_type(&mut self, schema: Arc<TypeSchema>) -> ConfigResult<()> {
        if self.types.contains_key(schema.id()) {
            return Err(ConfigError::Declaration(format!(
                "type {} is declared twice",
                schema.id()
            )));
        }
        self.types.insert(schema.id().to_string(), schema);
        Ok(())
    }

    pub fn insert_enum(&mut self, adapter: EnumAdapter) -> ConfigResult<Arc<EnumAdapter>> {
        self.enums.register(adapter)
    }

    /// Record that `implementation` is a concrete implementation of `interface`.
    pub fn add_implementation(
        &mut self,
        interface: &str,
        implementation: &str,
    ) -> ConfigResult<()> {
        match self.types.get(interface) {
            Some(schema) if schema.is_interface() => {}
            _ => {
                return Err(ConfigError::Declaration(format!(
                    "{interface} is not a declared interface"
                )))
            }
        }
        match self.types.get(implementation) {
            Some(schema) if schema.generates_terminal_decode() => {}
            Some(_) => {
                return Err(ConfigError::AbstractEntryPoint {
                    type_id: implementation.to_string(),
                })
            }
            None => {
                return Err(ConfigError::Declaration(format!(
                    "interface {interface} lists unknown implementation {implementation}"
                )))
            }
        }
        self.implementations
            .entry(interface.to_string())
            .or_default()
            .push(implementation.to_string());
        Ok(())
    }

    pub fn get_type(&self, id: &str) -> Option<&Arc<TypeSchema>> {
        self.types.get(id)
    }

    pub fn get_enum(&self, id: &str) -> Option<&Arc<EnumAdapter>> {
        self.enums.get(id)
    }

    /// All schemas, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeSchema>> {
        self.types.values()
    }

    pub fn implementations(&self, interface: &str) -> &[String] {
        self.implementations
            .get(interface)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Named-type lookup: schemas resolve to objects, adapters to enums.
    pub fn lookup(&self, name: &str) -> Option<ParseType> {
        if let Some(schema) = self.types.get(name) {
            return Some(ParseType::Object(SchemaRef::new(Arc::clone(schema))));
        }
        self.enums
            .get(name)
            .map(|adapter| ParseType::Enum(Arc::clone(adapter)))
    }

    /// Resolve a declared type against this catalog.
    pub fn resolve(&self, declared: &str) -> ConfigResult<(ParseType, CollectionKind)> {
        resolver::resolve(declared, |name| self.lookup(name))
    }

    /// Register a [`crate::SchemaHandler`] for every declared implementation.
    /// Returns the number of handlers added.
    pub fn register_handlers(&self, codec: &Codec) -> ConfigResult<usize> {
        let unique: IndexSet<&str> = self
            .implementations
            .values()
            .flatten()
            .map(String::as_str)
            .collect();
        for id in &unique {
            if let Some(schema) = self.types.get(*id) {
                codec.register_schema(schema)?;
            }
        }
        Ok(unique.len())
    }
}

struct CatalogBuilder<'a> {
    decls: HashMap<&'a str, &'a TypeDecl>,
    refs: &'a HashMap<&'a str, SchemaRef>,
    enums: &'a EnumRegistry,
    built: HashMap<String, Arc<TypeSchema>>,
    visiting: HashSet<String>,
}

impl CatalogBuilder<'_> {
    fn build(&mut self, id: &str) -> ConfigResult<Arc<TypeSchema>> {
        if let Some(schema) = self.built.get(id) {
            return Ok(Arc::clone(schema));
        }
        let Some(decl) = self.decls.get(id).copied() else {
            return Err(ConfigError::Declaration(format!("unknown type {id}")));
        };
        if !self.visiting.insert(id.to_string()) {
            return Err(ConfigError::InheritanceCycle {
                type_id: id.to_string(),
            });
        }

        let parent = match &decl.parent {
            Some(parent) if !self.decls.contains_key(parent.as_str()) => {
                return Err(ConfigError::UnknownParent {
                    type_id: decl.id.clone(),
                    parent: parent.clone(),
                })
            }
            Some(parent) => Some(self.build(parent)?),
            None => None,
        };

        let kind = match decl.kind {
            TypeKindDecl::Concrete => SchemaKind::Concrete,
            TypeKindDecl::Abstract => SchemaKind::Abstract,
        };
        let mut schema = TypeSchema::builder(&decl.id).kind(kind);
        if let Some(name) = &decl.type_name {
            schema = schema.type_name(name);
        }
        if let Some(parent) = parent {
            schema = schema.parent(parent);
        }
        for f in &decl.fields {
            let (parse_type, collection) =
                resolver::resolve(&f.declared, |name| self.lookup(name))?;
            let mut field = FieldSchema::new(&f.name, parse_type)
                .collection(collection)
                .mapping(f.mapping);
            for alt in &f.alternates {
                field = field.alternate(alt);
            }
            if f.required {
                field = field.required();
            }
            schema = schema.field(field);
        }
        let schema = schema.build()?;

        bind(self.refs, id, &schema)?;
        self.visiting.remove(id);
        self.built.insert(id.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    fn lookup(&self, name: &str) -> Option<ParseType> {
        if let Some(target) = self.refs.get(name) {
            return Some(ParseType::Object(target.clone()));
        }
        self.enums
            .get(name)
            .map(|adapter| ParseType::Enum(Arc::clone(adapter)))
    }
}

fn bind(refs: &HashMap<&str, SchemaRef>, id: &str, schema: &Arc<TypeSchema>) -> ConfigResult<()> {
    match refs.get(id) {
        Some(target) => target.bind(Arc::clone(schema)),
        None => Err(ConfigError::UnboundSchema {
            type_id: id.to_string(),
        }),
    }
}

/// Build a table-backed adapter from an enum declaration.
fn enum_adapter(decl: &EnumDecl) -> ConfigResult<EnumAdapter> {
    let (wire, collection) = resolver::resolve(&decl.wire, |_| None)?;
    if collection.is_collection() || !wire.is_scalar() {
        return Err(ConfigError::Declaration(format!(
            "enum {} must use a scalar wire type, not {}",
            decl.id, decl.wire
        )));
    }

    let mut table = Vec::with_capacity(decl.variants.len());
    for (variant, raw) in &decl.variants {
        let value = wire_value(raw, &wire).ok_or_else(|| {
            ConfigError::Declaration(format!(
                "enum {} variant {variant} has a value that is not {}",
                decl.id,
                wire.name()
            ))
        })?;
        table.push((variant.clone(), value));
    }
    Ok(EnumAdapter::from_table(&decl.id, wire, table))
}

fn wire_value(raw: &serde_json::Value, wire: &ParseType) -> Option<Value> {
    match wire {
        ParseType::Bool | ParseType::BoxedBool => raw.as_bool().map(Value::Bool),
        ParseType::Int | ParseType::BoxedInt => raw
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int),
        ParseType::Long | ParseType::BoxedLong => raw.as_i64().map(Value::Long),
        ParseType::Float | ParseType::BoxedFloat => raw.as_f64().map(|n| Value::Float(n as f32)),
        ParseType::Double | ParseType::BoxedDouble => raw.as_f64().map(Value::Double),
        ParseType::String => raw.as_str().map(Value::from),
        ParseType::Object(_) | ParseType::Enum(_) | ParseType::Unsupported => None,
    }
}

//! Runtime instances: [`Record`] and the [`Value`]s stored in its slots.
//!
//! A `Record` is the in-memory form of one structured type. It holds the
//! schema it was built for plus one slot per field of the whole inheritance
//! chain, in serialization order (own fields first, then each ancestor's).
//! An absent slot is `None`; nullable fields start absent, non-nullable
//! scalars start at their zero value.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::enums::EnumValue;
use crate::schema::TypeSchema;

/// A decoded field value.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Enum(EnumValue),
    Object(Box<Record>),
    List(Vec<Option<Value>>),
    /// Unordered; equality ignores element order.
    Set(Vec<Option<Value>>),
    Queue(VecDeque<Option<Value>>),
    Map(IndexMap<String, Option<Value>>),
}

impl Value {
    /// Short kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "i32",
            Value::Long(_) => "i64",
            Value::Float(_) => "f32",
            Value::Double(_) => "f64",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Queue(_) => "queue",
            Value::Map(_) => "map",
        }
    }

    /// Build a list from present elements.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::List(items.into_iter().map(Some).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Elements of a list, set or queue, in storage order.
    pub fn elements(&self) -> Option<Vec<&Option<Value>>> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items.iter().collect()),
            Value::Queue(items) => Some(items.iter().collect()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Option<Value>>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Structural equality. Unlike IEEE comparison, `NaN` equals `NaN`, so a
/// record holding one still compares equal to its decoded copy.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Queue(a), Value::Queue(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => same_elements(a, b),
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Multiset comparison for set contents.
fn same_elements(a: &[Option<Value>], b: &[Option<Value>]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        let hit = b
            .iter()
            .enumerate()
            .find(|(i, candidate)| !used[*i] && *candidate == item);
        match hit {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Object(Box::new(v))
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

/// An instance of a [`TypeSchema`].
#[derive(Clone)]
pub struct Record {
    schema: Arc<TypeSchema>,
    values: IndexMap<String, Option<Value>>,
}

impl Record {
    /// A zero-initialized instance: non-nullable scalars hold `false`/`0`,
    /// every other slot is absent.
    pub fn new(schema: &Arc<TypeSchema>) -> Self {
        let mut values = IndexMap::new();
        for level in schema.lineage() {
            for field in level.fields() {
                values
                    .entry(field.name().to_string())
                    .or_insert_with(|| field.default_value());
            }
        }
        Self {
            schema: Arc::clone(schema),
            values,
        }
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn type_id(&self) -> &str {
        self.schema.id()
    }

    /// The value in slot `name`, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// Store a present value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.set_value(name, Some(value.into()));
    }

    /// Store a value or clear the slot.
    pub fn set_value(&mut self, name: &str, value: Option<Value>) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove and return the value in slot `name`, leaving it absent.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.get_mut(name).and_then(Option::take)
    }

    /// All slots in serialization order.
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_long)
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_double)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(Value::as_record)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type", &self.schema.id())
            .field("values", &self.values)
            .finish()
    }
}

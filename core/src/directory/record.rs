//! Directory entries and the scalar values they hold.
//!
//! A [`Record`] is what a directory session hands back for a user or a
//! group: an identifier plus schema-qualified attributes such as
//! `user.company`. The same [`Value`] type flows through expression
//! evaluation, so a record can be bound into an expression context as is.

use std::collections::BTreeMap;
use std::fmt;

/// A value stored in a record field or produced by an expression.
///
/// `Null` stands for both an explicit null and an absent attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Emptiness as understood by the `empty` operator.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Record(record) => record.is_empty(),
            Value::Bool(_) | Value::Integer(_) | Value::Float(_) => false,
        }
    }

    /// Returns the string slice if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Record(record) => write!(f, "Record({})", record.id()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A directory entry.
///
/// Field names are schema-qualified (`schema.field`). Member access used by
/// expressions goes through [`Record::member`], which also exposes a schema
/// as a nested record so `currentUser.user.company` resolves naturally.
///
/// # Example
/// ```
/// use computed_groups_core::directory::{Record, Value};
///
/// let mut user = Record::new("jdoe");
/// user.set_property("user", "company", "acme");
///
/// assert_eq!(user.property("user", "company"), Some(&Value::from("acme")));
/// assert_eq!(user.member("user.company"), Value::from("acme"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    id: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Record {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Returns the record identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Adds a field (builder pattern).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field by its fully qualified name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Gets a field by its fully qualified name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Removes a field, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Gets `schema.field`.
    pub fn property(&self, schema: &str, field: &str) -> Option<&Value> {
        self.fields.get(&qualify(schema, field))
    }

    /// Sets `schema.field`.
    pub fn set_property(&mut self, schema: &str, field: &str, value: impl Into<Value>) {
        self.fields.insert(qualify(schema, field), value.into());
    }

    /// Iterates over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Returns true when the record holds no field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves a member name the way expressions see it.
    ///
    /// An exact field wins. Otherwise, if fields exist under `name.`, a
    /// record view holding those fields (prefix stripped) is returned.
    /// Anything else is `Null`.
    pub fn member(&self, name: &str) -> Value {
        if let Some(value) = self.fields.get(name) {
            return value.clone();
        }

        let prefix = format!("{}.", name);
        let nested: BTreeMap<String, Value> = self
            .fields
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| (key[prefix.len()..].to_string(), value.clone()))
            .collect();

        if nested.is_empty() {
            Value::Null
        } else {
            Value::Record(Record {
                id: self.id.clone(),
                fields: nested,
            })
        }
    }
}

/// Builds a schema-qualified field name.
pub fn qualify(schema: &str, field: &str) -> String {
    format!("{}.{}", schema, field)
}

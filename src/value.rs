// ./src/value.rs

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

// ════════════════════════════════════════════════════════════
// 1. Value — the in-memory side of every encode/decode
// ════════════════════════════════════════════════════════════

/// A typed application value, as handed to a formatter for writing or
/// produced by a formatter after reading.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Array(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Runtime type name used for encoder lookup and response negotiation.
    ///
    /// Arrays report `<first element type>[]`, or `array` when empty.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Bool(_) => "bool".to_owned(),
            Value::Int(_) => "int".to_owned(),
            Value::Float(_) => "float".to_owned(),
            Value::String(_) => "string".to_owned(),
            Value::DateTime(_) => "DateTime".to_owned(),
            Value::Array(items) => match items.first() {
                Some(first) => format!("{}[]", first.type_name()),
                None => "array".to_owned(),
            },
            Value::Object(object) => object.class(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// Structural equality. Objects compare equal when they are the same
/// instance or share a class and equal fields; comparing two distinct
/// cyclic graphs does not terminate.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTime(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ════════════════════════════════════════════════════════════
// 2. Object & ObjectRef — class instances with identity
// ════════════════════════════════════════════════════════════

/// A class instance: its class name plus every field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: String,
    pub fields: IndexMap<String, Value>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Wraps the object in a shared handle, giving it an identity.
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef(Arc::new(RwLock::new(self)))
    }
}

/// Shared handle to an [`Object`]. Clones point at the same instance, which
/// is what circular-reference detection keys on.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    pub fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.0.write()
    }

    pub fn class(&self) -> String {
        self.0.read().class.clone()
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.0.read().fields.get(field).cloned()
    }

    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.write().fields.insert(field.into(), value.into());
    }

    /// Address of the shared allocation; stable for the lifetime of the instance.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.read() == *other.0.read()
    }
}

impl fmt::Debug for ObjectRef {
    // Fields are not printed: a cyclic graph would recurse forever.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let object = self.0.read();
        f.debug_struct("ObjectRef")
            .field("class", &object.class)
            .field("fields", &object.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_type_name_uses_first_element() {
        assert_eq!(Value::from(vec![1, 2]).type_name(), "int[]");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
    }

    #[test]
    fn object_type_name_is_class() {
        let user = Object::new("User").with_field("id", 1).into_ref();
        assert_eq!(Value::Object(user).type_name(), "User");
    }

    #[test]
    fn clones_share_identity() {
        let a = Object::new("A").into_ref();
        let b = a.clone();
        let c = Object::new("A").into_ref();
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn distinct_instances_compare_structurally() {
        let a = Object::new("User").with_field("id", 1).into_ref();
        let b = Object::new("User").with_field("id", 1).into_ref();
        let c = Object::new("User").with_field("id", 2).into_ref();
        assert_eq!(Value::Object(a.clone()), Value::Object(b));
        assert_ne!(Value::Object(a), Value::Object(c));
    }

    #[test]
    fn debug_does_not_recurse_into_cycles() {
        let a = Object::new("A").into_ref();
        a.set("me", a.clone());
        let rendered = format!("{a:?}");
        assert!(rendered.contains("\"me\""));
    }
}

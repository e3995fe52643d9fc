// ./src/encoding/mod.rs

//! Conversion between wire values (`serde_json::Value` trees) and typed
//! [`Value`]s.
//!
//! Every top-level call goes through an [`EncoderRegistry`], which picks an
//! [`Encoder`] per type name and hands the same [`EncodingContext`] down the
//! whole recursive tree.

pub mod array;
pub mod contract;
pub mod datetime;
pub mod naming;
pub mod object;
pub mod registry;
pub mod scalar;

use crate::error::EncodingError;
use crate::value::{ObjectRef, Value};
use std::collections::HashSet;

pub use array::ArrayEncoder;
pub use contract::{AccessorContract, ClassContract, ConstructorParameter, PropertyContract, Visibility};
pub use datetime::DateTimeEncoder;
pub use naming::{CamelCasePropertyNameFormatter, PropertyNameFormatter, SnakeCasePropertyNameFormatter};
pub use object::ObjectEncoder;
pub use registry::{normalize_type, EncoderRegistry, EncoderRegistryBuilder};
pub use scalar::ScalarEncoder;

/// The wire side of an encode/decode: what a serializer reads and writes.
pub type WireValue = serde_json::Value;

/// Converts one family of types between wire and typed representations.
pub trait Encoder: Send + Sync {
    fn encode(&self, value: &Value, cx: &mut EncodingContext<'_>) -> Result<WireValue, EncodingError>;

    fn decode(
        &self,
        wire: &WireValue,
        ty: &str,
        cx: &mut EncodingContext<'_>,
    ) -> Result<Value, EncodingError>;
}

/// State for one top-level encode or decode. Not shared between calls.
pub struct EncodingContext<'r> {
    registry: &'r EncoderRegistry,
    seen: HashSet<usize>,
}

impl<'r> EncodingContext<'r> {
    pub fn new(registry: &'r EncoderRegistry) -> Self {
        Self {
            registry,
            seen: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &'r EncoderRegistry {
        self.registry
    }

    pub fn is_circular_reference(&self, object: &ObjectRef) -> bool {
        self.seen.contains(&object.identity())
    }

    pub fn add_circular_reference(&mut self, object: &ObjectRef) {
        self.seen.insert(object.identity());
    }
}

/// Short description of a wire value's shape, for error messages.
pub(crate) fn wire_kind(wire: &WireValue) -> &'static str {
    match wire {
        WireValue::Null => "null",
        WireValue::Bool(_) => "a bool",
        WireValue::Number(_) => "a number",
        WireValue::String(_) => "a string",
        WireValue::Array(_) => "an array",
        WireValue::Object(_) => "an object",
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Int(_) => "an int",
        Value::Float(_) => "a float",
        Value::String(_) => "a string",
        Value::DateTime(_) => "a date-time",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

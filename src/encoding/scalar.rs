// ./src/encoding/scalar.rs

use super::{normalize_type, value_kind, wire_kind, Encoder, EncodingContext, WireValue};
use crate::error::EncodingError;
use crate::value::Value;

/// Casts wire scalars to `bool`, `int`, `float` or `string`.
///
/// Numeric strings cast to numbers; strings that do not parse are rejected
/// rather than silently becoming zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarEncoder;

impl Encoder for ScalarEncoder {
    fn encode(&self, value: &Value, _cx: &mut EncodingContext<'_>) -> Result<WireValue, EncodingError> {
        match value {
            Value::Null => Ok(WireValue::Null),
            Value::Bool(b) => Ok(WireValue::Bool(*b)),
            Value::Int(i) => Ok(WireValue::from(*i)),
            // NaN and infinities have no JSON form
            Value::Float(f) => Ok(serde_json::Number::from_f64(*f).map_or(WireValue::Null, WireValue::Number)),
            Value::String(s) => Ok(WireValue::String(s.clone())),
            other => Err(EncodingError::NotScalar(value_kind(other))),
        }
    }

    fn decode(
        &self,
        wire: &WireValue,
        ty: &str,
        _cx: &mut EncodingContext<'_>,
    ) -> Result<Value, EncodingError> {
        if matches!(wire, WireValue::Null | WireValue::Array(_) | WireValue::Object(_)) {
            return Err(EncodingError::UnexpectedShape {
                ty: ty.to_owned(),
                expected: "a scalar",
                actual: wire_kind(wire),
            });
        }

        let invalid = || EncodingError::InvalidScalar {
            ty: ty.to_owned(),
            value: wire.to_string(),
        };

        match normalize_type(ty).as_str() {
            "bool" => match wire {
                WireValue::Bool(b) => Ok(Value::Bool(*b)),
                WireValue::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
                WireValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" => Ok(Value::Bool(true)),
                    "" | "0" | "false" => Ok(Value::Bool(false)),
                    _ => Err(invalid()),
                },
                _ => Err(invalid()),
            },
            "int" => match wire {
                WireValue::Bool(b) => Ok(Value::Int(i64::from(*b))),
                WireValue::Number(n) if n.is_u64() && !n.is_i64() => Err(invalid()),
                WireValue::Number(n) => n
                    .as_i64()
                    .or_else(|| {
                        n.as_f64()
                            .filter(|f| (i64::MIN as f64..i64::MAX as f64).contains(f))
                            .map(|f| f.trunc() as i64)
                    })
                    .map(Value::Int)
                    .ok_or_else(invalid),
                WireValue::String(s) => s.trim().parse().map(Value::Int).map_err(|_| invalid()),
                _ => Err(invalid()),
            },
            "float" => match wire {
                WireValue::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
                WireValue::Number(n) => n.as_f64().map(Value::Float).ok_or_else(invalid),
                WireValue::String(s) => s.trim().parse().map(Value::Float).map_err(|_| invalid()),
                _ => Err(invalid()),
            },
            "string" => match wire {
                WireValue::String(s) => Ok(Value::String(s.clone())),
                WireValue::Number(n) => Ok(Value::String(n.to_string())),
                WireValue::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(invalid()),
            },
            _ => Err(EncodingError::InvalidScalarType(ty.to_owned())),
        }
    }
}

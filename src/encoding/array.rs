// ./src/encoding/array.rs

use super::{value_kind, wire_kind, Encoder, EncodingContext, WireValue};
use crate::error::EncodingError;
use crate::value::Value;

/// Encodes and decodes `X[]` element-wise, resolving `X` through the registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayEncoder;

impl Encoder for ArrayEncoder {
    fn encode(&self, value: &Value, cx: &mut EncodingContext<'_>) -> Result<WireValue, EncodingError> {
        let Value::Array(items) = value else {
            return Err(EncodingError::UnexpectedShape {
                ty: value.type_name(),
                expected: "an array",
                actual: value_kind(value),
            });
        };

        let mut encoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let encoder = cx.registry().encoder_for_value(item)?;
            let wire = encoder
                .encode(item, cx)
                .map_err(|e| e.in_member("array", &index.to_string()))?;
            encoded.push(wire);
        }
        Ok(WireValue::Array(encoded))
    }

    fn decode(
        &self,
        wire: &WireValue,
        ty: &str,
        cx: &mut EncodingContext<'_>,
    ) -> Result<Value, EncodingError> {
        let element_type = ty
            .trim()
            .trim_start_matches('?')
            .strip_suffix("[]")
            .ok_or_else(|| EncodingError::NotArrayType(ty.to_owned()))?;

        let WireValue::Array(items) = wire else {
            return Err(EncodingError::UnexpectedShape {
                ty: ty.to_owned(),
                expected: "an array",
                actual: wire_kind(wire),
            });
        };

        if items.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        let encoder = cx.registry().encoder_for_type(element_type)?;
        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let value = encoder
                .decode(item, element_type, cx)
                .map_err(|e| e.in_member(ty, &index.to_string()))?;
            decoded.push(value);
        }
        Ok(Value::Array(decoded))
    }
}

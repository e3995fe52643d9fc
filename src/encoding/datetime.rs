// ./src/encoding/datetime.rs

use super::registry::DATE_TIME_TYPES;
use super::{normalize_type, value_kind, wire_kind, Encoder, EncodingContext, WireValue};
use crate::error::EncodingError;
use crate::value::Value;
use chrono::{DateTime, NaiveDateTime};

/// ISO-8601 with a numeric offset, e.g. `2024-03-01T12:30:00+00:00`.
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Formats and parses date-times with a `chrono` format string.
#[derive(Debug, Clone)]
pub struct DateTimeEncoder {
    format: String,
}

impl Default for DateTimeEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_TIME_FORMAT)
    }
}

impl DateTimeEncoder {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Encoder for DateTimeEncoder {
    fn encode(&self, value: &Value, _cx: &mut EncodingContext<'_>) -> Result<WireValue, EncodingError> {
        match value {
            Value::DateTime(dt) => Ok(WireValue::String(dt.format(&self.format).to_string())),
            other => Err(EncodingError::UnexpectedShape {
                ty: other.type_name(),
                expected: "a date-time",
                actual: value_kind(other),
            }),
        }
    }

    fn decode(
        &self,
        wire: &WireValue,
        ty: &str,
        _cx: &mut EncodingContext<'_>,
    ) -> Result<Value, EncodingError> {
        if !DATE_TIME_TYPES.contains(&normalize_type(ty).as_str()) {
            return Err(EncodingError::NotDateTimeType(ty.to_owned()));
        }
        let WireValue::String(raw) = wire else {
            return Err(EncodingError::UnexpectedShape {
                ty: ty.to_owned(),
                expected: "a date-time string",
                actual: wire_kind(wire),
            });
        };

        // Formats without an offset are read as UTC.
        DateTime::parse_from_str(raw, &self.format)
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, &self.format)
                    .map(|naive| naive.and_utc().fixed_offset())
            })
            .map(Value::DateTime)
            .map_err(|_| EncodingError::InvalidDateTime {
                value: raw.clone(),
                format: self.format.clone(),
            })
    }
}

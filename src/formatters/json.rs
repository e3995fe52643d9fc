// ./src/formatters/json.rs

use super::charset::{decode_text, encode_text, resolve_encoding};
use super::{read_all, MediaTypeFormatter};
use crate::encoding::EncoderRegistry;
use crate::error::SerializationError;
use crate::value::Value;
use std::io::{Read, Write};
use std::sync::Arc;

const MEDIA_TYPES: &[&str] = &["application/json", "text/json", "application/problem+json"];
const ENCODINGS: &[&str] = &["utf-8"];

/// JSON bodies for any type the encoder registry can handle.
#[derive(Clone)]
pub struct JsonMediaTypeFormatter {
    registry: Arc<EncoderRegistry>,
}

impl JsonMediaTypeFormatter {
    pub fn new(registry: Arc<EncoderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }
}

impl MediaTypeFormatter for JsonMediaTypeFormatter {
    fn can_read_type(&self, ty: &str) -> bool {
        self.registry.supports_type(ty)
    }

    fn can_write_type(&self, ty: &str) -> bool {
        self.registry.supports_writing(ty)
    }

    fn supported_media_types(&self) -> &[&'static str] {
        MEDIA_TYPES
    }

    fn supported_encodings(&self) -> &[&'static str] {
        ENCODINGS
    }

    fn read_from_stream(
        &self,
        input: &mut dyn Read,
        ty: &str,
        encoding: Option<&str>,
    ) -> Result<Value, SerializationError> {
        let encoding = resolve_encoding(encoding, ENCODINGS)?;
        let text = decode_text(&read_all(input)?, encoding)?;
        let wire: serde_json::Value = serde_json::from_str(&text)?;
        Ok(self.registry.decode(&wire, ty)?)
    }

    fn write_to_stream(
        &self,
        value: &Value,
        output: &mut dyn Write,
        encoding: Option<&str>,
    ) -> Result<(), SerializationError> {
        let encoding = resolve_encoding(encoding, ENCODINGS)?;
        let wire = self.registry.encode(value)?;
        let text = serde_json::to_string(&wire)?;
        output.write_all(&encode_text(&text, encoding)?)?;
        Ok(())
    }
}

// ./src/formatters/mod.rs

//! Media type formatters: the components that turn request bytes into
//! [`Value`]s and [`Value`]s into response bytes for a set of media types.

pub mod charset;
pub mod form;
pub mod json;
pub mod text;

use crate::error::SerializationError;
use crate::value::Value;
use std::io::{Read, Write};

pub use form::FormUrlEncodedMediaTypeFormatter;
pub use json::JsonMediaTypeFormatter;
pub use text::{HtmlMediaTypeFormatter, PlainTextMediaTypeFormatter};

/// Reads and writes bodies of a fixed set of media types and encodings.
///
/// Formatters are registered once and shared by every request, so they hold
/// no per-request state.
pub trait MediaTypeFormatter: Send + Sync {
    fn can_read_type(&self, ty: &str) -> bool;

    fn can_write_type(&self, ty: &str) -> bool;

    /// Concrete `type/subtype` values, most preferred first.
    fn supported_media_types(&self) -> &[&'static str];

    /// Lowercase charset names, most preferred first.
    fn supported_encodings(&self) -> &[&'static str];

    fn default_media_type(&self) -> &'static str {
        self.supported_media_types()
            .first()
            .copied()
            .unwrap_or("application/octet-stream")
    }

    fn default_encoding(&self) -> Option<&'static str> {
        self.supported_encodings().first().copied()
    }

    /// Reads a value of type `ty`. `None` reads with the default encoding.
    fn read_from_stream(
        &self,
        input: &mut dyn Read,
        ty: &str,
        encoding: Option<&str>,
    ) -> Result<Value, SerializationError>;

    fn write_to_stream(
        &self,
        value: &Value,
        output: &mut dyn Write,
        encoding: Option<&str>,
    ) -> Result<(), SerializationError>;
}

pub(crate) fn read_all(input: &mut dyn Read) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(bytes)
}

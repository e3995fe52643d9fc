// ./src/formatters/text.rs

use super::charset::{decode_text, encode_text, resolve_encoding};
use super::{read_all, MediaTypeFormatter};
use crate::encoding::normalize_type;
use crate::error::SerializationError;
use crate::value::Value;
use std::io::{Read, Write};

const TEXT_ENCODINGS: &[&str] = &["utf-8", "utf-16", "utf-16le", "utf-16be"];

fn is_string_type(ty: &str) -> bool {
    normalize_type(ty) == "string"
}

/// Defines a formatter that only reads and writes strings.
macro_rules! define_text_formatter {
    ($(#[$meta:meta])* $struct_name:ident, $media_type:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $struct_name;

        impl MediaTypeFormatter for $struct_name {
            fn can_read_type(&self, ty: &str) -> bool {
                is_string_type(ty)
            }

            fn can_write_type(&self, ty: &str) -> bool {
                is_string_type(ty)
            }

            fn supported_media_types(&self) -> &[&'static str] {
                &[$media_type]
            }

            fn supported_encodings(&self) -> &[&'static str] {
                TEXT_ENCODINGS
            }

            fn read_from_stream(
                &self,
                input: &mut dyn Read,
                ty: &str,
                encoding: Option<&str>,
            ) -> Result<Value, SerializationError> {
                if !is_string_type(ty) {
                    return Err(SerializationError::UnsupportedType(ty.to_owned()));
                }
                let encoding = resolve_encoding(encoding, TEXT_ENCODINGS)?;
                Ok(Value::String(decode_text(&read_all(input)?, encoding)?))
            }

            fn write_to_stream(
                &self,
                value: &Value,
                output: &mut dyn Write,
                encoding: Option<&str>,
            ) -> Result<(), SerializationError> {
                let Value::String(text) = value else {
                    return Err(SerializationError::UnsupportedType(value.type_name()));
                };
                let encoding = resolve_encoding(encoding, TEXT_ENCODINGS)?;
                output.write_all(&encode_text(text, encoding)?)?;
                Ok(())
            }
        }
    };
}

define_text_formatter!(
    /// `text/plain` strings.
    PlainTextMediaTypeFormatter,
    "text/plain"
);

define_text_formatter!(
    /// `text/html` strings. Markup is written as given.
    HtmlMediaTypeFormatter,
    "text/html"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    #[test]
    fn only_strings_are_supported() {
        assert!(PlainTextMediaTypeFormatter.can_read_type("string"));
        assert!(HtmlMediaTypeFormatter.can_write_type("?string"));
        assert!(!HtmlMediaTypeFormatter.can_write_type("User"));
        assert!(!PlainTextMediaTypeFormatter.can_read_type("int"));
    }

    #[test]
    fn writes_with_the_requested_encoding() {
        let mut out = Vec::new();
        PlainTextMediaTypeFormatter
            .write_to_stream(&Value::from("hi"), &mut out, Some("utf-16le"))
            .unwrap();
        assert_eq!(out, [b'h', 0, b'i', 0]);
    }

    #[test]
    fn reads_with_the_default_encoding() {
        let mut body: &[u8] = "<p>héllo</p>".as_bytes();
        let value = HtmlMediaTypeFormatter
            .read_from_stream(&mut body, "string", None)
            .unwrap();
        assert_eq!(value, Value::from("<p>héllo</p>"));
    }

    #[test]
    fn non_strings_are_rejected_on_write() {
        let mut out = Vec::new();
        let user = Value::Object(Object::new("User").into_ref());
        assert!(matches!(
            HtmlMediaTypeFormatter.write_to_stream(&user, &mut out, None),
            Err(SerializationError::UnsupportedType(ty)) if ty == "User"
        ));
    }

    #[test]
    fn defaults() {
        assert_eq!(HtmlMediaTypeFormatter.default_media_type(), "text/html");
        assert_eq!(PlainTextMediaTypeFormatter.default_media_type(), "text/plain");
        assert_eq!(PlainTextMediaTypeFormatter.default_encoding(), Some("utf-8"));
    }
}

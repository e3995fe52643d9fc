// ./src/formatters/form.rs

use super::charset::{decode_text, encode_text, resolve_encoding};
use super::{read_all, MediaTypeFormatter};
use crate::encoding::{EncoderRegistry, WireValue};
use crate::error::SerializationError;
use crate::value::Value;
use serde_json::Map;
use std::io::{Read, Write};
use std::sync::Arc;

const MEDIA_TYPES: &[&str] = &["application/x-www-form-urlencoded"];
const ENCODINGS: &[&str] = &["utf-8"];

/// `application/x-www-form-urlencoded` bodies for contracted classes.
///
/// Only flat objects are supported. Repeated `key[]` entries collect into an
/// array; every other value is a string cast by the registry on decode.
#[derive(Clone)]
pub struct FormUrlEncodedMediaTypeFormatter {
    registry: Arc<EncoderRegistry>,
}

impl FormUrlEncodedMediaTypeFormatter {
    pub fn new(registry: Arc<EncoderRegistry>) -> Self {
        Self { registry }
    }

    fn supports(&self, ty: &str) -> bool {
        self.registry.contract(ty).is_some()
    }
}

impl MediaTypeFormatter for FormUrlEncodedMediaTypeFormatter {
    fn can_read_type(&self, ty: &str) -> bool {
        self.supports(ty)
    }

    fn can_write_type(&self, ty: &str) -> bool {
        self.supports(ty)
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
        let wire = parse_form(&text)?;
        Ok(self.registry.decode(&wire, ty)?)
    }

    fn write_to_stream(
        &self,
        value: &Value,
        output: &mut dyn Write,
        encoding: Option<&str>,
    ) -> Result<(), SerializationError> {
        let encoding = resolve_encoding(encoding, ENCODINGS)?;
        let WireValue::Object(fields) = self.registry.encode(value)? else {
            return Err(SerializationError::UnsupportedType(value.type_name()));
        };

        let mut pairs = Vec::with_capacity(fields.len());
        for (key, field) in &fields {
            match field {
                WireValue::Array(items) => {
                    for item in items {
                        pairs.push(format!("{}[]={}", urlencoding::encode(key), form_scalar(key, item)?));
                    }
                }
                scalar => pairs.push(format!("{}={}", urlencoding::encode(key), form_scalar(key, scalar)?)),
            }
        }
        output.write_all(&encode_text(&pairs.join("&"), encoding)?)?;
        Ok(())
    }
}

fn parse_form(text: &str) -> Result<WireValue, SerializationError> {
    let mut fields = Map::new();
    for pair in text.trim().split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key)?;
        let value = WireValue::String(decode_component(value)?);

        match key.strip_suffix("[]") {
            Some(name) => {
                let entry = fields
                    .entry(name.to_owned())
                    .or_insert_with(|| WireValue::Array(Vec::new()));
                match entry {
                    WireValue::Array(items) => items.push(value),
                    _ => return Err(SerializationError::Malformed(format!("`{name}` is both a list and a value"))),
                }
            }
            None => {
                fields.insert(key, value);
            }
        }
    }
    Ok(WireValue::Object(fields))
}

fn decode_component(raw: &str) -> Result<String, SerializationError> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|_| SerializationError::Malformed(format!("`{raw}` is not valid percent-encoded UTF-8")))
}

fn form_scalar(key: &str, wire: &WireValue) -> Result<String, SerializationError> {
    let raw = match wire {
        WireValue::Null => String::new(),
        WireValue::Bool(b) => b.to_string(),
        WireValue::Number(n) => n.to_string(),
        WireValue::String(s) => s.clone(),
        WireValue::Array(_) | WireValue::Object(_) => {
            return Err(SerializationError::Malformed(format!(
                "`{key}` is nested and cannot be form encoded"
            )))
        }
    };
    Ok(urlencoding::encode(&raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{ClassContract, ConstructorParameter};
    use crate::value::Object;
    use pretty_assertions::assert_eq;

    fn formatter() -> FormUrlEncodedMediaTypeFormatter {
        let registry = EncoderRegistry::builder()
            .with_default_encoders()
            .contract(
                ClassContract::new("Signup")
                    .parameter(ConstructorParameter::new("name").typed("string"))
                    .parameter(ConstructorParameter::new("age").typed("int"))
                    .parameter(ConstructorParameter::new("tags").typed("string").variadic()),
            )
            .build();
        FormUrlEncodedMediaTypeFormatter::new(Arc::new(registry))
    }

    #[test]
    fn reads_flat_forms_with_lists() {
        let mut body: &[u8] = b"name=Ada+Lovelace&age=36&tags[]=math&tags[]=poetry%21";
        let signup = formatter().read_from_stream(&mut body, "Signup", None).unwrap();
        let signup = signup.as_object().unwrap();
        assert_eq!(signup.get("name"), Some(Value::from("Ada Lovelace")));
        assert_eq!(signup.get("age"), Some(Value::Int(36)));
        assert_eq!(signup.get("tags"), Some(Value::from(vec!["math", "poetry!"])));
    }

    #[test]
    fn writes_flat_forms() {
        let signup = Object::new("Signup")
            .with_field("name", "Ada L")
            .with_field("age", 36)
            .with_field("tags", vec!["a&b", "c"])
            .into_ref();
        let mut out = Vec::new();
        formatter()
            .write_to_stream(&Value::Object(signup), &mut out, None)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name=Ada%20L&age=36&tags[]=a%26b&tags[]=c"
        );
    }

    #[test]
    fn only_contracted_classes_are_supported() {
        let form = formatter();
        assert!(form.can_read_type("Signup"));
        assert!(!form.can_write_type("string"));
        assert!(!form.can_write_type("Signup[]"));
    }

    #[test]
    fn nested_values_cannot_be_written() {
        let signup = Object::new("Signup")
            .with_field("name", Object::new("Name").with_field("first", "Ada").into_ref())
            .into_ref();
        let mut out = Vec::new();
        assert!(matches!(
            formatter().write_to_stream(&Value::Object(signup), &mut out, None),
            Err(SerializationError::Malformed(_))
        ));
    }

    #[test]
    fn mixing_lists_and_values_is_malformed() {
        assert!(parse_form("a[]=1&a[]=2").is_ok());
        assert!(matches!(parse_form("a=1&a[]=2"), Err(SerializationError::Malformed(_))));
    }
}

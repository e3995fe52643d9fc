// ./src/encoding/object.rs

use super::contract::{ClassContract, ConstructorParameter};
use super::naming::{normalize_name, PropertyNameFormatter};
use super::{normalize_type, value_kind, wire_kind, Encoder, EncodingContext, WireValue};
use crate::error::EncodingError;
use crate::value::{Object, Value};
use std::collections::{HashMap, HashSet};

/// Encodes class instances field by field and decodes wire objects through
/// the class's registered [`ClassContract`].
///
/// Wire keys are matched to parameters and properties fuzzily: case and
/// underscores are ignored, so `first_name`, `firstName` and `FIRSTNAME` all
/// bind to the same member.
#[derive(Default)]
pub struct ObjectEncoder {
    ignored: HashSet<(String, String)>,
    property_name_formatter: Option<Box<dyn PropertyNameFormatter>>,
}

impl ObjectEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property_name_formatter<F>(mut self, formatter: F) -> Self
    where
        F: PropertyNameFormatter + 'static,
    {
        self.property_name_formatter = Some(Box::new(formatter));
        self
    }

    /// Leaves `properties` of `class` out of encoded output.
    pub fn ignore(mut self, class: &str, properties: &[&str]) -> Self {
        for property in properties {
            self.ignored.insert((class.to_owned(), (*property).to_owned()));
        }
        self
    }

    fn is_ignored(&self, class: &str, property: &str) -> bool {
        self.ignored
            .contains(&(class.to_owned(), property.to_owned()))
    }

    fn wire_name(&self, property: &str) -> String {
        match &self.property_name_formatter {
            Some(formatter) => formatter.format_property_name(property),
            None => property.to_owned(),
        }
    }
}

impl Encoder for ObjectEncoder {
    fn encode(&self, value: &Value, cx: &mut EncodingContext<'_>) -> Result<WireValue, EncodingError> {
        let Value::Object(object) = value else {
            return Err(EncodingError::UnexpectedShape {
                ty: value.type_name(),
                expected: "an object",
                actual: value_kind(value),
            });
        };

        let class = object.class();
        if cx.is_circular_reference(object) {
            return Err(EncodingError::CircularReference { class });
        }
        cx.add_circular_reference(object);

        // Snapshot the fields so no lock is held while recursing.
        let fields: Vec<(String, Value)> = object
            .read()
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let mut encoded = serde_json::Map::with_capacity(fields.len());
        for (name, field) in fields {
            if self.is_ignored(&class, &name) {
                continue;
            }
            let wire = cx
                .registry()
                .encoder_for_value(&field)
                .and_then(|encoder| encoder.encode(&field, cx))
                .map_err(|e| e.in_member(&class, &name))?;
            encoded.insert(self.wire_name(&name), wire);
        }
        Ok(WireValue::Object(encoded))
    }

    fn decode(
        &self,
        wire: &WireValue,
        ty: &str,
        cx: &mut EncodingContext<'_>,
    ) -> Result<Value, EncodingError> {
        let contract = cx
            .registry()
            .contract(ty)
            .ok_or_else(|| EncodingError::UnknownType(ty.to_owned()))?;

        let WireValue::Object(entries) = wire else {
            return Err(EncodingError::UnexpectedShape {
                ty: ty.to_owned(),
                expected: "an object",
                actual: wire_kind(wire),
            });
        };

        let by_name: HashMap<String, &WireValue> = entries
            .iter()
            .map(|(key, value)| (normalize_name(key), value))
            .collect();

        let mut object = Object::new(contract.class());
        let mut set_by_constructor = HashSet::new();

        for parameter in contract.parameters() {
            let key = normalize_name(parameter.name());
            let value = match by_name.get(&key) {
                Some(WireValue::Null) if parameter.is_nullable() => Value::Null,
                Some(WireValue::Null) | None => missing_parameter(contract, parameter)?,
                Some(wire) => {
                    let ty = parameter_type(contract, parameter, wire)?;
                    decode_member(contract, parameter.name(), wire, &ty, cx)?
                }
            };
            object.fields.insert(parameter.name().to_owned(), value);
            set_by_constructor.insert(key);
        }

        for property in contract.properties() {
            let key = normalize_name(property.name());
            if set_by_constructor.contains(&key) {
                continue;
            }
            let wired = by_name.get(&key).filter(|_| property.is_public());
            let value = match wired {
                Some(WireValue::Null) => Some(Value::Null),
                Some(wire) => {
                    let ty = match property.declared_type() {
                        Some(ty) if !is_untyped_array(ty) => ty.to_owned(),
                        _ => inferred_type(contract, property.name(), wire)?,
                    };
                    Some(decode_member(contract, property.name(), wire, &ty, cx)?)
                }
                None => property.default().cloned(),
            };
            if let Some(value) = value {
                object.fields.insert(property.name().to_owned(), value);
            }
        }

        Ok(Value::Object(object.into_ref()))
    }
}

fn decode_member(
    contract: &ClassContract,
    member: &str,
    wire: &WireValue,
    ty: &str,
    cx: &mut EncodingContext<'_>,
) -> Result<Value, EncodingError> {
    cx.registry()
        .encoder_for_type(ty)
        .and_then(|encoder| encoder.decode(wire, ty, cx))
        .map_err(|e| e.in_member(contract.class(), member))
}

fn missing_parameter(
    contract: &ClassContract,
    parameter: &ConstructorParameter,
) -> Result<Value, EncodingError> {
    if let Some(default) = parameter.default() {
        return Ok(default.clone());
    }
    if parameter.is_nullable() {
        return Ok(Value::Null);
    }
    if parameter.is_variadic() {
        return Ok(Value::Array(Vec::new()));
    }
    Err(EncodingError::MissingParameter {
        class: contract.class().to_owned(),
        parameter: parameter.name().to_owned(),
    })
}

// ════════════════════════════════════════════════════════════
// Decode type resolution
// ════════════════════════════════════════════════════════════

/// Resolves the type a constructor argument is decoded as, in order:
/// 1. the declared parameter type,
/// 2. for variadic or untyped-array parameters, `<element>[]` where the element
///    comes from the variadic type, the property, the accessor, or the wire,
/// 3. the same-named property's type,
/// 4. the same-named accessor's return type,
/// 5. the wire value's own runtime type.
fn parameter_type(
    contract: &ClassContract,
    parameter: &ConstructorParameter,
    wire: &WireValue,
) -> Result<String, EncodingError> {
    let declared = parameter.declared_type();
    let is_array = parameter.is_variadic() || declared.is_some_and(is_untyped_array);

    if !is_array {
        return match declared {
            Some(ty) => Ok(ty.to_owned()),
            None => inferred_type(contract, parameter.name(), wire),
        };
    }

    let element = declared
        .filter(|ty| parameter.is_variadic() && !is_untyped_array(ty))
        .map(str::to_owned)
        .or_else(|| property_type(contract, parameter.name()).and_then(element_type))
        .or_else(|| accessor_type(contract, parameter.name()).and_then(element_type))
        .or_else(|| first_element_type(wire))
        .ok_or_else(|| unresolvable(contract, parameter.name()))?;

    Ok(format!("{element}[]"))
}

/// Steps 3-5 of [`parameter_type`], shared with public property decoding.
fn inferred_type(
    contract: &ClassContract,
    member: &str,
    wire: &WireValue,
) -> Result<String, EncodingError> {
    property_type(contract, member)
        .filter(|ty| !is_untyped_array(ty))
        .or_else(|| accessor_type(contract, member).filter(|ty| !is_untyped_array(ty)))
        .map(str::to_owned)
        .or_else(|| runtime_type(wire))
        .ok_or_else(|| unresolvable(contract, member))
}

fn property_type<'c>(contract: &'c ClassContract, member: &str) -> Option<&'c str> {
    let key = normalize_name(member);
    contract
        .properties()
        .iter()
        .find(|property| normalize_name(property.name()) == key)
        .and_then(|property| property.declared_type())
}

fn accessor_type<'c>(contract: &'c ClassContract, member: &str) -> Option<&'c str> {
    let key = normalize_name(member);
    contract
        .accessors()
        .iter()
        .find(|accessor| {
            accessor
                .accessed_member()
                .is_some_and(|accessed| normalize_name(accessed) == key)
        })
        .and_then(|accessor| accessor.return_type())
}

fn element_type(ty: &str) -> Option<String> {
    ty.trim()
        .trim_start_matches('?')
        .strip_suffix("[]")
        .map(str::to_owned)
}

/// The wire value's own type; objects cannot be inferred.
fn runtime_type(wire: &WireValue) -> Option<String> {
    match wire {
        WireValue::Bool(_) => Some("bool".to_owned()),
        WireValue::Number(n) if n.is_i64() || n.is_u64() => Some("int".to_owned()),
        WireValue::Number(_) => Some("float".to_owned()),
        WireValue::String(_) => Some("string".to_owned()),
        WireValue::Array(_) => first_element_type(wire).map(|element| format!("{element}[]")),
        WireValue::Null | WireValue::Object(_) => None,
    }
}

fn first_element_type(wire: &WireValue) -> Option<String> {
    match wire {
        // Empty arrays decode without consulting the element type.
        WireValue::Array(items) if items.is_empty() => Some("mixed".to_owned()),
        WireValue::Array(items) => runtime_type(&items[0]),
        _ => None,
    }
}

fn is_untyped_array(ty: &str) -> bool {
    normalize_type(ty) == "array" && !ty.trim().ends_with("[]")
}

fn unresolvable(contract: &ClassContract, member: &str) -> EncodingError {
    EncodingError::UnresolvableType {
        class: contract.class().to_owned(),
        member: member.to_owned(),
    }
}

// ./src/encoding/contract.rs

//! Class descriptions the object encoder decodes against.
//!
//! A contract stands in for runtime reflection: it lists the constructor
//! parameters (each promoted to a same-named field), the properties and the
//! `get*`/`is*`/`has*` accessors whose return types help infer decode types.
//!
//! ```
//! use conneg::encoding::{ClassContract, ConstructorParameter, PropertyContract};
//!
//! let user = ClassContract::new("User")
//!     .parameter(ConstructorParameter::new("id").typed("int"))
//!     .parameter(ConstructorParameter::new("nickname").typed("string").nullable())
//!     .property(PropertyContract::public("tags").typed("string[]"));
//! assert_eq!(user.parameters().len(), 2);
//! ```

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorParameter {
    name: String,
    declared_type: Option<String>,
    variadic: bool,
    nullable: bool,
    default: Option<Value>,
}

impl ConstructorParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            variadic: false,
            nullable: false,
            default: None,
        }
    }

    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.declared_type = Some(ty.into());
        self
    }

    /// Collects every remaining argument; the declared type is the element type.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyContract {
    name: String,
    declared_type: Option<String>,
    visibility: Visibility,
    default: Option<Value>,
}

impl PropertyContract {
    pub fn public(name: impl Into<String>) -> Self {
        Self::with_visibility(name, Visibility::Public)
    }

    pub fn private(name: impl Into<String>) -> Self {
        Self::with_visibility(name, Visibility::Private)
    }

    fn with_visibility(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            visibility,
            default: None,
        }
    }

    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.declared_type = Some(ty.into());
        self
    }

    /// Initial value when neither the constructor nor the wire sets the property.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// A `getX`, `isX` or `hasX` accessor and its declared return type.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorContract {
    name: String,
    return_type: Option<String>,
}

impl AccessorContract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: None,
        }
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> Option<&str> {
        self.return_type.as_deref()
    }

    /// The member this accessor exposes: `getEmail` -> `Email`. `None` for other methods.
    pub fn accessed_member(&self) -> Option<&str> {
        ["get", "is", "has"].iter().find_map(|prefix| {
            let name = self.name.as_str();
            let head = name.get(..prefix.len())?;
            let rest = &name[prefix.len()..];
            (head.eq_ignore_ascii_case(prefix) && !rest.is_empty()).then_some(rest)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassContract {
    class: String,
    parameters: Vec<ConstructorParameter>,
    properties: Vec<PropertyContract>,
    accessors: Vec<AccessorContract>,
}

impl ClassContract {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            parameters: Vec::new(),
            properties: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// A class whose constructor promotes each `(name, type)` to a private property.
    pub fn promoted(class: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        fields.iter().fold(Self::new(class), |contract, (name, ty)| {
            contract
                .parameter(ConstructorParameter::new(*name).typed(*ty))
                .property(PropertyContract::private(*name).typed(*ty))
        })
    }

    pub fn parameter(mut self, parameter: ConstructorParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn property(mut self, property: PropertyContract) -> Self {
        self.properties.push(property);
        self
    }

    pub fn accessor(mut self, accessor: AccessorContract) -> Self {
        self.accessors.push(accessor);
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn parameters(&self) -> &[ConstructorParameter] {
        &self.parameters
    }

    pub fn properties(&self) -> &[PropertyContract] {
        &self.properties
    }

    pub fn accessors(&self) -> &[AccessorContract] {
        &self.accessors
    }
}

// ./src/encoding/naming.rs

use heck::{ToLowerCamelCase, ToSnakeCase};

/// Rewrites property names on their way to the wire.
pub trait PropertyNameFormatter: Send + Sync {
    fn format_property_name(&self, name: &str) -> String;
}

/// `first_name` -> `firstName`
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCasePropertyNameFormatter;

impl PropertyNameFormatter for CamelCasePropertyNameFormatter {
    fn format_property_name(&self, name: &str) -> String {
        name.to_lower_camel_case()
    }
}

/// `firstName` -> `first_name`
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCasePropertyNameFormatter;

impl PropertyNameFormatter for SnakeCasePropertyNameFormatter {
    fn format_property_name(&self, name: &str) -> String {
        name.to_snake_case()
    }
}

/// Key used for fuzzy name matching: lowercase with underscores removed.
pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

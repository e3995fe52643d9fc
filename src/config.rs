// ./src/config.rs

use crate::encoding::registry::DATE_TIME_TYPES;
use crate::encoding::{
    CamelCasePropertyNameFormatter, ClassContract, DateTimeEncoder, EncoderRegistry,
    EncoderRegistryBuilder, ObjectEncoder, SnakeCasePropertyNameFormatter,
};
use crate::encoding::datetime::DEFAULT_DATE_TIME_FORMAT;
use crate::negotiation::ContentNegotiator;
use crate::response::NegotiatedResponseFactory;
use axum::extract::FromRef;
use serde::Deserialize;
use std::sync::Arc;

/// How encoded property names are rewritten on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyNaming {
    /// Field names are written as they are.
    #[default]
    None,
    CamelCase,
    SnakeCase,
}

/// Bootstrap settings. Every field has a default, so `{}` is a valid config.
///
/// ```
/// let config: conneg::NegotiationConfig =
///     serde_json::from_str(r#"{"supported_languages": ["en-US", "fr"], "property_naming": "camel_case"}"#).unwrap();
/// assert_eq!(config.supported_languages, ["en-US", "fr"]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    pub supported_languages: Vec<String>,
    pub date_time_format: String,
    pub property_naming: PropertyNaming,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            supported_languages: vec!["en".to_owned()],
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_owned(),
            property_naming: PropertyNaming::None,
        }
    }
}

impl NegotiationConfig {
    pub fn supported_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = format.into();
        self
    }

    pub fn property_naming(mut self, naming: PropertyNaming) -> Self {
        self.property_naming = naming;
        self
    }

    /// A registry builder with the default encoders, this config's date-time
    /// format and property naming already applied.
    pub fn registry_builder(&self) -> EncoderRegistryBuilder {
        let object_encoder = match self.property_naming {
            PropertyNaming::None => ObjectEncoder::new(),
            PropertyNaming::CamelCase => {
                ObjectEncoder::new().with_property_name_formatter(CamelCasePropertyNameFormatter)
            }
            PropertyNaming::SnakeCase => {
                ObjectEncoder::new().with_property_name_formatter(SnakeCasePropertyNameFormatter)
            }
        };
        EncoderRegistry::builder()
            .with_default_encoders()
            .encoder(&DATE_TIME_TYPES, DateTimeEncoder::new(self.date_time_format.clone()))
            .object_encoder(object_encoder)
    }

    /// Wires registry, negotiator (default formatters) and response factory.
    pub fn build(&self, contracts: impl IntoIterator<Item = ClassContract>) -> Negotiation {
        let registry = contracts
            .into_iter()
            .fold(self.registry_builder(), EncoderRegistryBuilder::contract)
            .build();
        Negotiation::new(Arc::new(registry), &self.supported_languages)
    }
}

/// The shared, read-only negotiation stack. Usable directly as Axum state.
#[derive(Clone)]
pub struct Negotiation {
    pub registry: Arc<EncoderRegistry>,
    pub negotiator: Arc<ContentNegotiator>,
    pub factory: Arc<NegotiatedResponseFactory>,
}

impl Negotiation {
    pub fn new(registry: Arc<EncoderRegistry>, supported_languages: &[String]) -> Self {
        let negotiator = Arc::new(
            ContentNegotiator::builder()
                .formatters(ContentNegotiator::default_formatters(Arc::clone(&registry)))
                .supported_languages(supported_languages.iter().cloned())
                .build(),
        );
        let factory = Arc::new(NegotiatedResponseFactory::new(Arc::clone(&negotiator)));
        Self {
            registry,
            negotiator,
            factory,
        }
    }
}

impl FromRef<Negotiation> for Arc<NegotiatedResponseFactory> {
    fn from_ref(negotiation: &Negotiation) -> Self {
        Arc::clone(&negotiation.factory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Object, Value};
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_config_uses_defaults() {
        let config: NegotiationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, NegotiationConfig::default());
        assert_eq!(config.supported_languages, ["en"]);
        assert_eq!(config.date_time_format, "%Y-%m-%dT%H:%M:%S%:z");
        assert_eq!(config.property_naming, PropertyNaming::None);
    }

    #[test]
    fn unknown_naming_is_rejected() {
        assert!(serde_json::from_str::<NegotiationConfig>(r#"{"property_naming": "kebab"}"#).is_err());
    }

    #[test]
    fn build_applies_naming_and_date_format() {
        let negotiation = NegotiationConfig::default()
            .property_naming(PropertyNaming::CamelCase)
            .date_time_format("%Y-%m-%d")
            .build([ClassContract::promoted("Post", &[("published_at", "DateTime")])]);

        let published = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 4, 0, 0, 0)
            .unwrap();
        let post = Object::new("Post").with_field("published_at", published).into_ref();
        assert_eq!(
            negotiation.registry.encode(&Value::Object(post)).unwrap(),
            json!({"publishedAt": "2024-05-04"})
        );
        assert!(negotiation.registry.supports_type("Post"));
    }

    #[test]
    fn languages_reach_the_negotiator() {
        let negotiation = NegotiationConfig::default()
            .supported_languages(["de", "en"])
            .build([]);
        assert_eq!(negotiation.negotiator.supported_languages(), ["de", "en"]);
        assert_eq!(negotiation.negotiator.formatters().len(), 4);
    }
}

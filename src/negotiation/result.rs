// ./src/negotiation/result.rs

use crate::formatters::MediaTypeFormatter;
use std::fmt;
use std::sync::Arc;

/// Outcome of one request or response negotiation.
///
/// A missing formatter or encoding means negotiation failed; the caller turns
/// that into a 415 (request) or 406 (response).
#[derive(Clone, Default)]
pub struct ContentNegotiationResult {
    formatter: Option<Arc<dyn MediaTypeFormatter>>,
    media_type: Option<String>,
    encoding: Option<String>,
    language: Option<String>,
}

impl ContentNegotiationResult {
    pub fn new(
        formatter: Option<Arc<dyn MediaTypeFormatter>>,
        media_type: Option<String>,
        encoding: Option<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            formatter,
            media_type,
            encoding,
            language,
        }
    }

    /// Nothing negotiated, optionally with a language.
    pub fn unmatched(language: Option<String>) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn formatter(&self) -> Option<&Arc<dyn MediaTypeFormatter>> {
        self.formatter.as_ref()
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Both a formatter and an encoding were found.
    pub fn is_negotiated(&self) -> bool {
        self.formatter.is_some() && self.encoding.is_some()
    }
}

impl fmt::Debug for ContentNegotiationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentNegotiationResult")
            .field(
                "formatter",
                &self.formatter.as_ref().map(|formatter| formatter.default_media_type()),
            )
            .field("media_type", &self.media_type)
            .field("encoding", &self.encoding)
            .field("language", &self.language)
            .finish()
    }
}

// ./src/negotiation/negotiator.rs

use super::encoding_matcher::EncodingMatcher;
use super::language_matcher::LanguageMatcher;
use super::media_type_matcher::MediaTypeFormatterMatcher;
use super::parser;
use super::result::ContentNegotiationResult;
use crate::encoding::EncoderRegistry;
use crate::error::{HeaderError, HttpError};
use crate::formatters::{
    FormUrlEncodedMediaTypeFormatter, HtmlMediaTypeFormatter, JsonMediaTypeFormatter,
    MediaTypeFormatter, PlainTextMediaTypeFormatter,
};
use crate::value::Value;
use axum::http::HeaderMap;
use indexmap::IndexSet;
use std::sync::Arc;

/// Chooses formatter, media type, encoding and language for request and
/// response bodies.
///
/// Formatter registration order matters: it breaks every tie the headers
/// leave open, and with no `Accept` header the first capable formatter wins.
#[derive(Clone)]
pub struct ContentNegotiator {
    formatters: Vec<Arc<dyn MediaTypeFormatter>>,
    media_type_matcher: MediaTypeFormatterMatcher,
    encoding_matcher: EncodingMatcher,
    language_matcher: LanguageMatcher,
}

impl ContentNegotiator {
    pub fn builder() -> ContentNegotiatorBuilder {
        ContentNegotiatorBuilder::default()
    }

    pub fn new<I, S>(formatters: Vec<Arc<dyn MediaTypeFormatter>>, supported_languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formatters,
            media_type_matcher: MediaTypeFormatterMatcher::new(),
            encoding_matcher: EncodingMatcher::new(),
            language_matcher: LanguageMatcher::new(supported_languages),
        }
    }

    /// JSON, form, HTML and plain text, in that order.
    pub fn default_formatters(registry: Arc<EncoderRegistry>) -> Vec<Arc<dyn MediaTypeFormatter>> {
        vec![
            Arc::new(JsonMediaTypeFormatter::new(Arc::clone(&registry))),
            Arc::new(FormUrlEncodedMediaTypeFormatter::new(registry)),
            Arc::new(HtmlMediaTypeFormatter),
            Arc::new(PlainTextMediaTypeFormatter),
        ]
    }

    pub fn formatters(&self) -> &[Arc<dyn MediaTypeFormatter>] {
        &self.formatters
    }

    pub fn supported_languages(&self) -> &[String] {
        self.language_matcher.supported_languages()
    }

    // ════════════════════════════════════════════════════════════
    // 1. Request bodies
    // ════════════════════════════════════════════════════════════

    /// Negotiates how to read a request body of type `ty`.
    ///
    /// Without a `Content-Type` the body is opaque and nothing is negotiated.
    /// `Content-Language` is passed through as sent.
    pub fn negotiate_request_content(
        &self,
        ty: &str,
        headers: &HeaderMap,
    ) -> Result<ContentNegotiationResult, HeaderError> {
        let Some(content_type) = parser::parse_content_type(headers)? else {
            return Ok(ContentNegotiationResult::default());
        };
        let language = parser::parse_content_language(headers)?;

        let Some(found) = self
            .media_type_matcher
            .best_request_match(ty, &self.formatters, &content_type)
        else {
            tracing::debug!(ty, content_type = %content_type, "no formatter can read request body");
            return Ok(ContentNegotiationResult::unmatched(language));
        };

        let encoding = self
            .encoding_matcher
            .best_encoding(found.formatter().as_ref(), &[], Some(found.header()));

        tracing::debug!(ty, media_type = found.media_type(), ?encoding, "request content negotiated");
        Ok(ContentNegotiationResult::new(
            Some(Arc::clone(found.formatter())),
            Some(found.media_type().to_owned()),
            encoding.map(str::to_owned),
            language,
        ))
    }

    /// Negotiates the request body and reads it as `ty`.
    ///
    /// An empty body without `Content-Type` reads as [`Value::Null`].
    pub fn read_request_body_as(
        &self,
        ty: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Value, HttpError> {
        if parser::parse_content_type(headers)?.is_none() {
            return if body.is_empty() {
                Ok(Value::Null)
            } else {
                Err(HttpError::UnsupportedMediaType)
            };
        }

        let result = self.negotiate_request_content(ty, headers)?;
        let (Some(formatter), Some(encoding)) = (result.formatter(), result.encoding()) else {
            return Err(HttpError::UnsupportedMediaType);
        };

        let mut input = body;
        formatter
            .read_from_stream(&mut input, ty, Some(encoding))
            .map_err(HttpError::UnprocessableEntity)
    }

    // ════════════════════════════════════════════════════════════
    // 2. Response bodies
    // ════════════════════════════════════════════════════════════

    /// Negotiates how to write a response body of type `ty`.
    ///
    /// Without an `Accept` header the first formatter that can write `ty` is
    /// used with its default media type; no ranking happens. The language is
    /// negotiated either way.
    pub fn negotiate_response_content(
        &self,
        ty: &str,
        headers: &HeaderMap,
    ) -> Result<ContentNegotiationResult, HeaderError> {
        let accept = parser::parse_accept(headers)?;
        let accept_charsets = parser::parse_accept_charset(headers)?;
        let language = self
            .language_matcher
            .best_language(&parser::parse_accept_language(headers)?);

        if accept.is_empty() {
            let Some(formatter) = self.formatters.iter().find(|f| f.can_write_type(ty)) else {
                tracing::debug!(ty, "no formatter can write response body");
                return Ok(ContentNegotiationResult::unmatched(language));
            };
            let encoding = self
                .encoding_matcher
                .best_encoding(formatter.as_ref(), &accept_charsets, None);

            tracing::debug!(ty, media_type = formatter.default_media_type(), ?encoding, "response content defaulted");
            return Ok(ContentNegotiationResult::new(
                Some(Arc::clone(formatter)),
                Some(formatter.default_media_type().to_owned()),
                encoding.map(str::to_owned),
                language,
            ));
        }

        let Some(found) = self
            .media_type_matcher
            .best_response_match(ty, &self.formatters, &accept)
        else {
            tracing::debug!(ty, "no acceptable formatter for response body");
            return Ok(ContentNegotiationResult::unmatched(language));
        };

        let encoding = self.encoding_matcher.best_encoding(
            found.formatter().as_ref(),
            &accept_charsets,
            Some(found.header()),
        );

        tracing::debug!(ty, media_type = found.media_type(), ?encoding, ?language, "response content negotiated");
        Ok(ContentNegotiationResult::new(
            Some(Arc::clone(found.formatter())),
            Some(found.media_type().to_owned()),
            encoding.map(str::to_owned),
            language,
        ))
    }

    /// Every media type some formatter could write `ty` as, deduplicated, in
    /// registration order.
    pub fn acceptable_response_media_types(&self, ty: &str) -> Vec<String> {
        self.formatters
            .iter()
            .filter(|formatter| formatter.can_write_type(ty))
            .flat_map(|formatter| formatter.supported_media_types().iter().copied())
            .collect::<IndexSet<&str>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

// ════════════════════════════════════════════════════════════
// 3. Builder
// ════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct ContentNegotiatorBuilder {
    formatters: Vec<Arc<dyn MediaTypeFormatter>>,
    supported_languages: Vec<String>,
}

impl ContentNegotiatorBuilder {
    /// Appends a formatter; earlier formatters win ties.
    pub fn formatter<F: MediaTypeFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    pub fn shared_formatter(mut self, formatter: Arc<dyn MediaTypeFormatter>) -> Self {
        self.formatters.push(formatter);
        self
    }

    pub fn formatters(mut self, formatters: impl IntoIterator<Item = Arc<dyn MediaTypeFormatter>>) -> Self {
        self.formatters.extend(formatters);
        self
    }

    pub fn supported_language(mut self, language: impl Into<String>) -> Self {
        self.supported_languages.push(language.into());
        self
    }

    pub fn supported_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_languages.extend(languages.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> ContentNegotiator {
        tracing::debug!(
            formatters = self.formatters.len(),
            languages = ?self.supported_languages,
            "content negotiator built"
        );
        ContentNegotiator::new(self.formatters, self.supported_languages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ClassContract;
    use axum::http::{header, HeaderValue};
    use pretty_assertions::assert_eq;

    fn registry() -> Arc<EncoderRegistry> {
        Arc::new(
            EncoderRegistry::builder()
                .with_default_encoders()
                .contract(ClassContract::promoted("User", &[("id", "int"), ("email", "string")]))
                .build(),
        )
    }

    fn negotiator() -> ContentNegotiator {
        ContentNegotiator::builder()
            .formatters(ContentNegotiator::default_formatters(registry()))
            .supported_languages(["en-US", "fr"])
            .build()
    }

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn no_accept_header_uses_the_first_capable_formatter() {
        let html_first = ContentNegotiator::builder()
            .formatter(HtmlMediaTypeFormatter)
            .formatter(JsonMediaTypeFormatter::new(registry()))
            .build();
        let result = html_first
            .negotiate_response_content("string", &HeaderMap::new())
            .unwrap();
        assert_eq!(result.media_type(), Some("text/html"));
        assert_eq!(result.encoding(), Some("utf-8"));
        assert!(result.is_negotiated());

        let result = html_first.negotiate_response_content("User", &HeaderMap::new()).unwrap();
        assert_eq!(result.media_type(), Some("application/json"));
    }

    #[test]
    fn accept_header_drives_ranked_matching() {
        let result = negotiator()
            .negotiate_response_content(
                "string",
                &headers(&[(header::ACCEPT, "text/plain;q=0.5, text/html;q=0.9")]),
            )
            .unwrap();
        assert_eq!(result.media_type(), Some("text/html"));
    }

    #[test]
    fn unmatched_response_keeps_the_language() {
        let result = negotiator()
            .negotiate_response_content(
                "User",
                &headers(&[(header::ACCEPT, "image/png"), (header::ACCEPT_LANGUAGE, "fr-CA")]),
            )
            .unwrap();
        assert!(result.formatter().is_none());
        assert!(!result.is_negotiated());
        assert_eq!(result.language(), Some("fr"));
    }

    #[test]
    fn unsupported_accept_charset_leaves_encoding_empty() {
        let result = negotiator()
            .negotiate_response_content("User", &headers(&[(header::ACCEPT_CHARSET, "latin1")]))
            .unwrap();
        assert!(result.formatter().is_some());
        assert_eq!(result.encoding(), None);
        assert!(!result.is_negotiated());
    }

    #[test]
    fn malformed_headers_are_errors_not_misses() {
        assert!(negotiator()
            .negotiate_response_content("User", &headers(&[(header::ACCEPT, "/html")]))
            .is_err());
        assert!(negotiator()
            .negotiate_request_content("User", &headers(&[(header::CONTENT_TYPE, "text")]))
            .is_err());
    }

    #[test]
    fn request_without_content_type_is_opaque() {
        let result = negotiator()
            .negotiate_request_content("User", &headers(&[(header::CONTENT_LANGUAGE, "en")]))
            .unwrap();
        assert!(result.formatter().is_none());
        assert_eq!(result.language(), None);
    }

    #[test]
    fn request_content_uses_content_type_charset_and_language() {
        let result = negotiator()
            .negotiate_request_content(
                "User",
                &headers(&[
                    (header::CONTENT_TYPE, "application/json; charset=UTF-8"),
                    (header::CONTENT_LANGUAGE, "en-GB"),
                ]),
            )
            .unwrap();
        assert_eq!(result.media_type(), Some("application/json"));
        assert_eq!(result.encoding(), Some("utf-8"));
        assert_eq!(result.language(), Some("en-GB"));
    }

    #[test]
    fn acceptable_media_types_are_deduplicated_in_registration_order() {
        let negotiator = ContentNegotiator::builder()
            .formatter(PlainTextMediaTypeFormatter)
            .formatters(ContentNegotiator::default_formatters(registry()))
            .build();
        assert_eq!(
            negotiator.acceptable_response_media_types("string"),
            ["text/plain", "application/json", "text/json", "application/problem+json", "text/html"]
        );
        assert_eq!(
            negotiator.acceptable_response_media_types("User"),
            ["application/json", "text/json", "application/problem+json", "application/x-www-form-urlencoded"]
        );
        assert_eq!(
            negotiator.acceptable_response_media_types("Unregistered"),
            ["application/json", "text/json", "application/problem+json"]
        );
    }

    #[test]
    fn reads_request_bodies() {
        let negotiator = negotiator();
        let json = headers(&[(header::CONTENT_TYPE, "application/json")]);
        let user = negotiator
            .read_request_body_as("User", &json, br#"{"id": 1, "email": "a@b.c"}"#)
            .unwrap();
        assert_eq!(user.as_object().unwrap().get("id"), Some(Value::Int(1)));

        assert_eq!(negotiator.read_request_body_as("User", &HeaderMap::new(), b"").unwrap(), Value::Null);
        assert!(matches!(
            negotiator.read_request_body_as("User", &HeaderMap::new(), b"{}"),
            Err(HttpError::UnsupportedMediaType)
        ));
        assert!(matches!(
            negotiator.read_request_body_as("User", &headers(&[(header::CONTENT_TYPE, "image/png")]), b"x"),
            Err(HttpError::UnsupportedMediaType)
        ));
        assert!(matches!(
            negotiator.read_request_body_as("User", &json, br#"{"id": 1}"#),
            Err(HttpError::UnprocessableEntity(_))
        ));
    }
}

// ./src/negotiation/media_type_matcher.rs

use super::header_values::{
    AcceptMediaTypeHeaderValue, ContentTypeHeaderValue, MediaTypeHeader, MediaTypeHeaderValue,
};
use super::ranking::rank_media_types;
use crate::formatters::MediaTypeFormatter;
use std::fmt;
use std::sync::Arc;

/// Which side of the exchange a formatter must handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Reading a request body.
    Request,
    /// Writing a response body.
    Response,
}

/// The formatter picked for a header, with the concrete media type it matched.
#[derive(Clone)]
pub struct MediaTypeFormatterMatch {
    formatter: Arc<dyn MediaTypeFormatter>,
    media_type: String,
    header: MediaTypeHeaderValue,
}

impl MediaTypeFormatterMatch {
    pub fn formatter(&self) -> &Arc<dyn MediaTypeFormatter> {
        &self.formatter
    }

    /// One of the formatter's supported media types, never a wildcard.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The header value that matched, parameters included.
    pub fn header(&self) -> &MediaTypeHeaderValue {
        &self.header
    }
}

impl fmt::Debug for MediaTypeFormatterMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTypeFormatterMatch")
            .field("media_type", &self.media_type)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// Pairs ranked media type headers with registered formatters.
///
/// The first structural match wins: headers are tried in ranked order, then
/// formatters in registration order, then each formatter's media types in
/// declaration order. When two formatters share a media type, the one
/// registered first is chosen.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaTypeFormatterMatcher;

impl MediaTypeFormatterMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn best_request_match(
        &self,
        ty: &str,
        formatters: &[Arc<dyn MediaTypeFormatter>],
        content_type: &ContentTypeHeaderValue,
    ) -> Option<MediaTypeFormatterMatch> {
        self.best_match(ty, formatters, std::slice::from_ref(content_type), Direction::Request)
    }

    pub fn best_response_match(
        &self,
        ty: &str,
        formatters: &[Arc<dyn MediaTypeFormatter>],
        accept: &[AcceptMediaTypeHeaderValue],
    ) -> Option<MediaTypeFormatterMatch> {
        self.best_match(ty, formatters, accept, Direction::Response)
    }

    pub fn best_match<H: MediaTypeHeader>(
        &self,
        ty: &str,
        formatters: &[Arc<dyn MediaTypeFormatter>],
        headers: &[H],
        direction: Direction,
    ) -> Option<MediaTypeFormatterMatch> {
        for header in rank_media_types(headers) {
            let value = header.media_type_value();
            for formatter in formatters {
                let capable = match direction {
                    Direction::Request => formatter.can_read_type(ty),
                    Direction::Response => formatter.can_write_type(ty),
                };
                if !capable {
                    continue;
                }

                if let Some(media_type) = formatter
                    .supported_media_types()
                    .iter()
                    .find(|supported| value.matches(supported))
                {
                    tracing::trace!(%value, media_type, ty, "media type matched");
                    return Some(MediaTypeFormatterMatch {
                        formatter: Arc::clone(formatter),
                        media_type: (*media_type).to_owned(),
                        header: value.clone(),
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{ClassContract, EncoderRegistry};
    use crate::formatters::{HtmlMediaTypeFormatter, JsonMediaTypeFormatter, PlainTextMediaTypeFormatter};

    fn json() -> Arc<dyn MediaTypeFormatter> {
        let registry = EncoderRegistry::builder()
            .with_default_encoders()
            .contract(ClassContract::promoted("User", &[("id", "int")]))
            .build();
        Arc::new(JsonMediaTypeFormatter::new(Arc::new(registry)))
    }

    fn accept(raw: &str) -> Vec<AcceptMediaTypeHeaderValue> {
        AcceptMediaTypeHeaderValue::parse_list(raw).unwrap()
    }

    fn matched(found: Option<MediaTypeFormatterMatch>) -> String {
        found.map(|m| m.media_type().to_owned()).unwrap_or_default()
    }

    #[test]
    fn higher_quality_wildcard_beats_lower_quality_exact_match() {
        let formatters = vec![Arc::new(PlainTextMediaTypeFormatter) as Arc<dyn MediaTypeFormatter>, json()];
        let found = MediaTypeFormatterMatcher
            .best_response_match("string", &formatters, &accept("text/*;q=0.5, application/json;q=0.3"))
            .unwrap();
        assert_eq!(found.media_type(), "text/plain");
        assert_eq!(found.header().media_type(), "text/*");
        assert_eq!(found.formatter().default_media_type(), "text/plain");
    }

    #[test]
    fn formatters_that_cannot_handle_the_type_are_skipped() {
        let formatters = vec![Arc::new(HtmlMediaTypeFormatter) as Arc<dyn MediaTypeFormatter>, json()];
        let found = MediaTypeFormatterMatcher.best_response_match("User", &formatters, &accept("*/*"));
        assert_eq!(matched(found), "application/json");
    }

    #[test]
    fn registration_order_breaks_ties_between_formatters() {
        let formatters: Vec<Arc<dyn MediaTypeFormatter>> =
            vec![Arc::new(HtmlMediaTypeFormatter), Arc::new(PlainTextMediaTypeFormatter)];
        let found = MediaTypeFormatterMatcher.best_response_match("string", &formatters, &accept("text/*"));
        assert_eq!(matched(found), "text/html");
    }

    #[test]
    fn zero_quality_headers_never_match() {
        let formatters = vec![json()];
        let found = MediaTypeFormatterMatcher
            .best_response_match("User", &formatters, &accept("application/json;q=0"));
        assert!(found.is_none());
    }

    #[test]
    fn subtype_wildcards_stay_within_their_type() {
        let formatters = vec![json()];
        assert!(MediaTypeFormatterMatcher
            .best_response_match("User", &formatters, &accept("text/*"))
            .is_some());
        assert!(MediaTypeFormatterMatcher
            .best_response_match("User", &formatters, &accept("image/*"))
            .is_none());
    }

    #[test]
    fn request_matching_uses_read_capability() {
        let formatters = vec![json()];
        let content_type = ContentTypeHeaderValue::parse("application/json; charset=utf-8").unwrap();
        let found = MediaTypeFormatterMatcher
            .best_request_match("User", &formatters, &content_type)
            .unwrap();
        assert_eq!(found.media_type(), "application/json");
        assert_eq!(found.header().charset(), Some("utf-8"));

        assert!(MediaTypeFormatterMatcher
            .best_request_match("Unregistered", &formatters, &content_type)
            .is_none());
    }
}

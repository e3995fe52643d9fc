// ./src/negotiation/encoding_matcher.rs

use super::header_values::{AcceptCharsetHeaderValue, MediaTypeHeaderValue};
use super::ranking::rank;
use crate::formatters::MediaTypeFormatter;

/// Picks the character encoding a formatter should use.
///
/// Order of preference:
/// 1. the `charset` parameter of the matched media type header, when supported;
/// 2. ranked `Accept-Charset` values, `*` meaning the formatter's first encoding;
/// 3. the formatter's default encoding, but only when the client named no
///    charset at all.
///
/// `None` means the client asked only for encodings the formatter lacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingMatcher;

impl EncodingMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn best_encoding(
        &self,
        formatter: &dyn MediaTypeFormatter,
        accept_charsets: &[AcceptCharsetHeaderValue],
        media_type: Option<&MediaTypeHeaderValue>,
    ) -> Option<&'static str> {
        let supported = formatter.supported_encodings();
        let charset = media_type.and_then(MediaTypeHeaderValue::charset);

        if let Some(found) = charset.and_then(|charset| find_supported(supported, charset)) {
            return Some(found);
        }

        for header in rank(accept_charsets) {
            if header.is_wildcard() {
                return supported.first().copied();
            }
            if let Some(found) = find_supported(supported, header.charset()) {
                return Some(found);
            }
        }

        if charset.is_none() && accept_charsets.is_empty() {
            return formatter.default_encoding();
        }

        tracing::trace!(?charset, "no supported encoding");
        None
    }
}

fn find_supported(supported: &[&'static str], requested: &str) -> Option<&'static str> {
    supported
        .iter()
        .copied()
        .find(|encoding| encoding.eq_ignore_ascii_case(requested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::{HtmlMediaTypeFormatter, PlainTextMediaTypeFormatter};
    use rstest::rstest;

    fn charsets(raw: &str) -> Vec<AcceptCharsetHeaderValue> {
        AcceptCharsetHeaderValue::parse_list(raw).unwrap()
    }

    #[test]
    fn matching_is_case_insensitive_and_returns_the_supported_spelling() {
        let found = EncodingMatcher.best_encoding(&HtmlMediaTypeFormatter, &charsets("UTF-8"), None);
        assert_eq!(found, Some("utf-8"));
    }

    #[test]
    fn media_type_charset_wins_over_accept_charset() {
        let accept = MediaTypeHeaderValue::parse("text/html; charset=UTF-16LE").unwrap();
        let found = EncodingMatcher.best_encoding(&HtmlMediaTypeFormatter, &charsets("utf-8"), Some(&accept));
        assert_eq!(found, Some("utf-16le"));
    }

    #[test]
    fn unsupported_media_type_charset_falls_back_to_accept_charset() {
        let accept = MediaTypeHeaderValue::parse("text/html; charset=latin1").unwrap();
        let found = EncodingMatcher.best_encoding(&HtmlMediaTypeFormatter, &charsets("utf-16"), Some(&accept));
        assert_eq!(found, Some("utf-16"));
    }

    #[rstest]
    #[case("*", Some("utf-8"))]
    #[case("latin1, *;q=0.1", Some("utf-8"))]
    #[case("latin1;q=0.9, utf-16be;q=0.8", Some("utf-16be"))]
    #[case("utf-8;q=0, utf-16", Some("utf-16"))]
    #[case("utf-8;q=0", None)]
    #[case("latin1", None)]
    fn ranked_accept_charset(#[case] header: &str, #[case] expected: Option<&str>) {
        let found = EncodingMatcher.best_encoding(&PlainTextMediaTypeFormatter, &charsets(header), None);
        assert_eq!(found, expected);
    }

    #[test]
    fn unconstrained_clients_get_the_default_encoding() {
        assert_eq!(EncodingMatcher.best_encoding(&PlainTextMediaTypeFormatter, &[], None), Some("utf-8"));

        let bare = MediaTypeHeaderValue::parse("text/plain").unwrap();
        assert_eq!(
            EncodingMatcher.best_encoding(&PlainTextMediaTypeFormatter, &[], Some(&bare)),
            Some("utf-8")
        );
    }

    #[test]
    fn unsupported_charset_parameter_alone_is_a_miss() {
        let content_type = MediaTypeHeaderValue::parse("text/plain; charset=latin1").unwrap();
        assert_eq!(
            EncodingMatcher.best_encoding(&PlainTextMediaTypeFormatter, &[], Some(&content_type)),
            None
        );
    }
}

// ./src/negotiation/parser.rs

//! Reads negotiation headers out of a request's `HeaderMap`.
//!
//! Absent headers yield empty lists (or `None`); only malformed values are
//! errors. Repeated header lines are joined with `,` before parsing, which is
//! equivalent to a single comma-separated line.

use super::header_values::{
    AcceptCharsetHeaderValue, AcceptLanguageHeaderValue, AcceptMediaTypeHeaderValue,
    ContentTypeHeaderValue,
};
use crate::error::HeaderError;
use axum::http::{header, HeaderMap, HeaderName};

pub fn parse_accept(headers: &HeaderMap) -> Result<Vec<AcceptMediaTypeHeaderValue>, HeaderError> {
    match joined(headers, &header::ACCEPT, "accept")? {
        Some(raw) => AcceptMediaTypeHeaderValue::parse_list(&raw),
        None => Ok(Vec::new()),
    }
}

pub fn parse_accept_charset(headers: &HeaderMap) -> Result<Vec<AcceptCharsetHeaderValue>, HeaderError> {
    match joined(headers, &header::ACCEPT_CHARSET, "accept-charset")? {
        Some(raw) => AcceptCharsetHeaderValue::parse_list(&raw),
        None => Ok(Vec::new()),
    }
}

pub fn parse_accept_language(headers: &HeaderMap) -> Result<Vec<AcceptLanguageHeaderValue>, HeaderError> {
    match joined(headers, &header::ACCEPT_LANGUAGE, "accept-language")? {
        Some(raw) => AcceptLanguageHeaderValue::parse_list(&raw),
        None => Ok(Vec::new()),
    }
}

/// The request's `Content-Type`; an empty header counts as absent.
pub fn parse_content_type(headers: &HeaderMap) -> Result<Option<ContentTypeHeaderValue>, HeaderError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| HeaderError::NotAscii("content-type"))?
        .trim();
    if raw.is_empty() {
        return Ok(None);
    }
    ContentTypeHeaderValue::parse(raw).map(Some)
}

/// `Content-Language`, verbatim.
pub fn parse_content_language(headers: &HeaderMap) -> Result<Option<String>, HeaderError> {
    joined(headers, &header::CONTENT_LANGUAGE, "content-language")
}

fn joined(
    headers: &HeaderMap,
    name: &HeaderName,
    label: &'static str,
) -> Result<Option<String>, HeaderError> {
    let mut lines = Vec::new();
    for value in headers.get_all(name) {
        let line = value.to_str().map_err(|_| HeaderError::NotAscii(label))?.trim();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    Ok((!lines.is_empty()).then(|| lines.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    fn headers(pairs: &[(HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn missing_headers_are_empty() {
        let empty = HeaderMap::new();
        assert!(parse_accept(&empty).unwrap().is_empty());
        assert!(parse_accept_charset(&empty).unwrap().is_empty());
        assert!(parse_accept_language(&empty).unwrap().is_empty());
        assert_eq!(parse_content_type(&empty).unwrap(), None);
        assert_eq!(parse_content_language(&empty).unwrap(), None);
    }

    #[test]
    fn repeated_lines_are_concatenated_in_order() {
        let map = headers(&[
            (header::ACCEPT, "text/html"),
            (header::ACCEPT, "application/json;q=0.5"),
        ]);
        let accept = parse_accept(&map).unwrap();
        assert_eq!(accept.len(), 2);
        assert_eq!(accept[0].media_type(), "text/html");
        assert_eq!(accept[1].media_type(), "application/json");
    }

    #[test]
    fn content_type_keeps_its_charset() {
        let map = headers(&[(header::CONTENT_TYPE, "application/json; charset=UTF-8")]);
        let content_type = parse_content_type(&map).unwrap().unwrap();
        assert_eq!(content_type.media_type(), "application/json");
        assert_eq!(content_type.charset(), Some("UTF-8"));
    }

    #[test]
    fn malformed_values_are_errors() {
        let map = headers(&[(header::CONTENT_TYPE, "text/")]);
        assert!(matches!(parse_content_type(&map), Err(HeaderError::InvalidMediaType(_))));

        let map = headers(&[(header::ACCEPT, "text")]);
        assert!(parse_accept(&map).is_err());

        let map = headers(&[(header::ACCEPT_LANGUAGE, "en;q=2")]);
        assert!(matches!(parse_accept_language(&map), Err(HeaderError::InvalidQuality(_))));
    }

    #[test]
    fn non_ascii_values_are_errors() {
        let mut map = HeaderMap::new();
        map.insert(header::ACCEPT, HeaderValue::from_bytes(b"text/h\xe9ml").unwrap());
        assert_eq!(parse_accept(&map).unwrap_err(), HeaderError::NotAscii("accept"));
    }

    #[test]
    fn content_language_is_verbatim() {
        let map = headers(&[(header::CONTENT_LANGUAGE, "en-GB")]);
        assert_eq!(parse_content_language(&map).unwrap().as_deref(), Some("en-GB"));
    }
}

// ./src/headers.rs

//! Typed `headers::Header` wrappers for the negotiation headers, usable with
//! `HeaderMapExt::typed_get`/`typed_insert`.

use crate::negotiation::{
    AcceptCharsetHeaderValue, AcceptLanguageHeaderValue, AcceptMediaTypeHeaderValue,
};
use headers::{Error, Header, HeaderName, HeaderValue};
use std::iter;

/// Defines a comma-separated, quality-scored list header.
macro_rules! define_list_header {
    ($struct_name:ident, $header_name:expr, $entry:ty) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $struct_name(pub Vec<$entry>);

        impl $struct_name {
            pub const NAME: &'static str = $header_name;
        }

        impl Header for $struct_name {
            fn name() -> &'static HeaderName {
                static NAME: HeaderName = HeaderName::from_static($header_name);
                &NAME
            }

            fn decode<'i, I>(values: &mut I) -> Result<Self, Error>
            where
                I: Iterator<Item = &'i HeaderValue>,
            {
                let mut entries = Vec::new();
                for value in values {
                    let s = value.to_str().map_err(|_| Error::invalid())?;
                    entries.extend(<$entry>::parse_list(s).map_err(|_| Error::invalid())?);
                }
                Ok($struct_name(entries))
            }

            fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
                let joined = self
                    .0
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(value) = HeaderValue::from_str(&joined) {
                    values.extend(iter::once(value));
                }
            }
        }
    };
}

/// Macro to define a string-valued header passed through verbatim.
macro_rules! define_string_header {
    ($struct_name:ident, $header_name:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $struct_name(pub String);

        impl $struct_name {
            pub const NAME: &'static str = $header_name;
        }

        impl Header for $struct_name {
            fn name() -> &'static HeaderName {
                static NAME: HeaderName = HeaderName::from_static($header_name);
                &NAME
            }

            fn decode<'i, I>(values: &mut I) -> Result<Self, Error>
            where
                I: Iterator<Item = &'i HeaderValue>,
            {
                let value = values.next().ok_or_else(Error::invalid)?;
                let s = value.to_str().map_err(|_| Error::invalid())?;
                Ok($struct_name(s.trim().to_string()))
            }

            fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
                if let Ok(value) = HeaderValue::from_str(&self.0) {
                    values.extend(iter::once(value));
                }
            }
        }
    };
}

define_list_header!(Accept, "accept", AcceptMediaTypeHeaderValue);
define_list_header!(AcceptCharset, "accept-charset", AcceptCharsetHeaderValue);
define_list_header!(AcceptLanguage, "accept-language", AcceptLanguageHeaderValue);
define_string_header!(ContentLanguage, "content-language");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::HeaderValueWithQualityScore;
    use axum::http::HeaderMap;
    use headers::HeaderMapExt;

    #[test]
    fn accept_decodes_every_line() {
        let mut map = HeaderMap::new();
        map.append("accept", HeaderValue::from_static("text/html;q=0.8"));
        map.append("accept", HeaderValue::from_static("application/json"));

        let Accept(entries) = map.typed_get::<Accept>().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].media_type(), "text/html");
        assert_eq!(entries[0].quality(), 0.8);
    }

    #[test]
    fn malformed_lists_do_not_decode() {
        let mut map = HeaderMap::new();
        map.insert("accept-language", HeaderValue::from_static("en;q=abc"));
        assert!(map.typed_try_get::<AcceptLanguage>().is_err());
    }

    #[test]
    fn typed_insert_round_trips() {
        let mut map = HeaderMap::new();
        let charsets = AcceptCharset(AcceptCharsetHeaderValue::parse_list("utf-8, *;q=0.5").unwrap());
        map.typed_insert(charsets.clone());
        assert_eq!(map.typed_get::<AcceptCharset>(), Some(charsets));

        map.typed_insert(ContentLanguage("en-US".into()));
        assert_eq!(map["content-language"], "en-US");
        assert_eq!(ContentLanguage::NAME, "content-language");
    }
}

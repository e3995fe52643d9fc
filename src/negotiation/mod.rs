// ./src/negotiation/mod.rs

//! RFC 7231 content negotiation: header parsing, preference ranking and the
//! matchers that pair client preferences with registered formatters.

pub mod encoding_matcher;
pub mod header_values;
pub mod language_matcher;
pub mod media_type_matcher;
pub mod negotiator;
pub mod parser;
pub mod ranking;
pub mod result;

pub use encoding_matcher::EncodingMatcher;
pub use header_values::{
    AcceptCharsetHeaderValue, AcceptLanguageHeaderValue, AcceptMediaTypeHeaderValue,
    ContentTypeHeaderValue, HeaderValueWithQualityScore, MediaTypeHeader, MediaTypeHeaderValue,
};
pub use language_matcher::LanguageMatcher;
pub use media_type_matcher::{Direction, MediaTypeFormatterMatch, MediaTypeFormatterMatcher};
pub use negotiator::{ContentNegotiator, ContentNegotiatorBuilder};
pub use ranking::rank;
pub use result::ContentNegotiationResult;

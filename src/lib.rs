// ./src/lib.rs

//! Content negotiation and request/response body mediation for Axum.
//!
//! Requests are read and responses written by whichever registered
//! [`MediaTypeFormatter`] best fits the client's `Accept`, `Accept-Charset`
//! and `Accept-Language` headers. Bodies travel as dynamic [`Value`]s that
//! an [`EncoderRegistry`] converts to and from wire trees.

pub mod config;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod headers;
pub mod negotiation;
pub mod response;
pub mod value;

// Re-export the core API so applications can just `use conneg::*`
pub use config::{Negotiation, NegotiationConfig, PropertyNaming};
pub use encoding::{ClassContract, EncoderRegistry};
pub use error::{EncodingError, HeaderError, HttpError, SerializationError};
pub use extract::Negotiate;
pub use formatters::MediaTypeFormatter;
pub use negotiation::{ContentNegotiationResult, ContentNegotiator};
pub use response::{NegotiatedResponseFactory, RawBody};
pub use value::{Object, ObjectRef, Value};
// Re-export Axum primitives they might need for convenience
pub use axum;
pub use axum::http::StatusCode;
pub use axum::response::Response;

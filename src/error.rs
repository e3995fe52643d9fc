// ./src/error.rs

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

// ════════════════════════════════════════════════════════════
// 1. Header syntax
// ════════════════════════════════════════════════════════════

/// A negotiation header could not be parsed. Never recovered from silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("media type `{0}` is not of the form type/subtype")]
    InvalidMediaType(String),
    #[error("quality score `{0}` must be a number between 0 and 1")]
    InvalidQuality(String),
    #[error("header `{header}` contains an empty value")]
    EmptyValue { header: &'static str },
    #[error("header `{0}` is not valid visible ASCII")]
    NotAscii(&'static str),
}

// ════════════════════════════════════════════════════════════
// 2. Encoding (wire value <-> typed value)
// ════════════════════════════════════════════════════════════

/// Structural failure while converting between wire values and typed values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("circular reference detected while encoding `{class}`")]
    CircularReference { class: String },
    #[error("no encoder is registered for type `{0}`")]
    UnknownType(String),
    #[error("expected {expected} when decoding `{ty}`, got {actual}")]
    UnexpectedShape {
        ty: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("type `{0}` is not a scalar type")]
    InvalidScalarType(String),
    #[error("value `{value}` cannot be cast to `{ty}`")]
    InvalidScalar { ty: String, value: String },
    #[error("cannot encode {0} with a scalar encoder")]
    NotScalar(&'static str),
    #[error("type `{0}` is not an array type")]
    NotArrayType(String),
    #[error("type `{0}` is not a date-time type")]
    NotDateTimeType(String),
    #[error("`{value}` does not match date-time format `{format}`")]
    InvalidDateTime { value: String, format: String },
    #[error("missing required constructor parameter `{parameter}` of `{class}`")]
    MissingParameter { class: String, parameter: String },
    #[error("cannot infer a type for `{member}` of `{class}`")]
    UnresolvableType { class: String, member: String },
    #[error("at `{member}` of `{class}`: {source}")]
    Member {
        class: String,
        member: String,
        #[source]
        source: Box<EncodingError>,
    },
}

impl EncodingError {
    /// Chains the failure with the class member that was being processed.
    pub fn in_member(self, class: &str, member: &str) -> Self {
        EncodingError::Member {
            class: class.to_owned(),
            member: member.to_owned(),
            source: Box::new(self),
        }
    }

    /// The innermost failure beneath any member chain.
    pub fn root_cause(&self) -> &EncodingError {
        match self {
            EncodingError::Member { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

// ════════════════════════════════════════════════════════════
// 3. Formatter serialization
// ════════════════════════════════════════════════════════════

/// A formatter failed to read or write a body.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("encoding `{0}` is not supported by this formatter")]
    UnsupportedEncoding(String),
    #[error("type `{0}` cannot be handled by this formatter")]
    UnsupportedType(String),
    #[error("body is not valid {encoding}")]
    MalformedText { encoding: String },
    #[error("malformed body: {0}")]
    Malformed(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ════════════════════════════════════════════════════════════
// 4. HTTP-facing failures
// ════════════════════════════════════════════════════════════

/// Failures surfaced to the HTTP layer, each mapped to a status code.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("malformed negotiation header: {0}")]
    BadRequest(#[from] HeaderError),
    #[error("request content type is not supported")]
    UnsupportedMediaType,
    #[error("none of the acceptable media types can be produced")]
    NotAcceptable { acceptable: Vec<String> },
    #[error("request body could not be read: {0}")]
    UnprocessableEntity(#[source] SerializationError),
    #[error("response body could not be written: {0}")]
    Internal(#[source] SerializationError),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            HttpError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            HttpError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            // 406 bodies are machine readable: the media types we could have produced
            HttpError::NotAcceptable { acceptable } => {
                let body = serde_json::Value::from(acceptable).to_string();
                (
                    StatusCode::NOT_ACCEPTABLE,
                    [(header::CONTENT_TYPE, "application/json")],
                    body,
                )
                    .into_response()
            }
            HttpError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            other => (other.status(), other.to_string()).into_response(),
        }
    }
}

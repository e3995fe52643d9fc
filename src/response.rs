// ./src/response.rs

use crate::error::{HttpError, SerializationError};
use crate::headers::ContentLanguage;
use crate::negotiation::ContentNegotiator;
use crate::value::{ObjectRef, Value};
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use headers::{ContentLength, HeaderMapExt};
use std::fmt;
use std::io::Read;
use std::sync::Arc;

// ════════════════════════════════════════════════════════════
// 1. Raw bodies
// ════════════════════════════════════════════════════════════

/// Whatever a handler hands back before it becomes response bytes.
pub enum RawBody {
    /// No body.
    Empty,
    /// An already-built body, passed through untouched.
    Body(Body),
    /// Bytes to copy into the response as they are.
    Stream(Box<dyn Read + Send>),
    /// A value to stringify (scalars) or negotiate (everything else).
    Value(Value),
}

impl RawBody {
    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        RawBody::Stream(Box::new(reader))
    }
}

impl fmt::Debug for RawBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawBody::Empty => f.write_str("Empty"),
            RawBody::Body(_) => f.write_str("Body(..)"),
            RawBody::Stream(_) => f.write_str("Stream(..)"),
            RawBody::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<()> for RawBody {
    fn from(_: ()) -> Self {
        RawBody::Empty
    }
}

impl From<Body> for RawBody {
    fn from(body: Body) -> Self {
        RawBody::Body(body)
    }
}

macro_rules! raw_body_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RawBody {
                fn from(value: $ty) -> Self {
                    RawBody::Value(value.into())
                }
            }
        )*
    };
}

raw_body_from_value!(Value, bool, i32, i64, f64, &str, String, ObjectRef, DateTime<FixedOffset>);

impl<T: Into<Value>> From<Vec<T>> for RawBody {
    fn from(items: Vec<T>) -> Self {
        RawBody::Value(items.into())
    }
}

// ════════════════════════════════════════════════════════════
// 2. The factory
// ════════════════════════════════════════════════════════════

/// Builds responses whose bodies are negotiated against the request's
/// `Accept`, `Accept-Charset` and `Accept-Language` headers.
#[derive(Clone)]
pub struct NegotiatedResponseFactory {
    negotiator: Arc<ContentNegotiator>,
}

impl NegotiatedResponseFactory {
    pub fn new(negotiator: Arc<ContentNegotiator>) -> Self {
        Self { negotiator }
    }

    pub fn negotiator(&self) -> &ContentNegotiator {
        &self.negotiator
    }

    /// Turns `raw` into a response.
    ///
    /// - empty bodies, nulls and prebuilt [`Body`]s pass through;
    /// - streams are copied as they are;
    /// - bools, numbers and strings become plain string bodies;
    /// - arrays, objects and date-times are written by the negotiated formatter.
    ///
    /// A failed negotiation yields a 406 listing the acceptable media types.
    /// `Content-Type` names the charset only when it differs from the
    /// formatter's default encoding.
    /// `Content-Length` is set when the body length is known and `headers`
    /// does not already carry one.
    pub fn create_response(
        &self,
        request_headers: &HeaderMap,
        status: StatusCode,
        headers: Option<HeaderMap>,
        raw: impl Into<RawBody>,
    ) -> Result<Response, HttpError> {
        let mut content_type = None;
        let mut content_language = None;

        let (body, length) = match raw.into() {
            RawBody::Empty | RawBody::Value(Value::Null) => (Body::empty(), Some(0)),
            RawBody::Body(body) => (body, None),
            RawBody::Stream(mut reader) => {
                let mut bytes = Vec::new();
                reader
                    .read_to_end(&mut bytes)
                    .map_err(|e| HttpError::Internal(SerializationError::Io(e)))?;
                let length = bytes.len() as u64;
                (Body::from(bytes), Some(length))
            }
            RawBody::Value(value) if value.is_scalar() => {
                let text = scalar_text(&value);
                let length = text.len() as u64;
                (Body::from(text), Some(length))
            }
            RawBody::Value(value) => {
                let ty = value.type_name();
                let result = self.negotiator.negotiate_response_content(&ty, request_headers)?;

                let (Some(formatter), Some(encoding)) = (result.formatter(), result.encoding()) else {
                    let acceptable = self.negotiator.acceptable_response_media_types(&ty);
                    tracing::debug!(ty, ?acceptable, "response not acceptable");
                    return Ok(HttpError::NotAcceptable { acceptable }.into_response());
                };

                let mut buffer = Vec::new();
                formatter
                    .write_to_stream(&value, &mut buffer, Some(encoding))
                    .map_err(|e| {
                        tracing::warn!(error = %e, ty, "response body could not be written");
                        HttpError::Internal(e)
                    })?;

                content_type = result.media_type().map(|media_type| {
                    match formatter.default_encoding() {
                        Some(default) if default.eq_ignore_ascii_case(encoding) => media_type.to_owned(),
                        _ => format!("{media_type}; charset={encoding}"),
                    }
                });
                content_language = result.language().map(str::to_owned);
                let length = buffer.len() as u64;
                (Body::from(buffer), Some(length))
            }
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        if let Some(headers) = headers {
            response.headers_mut().extend(headers);
        }

        if let Some(value) = content_type.and_then(|media_type| HeaderValue::from_str(&media_type).ok()) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        if let Some(language) = content_language {
            if !response.headers().contains_key(header::CONTENT_LANGUAGE) {
                response.headers_mut().typed_insert(ContentLanguage(language));
            }
        }
        if let Some(length) = length {
            if !response.headers().contains_key(header::CONTENT_LENGTH) {
                response.headers_mut().typed_insert(ContentLength(length));
            }
        }
        Ok(response)
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

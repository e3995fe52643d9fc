// ./src/extract.rs

use crate::error::HttpError;
use crate::headers::Accept;
use crate::negotiation::ContentNegotiationResult;
use crate::response::{NegotiatedResponseFactory, RawBody};
use crate::value::Value;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use headers::HeaderMapExt;
use std::convert::Infallible;
use std::sync::Arc;

// ════════════════════════════════════════════════════════════
// 1. The extractor
// ════════════════════════════════════════════════════════════

/// Request-scoped access to content negotiation.
///
/// Captures the request headers and the shared response factory, which must
/// be reachable from the router state through `FromRef`.
///
/// ```no_run
/// use conneg::{Negotiate, NegotiationConfig, HttpError, StatusCode};
/// use conneg::axum::{response::Response, routing::get, Router};
///
/// async fn hello(negotiate: Negotiate) -> Result<Response, HttpError> {
///     negotiate.respond(StatusCode::OK, vec!["hello", "world"])
/// }
///
/// let app: Router = Router::new()
///     .route("/", get(hello))
///     .with_state(NegotiationConfig::default().build([]));
/// ```
#[derive(Clone)]
pub struct Negotiate {
    headers: HeaderMap,
    factory: Arc<NegotiatedResponseFactory>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Negotiate
where
    Arc<NegotiatedResponseFactory>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Negotiate {
            headers: parts.headers.clone(),
            factory: Arc::from_ref(state),
        })
    }
}

// ════════════════════════════════════════════════════════════
// 2. Negotiating from a handler
// ════════════════════════════════════════════════════════════

impl Negotiate {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The parsed `Accept` header, if present and well formed.
    pub fn accept(&self) -> Option<Accept> {
        self.headers.typed_get::<Accept>()
    }

    pub fn negotiate_response(&self, ty: &str) -> Result<ContentNegotiationResult, HttpError> {
        Ok(self
            .factory
            .negotiator()
            .negotiate_response_content(ty, &self.headers)?)
    }

    /// Builds a negotiated response; see
    /// [`NegotiatedResponseFactory::create_response`].
    pub fn respond(&self, status: StatusCode, body: impl Into<RawBody>) -> Result<Response, HttpError> {
        self.factory.create_response(&self.headers, status, None, body)
    }

    pub fn respond_with_headers(
        &self,
        status: StatusCode,
        headers: HeaderMap,
        body: impl Into<RawBody>,
    ) -> Result<Response, HttpError> {
        self.factory
            .create_response(&self.headers, status, Some(headers), body)
    }

    /// Reads a request body as `ty` using the request's `Content-Type`.
    pub fn read_body_as(&self, ty: &str, body: &[u8]) -> Result<Value, HttpError> {
        self.factory
            .negotiator()
            .read_request_body_as(ty, &self.headers, body)
    }
}

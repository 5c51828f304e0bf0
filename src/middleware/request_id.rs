//! Correlation ids.

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use super::Middleware;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;

/// Response header carrying the correlation id.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Opaque per-request identifier, used for tracing and log correlation only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assigns a fresh [`RequestId`] to every request.
///
/// The id is minted here and nowhere else: an inbound `x-request-id` header
/// is never trusted. It is stored in the request extensions, recorded on a
/// `request` span wrapping the rest of the chain, and echoed on the response.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl Middleware for RequestIdLayer {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(WithRequestId { next })
    }
}

struct WithRequestId {
    next: BoxedHandler,
}

impl ErasedHandler for WithRequestId {
    fn call(&self, mut req: Request) -> BoxFuture {
        let id = RequestId::generate();
        let span = info_span!(
            "request",
            request_id = %id,
            method = %req.method(),
            path = req.path(),
        );
        req.extensions_mut().insert(id.clone());

        let next = Arc::clone(&self.next);
        Box::pin(
            async move {
                let mut res = next.call(req).await;
                if let Ok(value) = HeaderValue::from_str(id.as_str()) {
                    res.headers_mut().insert(X_REQUEST_ID, value);
                }
                debug!(status = res.status_code().as_u16(), "request finished");
                res
            }
            .instrument(span),
        )
    }
}

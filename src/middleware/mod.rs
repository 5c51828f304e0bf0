//! Middleware layer.
//!
//! A middleware takes the next handler in the chain and returns a new handler
//! around it: `wrap(next) -> handler`. It is a value, not a closure over
//! shared state, so each one can be built and exercised on its own.
//!
//! Built-in middleware:
//! - [`RequestIdLayer`]: per-request correlation id, tracing span and
//!   `x-request-id` response header. Applied by the router, outermost.
//! - [`LoginRequired`]: redirects anonymous page requests to the login page.
//! - [`TokenRequired`]: answers anonymous API requests with an empty 401.

mod gate;
mod request_id;

pub use gate::{Gate, GateKind, LOGIN_CODE_PATH, LoginRequired, TokenRequired};
pub use request_id::{RequestId, RequestIdLayer, X_REQUEST_ID};

#[doc(hidden)]
pub use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};

/// A handler decorator.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;
}

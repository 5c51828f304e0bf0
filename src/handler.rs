//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The route table holds handlers of *different* types in one `Vec`, and
//! gates wrap handlers they know nothing about. Both need a single concrete
//! type, so every handler is erased behind `dyn ErasedHandler`:
//!
//! ```text
//! async fn portal(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.rule(rule, portal)
//! portal.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(portal))                      ← stored as BoxedHandler
//!        ↓ gate.wrap(handler), RequestIdLayer.wrap(dispatcher)
//! handler.call(req)  at request time               ← one vtable dispatch per layer
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;
use tracing::warn;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Dispatch interface shared by handlers, gates and the router itself.
///
/// `#[doc(hidden)] pub` because it appears in the signature of
/// [`Middleware::wrap`](crate::middleware::Middleware::wrap). Application
/// code writes plain `async fn`s instead.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn` (or closure) with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Placeholder for a handler slot the application never filled.
pub(crate) fn not_implemented(name: &'static str) -> BoxedHandler {
    Arc::new(FnHandler(move |req: Request| async move {
        warn!(handler = name, path = req.path(), "no handler installed");
        StatusCode::NOT_IMPLEMENTED
    }))
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    async fn hello(_req: Request) -> &'static str {
        "hello"
    }

    #[tokio::test]
    async fn async_fn_is_a_handler() {
        let handler = hello.into_boxed_handler();
        let res = handler.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"hello");
    }

    #[tokio::test]
    async fn closures_capture_state() {
        let greeting = Arc::new(String::from("hi"));
        let handler = (move |_req: Request| {
            let greeting = Arc::clone(&greeting);
            async move { greeting.to_string() }
        })
        .into_boxed_handler();
        let res = handler.call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.body().as_ref(), b"hi");
    }

    #[tokio::test]
    async fn missing_handler_answers_501() {
        let res = not_implemented("otp").call(Request::new(Method::GET, "/_otp")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_IMPLEMENTED);
    }
}

//! Authentication gates.
//!
//! Both gates consult the same [`Authenticator`] and differ only in what an
//! anonymous request gets back:
//!
//! | Gate | Anonymous request | Authenticated request |
//! |---|---|---|
//! | [`LoginRequired`] | login redirect | decorated, then forwarded |
//! | [`TokenRequired`] | `401`, empty body | forwarded untouched |

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use super::Middleware;
use crate::auth::Authenticator;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

/// The one path [`TokenRequired`] lets through without a session: clients ask
/// for a one-time login code here before they hold any token.
///
/// Compared as an exact string against the path as it arrived on the wire,
/// before any percent-decoding. `/api/v1/org/login/code/` is not exempt, and
/// neither is an encoded spelling such as `/api/v1/org/login/cod%65`.
pub const LOGIN_CODE_PATH: &str = "/api/v1/org/login/code";

// ── LoginRequired ─────────────────────────────────────────────────────────────

/// Gate for browser pages.
#[derive(Clone)]
pub struct LoginRequired {
    auth: Arc<dyn Authenticator>,
}

impl LoginRequired {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self { auth }
    }
}

impl Middleware for LoginRequired {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(LoginGated { auth: Arc::clone(&self.auth), next })
    }
}

struct LoginGated {
    auth: Arc<dyn Authenticator>,
    next: BoxedHandler,
}

impl ErasedHandler for LoginGated {
    fn call(&self, req: Request) -> BoxFuture {
        let auth = Arc::clone(&self.auth);
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            if !auth.is_authenticated(&req).await {
                debug!(path = req.path(), "no session, redirecting to login");
                return auth.redirect_to_login(&req);
            }
            let req = auth.decorate(req).await;
            next.call(req).await
        })
    }
}

// ── TokenRequired ─────────────────────────────────────────────────────────────

/// Gate for API calls made with a token.
#[derive(Clone)]
pub struct TokenRequired {
    auth: Arc<dyn Authenticator>,
}

impl TokenRequired {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        Self { auth }
    }
}

impl Middleware for TokenRequired {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Arc::new(TokenGated { auth: Arc::clone(&self.auth), next })
    }
}

struct TokenGated {
    auth: Arc<dyn Authenticator>,
    next: BoxedHandler,
}

impl ErasedHandler for TokenGated {
    fn call(&self, req: Request) -> BoxFuture {
        let auth = Arc::clone(&self.auth);
        let next = Arc::clone(&self.next);
        Box::pin(async move {
            if !auth.is_authenticated(&req).await && req.path() != LOGIN_CODE_PATH {
                debug!(path = req.path(), "no token, rejecting");
                return Response::status(StatusCode::UNAUTHORIZED);
            }
            next.call(req).await
        })
    }
}

// ── Gate ──────────────────────────────────────────────────────────────────────

/// Which gate guards a route, as recorded in the route table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateKind {
    Login,
    Token,
}

/// A gate attached to a [`Rule`](crate::Rule).
#[derive(Clone)]
pub enum Gate {
    Login(LoginRequired),
    Token(TokenRequired),
}

impl Gate {
    pub fn kind(&self) -> GateKind {
        match self {
            Self::Login(_) => GateKind::Login,
            Self::Token(_) => GateKind::Token,
        }
    }
}

impl Middleware for Gate {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        match self {
            Self::Login(gate) => gate.wrap(next),
            Self::Token(gate) => gate.wrap(next),
        }
    }
}

impl From<LoginRequired> for Gate {
    fn from(gate: LoginRequired) -> Self { Self::Login(gate) }
}

impl From<TokenRequired> for Gate {
    fn from(gate: TokenRequired) -> Self { Self::Token(gate) }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.kind(), f)
    }
}

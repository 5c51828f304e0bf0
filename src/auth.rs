//! The authentication capability consumed by the gates.
//!
//! portal-gate never looks at cookies or tokens itself. The embedding
//! application supplies an [`Authenticator`] that answers one question
//! ("is this request logged in?") and optionally decorates requests that
//! pass the login gate or customises where failed ones are sent.

use async_trait::async_trait;

use crate::request::Request;
use crate::response::Response;

/// Where unauthenticated page requests are sent by default.
pub const LOGIN_PAGE: &str = "/login/password";

/// Session lookup supplied by the surrounding system.
///
/// Implementations are shared by every in-flight request and must be cheap to
/// call concurrently. A lookup that fails for any reason reports `false`;
/// there is no separate error channel.
///
/// ```rust
/// use async_trait::async_trait;
/// use portal_gate::{Authenticator, Request};
///
/// struct CookieSessions;
///
/// #[async_trait]
/// impl Authenticator for CookieSessions {
///     async fn is_authenticated(&self, req: &Request) -> bool {
///         req.header("cookie").is_some_and(|c| c.contains("session="))
///     }
/// }
/// ```
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Whether `req` belongs to a logged-in user.
    async fn is_authenticated(&self, req: &Request) -> bool;

    /// Attaches session context to a request that passed the login gate.
    /// The default leaves the request untouched.
    async fn decorate(&self, req: Request) -> Request {
        req
    }

    /// Response for a page request that failed the login gate.
    ///
    /// Defaults to `302 Found` towards [`LOGIN_PAGE`], carrying the original
    /// target in `redirectUrl` so the login page can send the user back.
    fn redirect_to_login(&self, req: &Request) -> Response {
        let back = req.target();
        Response::redirect(&format!(
            "{LOGIN_PAGE}?redirectUrl={}",
            urlencoding::encode(&back),
        ))
    }
}

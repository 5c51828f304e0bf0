//! The portal's route table.
//!
//! ```text
//!  #  matcher                      method  gate   handler
//!  0  header X-Proxy: API          any     token  proxy_api
//!  1  header X-Proxy: API-NO-AUTH  any     -      proxy_api          (config.proxy_no_auth)
//!  2  path   /_otp                 GET     token  otp
//!  3  path   /login/{type}         GET     -      login
//!  4  path   /login/{type}         POST    -      login_submit
//!  5  path   /logout               POST    -      logout
//!  6  path   /resetPassword        GET     login  reset_password
//!  7  path   /resetPassword        POST    -      reset_password_submit
//!  8  path   /retrievePassword     GET     -      retrieve_password
//!  9  path   /retrievePassword     POST    -      retrieve_password_submit
//! 10  prefix /apps                 GET     -      app_manager
//! 11  prefix /                     GET     login  portal
//! ```
//!
//! Proxy traffic is recognised by header before any path rule is looked at,
//! and the `/` catch-all sits last so it never shadows a specific page.

use std::sync::Arc;

use http::Method;
use tracing::{info, warn};

use crate::auth::Authenticator;
use crate::config::Config;
use crate::handler::{BoxedHandler, Handler, not_implemented};
use crate::middleware::{LoginRequired, TokenRequired};
use crate::router::{Router, Rule};

/// Header marking requests the front-end wants forwarded to the backend API.
pub const X_PROXY: &str = "x-proxy";
/// `X-Proxy` value for API calls that need a valid session.
pub const PROXY_API: &str = "API";
/// `X-Proxy` value for API calls that skip authentication.
pub const PROXY_API_NO_AUTH: &str = "API-NO-AUTH";

macro_rules! handler_slots {
    ($($(#[$doc:meta])* $name:ident,)*) => {
        /// The page and API handlers the route table dispatches to.
        ///
        /// Every slot starts out answering `501 Not Implemented`; install the
        /// real handlers with the setter of the same name.
        pub struct PortalHandlers {
            $($name: BoxedHandler,)*
        }

        impl PortalHandlers {
            pub fn new() -> Self {
                Self { $($name: not_implemented(stringify!($name)),)* }
            }

            $(
                $(#[$doc])*
                pub fn $name(mut self, handler: impl Handler) -> Self {
                    self.$name = handler.into_boxed_handler();
                    self
                }
            )*
        }
    };
}

handler_slots! {
    /// Forwards `X-Proxy` requests to the backend API.
    proxy_api,
    /// `GET /_otp`: one-time password retrieval.
    otp,
    /// `GET /login/{type}`: login page.
    login,
    /// `POST /login/{type}`: credential submission.
    login_submit,
    /// `POST /logout`.
    logout,
    /// `GET /resetPassword`: form for a logged-in user.
    reset_password,
    /// `POST /resetPassword`.
    reset_password_submit,
    /// `GET /retrievePassword`: forgotten-password form.
    retrieve_password,
    /// `POST /retrievePassword`.
    retrieve_password_submit,
    /// `GET /apps…`: application manager.
    app_manager,
    /// Every other `GET`: the portal page.
    portal,
}

impl Default for PortalHandlers {
    fn default() -> Self { Self::new() }
}

/// Builds the portal route table.
pub fn build_routes(
    handlers: PortalHandlers,
    auth: Arc<dyn Authenticator>,
    config: &Config,
) -> Router {
    let login = LoginRequired::new(Arc::clone(&auth));
    let token = TokenRequired::new(auth);

    let get = |path: &str| Rule::path(path).method(Method::GET);
    let post = |path: &str| Rule::path(path).method(Method::POST);

    let mut router = Router::new().route(
        Rule::header(X_PROXY, PROXY_API).gate(token.clone()),
        Arc::clone(&handlers.proxy_api),
    );

    if config.proxy_no_auth {
        warn!(
            header = X_PROXY,
            value = PROXY_API_NO_AUTH,
            "unauthenticated proxy rule enabled; the edge proxy must strip this header from client requests",
        );
        router = router.route(Rule::header(X_PROXY, PROXY_API_NO_AUTH), handlers.proxy_api);
    }

    let router = router
        .route(get("/_otp").gate(token),                   handlers.otp)
        .route(get("/login/{type}"),                       handlers.login)
        .route(post("/login/{type}"),                      handlers.login_submit)
        .route(post("/logout"),                            handlers.logout)
        .route(get("/resetPassword").gate(login.clone()),  handlers.reset_password)
        .route(post("/resetPassword"),                     handlers.reset_password_submit)
        .route(get("/retrievePassword"),                   handlers.retrieve_password)
        .route(post("/retrievePassword"),                  handlers.retrieve_password_submit)
        .route(Rule::prefix("/apps").method(Method::GET),  handlers.app_manager)
        .route(Rule::prefix("/").method(Method::GET).gate(login), handlers.portal);

    info!(routes = router.routes().len(), "portal route table built");
    router
}

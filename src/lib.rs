//! # portal-gate
//!
//! Request dispatch and access control for a web portal that sits behind a
//! reverse proxy.
//!
//! Every inbound request goes through the same chain:
//!
//! ```text
//! request → RequestIdLayer → first matching Rule → optional gate → handler
//! ```
//!
//! - [`RequestIdLayer`](middleware::RequestIdLayer) gives the request a fresh
//!   correlation id, before anything else sees it.
//! - The [`Router`] walks its rules in priority order and dispatches to the
//!   first one whose matcher (header, exact path or path prefix) and method
//!   filter accept the request. Nothing matched → `404`.
//! - A [`LoginRequired`](middleware::LoginRequired) gate redirects anonymous
//!   page requests to the login page; a
//!   [`TokenRequired`](middleware::TokenRequired) gate answers anonymous API
//!   requests with an empty `401`.
//!
//! Whether a request is logged in is not decided here: the application
//! supplies an [`Authenticator`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use portal_gate::{Authenticator, Config, PortalHandlers, Request, Response, Server, build_routes};
//!
//! struct Sessions;
//!
//! #[async_trait]
//! impl Authenticator for Sessions {
//!     async fn is_authenticated(&self, req: &Request) -> bool {
//!         req.header("cookie").is_some_and(|c| c.contains("session="))
//!     }
//! }
//!
//! async fn portal(_req: Request) -> Response {
//!     Response::text("portal")
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), portal_gate::Error> {
//!     let config = Config::from_env()?;
//!     let handlers = PortalHandlers::new().portal(portal);
//!     let router = build_routes(handlers, Arc::new(Sessions), &config);
//!     Server::new(config.addr).serve(router).await
//! }
//! ```

mod auth;
mod config;
mod error;
mod handler;
mod portal;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;

pub use auth::{Authenticator, LOGIN_PAGE};
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use portal::{PROXY_API, PROXY_API_NO_AUTH, PortalHandlers, X_PROXY, build_routes};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{Matcher, MethodFilter, Route, Router, Rule, Service};
pub use server::Server;

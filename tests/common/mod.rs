//! Shared fixtures for the portal integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use portal_gate::{
    Authenticator, Config, Handler, PortalHandlers, Request, Response, Router, Service,
    build_routes,
};

/// Session context attached by [`StaticAuth::decorate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: &'static str,
}

/// Authenticator with a fixed answer.
pub struct StaticAuth(pub bool);

#[async_trait]
impl Authenticator for StaticAuth {
    async fn is_authenticated(&self, _req: &Request) -> bool {
        self.0
    }

    async fn decorate(&self, mut req: Request) -> Request {
        req.extensions_mut().insert(Session { user: "alice" });
        req
    }
}

/// A handler that answers with its own name and reports what it saw:
/// `x-seen-request-id` and, when decorated, `x-seen-user`.
pub fn named(name: &'static str) -> impl Handler {
    move |req: Request| async move {
        let mut builder = Response::builder();
        if let Some(id) = req.request_id() {
            builder = builder.header("x-seen-request-id", id.as_str());
        }
        if let Some(session) = req.extensions().get::<Session>() {
            builder = builder.header("x-seen-user", session.user);
        }
        if let Some(kind) = req.param("type") {
            builder = builder.header("x-seen-type", kind);
        }
        builder.text(name)
    }
}

pub fn handlers() -> PortalHandlers {
    PortalHandlers::new()
        .proxy_api(named("proxy_api"))
        .otp(named("otp"))
        .login(named("login"))
        .login_submit(named("login_submit"))
        .logout(named("logout"))
        .reset_password(named("reset_password"))
        .reset_password_submit(named("reset_password_submit"))
        .retrieve_password(named("retrieve_password"))
        .retrieve_password_submit(named("retrieve_password_submit"))
        .app_manager(named("app_manager"))
        .portal(named("portal"))
}

/// The full portal table, every handler installed.
pub fn portal(authenticated: bool) -> Service {
    portal_with(authenticated, &Config::default())
}

pub fn portal_with(authenticated: bool, config: &Config) -> Service {
    router(authenticated, config).into_service()
}

/// The unfrozen table, for handing to a [`portal_gate::Server`].
pub fn router(authenticated: bool, config: &Config) -> Router {
    build_routes(handlers(), Arc::new(StaticAuth(authenticated)), config)
}

pub fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).expect("utf-8 body")
}

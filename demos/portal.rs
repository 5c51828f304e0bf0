//! Runnable portal-gate setup with stub handlers.
//!
//! Run with:
//!   RUST_LOG=portal_gate=debug,info cargo run --example portal
//!
//! Try:
//!   curl -i http://localhost:3000/dashboard                        # 302 to login
//!   curl -i -H 'cookie: session=1' http://localhost:3000/dashboard # portal page
//!   curl -i -X POST -H 'X-Proxy: API' http://localhost:3000/api/v1/apps           # 401
//!   curl -i -X POST -H 'X-Proxy: API' http://localhost:3000/api/v1/org/login/code # proxied
//!   curl -i http://localhost:3000/login/password

use std::sync::Arc;

use async_trait::async_trait;
use portal_gate::{
    Authenticator, Config, PortalHandlers, Request, Response, Server, build_routes,
};
use tracing_subscriber::EnvFilter;

/// Demo user attached to requests that pass the login gate.
#[derive(Clone, Debug)]
struct User(String);

/// Treats any `session=<name>` cookie as a logged-in user.
struct CookieSessions;

impl CookieSessions {
    fn session(req: &Request) -> Option<&str> {
        req.header("cookie")?
            .split(';')
            .find_map(|pair| pair.trim().strip_prefix("session="))
            .filter(|v| !v.is_empty())
    }
}

#[async_trait]
impl Authenticator for CookieSessions {
    async fn is_authenticated(&self, req: &Request) -> bool {
        Self::session(req).is_some()
    }

    async fn decorate(&self, mut req: Request) -> Request {
        if let Some(name) = Self::session(&req).map(str::to_owned) {
            req.extensions_mut().insert(User(name));
        }
        req
    }
}

#[tokio::main]
async fn main() -> Result<(), portal_gate::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let handlers = PortalHandlers::new()
        .proxy_api(proxy_api)
        .login(login_page)
        .logout(logout)
        .app_manager(app_manager)
        .portal(portal);

    let router = build_routes(handlers, Arc::new(CookieSessions), &config);
    Server::new(config.addr).serve(router).await
}

// X-Proxy: API / API-NO-AUTH
async fn proxy_api(req: Request) -> Response {
    Response::json(format!(r#"{{"code":0,"data":{{"proxied":"{}"}}}}"#, req.path()))
}

// GET /login/{type}
async fn login_page(req: Request) -> Response {
    let kind = req.param("type").unwrap_or("password");
    Response::text(format!("login form ({kind})"))
}

// POST /logout
async fn logout(_req: Request) -> Response {
    Response::redirect("/login/password")
}

// GET /apps…
async fn app_manager(req: Request) -> Response {
    Response::text(format!("app manager: {}", req.path()))
}

// Every other GET, behind the login gate.
async fn portal(req: Request) -> Response {
    let user = req.extensions().get::<User>().map_or("unknown", |u| u.0.as_str());
    let id = req.request_id().map(|id| id.to_string()).unwrap_or_default();
    Response::text(format!("portal for {user} (request {id})"))
}

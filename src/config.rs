//! Startup configuration.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PORTAL_ADDR` | `0.0.0.0:3000` | listen address |
//! | `PORTAL_PROXY_NO_AUTH` | `true` | honour `X-Proxy: API-NO-AUTH` |
//!
//! # `X-Proxy: API-NO-AUTH`
//!
//! A request carrying this header reaches the API proxy with no session
//! check at all. That is only safe when a trusted reverse proxy in front of
//! the portal strips or sets `X-Proxy` on every inbound request. Deployments
//! exposed without such a proxy should set `PORTAL_PROXY_NO_AUTH=false`.

use std::net::SocketAddr;

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Address the server listens on.
    pub addr: SocketAddr,

    /// Whether the unauthenticated proxy rule is registered.
    pub proxy_no_auth: bool,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(addr) = lookup("PORTAL_ADDR") {
            config.addr = parse_addr(&addr)?;
        }
        if let Some(value) = lookup("PORTAL_PROXY_NO_AUTH") {
            config.proxy_no_auth = parse_bool("PORTAL_PROXY_NO_AUTH", &value)?;
        }

        Ok(config)
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_proxy_no_auth(mut self, enabled: bool) -> Self {
        self.proxy_no_auth = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            proxy_no_auth: true,
        }
    }
}

pub(crate) fn parse_addr(addr: &str) -> Result<SocketAddr, Error> {
    addr.trim()
        .parse()
        .map_err(|_| Error::InvalidAddr(addr.to_owned()))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::Config { key, value: value.to_owned() }),
    }
}

//! Unified error type.

use thiserror::Error;

/// The error type returned by portal-gate's fallible operations.
///
/// Request-level outcomes (401, 404, redirects) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding to a port, accepting a connection, or a
/// bad configuration value at startup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address `{0}`")]
    InvalidAddr(String),

    #[error("invalid value `{value}` for {key}")]
    Config { key: &'static str, value: String },
}

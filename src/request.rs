//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Extensions, Method};

use crate::middleware::RequestId;

/// An incoming HTTP request.
///
/// Method, target, headers and body are fixed on entry. Middleware decorate
/// the request through its [`extensions`](Request::extensions_mut), a typed
/// context map that lives exactly as long as the request.
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    extensions: Extensions,
}

impl Request {
    /// Creates a request for `target`, a path with an optional `?query`.
    ///
    /// ```rust
    /// use portal_gate::Request;
    /// use http::Method;
    ///
    /// let req = Request::new(Method::GET, "/apps/42?tab=forms")
    ///     .with_header("x-proxy", "API");
    /// assert_eq!(req.path(), "/apps/42");
    /// assert_eq!(req.query(), Some("tab=forms"));
    /// ```
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
            None => (target.to_owned(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: parts.headers,
            body,
            params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Appends a header. Names or values that are not valid HTTP are skipped.
    pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name: Result<HeaderName, _> = name.try_into();
        let value: Result<HeaderValue, _> = value.try_into();
        if let (Ok(name), Ok(value)) = (name, value) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Path plus query, as the client sent it.
    pub fn target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Case-insensitive header lookup. Returns the first value, if it is
    /// visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/login/{type}`, `req.param("type")` on `/login/password`
    /// returns `Some("password")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Per-request context attached by middleware.
    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }

    /// The correlation id assigned by [`RequestIdLayer`](crate::middleware::RequestIdLayer).
    ///
    /// `None` only for requests that never went through a [`Service`](crate::Service).
    pub fn request_id(&self) -> Option<&RequestId> {
        self.extensions.get::<RequestId>()
    }
}

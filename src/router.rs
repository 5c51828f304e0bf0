//! Ordered, first-match request router.
//!
//! A route table is a list of rules, each with an explicit priority. A
//! request is dispatched to the lowest-priority-number rule whose matcher and
//! method filter both accept it; nothing else is consulted. Specific rules
//! must therefore be registered before broad ones: a `/` prefix registered
//! first would shadow everything after it.
//!
//! Three kinds of matcher exist:
//!
//! | Matcher | Accepts when |
//! |---|---|
//! | [`Rule::header`] | the header is present with exactly this value |
//! | [`Rule::path`] | the whole path matches, `{name}` captures one segment |
//! | [`Rule::prefix`] | the path starts with the prefix |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{Gate, GateKind, Middleware, RequestIdLayer};
use crate::request::Request;
use crate::response::Response;

// ── Matching ──────────────────────────────────────────────────────────────────

/// What a rule looks at to decide whether a request is its own.
pub enum Matcher {
    Header { name: HeaderName, value: HeaderValue },
    Path { pattern: String, tree: MatchitRouter<()> },
    Prefix(String),
}

impl Matcher {
    /// Returns the captured path parameters when the request matches.
    fn matches(&self, req: &Request) -> Option<HashMap<String, String>> {
        match self {
            Self::Header { name, value } => req
                .headers()
                .get_all(name)
                .iter()
                .any(|v| v == value)
                .then(HashMap::new),
            Self::Path { tree, .. } => {
                let matched = tree.at(req.path()).ok()?;
                Some(
                    matched
                        .params
                        .iter()
                        .map(|(k, v)| (k.to_owned(), v.to_owned()))
                        .collect(),
                )
            }
            Self::Prefix(prefix) => req.path().starts_with(prefix.as_str()).then(HashMap::new),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header { name, value } => write!(f, "header {name}: {value:?}"),
            Self::Path { pattern, .. } => write!(f, "path {pattern}"),
            Self::Prefix(prefix) => write!(f, "prefix {prefix}"),
        }
    }
}

/// Which methods a rule accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Vec<Method>),
}

impl MethodFilter {
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(method),
        }
    }
}

// ── Rule ──────────────────────────────────────────────────────────────────────

/// A route rule before it is bound to a handler.
///
/// ```rust
/// # use std::sync::Arc;
/// # use portal_gate::{Authenticator, Rule};
/// # use portal_gate::middleware::TokenRequired;
/// # use http::Method;
/// # fn demo(auth: Arc<dyn Authenticator>) {
/// Rule::header("x-proxy", "API").gate(TokenRequired::new(auth));
/// Rule::path("/login/{type}").method(Method::POST);
/// Rule::prefix("/apps").method(Method::GET);
/// # }
/// ```
pub struct Rule {
    matcher: Matcher,
    methods: MethodFilter,
    gate: Option<Gate>,
}

impl Rule {
    /// Matches requests carrying header `name` with exactly `value`.
    /// The name is case-insensitive, the value is not.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not valid in an HTTP header.
    pub fn header(name: &str, value: &str) -> Self {
        let name = HeaderName::from_bytes(name.as_bytes())
            .unwrap_or_else(|e| panic!("invalid header rule `{name}`: {e}"));
        let value = HeaderValue::from_str(value)
            .unwrap_or_else(|e| panic!("invalid header rule value `{value}`: {e}"));
        Self::with_matcher(Matcher::Header { name, value })
    }

    /// Matches the whole path. `{name}` segments are captured and readable
    /// through [`Request::param`]. The path is compared as received, still
    /// percent-encoded.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid route.
    pub fn path(pattern: &str) -> Self {
        let mut tree = MatchitRouter::new();
        tree.insert(pattern, ())
            .unwrap_or_else(|e| panic!("invalid route `{pattern}`: {e}"));
        Self::with_matcher(Matcher::Path { pattern: pattern.to_owned(), tree })
    }

    /// Matches every path starting with `prefix`.
    pub fn prefix(prefix: &str) -> Self {
        Self::with_matcher(Matcher::Prefix(prefix.to_owned()))
    }

    fn with_matcher(matcher: Matcher) -> Self {
        Self { matcher, methods: MethodFilter::Any, gate: None }
    }

    /// Restricts the rule to `method`. Call repeatedly to accept several.
    pub fn method(mut self, method: Method) -> Self {
        match &mut self.methods {
            MethodFilter::Any => self.methods = MethodFilter::Only(vec![method]),
            MethodFilter::Only(methods) => methods.push(method),
        }
        self
    }

    /// Puts `gate` in front of the rule's handler.
    pub fn gate(mut self, gate: impl Into<Gate>) -> Self {
        self.gate = Some(gate.into());
        self
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// A rule bound to its (possibly gated) handler, at a fixed priority.
pub struct Route {
    priority: usize,
    matcher: Matcher,
    methods: MethodFilter,
    gate: Option<GateKind>,
    handler: BoxedHandler,
}

impl Route {
    /// Position in the table. Lower numbers are tried first.
    pub fn priority(&self) -> usize { self.priority }
    pub fn matcher(&self) -> &Matcher { &self.matcher }
    pub fn methods(&self) -> &MethodFilter { &self.methods }
    pub fn gate(&self) -> Option<GateKind> { self.gate }

    fn accepts(&self, req: &Request) -> Option<HashMap<String, String>> {
        if !self.methods.allows(req.method()) {
            return None;
        }
        self.matcher.matches(req)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("priority", &self.priority)
            .field("matcher", &self.matcher)
            .field("methods", &self.methods)
            .field("gate", &self.gate)
            .finish()
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application router.
///
/// Build it once at startup, then freeze it with [`Router::into_service`].
/// Each registration returns `self` so calls chain naturally, and each rule
/// gets the next priority number.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends `rule`, bound to `handler`, at the lowest precedence so far.
    pub fn rule(self, rule: Rule, handler: impl Handler) -> Self {
        self.route(rule, handler.into_boxed_handler())
    }

    pub(crate) fn route(mut self, rule: Rule, mut handler: BoxedHandler) -> Self {
        if let Some(gate) = &rule.gate {
            handler = gate.wrap(handler);
        }
        self.routes.push(Route {
            priority: self.routes.len(),
            matcher: rule.matcher,
            methods: rule.methods,
            gate: rule.gate.as_ref().map(Gate::kind),
            handler,
        });
        self
    }

    /// Shorthand for an ungated exact-path rule with one method.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.rule(Rule::path(path).method(method), handler)
    }

    /// The table, in dispatch order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Freezes the table and puts the correlation-id layer in front of it.
    pub fn into_service(self) -> Service {
        let dispatch: BoxedHandler = Arc::new(Dispatch { routes: self.routes });
        Service(RequestIdLayer.wrap(dispatch))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

struct Dispatch {
    routes: Vec<Route>,
}

impl ErasedHandler for Dispatch {
    fn call(&self, mut req: Request) -> BoxFuture {
        for route in &self.routes {
            if let Some(params) = route.accepts(&req) {
                debug!(priority = route.priority, matcher = ?route.matcher, "route matched");
                req.set_params(params);
                return route.handler.call(req);
            }
        }
        debug!("no route matched");
        Box::pin(async { Response::status(StatusCode::NOT_FOUND) })
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A frozen route table behind the correlation-id layer. Cheap to clone.
#[derive(Clone)]
pub struct Service(BoxedHandler);

impl Service {
    /// Dispatches one request.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }

    /// Answers `req` with a bare `status` without consulting the table. The
    /// response still goes through the correlation-id layer.
    pub(crate) fn reject(&self, req: Request, status: StatusCode) -> BoxFuture {
        RequestIdLayer.wrap(Arc::new(Reject(status))).call(req)
    }
}

struct Reject(StatusCode);

impl ErasedHandler for Reject {
    fn call(&self, _req: Request) -> BoxFuture {
        let status = self.0;
        Box::pin(async move { Response::status(status) })
    }
}

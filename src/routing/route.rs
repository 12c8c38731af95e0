//! Declarative route description, expanded at registration time.

use crate::extract::{Binder, Extractor};
use crate::http::Method;
use crate::middleware::MiddlewareRef;

use super::matchers::Matcher;
use super::{Handler, RouteEntry, RouterError};

/// Everything a route declares about itself, gathered fluently and expanded
/// into route-table entries by `Router::register`.
///
/// A route declaring several methods expands to **one entry per method**
/// rather than a single entry with an any-of matcher, so each entry's
/// matcher count keeps driving specificity ordering.
///
/// # Examples
///
/// ```
/// use junction::routing::Route;
///
/// let route = Route::get("/user/:id/?")
///     .produces(["application/json"])
///     .require_header("X-Api-Key");
/// ```
#[derive(Debug, Default)]
pub struct Route {
    pattern: String,
    methods: Vec<Method>,
    produces: Vec<String>,
    consumes: Vec<String>,
    host: Option<String>,
    required_headers: Vec<String>,
    middleware: Vec<MiddlewareRef>,
    extractors: Vec<Extractor>,
}

impl Route {
    /// Starts a route for the given path pattern with no method constraint.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Starts a `GET` route.
    pub fn get(pattern: impl Into<String>) -> Self {
        Self::new(pattern).method(Method::Get)
    }

    /// Starts a `POST` route.
    pub fn post(pattern: impl Into<String>) -> Self {
        Self::new(pattern).method(Method::Post)
    }

    /// Starts a `PUT` route.
    pub fn put(pattern: impl Into<String>) -> Self {
        Self::new(pattern).method(Method::Put)
    }

    /// Starts a `DELETE` route.
    pub fn delete(pattern: impl Into<String>) -> Self {
        Self::new(pattern).method(Method::Delete)
    }

    /// Starts a `PATCH` route.
    pub fn patch(pattern: impl Into<String>) -> Self {
        Self::new(pattern).method(Method::Patch)
    }

    /// Adds a method this route answers to. Each added method becomes its
    /// own route-table entry.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Declares the media types this route can produce, enabling `Accept`
    /// negotiation.
    #[must_use]
    pub fn produces<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces.extend(types.into_iter().map(Into::into));
        self
    }

    /// Declares the media types this route accepts as a request body,
    /// enabling the `Content-Type` check.
    #[must_use]
    pub fn consumes<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes.extend(types.into_iter().map(Into::into));
        self
    }

    /// Restricts the route to requests whose `Host` header matches the
    /// given regular expression.
    #[must_use]
    pub fn host(mut self, pattern: impl Into<String>) -> Self {
        self.host = Some(pattern.into());
        self
    }

    /// Requires a header to be present (any value).
    #[must_use]
    pub fn require_header(mut self, name: impl Into<String>) -> Self {
        self.required_headers.push(name.into());
        self
    }

    /// Appends a middleware reference to the route's guard chain.
    #[must_use]
    pub fn middleware(mut self, reference: MiddlewareRef) -> Self {
        self.middleware.push(reference);
        self
    }

    /// Appends an extractor to the route's binder chain.
    #[must_use]
    pub fn extract(mut self, extractor: Extractor) -> Self {
        self.extractors.push(extractor);
        self
    }

    // Expands this description into route-table entries, one per declared
    // method (or a single method-less entry). Matchers are built in a fixed
    // order — path, method, host, required headers, content type, accept —
    // so a path miss short-circuits before any cause-recording matcher runs.
    pub(crate) fn build_entries(self, handler: Handler) -> Result<Vec<RouteEntry>, RouterError> {
        let mut base: Vec<Matcher> = vec![Matcher::path(&self.pattern)?];

        // The method matcher slot sits right after the path; filled in per
        // entry below.
        let mut tail: Vec<Matcher> = Vec::new();
        if let Some(host) = &self.host {
            tail.push(Matcher::host(host)?);
        }
        for name in &self.required_headers {
            tail.push(Matcher::header_present(name.clone()));
        }
        if !self.consumes.is_empty() {
            tail.push(Matcher::content_type(self.consumes.clone())?);
        }
        if !self.produces.is_empty() {
            tail.push(Matcher::accept(self.produces.clone())?);
        }

        let binder = Binder::new(self.extractors);

        let mut entries = Vec::new();
        if self.methods.is_empty() {
            base.extend(tail);
            entries.push(RouteEntry {
                matchers: base,
                middleware: self.middleware,
                binder,
                handler,
            });
        } else {
            for method in self.methods {
                let mut matchers = base.clone();
                matchers.push(Matcher::method(method));
                matchers.extend(tail.iter().cloned());
                entries.push(RouteEntry {
                    matchers,
                    middleware: self.middleware.clone(),
                    binder: binder.clone(),
                    handler: handler.clone(),
                });
            }
        }

        Ok(entries)
    }
}

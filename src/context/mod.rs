//! Per-request context handed to middleware and handlers.
//!
//! A [`RouteContext`] is assembled by the router once a route entry has
//! fully matched: the request (shared, so fallthrough retries never copy
//! it), the captured path parameters, the media types settled by content
//! negotiation, and any arguments produced by the route's binder chain.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::Request;
use crate::extract::BoundArg;

/// Error for looking up a path parameter that was never captured.
///
/// This is a registration-logic bug (the pattern does not declare the
/// placeholder), not a client-input problem, so it is a hard failure.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("path parameter {name:?} was never captured")]
pub struct MissingParam {
    /// The parameter name that was looked up.
    pub name: String,
}

/// Path parameters captured by the matched route pattern.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    map: HashMap<String, String>,
}

impl PathParams {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a captured value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.map.insert(name.into(), value.into());
    }

    /// Returns a captured value, or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// Returns a captured value, failing hard when the name was never
    /// captured.
    pub fn require(&self, name: &str) -> Result<&str, MissingParam> {
        self.get(name).ok_or_else(|| MissingParam {
            name: name.to_owned(),
        })
    }

    /// Returns the number of captured parameters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes every captured value.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Everything a middleware guard or handler can see for one matched route.
pub struct RouteContext {
    request: Arc<Request>,
    params: PathParams,
    accepted: Option<String>,
    consumed: Option<String>,
    args: Vec<BoundArg>,
}

impl RouteContext {
    /// Creates a context around a shared request with nothing captured yet.
    pub fn new(request: Arc<Request>) -> Self {
        Self {
            request,
            params: PathParams::new(),
            accepted: None,
            consumed: None,
            args: Vec::new(),
        }
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    pub(crate) fn set_negotiated(&mut self, accepted: Option<String>, consumed: Option<String>) {
        self.accepted = accepted;
        self.consumed = consumed;
    }

    pub(crate) fn set_args(&mut self, args: Vec<BoundArg>) {
        self.args = args;
    }

    /// Returns the request this route matched.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the captured path parameters.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Shorthand for [`PathParams::get`].
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// The response media type settled by `Accept` negotiation, when the
    /// matched route declared produced types.
    pub fn accepted_type(&self) -> Option<&str> {
        self.accepted.as_deref()
    }

    /// The request media type matched against the route's consumed types,
    /// when the route declared any.
    pub fn consumed_type(&self) -> Option<&str> {
        self.consumed.as_deref()
    }

    /// Arguments produced by the route's binder chain, in extractor order.
    pub fn args(&self) -> &[BoundArg] {
        &self.args
    }

    /// Returns the `i`-th bound argument, if the binder produced one.
    pub fn arg(&self, i: usize) -> Option<&BoundArg> {
        self.args.get(i)
    }

    /// Deserializes the request body as JSON.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(self.request.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn make_request(raw: &[u8]) -> Arc<Request> {
        let (req, _) = Request::parse(raw).unwrap();
        Arc::new(req)
    }

    #[test]
    fn params_require_is_a_hard_failure() {
        let mut params = PathParams::new();
        params.insert("id", "42");
        assert_eq!(params.require("id"), Ok("42"));
        assert_eq!(
            params.require("slug"),
            Err(MissingParam {
                name: "slug".to_owned()
            })
        );
    }

    #[test]
    fn context_exposes_captures_and_negotiation() {
        let req = make_request(b"GET /u/7 HTTP/1.1\r\nHost: x\r\n\r\n");
        let mut ctx = RouteContext::new(req);

        let mut params = PathParams::new();
        params.insert("id", "7");
        ctx.set_params(params);
        ctx.set_negotiated(Some("application/json".to_owned()), None);

        assert_eq!(ctx.param("id"), Some("7"));
        assert_eq!(ctx.accepted_type(), Some("application/json"));
        assert_eq!(ctx.consumed_type(), None);
    }

    #[test]
    fn json_body_decodes() {
        #[derive(Deserialize)]
        struct Payload {
            name: String,
        }

        let raw = b"POST /in HTTP/1.1\r\nHost: x\r\nContent-Length: 15\r\n\r\n{\"name\":\"tern\"}";
        let ctx = RouteContext::new(make_request(raw));
        let payload: Payload = ctx.json().unwrap();
        assert_eq!(payload.name, "tern");
    }
}

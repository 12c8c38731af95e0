//! Argument binding — explicit extractor chains built at registration time.
//!
//! Instead of inspecting handler signatures at runtime, a route declares an
//! ordered list of [`Extractor`] values when it is registered. The resulting
//! [`Binder`] is invoked once per matched request and produces the bound
//! arguments the handler reads from its context, in declaration order.
//!
//! A binder failure means the registration and the pattern disagree (for
//! example an extractor names a placeholder the pattern never captures), so
//! binding fails hard and the request is aborted rather than handled with a
//! silent default.

use bytes::Bytes;
use thiserror::Error;

use crate::Request;
use crate::context::{MissingParam, PathParams};

/// One step of a binder chain: where to pull the next argument from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    /// A named capture from the matched path pattern.
    PathParam(String),
    /// A query-string parameter.
    QueryParam(String),
    /// The first value of a request header.
    Header(String),
    /// The buffered request body.
    Body,
}

/// An argument produced by one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundArg {
    /// Text pulled from the path, query, or a header.
    Text(String),
    /// The raw request body.
    Bytes(Bytes),
}

impl BoundArg {
    /// Returns the textual form, or `None` for a byte argument.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Bytes(_) => None,
        }
    }

    /// Returns the argument as bytes regardless of variant.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Bytes(b) => b.as_ref(),
        }
    }
}

/// Binding failures. All of them indicate a registration bug, not bad
/// client input, and abort the request.
#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    MissingPathParam(#[from] MissingParam),

    #[error("query parameter {name:?} is required but absent")]
    MissingQueryParam { name: String },

    #[error("header {name:?} is required but absent")]
    MissingHeader { name: String },
}

/// An ordered extractor chain, assembled once at registration.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    extractors: Vec<Extractor>,
}

impl Binder {
    /// Builds a binder from extractor steps.
    pub fn new(extractors: Vec<Extractor>) -> Self {
        Self { extractors }
    }

    /// Returns `true` when the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Walks the chain against a matched request, producing one argument
    /// per step.
    pub fn bind(
        &self,
        request: &Request,
        params: &PathParams,
    ) -> Result<Vec<BoundArg>, BindError> {
        let mut args = Vec::with_capacity(self.extractors.len());
        for step in &self.extractors {
            let arg = match step {
                Extractor::PathParam(name) => BoundArg::Text(params.require(name)?.to_owned()),
                Extractor::QueryParam(name) => {
                    let value = request.query_param(name).ok_or_else(|| {
                        BindError::MissingQueryParam { name: name.clone() }
                    })?;
                    BoundArg::Text(value.to_owned())
                }
                Extractor::Header(name) => {
                    let value = request
                        .headers()
                        .get(name)
                        .ok_or_else(|| BindError::MissingHeader { name: name.clone() })?;
                    BoundArg::Text(value.to_owned())
                }
                Extractor::Body => BoundArg::Bytes(request.body().clone()),
            };
            args.push(arg);
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(raw: &[u8]) -> Request {
        let (req, _) = Request::parse(raw).unwrap();
        req
    }

    #[test]
    fn binds_each_source_in_order() {
        let req = make_request(
            b"POST /u/9?page=3 HTTP/1.1\r\nHost: x\r\nX-Token: t0\r\nContent-Length: 3\r\n\r\nabc",
        );
        let mut params = PathParams::new();
        params.insert("id", "9");

        let binder = Binder::new(vec![
            Extractor::PathParam("id".to_owned()),
            Extractor::QueryParam("page".to_owned()),
            Extractor::Header("x-token".to_owned()),
            Extractor::Body,
        ]);

        let args = binder.bind(&req, &params).unwrap();
        assert_eq!(args[0].as_text(), Some("9"));
        assert_eq!(args[1].as_text(), Some("3"));
        assert_eq!(args[2].as_text(), Some("t0"));
        assert_eq!(args[3].as_bytes(), b"abc");
    }

    #[test]
    fn missing_path_param_fails_hard() {
        let req = make_request(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        let binder = Binder::new(vec![Extractor::PathParam("id".to_owned())]);
        let err = binder.bind(&req, &PathParams::new()).unwrap_err();
        assert!(matches!(err, BindError::MissingPathParam(_)));
    }

    #[test]
    fn missing_header_fails_hard() {
        let req = make_request(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        let binder = Binder::new(vec![Extractor::Header("authorization".to_owned())]);
        let err = binder.bind(&req, &PathParams::new()).unwrap_err();
        assert!(matches!(err, BindError::MissingHeader { .. }));
    }

    #[test]
    fn empty_chain_binds_nothing() {
        let req = make_request(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        let binder = Binder::default();
        assert!(binder.is_empty());
        assert!(binder.bind(&req, &PathParams::new()).unwrap().is_empty());
    }
}

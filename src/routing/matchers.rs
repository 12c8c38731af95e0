//! Route conditions and the per-attempt match context.
//!
//! Every route entry is a conjunction of [`Matcher`]s. Matchers are compiled
//! once at registration and hold no per-request state; everything mutable
//! during one routing attempt lives in the [`MatchContext`].

use regex::Regex;

use super::RouterError;
use super::path::PathPattern;
use crate::context::PathParams;
use crate::http::Method;
use crate::negotiation::{MimeMatcher, parse_quality_list};
use crate::Request;

/// Why the request failed to match, used to pick the fallback status code
/// when no route entry matches at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonMatchCause {
    /// A route matched on path but not on method → 405.
    MethodMismatch,
    /// A required header was absent → 400.
    MissingHeader,
    /// Nothing the route produces satisfies the `Accept` header → 406.
    NotAcceptable,
}

/// Mutable scratch state for one call to `Router::route`.
///
/// The non-match cause is sticky for the whole attempt: the first cause any
/// tried entry records is kept, and later entries never overwrite it.
/// Captured parameters and negotiated types are per-entry and reset each
/// time a new entry is tried.
#[derive(Debug, Default)]
pub struct MatchContext {
    cause: Option<NonMatchCause>,
    params: PathParams,
    accepted: Option<String>,
    consumed: Option<String>,
}

impl MatchContext {
    /// Creates a fresh context for one routing attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-entry state before trying the next route entry. The
    /// sticky cause survives.
    pub fn begin_entry(&mut self) {
        self.params.clear();
        self.accepted = None;
        self.consumed = None;
    }

    /// Records a non-match cause unless an earlier entry already set one.
    /// The first-seen cause is the one the fallback status reports.
    pub fn record_cause(&mut self, cause: NonMatchCause) {
        if self.cause.is_none() {
            self.cause = Some(cause);
        }
    }

    /// Returns the sticky cause, if any entry recorded one.
    pub fn cause(&self) -> Option<NonMatchCause> {
        self.cause
    }

    /// Returns the parameters captured by the current entry's path matcher.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Moves the captured parameters out, leaving the context empty.
    pub fn take_params(&mut self) -> PathParams {
        std::mem::take(&mut self.params)
    }

    /// The media type negotiated against the entry's produced types.
    pub fn accepted(&self) -> Option<&str> {
        self.accepted.as_deref()
    }

    /// The request media type matched against the entry's consumed types.
    pub fn consumed(&self) -> Option<&str> {
        self.consumed.as_deref()
    }

    pub(crate) fn take_negotiated(&mut self) -> (Option<String>, Option<String>) {
        (self.accepted.take(), self.consumed.take())
    }

    fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    fn set_accepted(&mut self, resolved: String) {
        self.accepted = Some(resolved);
    }

    fn set_consumed(&mut self, resolved: String) {
        self.consumed = Some(resolved);
    }
}

/// One condition of a route entry.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Compiled path pattern with named captures.
    Path(PathPattern),
    /// Exact method comparison; custom methods compare by raw string.
    Method(Method),
    /// The named header must be present (any value).
    HeaderPresent(String),
    /// The `Host` header must match this pattern. An absent header is an
    /// ordinary no-match — never a 4xx.
    Host(Regex),
    /// `Accept` negotiation against the entry's produced types.
    Accept(MimeMatcher),
    /// `Content-Type` check against the entry's consumed types.
    ContentType(MimeMatcher),
}

impl Matcher {
    /// Compiles a path matcher from a pattern string.
    pub fn path(pattern: &str) -> Result<Self, RouterError> {
        Ok(Self::Path(PathPattern::compile(pattern)?))
    }

    /// Builds a method matcher.
    pub fn method(method: Method) -> Self {
        Self::Method(method)
    }

    /// Builds a header-presence matcher.
    pub fn header_present(name: impl Into<String>) -> Self {
        Self::HeaderPresent(name.into())
    }

    /// Compiles a host matcher from a regular expression.
    pub fn host(pattern: &str) -> Result<Self, RouterError> {
        let regex = Regex::new(pattern).map_err(|source| RouterError::HostPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self::Host(regex))
    }

    /// Compiles an `Accept` matcher from the types a route produces.
    pub fn accept<I, S>(produces: I) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::Accept(MimeMatcher::new(produces)?))
    }

    /// Compiles a `Content-Type` matcher from the types a route consumes.
    pub fn content_type<I, S>(consumes: I) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::ContentType(MimeMatcher::new(consumes)?))
    }

    /// Evaluates this condition against a request, recording captures,
    /// negotiated types, and non-match causes in `ctx`.
    ///
    /// # Errors
    ///
    /// Only the `Accept` arm can fail, on a malformed quality value in the
    /// request header. The failure aborts the routing attempt.
    pub fn matches(&self, request: &Request, ctx: &mut MatchContext) -> Result<bool, RouterError> {
        match self {
            Self::Path(pattern) => match pattern.match_path(request.path()) {
                Some(params) => {
                    ctx.set_params(params);
                    Ok(true)
                }
                None => Ok(false),
            },

            Self::Method(expected) => {
                if request.method() == expected {
                    Ok(true)
                } else {
                    ctx.record_cause(NonMatchCause::MethodMismatch);
                    Ok(false)
                }
            }

            Self::HeaderPresent(name) => {
                if request.headers().contains(name) {
                    Ok(true)
                } else {
                    ctx.record_cause(NonMatchCause::MissingHeader);
                    Ok(false)
                }
            }

            Self::Host(pattern) => Ok(request
                .headers()
                .get("host")
                .is_some_and(|host| pattern.is_match(host))),

            Self::Accept(produces) => {
                let Some(raw) = request.headers().get("accept") else {
                    ctx.record_cause(NonMatchCause::NotAcceptable);
                    return Ok(false);
                };
                for item in parse_quality_list(raw)? {
                    if let Some(resolved) = produces.resolve(&item.value) {
                        ctx.set_accepted(resolved);
                        return Ok(true);
                    }
                }
                ctx.record_cause(NonMatchCause::NotAcceptable);
                Ok(false)
            }

            Self::ContentType(consumes) => {
                let Some(raw) = request.headers().get("content-type") else {
                    return Ok(false);
                };
                let media = raw.split(';').next().unwrap_or("").trim();
                match consumes.resolve(media) {
                    Some(resolved) => {
                        ctx.set_consumed(resolved);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}

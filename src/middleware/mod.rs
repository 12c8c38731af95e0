//! Middleware guards — short-circuiting checks chained in front of handlers.
//!
//! A route's guard chain runs after its matchers pass and before its
//! handler. Each guard inspects the matched [`RouteContext`] and either
//! returns `None` ("continue") or `Some(response)`, which answers the
//! request immediately and skips every later guard and the handler.
//!
//! ## Core types
//!
//! - [`MiddlewareFn`] — type-erased, cheaply-cloneable guard function.
//! - [`MiddlewareRef`] — how a route refers to a guard: by registry name or
//!   inline.
//! - [`MiddlewareRegistry`] — the router-owned name → guard table, populated
//!   during startup and validated before serving.
//! - [`Middleware`] — trait form for guards with configuration state;
//!   convert with [`from_middleware`].
//! - [`RequestLog`] — built-in guard that logs each matched request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::RouteContext;
use crate::http::Response;
use crate::routing::RouterError;

/// A type-erased, reference-counted guard function.
///
/// Guards run synchronously inside the dispatch loop; anything that needs
/// to await belongs in the handler. The [`Arc`] makes a guard cheap to
/// share between the registry and any number of route entries.
///
/// ```
/// use std::sync::Arc;
/// use junction::http::{Response, StatusCode};
/// use junction::middleware::MiddlewareFn;
///
/// let gate: MiddlewareFn = Arc::new(|ctx| {
///     if ctx.request().headers().contains("authorization") {
///         None
///     } else {
///         Some(Response::new(StatusCode::Unauthorized))
///     }
/// });
/// ```
pub type MiddlewareFn = Arc<dyn Fn(&RouteContext) -> Option<Response> + Send + Sync + 'static>;

/// How a route entry refers to one guard in its chain.
///
/// Named references resolve against the router's [`MiddlewareRegistry`]
/// when the route is dispatched; inline references carry the guard
/// directly.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// Look the guard up by name in the registry.
    Named(String),
    /// Invoke this guard directly.
    Inline(MiddlewareFn),
}

impl MiddlewareRef {
    /// Builds a named reference.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Builds an inline reference from a plain closure.
    pub fn inline<F>(guard: F) -> Self
    where
        F: Fn(&RouteContext) -> Option<Response> + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(guard))
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

/// The name → guard table owned by a router.
///
/// Populated through `Router::add_middleware` during single-threaded
/// startup; `Router::sort_routes` validates every named reference against
/// it, after which it is only read.
#[derive(Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, MiddlewareFn>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guard under a unique name.
    ///
    /// # Errors
    ///
    /// [`RouterError::DuplicateMiddleware`] when the name is already taken;
    /// registering the same name twice is a startup bug, not something to
    /// resolve by overwriting.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        guard: MiddlewareFn,
    ) -> Result<(), RouterError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RouterError::DuplicateMiddleware { name });
        }
        self.entries.insert(name, guard);
        Ok(())
    }

    /// Looks a guard up by name.
    pub fn get(&self, name: &str) -> Option<&MiddlewareFn> {
        self.entries.get(name)
    }

    /// Returns `true` when a guard is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of registered guards.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trait form of a guard, for middleware that carries configuration.
///
/// Implementations must be `Send + Sync`; the router shares them across
/// per-connection tasks. Convert to a [`MiddlewareFn`] with
/// [`from_middleware`].
pub trait Middleware: Send + Sync {
    /// Inspects a matched request. `Some(response)` answers it immediately;
    /// `None` lets the chain continue.
    fn handle(&self, ctx: &RouteContext) -> Option<Response>;
}

/// Converts a [`Middleware`] implementation into a [`MiddlewareFn`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use junction::middleware::{RequestLog, from_middleware};
///
/// let guard = from_middleware(Arc::new(RequestLog));
/// ```
pub fn from_middleware<M>(middleware: Arc<M>) -> MiddlewareFn
where
    M: Middleware + 'static,
{
    Arc::new(move |ctx: &RouteContext| middleware.handle(ctx))
}

/// Built-in guard that logs each matched request.
///
/// Emits one `tracing::info!` record with the method, path, and the media
/// type settled by negotiation (when the route declared produced types).
/// Never short-circuits.
pub struct RequestLog;

impl Middleware for RequestLog {
    fn handle(&self, ctx: &RouteContext) -> Option<Response> {
        tracing::info!(
            method = %ctx.request().method(),
            path = %ctx.request().path(),
            accepted = ctx.accepted_type().unwrap_or("-"),
            "request matched"
        );
        None
    }
}

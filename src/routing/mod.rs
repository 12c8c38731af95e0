//! Request routing — the match-execute-or-fallback decision procedure.
//!
//! A [`Router`] owns an ordered table of route entries. Each entry is a
//! conjunction of [`Matcher`]s plus a guard chain and a handler. Dispatch
//! walks the table in specificity order (most constrained entries first),
//! evaluates each entry's matchers as a short-circuiting AND, and on a full
//! match runs the guard chain and then the handler. Handlers answer with a
//! tri-state [`Outcome`] so a matched route can still decline and let
//! routing continue — the mechanism behind non-exclusive static-file
//! serving.
//!
//! When nothing matches, the most informative non-match cause seen during
//! the attempt picks the response status: `405` for a method mismatch,
//! `400` for a missing required header, `406` for unsatisfiable `Accept`,
//! and `404` otherwise — with per-status toggles in [`RouterConfig`] to
//! degrade each to a plain `404`.

use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use crate::context::RouteContext;
use crate::extract::{BindError, Binder};
use crate::http::{Response, StatusCode};
use crate::middleware::{MiddlewareFn, MiddlewareRef, MiddlewareRegistry};
use crate::negotiation::NegotiationError;
use crate::Request;

pub mod matchers;
pub mod path;
pub mod route;

pub use matchers::{MatchContext, Matcher, NonMatchCause};
pub use path::{PathPattern, PatternError};
pub use route::Route;

/// Errors raised by registration and dispatch.
///
/// Registration-time variants (`Pattern`, `HostPattern`, pattern problems
/// inside `Negotiation`, `DuplicateMiddleware`, `UnknownMiddleware`) are
/// fatal configuration errors. At dispatch time only two things can fail,
/// and both abort the request: a malformed quality value in the `Accept`
/// header (client input, mapped to `400` by the server) and a binder
/// failure (a registration bug, mapped to `500`).
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("host pattern {pattern:?} did not compile: {source}")]
    HostPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("middleware {name:?} is already registered")]
    DuplicateMiddleware { name: String },

    #[error("route references unknown middleware {name:?}")]
    UnknownMiddleware { name: String },

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// The tri-state result of running a handler.
///
/// Exactly one variant applies, and a produced response always carries a
/// value — the type makes the "response with nothing in it" state
/// unrepresentable.
pub enum Outcome {
    /// The handler produced a response; routing is finished.
    Response(Response),
    /// The handler matched but explicitly declines to answer; the caller
    /// sends nothing on the wire.
    NoResponse,
    /// The handler declines and routing continues with the next entry.
    /// Used by non-exclusive static-file serving to fall through to less
    /// specific routes for the same path.
    TryNext,
}

/// Type-erased async handler stored in a route entry.
///
/// Built from any `Fn(RouteContext) -> impl Future<Output = Outcome>` via
/// [`IntoHandler`]; never constructed by hand.
pub type Handler =
    Arc<dyn Fn(RouteContext) -> Pin<Box<dyn Future<Output = Outcome> + Send>> + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Blanket-implemented for any compatible closure so registration sites
/// take `impl IntoHandler` instead of repeating the full bound.
pub trait IntoHandler: Send + Sync + 'static {
    /// Calls the handler, boxing the returned future.
    fn call(&self, ctx: RouteContext) -> Pin<Box<dyn Future<Output = Outcome> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(RouteContext) -> F + Send + Sync + 'static,
    F: Future<Output = Outcome> + Send + 'static,
{
    fn call(&self, ctx: RouteContext) -> Pin<Box<dyn Future<Output = Outcome> + Send>> {
        Box::pin((self)(ctx))
    }
}

/// Per-deployment toggles for the fallback status mapping.
///
/// Each flag degrades one specific status to a plain `404 Not Found`,
/// for deployments that prefer not to reveal which paths exist. There is
/// no toggle for `404` itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterConfig {
    /// Answer `404` instead of `405 Method Not Allowed`.
    pub method_not_allowed_as_not_found: bool,
    /// Answer `404` instead of `400 Bad Request` for a missing required header.
    pub missing_header_as_not_found: bool,
    /// Answer `404` instead of `406 Not Acceptable`.
    pub not_acceptable_as_not_found: bool,
}

// One row of the route table: conditions, guard chain, binder, handler.
// Immutable once `sort_routes` has run.
pub(crate) struct RouteEntry {
    pub(crate) matchers: Vec<Matcher>,
    pub(crate) middleware: Vec<MiddlewareRef>,
    pub(crate) binder: Binder,
    pub(crate) handler: Handler,
}

/// The route table and its dispatch loop.
///
/// Build during single-threaded startup: register routes and middleware,
/// call [`sort_routes`](Router::sort_routes) once, then share the router
/// freely — dispatch takes `&self`, allocates its scratch state per call,
/// and never blocks on I/O itself.
///
/// # Examples
///
/// ```
/// use junction::routing::{Outcome, Route, Router};
/// use junction::http::{Response, StatusCode};
///
/// let mut router = Router::new();
/// router
///     .register(Route::get("/ping"), |_ctx| async {
///         Outcome::Response(Response::new(StatusCode::Ok).body("pong"))
///     })
///     .unwrap();
/// router.sort_routes().unwrap();
/// ```
#[derive(Default)]
pub struct Router {
    entries: Vec<RouteEntry>,
    registry: MiddlewareRegistry,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of route entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one entry from raw parts: a matcher conjunction, a guard
    /// chain, and a handler.
    pub fn add_route(
        &mut self,
        matchers: Vec<Matcher>,
        middleware: Vec<MiddlewareRef>,
        handler: impl IntoHandler,
    ) {
        let handler: Handler = Arc::new(move |ctx| handler.call(ctx));
        self.entries.push(RouteEntry {
            matchers,
            middleware,
            binder: Binder::default(),
            handler,
        });
    }

    /// Expands a [`Route`] description into entries — one per declared
    /// method — and appends them.
    ///
    /// # Errors
    ///
    /// Any pattern that fails to compile (path, host, media types) is a
    /// fatal registration error.
    pub fn register(&mut self, route: Route, handler: impl IntoHandler) -> Result<(), RouterError> {
        let handler: Handler = Arc::new(move |ctx| handler.call(ctx));
        let entries = route.build_entries(handler)?;
        self.entries.extend(entries);
        Ok(())
    }

    /// Registers a named middleware in the router-owned registry.
    ///
    /// # Errors
    ///
    /// [`RouterError::DuplicateMiddleware`] when the name is taken.
    pub fn add_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: MiddlewareFn,
    ) -> Result<(), RouterError> {
        self.registry.insert(name, middleware)?;
        Ok(())
    }

    /// Orders the table by specificity and validates it. Call once, after
    /// all registration and before serving traffic.
    ///
    /// Entries are sorted descending by matcher count with a stable sort,
    /// so equally-specific entries keep registration order; calling this
    /// again is a no-op. Every named middleware reference is then checked
    /// against the registry, making a dangling name a startup failure
    /// instead of a silently skipped guard.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownMiddleware`] naming the first dangling
    /// reference.
    pub fn sort_routes(&mut self) -> Result<(), RouterError> {
        self.entries
            .sort_by_key(|entry| std::cmp::Reverse(entry.matchers.len()));

        for entry in &self.entries {
            for reference in &entry.middleware {
                if let MiddlewareRef::Named(name) = reference {
                    if !self.registry.contains(name) {
                        return Err(RouterError::UnknownMiddleware { name: name.clone() });
                    }
                }
            }
        }
        Ok(())
    }

    /// Routes one request: the match-execute-or-fallback decision.
    ///
    /// Walks the sorted table; for each entry the matchers run as a
    /// short-circuiting AND over a shared [`MatchContext`]. On a full match
    /// the guard chain runs first — the first guard returning a response
    /// short-circuits the entire route — then the handler's [`Outcome`]
    /// decides: respond, stay silent (`Ok(None)`), or fall through to the
    /// next entry.
    ///
    /// When the table is exhausted the sticky non-match cause picks the
    /// fallback status, subject to the `config` degrade toggles.
    ///
    /// # Errors
    ///
    /// A malformed `Accept` quality value or a binder failure aborts the
    /// attempt; the server maps these to `400` and `500` respectively.
    pub async fn route(
        &self,
        request: Request,
        config: &RouterConfig,
    ) -> Result<Option<Response>, RouterError> {
        let request = Arc::new(request);
        let mut ctx = MatchContext::new();

        'entries: for entry in &self.entries {
            ctx.begin_entry();
            for matcher in &entry.matchers {
                if !matcher.matches(&request, &mut ctx)? {
                    continue 'entries;
                }
            }

            let mut route_ctx = RouteContext::new(Arc::clone(&request));
            let params = ctx.take_params();
            let args = entry.binder.bind(&request, &params)?;
            route_ctx.set_params(params);
            let (accepted, consumed) = ctx.take_negotiated();
            route_ctx.set_negotiated(accepted, consumed);
            route_ctx.set_args(args);

            for reference in &entry.middleware {
                let guard = match reference {
                    MiddlewareRef::Inline(guard) => guard,
                    MiddlewareRef::Named(name) => match self.registry.get(name) {
                        Some(guard) => guard,
                        None => {
                            // Unreachable after a successful sort_routes.
                            tracing::warn!(
                                middleware = %name,
                                "named middleware not registered — skipping"
                            );
                            continue;
                        }
                    },
                };
                if let Some(response) = guard(&route_ctx) {
                    tracing::debug!(path = %request.path(), "guard short-circuited route");
                    return Ok(Some(response));
                }
            }

            match (entry.handler)(route_ctx).await {
                Outcome::Response(response) => return Ok(Some(response)),
                Outcome::NoResponse => return Ok(None),
                Outcome::TryNext => {
                    tracing::debug!(path = %request.path(), "handler passed — trying next entry");
                    continue;
                }
            }
        }

        tracing::debug!(
            method = %request.method(),
            path = %request.path(),
            cause = ?ctx.cause(),
            "no route matched"
        );
        Ok(Some(fallback_response(ctx.cause(), config)))
    }
}

// Maps the sticky non-match cause to the fallback response, honoring the
// per-status degrade toggles. A cause-less miss is always a plain 404.
fn fallback_response(cause: Option<NonMatchCause>, config: &RouterConfig) -> Response {
    let status = match cause {
        Some(NonMatchCause::MethodMismatch) if !config.method_not_allowed_as_not_found => {
            StatusCode::MethodNotAllowed
        }
        Some(NonMatchCause::MissingHeader) if !config.missing_header_as_not_found => {
            StatusCode::BadRequest
        }
        Some(NonMatchCause::NotAcceptable) if !config.not_acceptable_as_not_found => {
            StatusCode::NotAcceptable
        }
        _ => StatusCode::NotFound,
    };
    Response::new(status).body(status.reason())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::extract::Extractor;
    use crate::http::Method;

    fn make_request(raw: &str) -> Request {
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    fn ok_with(body: &'static str) -> impl IntoHandler {
        move |_ctx: RouteContext| async move {
            Outcome::Response(Response::new(StatusCode::Ok).body(body))
        }
    }

    async fn dispatch(router: &Router, raw: &str) -> Option<Response> {
        router
            .route(make_request(raw), &RouterConfig::default())
            .await
            .unwrap()
    }

    fn body_text(response: Response) -> String {
        String::from_utf8(response.body_ref().to_vec()).unwrap()
    }

    // ── specificity ordering ──────────────────────────────────────────────────

    #[tokio::test]
    async fn more_constrained_entry_tried_first_regardless_of_registration_order() {
        let mut router = Router::new();
        // Less specific first: {Path} only.
        router.register(Route::new("/item"), ok_with("loose")).unwrap();
        // More specific second: {Path, Method}.
        router.register(Route::get("/item"), ok_with("strict")).unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /item HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(body_text(res), "strict");
    }

    #[tokio::test]
    async fn equal_specificity_keeps_registration_order_and_sort_is_idempotent() {
        let mut router = Router::new();
        router.register(Route::get("/a"), ok_with("first")).unwrap();
        router.register(Route::get("/a"), ok_with("second")).unwrap();
        router.sort_routes().unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /a HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(body_text(res), "first");
    }

    // ── outcome protocol ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn try_next_falls_through_to_less_specific_entry() {
        let mut router = Router::new();
        router.register(Route::new("/file"), ok_with("fallback")).unwrap();
        router
            .register(Route::get("/file"), |_ctx: RouteContext| async {
                Outcome::TryNext
            })
            .unwrap();
        router.sort_routes().unwrap();

        // The strict entry runs first, declines, and the loose one answers.
        let res = dispatch(&router, "GET /file HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(body_text(res), "fallback");
    }

    #[tokio::test]
    async fn no_response_returns_none() {
        let mut router = Router::new();
        router
            .register(Route::get("/quiet"), |_ctx: RouteContext| async {
                Outcome::NoResponse
            })
            .unwrap();
        router.sort_routes().unwrap();

        assert!(dispatch(&router, "GET /quiet HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .is_none());
    }

    // ── fallback statuses ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn wrong_method_on_existing_path_is_405() {
        let mut router = Router::new();
        router.register(Route::get("/thing"), ok_with("ok")).unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "POST /thing HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::MethodNotAllowed);
    }

    #[tokio::test]
    async fn method_mismatch_degrades_to_404_when_configured() {
        let mut router = Router::new();
        router.register(Route::get("/thing"), ok_with("ok")).unwrap();
        router.sort_routes().unwrap();

        let config = RouterConfig {
            method_not_allowed_as_not_found: true,
            ..RouterConfig::default()
        };
        let res = router
            .route(
                make_request("POST /thing HTTP/1.1\r\nHost: x\r\n\r\n"),
                &config,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn missing_required_header_is_400_with_404_toggle() {
        let mut router = Router::new();
        router
            .register(
                Route::get("/secure").require_header("X-Api-Key"),
                ok_with("ok"),
            )
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /secure HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BadRequest);

        let config = RouterConfig {
            missing_header_as_not_found: true,
            ..RouterConfig::default()
        };
        let res = router
            .route(
                make_request("GET /secure HTTP/1.1\r\nHost: x\r\n\r\n"),
                &config,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn unsatisfiable_accept_is_406_with_404_toggle() {
        let mut router = Router::new();
        router
            .register(
                Route::get("/data").produces(["application/json"]),
                ok_with("ok"),
            )
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(
            &router,
            "GET /data HTTP/1.1\r\nHost: x\r\nAccept: image/png\r\n\r\n",
        )
        .await
        .unwrap();
        assert_eq!(res.status(), StatusCode::NotAcceptable);

        let config = RouterConfig {
            not_acceptable_as_not_found: true,
            ..RouterConfig::default()
        };
        let res = router
            .route(
                make_request("GET /data HTTP/1.1\r\nHost: x\r\nAccept: image/png\r\n\r\n"),
                &config,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn unknown_path_is_always_404() {
        let router = Router::new();
        let res = dispatch(&router, "GET /nowhere HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    // ── negotiation through the table ─────────────────────────────────────────

    #[tokio::test]
    async fn accepted_type_visible_to_handler() {
        let mut router = Router::new();
        router
            .register(
                Route::get("/report").produces(["application/json", "text/x-custom"]),
                |ctx: RouteContext| async move {
                    let negotiated = ctx.accepted_type().unwrap_or("none").to_owned();
                    Outcome::Response(Response::new(StatusCode::Ok).body(negotiated))
                },
            )
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(
            &router,
            "GET /report HTTP/1.1\r\nHost: x\r\nAccept: text/*;q=0.5, application/json;q=0.9\r\n\r\n",
        )
        .await
        .unwrap();
        assert_eq!(body_text(res), "application/json");
    }

    #[tokio::test]
    async fn malformed_accept_aborts_the_attempt() {
        let mut router = Router::new();
        router
            .register(
                Route::get("/data").produces(["application/json"]),
                ok_with("ok"),
            )
            .unwrap();
        router.sort_routes().unwrap();

        let result = router
            .route(
                make_request("GET /data HTTP/1.1\r\nHost: x\r\nAccept: a/b;q=nope\r\n\r\n"),
                &RouterConfig::default(),
            )
            .await;
        assert!(matches!(
            result,
            Err(RouterError::Negotiation(
                NegotiationError::MalformedQuality { .. }
            ))
        ));
    }

    // ── guard chain ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn first_guard_response_short_circuits_rest_of_route() {
        let handler_hits = Arc::new(AtomicUsize::new(0));
        let later_guard_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&handler_hits);
        let later = Arc::clone(&later_guard_hits);

        let deny: MiddlewareFn = Arc::new(|_ctx| {
            Some(Response::new(StatusCode::Unauthorized).body("denied"))
        });
        let count: MiddlewareFn = Arc::new(move |_ctx| {
            later.fetch_add(1, Ordering::SeqCst);
            None
        });

        let mut router = Router::new();
        router
            .register(
                Route::get("/admin")
                    .middleware(MiddlewareRef::Inline(deny))
                    .middleware(MiddlewareRef::Inline(count)),
                move |_ctx: RouteContext| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Outcome::Response(Response::new(StatusCode::Ok))
                    }
                },
            )
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /admin HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::Unauthorized);
        assert_eq!(handler_hits.load(Ordering::SeqCst), 0);
        assert_eq!(later_guard_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn named_middleware_resolves_through_registry() {
        let mut router = Router::new();
        router
            .add_middleware(
                "gate",
                Arc::new(|ctx| {
                    if ctx.request().headers().contains("authorization") {
                        None
                    } else {
                        Some(Response::new(StatusCode::Unauthorized))
                    }
                }),
            )
            .unwrap();
        router
            .register(
                Route::get("/private").middleware(MiddlewareRef::named("gate")),
                ok_with("secret"),
            )
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /private HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::Unauthorized);

        let res = dispatch(
            &router,
            "GET /private HTTP/1.1\r\nHost: x\r\nAuthorization: Bearer t\r\n\r\n",
        )
        .await
        .unwrap();
        assert_eq!(body_text(res), "secret");
    }

    #[test]
    fn duplicate_middleware_name_is_a_registration_error() {
        let mut router = Router::new();
        router.add_middleware("m", Arc::new(|_| None)).unwrap();
        let err = router.add_middleware("m", Arc::new(|_| None)).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateMiddleware { .. }));
    }

    #[test]
    fn sort_routes_rejects_dangling_named_middleware() {
        let mut router = Router::new();
        router
            .register(
                Route::get("/x").middleware(MiddlewareRef::named("ghost")),
                |_ctx: RouteContext| async { Outcome::NoResponse },
            )
            .unwrap();
        let err = router.sort_routes().unwrap_err();
        assert!(matches!(
            err,
            RouterError::UnknownMiddleware { ref name } if name == "ghost"
        ));
    }

    // ── registration expansion ────────────────────────────────────────────────

    #[tokio::test]
    async fn multi_method_route_expands_to_one_entry_per_method() {
        let mut router = Router::new();
        router
            .register(
                Route::new("/both").method(Method::Get).method(Method::Post),
                ok_with("either"),
            )
            .unwrap();
        assert_eq!(router.len(), 2);
        router.sort_routes().unwrap();

        for raw in [
            "GET /both HTTP/1.1\r\nHost: x\r\n\r\n",
            "POST /both HTTP/1.1\r\nHost: x\r\n\r\n",
        ] {
            let res = dispatch(&router, raw).await.unwrap();
            assert_eq!(res.status(), StatusCode::Ok);
        }
    }

    // ── binder ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn bound_args_reach_the_handler_in_order() {
        let mut router = Router::new();
        router
            .register(
                Route::get("/user/:id")
                    .extract(Extractor::PathParam("id".to_owned()))
                    .extract(Extractor::Header("host".to_owned())),
                |ctx: RouteContext| async move {
                    let id = ctx.arg(0).and_then(|a| a.as_text()).unwrap_or("").to_owned();
                    let host = ctx.arg(1).and_then(|a| a.as_text()).unwrap_or("").to_owned();
                    Outcome::Response(Response::new(StatusCode::Ok).body(format!("{id}@{host}")))
                },
            )
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /user/7 HTTP/1.1\r\nHost: api\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(body_text(res), "7@api");
    }

    #[tokio::test]
    async fn binder_failure_aborts_the_request() {
        let mut router = Router::new();
        // The extractor names a placeholder the pattern never captures.
        router
            .register(
                Route::get("/user/:id").extract(Extractor::PathParam("slug".to_owned())),
                ok_with("ok"),
            )
            .unwrap();
        router.sort_routes().unwrap();

        let result = router
            .route(
                make_request("GET /user/7 HTTP/1.1\r\nHost: x\r\n\r\n"),
                &RouterConfig::default(),
            )
            .await;
        assert!(matches!(result, Err(RouterError::Bind(_))));
    }

    // ── sticky cause across entries ───────────────────────────────────────────

    #[tokio::test]
    async fn cause_from_earlier_entry_survives_later_entries() {
        let mut router = Router::new();
        // Most specific: method matcher fails first and records the cause.
        router.register(Route::post("/mix"), ok_with("post")).unwrap();
        // Less specific: missing-header matcher would record a different
        // cause, but the earlier one is sticky.
        router
            .register(Route::new("/mix").require_header("X-Later"), ok_with("hdr"))
            .unwrap();
        router.sort_routes().unwrap();

        let res = dispatch(&router, "GET /mix HTTP/1.1\r\nHost: x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::MethodNotAllowed);
    }
}

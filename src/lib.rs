//! # junction
//!
//! An async HTTP/1.1 server framework whose core is a request-routing and
//! content-negotiation engine: compiled path patterns with named captures,
//! quality-value-weighted `Accept` negotiation with wildcard media types,
//! specificity-ordered route tables, guard chains, and a tri-state handler
//! outcome that lets a matched route decline and fall through.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use junction::http::{Response, StatusCode};
//! use junction::routing::{Outcome, Route, Router, RouterConfig};
//! use junction::server::Server;
//! use junction::RouteContext;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!
//!     router.register(Route::get("/user/:name/?"), |ctx: RouteContext| async move {
//!         let name = ctx.param("name").unwrap_or("stranger").to_owned();
//!         Outcome::Response(Response::new(StatusCode::Ok).body(name))
//!     })?;
//!
//!     router.sort_routes()?;
//!
//!     let server = Server::bind("127.0.0.1:8080").await?;
//!     println!("Listening on http://127.0.0.1:8080");
//!     server.run(router, RouterConfig::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod negotiation;
pub mod routing;
pub mod server;
pub mod static_files;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use context::RouteContext;
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use middleware::{MiddlewareFn, MiddlewareRef};
pub use routing::{Outcome, Route, Router, RouterConfig, RouterError};
pub use server::{Server, ServerError};

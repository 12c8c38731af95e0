//! Minimal junction server showing routing, negotiation, guards, and
//! static-file fallthrough.
//!
//! Run with: `cargo run --example hello_world`

use junction::http::{Response, StatusCode};
use junction::middleware::MiddlewareRef;
use junction::routing::{Outcome, Route, Router, RouterConfig};
use junction::server::Server;
use junction::static_files::StaticFiles;
use junction::RouteContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut router = Router::new();

    // A named guard any route can reference.
    router.add_middleware(
        "require-key",
        std::sync::Arc::new(|ctx| {
            if ctx.request().headers().contains("x-api-key") {
                None
            } else {
                Some(Response::new(StatusCode::Unauthorized).body("missing X-Api-Key"))
            }
        }),
    )?;

    router.register(Route::get("/"), |_ctx| async {
        Outcome::Response(Response::new(StatusCode::Ok).body("hello from junction"))
    })?;

    // Path capture with optional trailing slash.
    router.register(Route::get("/user/:name/?"), |ctx: RouteContext| async move {
        let name = ctx.param("name").unwrap_or("stranger").to_owned();
        Outcome::Response(Response::new(StatusCode::Ok).body(format!("hi, {name}")))
    })?;

    // Content negotiation: the client's Accept header picks the shape.
    router.register(
        Route::get("/status").produces(["application/json", "text/plain"]),
        |ctx: RouteContext| async move {
            let response = match ctx.accepted_type() {
                Some("application/json") => Response::json(&serde_json::json!({"ok": true})),
                _ => Response::new(StatusCode::Ok).body("ok"),
            };
            Outcome::Response(response)
        },
    )?;

    // Guarded route using the named middleware.
    router.register(
        Route::get("/admin").middleware(MiddlewareRef::named("require-key")),
        |_ctx| async { Outcome::Response(Response::new(StatusCode::Ok).body("admin area")) },
    )?;

    // Non-exclusive static files: a missing file falls through to the
    // catch-all below instead of answering 404 itself.
    router.register(
        Route::get("/assets/:path"),
        StaticFiles::new("./public").into_handler(),
    )?;
    router.register(Route::get("/assets/:path"), |_ctx| async {
        Outcome::Response(Response::new(StatusCode::NotFound).body("no such asset"))
    })?;

    router.sort_routes()?;

    let server = Server::bind("127.0.0.1:8080").await?;
    println!("Listening on http://{}", server.local_addr());
    server.run(router, RouterConfig::default()).await?;
    Ok(())
}

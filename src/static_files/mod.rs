//! Static file serving with optional fallthrough.
//!
//! [`StaticFiles`] produces a route handler that maps a captured path
//! parameter onto a file beneath a root directory. Its defining behavior is
//! the non-exclusive mode: when the file does not exist the handler answers
//! [`Outcome::TryNext`], so routing continues and a later, less specific
//! route for the same path can still run. Exclusive mode answers `404`
//! directly.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::context::RouteContext;
use crate::http::{Response, StatusCode};
use crate::routing::{IntoHandler, Outcome};

/// Serves files beneath a root directory.
///
/// Mount it on a route whose pattern ends in a greedy placeholder; the
/// placeholder value is the path below the root:
///
/// ```no_run
/// use junction::routing::{Route, Router};
/// use junction::static_files::StaticFiles;
///
/// let mut router = Router::new();
/// router
///     .register(
///         Route::get("/assets/:path"),
///         StaticFiles::new("./public").into_handler(),
///     )
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    param: String,
    exclusive: bool,
}

impl StaticFiles {
    /// Creates a non-exclusive file server rooted at `root`, reading the
    /// relative path from the `path` placeholder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            param: "path".to_owned(),
            exclusive: false,
        }
    }

    /// Renames the placeholder the relative path is read from.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.param = name.into();
        self
    }

    /// Controls what a missing file means: exclusive mode answers `404`,
    /// non-exclusive mode (the default) falls through to the next route.
    #[must_use]
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Converts this configuration into a route handler.
    pub fn into_handler(self) -> impl IntoHandler {
        let files = Arc::new(self);
        move |ctx: RouteContext| {
            let files = Arc::clone(&files);
            async move { files.serve(&ctx).await }
        }
    }

    async fn serve(&self, ctx: &RouteContext) -> Outcome {
        let Some(rel) = ctx.param(&self.param) else {
            // The mount pattern does not capture our placeholder; that is a
            // registration bug, not a client error.
            tracing::error!(param = %self.param, "static mount captured no path parameter");
            return Outcome::Response(Response::new(StatusCode::InternalServerError));
        };

        let Some(below_root) = sanitize(rel) else {
            tracing::warn!(path = %rel, "rejected traversal in static file path");
            return Outcome::Response(
                Response::new(StatusCode::NotFound).body(StatusCode::NotFound.reason()),
            );
        };

        let full = self.root.join(below_root);
        match tokio::fs::read(&full).await {
            Ok(contents) => {
                tracing::debug!(file = %full.display(), bytes = contents.len(), "serving file");
                Outcome::Response(
                    Response::new(StatusCode::Ok)
                        .header("Content-Type", content_type_for(&full))
                        .body_bytes(contents),
                )
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
                ) =>
            {
                if self.exclusive {
                    Outcome::Response(
                        Response::new(StatusCode::NotFound).body(StatusCode::NotFound.reason()),
                    )
                } else {
                    tracing::debug!(file = %full.display(), "file absent — passing to next route");
                    Outcome::TryNext
                }
            }
            Err(err) => {
                tracing::warn!(file = %full.display(), error = %err, "failed to read file");
                Outcome::Response(Response::new(StatusCode::InternalServerError))
            }
        }
    }
}

// Normalizes a captured relative path, refusing anything that could escape
// the root. Returns the safe relative path, or `None`.
fn sanitize(rel: &str) -> Option<PathBuf> {
    let mut safe = PathBuf::new();
    for component in Path::new(rel.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => safe.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if safe.as_os_str().is_empty() {
        None
    } else {
        Some(safe)
    }
}

// Content type guessed from the file extension; unknown extensions are
// served as opaque bytes.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

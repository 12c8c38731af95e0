//! Content negotiation — quality-value lists and wildcard media-type matching.
//!
//! Two pieces back the `Accept` / `Content-Type` condition matchers:
//!
//! - [`quality::parse_quality_list`] — turns a header such as
//!   `text/html,application/json;q=0.9,*/*;q=0.1` into a preference-ordered
//!   list of [`quality::QualityItem`]s.
//! - [`mime::MimeMatcher`] — decides whether a candidate media type is
//!   satisfiable against a configured set of (possibly wildcarded) types and
//!   resolves the concrete type to serve.

use thiserror::Error;

pub mod mime;
pub mod quality;

pub use mime::MimeMatcher;
pub use quality::{QualityItem, parse_quality_list};

/// Errors from header-value parsing and media-type pattern compilation.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// A `q=` parameter did not parse as a number. Deliberately a hard
    /// error rather than a silent `q=0` downgrade.
    #[error("malformed quality value {value:?}")]
    MalformedQuality { value: String },

    /// A configured media-type pattern produced an invalid expression.
    #[error("invalid media type pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

//! Route pattern compilation.
//!
//! A pattern string mixes literal text, `:name` placeholders, and `?`
//! (which makes the single preceding character optional, the usual trick
//! for trailing-slash flexibility):
//!
//! | Pattern              | Matches                     | Captures            |
//! |----------------------|-----------------------------|---------------------|
//! | `/health`            | `/health`                   | *(none)*            |
//! | `/user/:name/?`      | `/user/ada`, `/user/ada/`   | `name → "ada"`      |
//! | `/files/:rest`       | `/files/a/b/c.txt`          | `rest → "a/b/c.txt"`|
//!
//! A placeholder that ends the pattern captures greedily to the end of the
//! path; anywhere else it captures a single non-empty path segment.

use regex::Regex;
use thiserror::Error;

use crate::context::PathParams;

/// Errors from compiling a route pattern. Registration-time and fatal.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern {pattern:?} has a ':' with no placeholder name")]
    EmptyPlaceholder { pattern: String },

    #[error("pattern {pattern:?} did not compile: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled route pattern with named captures, anchored at both ends.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl PathPattern {
    /// Compiles a pattern string.
    ///
    /// The scan goes character by character: literals are escaped verbatim,
    /// `?` passes through as the optional quantifier for the preceding
    /// character, and `:` opens a placeholder name made of
    /// `[A-Za-z0-9_]+`. A placeholder terminated by any other character
    /// captures one non-empty path segment; a placeholder that runs to the
    /// end of the pattern captures the rest of the path, slashes included.
    ///
    /// # Errors
    ///
    /// [`PatternError::EmptyPlaceholder`] for a bare `:`;
    /// [`PatternError::Compile`] if the assembled expression is rejected
    /// (for example a leading `?` with nothing to quantify).
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut expr = String::with_capacity(pattern.len() + 16);
        let mut param_names = Vec::new();
        expr.push('^');

        let mut chars = pattern.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != ':' {
                push_literal(&mut expr, ch);
                continue;
            }

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                return Err(PatternError::EmptyPlaceholder {
                    pattern: pattern.to_owned(),
                });
            }

            if chars.peek().is_some() {
                // Mid-pattern placeholder: one non-empty segment.
                expr.push_str(&format!("(?P<{name}>[^/]+)"));
            } else {
                // Final placeholder: greedy to end of path.
                expr.push_str(&format!("(?P<{name}>.*)"));
            }
            param_names.push(name);
        }

        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| PatternError::Compile {
            pattern: pattern.to_owned(),
            source,
        })?;

        Ok(Self {
            raw: pattern.to_owned(),
            regex,
            param_names,
        })
    }

    /// Returns the original pattern string.
    pub fn pattern(&self) -> &str {
        &self.raw
    }

    /// Returns the placeholder names in pattern order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Matches a request path, returning the captured parameters on success.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;

        let mut params = PathParams::new();
        for name in &self.param_names {
            if let Some(value) = caps.name(name) {
                params.insert(name.clone(), value.as_str());
            }
        }
        Some(params)
    }
}

// Escapes one literal pattern character, letting `?` through as the regex
// optional quantifier.
fn push_literal(expr: &mut String, ch: char) {
    if ch == '?' {
        expr.push('?');
    } else {
        expr.push_str(&regex::escape(&ch.to_string()));
    }
}

//! Wildcard-aware media-type matching.

use regex::Regex;

use super::NegotiationError;

// One configured media type: the raw string, its compiled form, and whether
// it contains no wildcard segments.
#[derive(Debug, Clone)]
struct MimePattern {
    raw: String,
    regex: Regex,
    literal: bool,
}

/// Matches candidate media types against a configured set.
///
/// The configured set describes what a route produces (for `Accept`
/// negotiation) or consumes (for `Content-Type` checks). Each configured
/// entry is either a literal type such as `application/json` or contains `*`
/// wildcard segments such as `text/*`.
///
/// The two directions are asymmetric on purpose: a server declares literal
/// produced types while clients may send wildcard `Accept` entries, and a
/// request's `Content-Type` is always literal.
///
/// - A **wildcard candidate** (`text/*`) is compiled to an expression and
///   tested against the configured *literal* entries in registration order;
///   the first literal hit is the resolved type.
/// - A **literal candidate** is tested against the configured patterns
///   (which may themselves be wildcards) in registration order; the first
///   pattern that matches resolves to the candidate itself.
///
/// # Examples
///
/// ```
/// use junction::negotiation::MimeMatcher;
///
/// let produces = MimeMatcher::new(["application/json", "text/x-custom"]).unwrap();
/// assert_eq!(
///     produces.resolve("text/*"),
///     Some("text/x-custom".to_owned()),
/// );
/// assert_eq!(
///     produces.resolve("application/json"),
///     Some("application/json".to_owned()),
/// );
/// assert_eq!(produces.resolve("image/png"), None);
/// ```
#[derive(Debug, Clone)]
pub struct MimeMatcher {
    patterns: Vec<MimePattern>,
}

impl MimeMatcher {
    /// Compiles a matcher from configured media-type strings, keeping
    /// registration order.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::InvalidPattern`] if a configured entry fails to
    /// compile. This is a registration-time failure.
    pub fn new<I, S>(types: I) -> Result<Self, NegotiationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut patterns = Vec::new();
        for entry in types {
            let raw = entry.into();
            let regex =
                compile_wildcard(&raw).map_err(|source| NegotiationError::InvalidPattern {
                    pattern: raw.clone(),
                    source,
                })?;
            let literal = !raw.contains('*');
            patterns.push(MimePattern { raw, regex, literal });
        }
        Ok(Self { patterns })
    }

    /// Returns the number of configured entries.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if no types were configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Decides whether `candidate` is satisfiable and resolves the concrete
    /// type to use.
    ///
    /// Returns `None` when nothing in the configured set matches.
    pub fn resolve(&self, candidate: &str) -> Option<String> {
        if candidate.contains('*') {
            // Wildcard from the client: find the first configured literal
            // the candidate covers.
            let probe = compile_wildcard(candidate).ok()?;
            self.patterns
                .iter()
                .filter(|p| p.literal)
                .find(|p| probe.is_match(&p.raw))
                .map(|p| p.raw.clone())
        } else {
            // Literal candidate against configured patterns.
            self.patterns
                .iter()
                .find(|p| p.regex.is_match(candidate))
                .map(|_| candidate.to_owned())
        }
    }
}

// Compiles a media-type string to an anchored expression: `*` becomes `.*`,
// every other character is escaped.
fn compile_wildcard(mime: &str) -> Result<Regex, regex::Error> {
    let mut pattern = String::with_capacity(mime.len() + 8);
    pattern.push('^');
    for ch in mime.chars() {
        if ch == '*' {
            pattern.push_str(".*");
        } else {
            pattern.push_str(&regex::escape(&ch.to_string()));
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_candidate_against_literal_set() {
        let m = MimeMatcher::new(["application/json"]).unwrap();
        assert_eq!(
            m.resolve("application/json"),
            Some("application/json".to_owned())
        );
        assert_eq!(m.resolve("text/html"), None);
    }

    #[test]
    fn literal_candidate_against_wildcard_pattern() {
        let m = MimeMatcher::new(["text/*"]).unwrap();
        assert_eq!(m.resolve("text/csv"), Some("text/csv".to_owned()));
        assert_eq!(m.resolve("application/json"), None);
    }

    #[test]
    fn wildcard_candidate_resolves_first_literal_in_registration_order() {
        let m = MimeMatcher::new(["application/json", "text/x-custom", "text/html"]).unwrap();
        assert_eq!(m.resolve("text/*"), Some("text/x-custom".to_owned()));
        assert_eq!(m.resolve("*/*"), Some("application/json".to_owned()));
    }

    #[test]
    fn wildcard_candidate_skips_configured_wildcards() {
        // Only literal configured entries can be the resolved concrete type.
        let m = MimeMatcher::new(["text/*", "application/json"]).unwrap();
        assert_eq!(m.resolve("*/*"), Some("application/json".to_owned()));
        assert_eq!(m.resolve("text/*"), None);
    }

    #[test]
    fn escaping_is_literal_not_regex() {
        // The '+' must not be treated as a quantifier.
        let m = MimeMatcher::new(["application/ld+json"]).unwrap();
        assert_eq!(
            m.resolve("application/ld+json"),
            Some("application/ld+json".to_owned())
        );
        assert_eq!(m.resolve("application/ldjson"), None);
    }

    #[test]
    fn registration_order_decides_among_patterns() {
        let m = MimeMatcher::new(["*/*", "application/json"]).unwrap();
        // Literal candidate hits the first (wildcard) pattern and resolves
        // to itself either way.
        assert_eq!(m.resolve("image/png"), Some("image/png".to_owned()));
    }

    #[test]
    fn empty_set_never_matches() {
        let m = MimeMatcher::new(Vec::<String>::new()).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.resolve("text/html"), None);
        assert_eq!(m.resolve("*/*"), None);
    }
}

//! Quality-value list parsing for `Accept`-family headers.

use std::cmp::Ordering;

use super::NegotiationError;

/// One entry of a quality-value header: the bare token and its weight.
///
/// Tokens are whatever precedes the first `;` of a comma-separated element
/// (a media type for `Accept`, an encoding for `Accept-Encoding`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct QualityItem {
    /// The token with surrounding whitespace trimmed, parameters stripped.
    pub value: String,
    /// The `q=` weight, defaulted to 1.0 and clamped to `[0.0, 1.0]`.
    pub quality: f32,
}

/// Parses a quality-value header into a list ordered by descending weight.
///
/// Grammar: comma-separated tokens, each optionally followed by
/// `;`-separated parameters. Only the `q` parameter affects ordering; every
/// other parameter is ignored. A missing `q` means 1.0. The sort is stable,
/// so equally-weighted entries keep their original order.
///
/// An empty header yields an empty list.
///
/// # Errors
///
/// [`NegotiationError::MalformedQuality`] when a `q=` value is not numeric.
/// The failure is surfaced to the caller instead of being treated as "not
/// acceptable".
///
/// # Examples
///
/// ```
/// use junction::negotiation::parse_quality_list;
///
/// let items = parse_quality_list("text/html,application/json;q=0.9,*/*;q=0.1").unwrap();
/// let order: Vec<_> = items.iter().map(|i| (i.value.as_str(), i.quality)).collect();
/// assert_eq!(order, vec![
///     ("text/html", 1.0),
///     ("application/json", 0.9),
///     ("*/*", 0.1),
/// ]);
/// ```
pub fn parse_quality_list(header: &str) -> Result<Vec<QualityItem>, NegotiationError> {
    let mut items = Vec::new();

    for element in header.split(',') {
        let element = element.trim();
        if element.is_empty() {
            continue;
        }

        let mut parts = element.split(';');
        // The split iterator always yields at least one piece.
        let value = parts.next().unwrap_or("").trim().to_owned();
        if value.is_empty() {
            continue;
        }

        let mut quality = 1.0f32;
        for param in parts {
            let Some((key, raw)) = param.split_once('=') else {
                continue;
            };
            if key.trim() != "q" {
                continue;
            }
            let raw = raw.trim();
            quality = raw
                .parse::<f32>()
                .map_err(|_| NegotiationError::MalformedQuality {
                    value: raw.to_owned(),
                })?
                .clamp(0.0, 1.0);
        }

        items.push(QualityItem { value, quality });
    }

    // Stable: equal weights keep header order.
    items.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
    });

    Ok(items)
}

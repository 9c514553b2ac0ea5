//! Normalization of free-form user input into a [`CanonicalUrl`].

use crate::CanonicalUrl;

const DEFAULT_SCHEME: &str = "https://";

/// Trim surrounding whitespace and prefix `https://` when the text does not
/// already start with `http://` or `https://` (case-sensitive).
///
/// Never fails: empty input yields `https://`, which validation rejects.
pub fn normalize(raw: &str) -> CanonicalUrl {
    let trimmed = raw.trim();
    if has_scheme(trimmed) {
        CanonicalUrl::from_normalized(trimmed.to_string())
    } else {
        CanonicalUrl::from_normalized(format!("{DEFAULT_SCHEME}{trimmed}"))
    }
}

fn has_scheme(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

//! Structural validation of user-supplied links. Pure and deterministic.
//!
//! The accepted shape is deliberately strict: an optional `www.` prefix, a
//! single host label, a dot, and an alphabetic TLD of two or more letters.
//! Paths, queries, ports and further subdomain levels are rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::normalize;
use crate::{is_allowed_tld, InvalidReason, ValidationResult};

static LINK_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(www\.)?([a-zA-Z0-9-]+)\.([a-zA-Z]{2,})$").expect("valid link pattern")
});

/// Validate raw user input, normalizing it first.
pub fn validate(raw: &str) -> ValidationResult {
    if raw.trim().is_empty() {
        return ValidationResult::Invalid(InvalidReason::Empty);
    }

    let canonical = normalize(raw);
    let Some(caps) = LINK_SHAPE.captures(canonical.as_str()) else {
        return ValidationResult::Invalid(InvalidReason::MalformedFormat);
    };

    let tld = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    if !is_allowed_tld(tld) {
        return ValidationResult::Invalid(InvalidReason::DisallowedTld);
    }

    ValidationResult::Valid(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(raw: &str) -> Option<InvalidReason> {
        match validate(raw) {
            ValidationResult::Valid(_) => None,
            ValidationResult::Invalid(r) => Some(r),
        }
    }

    #[test]
    fn empty_and_whitespace_are_empty() {
        for raw in ["", " ", "\t\n", "   \r\n "] {
            assert_eq!(reason(raw), Some(InvalidReason::Empty));
        }
    }

    #[test]
    fn bare_domain_gets_scheme() {
        let v = validate("google.com");
        assert_eq!(v.into_result().unwrap().as_str(), "https://google.com");
    }

    #[test]
    fn accepts_common_shapes() {
        for raw in [
            "http://example.org",
            "https://www.example.net",
            "www.my-site.io",
            "  dev123.dev  ",
            "site.info",
        ] {
            assert!(validate(raw).is_valid(), "{raw} should be valid");
        }
    }

    #[test]
    fn malformed_inputs() {
        for raw in [
            "http:/google.com",
            "google..com",
            "mail.google.com",
            "google.com/path",
            "google.com:8080",
            "google.com?q=1",
            "google",
            "google.c",
            "google.c0m",
            "under_score.com",
            "https://",
        ] {
            assert_eq!(
                reason(raw),
                Some(InvalidReason::MalformedFormat),
                "{raw} should be malformed"
            );
        }
    }

    #[test]
    fn disallowed_tld() {
        assert_eq!(reason("google.xyz"), Some(InvalidReason::DisallowedTld));
        assert_eq!(reason("https://www.example.museum"), Some(InvalidReason::DisallowedTld));
    }

    #[test]
    fn tld_check_ignores_case_and_host_case_is_preserved() {
        let v = validate("www.Example.COM").into_result().unwrap();
        assert_eq!(v.as_str(), "https://www.Example.COM");

        let v = validate("Example.Io").into_result().unwrap();
        assert_eq!(v.as_str(), "https://Example.Io");
    }

    #[test]
    fn uppercase_www_is_an_extra_subdomain() {
        // The `www.` prefix is matched literally.
        assert_eq!(reason("WWW.Example.COM"), Some(InvalidReason::MalformedFormat));
    }
}

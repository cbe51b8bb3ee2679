// src/template/version.rs

//! Helpers for proposing the next version of a template
//!
//! Template versions are opaque strings. These helpers treat them as dotted
//! numeric triples (`major.minor.patch`); missing or non-numeric parts count
//! as zero.

use std::cmp::Ordering;

/// Version reported when a template has no versions yet
pub const INITIAL_VERSION: &str = "0.0.0";

/// `(major, minor, patch)` of a dotted version string
pub fn numeric_parts(version: &str) -> (u64, u64, u64) {
    let mut parts = version.trim().split(['.', '-']).map(|part| {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse::<u64>().unwrap_or(0)
    });
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    (major, minor, patch)
}

/// Numeric comparison, falling back to string order on ties
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    numeric_parts(a)
        .cmp(&numeric_parts(b))
        .then_with(|| a.cmp(b))
}

/// Highest version in `versions`, `0.0.0` when empty
pub fn latest_version<S: AsRef<str>>(versions: &[S]) -> String {
    versions
        .iter()
        .map(AsRef::as_ref)
        .max_by(|a, b| compare_versions(a, b))
        .unwrap_or(INITIAL_VERSION)
        .to_string()
}

/// `major.(minor + 1)` of `latest`
pub fn next_proposed_minor(latest: &str) -> String {
    let (major, minor, _) = numeric_parts(latest);
    format!("{}.{}", major, minor + 1)
}

/// `major.minor.(patch + 1)` of `latest`
pub fn next_proposed_patch(latest: &str) -> String {
    let (major, minor, patch) = numeric_parts(latest);
    format!("{}.{}.{}", major, minor, patch + 1)
}

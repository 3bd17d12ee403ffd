//! Splitting and joining of a single full-name field into the first/last pair the remote API expects.
//!
//! The split is on the first interior space, so the last name keeps all trailing tokens. That makes
//! `full(first(n), last(n)) == n` hold exactly for names with one interior space; for zero or 2+ interior spaces the
//! round trip is lossy by design.

/// Everything before the first space, or the whole name if there is none.
pub fn first(full_name: &str) -> &str {
    match full_name.find(' ') {
        Some(i) => &full_name[..i],
        None => full_name,
    }
}

/// Everything after the first space, trimmed. Empty when the name has a single token.
pub fn last(full_name: &str) -> &str {
    match full_name.find(' ') {
        Some(i) => full_name[i + 1..].trim(),
        None => "",
    }
}

/// Joins a first/last pair back into a single full name.
pub fn full(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}

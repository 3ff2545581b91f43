//! Parsing of comma-separated client id and scope lists.

use indexmap::IndexSet;
use tracing::warn;

/// Split a comma-separated client id list.
///
/// Tokens are trimmed; blank tokens (including one left by a trailing comma)
/// are dropped. Duplicates collapse to their first occurrence.
pub fn parse_client_id_list(raw: &str) -> Vec<String> {
    let mut blanks = 0usize;
    let ids: IndexSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| {
            if token.is_empty() {
                blanks += 1;
                false
            } else {
                true
            }
        })
        .map(str::to_string)
        .collect();

    // A wholly empty input is "no clients", not a malformed list.
    if blanks > 0 && !raw.trim().is_empty() {
        warn!(dropped = blanks, "blank pre-authorized client id tokens dropped");
    }

    ids.into_iter().collect()
}

/// Normalize delegated permission scopes: trim, drop blanks, dedupe.
pub fn normalize_scopes<S: AsRef<str>>(scopes: &[S]) -> Vec<String> {
    scopes
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Comma-joined scope string as exposed in outputs
pub fn join_scopes<S: AsRef<str>>(scopes: &[S]) -> String {
    normalize_scopes(scopes).join(",")
}

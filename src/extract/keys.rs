use super::row::ExtractedRow;

/// Returns `base` if the row has no entry for it, otherwise the first free
/// `"{base} (n)"` for n = 2, 3, ...
#[must_use]
pub fn unique_key(base: &str, row: &ExtractedRow) -> String {
    if !row.contains_key(base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{base} ({n})"))
        .find(|candidate| !row.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Joins a key prefix and a segment with `.`.
#[must_use]
pub fn join_key(prefix: &str, segment: &str) -> String {
    format!("{prefix}.{segment}")
}

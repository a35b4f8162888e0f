//! Keyword string codec
//!
//! A file's tags are persisted as a single `;`-joined string (the `XPKeywords`
//! field). These functions translate between that raw string and the tag
//! names it holds. There is no escaping: a name containing `;` cannot be
//! represented, so the session rejects such names before they get here.

/// Separator between tag names in the raw keyword string
pub const DELIMITER: &str = ";";

/// Split a raw keyword string into its tag names.
///
/// An empty string holds no tags. Nothing is trimmed or deduplicated, so
/// `"a;;b"` yields an empty name between `a` and `b`.
pub fn decode(raw: &str) -> Vec<&str> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(DELIMITER).collect()
}

/// Check whether `name` is one of the tags in `raw`
pub fn contains(raw: &str, name: &str) -> bool {
    decode(raw).contains(&name)
}

/// Add `name` to `raw` if it is missing, otherwise remove its first occurrence.
///
/// The remaining names keep their relative order and a missing name goes to the
/// end. Toggling twice therefore restores `raw` exactly when `name` was absent
/// or last; otherwise it comes back with the same names, `name` moved last.
pub fn toggle(raw: &str, name: &str) -> String {
    let mut parts = decode(raw);

    if let Some(pos) = parts.iter().position(|part| *part == name) {
        parts.remove(pos);
        return parts.join(DELIMITER);
    }

    if raw.is_empty() {
        name.to_string()
    } else {
        format!("{raw}{DELIMITER}{name}")
    }
}

//! Quoted SQL identifiers.
//!
//! Resolved column names are always emitted as quoted identifiers so mixed-case
//! and reserved-word names survive. Embedded `"` is escaped as `""`.

/// Append `name` to `out` as a double-quoted identifier.
pub(crate) fn write_quoted(name: &str, out: &mut String) {
    out.reserve(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

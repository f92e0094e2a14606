//! Brace matching with quote awareness.
//!
//! Finds the matching close-brace for a `{`, skipping quoted substrings
//! and recursing into nested `{…}` pairs. Failure to match is *not* an
//! error: callers emit the remainder as literal text, so malformed
//! display-format strings degrade to readable output instead of
//! crashing a render.

/// Returns the byte offset of the `}` matching the `{` at the start of
/// `source`, or `None` if the brace (or a quote inside it) is
/// unmatched.
///
/// The offset is relative to the start of `source` and points at the
/// closing brace itself.
pub fn match_brace(source: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    if bytes.first() != Some(&b'{') {
        return None;
    }

    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                // Quoted span: skip to the matching quote character.
                let quote = bytes[i];
                let rest = &bytes[i + 1..];
                let close = rest.iter().position(|&b| b == quote)?;
                i += close + 2;
            }
            b'{' => {
                // Nested pair: recurse and skip past its length.
                let inner = match_brace(&source[i..])?;
                i += inner + 1;
            }
            b'}' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

//! Best-effort extraction of a JSON object from loosely structured model
//! output. The models are instructed to return bare JSON but in practice
//! wrap it in markdown fences or surround it with prose.

/// Strip markdown code fences from a model response if present.
/// Some providers (especially without strict JSON mode) wrap JSON in
/// ```json ... ```.
pub fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    // Drop the opening fence together with its optional language tag.
    let after_open = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    };
    let cleaned = after_open.trim_end();
    match cleaned.strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => cleaned,
    }
}

/// Locate the first balanced `{...}` span in `text`.
///
/// The scan is string-aware: braces inside quoted values (including escaped
/// quotes) do not affect the depth count. Returns `None` when no opening
/// brace exists or the object never closes.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    // `i` indexes the ASCII `}` so the slice boundary is valid
                    // even with multibyte content inside the object.
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

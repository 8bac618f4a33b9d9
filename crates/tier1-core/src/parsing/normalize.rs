/// Normalize a matching key component: trim surrounding whitespace and
/// lower-case.
///
/// Applied when a result, sample or guideline is constructed so that joins
/// and rule lookups never see raw casing.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Replace internal line breaks with a single space and trim.
///
/// Guideline cells extracted from a lattice table keep the renderer's line
/// breaks (e.g. "pH\n(in 0.01M CaCl2)"); output fields must be single-line.
pub fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                // "\r\n" is one break
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

//! Subcategory name normalization

/// Canonical token form: lowercase, characters outside `[a-z0-9_-]` become
/// `_`, runs of `_` collapse, leading/trailing `_` are trimmed. An empty
/// result becomes `"general"`.
pub fn normalize_subcategory_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        super::GENERAL.to_string()
    } else {
        trimmed.to_string()
    }
}

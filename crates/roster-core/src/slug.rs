//! Slug derivation for project names
//!
//! A slug is the lowercase, separator-collapsed form of a name with a
//! trailing `/`. Names that differ only in case or punctuation map to the
//! same slug, which is what makes the slug the real uniqueness key.

/// Slug of a name with no usable characters
pub const ROOT_SLUG: &str = "/";

/// Derive the slug for `name`.
///
/// ```
/// use roster_core::slug::normalize;
///
/// assert_eq!(normalize("Release  Engineering"), "release_engineering/");
/// assert_eq!(normalize("  ?? "), "/");
/// ```
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    let mut pending_separator = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if is_separator(ch) {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;
        out.push(ch);
    }

    let trimmed = out.trim_start_matches(['.', '_']);
    format!("{}/", trimmed)
}

/// True when the slug is the degenerate root value
pub fn is_root(slug: &str) -> bool {
    slug == ROOT_SLUG
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace()
        || ch.is_control()
        || matches!(
            ch,
            '_' | '#' | '%' | '&' | '+' | '=' | '\\' | '?' | '<' | '>' | '/'
        )
}

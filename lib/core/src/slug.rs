//! Slug normalization for declaration lookup keys.
//!
//! API names, service names and callback ids are compared through their
//! slug so that lookups are insensitive to case and punctuation:
//! `"Trouble Ticket / List"` and `"trouble-ticket-list"` name the same thing.

/// Normalizes a name into a lookup slug.
///
/// The value is lower-cased, every run of characters outside `[a-z0-9]` is
/// collapsed into a single `-`, and leading/trailing hyphens are trimmed.
/// Non-ASCII letters count as separators.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Returns true if two names share the same slug.
#[must_use]
pub fn same_slug(left: &str, right: &str) -> bool {
    slugify(left) == slugify(right)
}

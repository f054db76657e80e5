//! JSON path resolution.
//!
//! Paths are dot-separated field names. A segment may carry one or more
//! `[N]` suffixes to index into arrays (`items[0]`, `matrix[1][2]`); a
//! segment that is only `[N]` indexes the current node, which lets a path
//! address a top-level array (`[0].id`).
//!
//! Resolution is soft: a missing field, an index into a non-array, an
//! out-of-range index or a JSON `null` all resolve to `None`.

use serde_json::Value;

/// Resolves `path` against `root`.
#[must_use]
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.').map(str::trim).filter(|s| !s.is_empty()) {
        let (field, indexes) = split_segment(segment);
        if !field.is_empty() {
            current = current.get(field)?;
        }
        for index in indexes {
            current = current.as_array()?.get(index)?;
        }
    }
    (!current.is_null()).then_some(current)
}

/// Splits `name[1][2]` into the field name and its indexes. A segment whose
/// brackets do not form valid indexes is taken as a plain field name.
fn split_segment(segment: &str) -> (&str, Vec<usize>) {
    let Some(open) = segment.find('[') else {
        return (segment, Vec::new());
    };
    let (field, mut rest) = segment.split_at(open);
    let mut indexes = Vec::new();
    while !rest.is_empty() {
        let parsed = rest.strip_prefix('[').and_then(|inner| {
            let close = inner.find(']')?;
            let index = inner[..close].trim().parse::<usize>().ok()?;
            Some((index, &inner[close + 1..]))
        });
        match parsed {
            Some((index, remainder)) => {
                indexes.push(index);
                rest = remainder;
            }
            None => return (segment, Vec::new()),
        }
    }
    (field, indexes)
}

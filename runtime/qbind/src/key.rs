//! Hierarchical key paths.
//!
//! Keys are flat strings that encode a path through the destination record:
//!
//! - `field`: a plain field;
//! - `outer.inner`: a field of a nested record;
//! - `seq.<index>`: an element of a sequence;
//! - `seq.<index>.inner`: a field of a record stored in a sequence.
//!
//! `<index>` is a non-negative base-10 integer, without sign.

/// The next path segment of `key`: everything up to the first `.` or `[`.
///
/// ```rust
/// use qbind::key::next_segment;
///
/// assert_eq!(next_segment("bar"), "bar");
/// assert_eq!(next_segment("bar.baz"), "bar");
/// assert_eq!(next_segment("bar[0]"), "bar");
/// ```
pub fn next_segment(key: &str) -> &str {
    match key.find(['.', '[']) {
        Some(end) => &key[..end],
        None => key,
    }
}

/// The part of `key` that follows `prefix.`, if `key` is nested under `prefix`.
pub fn strip_parent<'k>(key: &'k str, prefix: &str) -> Option<&'k str> {
    key.strip_prefix(prefix)?.strip_prefix('.')
}

/// The prefix shared by every key nested under `prefix`.
pub fn parent_prefix(prefix: &str) -> String {
    format!("{prefix}.")
}

/// The key addressing `segment` under `prefix`.
pub fn child_key(prefix: &str, segment: &str) -> String {
    format!("{prefix}.{segment}")
}

/// A sequence element key, relative to the sequence's own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementPath<'k> {
    /// The raw index segment, as it appears in the key.
    pub segment: &'k str,
    /// The parsed index, if `segment` is a valid index.
    pub index: Option<usize>,
    /// Whatever follows the index, for record elements.
    pub subpath: Option<&'k str>,
}

impl<'k> ElementPath<'k> {
    /// Split the remainder of a key (after `seq.`) into index and sub-path.
    pub fn parse(rest: &'k str) -> Self {
        let (segment, subpath) = match rest.split_once('.') {
            Some((segment, subpath)) => (segment, Some(subpath)),
            None => (rest, None),
        };
        Self {
            segment,
            index: parse_index(segment),
            subpath,
        }
    }
}

/// Parse a sequence index.
///
/// Only plain ASCII digits are accepted: no sign, no whitespace.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

use std::collections::BTreeMap;
use std::ops::Bound;

/// A flat, multi-valued map from string keys to string values.
///
/// This is what a query string looks like once it has been split into key/value pairs:
/// the same key may appear multiple times, and the order of values for a given key is
/// preserved. Only the first value of a key is used by leaf binders.
///
/// Keys are kept in lexicographic order, so every scan performed by the binder is
/// deterministic no matter the order in which pairs were inserted.
///
/// # Example
///
/// ```rust
/// use qbind::QueryMap;
///
/// let params = QueryMap::parse("name=John%20Doe&tag.0=a&tag.1=b&name=ignored");
/// assert_eq!(params.first("name"), Some("John Doe"));
/// assert_eq!(params.get_all("name").unwrap().len(), 2);
/// assert_eq!(params.keys_with_prefix("tag.").count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl QueryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Percent-decode an `application/x-www-form-urlencoded` query string.
    ///
    /// The leading `?` must already have been stripped.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Append `value` to the values of `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(value.into());
    }

    /// All the values registered under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// The first value registered under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if `key` is present with at least one value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|values| !values.is_empty())
    }

    /// All keys starting with `prefix`, in lexicographic order.
    pub fn keys_with_prefix<'a, 'p>(&'a self, prefix: &'p str) -> impl Iterator<Item = &'a str> {
        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(key, _)| key.as_str())
            .take_while(move |key| key.starts_with(prefix))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// The number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Extend<(K, V)> for QueryMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for QueryMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = QueryMap::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_their_insertion_order() {
        let params: QueryMap = [("id", "2"), ("id", "1")].into_iter().collect();
        assert_eq!(params.first("id"), Some("2"));
        assert_eq!(params.get_all("id"), Some(&["2".to_string(), "1".to_string()][..]));
    }

    #[test]
    fn prefix_scans_are_sorted_and_bounded() {
        let params: QueryMap = [
            ("s.2", "c"),
            ("s.0", "a"),
            ("t.0", "x"),
            ("s", "plain"),
            ("s.1", "b"),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = params.keys_with_prefix("s.").collect();
        assert_eq!(keys, ["s.0", "s.1", "s.2"]);
    }

    #[test]
    fn parse_decodes_percent_and_plus() {
        let params = QueryMap::parse("user.name=Hi%20there&q=a+b&empty=");
        assert_eq!(params.first("user.name"), Some("Hi there"));
        assert_eq!(params.first("q"), Some("a b"));
        assert_eq!(params.first("empty"), Some(""));
        assert!(params.contains_key("empty"));
        assert!(!params.contains_key("missing"));
    }
}

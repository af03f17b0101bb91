//! The capture map produced when a route pattern matches a path.
//!
//! Positional groups (index 0 is the whole match) and named groups are kept
//! apart: only named entries are ever read as configuration (`viewName`,
//! `viewType`, `viewMethod`, `viewParameters`) and only named entries are
//! merged with static rewrite fields.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

/// Captured groups of a matched route.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use mvcr_router::Matches;
///
/// let regex = Regex::new(r"^(?:(?P<viewName>[^/]+)/([0-9]+))$").unwrap();
/// let matches = Matches::from_captures(&regex, &regex.captures("blog/7").unwrap());
///
/// assert_eq!(matches.whole(), "blog/7");
/// assert_eq!(matches.get("viewName"), Some("blog"));
/// assert_eq!(matches.position(2), Some("7"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    positional: Vec<Option<String>>,
    named: BTreeMap<String, String>,
}

impl Matches {
    /// Creates an empty capture map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the groups of one successful match.
    ///
    /// Groups that did not take part in the match are absent; groups that
    /// matched the empty string are present and empty.
    pub fn from_captures(regex: &Regex, captures: &Captures<'_>) -> Self {
        let positional = captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect();
        Self { positional, named }
    }

    /// The whole matched path (group 0), or `""` for an empty map.
    pub fn whole(&self) -> &str {
        self.position(0).unwrap_or("")
    }

    /// A positional group.
    pub fn position(&self, index: usize) -> Option<&str> {
        self.positional.get(index).and_then(Option::as_deref)
    }

    /// A named entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named.get(key).map(String::as_str)
    }

    /// A named entry, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Returns `true` if a named entry exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.named.contains_key(key)
    }

    /// Sets a named entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.named.insert(key.into(), value.into())
    }

    /// Removes a named entry.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.named.remove(key)
    }

    /// Merges rewrite fields over the named entries. Fields win.
    pub fn merge(&mut self, fields: &BTreeMap<String, String>) {
        for (key, value) in fields {
            self.named.insert(key.clone(), value.clone());
        }
    }

    /// Named entries in key order.
    pub fn named(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of positional groups, including group 0.
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }
}

impl<K, V> FromIterator<(K, V)> for Matches
where
    K: Into<String>,
    V: Into<String>,
{
    /// Builds a map of named entries only.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            positional: Vec::new(),
            named: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(pattern: &str, path: &str) -> Matches {
        let regex = Regex::new(pattern).unwrap();
        let captures = regex.captures(path).unwrap();
        Matches::from_captures(&regex, &captures)
    }

    #[test]
    fn test_unmatched_group_is_absent() {
        let m = capture(
            r"^(?:(?P<viewName>[a-z]+)(/(?P<viewMethod>[a-z]+))?)$",
            "blog",
        );
        assert_eq!(m.get("viewName"), Some("blog"));
        assert!(!m.contains_key("viewMethod"));
        assert_eq!(m.position(2), None);
        assert_eq!(m.positional_len(), 4);
    }

    #[test]
    fn test_empty_group_is_present() {
        let m = capture(r"^(?:(?P<viewName>[a-z]*)/(?P<viewMethod>[a-z]*))$", "blog/");
        assert_eq!(m.get("viewMethod"), Some(""));
        assert_eq!(m.get_non_empty("viewMethod"), None);
        assert_eq!(m.get_non_empty("viewName"), Some("blog"));
    }

    #[test]
    fn test_merge_overrides_named_only() {
        let mut m = capture(r"^(?:(?P<viewName>[a-z]+))$", "blog");
        let fields: BTreeMap<String, String> = [("viewName", "pages"), ("extra", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        m.merge(&fields);

        assert_eq!(m.get("viewName"), Some("pages"));
        assert_eq!(m.get("extra"), Some("1"));
        assert_eq!(m.whole(), "blog");
    }

    #[test]
    fn test_insert_and_remove() {
        let mut m = Matches::new();
        assert_eq!(m.whole(), "");
        assert!(m.insert("viewType", "json").is_none());
        assert_eq!(m.insert("viewType", "html").as_deref(), Some("json"));
        assert_eq!(m.remove("viewType").as_deref(), Some("html"));
        assert!(m.named().next().is_none());
    }

    #[test]
    fn test_from_iter() {
        let m: Matches = [("viewName", "blog"), ("viewMethod", "show")].into_iter().collect();
        let keys: Vec<_> = m.named().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["viewMethod", "viewName"]);
        assert_eq!(m.positional_len(), 0);
    }
}

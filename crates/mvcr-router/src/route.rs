//! Route definitions and the priority-tiered route table.
//!
//! A [`Route`] pairs an anchored regular expression with a [`RouteConfig`]
//! that says how a match is turned into a handler call. The [`RouteTable`]
//! groups routes by [`Priority`] and keeps insertion order within a tier.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use mvcr_core::{MvcrError, MvcrResult, Output, Priority};

use crate::matches::Matches;

/// The outcome of a route handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler produced output; routing stops here.
    Handled(Output),
    /// The handler declined; the router tries the next candidate.
    Unsatisfied,
}

impl Dispatch {
    /// Returns `true` for [`Dispatch::Handled`].
    pub const fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The output, if handled.
    pub fn into_output(self) -> Option<Output> {
        match self {
            Self::Handled(output) => Some(output),
            Self::Unsatisfied => None,
        }
    }
}

/// A custom route handler, called with the matches and the matched pattern.
pub type RouteHandler = Arc<dyn Fn(&Matches, &str) -> MvcrResult<Dispatch> + Send + Sync>;

/// A dynamic rewrite: computes the route configuration from the matches.
pub type RewriteFn = Arc<dyn Fn(&Matches) -> RouteConfig + Send + Sync>;

/// How a matched route is dispatched.
#[derive(Clone, Default)]
pub enum RouteConfig {
    /// The built-in view dispatcher.
    #[default]
    Default,
    /// Replaces the handler entirely.
    Custom(RouteHandler),
    /// Fixed fields merged into the matches before the built-in dispatcher runs.
    Rewrite(BTreeMap<String, String>),
    /// Computed at match time from the matches.
    Dynamic(RewriteFn),
}

impl RouteConfig {
    /// Wraps a closure as a custom handler.
    pub fn custom<F>(handler: F) -> Self
    where
        F: Fn(&Matches, &str) -> MvcrResult<Dispatch> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(handler))
    }

    /// Wraps a closure as a dynamic rewrite.
    pub fn dynamic<F>(rewrite: F) -> Self
    where
        F: Fn(&Matches) -> Self + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(rewrite))
    }

    /// Builds a static rewrite from key/value pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use mvcr_router::RouteConfig;
    ///
    /// let config = RouteConfig::rewrite([("viewName", "pages"), ("viewMethod", "about")]);
    /// assert_eq!(config.kind(), "rewrite");
    /// ```
    pub fn rewrite<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Rewrite(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// A short name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Custom(_) => "custom",
            Self::Rewrite(_) => "rewrite",
            Self::Dynamic(_) => "dynamic",
        }
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Rewrite(fields) => f.debug_tuple("Rewrite").field(fields).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// The handler a matched route will be called with.
#[derive(Clone)]
pub enum Callable {
    /// The built-in view dispatcher.
    Default,
    /// A custom handler.
    Custom(RouteHandler),
}

impl Callable {
    /// Returns `true` for the built-in dispatcher.
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Replaces the `:any` and `:num` wildcards with their regular expressions.
///
/// # Examples
///
/// ```
/// use mvcr_router::route::normalize_wildcards;
///
/// assert_eq!(normalize_wildcards("blog/:any/:num"), "blog/[^/]+/[0-9]+");
/// ```
pub fn normalize_wildcards(pattern: &str) -> String {
    pattern.replace(":any", "[^/]+").replace(":num", "[0-9]+")
}

/// One entry of the route table.
#[derive(Clone)]
pub struct Route {
    pattern: String,
    regex: Regex,
    config: RouteConfig,
}

impl Route {
    /// Compiles a route. `pattern` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::ImproperlyConfigured`] if the pattern is not a
    /// valid regular expression.
    pub fn new(pattern: impl Into<String>, config: RouteConfig) -> MvcrResult<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            MvcrError::ImproperlyConfigured(format!("Invalid route pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            pattern,
            regex,
            config,
        })
    }

    /// The normalized pattern, as it was added.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The anchored, compiled regex.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The route configuration.
    pub const fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Matches the whole of `path`, returning the captures on success.
    pub fn match_path(&self, path: &str) -> Option<Matches> {
        let captures = self.regex.captures(path)?;
        Some(Matches::from_captures(&self.regex, &captures))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Routes grouped by priority tier.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    tiers: BTreeMap<Priority, Vec<Route>>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route to a tier after normalizing its wildcards.
    ///
    /// Returns `Ok(false)` without changing anything if the tier already
    /// holds the same normalized pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::ImproperlyConfigured`] for an invalid pattern.
    pub fn add(
        &mut self,
        pattern: &str,
        config: RouteConfig,
        priority: Priority,
    ) -> MvcrResult<bool> {
        let pattern = normalize_wildcards(pattern);
        if self.tier(priority).iter().any(|r| r.pattern == pattern) {
            debug!(pattern = %pattern, %priority, "Route already present, not added");
            return Ok(false);
        }
        let route = Route::new(pattern, config)?;
        debug!(pattern = %route.pattern, %priority, config = route.config.kind(), "Route added");
        self.tiers.entry(priority).or_default().push(route);
        Ok(true)
    }

    /// Removes a route from a tier. Returns `false` if it was absent.
    ///
    /// The pattern is normalized the same way [`add`](Self::add) does.
    pub fn remove(&mut self, pattern: &str, priority: Priority) -> bool {
        let pattern = normalize_wildcards(pattern);
        let Some(tier) = self.tiers.get_mut(&priority) else {
            return false;
        };
        let Some(index) = tier.iter().position(|r| r.pattern == pattern) else {
            return false;
        };
        tier.remove(index);
        if tier.is_empty() {
            self.tiers.remove(&priority);
        }
        debug!(pattern = %pattern, %priority, "Route removed");
        true
    }

    /// The routes of one tier, in insertion order.
    pub fn tier(&self, priority: Priority) -> &[Route] {
        self.tiers.get(&priority).map_or(&[], Vec::as_slice)
    }

    /// Iterates `(tier, route)` pairs in match order.
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &Route)> {
        self.tiers
            .iter()
            .flat_map(|(priority, routes)| routes.iter().map(move |route| (*priority, route)))
    }

    /// Total number of routes.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Returns `true` if the table holds no route.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every route.
    pub fn clear(&mut self) {
        self.tiers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(table: &RouteTable) -> Vec<&str> {
        table.iter().map(|(_, r)| r.pattern()).collect()
    }

    #[test]
    fn test_normalize_wildcards() {
        assert_eq!(normalize_wildcards("a/:any"), "a/[^/]+");
        assert_eq!(normalize_wildcards(":num-:num"), "[0-9]+-[0-9]+");
        assert_eq!(normalize_wildcards("plain"), "plain");
    }

    #[test]
    fn test_route_is_anchored() {
        let route = Route::new("blog|news", RouteConfig::Default).unwrap();
        assert!(route.match_path("blog").is_some());
        assert!(route.match_path("news").is_some());
        assert!(route.match_path("blogs").is_none());
        assert!(route.match_path("my-news").is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Route::new("(unclosed", RouteConfig::Default).unwrap_err();
        assert!(matches!(err, MvcrError::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_table_orders_by_tier_then_insertion() {
        let mut table = RouteTable::new();
        table.add("low", RouteConfig::Default, Priority::Low).unwrap();
        table.add("normal-1", RouteConfig::Default, Priority::Normal).unwrap();
        table.add("high", RouteConfig::Default, Priority::High).unwrap();
        table.add("normal-2", RouteConfig::Default, Priority::Normal).unwrap();

        assert_eq!(patterns(&table), vec!["high", "normal-1", "normal-2", "low"]);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut table = RouteTable::new();
        assert!(table.add("a/:num", RouteConfig::Default, Priority::Normal).unwrap());
        assert!(!table
            .add("a/[0-9]+", RouteConfig::rewrite([("viewName", "x")]), Priority::Normal)
            .unwrap());
        assert_eq!(table.len(), 1);
        assert!(matches!(table.tier(Priority::Normal)[0].config(), RouteConfig::Default));

        // Same pattern in another tier is a different entry.
        assert!(table.add("a/:num", RouteConfig::Default, Priority::Low).unwrap());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut table = RouteTable::new();
        table.add("a/:any", RouteConfig::Default, Priority::Normal).unwrap();
        assert!(!table.remove("a/:any", Priority::High));
        assert!(!table.remove("missing", Priority::Normal));
        assert!(table.remove("a/:any", Priority::Normal));
        assert!(table.is_empty());
    }

    #[test]
    fn test_dispatch_helpers() {
        assert!(Dispatch::Handled(Output::Null).is_handled());
        assert!(!Dispatch::Unsatisfied.is_handled());
        assert_eq!(
            Dispatch::Handled(Output::Bool(false)).into_output(),
            Some(Output::Bool(false))
        );
        assert_eq!(Dispatch::Unsatisfied.into_output(), None);
    }

    #[test]
    fn test_config_debug() {
        assert_eq!(format!("{:?}", RouteConfig::Default), "Default");
        assert_eq!(
            format!("{:?}", RouteConfig::custom(|_, _| Ok(Dispatch::Unsatisfied))),
            "Custom(..)"
        );
        assert_eq!(
            format!("{:?}", RouteConfig::dynamic(|_| RouteConfig::Default)),
            "Dynamic(..)"
        );
        assert!(format!("{:?}", RouteConfig::rewrite([("k", "v")])).starts_with("Rewrite"));
    }
}

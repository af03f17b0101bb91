//! Settings for the mvcr-rs framework.
//!
//! [`Settings`] holds everything the dispatch core reads at construction
//! time: routing defaults, the route table source and the component search
//! paths. There is no global instance; settings are handed to the
//! dependency-injection context once per process (or per request).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::priority::Priority;

/// One entry of the route configuration source.
///
/// A bare string is a pattern dispatched to the default handler. A table
/// names the pattern and, optionally, fixed rewrite fields (`viewName`,
/// `viewType`, `viewMethod`, `viewParameters`, or any other key).
///
/// # Examples
///
/// ```
/// use mvcr_core::settings::RouteSetting;
///
/// let bare: RouteSetting = serde_json::from_str(r#"".*$""#).unwrap();
/// assert_eq!(bare.pattern(), ".*$");
///
/// let rewrite: RouteSetting =
///     serde_json::from_str(r#"{"pattern": "static", "viewName": "pages"}"#).unwrap();
/// assert_eq!(rewrite.rewrite_fields().unwrap()["viewName"], "pages");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteSetting {
    /// An index-keyed entry: the value is the pattern.
    Bare(String),
    /// A keyed entry with its configuration.
    Configured {
        /// The route pattern (a regular expression, wildcards allowed).
        pattern: String,
        /// Fixed fields merged into the matches on dispatch.
        #[serde(flatten)]
        fields: BTreeMap<String, String>,
    },
}

impl RouteSetting {
    /// Returns the route pattern.
    pub fn pattern(&self) -> &str {
        match self {
            Self::Bare(pattern) | Self::Configured { pattern, .. } => pattern,
        }
    }

    /// Returns the rewrite fields, or `None` when the entry uses the default handler.
    pub fn rewrite_fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Configured { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}

/// Routing defaults and the route configuration source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// View name used when a route captured none. `None` makes such routes unsatisfied.
    pub default_view_name: Option<String>,
    /// View type used when a route captured none.
    pub default_view_type: String,
    /// View method used when a route captured none.
    pub default_view_method: String,
    /// Routes added by `Router::init`, in order, at normal priority.
    pub routes: Vec<RouteSetting>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            default_view_name: Some("standard".to_string()),
            default_view_type: "html".to_string(),
            default_view_method: "index".to_string(),
            routes: Vec::new(),
        }
    }
}

/// A component search directory and its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSetting {
    /// The directory to search.
    pub path: PathBuf,
    /// The tier the directory belongs to.
    #[serde(default)]
    pub priority: Priority,
}

/// Configuration for a single resolver (controllers, models or views).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Prefix of fully-qualified type names, e.g. `app::controllers::`.
    pub namespace: String,
    /// Search directories.
    #[serde(default)]
    pub paths: Vec<PathSetting>,
}

impl LoaderSettings {
    /// Creates loader settings with a namespace and no search paths.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            paths: Vec::new(),
        }
    }
}

/// Component resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSettings {
    /// Extension of role files (`controller.<stem>.<extension>`).
    pub extension: String,
    /// Tier assigned to search paths passed directly into a resolver call.
    pub explicit_paths_priority: Priority,
    /// Index component directories once at startup instead of probing the
    /// filesystem on every resolution.
    pub scan_on_startup: bool,
    /// Controller resolver configuration.
    pub controllers: LoaderSettings,
    /// Model resolver configuration.
    pub models: LoaderSettings,
    /// View resolver configuration.
    pub views: LoaderSettings,
}

impl Default for ComponentSettings {
    fn default() -> Self {
        Self {
            extension: "rs".to_string(),
            explicit_paths_priority: Priority::Normal,
            scan_on_startup: false,
            controllers: LoaderSettings::with_namespace("app::controllers::"),
            models: LoaderSettings::with_namespace("app::models::"),
            views: LoaderSettings::with_namespace("app::views::"),
        }
    }
}

/// The complete set of framework settings.
///
/// # Examples
///
/// ```
/// use mvcr_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.routing.default_view_type, "html");
/// assert_eq!(settings.components.extension, "rs");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level filter (e.g. "info", "debug", "mvcr_router=trace").
    pub log_level: String,
    /// Routing defaults and routes.
    pub routing: RoutingSettings,
    /// Component resolution.
    pub components: ComponentSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            routing: RoutingSettings::default(),
            components: ComponentSettings::default(),
        }
    }
}

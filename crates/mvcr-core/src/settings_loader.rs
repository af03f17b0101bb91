//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML and JSON
//! documents and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults key by key).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `MVCR_DEBUG` | `debug` |
//! | `MVCR_LOG_LEVEL` | `log_level` |
//! | `MVCR_DEFAULT_VIEW_NAME` | `routing.default_view_name` |
//! | `MVCR_DEFAULT_VIEW_TYPE` | `routing.default_view_type` |
//! | `MVCR_DEFAULT_VIEW_METHOD` | `routing.default_view_method` |
//! | `MVCR_COMPONENT_EXTENSION` | `components.extension` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use mvcr_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/mvcr.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::MvcrError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys absent from the document keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, MvcrError> {
    let document: serde_json::Value = toml::from_str(toml_str)
        .map_err(|e| MvcrError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(document, "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, MvcrError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, MvcrError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, MvcrError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| MvcrError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, MvcrError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `MVCR_*` environment variable overrides to a settings struct.
///
/// `MVCR_DEBUG` accepts "true"/"1"/"yes" as true; anything else is false.
/// An empty `MVCR_DEFAULT_VIEW_NAME` clears the default view name.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("MVCR_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("MVCR_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("MVCR_DEFAULT_VIEW_NAME") {
        settings.routing.default_view_name = if val.is_empty() { None } else { Some(val) };
    }

    if let Ok(val) = std::env::var("MVCR_DEFAULT_VIEW_TYPE") {
        settings.routing.default_view_type = val;
    }

    if let Ok(val) = std::env::var("MVCR_DEFAULT_VIEW_METHOD") {
        settings.routing.default_view_method = val;
    }

    if let Ok(val) = std::env::var("MVCR_COMPONENT_EXTENSION") {
        settings.components.extension = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, format: &str) -> Result<String, MvcrError> {
    std::fs::read_to_string(path).map_err(|e| {
        MvcrError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deserializes `document` after deep-merging it over the default settings.
fn merge_over_defaults(document: serde_json::Value, format: &str) -> Result<Settings, MvcrError> {
    let mut merged = serde_json::to_value(Settings::default()).map_err(|e| {
        MvcrError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    overlay(&mut merged, document);
    serde_json::from_value(merged).map_err(|e| {
        MvcrError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Writes `document` onto `target`. Tables are walked key by key so a
/// partial `[components.views]` keeps the sibling defaults; any other value
/// replaces what was there.
fn overlay(target: &mut serde_json::Value, document: serde_json::Value) {
    let serde_json::Value::Object(entries) = document else {
        *target = document;
        return;
    };
    let Some(table) = target.as_object_mut() else {
        *target = serde_json::Value::Object(entries);
        return;
    };
    for (key, value) in entries {
        match table.get_mut(&key) {
            Some(slot) => overlay(slot, value),
            None => {
                table.insert(key, value);
            }
        }
    }
}

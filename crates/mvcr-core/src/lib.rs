//! # mvcr-core
//!
//! Core types for the mvcr-rs dispatch framework. This crate has no framework
//! dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`priority`] - The six-level priority scale shared by routes, paths and hooks
//! - [`error`] - Error types and result aliases
//! - [`component`] - Capability traits for controllers, models and views
//! - [`settings`] - Framework settings
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod component;
pub mod error;
pub mod logging;
pub mod priority;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use component::{Component, Controller, Model, Output, View};
pub use error::{MvcrError, MvcrResult};
pub use priority::Priority;
pub use settings::Settings;

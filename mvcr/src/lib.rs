//! # mvcr
//!
//! The request-dispatch core of an MVC framework.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `mvcr` to get the whole dispatch core, or depend on
//! individual crates for finer-grained control.
//!
//! # Examples
//!
//! ```
//! use mvcr::core::{Output, Priority, Settings};
//! use mvcr::router::{Dispatch, Mvcr, RouteConfig};
//!
//! let mut app = Mvcr::new(Settings::default()).unwrap();
//! app.router_mut()
//!     .add_route(
//!         "hello/(?P<who>:any)",
//!         RouteConfig::custom(|m, _| {
//!             Ok(Dispatch::Handled(Output::from(format!("hello {}", m.get("who").unwrap_or("")))))
//!         }),
//!         Priority::Normal,
//!     )
//!     .unwrap();
//!
//! assert_eq!(app.route("hello/world").unwrap(), Output::from("hello world"));
//! ```

/// Priorities, errors, component traits, settings and logging.
pub use mvcr_core as core;

/// The hook gateway and the event trait.
pub use mvcr_hooks as hooks;

/// Controller, model and view resolution.
pub use mvcr_loaders as loaders;

/// Routing, the default dispatcher and the framework context.
pub use mvcr_router as router;

pub use mvcr_core::{MvcrError, MvcrResult, Output, Priority, Settings};
pub use mvcr_router::Mvcr;

// Third-party re-exports
pub use serde;
pub use serde_json;
pub use tracing;

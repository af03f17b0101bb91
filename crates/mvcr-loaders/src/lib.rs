//! # mvcr-loaders
//!
//! Resolves symbolic component names ("blog", "admin/users") to freshly
//! constructed controllers, models and views.
//!
//! The three resolvers share one generic implementation, [`Resolver`],
//! parameterised by a [`Role`]:
//!
//! - [`Controllers`] loads `controller.<stem>.<ext>` files into [`Controller`](mvcr_core::Controller)s
//! - [`Models`] loads `model.<stem>.<ext>` files into [`Model`](mvcr_core::Model)s
//! - [`Views`] loads `view.<type>.<stem>.<ext>` files into [`View`](mvcr_core::View)s
//!
//! ## Modules
//!
//! - [`paths`] - [`PriorityPathSet`], the tiered search directories
//! - [`registry`] - [`UnitRegistry`], type names mapped to constructors
//! - [`source`] - Existence checks: live filesystem or a startup index
//! - [`role`] - The role conventions (file names, type suffixes)
//! - [`events`] - The get-events fired before every resolution
//! - [`resolver`] - The resolution algorithm

pub mod events;
pub mod paths;
pub mod registry;
pub mod resolver;
pub mod role;
pub mod source;

pub use events::{ControllerGetEvent, GetEvent, ModelGetEvent, ViewGetEvent};
pub use paths::PriorityPathSet;
pub use registry::{UnitContext, UnitRegistry};
pub use resolver::{Controllers, Models, ResolveOptions, Resolver, Views};
pub use role::{ControllerRole, ModelRole, Role, ViewBinding, ViewRole};
pub use source::{ComponentSource, IndexedSource, LiveSource};

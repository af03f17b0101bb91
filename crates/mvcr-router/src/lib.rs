//! # mvcr-router
//!
//! Priority-tiered regex routing and the default controller/view dispatcher.
//!
//! A [`Router`] holds routes in six [`Priority`](mvcr_core::Priority) tiers.
//! Each route is a regular expression anchored to the whole path, with two
//! wildcards expanded when the route is added:
//!
//! | wildcard | expands to |
//! |---|---|
//! | `:any` | `[^/]+` |
//! | `:num` | `[0-9]+` |
//!
//! A matched route either calls a custom handler or hands its named captures
//! (`viewName`, `viewType`, `viewMethod`, `viewParameters`) to the
//! [`DefaultDispatcher`], which resolves a controller and a view and calls a
//! view method.
//!
//! ## Modules
//!
//! - [`matches`] - Captured groups of a matched route
//! - [`route`] - Route configuration, routes and the tiered route table
//! - [`events`] - Hook events fired while routing
//! - [`dispatcher`] - The default controller/view dispatcher
//! - [`router`] - The router itself
//! - [`context`] - Settings-driven wiring of hooks, resolvers and router

pub mod context;
pub mod dispatcher;
pub mod events;
pub mod matches;
pub mod route;
pub mod router;

pub use context::Mvcr;
pub use dispatcher::{DefaultDispatcher, DispatchSession};
pub use events::{
    MethodCandidates, RouterCallViewEvent, RouterLoadCallableEvent,
    RouterLoadViewAndControllerEvent,
};
pub use matches::Matches;
pub use route::{Callable, Dispatch, Route, RouteConfig, RouteHandler, RouteTable, RewriteFn};
pub use router::{RouteEntry, Router};

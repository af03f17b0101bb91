//! The router: matches paths against the route table and dispatches them.
//!
//! Candidates are tried tier by tier ([`Priority`] order) and, within a tier,
//! in insertion order. For each route whose anchored pattern matches the
//! path:
//!
//! 1. a [`RouteConfig::Dynamic`] rewrite is evaluated against the matches;
//! 2. a custom handler is taken as the callable, static rewrite fields are
//!    merged into the matches, and anything else uses the default dispatcher;
//! 3. [`RouterLoadCallableEvent`] is fired; cancelling it halts the route;
//! 4. the callable is invoked. [`Dispatch::Unsatisfied`] moves on to the next
//!    candidate; anything else is the result of [`Router::route`].
//!
//! When every candidate is exhausted the router fails with
//! [`MvcrError::NotFound`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use mvcr_core::logging::dispatch_span;
use mvcr_core::settings::{RouteSetting, RoutingSettings};
use mvcr_core::{Controller, MvcrError, MvcrResult, Output, Priority, View};
use mvcr_hooks::{Event, HookGateway};
use mvcr_loaders::{Controllers, Views};

use crate::dispatcher::{DefaultDispatcher, DispatchSession};
use crate::events::RouterLoadCallableEvent;
use crate::matches::Matches;
use crate::route::{Callable, Dispatch, Route, RouteConfig, RouteTable};

/// One entry of a programmatic route list for [`Router::init_with`].
#[derive(Debug, Clone)]
pub enum RouteEntry {
    /// A pattern dispatched to the default handler.
    Bare(String),
    /// A pattern with its configuration.
    Configured(String, RouteConfig),
}

impl From<&RouteSetting> for RouteEntry {
    fn from(setting: &RouteSetting) -> Self {
        match setting.rewrite_fields() {
            Some(fields) => Self::Configured(
                setting.pattern().to_string(),
                RouteConfig::Rewrite(fields.clone()),
            ),
            None => Self::Bare(setting.pattern().to_string()),
        }
    }
}

/// Matches paths to routes and invokes their handlers.
///
/// A router is meant to be owned by one request (or guarded by the caller);
/// it keeps the last matched route, matches, controller and view for
/// introspection.
pub struct Router {
    table: RouteTable,
    configured_routes: Vec<RouteSetting>,
    dispatcher: DefaultDispatcher,
    hooks: Arc<HookGateway>,
    session: DispatchSession,
}

impl Router {
    /// Creates a router with an empty route table.
    ///
    /// `routing` supplies the default-dispatcher fallbacks and the routes
    /// [`init`](Self::init) will add.
    pub fn new(
        routing: &RoutingSettings,
        controllers: Controllers,
        views: Views,
        hooks: Arc<HookGateway>,
    ) -> Self {
        Self {
            table: RouteTable::new(),
            configured_routes: routing.routes.clone(),
            dispatcher: DefaultDispatcher::new(controllers, views, Arc::clone(&hooks), routing),
            hooks,
            session: DispatchSession::new(),
        }
    }

    /// Adds the configured routes at normal priority, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::ImproperlyConfigured`] for the first invalid
    /// pattern; routes before it stay added.
    pub fn init(&mut self) -> MvcrResult<()> {
        let entries: Vec<RouteEntry> = self.configured_routes.iter().map(RouteEntry::from).collect();
        self.init_with(entries)
    }

    /// Adds `entries` at normal priority, in order.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::ImproperlyConfigured`] for the first invalid pattern.
    pub fn init_with<I>(&mut self, entries: I) -> MvcrResult<()>
    where
        I: IntoIterator<Item = RouteEntry>,
    {
        for entry in entries {
            match entry {
                RouteEntry::Bare(pattern) => {
                    self.add_route(&pattern, RouteConfig::Default, Priority::Normal)?;
                }
                RouteEntry::Configured(pattern, config) => {
                    self.add_route(&pattern, config, Priority::Normal)?;
                }
            }
        }
        Ok(())
    }

    /// Adds a route to a tier. `:any` and `:num` are expanded first.
    ///
    /// Adding a pattern the tier already holds changes nothing and returns
    /// `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::ImproperlyConfigured`] if the pattern is not a
    /// valid regular expression.
    pub fn add_route(
        &mut self,
        pattern: &str,
        config: RouteConfig,
        priority: Priority,
    ) -> MvcrResult<bool> {
        self.table.add(pattern, config, priority)
    }

    /// Adds a default-handler route at normal priority.
    ///
    /// # Errors
    ///
    /// See [`add_route`](Self::add_route).
    pub fn add_default_route(&mut self, pattern: &str) -> MvcrResult<bool> {
        self.add_route(pattern, RouteConfig::Default, Priority::Normal)
    }

    /// Removes a route from a tier. Returns `false` if it was absent.
    pub fn remove_route(&mut self, pattern: &str, priority: Priority) -> bool {
        self.table.remove(pattern, priority)
    }

    /// All routes in match order.
    pub fn routes(&self) -> impl Iterator<Item = (Priority, &Route)> {
        self.table.iter()
    }

    /// The routes of one tier, in insertion order.
    pub fn routes_at(&self, priority: Priority) -> &[Route] {
        self.table.tier(priority)
    }

    /// Routes `path` and returns the output of the first satisfied handler.
    ///
    /// # Errors
    ///
    /// - [`MvcrError::NotFound`] if no route is satisfied
    /// - [`MvcrError::Halt`] if a hook or view stops the route
    /// - any other error raised by a hook, resolver or handler
    pub fn route(&mut self, path: &str) -> MvcrResult<Output> {
        let span = dispatch_span(path);
        let _guard = span.enter();
        self.session.clear();

        for (priority, route) in self.table.iter() {
            let Some(mut matches) = route.match_path(path) else {
                continue;
            };
            debug!(route = route.pattern(), %priority, "Route matched");
            self.session.route = Some(route.pattern().to_string());

            let config = match route.config() {
                RouteConfig::Dynamic(rewrite) => rewrite(&matches),
                other => other.clone(),
            };
            let callable = match config {
                RouteConfig::Custom(handler) => Callable::Custom(handler),
                RouteConfig::Rewrite(fields) => {
                    matches.merge(&fields);
                    Callable::Default
                }
                RouteConfig::Dynamic(_) => {
                    warn!(
                        route = route.pattern(),
                        "Dynamic rewrite returned another dynamic rewrite, using the default handler"
                    );
                    Callable::Default
                }
                RouteConfig::Default => Callable::Default,
            };
            self.session.matches = Some(matches.clone());

            let event = self
                .hooks
                .fire(RouterLoadCallableEvent::new(callable, matches, route.pattern()))?;
            if event.is_cancelled() {
                return Err(MvcrError::Halt(format!(
                    "Will not load callable. Cancelled by {}",
                    RouterLoadCallableEvent::NAME
                )));
            }
            let RouterLoadCallableEvent {
                callable,
                matches,
                route: route_name,
                ..
            } = event;

            let named: Vec<(&str, &str)> = matches.named().collect();
            debug!(callable = ?callable, matches = ?named, "Loading callable with matches");
            let outcome = match &callable {
                Callable::Default => self.dispatcher.dispatch(&matches, &route_name, &mut self.session)?,
                Callable::Custom(handler) => handler(&matches, &route_name)?,
            };
            self.session.route = Some(route_name);
            self.session.matches = Some(matches);

            match outcome {
                Dispatch::Handled(output) => return Ok(output),
                Dispatch::Unsatisfied => {
                    debug!("Callable not satisfied, skipping to next callable");
                }
            }
        }

        Err(MvcrError::NotFound(format!(
            "Could not load view. Router could not find matching route for '{path}'"
        )))
    }

    /// Runs the default dispatcher directly, recording what it resolves.
    ///
    /// # Errors
    ///
    /// See [`DefaultDispatcher::dispatch`].
    pub fn default_callable(&mut self, matches: &Matches, route: &str) -> MvcrResult<Dispatch> {
        self.dispatcher.dispatch(matches, route, &mut self.session)
    }

    // ── Introspection ───────────────────────────────────────────────

    /// The pattern of the last matched route.
    pub fn current_route(&self) -> Option<&str> {
        self.session.route()
    }

    /// The matches of the last matched route, after rewrites and hooks.
    pub const fn current_matches(&self) -> Option<&Matches> {
        self.session.matches()
    }

    /// The last controller the default dispatcher resolved.
    pub const fn current_controller(&self) -> Option<&Arc<dyn Controller>> {
        self.session.controller()
    }

    /// The last view the default dispatcher resolved.
    pub fn current_view(&self) -> Option<&dyn View> {
        self.session.view()
    }

    // ── Collaborators ───────────────────────────────────────────────

    /// The default dispatcher.
    pub const fn dispatcher(&self) -> &DefaultDispatcher {
        &self.dispatcher
    }

    /// The default dispatcher, mutably.
    pub fn dispatcher_mut(&mut self) -> &mut DefaultDispatcher {
        &mut self.dispatcher
    }

    /// The hook gateway the router fires through.
    pub const fn hooks(&self) -> &Arc<HookGateway> {
        &self.hooks
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("dispatcher", &self.dispatcher)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

//! The built-in route handler.
//!
//! [`DefaultDispatcher`] reads `viewName`, `viewType`, `viewMethod` and
//! `viewParameters` from the matches, resolves a controller and a view of that
//! name, and calls the first candidate method the view answers to.
//!
//! A controller or view that does not exist makes the route unsatisfied, so
//! the router moves on to the next candidate. Hooks and views can halt the
//! whole route.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use mvcr_core::settings::RoutingSettings;
use mvcr_core::{Controller, MvcrError, MvcrResult, View};
use mvcr_hooks::{Event, HookGateway};
use mvcr_loaders::{Controllers, Views};

use crate::events::{MethodCandidates, RouterCallViewEvent, RouterLoadViewAndControllerEvent};
use crate::matches::Matches;
use crate::route::Dispatch;

/// What the last dispatch resolved, kept for introspection.
#[derive(Default)]
pub struct DispatchSession {
    pub(crate) route: Option<String>,
    pub(crate) matches: Option<Matches>,
    pub(crate) controller: Option<Arc<dyn Controller>>,
    pub(crate) view: Option<Box<dyn View>>,
}

impl DispatchSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last matched pattern.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// The matches of the last matched pattern.
    pub const fn matches(&self) -> Option<&Matches> {
        self.matches.as_ref()
    }

    /// The last resolved controller.
    pub const fn controller(&self) -> Option<&Arc<dyn Controller>> {
        self.controller.as_ref()
    }

    /// The last resolved view.
    pub fn view(&self) -> Option<&dyn View> {
        self.view.as_deref()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for DispatchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSession")
            .field("route", &self.route)
            .field("matches", &self.matches)
            .field("has_controller", &self.controller.is_some())
            .field("has_view", &self.view.is_some())
            .finish()
    }
}

/// Resolves a controller and view for a matched route and calls the view.
pub struct DefaultDispatcher {
    controllers: Controllers,
    views: Views,
    hooks: Arc<HookGateway>,
    default_view_name: Option<String>,
    default_view_type: String,
    default_view_method: String,
}

impl DefaultDispatcher {
    /// Creates a dispatcher with the routing defaults of `routing`.
    pub fn new(
        controllers: Controllers,
        views: Views,
        hooks: Arc<HookGateway>,
        routing: &RoutingSettings,
    ) -> Self {
        Self {
            controllers,
            views,
            hooks,
            default_view_name: routing.default_view_name.clone(),
            default_view_type: routing.default_view_type.clone(),
            default_view_method: routing.default_view_method.clone(),
        }
    }

    /// The controller resolver.
    pub const fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    /// The controller resolver, mutably (to manage its component paths).
    pub fn controllers_mut(&mut self) -> &mut Controllers {
        &mut self.controllers
    }

    /// The view resolver.
    pub const fn views(&self) -> &Views {
        &self.views
    }

    /// The view resolver, mutably (to manage its component paths).
    pub fn views_mut(&mut self) -> &mut Views {
        &mut self.views
    }

    /// Dispatches one matched route, recording what it resolved in `session`.
    ///
    /// Returns [`Dispatch::Unsatisfied`] when no view name is available, when
    /// the controller or view does not exist, or when the view answers to none
    /// of the candidate methods.
    ///
    /// # Errors
    ///
    /// - [`MvcrError::Halt`] if a dispatch hook cancels or the view halts
    /// - [`MvcrError::HookFailure`] if a hook listener fails
    /// - any resolver error other than [`MvcrError::NotFound`]
    /// - any error returned by the view method
    pub fn dispatch(
        &self,
        matches: &Matches,
        route: &str,
        session: &mut DispatchSession,
    ) -> MvcrResult<Dispatch> {
        debug!(route, "Default dispatcher called");

        let Some(view_name) = matches
            .get_non_empty("viewName")
            .map(str::to_string)
            .or_else(|| self.default_view_name.clone())
        else {
            debug!(route, "No view name captured and no default configured");
            return Ok(Dispatch::Unsatisfied);
        };
        let view_type = matches
            .get_non_empty("viewType")
            .unwrap_or(self.default_view_type.as_str());
        let view_method = matches
            .get_non_empty("viewMethod")
            .unwrap_or(self.default_view_method.as_str());
        let view_parameters = matches.get("viewParameters").unwrap_or("");

        let mut event = self.hooks.fire(RouterLoadViewAndControllerEvent::new(
            view_name,
            view_type,
            MethodCandidates::single(view_method),
            view_parameters,
            route,
        ))?;
        if event.is_cancelled() {
            return Err(MvcrError::Halt(format!(
                "Will not load view. Cancelled by {}",
                RouterLoadViewAndControllerEvent::NAME
            )));
        }

        let controller: Arc<dyn Controller> = match event.controller.take() {
            Some(controller) => controller,
            None => match self.controllers.get(&event.view_name) {
                Ok(controller) => Arc::from(controller),
                Err(e) if e.is_not_found() => {
                    debug!(view_name = %event.view_name, error = %e, "Controller not found, route unsatisfied");
                    return Ok(Dispatch::Unsatisfied);
                }
                Err(e) => return Err(e),
            },
        };
        session.controller = Some(Arc::clone(&controller));

        let view = match self
            .views
            .get(&event.view_name, Arc::clone(&controller), &event.view_type)
        {
            Ok(view) => view,
            Err(e) if e.is_not_found() => {
                debug!(view_name = %event.view_name, view_type = %event.view_type, error = %e, "View not found, route unsatisfied");
                return Ok(Dispatch::Unsatisfied);
            }
            Err(e) => return Err(e),
        };

        let call = self.hooks.fire(RouterCallViewEvent::new(
            view,
            controller,
            event.view_methods,
            event.view_parameters,
            event.route,
        ))?;
        let cancelled = call.is_cancelled();
        let RouterCallViewEvent {
            mut view,
            controller,
            view_methods,
            view_parameters,
            ..
        } = call;
        session.controller = Some(controller);

        if cancelled {
            session.view = Some(view);
            return Err(MvcrError::Halt(format!(
                "Will not load view. Cancelled by {}",
                RouterCallViewEvent::NAME
            )));
        }
        if view.halt() {
            session.view = Some(view);
            return Err(MvcrError::Halt(
                "Will not load view. Cancelled by the view's halt marker".to_string(),
            ));
        }

        let method = view_methods
            .first_available(|method| view.has_method(method))
            .map(str::to_string);
        let outcome = match method {
            Some(method) => {
                debug!(method = %method, "Calling view method");
                view.call_method(&method, &view_parameters).map(Dispatch::Handled)
            }
            None => {
                debug!(methods = ?view_methods, "View has none of the candidate methods");
                Ok(Dispatch::Unsatisfied)
            }
        };
        session.view = Some(view);
        outcome
    }
}

impl fmt::Debug for DefaultDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultDispatcher")
            .field("controllers", &self.controllers)
            .field("views", &self.views)
            .field("default_view_name", &self.default_view_name)
            .field("default_view_type", &self.default_view_type)
            .field("default_view_method", &self.default_view_method)
            .finish_non_exhaustive()
    }
}

//! Events fired by the router and the default dispatcher.
//!
//! | event | fired | cancel |
//! |---|---|---|
//! | [`RouterLoadCallableEvent`] | before a matched route's handler is called | halts the route |
//! | [`RouterLoadViewAndControllerEvent`] | before the controller and view are resolved | halts the route |
//! | [`RouterCallViewEvent`] | before the view method is called | halts the route |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mvcr_core::{Controller, Priority, View};
use mvcr_hooks::Event;

use crate::matches::Matches;
use crate::route::Callable;

/// View method names grouped by priority tier.
///
/// The default dispatcher calls the first name, in tier order, that the view
/// answers to.
///
/// # Examples
///
/// ```
/// use mvcr_core::Priority;
/// use mvcr_router::MethodCandidates;
///
/// let mut methods = MethodCandidates::single("index");
/// methods.add("altered", Priority::High);
///
/// let order: Vec<&str> = methods.iter().map(|(_, m)| m).collect();
/// assert_eq!(order, vec!["altered", "index"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodCandidates {
    tiers: BTreeMap<Priority, Vec<String>>,
}

impl MethodCandidates {
    /// No candidates.
    pub fn new() -> Self {
        Self::default()
    }

    /// One candidate at normal priority.
    pub fn single(method: impl Into<String>) -> Self {
        let mut candidates = Self::new();
        candidates.add(method, Priority::Normal);
        candidates
    }

    /// Appends a method to a tier, unless the tier already holds it.
    pub fn add(&mut self, method: impl Into<String>, priority: Priority) -> bool {
        let method = method.into();
        let tier = self.tiers.entry(priority).or_default();
        if tier.contains(&method) {
            return false;
        }
        tier.push(method);
        true
    }

    /// The methods of one tier.
    pub fn tier(&self, priority: Priority) -> &[String] {
        self.tiers.get(&priority).map_or(&[], Vec::as_slice)
    }

    /// Iterates `(tier, method)` pairs in call-preference order.
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &str)> {
        self.tiers
            .iter()
            .flat_map(|(priority, methods)| methods.iter().map(move |m| (*priority, m.as_str())))
    }

    /// The first method accepted by `available`.
    pub fn first_available(&self, mut available: impl FnMut(&str) -> bool) -> Option<&str> {
        self.iter().map(|(_, m)| m).find(|m| available(m))
    }

    /// Total number of candidates.
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Returns `true` if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fired before a matched route's handler is called.
///
/// Listeners may replace the handler, the matches or the route.
#[derive(Debug)]
pub struct RouterLoadCallableEvent {
    /// The handler about to be called.
    pub callable: Callable,
    /// The matches it will be called with.
    pub matches: Matches,
    /// The matched pattern.
    pub route: String,
    cancelled: bool,
}

impl RouterLoadCallableEvent {
    /// Creates the event.
    pub fn new(callable: Callable, matches: Matches, route: impl Into<String>) -> Self {
        Self {
            callable,
            matches,
            route: route.into(),
            cancelled: false,
        }
    }
}

impl Event for RouterLoadCallableEvent {
    const NAME: &'static str = "routerLoadCallableEvent";

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

/// Fired by the default dispatcher before the controller and view are resolved.
pub struct RouterLoadViewAndControllerEvent {
    /// The name both the controller and the view are resolved by.
    pub view_name: String,
    /// The view type.
    pub view_type: String,
    /// Candidate view methods.
    pub view_methods: MethodCandidates,
    /// Raw parameters passed to the view method.
    pub view_parameters: String,
    /// The matched pattern.
    pub route: String,
    /// When set, used instead of resolving a controller.
    pub controller: Option<Arc<dyn Controller>>,
    cancelled: bool,
}

impl RouterLoadViewAndControllerEvent {
    /// Creates the event with no controller override.
    pub fn new(
        view_name: impl Into<String>,
        view_type: impl Into<String>,
        view_methods: MethodCandidates,
        view_parameters: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            view_name: view_name.into(),
            view_type: view_type.into(),
            view_methods,
            view_parameters: view_parameters.into(),
            route: route.into(),
            controller: None,
            cancelled: false,
        }
    }

    /// Adds a candidate view method.
    pub fn add_method(&mut self, method: impl Into<String>, priority: Priority) {
        self.view_methods.add(method, priority);
    }

    /// Supplies the controller instead of letting the dispatcher resolve one.
    pub fn override_controller(&mut self, controller: Arc<dyn Controller>) {
        self.controller = Some(controller);
    }
}

impl Event for RouterLoadViewAndControllerEvent {
    const NAME: &'static str = "routerLoadViewAndControllerEvent";

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

impl fmt::Debug for RouterLoadViewAndControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterLoadViewAndControllerEvent")
            .field("view_name", &self.view_name)
            .field("view_type", &self.view_type)
            .field("view_methods", &self.view_methods)
            .field("view_parameters", &self.view_parameters)
            .field("route", &self.route)
            .field("controller_overridden", &self.controller.is_some())
            .field("cancelled", &self.cancelled)
            .finish()
    }
}

/// Fired by the default dispatcher before the view method is called.
///
/// Listeners may replace the view or the controller.
pub struct RouterCallViewEvent {
    /// The resolved view.
    pub view: Box<dyn View>,
    /// The controller the view belongs to.
    pub controller: Arc<dyn Controller>,
    /// Candidate view methods.
    pub view_methods: MethodCandidates,
    /// Raw parameters passed to the view method.
    pub view_parameters: String,
    /// The matched pattern.
    pub route: String,
    cancelled: bool,
}

impl RouterCallViewEvent {
    /// Creates the event.
    pub fn new(
        view: Box<dyn View>,
        controller: Arc<dyn Controller>,
        view_methods: MethodCandidates,
        view_parameters: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            view,
            controller,
            view_methods,
            view_parameters: view_parameters.into(),
            route: route.into(),
            cancelled: false,
        }
    }
}

impl Event for RouterCallViewEvent {
    const NAME: &'static str = "routerCallViewEvent";

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

impl fmt::Debug for RouterCallViewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterCallViewEvent")
            .field("view_methods", &self.view_methods)
            .field("view_parameters", &self.view_parameters)
            .field("route", &self.route)
            .field("cancelled", &self.cancelled)
            .finish_non_exhaustive()
    }
}

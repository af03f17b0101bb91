//! Get-events fired before every resolution.
//!
//! The payload is the mutable resolution request. Listeners may rewrite the
//! name, the search paths, the namespace or the constructor arguments, or
//! cancel the event to refuse the resolution outright.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use mvcr_core::Controller;
use mvcr_hooks::Event;

use crate::paths::PriorityPathSet;
use crate::role::{ControllerRole, ModelRole, Role, ViewRole};

/// The resolution request of one role, as seen by get-hook listeners.
pub struct GetEvent<R: Role> {
    /// The symbolic name, e.g. `blog` or `admin/users`.
    pub name: String,
    /// The directories that will be searched.
    pub paths: PriorityPathSet,
    /// The type name prefix.
    pub namespace: String,
    /// Constructor arguments.
    pub arguments: Vec<Value>,
    /// Role-specific data; for views the view type and owning controller.
    pub binding: R::Binding,
    cancelled: bool,
    role: PhantomData<fn() -> R>,
}

/// Fired as `controllerGetEvent`.
pub type ControllerGetEvent = GetEvent<ControllerRole>;
/// Fired as `modelGetEvent`.
pub type ModelGetEvent = GetEvent<ModelRole>;
/// Fired as `viewGetEvent`.
pub type ViewGetEvent = GetEvent<ViewRole>;

impl<R: Role> GetEvent<R> {
    /// Creates an uncancelled request.
    pub fn new(
        name: impl Into<String>,
        paths: PriorityPathSet,
        namespace: impl Into<String>,
        arguments: Vec<Value>,
        binding: R::Binding,
    ) -> Self {
        Self {
            name: name.into(),
            paths,
            namespace: namespace.into(),
            arguments,
            binding,
            cancelled: false,
            role: PhantomData,
        }
    }
}

impl ViewGetEvent {
    /// The requested view type.
    pub fn view_type(&self) -> &str {
        &self.binding.view_type
    }

    /// The controller the view will be associated with.
    pub fn controller(&self) -> &Arc<dyn Controller> {
        &self.binding.controller
    }
}

impl<R: Role> Event for GetEvent<R> {
    const NAME: &'static str = R::GET_EVENT;

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

impl<R: Role> fmt::Debug for GetEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(R::GET_EVENT)
            .field("name", &self.name)
            .field("paths", &self.paths)
            .field("namespace", &self.namespace)
            .field("arguments", &self.arguments)
            .field("cancelled", &self.cancelled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvcr_core::Priority;

    struct Blog;
    impl Controller for Blog {}

    #[test]
    fn test_event_names() {
        assert_eq!(ControllerGetEvent::NAME, "controllerGetEvent");
        assert_eq!(ModelGetEvent::NAME, "modelGetEvent");
        assert_eq!(ViewGetEvent::NAME, "viewGetEvent");
    }

    #[test]
    fn test_cancel() {
        let mut event = ControllerGetEvent::new("blog", PriorityPathSet::new(), "ns::", vec![], ());
        assert!(!event.is_cancelled());
        event.cancel();
        assert!(event.is_cancelled());
        event.set_cancelled(false);
        assert!(!event.is_cancelled());
    }

    #[test]
    fn test_view_accessors() {
        let controller: Arc<dyn Controller> = Arc::new(Blog);
        let event = ViewGetEvent::new(
            "blog",
            PriorityPathSet::single(Priority::Normal, ["views"]),
            "app::views::",
            vec![],
            crate::role::ViewBinding::new("json", Arc::clone(&controller)),
        );
        assert_eq!(event.view_type(), "json");
        assert!(event.controller().is::<Blog>());
    }

    #[test]
    fn test_debug() {
        let event = ModelGetEvent::new("user", PriorityPathSet::new(), "m::", vec![Value::from(1)], ());
        let debug = format!("{event:?}");
        assert!(debug.starts_with("modelGetEvent"));
        assert!(debug.contains("\"user\""));
    }
}

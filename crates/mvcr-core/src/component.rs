//! Capability traits for the three component roles.
//!
//! A type takes part in dispatch by implementing one of [`Controller`],
//! [`Model`] or [`View`]. Constructors hand components to the resolvers
//! wrapped in a [`Component`], whose variant is the role tag the resolvers
//! check before returning a unit to the caller.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::MvcrResult;

/// The value a view method (or a custom route handler) produces.
pub type Output = serde_json::Value;

/// Exposes a component as [`Any`] so callers can recover the concrete type.
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as a `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A controller: the request-scoped owner of application logic.
///
/// The dispatch core requires nothing of a controller beyond the tag.
///
/// # Examples
///
/// ```
/// use mvcr_core::Controller;
///
/// struct BlogController;
/// impl Controller for BlogController {}
///
/// let controller: Box<dyn Controller> = Box::new(BlogController);
/// assert!(controller.downcast_ref::<BlogController>().is_some());
/// ```
pub trait Controller: AsAny + Send + Sync {}

impl dyn Controller {
    /// Returns the concrete controller if it is a `T`.
    pub fn downcast_ref<T: Controller>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the concrete controller is a `T`.
    pub fn is<T: Controller>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A model. Loaded through the model resolver; unused by the router itself.
pub trait Model: AsAny + Send + Sync {}

impl dyn Model {
    /// Returns the concrete model if it is a `T`.
    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A view: the object whose methods the default dispatcher calls.
///
/// Rust has no runtime reflection, so a view publishes which methods it
/// answers to through [`has_method`](View::has_method) and performs the call in
/// [`call_method`](View::call_method).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mvcr_core::{Controller, MvcrError, MvcrResult, Output, View};
///
/// struct BlogHtmlView {
///     controller: Option<Arc<dyn Controller>>,
/// }
///
/// impl View for BlogHtmlView {
///     fn set_controller(&mut self, controller: Arc<dyn Controller>) {
///         self.controller = Some(controller);
///     }
///
///     fn has_method(&self, method: &str) -> bool {
///         method == "show"
///     }
///
///     fn call_method(&mut self, method: &str, parameters: &str) -> MvcrResult<Output> {
///         match method {
///             "show" => Ok(Output::String(format!("post {parameters}"))),
///             other => Err(MvcrError::NotFound(other.to_string())),
///         }
///     }
/// }
/// ```
pub trait View: AsAny + Send + Sync {
    /// Associates the controller the view was resolved for.
    ///
    /// The view may read the controller but does not own the request.
    fn set_controller(&mut self, controller: Arc<dyn Controller>) {
        let _ = controller;
    }

    /// When `true` the dispatcher refuses to call any method on this view.
    fn halt(&self) -> bool {
        false
    }

    /// Returns `true` if `method` can be invoked on this view.
    fn has_method(&self, method: &str) -> bool;

    /// Invokes `method` with the raw view parameters taken from the route.
    fn call_method(&mut self, method: &str, parameters: &str) -> MvcrResult<Output>;
}

impl dyn View {
    /// Returns the concrete view if it is a `T`.
    pub fn downcast_ref<T: View>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the concrete view is a `T`.
    pub fn is<T: View>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// A freshly constructed unit, tagged with the role it implements.
pub enum Component {
    /// A unit implementing [`Controller`].
    Controller(Box<dyn Controller>),
    /// A unit implementing [`Model`].
    Model(Box<dyn Model>),
    /// A unit implementing [`View`].
    View(Box<dyn View>),
}

impl Component {
    /// Wraps a controller.
    pub fn controller(controller: impl Controller) -> Self {
        Self::Controller(Box::new(controller))
    }

    /// Wraps a model.
    pub fn model(model: impl Model) -> Self {
        Self::Model(Box::new(model))
    }

    /// Wraps a view.
    pub fn view(view: impl View) -> Self {
        Self::View(Box::new(view))
    }

    /// The role this component carries.
    pub const fn role(&self) -> &'static str {
        match self {
            Self::Controller(_) => "controller",
            Self::Model(_) => "model",
            Self::View(_) => "view",
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.role()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MvcrError;

    struct Home;
    impl Controller for Home {}

    struct Other;
    impl Controller for Other {}

    struct User;
    impl Model for User {}

    #[derive(Default)]
    struct Page {
        controller: Option<Arc<dyn Controller>>,
    }

    impl View for Page {
        fn set_controller(&mut self, controller: Arc<dyn Controller>) {
            self.controller = Some(controller);
        }

        fn has_method(&self, method: &str) -> bool {
            method == "index"
        }

        fn call_method(&mut self, method: &str, parameters: &str) -> MvcrResult<Output> {
            if method == "index" {
                Ok(Output::String(parameters.to_uppercase()))
            } else {
                Err(MvcrError::NotFound(method.to_string()))
            }
        }
    }

    #[test]
    fn test_controller_downcast() {
        let controller: Arc<dyn Controller> = Arc::new(Home);
        assert!(controller.is::<Home>());
        assert!(!controller.is::<Other>());
        assert!(controller.downcast_ref::<Home>().is_some());
    }

    #[test]
    fn test_model_downcast() {
        let model: Box<dyn Model> = Box::new(User);
        assert!(model.downcast_ref::<User>().is_some());
    }

    #[test]
    fn test_view_defaults_and_call() {
        let mut view: Box<dyn View> = Box::new(Page::default());
        assert!(!view.halt());
        assert!(view.has_method("index"));
        assert!(!view.has_method("missing"));
        assert_eq!(view.call_method("index", "abc").unwrap(), Output::from("ABC"));

        view.set_controller(Arc::new(Home));
        let page = view.downcast_ref::<Page>().unwrap();
        assert!(page.controller.as_ref().unwrap().is::<Home>());
    }

    #[test]
    fn test_component_roles() {
        assert_eq!(Component::controller(Home).role(), "controller");
        assert_eq!(Component::model(User).role(), "model");
        assert_eq!(Component::view(Page::default()).role(), "view");
        assert_eq!(format!("{:?}", Component::model(User)), "Component(\"model\")");
    }
}

//! Per-role conventions for the generic resolver.
//!
//! A [`Role`] fixes everything that differs between controllers, models and
//! views: the unit type handed back, the file naming convention, the type
//! name suffix, the get-event name, and what happens to a unit after it is
//! constructed.

use std::fmt;
use std::sync::Arc;

use mvcr_core::{Component, Controller, Model, View};

/// The conventions of one component role.
pub trait Role: Send + Sync + 'static {
    /// The trait object the resolver returns.
    type Unit: ?Sized + Send + Sync;
    /// Extra data carried through the get-event and used to finish the unit.
    type Binding: Send + 'static;

    /// Human-readable role name used in messages ("controller").
    const NAME: &'static str;
    /// Name of the hook fired before every resolution.
    const GET_EVENT: &'static str;
    /// Namespace used when none is configured.
    const DEFAULT_NAMESPACE: &'static str;

    /// The suffix of a fully-qualified type name.
    fn type_suffix(binding: &Self::Binding) -> String;

    /// The role file name for an already lower-cased stem.
    fn file_name(stem: &str, binding: &Self::Binding, extension: &str) -> String;

    /// Takes the unit out of a constructed component, or hands the component
    /// back if it carries another role.
    fn extract(component: Component) -> Result<Box<Self::Unit>, Component>;

    /// Called on every unit after construction.
    fn finish(unit: &mut Self::Unit, binding: &Self::Binding) {
        let _ = (unit, binding);
    }
}

/// Controllers: `controller.<stem>.<ext>` / `<Stem>Controller`.
#[derive(Debug, Clone, Copy)]
pub struct ControllerRole;

impl Role for ControllerRole {
    type Unit = dyn Controller;
    type Binding = ();

    const NAME: &'static str = "controller";
    const GET_EVENT: &'static str = "controllerGetEvent";
    const DEFAULT_NAMESPACE: &'static str = "app::controllers::";

    fn type_suffix(_: &()) -> String {
        "Controller".to_string()
    }

    fn file_name(stem: &str, _: &(), extension: &str) -> String {
        format!("controller.{stem}.{extension}")
    }

    fn extract(component: Component) -> Result<Box<dyn Controller>, Component> {
        match component {
            Component::Controller(controller) => Ok(controller),
            other => Err(other),
        }
    }
}

/// Models: `model.<stem>.<ext>` / `<Stem>Model`.
#[derive(Debug, Clone, Copy)]
pub struct ModelRole;

impl Role for ModelRole {
    type Unit = dyn Model;
    type Binding = ();

    const NAME: &'static str = "model";
    const GET_EVENT: &'static str = "modelGetEvent";
    const DEFAULT_NAMESPACE: &'static str = "app::models::";

    fn type_suffix(_: &()) -> String {
        "Model".to_string()
    }

    fn file_name(stem: &str, _: &(), extension: &str) -> String {
        format!("model.{stem}.{extension}")
    }

    fn extract(component: Component) -> Result<Box<dyn Model>, Component> {
        match component {
            Component::Model(model) => Ok(model),
            other => Err(other),
        }
    }
}

/// Views: `view.<type>.<stem>.<ext>` / `<Stem><Type>View`.
#[derive(Debug, Clone, Copy)]
pub struct ViewRole;

/// What a view is resolved for: its view type and the owning controller.
#[derive(Clone)]
pub struct ViewBinding {
    /// The view type, e.g. "html" or "json".
    pub view_type: String,
    /// The controller the view is associated with after loading.
    pub controller: Arc<dyn Controller>,
}

impl ViewBinding {
    /// Creates a binding.
    pub fn new(view_type: impl Into<String>, controller: Arc<dyn Controller>) -> Self {
        Self {
            view_type: view_type.into(),
            controller,
        }
    }
}

impl fmt::Debug for ViewBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBinding")
            .field("view_type", &self.view_type)
            .finish_non_exhaustive()
    }
}

impl Role for ViewRole {
    type Unit = dyn View;
    type Binding = ViewBinding;

    const NAME: &'static str = "view";
    const GET_EVENT: &'static str = "viewGetEvent";
    const DEFAULT_NAMESPACE: &'static str = "app::views::";

    fn type_suffix(binding: &ViewBinding) -> String {
        format!("{}View", capitalize(&binding.view_type))
    }

    fn file_name(stem: &str, binding: &ViewBinding, extension: &str) -> String {
        format!("view.{}.{stem}.{extension}", binding.view_type.to_lowercase())
    }

    fn extract(component: Component) -> Result<Box<dyn View>, Component> {
        match component {
            Component::View(view) => Ok(view),
            other => Err(other),
        }
    }

    fn finish(view: &mut Self::Unit, binding: &ViewBinding) {
        view.set_controller(Arc::clone(&binding.controller));
    }
}

/// Upper-cases the first character, leaving the rest untouched.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

//! The generic component resolver.
//!
//! [`Resolver::resolve`] turns a symbolic name into a freshly constructed
//! unit:
//!
//! 1. The role's get-event is fired; listeners may rewrite the request or
//!    cancel it, which fails with [`MvcrError::Refused`].
//! 2. If `namespace + Stem + Suffix` is already loaded in the
//!    [`UnitRegistry`], it is constructed without any directory search.
//! 3. Otherwise every search directory is probed, tier by tier, for
//!    `dir/<subdir>/<role file>`. The first hit loads the declared type.
//! 4. A bare name that was not found is retried once as `Stem/Stem`.
//!
//! Units are never cached: every call constructs a new one.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use mvcr_core::settings::{ComponentSettings, LoaderSettings};
use mvcr_core::{Controller, Model, MvcrError, MvcrResult, Priority, View};
use mvcr_hooks::{Event, HookGateway};

use crate::events::GetEvent;
use crate::paths::PriorityPathSet;
use crate::registry::UnitRegistry;
use crate::role::{capitalize, ControllerRole, ModelRole, Role, ViewBinding, ViewRole};
use crate::source::{ComponentSource, LiveSource};

/// The controller resolver.
pub type Controllers = Resolver<ControllerRole>;
/// The model resolver.
pub type Models = Resolver<ModelRole>;
/// The view resolver.
pub type Views = Resolver<ViewRole>;

/// Per-call overrides of a resolution.
///
/// # Examples
///
/// ```
/// use mvcr_loaders::ResolveOptions;
///
/// let options = ResolveOptions::new()
///     .paths(["plugins/blog/controllers"])
///     .argument(42);
/// assert_eq!(options.arguments.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Directories searched instead of the resolver's own paths.
    pub paths: Vec<PathBuf>,
    /// Namespace used instead of the resolver's own.
    pub namespace: Option<String>,
    /// Constructor arguments.
    pub arguments: Vec<Value>,
}

impl ResolveOptions {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit search directories.
    #[must_use]
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Appends a constructor argument.
    #[must_use]
    pub fn argument(mut self, argument: impl Into<Value>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Replaces the constructor arguments.
    #[must_use]
    pub fn arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Resolves symbolic names to units of role `R`.
pub struct Resolver<R: Role> {
    paths: PriorityPathSet,
    namespace: String,
    extension: String,
    explicit_paths_priority: Priority,
    registry: Arc<UnitRegistry>,
    hooks: Arc<HookGateway>,
    source: Arc<dyn ComponentSource>,
    role: PhantomData<fn() -> R>,
}

impl<R: Role> Resolver<R> {
    /// Creates a resolver with no search paths, the role's default namespace,
    /// the `rs` extension and live filesystem probing.
    pub fn new(registry: Arc<UnitRegistry>, hooks: Arc<HookGateway>) -> Self {
        Self {
            paths: PriorityPathSet::new(),
            namespace: R::DEFAULT_NAMESPACE.to_string(),
            extension: "rs".to_string(),
            explicit_paths_priority: Priority::Normal,
            registry,
            hooks,
            source: Arc::new(LiveSource),
            role: PhantomData,
        }
    }

    /// Creates a resolver configured from the component settings and the
    /// role's own loader settings.
    pub fn from_settings(
        components: &ComponentSettings,
        loader: &LoaderSettings,
        registry: Arc<UnitRegistry>,
        hooks: Arc<HookGateway>,
    ) -> Self {
        Self::new(registry, hooks)
            .with_namespace(loader.namespace.clone())
            .with_extension(components.extension.clone())
            .with_explicit_paths_priority(components.explicit_paths_priority)
            .with_paths(PriorityPathSet::from_settings(&loader.paths))
    }

    /// Sets the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the role file extension (without the dot).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the tier explicit call paths are searched in.
    #[must_use]
    pub fn with_explicit_paths_priority(mut self, priority: Priority) -> Self {
        self.explicit_paths_priority = priority;
        self
    }

    /// Sets the search paths.
    #[must_use]
    pub fn with_paths(mut self, paths: PriorityPathSet) -> Self {
        self.paths = paths;
        self
    }

    /// Sets where role files are looked up.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn ComponentSource>) -> Self {
        self.source = source;
        self
    }

    /// The configured namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The registry units are constructed from.
    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    // ── Component paths ─────────────────────────────────────────────

    /// The search paths.
    pub fn component_paths(&self) -> &PriorityPathSet {
        &self.paths
    }

    /// Replaces the search paths.
    pub fn set_component_paths(&mut self, paths: PriorityPathSet) {
        self.paths = paths;
    }

    /// Appends a search directory to a tier, unless already present there.
    pub fn add_component_path(&mut self, dir: impl Into<PathBuf>, priority: Priority) {
        let dir = dir.into();
        if self.paths.add(dir.clone(), priority) {
            debug!(role = R::NAME, dir = %dir.display(), %priority, "Component path added");
        }
    }

    /// Removes a search directory from a tier. Does nothing if absent.
    pub fn remove_component_path(&mut self, dir: impl AsRef<Path>, priority: Priority) {
        let dir = dir.as_ref();
        if self.paths.remove(dir, priority) {
            debug!(role = R::NAME, dir = %dir.display(), %priority, "Component path removed");
        }
    }

    // ── Resolution ──────────────────────────────────────────────────

    /// Resolves `name` to a new unit.
    ///
    /// # Errors
    ///
    /// - [`MvcrError::InvalidArgument`] if `name` is empty, before or after the get-hook
    /// - [`MvcrError::HookFailure`] if a get-hook listener fails
    /// - [`MvcrError::Refused`] if a get-hook listener cancels the request
    /// - [`MvcrError::NotFound`] if no type or role file can be found
    /// - [`MvcrError::TypeMismatch`] if the constructed unit carries another role
    pub fn resolve(
        &self,
        name: &str,
        binding: R::Binding,
        options: ResolveOptions,
    ) -> MvcrResult<Box<R::Unit>> {
        if name.is_empty() {
            return Err(MvcrError::InvalidArgument(format!(
                "Could not load {}. No name provided",
                R::NAME
            )));
        }

        let paths = if options.paths.is_empty() {
            self.paths.clone()
        } else {
            PriorityPathSet::single(self.explicit_paths_priority, options.paths)
        };
        let namespace = options.namespace.unwrap_or_else(|| self.namespace.clone());

        let event = self.hooks.fire(GetEvent::<R>::new(
            name,
            paths,
            namespace,
            options.arguments,
            binding,
        ))?;
        if event.is_cancelled() {
            return Err(MvcrError::Refused(format!(
                "Could not load {} '{}'. {} was cancelled",
                R::NAME,
                event.name,
                R::GET_EVENT
            )));
        }

        let GetEvent {
            name,
            paths,
            namespace,
            arguments,
            binding,
            ..
        } = event;
        let request = Request {
            paths: &paths,
            namespace: &namespace,
            arguments: &arguments,
            binding: &binding,
        };

        let trimmed = name.trim_matches('/');
        if trimmed.is_empty() {
            return Err(MvcrError::InvalidArgument(format!(
                "Could not load {}. No name provided",
                R::NAME
            )));
        }
        self.load(trimmed, trimmed, &request, true)
    }

    /// `requested` is the name as asked for, kept for the error message
    /// when `name` is the `Stem/Stem` retry.
    fn load(
        &self,
        name: &str,
        requested: &str,
        request: &Request<'_, R>,
        retry_nested: bool,
    ) -> MvcrResult<Box<R::Unit>> {
        let (subdir, stem) = name.rsplit_once('/').unwrap_or(("", name));
        let class = capitalize(stem);
        let type_name = format!(
            "{}{class}{}",
            request.namespace,
            R::type_suffix(request.binding)
        );

        if self.registry.is_loaded(&type_name) {
            debug!(role = R::NAME, type_name = %type_name, "Type already loaded");
            return self.instantiate(&type_name, request);
        }

        let file_name = R::file_name(&class.to_lowercase(), request.binding, &self.extension);
        for (priority, directory) in request.paths.iter() {
            let candidate = if subdir.is_empty() {
                directory.join(&file_name)
            } else {
                directory.join(subdir).join(&file_name)
            };
            trace!(role = R::NAME, file = %candidate.display(), %priority, "Probing");
            if self.source.exists(&candidate) {
                debug!(role = R::NAME, type_name = %type_name, file = %candidate.display(), "Found component file");
                self.registry.load_from(&type_name, &candidate)?;
                return self.instantiate(&type_name, request);
            }
        }

        if subdir.is_empty() && retry_nested {
            let nested = format!("{class}/{class}");
            debug!(role = R::NAME, name = %nested, "Retrying in same-named subdirectory");
            return self.load(&nested, requested, request, false);
        }

        Err(MvcrError::NotFound(format!(
            "Could not load {} '{requested}'. File '{file_name}' not found in any component path",
            R::NAME
        )))
    }

    fn instantiate(&self, type_name: &str, request: &Request<'_, R>) -> MvcrResult<Box<R::Unit>> {
        let component = self.registry.construct(type_name, request.arguments)?;
        let mut unit = R::extract(component).map_err(|other| {
            MvcrError::TypeMismatch(format!(
                "Could not load {}. '{type_name}' is a {}, not a {}",
                R::NAME,
                other.role(),
                R::NAME
            ))
        })?;
        R::finish(&mut *unit, request.binding);
        Ok(unit)
    }
}

/// The resolution request after the get-hook ran.
struct Request<'a, R: Role> {
    paths: &'a PriorityPathSet,
    namespace: &'a str,
    arguments: &'a [Value],
    binding: &'a R::Binding,
}

impl Resolver<ControllerRole> {
    /// Resolves a controller with the resolver's own paths and namespace.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn get(&self, name: &str) -> MvcrResult<Box<dyn Controller>> {
        self.resolve(name, (), ResolveOptions::default())
    }
}

impl Resolver<ModelRole> {
    /// Resolves a model with the resolver's own paths and namespace.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn get(&self, name: &str) -> MvcrResult<Box<dyn Model>> {
        self.resolve(name, (), ResolveOptions::default())
    }
}

impl Resolver<ViewRole> {
    /// Resolves a view of `view_type` for `controller`.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub fn get(
        &self,
        name: &str,
        controller: Arc<dyn Controller>,
        view_type: &str,
    ) -> MvcrResult<Box<dyn View>> {
        self.resolve(name, ViewBinding::new(view_type, controller), ResolveOptions::default())
    }
}

impl<R: Role> fmt::Debug for Resolver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("role", &R::NAME)
            .field("namespace", &self.namespace)
            .field("extension", &self.extension)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

//! The framework context that wires settings, hooks, resolvers and the router.
//!
//! [`Mvcr`] owns one [`HookGateway`] and one [`UnitRegistry`] and shares them
//! with the three resolvers, so a listener registered on
//! [`Mvcr::hooks`] sees every event and a type registered on
//! [`Mvcr::registry`] is visible to every resolver.
//!
//! # Examples
//!
//! ```
//! use mvcr_core::{Output, Priority, Settings};
//! use mvcr_router::{Dispatch, Mvcr, RouteConfig};
//!
//! let mut app = Mvcr::new(Settings::default()).unwrap();
//! app.router_mut()
//!     .add_route(
//!         "ping",
//!         RouteConfig::custom(|_, _| Ok(Dispatch::Handled(Output::from("pong")))),
//!         Priority::Normal,
//!     )
//!     .unwrap();
//!
//! assert_eq!(app.route("ping").unwrap(), Output::from("pong"));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::info;

use mvcr_core::settings::{ComponentSettings, LoaderSettings};
use mvcr_core::{MvcrResult, Output, Settings};
use mvcr_hooks::HookGateway;
use mvcr_loaders::{ComponentSource, Controllers, IndexedSource, Models, Resolver, Role, UnitRegistry, Views};

use crate::router::Router;

/// A configured framework instance.
pub struct Mvcr {
    settings: Settings,
    hooks: Arc<HookGateway>,
    registry: Arc<UnitRegistry>,
    models: Models,
    router: Router,
}

impl Mvcr {
    /// Builds the context from `settings` and adds the configured routes.
    ///
    /// With `components.scan_on_startup` set, each resolver's directories are
    /// indexed once here; files added to those directories later are not
    /// seen, while paths outside them are still checked on disk.
    ///
    /// # Errors
    ///
    /// - [`MvcrError::ImproperlyConfigured`](mvcr_core::MvcrError::ImproperlyConfigured)
    ///   for an invalid configured route
    /// - [`MvcrError::IoError`](mvcr_core::MvcrError::IoError) if a directory scan fails
    pub fn new(settings: Settings) -> MvcrResult<Self> {
        let hooks = Arc::new(HookGateway::new());
        let registry = Arc::new(UnitRegistry::new());
        let components = &settings.components;

        let controllers: Controllers =
            build_resolver(components, &components.controllers, &registry, &hooks)?;
        let views: Views = build_resolver(components, &components.views, &registry, &hooks)?;
        let models: Models = build_resolver(components, &components.models, &registry, &hooks)?;

        let mut router = Router::new(&settings.routing, controllers, views, Arc::clone(&hooks));
        router.init()?;
        info!(
            routes = router.routes().count(),
            scanned = components.scan_on_startup,
            "Dispatch context ready"
        );

        Ok(Self {
            settings,
            hooks,
            registry,
            models,
            router,
        })
    }

    /// Routes `path` through the router.
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn route(&mut self, path: &str) -> MvcrResult<Output> {
        self.router.route(path)
    }

    /// The settings the context was built from.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The shared hook gateway.
    pub const fn hooks(&self) -> &Arc<HookGateway> {
        &self.hooks
    }

    /// The shared type registry.
    pub const fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    /// The controller resolver.
    pub const fn controllers(&self) -> &Controllers {
        self.router.dispatcher().controllers()
    }

    /// The view resolver.
    pub const fn views(&self) -> &Views {
        self.router.dispatcher().views()
    }

    /// The model resolver.
    pub const fn models(&self) -> &Models {
        &self.models
    }

    /// The model resolver, mutably.
    pub fn models_mut(&mut self) -> &mut Models {
        &mut self.models
    }

    /// The router.
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// The router, mutably.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }
}

impl fmt::Debug for Mvcr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mvcr")
            .field("registry", &self.registry)
            .field("models", &self.models)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

fn build_resolver<R: Role>(
    components: &ComponentSettings,
    loader: &LoaderSettings,
    registry: &Arc<UnitRegistry>,
    hooks: &Arc<HookGateway>,
) -> MvcrResult<Resolver<R>> {
    let resolver = Resolver::<R>::from_settings(components, loader, Arc::clone(registry), Arc::clone(hooks));
    if !components.scan_on_startup {
        return Ok(resolver);
    }
    let index = IndexedSource::scan(resolver.component_paths().directories(), &components.extension)?;
    info!(role = R::NAME, files = index.len(), "Indexed component directories");
    let source: Arc<dyn ComponentSource> = Arc::new(index);
    Ok(resolver.with_source(source))
}

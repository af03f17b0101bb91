//! The unit registry: fully-qualified type names mapped to constructors.
//!
//! Rust cannot load a type from a file at runtime, so every controller,
//! model and view type is handed to the registry up front together with a
//! constructor. A type is either
//!
//! - **registered**: loaded from the start; resolution returns it without
//!   searching any directory, or
//! - **declared**: it only becomes loaded once a resolver finds its role file
//!   in a search directory. It then stays loaded and remembers that file.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use mvcr_core::{Component, MvcrError, MvcrResult};

/// What a constructor receives.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext<'a> {
    /// Constructor arguments, as passed to (or rewritten by) the resolver call.
    pub arguments: &'a [Value],
    /// The role file the type was loaded from; `None` for registered types.
    pub source: Option<&'a Path>,
}

/// A constructor for one type.
pub type Constructor = Arc<dyn Fn(&UnitContext<'_>) -> MvcrResult<Component> + Send + Sync>;

struct Definition {
    constructor: Constructor,
    loaded: bool,
    source: Option<PathBuf>,
}

/// Type name to constructor map shared by all resolvers.
///
/// # Examples
///
/// ```
/// use mvcr_core::{Component, Controller};
/// use mvcr_loaders::UnitRegistry;
///
/// struct BlogController;
/// impl Controller for BlogController {}
///
/// let registry = UnitRegistry::new();
/// registry.register("app::controllers::BlogController", |_| {
///     Ok(Component::controller(BlogController))
/// });
/// assert!(registry.is_loaded("app::controllers::BlogController"));
/// ```
#[derive(Default)]
pub struct UnitRegistry {
    definitions: RwLock<HashMap<String, Definition>>,
}

impl UnitRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already-loaded type. Replaces any earlier definition.
    pub fn register<F>(&self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn(&UnitContext<'_>) -> MvcrResult<Component> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Arc::new(constructor), true);
    }

    /// Declares a type that becomes loaded when its role file is found.
    ///
    /// Declaring a type that is already loaded replaces its constructor but
    /// keeps it loaded.
    pub fn declare<F>(&self, type_name: impl Into<String>, constructor: F)
    where
        F: Fn(&UnitContext<'_>) -> MvcrResult<Component> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Arc::new(constructor), false);
    }

    fn insert(&self, type_name: String, constructor: Constructor, loaded: bool) {
        let mut definitions = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
        let (loaded, source) = match definitions.remove(&type_name) {
            Some(previous) => (loaded || previous.loaded, previous.source),
            None => (loaded, None),
        };
        debug!(type_name = %type_name, loaded, "Unit defined");
        definitions.insert(
            type_name,
            Definition {
                constructor,
                loaded,
                source,
            },
        );
    }

    /// Removes a type entirely. Returns `false` if it was unknown.
    pub fn unregister(&self, type_name: &str) -> bool {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(type_name)
            .is_some()
    }

    /// Returns `true` if the type is known, loaded or not.
    pub fn is_declared(&self, type_name: &str) -> bool {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(type_name)
    }

    /// Returns `true` if the type is loaded.
    pub fn is_loaded(&self, type_name: &str) -> bool {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .is_some_and(|d| d.loaded)
    }

    /// The role file a loaded type came from.
    pub fn source_of(&self, type_name: &str) -> Option<PathBuf> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
            .and_then(|d| d.source.clone())
    }

    /// Marks a declared type as loaded from `file`.
    ///
    /// A type that is already loaded keeps its original source.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::NotFound`] if the file holds no known type.
    pub fn load_from(&self, type_name: &str, file: &Path) -> MvcrResult<()> {
        let mut definitions = self.definitions.write().unwrap_or_else(PoisonError::into_inner);
        let Some(definition) = definitions.get_mut(type_name) else {
            return Err(MvcrError::NotFound(format!(
                "File '{}' was found but type '{type_name}' is not declared",
                file.display()
            )));
        };
        if !definition.loaded {
            definition.loaded = true;
            definition.source = Some(file.to_path_buf());
            debug!(type_name, file = %file.display(), "Unit loaded from file");
        }
        Ok(())
    }

    /// Constructs a loaded type with `arguments`.
    ///
    /// The constructor runs outside the registry lock, so it may itself use
    /// the registry.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::NotFound`] if the type is unknown or not loaded,
    /// or whatever the constructor returns.
    pub fn construct(&self, type_name: &str, arguments: &[Value]) -> MvcrResult<Component> {
        let (constructor, source) = {
            let definitions = self.definitions.read().unwrap_or_else(PoisonError::into_inner);
            match definitions.get(type_name) {
                Some(d) if d.loaded => (Arc::clone(&d.constructor), d.source.clone()),
                _ => {
                    return Err(MvcrError::NotFound(format!(
                        "Type '{type_name}' is not loaded"
                    )))
                }
            }
        };
        constructor(&UnitContext {
            arguments,
            source: source.as_deref(),
        })
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.definitions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no type is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for UnitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let definitions = self.definitions.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = definitions.keys().collect();
        names.sort();
        f.debug_struct("UnitRegistry").field("types", &names).finish()
    }
}

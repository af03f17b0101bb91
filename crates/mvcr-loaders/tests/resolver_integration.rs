//! Integration tests for component resolution against real directories.
//!
//! Tests cover: tier ordering, the same-named subdirectory fallback, explicit
//! call paths, declared types that only load from a file, and resolution over
//! a startup index.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mvcr_core::{Component, Controller, MvcrError, MvcrResult, Output, Priority, View};
use mvcr_hooks::HookGateway;
use mvcr_loaders::{
    Controllers, IndexedSource, PriorityPathSet, ResolveOptions, UnitRegistry, Views,
};

/// Remembers which file it was loaded from.
struct SourcedController {
    source: Option<PathBuf>,
}
impl Controller for SourcedController {}

struct PageView;

impl View for PageView {
    fn has_method(&self, method: &str) -> bool {
        method == "index"
    }

    fn call_method(&mut self, _: &str, _: &str) -> MvcrResult<Output> {
        Ok(Output::from("page"))
    }
}

fn touch(dir: &Path, relative: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "").unwrap();
    path
}

fn declare_sourced(registry: &UnitRegistry, type_name: &str) {
    registry.declare(type_name, |ctx| {
        Ok(Component::controller(SourcedController {
            source: ctx.source.map(Path::to_path_buf),
        }))
    });
}

fn source_of(controller: &dyn Controller) -> PathBuf {
    controller
        .downcast_ref::<SourcedController>()
        .and_then(|c| c.source.clone())
        .unwrap()
}

fn expect_err<T: ?Sized>(result: MvcrResult<Box<T>>) -> MvcrError {
    match result {
        Ok(_) => panic!("resolution unexpectedly succeeded"),
        Err(e) => e,
    }
}

// ═════════════════════════════════════════════════════════════════════
// 1. Higher tiers win even when lower tiers also hold the file
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_highest_tier_wins() {
    let root = tempfile::tempdir().unwrap();
    let app = root.path().join("app");
    let vendor = root.path().join("vendor");
    touch(&vendor, "controller.foo.rs");
    let expected = touch(&app, "controller.foo.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::FooController");

    let mut controllers = Controllers::new(registry, Arc::new(HookGateway::new()));
    // Added lowest first to show insertion order does not matter.
    controllers.add_component_path(&vendor, Priority::Lowest);
    controllers.add_component_path(&app, Priority::Highest);

    let controller = controllers.get("foo").unwrap();
    assert_eq!(source_of(controller.as_ref()), expected);
}

#[test]
fn test_directories_within_tier_in_order() {
    let root = tempfile::tempdir().unwrap();
    let first = root.path().join("first");
    let second = root.path().join("second");
    let expected = touch(&first, "controller.foo.rs");
    touch(&second, "controller.foo.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::FooController");

    let controllers = Controllers::new(registry, Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [&first, &second]));

    let controller = controllers.get("Foo").unwrap();
    assert_eq!(source_of(controller.as_ref()), expected);
}

// ═════════════════════════════════════════════════════════════════════
// 2. Subdirectories and the Stem/Stem fallback
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_bare_name_falls_back_to_same_named_subdirectory() {
    let root = tempfile::tempdir().unwrap();
    let expected = touch(root.path(), "Shop/controller.shop.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::ShopController");

    let controllers = Controllers::new(registry, Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]));

    let controller = controllers.get("shop").unwrap();
    assert_eq!(source_of(controller.as_ref()), expected);
}

#[test]
fn test_subdirectory_name_keeps_case_and_does_not_fall_back() {
    let root = tempfile::tempdir().unwrap();
    let expected = touch(root.path(), "admin/controller.users.rs");
    touch(root.path(), "Orders/controller.orders.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::UsersController");
    declare_sourced(&registry, "app::controllers::OrdersController");

    let controllers = Controllers::new(registry, Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]));

    let controller = controllers.get("admin/users").unwrap();
    assert_eq!(source_of(controller.as_ref()), expected);

    // Orders/controller.orders.rs exists, but a named subdirectory is never retried.
    let err = expect_err(controllers.get("other/orders"));
    assert!(err.is_not_found());
}

// ═════════════════════════════════════════════════════════════════════
// 3. Explicit paths replace the configured ones
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_explicit_paths_replace_configured_paths() {
    let root = tempfile::tempdir().unwrap();
    let configured = root.path().join("configured");
    let plugin = root.path().join("plugin");
    touch(&configured, "controller.foo.rs");
    let expected = touch(&plugin, "controller.foo.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::FooController");

    let controllers = Controllers::new(registry, Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Highest, [&configured]));

    let controller = controllers
        .resolve("foo", (), ResolveOptions::new().paths([&plugin]))
        .unwrap();
    assert_eq!(source_of(controller.as_ref()), expected);
}

// ═════════════════════════════════════════════════════════════════════
// 4. Declared types, undeclared files, and the loaded state
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_file_without_declared_type_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    touch(root.path(), "controller.ghost.rs");

    let controllers = Controllers::new(Arc::new(UnitRegistry::new()), Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]));

    let err = expect_err(controllers.get("ghost"));
    assert!(err.is_not_found());
    assert!(err.to_string().contains("controller.ghost.rs"));
}

#[test]
fn test_type_stays_loaded_after_file_is_gone() {
    let root = tempfile::tempdir().unwrap();
    let file = touch(root.path(), "controller.foo.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::FooController");
    let controllers = Controllers::new(Arc::clone(&registry), Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]));

    controllers.get("foo").unwrap();
    fs::remove_file(&file).unwrap();

    assert!(registry.is_loaded("app::controllers::FooController"));
    let again = controllers.get("foo").unwrap();
    assert_eq!(source_of(again.as_ref()), file);
}

#[test]
fn test_custom_extension() {
    let root = tempfile::tempdir().unwrap();
    let expected = touch(root.path(), "controller.foo.mvc");
    touch(root.path(), "controller.bar.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::FooController");
    declare_sourced(&registry, "app::controllers::BarController");
    let controllers = Controllers::new(registry, Arc::new(HookGateway::new()))
        .with_extension("mvc")
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]));

    assert_eq!(source_of(controllers.get("foo").unwrap().as_ref()), expected);
    assert!(expect_err(controllers.get("bar")).is_not_found());
}

// ═════════════════════════════════════════════════════════════════════
// 5. Views: type-specific files and names
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_view_file_encodes_view_type() {
    let root = tempfile::tempdir().unwrap();
    touch(root.path(), "view.json.page.rs");

    let registry = Arc::new(UnitRegistry::new());
    registry.declare("app::views::PageJsonView", |_| Ok(Component::view(PageView)));
    registry.declare("app::views::PageHtmlView", |_| Ok(Component::view(PageView)));
    let views = Views::new(Arc::clone(&registry), Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]));
    let controller: Arc<dyn Controller> = Arc::new(SourcedController { source: None });

    assert!(views.get("page", Arc::clone(&controller), "json").is_ok());
    assert!(registry.is_loaded("app::views::PageJsonView"));

    let err = expect_err(views.get("page", controller, "html"));
    assert!(err.is_not_found());
    assert!(!registry.is_loaded("app::views::PageHtmlView"));
}

// ═════════════════════════════════════════════════════════════════════
// 6. Startup index
// ═════════════════════════════════════════════════════════════════════

#[test]
fn test_indexed_source_resolution() {
    let root = tempfile::tempdir().unwrap();
    let expected = touch(root.path(), "Shop/controller.shop.rs");

    let registry = Arc::new(UnitRegistry::new());
    declare_sourced(&registry, "app::controllers::ShopController");
    declare_sourced(&registry, "app::controllers::LateController");

    let index = IndexedSource::scan([root.path()], "rs").unwrap();
    let controllers = Controllers::new(registry, Arc::new(HookGateway::new()))
        .with_paths(PriorityPathSet::single(Priority::Normal, [root.path()]))
        .with_source(Arc::new(index));

    // Files created after the scan are invisible.
    touch(root.path(), "controller.late.rs");

    assert_eq!(source_of(controllers.get("shop").unwrap().as_ref()), expected);
    assert!(expect_err(controllers.get("late")).is_not_found());
}

//! # mvcr-hooks
//!
//! The hook gateway for the mvcr-rs framework. A hook is a named extension
//! point fired synchronously with a mutable payload (an [`Event`]). Every
//! listener may rewrite fields of the payload in place or cancel it; the
//! gateway hands the (possibly rewritten) payload back to the firing
//! component, which decides what cancellation means.
//!
//! ## Usage
//!
//! ```
//! use mvcr_core::Priority;
//! use mvcr_hooks::{Event, HookGateway};
//!
//! struct PageRequested {
//!     page: String,
//!     cancelled: bool,
//! }
//!
//! impl Event for PageRequested {
//!     const NAME: &'static str = "pageRequestedEvent";
//!
//!     fn is_cancelled(&self) -> bool {
//!         self.cancelled
//!     }
//!
//!     fn set_cancelled(&mut self, cancelled: bool) {
//!         self.cancelled = cancelled;
//!     }
//! }
//!
//! let hooks = HookGateway::new();
//! hooks.listen("rewrite", Priority::Normal, |event: &mut PageRequested| {
//!     event.page = "maintenance".to_string();
//!     Ok(())
//! });
//!
//! let event = hooks
//!     .fire(PageRequested { page: "home".to_string(), cancelled: false })
//!     .unwrap();
//! assert_eq!(event.page, "maintenance");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use mvcr_core::{MvcrError, MvcrResult, Priority};
use tracing::debug;

/// A payload fired through the [`HookGateway`].
///
/// Each event type is one extension point; [`NAME`](Event::NAME) is the name
/// it is known by in logs and error messages.
pub trait Event: Any + Send {
    /// The hook name, e.g. `controllerGetEvent`.
    const NAME: &'static str;

    /// Returns `true` once a listener has cancelled the event.
    fn is_cancelled(&self) -> bool;

    /// Marks (or unmarks) the event as cancelled.
    fn set_cancelled(&mut self, cancelled: bool);

    /// Shorthand for `set_cancelled(true)`.
    fn cancel(&mut self) {
        self.set_cancelled(true);
    }
}

/// The type signature of a hook listener.
///
/// Listeners mutate the payload in place. Returning an error aborts the
/// chain; the gateway reports it as [`MvcrError::HookFailure`].
pub type HookListener<E> = Arc<dyn Fn(&mut E) -> MvcrResult<()> + Send + Sync>;

struct Registration {
    id: String,
    priority: Priority,
    /// Always a `HookListener<E>` for the slot's event type.
    listener: Box<dyn Any + Send + Sync>,
}

struct HookSlot {
    name: &'static str,
    registrations: Vec<Registration>,
}

/// Fires events through their registered listeners.
///
/// Listeners run in [`Priority`] order and, within one tier, in the order
/// they were registered. After each listener the gateway checks the
/// cancellation flag and stops the chain as soon as it is set.
///
/// The listener list is copied before the chain runs, so a listener may
/// register or remove listeners without deadlocking; such changes apply to
/// the next `fire`.
pub struct HookGateway {
    hooks: RwLock<HashMap<TypeId, HookSlot>>,
    enabled: AtomicBool,
}

impl Default for HookGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<(&str, usize)> = hooks
            .values()
            .map(|slot| (slot.name, slot.registrations.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("HookGateway")
            .field("hooks", &names)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl HookGateway {
    /// Creates a gateway with no listeners.
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Registers a listener for events of type `E`.
    ///
    /// The `listener_id` identifies the listener for later removal. If a
    /// listener with the same ID is already registered for `E` it is
    /// replaced; it keeps its place when the priority is unchanged.
    pub fn listen<E, F>(&self, listener_id: impl Into<String>, priority: Priority, listener: F)
    where
        E: Event,
        F: Fn(&mut E) -> MvcrResult<()> + Send + Sync + 'static,
    {
        let id = listener_id.into();
        let listener: HookListener<E> = Arc::new(listener);
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let slot = hooks.entry(TypeId::of::<E>()).or_insert_with(|| HookSlot {
            name: E::NAME,
            registrations: Vec::new(),
        });

        if let Some(existing) = slot
            .registrations
            .iter_mut()
            .find(|r| r.id == id && r.priority == priority)
        {
            existing.listener = Box::new(listener);
            debug!(hook = E::NAME, listener = %id, "Listener replaced");
            return;
        }

        slot.registrations.retain(|r| r.id != id);
        let position = slot
            .registrations
            .iter()
            .position(|r| r.priority > priority)
            .unwrap_or(slot.registrations.len());
        debug!(hook = E::NAME, listener = %id, %priority, "Listener added");
        slot.registrations.insert(
            position,
            Registration {
                id,
                priority,
                listener: Box::new(listener),
            },
        );
    }

    /// Removes the listener with the given ID from events of type `E`.
    ///
    /// Returns `true` if a listener was found and removed.
    pub fn unlisten<E: Event>(&self, listener_id: &str) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = hooks.get_mut(&TypeId::of::<E>()) else {
            return false;
        };
        let before = slot.registrations.len();
        slot.registrations.retain(|r| r.id != listener_id);
        slot.registrations.len() < before
    }

    /// Returns the number of listeners registered for events of type `E`.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .map_or(0, |slot| slot.registrations.len())
    }

    /// Enables or disables the gateway. A disabled gateway returns every
    /// payload untouched.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Returns `true` unless the gateway has been disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Fires `event` through its listeners and returns it.
    ///
    /// The caller inspects [`Event::is_cancelled`] on the returned payload.
    ///
    /// # Errors
    ///
    /// Returns [`MvcrError::HookFailure`] naming the hook and the listener if
    /// a listener fails. Listeners after the failing one do not run.
    pub fn fire<E: Event>(&self, mut event: E) -> MvcrResult<E> {
        if !self.is_enabled() {
            return Ok(event);
        }

        let listeners = self.snapshot::<E>();
        debug!(hook = E::NAME, listeners = listeners.len(), "Firing hook");

        for (id, listener) in listeners {
            listener(&mut event).map_err(|e| {
                MvcrError::hook_failure(E::NAME, format!("listener '{id}' failed: {e}"))
            })?;

            if event.is_cancelled() {
                debug!(hook = E::NAME, listener = %id, "Hook cancelled");
                break;
            }
        }

        Ok(event)
    }

    fn snapshot<E: Event>(&self) -> Vec<(String, HookListener<E>)> {
        let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
        hooks.get(&TypeId::of::<E>()).map_or_else(Vec::new, |slot| {
            slot.registrations
                .iter()
                .filter_map(|r| {
                    r.listener
                        .downcast_ref::<HookListener<E>>()
                        .map(|listener| (r.id.clone(), Arc::clone(listener)))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Ping {
        value: i32,
        cancelled: bool,
    }

    impl Event for Ping {
        const NAME: &'static str = "pingEvent";

        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    #[derive(Debug, Default)]
    struct Pong {
        cancelled: bool,
    }

    impl Event for Pong {
        const NAME: &'static str = "pongEvent";

        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    #[test]
    fn test_fire_without_listeners_returns_event() {
        let hooks = HookGateway::new();
        let event = hooks.fire(Ping { value: 7, cancelled: false }).unwrap();
        assert_eq!(event.value, 7);
        assert!(!event.is_cancelled());
    }

    #[test]
    fn test_listener_mutates_payload() {
        let hooks = HookGateway::new();
        hooks.listen(
            "double",
            Priority::Normal,
            |event: &mut Ping| {
                event.value *= 2;
                Ok(())
            },
        );

        let event = hooks.fire(Ping { value: 21, cancelled: false }).unwrap();
        assert_eq!(event.value, 42);
    }

    #[test]
    fn test_priority_order_then_insertion_order() {
        let hooks = HookGateway::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (id, priority) in [
            ("low", Priority::Low),
            ("normal-1", Priority::Normal),
            ("high", Priority::High),
            ("normal-2", Priority::Normal),
            ("monitor", Priority::Monitor),
        ] {
            let o = order.clone();
            hooks.listen(
                id,
                priority,
                move |_: &mut Ping| {
                    o.lock().unwrap().push(id);
                    Ok(())
                },
            );
        }

        hooks.fire(Ping::default()).unwrap();
        assert_eq!(
            *order.lock().unwrap(),
            vec!["monitor", "high", "normal-1", "normal-2", "low"]
        );
    }

    #[test]
    fn test_cancel_short_circuits_chain() {
        let hooks = HookGateway::new();
        let later = Arc::new(AtomicUsize::new(0));
        let l = later.clone();

        hooks.listen(
            "cancel",
            Priority::High,
            |event: &mut Ping| {
                event.cancel();
                Ok(())
            },
        );
        hooks.listen(
            "later",
            Priority::Low,
            move |_: &mut Ping| {
                l.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );

        let event = hooks.fire(Ping::default()).unwrap();
        assert!(event.is_cancelled());
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_failure_names_hook() {
        let hooks = HookGateway::new();
        hooks.listen(
            "broken",
            Priority::Normal,
            |_: &mut Ping| Err(MvcrError::InvalidArgument("bad payload".into())),
        );

        let err = hooks.fire(Ping::default()).unwrap_err();
        match err {
            MvcrError::HookFailure { hook, message } => {
                assert_eq!(hook, "pingEvent");
                assert!(message.contains("broken"));
                assert!(message.contains("bad payload"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_listeners_are_per_event_type() {
        let hooks = HookGateway::new();
        hooks.listen("p", Priority::Normal, |_: &mut Ping| Ok(()));
        assert_eq!(hooks.listener_count::<Ping>(), 1);
        assert_eq!(hooks.listener_count::<Pong>(), 0);
        assert!(!hooks.fire(Pong::default()).unwrap().is_cancelled());
    }

    #[test]
    fn test_replace_same_id() {
        let hooks = HookGateway::new();
        hooks.listen(
            "h",
            Priority::Normal,
            |event: &mut Ping| {
                event.value = 1;
                Ok(())
            },
        );
        hooks.listen(
            "h",
            Priority::Normal,
            |event: &mut Ping| {
                event.value = 2;
                Ok(())
            },
        );

        assert_eq!(hooks.listener_count::<Ping>(), 1);
        assert_eq!(hooks.fire(Ping::default()).unwrap().value, 2);
    }

    #[test]
    fn test_replace_with_new_priority_moves_listener() {
        let hooks = HookGateway::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in ["a", "b"] {
            let o = order.clone();
            hooks.listen(
                id,
                Priority::Normal,
                move |_: &mut Ping| {
                    o.lock().unwrap().push(id);
                    Ok(())
                },
            );
        }
        let o = order.clone();
        hooks.listen(
            "b",
            Priority::Highest,
            move |_: &mut Ping| {
                o.lock().unwrap().push("b");
                Ok(())
            },
        );

        hooks.fire(Ping::default()).unwrap();
        assert_eq!(hooks.listener_count::<Ping>(), 2);
        assert_eq!(*order.lock().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_unlisten() {
        let hooks = HookGateway::new();
        hooks.listen("a", Priority::Normal, |_: &mut Ping| Ok(()));
        assert!(hooks.unlisten::<Ping>("a"));
        assert!(!hooks.unlisten::<Ping>("a"));
        assert!(!hooks.unlisten::<Pong>("a"));
        assert_eq!(hooks.listener_count::<Ping>(), 0);
    }

    #[test]
    fn test_disabled_gateway_skips_listeners() {
        let hooks = HookGateway::new();
        hooks.listen(
            "cancel",
            Priority::Normal,
            |event: &mut Ping| {
                event.cancel();
                Ok(())
            },
        );

        hooks.set_enabled(false);
        assert!(!hooks.fire(Ping::default()).unwrap().is_cancelled());

        hooks.set_enabled(true);
        assert!(hooks.fire(Ping::default()).unwrap().is_cancelled());
    }

    #[test]
    fn test_listener_may_register_listeners() {
        let hooks = Arc::new(HookGateway::new());
        let inner = Arc::clone(&hooks);
        hooks.listen(
            "registrar",
            Priority::Normal,
            move |_: &mut Ping| {
                inner.listen("late", Priority::Normal, |_: &mut Pong| Ok(()));
                Ok(())
            },
        );

        hooks.fire(Ping::default()).unwrap();
        assert_eq!(hooks.listener_count::<Pong>(), 1);
    }

    #[test]
    fn test_debug_lists_hooks() {
        let hooks = HookGateway::new();
        hooks.listen("a", Priority::Normal, |_: &mut Ping| Ok(()));
        let debug = format!("{hooks:?}");
        assert!(debug.contains("pingEvent"));
    }
}

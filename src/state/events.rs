//! Event Bus - named events and their listener sets.
//!
//! Components signal each other through event names instead of holding
//! references to each other.
//!
//! # API
//!
//! - `register_event(name)` - create (or reset) the listener set of an event
//! - `add_listener(name, &listener)` / `remove_listener(name, &listener)`
//! - `publish(name, payload)` - call every listener, isolating failures
//! - `subscribe(name, fn)` - add a listener, get a cleanup function back
//! - `emit(&event)` - publish a payload under its own event name
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use spark_compose::{EventBus, Listener};
//!
//! let bus: EventBus<u32> = EventBus::new();
//! bus.register_event("clicked");
//!
//! let total = Rc::new(Cell::new(0));
//! let total_clone = total.clone();
//! let listener = Listener::new(move |amount: Option<&u32>| {
//!     total_clone.set(total_clone.get() + amount.copied().unwrap_or(1));
//! });
//!
//! bus.add_listener("clicked", &listener).unwrap();
//! bus.publish("clicked", Some(&5));
//! bus.publish("clicked", None);
//! assert_eq!(total.get(), 6);
//! ```
//!
//! Listener order within one event is unspecified. Listeners are snapshotted
//! when a publish starts: changes made while dispatching apply from the next
//! publish on.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::EventError;

// =============================================================================
// TYPES
// =============================================================================

/// A payload that knows which event it belongs to.
///
/// Implement on an enum to get one typed payload variant per event name.
pub trait Event {
    fn name(&self) -> &str;
}

/// Cleanup function returned by [`EventBus::subscribe`].
pub type Cleanup = Box<dyn FnOnce()>;

type Callback<P> = dyn Fn(Option<&P>) -> anyhow::Result<()>;

/// A listener callback with identity.
///
/// Clones share identity: adding a clone of a listener that is already
/// registered is a no-op, and any clone can be used to remove it.
pub struct Listener<P> {
    callback: Rc<Callback<P>>,
}

impl<P: 'static> Listener<P> {
    /// Listener that cannot fail.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Option<&P>) + 'static,
    {
        Self::fallible(move |payload| {
            callback(payload);
            Ok(())
        })
    }

    /// Listener that may fail. Errors are logged by the bus.
    pub fn fallible<F>(callback: F) -> Self
    where
        F: Fn(Option<&P>) -> anyhow::Result<()> + 'static,
    {
        Self {
            callback: Rc::new(callback),
        }
    }
}

impl<P> Listener<P> {
    fn call(&self, payload: Option<&P>) -> anyhow::Result<()> {
        (self.callback)(payload)
    }
}

impl<P> Clone for Listener<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<P> PartialEq for Listener<P> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl<P> Eq for Listener<P> {}

impl<P> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Outcome of one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Listeners called.
    pub invoked: usize,
    /// Listeners that returned an error or panicked.
    pub failed: usize,
}

// =============================================================================
// EVENT BUS
// =============================================================================

pub struct EventBus<P = ()> {
    listeners: RefCell<HashMap<String, Vec<Listener<P>>>>,
}

impl<P: 'static> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> EventBus<P> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Create an empty listener set for `name`.
    ///
    /// Registering a name again drops its current listeners.
    pub fn register_event(&self, name: &str) {
        let previous = self
            .listeners
            .borrow_mut()
            .insert(name.to_string(), Vec::new());

        if let Some(previous) = previous.filter(|set| !set.is_empty()) {
            tracing::warn!(
                event = name,
                dropped = previous.len(),
                "event registered again, existing listeners dropped"
            );
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.listeners.borrow().contains_key(name)
    }

    /// Registered event names, in no particular order.
    pub fn event_names(&self) -> Vec<String> {
        self.listeners.borrow().keys().cloned().collect()
    }

    /// Number of listeners of `name`, `None` if it is not registered.
    pub fn listener_count(&self, name: &str) -> Option<usize> {
        self.listeners.borrow().get(name).map(Vec::len)
    }

    /// Add a listener. Adding one that is already present changes nothing.
    pub fn add_listener(&self, name: &str, listener: &Listener<P>) -> Result<(), EventError> {
        let mut listeners = self.listeners.borrow_mut();
        let Some(set) = listeners.get_mut(name) else {
            return Err(unregistered(name));
        };
        if !set.contains(listener) {
            set.push(listener.clone());
        }
        Ok(())
    }

    /// Remove a listener. Returns whether it was present.
    pub fn remove_listener(&self, name: &str, listener: &Listener<P>) -> Result<bool, EventError> {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(set) = listeners.get_mut(name) else {
                return Err(unregistered(name));
            };
            set.iter()
                .position(|l| l == listener)
                .map(|pos| set.swap_remove(pos))
        };
        Ok(removed.is_some())
    }

    /// Add a listener built from `callback` and return a function that removes it.
    pub fn subscribe<F>(self: &Rc<Self>, name: &str, callback: F) -> Result<Cleanup, EventError>
    where
        F: Fn(Option<&P>) + 'static,
    {
        let listener = Listener::new(callback);
        self.add_listener(name, &listener)?;

        let bus = Rc::downgrade(self);
        let name = name.to_string();
        Ok(Box::new(move || {
            let Some(bus) = bus.upgrade() else {
                return;
            };
            match bus.remove_listener(&name, &listener) {
                Ok(true) => {}
                // Re-registering the event already dropped it
                Ok(false) => tracing::trace!(event = %name, "listener already removed"),
                // Logged by remove_listener
                Err(_) => {}
            }
        }))
    }

    /// Call every listener of `name` with `payload`.
    ///
    /// Unknown names are a no-op. A listener that fails or panics is logged
    /// and counted; the remaining listeners still run.
    pub fn publish(&self, name: &str, payload: Option<&P>) -> Delivery {
        let snapshot = match self.listeners.borrow().get(name) {
            Some(set) => set.clone(),
            None => {
                tracing::trace!(event = name, "publish to unregistered event ignored");
                return Delivery::default();
            }
        };

        let mut delivery = Delivery::default();
        for listener in &snapshot {
            delivery.invoked += 1;
            match panic::catch_unwind(AssertUnwindSafe(|| listener.call(payload))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    delivery.failed += 1;
                    tracing::error!(event = name, error = %format!("{err:#}"), "listener failed");
                }
                Err(panic) => {
                    delivery.failed += 1;
                    tracing::error!(
                        event = name,
                        panic = %panic_message(panic.as_ref()),
                        "listener panicked"
                    );
                }
            }
        }
        delivery
    }

    /// Publish `event` under its own name.
    pub fn emit(&self, event: &P) -> Delivery
    where
        P: Event,
    {
        self.publish(event.name(), Some(event))
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let mut map = f.debug_map();
        for (name, set) in listeners.iter() {
            map.entry(name, &set.len());
        }
        map.finish()
    }
}

fn unregistered(name: &str) -> EventError {
    tracing::warn!(event = name, "event not registered");
    EventError::UnregisteredEvent {
        name: name.to_string(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn recording(calls: &Rc<RefCell<Vec<Option<i32>>>>) -> Listener<i32> {
        let calls = calls.clone();
        Listener::new(move |payload: Option<&i32>| calls.borrow_mut().push(payload.copied()))
    }

    #[test]
    fn test_publish_and_remove() {
        let bus = EventBus::new();
        bus.register_event("X");

        let calls = Rc::new(RefCell::new(Vec::new()));
        let f = recording(&calls);
        bus.add_listener("X", &f).unwrap();

        bus.publish("X", Some(&42));
        assert_eq!(*calls.borrow(), vec![Some(42)]);

        assert_eq!(bus.remove_listener("X", &f), Ok(true));
        bus.publish("X", Some(&42));
        assert_eq!(*calls.borrow(), vec![Some(42)]);
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus: EventBus<i32> = EventBus::new();
        assert_eq!(bus.publish("unknown", Some(&1)), Delivery::default());

        bus.register_event("empty");
        assert_eq!(bus.publish("empty", None), Delivery::default());
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let bus = EventBus::new();
        bus.register_event("X");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let f = recording(&calls);

        bus.add_listener("X", &f).unwrap();
        bus.add_listener("X", &f.clone()).unwrap();
        assert_eq!(bus.listener_count("X"), Some(1));

        bus.publish("X", None);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_distinct_listeners_both_called() {
        let bus = EventBus::new();
        bus.register_event("X");
        let calls = Rc::new(RefCell::new(Vec::new()));

        bus.add_listener("X", &recording(&calls)).unwrap();
        bus.add_listener("X", &recording(&calls)).unwrap();

        let delivery = bus.publish("X", Some(&7));
        assert_eq!(delivery, Delivery { invoked: 2, failed: 0 });
        assert_eq!(*calls.borrow(), vec![Some(7), Some(7)]);
    }

    #[test]
    fn test_unregistered_event_use() {
        let bus: EventBus<i32> = EventBus::new();
        let f = Listener::new(|_: Option<&i32>| {});
        let expected = EventError::UnregisteredEvent { name: "nope".into() };

        assert_eq!(bus.add_listener("nope", &f), Err(expected.clone()));
        assert_eq!(bus.remove_listener("nope", &f), Err(expected));
        assert!(!bus.is_registered("nope"));
        assert_eq!(bus.listener_count("nope"), None);
    }

    #[test]
    fn test_remove_absent_listener() {
        let bus: EventBus<i32> = EventBus::new();
        bus.register_event("X");
        let f = Listener::new(|_: Option<&i32>| {});
        assert_eq!(bus.remove_listener("X", &f), Ok(false));
    }

    #[test]
    fn test_failing_listener_isolated() {
        let bus = EventBus::new();
        bus.register_event("X");

        let failing = Listener::fallible(|_: Option<&i32>| anyhow::bail!("boom"));
        let calls = Rc::new(RefCell::new(Vec::new()));
        bus.add_listener("X", &failing).unwrap();
        bus.add_listener("X", &recording(&calls)).unwrap();

        let delivery = bus.publish("X", Some(&1));
        assert_eq!(delivery, Delivery { invoked: 2, failed: 1 });
        assert_eq!(*calls.borrow(), vec![Some(1)]);
    }

    #[test]
    fn test_panicking_listener_isolated() {
        let bus = EventBus::new();
        bus.register_event("X");

        let panicking = Listener::new(|_: Option<&i32>| panic!("listener bug"));
        let calls = Rc::new(RefCell::new(Vec::new()));
        bus.add_listener("X", &panicking).unwrap();
        bus.add_listener("X", &recording(&calls)).unwrap();

        let delivery = bus.publish("X", Some(&3));
        assert_eq!(delivery.failed, 1);
        assert_eq!(*calls.borrow(), vec![Some(3)]);
    }

    #[test]
    fn test_reregister_clears_listeners() {
        let bus = EventBus::new();
        bus.register_event("X");
        let calls = Rc::new(RefCell::new(Vec::new()));
        bus.add_listener("X", &recording(&calls)).unwrap();

        bus.register_event("X");
        assert_eq!(bus.listener_count("X"), Some(0));
        bus.publish("X", Some(&1));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_subscribe_cleanup() {
        let bus = Rc::new(EventBus::new());
        bus.register_event("tick");

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let cleanup = bus
            .subscribe("tick", move |_: Option<&()>| count_clone.set(count_clone.get() + 1))
            .unwrap();

        bus.publish("tick", None);
        assert_eq!(count.get(), 1);

        cleanup();
        bus.publish("tick", None);
        assert_eq!(count.get(), 1);
        assert_eq!(bus.listener_count("tick"), Some(0));
    }

    #[test]
    fn test_cleanup_after_reregistration_leaves_new_listeners() {
        let bus = Rc::new(EventBus::new());
        bus.register_event("tick");

        let stale = bus.subscribe("tick", |_: Option<&()>| {}).unwrap();
        bus.register_event("tick");

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        bus.add_listener("tick", &Listener::new(move |_| count_clone.set(count_clone.get() + 1)))
            .unwrap();

        stale();
        assert_eq!(bus.listener_count("tick"), Some(1));
        bus.publish("tick", None);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cleanup_after_bus_dropped() {
        let bus = Rc::new(EventBus::new());
        bus.register_event("tick");
        let cleanup = bus.subscribe("tick", |_: Option<&()>| {}).unwrap();
        drop(bus);
        cleanup();
    }

    #[test]
    fn test_subscribe_unregistered() {
        let bus: Rc<EventBus<()>> = Rc::new(EventBus::new());
        assert!(bus.subscribe("nope", |_| {}).is_err());
    }

    #[test]
    fn test_listener_may_mutate_bus_during_dispatch() {
        let bus = Rc::new(EventBus::new());
        bus.register_event("X");
        bus.register_event("Y");

        let calls = Rc::new(RefCell::new(Vec::new()));
        let late = recording(&calls);

        let bus_clone = Rc::downgrade(&bus);
        let late_clone = late.clone();
        let adder = Listener::new(move |_: Option<&i32>| {
            if let Some(bus) = bus_clone.upgrade() {
                bus.add_listener("X", &late_clone).unwrap();
                bus.publish("Y", Some(&9));
            }
        });
        bus.add_listener("X", &adder).unwrap();

        bus.publish("X", Some(&1));
        assert!(calls.borrow().is_empty());

        bus.remove_listener("X", &adder).unwrap();
        bus.publish("X", Some(&2));
        assert_eq!(*calls.borrow(), vec![Some(2)]);
    }

    #[test]
    fn test_typed_events() {
        #[derive(Debug)]
        enum AppEvent {
            Clicked { times: u32 },
            Loaded,
        }

        impl Event for AppEvent {
            fn name(&self) -> &str {
                match self {
                    AppEvent::Clicked { .. } => "BUTTON_CLICKED",
                    AppEvent::Loaded => "MAIN_LOADED",
                }
            }
        }

        let bus: EventBus<AppEvent> = EventBus::new();
        bus.register_event("BUTTON_CLICKED");
        bus.register_event("MAIN_LOADED");

        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();
        let on_click = Listener::new(move |event: Option<&AppEvent>| {
            if let Some(AppEvent::Clicked { times }) = event {
                clicks_clone.set(clicks_clone.get() + times);
            }
        });
        bus.add_listener("BUTTON_CLICKED", &on_click).unwrap();

        assert_eq!(bus.emit(&AppEvent::Clicked { times: 3 }).invoked, 1);
        assert_eq!(bus.emit(&AppEvent::Loaded).invoked, 0);
        assert_eq!(clicks.get(), 3);

        let mut names = bus.event_names();
        names.sort();
        assert_eq!(names, vec!["BUTTON_CLICKED", "MAIN_LOADED"]);
    }
}

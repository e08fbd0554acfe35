//! Sparse per-widget storage.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use weft_core::alloc::HashMap;

/// Callback invoked when a handler raises an event.
pub type EventCallback = Rc<dyn Fn(&dyn Any)>;

/// Rarely-used widget fields and event subscriptions.
///
/// Attached to a widget the first time something is stored, so widgets that
/// never use it pay only for an empty `Option`.
#[derive(Default)]
pub struct PropertyStore {
    values: HashMap<&'static str, Box<dyn Any>>,
    events: HashMap<&'static str, Vec<EventCallback>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the previous value if it had the same type.
    pub fn set<T: 'static>(&mut self, key: &'static str, value: T) -> Option<T> {
        self.values
            .insert(key, Box::new(value))
            .and_then(|old| old.downcast::<T>().ok().map(|b| *b))
    }

    pub fn get<T: 'static>(&self, key: &'static str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self, key: &'static str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    pub fn remove<T: 'static>(&mut self, key: &'static str) -> Option<T> {
        self.values
            .remove(key)
            .and_then(|old| old.downcast::<T>().ok().map(|b| *b))
    }

    pub fn contains(&self, key: &'static str) -> bool {
        self.values.contains_key(key)
    }

    /// Add a callback for `event`.
    pub fn subscribe(&mut self, event: &'static str, callback: EventCallback) {
        self.events.entry(event).or_default().push(callback);
    }

    /// Snapshot of the callbacks for `event`, in subscription order.
    pub fn callbacks(&self, event: &str) -> Vec<EventCallback> {
        self.events.get(event).cloned().unwrap_or_default()
    }

    pub fn has_subscribers(&self, event: &str) -> bool {
        self.events.get(event).is_some_and(|list| !list.is_empty())
    }

    /// Drop every callback for `event`.
    pub fn clear_event(&mut self, event: &str) {
        self.events.remove(event);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.events.is_empty()
    }
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("values", &self.values.keys().collect::<Vec<_>>())
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish()
    }
}

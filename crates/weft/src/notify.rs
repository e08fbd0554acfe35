//! Global widget notifications.
//!
//! Observers (inspectors, theme managers, test harnesses) subscribe to the
//! process-wide [`Notifications`] hub to learn when widgets are created or
//! restyled.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::types::TypeInfo;
use crate::widget::WidgetId;

/// What happened to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetEventKind {
    /// The widget finished initialization.
    Created,
    /// Style rules were applied.
    Styled,
    /// The style string changed on an initialized widget.
    StyleChanged,
}

/// A widget notification.
#[derive(Debug, Clone)]
pub struct WidgetEvent<'a> {
    pub kind: WidgetEventKind,
    pub id: WidgetId,
    pub type_info: &'static TypeInfo,
    pub style: Option<&'a str>,
}

/// Identifies a subscription for [`Notifications::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&WidgetEvent<'_>) + Send + Sync>;

/// Observer list for widget notifications.
#[derive(Default)]
pub struct Notifications {
    next_id: AtomicU64,
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide hub the widget lifecycle emits to.
    pub fn global() -> &'static Notifications {
        static GLOBAL: OnceLock<Notifications> = OnceLock::new();
        GLOBAL.get_or_init(Notifications::new)
    }

    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&WidgetEvent<'_>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.write().push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Deliver `event` to every observer.
    ///
    /// Observers are called without the lock held, so they may subscribe or
    /// unsubscribe.
    pub fn emit(&self, event: &WidgetEvent<'_>) {
        let observers: Vec<Observer> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("observers", &self.len())
            .finish()
    }
}

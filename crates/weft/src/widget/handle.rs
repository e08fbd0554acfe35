use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::WidgetId;
use super::store::PropertyStore;
use crate::types::TypeInfo;

/// State shared between a widget and the handles given to its handler.
pub(crate) struct WidgetShared {
    pub(crate) id: WidgetId,
    pub(crate) type_info: &'static TypeInfo,
    pub(crate) disposed: Cell<bool>,
    pub(crate) store: RefCell<Option<PropertyStore>>,
}

impl WidgetShared {
    pub(crate) fn new(type_info: &'static TypeInfo) -> Self {
        Self {
            id: WidgetId::next(),
            type_info,
            disposed: Cell::new(false),
            store: RefCell::new(None),
        }
    }

    pub(crate) fn with_store<R>(&self, f: impl FnOnce(&mut PropertyStore) -> R) -> R {
        let mut store = self.store.borrow_mut();
        f(store.get_or_insert_with(PropertyStore::new))
    }
}

/// Non-owning reference from a handler back to its widget.
///
/// Handlers keep this to raise events. It never keeps the widget alive, and
/// every call tolerates the widget having been dropped or disposed.
#[derive(Clone)]
pub struct WidgetHandle(Weak<WidgetShared>);

impl WidgetHandle {
    pub(crate) fn new(shared: &Rc<WidgetShared>) -> Self {
        Self(Rc::downgrade(shared))
    }

    /// A handle that is never alive.
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    /// Whether the widget still exists and has not been disposed.
    pub fn is_alive(&self) -> bool {
        self.0
            .upgrade()
            .is_some_and(|shared| !shared.disposed.get())
    }

    pub fn id(&self) -> Option<WidgetId> {
        self.0.upgrade().map(|shared| shared.id)
    }

    pub fn type_info(&self) -> Option<&'static TypeInfo> {
        self.0.upgrade().map(|shared| shared.type_info)
    }

    /// Invoke the widget's subscribers for `event` with `args`.
    ///
    /// Returns whether any subscriber ran. Callbacks run without the store
    /// borrowed, so they may subscribe further.
    pub fn trigger(&self, event: &str, args: &dyn Any) -> bool {
        let Some(shared) = self.0.upgrade() else {
            tracing::trace!("Dropped event {} for a released widget", event);
            return false;
        };
        if shared.disposed.get() {
            return false;
        }

        let callbacks = shared
            .store
            .borrow()
            .as_ref()
            .map(|store| store.callbacks(event))
            .unwrap_or_default();
        for callback in &callbacks {
            callback(args);
        }
        !callbacks.is_empty()
    }
}

impl fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("id", &self.id())
            .field("alive", &self.is_alive())
            .finish()
    }
}

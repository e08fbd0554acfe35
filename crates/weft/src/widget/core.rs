use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use weft_core::alloc::HashSet;

use super::handle::{WidgetHandle, WidgetShared};
use super::store::{EventCallback, PropertyStore};
use super::{WidgetId, WidgetState};
use crate::error::{WeftError, WeftResult};
use crate::handler::Handler;
use crate::platform::{Factory, Platform};
use crate::platform::registry::HandlerView;
use crate::types::TypeInfo;

struct HandlerSlot {
    instance: Box<dyn Any>,
    instance_type: &'static str,
    view: HandlerView,
}

impl HandlerSlot {
    fn get(&self) -> Option<&dyn Handler> {
        (self.view.get)(self.instance.as_ref())
    }

    fn get_mut(&mut self) -> Option<&mut dyn Handler> {
        (self.view.get_mut)(self.instance.as_mut())
    }
}

/// The part of every widget that the toolkit manages.
///
/// Owns the handler, tracks the lifecycle state, and holds the shared state
/// that [`WidgetHandle`]s point at. Widgets embed one `WidgetCore` at the
/// bottom of their base chain.
pub struct WidgetCore {
    shared: Rc<WidgetShared>,
    handler: Option<HandlerSlot>,
    state: WidgetState,
    platform: Arc<Platform>,
    style: Option<String>,
    activated_events: HashSet<&'static str>,
}

impl WidgetCore {
    /// Run the handler factory and wrap its output.
    pub(crate) fn create(
        platform: Arc<Platform>,
        type_info: &'static TypeInfo,
        factory: &Factory,
    ) -> WeftResult<Self> {
        let view = factory.handler_view().ok_or(WeftError::NotAHandler {
            type_name: type_info.name(),
        })?;
        let instance = factory.create_erased(type_info)?;

        Ok(Self {
            shared: Rc::new(WidgetShared::new(type_info)),
            handler: Some(HandlerSlot {
                instance,
                instance_type: factory.instance_type(),
                view,
            }),
            state: WidgetState::Uninitialized,
            platform,
            style: None,
            activated_events: HashSet::new(),
        })
    }

    /// Hand the handler its back-reference.
    pub(crate) fn attach_handler(&mut self) {
        let handle = self.handle();
        if let Some(handler) = self.handler.as_mut().and_then(HandlerSlot::get_mut) {
            handler.attach(handle);
        }
        self.state = WidgetState::HandlerAssigned;
    }

    pub fn id(&self) -> WidgetId {
        self.shared.id
    }

    /// Descriptor of the concrete widget type.
    pub fn type_info(&self) -> &'static TypeInfo {
        self.shared.type_info
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: WidgetState) {
        self.state = state;
    }

    /// Whether initialization has completed.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, WidgetState::Initialized | WidgetState::Styled)
    }

    pub fn is_disposed(&self) -> bool {
        self.state == WidgetState::Disposed
    }

    /// The platform that created this widget's handler.
    pub fn platform(&self) -> &Arc<Platform> {
        &self.platform
    }

    /// The space-separated style names.
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub(crate) fn replace_style(&mut self, style: Option<String>) {
        self.style = style;
    }

    /// A non-owning reference for handlers and callbacks.
    pub fn handle(&self) -> WidgetHandle {
        WidgetHandle::new(&self.shared)
    }

    fn disposed(&self) -> WeftError {
        WeftError::ObjectDisposed {
            type_name: self.type_info().name(),
        }
    }

    pub fn handler(&self) -> WeftResult<&dyn Handler> {
        self.handler
            .as_ref()
            .and_then(HandlerSlot::get)
            .ok_or_else(|| self.disposed())
    }

    pub fn handler_mut(&mut self) -> WeftResult<&mut dyn Handler> {
        let type_name = self.type_info().name();
        self.handler
            .as_mut()
            .and_then(HandlerSlot::get_mut)
            .ok_or(WeftError::ObjectDisposed { type_name })
    }

    /// The handler through the interface `H` its factory was registered with.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let button = core.handler_as::<dyn ButtonHandler>()?;
    /// button.set_text("OK");
    /// ```
    pub fn handler_as<H: ?Sized + 'static>(&self) -> WeftResult<&H> {
        let slot = self.handler.as_ref().ok_or_else(|| self.disposed())?;
        match slot.instance.downcast_ref::<Box<H>>() {
            Some(boxed) => Ok(&**boxed),
            None => Err(self.mismatch::<H>(slot.instance_type)),
        }
    }

    pub fn handler_as_mut<H: ?Sized + 'static>(&mut self) -> WeftResult<&mut H> {
        let type_name = self.type_info().name();
        let slot = self
            .handler
            .as_mut()
            .ok_or(WeftError::ObjectDisposed { type_name })?;
        let actual = slot.instance_type;
        match slot.instance.downcast_mut::<Box<H>>() {
            Some(boxed) => Ok(&mut **boxed),
            None => Err(WeftError::InstanceMismatch {
                type_name,
                expected: std::any::type_name::<H>(),
                actual,
            }),
        }
    }

    fn mismatch<H: ?Sized>(&self, actual: &'static str) -> WeftError {
        WeftError::InstanceMismatch {
            type_name: self.type_info().name(),
            expected: std::any::type_name::<H>(),
            actual,
        }
    }

    /// Tell the handler to start forwarding `event`.
    ///
    /// Each event is activated at most once. Handlers without the
    /// event capability ignore activation.
    pub fn activate_event(&mut self, event: &'static str) {
        if !self.activated_events.insert(event) {
            return;
        }
        match self
            .handler
            .as_mut()
            .and_then(HandlerSlot::get_mut)
            .and_then(|handler| handler.as_event_handler())
        {
            Some(events) => {
                tracing::trace!("Widget {:?}: activating event {}", self.shared.id, event);
                events.handle_event(event);
            }
            None => {
                tracing::trace!(
                    "Widget {:?}: handler does not handle events, skipped {}",
                    self.shared.id,
                    event
                );
            }
        }
    }

    /// Whether `event` has been activated on the handler.
    pub fn is_event_activated(&self, event: &str) -> bool {
        self.activated_events.contains(event)
    }

    /// Add a callback for `event` and activate it on the handler.
    pub fn subscribe<F>(&mut self, event: &'static str, callback: F)
    where
        F: Fn(&dyn Any) + 'static,
    {
        let callback: EventCallback = Rc::new(callback);
        self.shared
            .with_store(|store| store.subscribe(event, callback));
        self.activate_event(event);
    }

    /// Run `f` against the widget's property store, creating it if needed.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut PropertyStore) -> R) -> R {
        self.shared.with_store(f)
    }

    /// Clone a value out of the property store.
    pub fn property<T: Clone + 'static>(&self, key: &'static str) -> Option<T> {
        self.shared
            .store
            .borrow()
            .as_ref()
            .and_then(|store| store.get::<T>(key).cloned())
    }

    pub fn set_property<T: 'static>(&self, key: &'static str, value: T) -> Option<T> {
        self.shared.with_store(|store| store.set(key, value))
    }

    /// Whether the property store has been created.
    pub fn has_store(&self) -> bool {
        self.shared.store.borrow().is_some()
    }

    /// Dispose the handler and mark the widget disposed.
    ///
    /// Returns `false` if it was already disposed.
    pub(crate) fn dispose(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        if let Some(mut slot) = self.handler.take()
            && let Some(handler) = slot.get_mut()
        {
            handler.dispose();
        }
        self.state = WidgetState::Disposed;
        self.shared.disposed.set(true);
        self.shared.store.borrow_mut().take();
        tracing::debug!(
            "Disposed {} widget {:?}",
            self.type_info().name(),
            self.shared.id
        );
        true
    }
}

impl Drop for WidgetCore {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCore")
            .field("id", &self.shared.id)
            .field("type", &self.type_info().name())
            .field("state", &self.state)
            .field("platform", &self.platform.id())
            .field("style", &self.style)
            .finish()
    }
}

//! Handler traits.
//!
//! A handler is the platform-specific object backing a widget. Toolkits
//! define one interface trait per widget kind (for example
//! `trait ButtonHandler: Handler`), backends implement it, and the widget
//! reaches its handler through that interface.
//!
//! # Capability queries
//!
//! Optional behavior is exposed through query methods returning
//! `Option<&mut dyn Capability>` instead of downcasting. The only capability
//! the core itself uses is [`HandleEvent`], which lets the widget activate
//! native events on demand.

use std::any::Any;

use crate::widget::WidgetHandle;

/// Conversions every handler gets for free.
///
/// Implemented for all sized [`Handler`] types; it lets code holding an
/// interface object (`dyn ButtonHandler`) view it as `dyn Handler` or
/// `dyn Any`.
pub trait AsHandler {
    /// View as the base handler trait.
    fn as_handler(&self) -> &dyn Handler;
    /// View as the base handler trait (mutable).
    fn as_handler_mut(&mut self) -> &mut dyn Handler;
    /// View as `Any` for downcasting to the concrete backend type.
    fn as_any(&self) -> &dyn Any;
    /// View as `Any` for downcasting to the concrete backend type (mutable).
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Handler> AsHandler for T {
    fn as_handler(&self) -> &dyn Handler {
        self
    }

    fn as_handler_mut(&mut self) -> &mut dyn Handler {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Base trait for platform handlers.
///
/// Every method has a default so simple backends only implement their
/// interface trait.
pub trait Handler: AsHandler + 'static {
    /// Receive the non-owning back-reference to the owning widget.
    ///
    /// Called once, right after the handler is created.
    fn attach(&mut self, widget: WidgetHandle) {
        let _ = widget;
    }

    /// Create native resources. Called once by widget initialization.
    fn initialize(&mut self) {}

    /// Query whether this handler can activate native events on demand.
    fn as_event_handler(&mut self) -> Option<&mut dyn HandleEvent> {
        None
    }

    /// Release native resources. Called at most once.
    fn dispose(&mut self) {}
}

/// Capability: wire a native event when the widget needs it.
pub trait HandleEvent {
    /// Start forwarding the native event identified by `event`.
    fn handle_event(&mut self, event: &'static str);
}

//! Widgets and their handler lifecycle.
//!
//! A widget is a plain Rust struct that embeds a [`WidgetCore`], either
//! directly or through the widget it extends. The core owns the
//! platform handler created for the widget's concrete [`TypeInfo`].
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized -> HandlerAssigned -> Initialized -> Styled -> Disposed
//! ```
//!
//! [`construct`] resolves and creates the handler, gives it a
//! [`WidgetHandle`], builds the widget, and initializes it unless the type
//! asked for manual initialization. [`WidgetExt::initialize`] activates
//! overridden events and applies styles. [`WidgetExt::dispose`] (or
//! dropping the widget) releases the handler.
//!
//! # Extending widgets
//!
//! A widget extends another by embedding it and returning it from
//! [`Widget::base`]. Downcasts through `dyn Widget` walk that chain, so style
//! rules written for `Button` also apply to a `FancyButton` built on it.
//!
//! [`TypeInfo`]: crate::TypeInfo

mod core;
mod handle;
mod lifecycle;
mod store;

pub use self::core::WidgetCore;
pub use handle::WidgetHandle;
pub use lifecycle::{WidgetExt, construct, construct_on};
pub use store::{EventCallback, PropertyStore};

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique widget identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetState {
    /// Created, handler not yet attached.
    Uninitialized,
    /// Handler created and attached.
    HandlerAssigned,
    /// `initialize` has run; styles not applied yet.
    Initialized,
    /// Initialized and styled.
    Styled,
    /// Handler released.
    Disposed,
}

/// Conversions every widget gets for free.
pub trait AsWidget {
    fn as_widget(&self) -> &dyn Widget;
    fn as_widget_mut(&mut self) -> &mut dyn Widget;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Widget> AsWidget for T {
    fn as_widget(&self) -> &dyn Widget {
        self
    }

    fn as_widget_mut(&mut self) -> &mut dyn Widget {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A widget.
///
/// # Example
///
/// ```ignore
/// pub struct Button {
///     core: WidgetCore,
/// }
///
/// impl Widget for Button {
///     fn core(&self) -> &WidgetCore {
///         &self.core
///     }
///
///     fn core_mut(&mut self) -> &mut WidgetCore {
///         &mut self.core
///     }
/// }
///
/// pub struct FancyButton {
///     button: Button,
/// }
///
/// impl Widget for FancyButton {
///     fn core(&self) -> &WidgetCore {
///         self.button.core()
///     }
///
///     fn core_mut(&mut self) -> &mut WidgetCore {
///         self.button.core_mut()
///     }
///
///     fn base(&self) -> Option<&dyn Widget> {
///         Some(&self.button)
///     }
///
///     fn base_mut(&mut self) -> Option<&mut dyn Widget> {
///         Some(&mut self.button)
///     }
/// }
/// ```
pub trait Widget: AsWidget + 'static {
    fn core(&self) -> &WidgetCore;

    fn core_mut(&mut self) -> &mut WidgetCore;

    /// The embedded widget this one extends, if any.
    fn base(&self) -> Option<&dyn Widget> {
        None
    }

    fn base_mut(&mut self) -> Option<&mut dyn Widget> {
        None
    }
}

impl<'w> dyn Widget + 'w {
    /// Whether this widget is a `T` or extends one.
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Find the `T` in this widget's base chain, most-derived first.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self.as_any().downcast_ref::<T>() {
            Some(widget) => Some(widget),
            None => self.base()?.downcast_ref::<T>(),
        }
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        if self.as_any().is::<T>() {
            return self.as_any_mut().downcast_mut::<T>();
        }
        self.base_mut()?.downcast_mut::<T>()
    }
}

impl<'w> fmt::Debug for dyn Widget + 'w {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.core(), f)
    }
}

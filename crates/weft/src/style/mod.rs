//! Style rules and the cascade.
//!
//! A style rule is an action run against a widget and its handler. Rules
//! are keyed either by a style name (`"large"`, matched against the
//! widget's space-separated style string) or by a Rust type. Type-keyed
//! rules run through the cascade for user widget types that extend the
//! key type, and directly against handlers of exactly that type.
//!
//! The active [`StyleProvider`] is process-wide and replaceable; by default
//! it is [`StyleEngine::global`].
//!
//! # Example
//!
//! ```ignore
//! use weft::style::StyleEngine;
//!
//! let styles = StyleEngine::global();
//! styles.add_type::<SettingsPanel, _>(|panel| panel.set_padding(4));
//! styles.add::<GtkLabel, _>("large", |label| label.set_font_size(24.0));
//! ```

mod engine;

pub use engine::{CascadeScope, StyleEngine};

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, const_rwlock};

use crate::handler::Handler;
use crate::widget::Widget;

/// What a rule is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleKey {
    /// A style name listed in the widget's style string.
    Name(Cow<'static, str>),
    /// A widget or handler type.
    Type(TypeId),
}

impl StyleKey {
    /// Key for the Rust type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        StyleKey::Type(TypeId::of::<T>())
    }
}

impl From<&'static str> for StyleKey {
    fn from(name: &'static str) -> Self {
        StyleKey::Name(Cow::Borrowed(name))
    }
}

impl From<String> for StyleKey {
    fn from(name: String) -> Self {
        StyleKey::Name(Cow::Owned(name))
    }
}

/// The object a rule is currently applied to.
pub enum StyleTarget<'a> {
    Widget(&'a mut dyn Widget),
    Handler(&'a mut dyn Handler),
}

impl<'a> StyleTarget<'a> {
    /// Downcast to `T`, searching the widget's base chain.
    pub fn downcast_mut<T: Any>(self) -> Option<&'a mut T> {
        match self {
            StyleTarget::Widget(widget) => widget.downcast_mut::<T>(),
            StyleTarget::Handler(handler) => handler.as_any_mut().downcast_mut::<T>(),
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, StyleTarget::Widget(_))
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, StyleTarget::Handler(_))
    }
}

impl fmt::Debug for StyleTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleTarget::Widget(widget) => f.debug_tuple("Widget").field(&widget.core().id()).finish(),
            StyleTarget::Handler(_) => f.write_str("Handler"),
        }
    }
}

/// A style action.
pub type StyleRule = Arc<dyn for<'a> Fn(StyleTarget<'a>) + Send + Sync>;

/// Strategy that applies styles to widgets.
pub trait StyleProvider: Send + Sync {
    /// Apply type-keyed rules for the widget, then the named rules in `style`.
    ///
    /// `container` is the widget the target is being laid out in, if known.
    fn apply_cascading(
        &self,
        container: Option<&dyn Widget>,
        widget: &mut dyn Widget,
        style: Option<&str>,
    );

    /// Apply styles to a widget that just finished initializing.
    fn apply_default(&self, widget: &mut dyn Widget, style: Option<&str>) {
        self.apply_cascading(None, widget, style);
    }
}

static PROVIDER: RwLock<Option<Arc<dyn StyleProvider>>> = const_rwlock(None);

/// The active style provider.
pub fn provider() -> Arc<dyn StyleProvider> {
    match PROVIDER.read().as_ref() {
        Some(provider) => provider.clone(),
        None => StyleEngine::global(),
    }
}

/// Replace the active style provider.
pub fn set_provider(provider: Arc<dyn StyleProvider>) {
    tracing::debug!("Style provider replaced");
    *PROVIDER.write() = Some(provider);
}

/// Restore [`StyleEngine::global`] as the active provider.
pub fn reset_provider() {
    *PROVIDER.write() = None;
}

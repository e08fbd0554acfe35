//! Weft - the extensibility core of a widget toolkit
//!
//! Weft connects abstract widgets to the platform code that backs them.
//! It provides:
//!
//! - **Handler resolution**: abstract types map to platform factories, with
//!   preferred-handler redirects and on-demand loading of companion modules
//! - **Shared instances**: per-platform singletons created exactly once
//! - **Platform contexts**: several backends in one process, selected per thread
//! - **Extensions**: backends ship their factories as named modules
//! - **Event activation**: native events are wired only when user types
//!   override the hooks that need them
//! - **Style cascade**: type-keyed and named rules applied superclass first
//!
//! # Quick Start
//!
//! ```ignore
//! use weft::prelude::*;
//!
//! let platform = Platform::builder("gtk")
//!     .features(PlatformFeatures::DESKTOP)
//!     .add_module(gtk_backend::module())
//!     .build();
//! Platform::initialize(platform)?;
//!
//! let mut button = Button::new()?;
//! button.set_style("primary large")?;
//! ```
//!
//! # Architecture
//!
//! A [`Platform`] owns the factory registry, shared instances and a property
//! bag. Widgets embed a [`WidgetCore`] that owns the handler created from
//! the platform's factory for the widget's [`TypeInfo`]. Styles are applied
//! by the process-wide [`StyleProvider`], [`StyleEngine`] unless replaced.

pub mod error;
pub mod events;
pub mod extension;
pub mod handler;
pub mod notify;
pub mod platform;
pub mod properties;
pub mod style;
pub mod types;
pub mod widget;

// Re-export core utilities
pub use weft_core as core;

pub use error::{BoxError, WeftError, WeftResult};
pub use events::{EventDeclaration, EventLookup, register_event};
pub use extension::{Extension, ExtensionCatalog, ExtensionModule, FactoryExport, FnExtension};
pub use handler::{AsHandler, HandleEvent, Handler};
pub use notify::{Notifications, SubscriptionId, WidgetEvent, WidgetEventKind};
pub use platform::{
    Factory, HandlerInfo, Platform, PlatformBuilder, PlatformConfig, PlatformContext,
    PlatformFeatures,
};
pub use properties::{Properties, Property};
pub use style::{CascadeScope, StyleEngine, StyleKey, StyleProvider, StyleRule, StyleTarget};
pub use types::{Ancestors, Origin, TypeInfo};
pub use widget::{
    AsWidget, EventCallback, PropertyStore, Widget, WidgetCore, WidgetExt, WidgetHandle, WidgetId,
    WidgetState, construct, construct_on,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{WeftError, WeftResult};
    pub use crate::events::register_event;
    pub use crate::extension::{Extension, ExtensionModule, FnExtension};
    pub use crate::handler::{HandleEvent, Handler};
    pub use crate::platform::{Platform, PlatformConfig, PlatformFeatures};
    pub use crate::style::{StyleEngine, StyleProvider};
    pub use crate::types::TypeInfo;
    pub use crate::widget::{Widget, WidgetCore, WidgetExt, WidgetHandle, construct};
}

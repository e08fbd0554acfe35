//! Override-driven native event activation.
//!
//! Framework widgets declare which native event backs each customizable
//! hook (`Button`'s `on_click` is backed by `Click`). Native events are
//! only wired when something needs them: a subscriber, or a user type that
//! overrides the hook. User types list their overridden hooks in
//! [`TypeInfo::overrides`]; this module turns that list into event ids and
//! activates them on the handler when the widget initializes.
//!
//! # Example
//!
//! ```
//! use weft::{EventLookup, TypeInfo};
//!
//! struct Button;
//! struct OkButton;
//!
//! static BUTTON: TypeInfo = TypeInfo::framework::<Button>("Button", "weft.forms");
//! static OK_BUTTON: TypeInfo = TypeInfo::external::<OkButton>("OkButton", "app")
//!     .extends(&BUTTON)
//!     .overrides(&["on_click"]);
//!
//! let lookup = EventLookup::new();
//! lookup.register(&BUTTON, "on_click", "Click");
//!
//! assert_eq!(&*lookup.overridden_events(&OK_BUTTON), &["Click"]);
//! assert!(lookup.overridden_events(&BUTTON).is_empty());
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use weft_core::alloc::TypeIdMap;

use crate::types::TypeInfo;
use crate::widget::WidgetCore;

/// Links a framework hook to the native event that drives it.
#[derive(Debug, Clone, Copy)]
pub struct EventDeclaration {
    /// The framework type that declares the hook.
    pub declaring: &'static TypeInfo,
    /// Hook name, as listed in [`TypeInfo::overrides`].
    pub hook: &'static str,
    /// Event id passed to [`HandleEvent::handle_event`](crate::HandleEvent::handle_event).
    pub event: &'static str,
}

/// Declaration table plus the per-type result cache.
///
/// Results are cached for the lifetime of the lookup, so declarations must
/// be registered before the first widget of an affected type initializes.
#[derive(Default)]
pub struct EventLookup {
    declarations: RwLock<Vec<EventDeclaration>>,
    overridden: RwLock<TypeIdMap<Arc<[&'static str]>>>,
}

impl EventLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table used during widget initialization.
    pub fn global() -> &'static EventLookup {
        static GLOBAL: OnceLock<EventLookup> = OnceLock::new();
        GLOBAL.get_or_init(EventLookup::new)
    }

    pub fn register(&self, declaring: &'static TypeInfo, hook: &'static str, event: &'static str) {
        tracing::debug!(
            "Event declaration: {}::{} -> {}",
            declaring.name(),
            hook,
            event
        );
        self.declarations.write().push(EventDeclaration {
            declaring,
            hook,
            event,
        });
    }

    pub fn declarations(&self) -> Vec<EventDeclaration> {
        self.declarations.read().clone()
    }

    /// Events that must be wired for widgets of type `ty`.
    ///
    /// Walks `ty` and its bases up to the first framework type. Every hook
    /// those external types override contributes the events of matching
    /// declarations made by one of `ty`'s ancestors. Each event appears
    /// once, in discovery order.
    pub fn overridden_events(&self, ty: &TypeInfo) -> Arc<[&'static str]> {
        if let Some(events) = self.overridden.read().get(&ty.id()) {
            return events.clone();
        }

        let events = self.resolve(ty);
        self.overridden
            .write()
            .entry(ty.id())
            .or_insert(events)
            .clone()
    }

    /// Whether widgets of type `ty` wire `event` at initialization.
    pub fn is_overridden(&self, ty: &TypeInfo, event: &str) -> bool {
        self.overridden_events(ty).iter().any(|e| *e == event)
    }

    fn resolve(&self, ty: &TypeInfo) -> Arc<[&'static str]> {
        let declarations = self.declarations.read();
        let mut events: Vec<&'static str> = Vec::new();

        for external in ty.ancestors().take_while(|t| !t.is_framework()) {
            for hook in external.hooks() {
                let matching = declarations
                    .iter()
                    .filter(|decl| decl.hook == *hook && ty.is_subclass_of(decl.declaring));
                for decl in matching {
                    if !events.contains(&decl.event) {
                        events.push(decl.event);
                    }
                }
            }
        }

        if !events.is_empty() {
            tracing::debug!("{} overrides events {:?}", ty.name(), events);
        }
        events.into()
    }

    /// Activate every overridden event of the widget's type on its handler.
    ///
    /// A handler without the event capability makes this a no-op.
    pub fn hookup(&self, core: &mut WidgetCore) {
        let events = self.overridden_events(core.type_info());
        for &event in events.iter() {
            core.activate_event(event);
        }
    }

    /// Number of types with a cached result.
    pub fn cached_types(&self) -> usize {
        self.overridden.read().len()
    }
}

impl fmt::Debug for EventLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLookup")
            .field("declarations", &self.declarations.read().len())
            .field("cached_types", &self.cached_types())
            .finish()
    }
}

/// Register a declaration in the global table.
pub fn register_event(declaring: &'static TypeInfo, hook: &'static str, event: &'static str) {
    EventLookup::global().register(declaring, hook, event);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Control;
    struct TextBox;
    struct Plain;
    struct Validated;
    struct Shouty;
    struct SizedControl;

    static CONTROL: TypeInfo = TypeInfo::framework::<Control>("Control", "tests.forms");
    static TEXT_BOX: TypeInfo =
        TypeInfo::framework::<TextBox>("TextBox", "tests.forms").extends(&CONTROL);
    static PLAIN: TypeInfo = TypeInfo::external::<Plain>("Plain", "app").extends(&TEXT_BOX);
    static VALIDATED: TypeInfo = TypeInfo::external::<Validated>("Validated", "app")
        .extends(&TEXT_BOX)
        .overrides(&["on_text_changed", "on_size_changed"]);
    static SHOUTY: TypeInfo = TypeInfo::external::<Shouty>("Shouty", "app")
        .extends(&VALIDATED)
        .overrides(&["on_key_down", "on_text_changed"]);
    static SIZED_CONTROL: TypeInfo = TypeInfo::external::<SizedControl>("SizedControl", "app")
        .extends(&CONTROL)
        .overrides(&["on_text_changed"]);

    fn lookup() -> EventLookup {
        let lookup = EventLookup::new();
        lookup.register(&CONTROL, "on_size_changed", "SizeChanged");
        lookup.register(&CONTROL, "on_key_down", "KeyDown");
        lookup.register(&TEXT_BOX, "on_text_changed", "TextChanged");
        lookup
    }

    #[test]
    fn test_type_without_overrides_is_empty() {
        let lookup = lookup();
        assert!(lookup.overridden_events(&PLAIN).is_empty());
        assert!(lookup.overridden_events(&TEXT_BOX).is_empty());
    }

    #[test]
    fn test_overrides_collected_through_external_chain() {
        let lookup = lookup();
        assert_eq!(
            &*lookup.overridden_events(&VALIDATED),
            &["TextChanged", "SizeChanged"]
        );
        assert_eq!(
            &*lookup.overridden_events(&SHOUTY),
            &["KeyDown", "TextChanged", "SizeChanged"]
        );
    }

    #[test]
    fn test_declaration_must_belong_to_an_ancestor() {
        let lookup = lookup();
        // TextBox declares on_text_changed, but SizedControl does not extend TextBox.
        assert!(lookup.overridden_events(&SIZED_CONTROL).is_empty());
    }

    #[test]
    fn test_result_is_cached() {
        let lookup = lookup();
        let first = lookup.overridden_events(&VALIDATED);
        let second = lookup.overridden_events(&VALIDATED);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(lookup.cached_types(), 1);
        assert!(lookup.is_overridden(&VALIDATED, "TextChanged"));
        assert!(!lookup.is_overridden(&VALIDATED, "KeyDown"));
    }
}

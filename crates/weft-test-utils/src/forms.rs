//! A miniature widget set in the shape of a real toolkit.
//!
//! `Control` is the root, `Button` and `Label` extend it. Each widget kind
//! has a handler interface that backends implement; [`crate::mocks`]
//! provides recording implementations.

use std::any::Any;
use std::sync::{Arc, Once};

use weft::{
    Handler, Platform, TypeInfo, WeftResult, Widget, WidgetCore, construct, construct_on,
    register_event,
};

/// Module that owns the sample widgets; companions are `weft.forms.<platform>`.
pub const MODULE: &str = "weft.forms";

/// Handler interface for buttons.
pub trait ButtonHandler: Handler {
    fn set_text(&mut self, text: &str);
    fn text(&self) -> String;
}

/// Handler interface for labels.
pub trait LabelHandler: Handler {
    fn set_text(&mut self, text: &str);
    fn text(&self) -> String;
    fn set_font_size(&mut self, size: f32);
    fn font_size(&self) -> f32;
}

/// The root of the sample widget set.
///
/// `Button` and `Label` embed a `Control` and return it as their base, so
/// rules keyed by `Control` reach every widget.
pub struct Control {
    core: WidgetCore,
}

impl Control {
    pub fn from_core(core: WidgetCore) -> Self {
        Control { core }
    }

    /// Tooltip text, kept in the widget's property store.
    pub fn tooltip(&self) -> Option<String> {
        self.core.property::<String>("tooltip")
    }

    pub fn set_tooltip(&self, tooltip: impl Into<String>) {
        self.core.set_property("tooltip", tooltip.into());
    }
}

impl Widget for Control {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

pub static CONTROL: TypeInfo = TypeInfo::framework::<Control>("Control", MODULE);
pub static BUTTON_HANDLER: TypeInfo =
    TypeInfo::framework::<dyn ButtonHandler>("ButtonHandler", MODULE);
pub static LABEL_HANDLER: TypeInfo =
    TypeInfo::framework::<dyn LabelHandler>("LabelHandler", MODULE);
pub static BUTTON: TypeInfo = TypeInfo::framework::<Button>("Button", MODULE)
    .extends(&CONTROL)
    .with_handler(&BUTTON_HANDLER);
pub static LABEL: TypeInfo = TypeInfo::framework::<Label>("Label", MODULE)
    .extends(&CONTROL)
    .with_handler(&LABEL_HANDLER);

/// Register the hook-to-event declarations of the sample widgets.
///
/// Runs once per process; widget constructors call it.
pub fn register_events() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        register_event(&CONTROL, "on_mouse_down", "MouseDown");
        register_event(&BUTTON, "on_click", "Click");
        register_event(&LABEL, "on_text_changed", "TextChanged");
    });
}

/// A push button.
pub struct Button {
    control: Control,
}

impl Button {
    /// Create a button on the current platform.
    pub fn new() -> WeftResult<Self> {
        Self::with_type(&BUTTON)
    }

    pub fn new_on(platform: &Arc<Platform>) -> WeftResult<Self> {
        Self::with_type_on(platform, &BUTTON)
    }

    /// Create a button described by `ty`, for types that extend `Button`.
    pub fn with_type(ty: &'static TypeInfo) -> WeftResult<Self> {
        register_events();
        construct(ty, Button::from_core)
    }

    pub fn with_type_on(platform: &Arc<Platform>, ty: &'static TypeInfo) -> WeftResult<Self> {
        register_events();
        construct_on(platform, ty, Button::from_core)
    }

    pub fn from_core(core: WidgetCore) -> Self {
        Button {
            control: Control::from_core(core),
        }
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn set_text(&mut self, text: &str) -> WeftResult<()> {
        self.core_mut()
            .handler_as_mut::<dyn ButtonHandler>()?
            .set_text(text);
        Ok(())
    }

    pub fn text(&self) -> WeftResult<String> {
        Ok(self.core().handler_as::<dyn ButtonHandler>()?.text())
    }

    /// Subscribe to clicks raised by the handler.
    pub fn on_click(&mut self, callback: impl Fn() + 'static) {
        self.core_mut()
            .subscribe("Click", move |_: &dyn Any| callback());
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        self.control.core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        self.control.core_mut()
    }

    fn base(&self) -> Option<&dyn Widget> {
        Some(&self.control)
    }

    fn base_mut(&mut self) -> Option<&mut dyn Widget> {
        Some(&mut self.control)
    }
}

/// A text label.
pub struct Label {
    control: Control,
}

impl Label {
    pub fn new() -> WeftResult<Self> {
        register_events();
        construct(&LABEL, Label::from_core)
    }

    pub fn new_on(platform: &Arc<Platform>) -> WeftResult<Self> {
        register_events();
        construct_on(platform, &LABEL, Label::from_core)
    }

    pub fn from_core(core: WidgetCore) -> Self {
        Label {
            control: Control::from_core(core),
        }
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn set_text(&mut self, text: &str) -> WeftResult<()> {
        self.core_mut()
            .handler_as_mut::<dyn LabelHandler>()?
            .set_text(text);
        Ok(())
    }

    pub fn text(&self) -> WeftResult<String> {
        Ok(self.core().handler_as::<dyn LabelHandler>()?.text())
    }

    pub fn font_size(&self) -> WeftResult<f32> {
        Ok(self.core().handler_as::<dyn LabelHandler>()?.font_size())
    }

    pub fn set_font_size(&mut self, size: f32) -> WeftResult<()> {
        self.core_mut()
            .handler_as_mut::<dyn LabelHandler>()?
            .set_font_size(size);
        Ok(())
    }
}

impl Widget for Label {
    fn core(&self) -> &WidgetCore {
        self.control.core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        self.control.core_mut()
    }

    fn base(&self) -> Option<&dyn Widget> {
        Some(&self.control)
    }

    fn base_mut(&mut self) -> Option<&mut dyn Widget> {
        Some(&mut self.control)
    }
}

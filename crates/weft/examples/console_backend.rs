//! A toy backend that "renders" widgets by logging.
//!
//! This example shows how to:
//! - Declare a widget type and its handler interface
//! - Ship a backend as an extension module loaded on demand
//! - Override an event hook so the native event is wired
//! - Style widgets with type-keyed and named rules
//!
//! Run with: cargo run -p weft --example console_backend

use std::any::Any;

use weft::core::logging;
use weft::core::profiling::{self, ProfilingBackend};
use weft::prelude::*;
use weft::{ExtensionCatalog, Notifications, WidgetEventKind};

// ============================================================================
// Toolkit side
// ============================================================================

trait SwitchHandler: Handler {
    fn set_on(&mut self, on: bool);
    fn is_on(&self) -> bool;
    fn set_accent(&mut self, accent: &str);
}

static SWITCH_HANDLER: TypeInfo = TypeInfo::framework::<dyn SwitchHandler>("SwitchHandler", "demo");
static SWITCH: TypeInfo =
    TypeInfo::framework::<Switch>("Switch", "demo").with_handler(&SWITCH_HANDLER);

struct Switch {
    core: WidgetCore,
}

impl Switch {
    fn new() -> WeftResult<Self> {
        Self::with_type(&SWITCH)
    }

    fn with_type(ty: &'static TypeInfo) -> WeftResult<Self> {
        construct(ty, |core| Switch { core })
    }

    fn toggle(&mut self) -> WeftResult<bool> {
        let handler = self.core.handler_as_mut::<dyn SwitchHandler>()?;
        let on = !handler.is_on();
        handler.set_on(on);
        Ok(on)
    }

    fn on_toggled(&mut self, callback: impl Fn(bool) + 'static) {
        self.core.subscribe("Toggled", move |value: &dyn Any| {
            if let Some(on) = value.downcast_ref::<bool>() {
                callback(*on);
            }
        });
    }
}

impl Widget for Switch {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Backend side
// ============================================================================

#[derive(Default)]
struct ConsoleSwitch {
    on: bool,
    accent: String,
    widget: Option<WidgetHandle>,
    toggled_wired: bool,
}

impl Handler for ConsoleSwitch {
    fn attach(&mut self, widget: WidgetHandle) {
        self.widget = Some(widget);
    }

    fn initialize(&mut self) {
        tracing::info!("console: created switch");
    }

    fn as_event_handler(&mut self) -> Option<&mut dyn HandleEvent> {
        Some(self)
    }

    fn dispose(&mut self) {
        tracing::info!("console: destroyed switch");
    }
}

impl HandleEvent for ConsoleSwitch {
    fn handle_event(&mut self, event: &'static str) {
        tracing::info!("console: wiring native event {}", event);
        self.toggled_wired |= event == "Toggled";
    }
}

impl SwitchHandler for ConsoleSwitch {
    fn set_on(&mut self, on: bool) {
        self.on = on;
        tracing::info!("console: switch [{}] {}", self.accent, if on { "on" } else { "off" });
        if self.toggled_wired
            && let Some(widget) = &self.widget
        {
            widget.trigger("Toggled", &on);
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }

    fn set_accent(&mut self, accent: &str) {
        self.accent = accent.to_string();
    }
}

fn console_module() -> ExtensionModule {
    ExtensionModule::new("demo.console").handler(&SWITCH_HANDLER, || {
        Box::new(ConsoleSwitch::default()) as Box<dyn SwitchHandler>
    })
}

// ============================================================================
// User side
// ============================================================================

/// A switch subclass that overrides the toggled hook.
struct LoudSwitch;

static LOUD_SWITCH: TypeInfo = TypeInfo::external::<LoudSwitch>("LoudSwitch", "app")
    .extends(&SWITCH)
    .overrides(&["on_toggled"]);

fn main() -> WeftResult<()> {
    logging::init();
    profiling::init_profiling(ProfilingBackend::InProcess);

    weft::register_event(&SWITCH, "on_toggled", "Toggled");
    ExtensionCatalog::global().add(console_module());

    let platform = Platform::builder("console")
        .features(PlatformFeatures::DESKTOP)
        .build();
    Platform::initialize(platform.clone())?;

    let styles = StyleEngine::global();
    styles.add_type::<ConsoleSwitch, _>(|switch| switch.set_accent("grey"));
    styles.add::<ConsoleSwitch, _>("danger", |switch| switch.set_accent("red"));

    let subscription = Notifications::global().subscribe(|event| {
        if event.kind == WidgetEventKind::StyleChanged {
            tracing::info!("{} {:?} restyled to {:?}", event.type_info.name(), event.id, event.style);
        }
    });

    // The handler module is loaded the first time a switch is created.
    let mut plain = Switch::new()?;
    plain.toggle()?;
    tracing::info!("loaded modules: {:?}", platform.loaded_modules());

    let mut loud = Switch::with_type(&LOUD_SWITCH)?;
    loud.on_toggled(|on| tracing::info!("loud switch toggled: {}", on));
    loud.set_style("danger")?;
    loud.toggle()?;
    profiling::new_frame();

    loud.dispose();
    Notifications::global().unsubscribe(subscription);
    drop(plain);
    Ok(())
}

//! Recording handlers and mock platforms.

use std::sync::Arc;

use parking_lot::Mutex;
use weft::core::logging;
use weft::{
    ExtensionCatalog, ExtensionModule, HandleEvent, Handler, Platform, PlatformFeatures,
    WidgetHandle,
};

use crate::forms::{BUTTON_HANDLER, ButtonHandler, LABEL_HANDLER, LabelHandler, MODULE};

/// Records a handler call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerCall {
    Created { kind: &'static str },
    Attached { kind: &'static str },
    Initialized { kind: &'static str },
    HandleEvent { kind: &'static str, event: &'static str },
    SetText { kind: &'static str, text: String },
    SetFontSize { kind: &'static str, size: f32 },
    Disposed { kind: &'static str },
}

/// Shared, thread-safe call log.
///
/// Handlers live on the UI thread but the factories that create them are
/// `Send + Sync`, so the log sits behind a `Mutex`.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<HandlerCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: HandlerCall) {
        self.calls.lock().push(call);
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<HandlerCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&HandlerCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn contains(&self, call: &HandlerCall) -> bool {
        self.calls.lock().contains(call)
    }

    /// Events activated on handlers, in order.
    pub fn activated_events(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HandlerCall::HandleEvent { event, .. } => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Button handler that records its calls and can simulate clicks.
pub struct MockButton {
    log: CallLog,
    text: String,
    widget: WidgetHandle,
}

impl MockButton {
    const KIND: &'static str = "button";

    pub fn new(log: CallLog) -> Self {
        log.record(HandlerCall::Created { kind: Self::KIND });
        Self {
            log,
            text: String::new(),
            widget: WidgetHandle::detached(),
        }
    }

    /// Raise `Click` on the owning widget, as a native click would.
    pub fn click(&self) -> bool {
        self.widget.trigger("Click", &())
    }

    pub fn widget(&self) -> &WidgetHandle {
        &self.widget
    }
}

impl Handler for MockButton {
    fn attach(&mut self, widget: WidgetHandle) {
        self.log.record(HandlerCall::Attached { kind: Self::KIND });
        self.widget = widget;
    }

    fn initialize(&mut self) {
        self.log.record(HandlerCall::Initialized { kind: Self::KIND });
    }

    fn as_event_handler(&mut self) -> Option<&mut dyn HandleEvent> {
        Some(self)
    }

    fn dispose(&mut self) {
        self.log.record(HandlerCall::Disposed { kind: Self::KIND });
    }
}

impl HandleEvent for MockButton {
    fn handle_event(&mut self, event: &'static str) {
        self.log.record(HandlerCall::HandleEvent {
            kind: Self::KIND,
            event,
        });
    }
}

impl ButtonHandler for MockButton {
    fn set_text(&mut self, text: &str) {
        self.log.record(HandlerCall::SetText {
            kind: Self::KIND,
            text: text.to_string(),
        });
        self.text = text.to_string();
    }

    fn text(&self) -> String {
        self.text.clone()
    }
}

/// Label handler without event support.
pub struct MockLabel {
    log: CallLog,
    text: String,
    pub font_size: f32,
}

impl MockLabel {
    const KIND: &'static str = "label";

    /// Font size a fresh label reports.
    pub const DEFAULT_FONT_SIZE: f32 = 12.0;

    pub fn new(log: CallLog) -> Self {
        log.record(HandlerCall::Created { kind: Self::KIND });
        Self {
            log,
            text: String::new(),
            font_size: Self::DEFAULT_FONT_SIZE,
        }
    }
}

impl Handler for MockLabel {
    fn attach(&mut self, _widget: WidgetHandle) {
        self.log.record(HandlerCall::Attached { kind: Self::KIND });
    }

    fn initialize(&mut self) {
        self.log.record(HandlerCall::Initialized { kind: Self::KIND });
    }

    fn dispose(&mut self) {
        self.log.record(HandlerCall::Disposed { kind: Self::KIND });
    }
}

impl LabelHandler for MockLabel {
    fn set_text(&mut self, text: &str) {
        self.log.record(HandlerCall::SetText {
            kind: Self::KIND,
            text: text.to_string(),
        });
        self.text = text.to_string();
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_font_size(&mut self, size: f32) {
        self.log.record(HandlerCall::SetFontSize {
            kind: Self::KIND,
            size,
        });
        self.font_size = size;
    }

    fn font_size(&self) -> f32 {
        self.font_size
    }
}

/// Companion module `weft.forms.<platform_id>` exporting the mock handlers.
pub fn forms_module(platform_id: &str, log: &CallLog) -> ExtensionModule {
    let button_log = log.clone();
    let label_log = log.clone();
    ExtensionModule::new(format!("{}.{}", MODULE, platform_id))
        .handler(&BUTTON_HANDLER, move || {
            Box::new(MockButton::new(button_log.clone())) as Box<dyn ButtonHandler>
        })
        .handler(&LABEL_HANDLER, move || {
            Box::new(MockLabel::new(label_log.clone())) as Box<dyn LabelHandler>
        })
}

/// A platform with the mock handlers registered directly.
///
/// Uses a private catalog so tests never load modules from the global one.
pub fn mock_platform(id: &str) -> (Arc<Platform>, CallLog) {
    logging::try_init();
    let log = CallLog::new();
    let platform = Platform::builder(id)
        .features(PlatformFeatures::DESKTOP)
        .catalog(Arc::new(ExtensionCatalog::new()))
        .add_module(forms_module(id, &log))
        .build();
    (platform, log)
}

/// A platform whose handlers are only reachable by auto-loading the
/// companion module from its catalog.
pub fn lazy_platform(id: &str) -> (Arc<Platform>, CallLog) {
    logging::try_init();
    let log = CallLog::new();
    let catalog = Arc::new(ExtensionCatalog::new());
    catalog.add(forms_module(id, &log));
    let platform = Platform::builder(id).catalog(catalog).build();
    (platform, log)
}

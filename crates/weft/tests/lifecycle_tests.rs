//! Integration tests for the widget lifecycle.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use weft::*;
use weft_test_utils::*;

// ============================================================================
// Test Widgets
// ============================================================================

/// A button that must be initialized by its constructor.
struct DeferredButton {
    button: Button,
    ready: bool,
}

static DEFERRED_BUTTON: TypeInfo = TypeInfo::external::<DeferredButton>("DeferredButton", "tests")
    .extends(&BUTTON)
    .manual_initialize();

impl DeferredButton {
    fn new_on(platform: &Arc<Platform>) -> WeftResult<Self> {
        let mut widget = construct_on(platform, &DEFERRED_BUTTON, |core| DeferredButton {
            button: Button::from_core(core),
            ready: false,
        })?;
        assert_eq!(widget.core().state(), WidgetState::HandlerAssigned);
        widget.ready = true;
        widget.initialize()?;
        Ok(widget)
    }
}

impl Widget for DeferredButton {
    fn core(&self) -> &WidgetCore {
        self.button.core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        self.button.core_mut()
    }

    fn base(&self) -> Option<&dyn Widget> {
        Some(&self.button)
    }

    fn base_mut(&mut self) -> Option<&mut dyn Widget> {
        Some(&mut self.button)
    }
}

fn kinds(log: &CallLog) -> Vec<&'static str> {
    log.calls()
        .iter()
        .map(|call| match call {
            HandlerCall::Created { .. } => "created",
            HandlerCall::Attached { .. } => "attached",
            HandlerCall::Initialized { .. } => "initialized",
            HandlerCall::HandleEvent { .. } => "handle_event",
            HandlerCall::SetText { .. } => "set_text",
            HandlerCall::SetFontSize { .. } => "set_font_size",
            HandlerCall::Disposed { .. } => "disposed",
        })
        .collect()
}

// ============================================================================
// Construction and initialization
// ============================================================================

#[test]
fn test_construct_runs_full_lifecycle() {
    let (platform, log) = mock_platform("mock");
    let button = Button::new_on(&platform).unwrap();

    assert_eq!(button.core().state(), WidgetState::Styled);
    assert!(button.core().is_initialized());
    assert_eq!(kinds(&log), vec!["created", "attached", "initialized"]);
    assert_eq!(button.core().type_info().name(), "Button");
}

#[test]
fn test_manual_initialize_waits_for_constructor() {
    let (platform, log) = mock_platform("mock");
    let widget = DeferredButton::new_on(&platform).unwrap();

    assert!(widget.ready);
    assert_eq!(widget.core().state(), WidgetState::Styled);
    assert_eq!(log.count(|c| matches!(c, HandlerCall::Initialized { .. })), 1);
}

#[test]
fn test_second_initialize_is_ignored() {
    let (platform, log) = mock_platform("mock");
    let mut button = Button::new_on(&platform).unwrap();

    button.initialize().unwrap();

    assert_eq!(log.count(|c| matches!(c, HandlerCall::Initialized { .. })), 1);
}

#[test]
fn test_created_notification() {
    let (platform, _log) = mock_platform("mock");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = Notifications::global().subscribe(move |event| {
        if event.type_info.name() == "Label" {
            sink.lock().push((event.id, event.kind));
        }
    });

    let label = Label::new_on(&platform).unwrap();
    Notifications::global().unsubscribe(subscription);

    let mine: Vec<_> = seen
        .lock()
        .iter()
        .filter(|(id, _)| *id == label.core().id())
        .map(|(_, kind)| *kind)
        .collect();
    assert_eq!(mine, vec![WidgetEventKind::Created, WidgetEventKind::Styled]);
}

#[test]
fn test_failing_handler_factory_reports_creation_failed() {
    let (platform, log) = mock_platform("mock");
    platform.register_factory(
        &LABEL_HANDLER,
        Factory::try_handler(|| Err::<Box<dyn LabelHandler>, _>("no display")),
    );

    let err = Label::new_on(&platform).err().unwrap();
    assert!(matches!(err, WeftError::CreationFailed { type_name: "Label", .. }));
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "no display");
    assert!(log.calls().is_empty());
}

// ============================================================================
// Handler access
// ============================================================================

#[test]
fn test_handler_access_through_interface() {
    let (platform, log) = mock_platform("mock");
    let mut label = Label::new_on(&platform).unwrap();

    label.set_text("Name:").unwrap();
    assert_eq!(label.text().unwrap(), "Name:");
    assert!(log.contains(&HandlerCall::SetText {
        kind: "label",
        text: "Name:".to_string()
    }));

    let native = label
        .core()
        .handler()
        .unwrap()
        .as_any()
        .downcast_ref::<MockLabel>()
        .unwrap();
    assert_eq!(native.font_size, MockLabel::DEFAULT_FONT_SIZE);

    let err = label
        .core()
        .handler_as::<dyn ButtonHandler>()
        .err()
        .unwrap();
    assert!(matches!(err, WeftError::InstanceMismatch { type_name: "Label", .. }));
}

#[test]
fn test_widget_downcast_walks_base_chain() {
    let (platform, _log) = mock_platform("mock");
    let mut widget = DeferredButton::new_on(&platform).unwrap();

    let dyn_widget: &mut dyn Widget = &mut widget;
    assert!(dyn_widget.is::<DeferredButton>());
    assert!(dyn_widget.is::<Button>());
    assert!(dyn_widget.is::<Control>());
    assert!(!dyn_widget.is::<Label>());
    dyn_widget.downcast_mut::<Button>().unwrap().set_text("Later").unwrap();

    assert_eq!(widget.button.text().unwrap(), "Later");
}

// ============================================================================
// Disposal
// ============================================================================

#[test]
fn test_dispose_releases_handler() {
    let (platform, log) = mock_platform("mock");
    let mut label = Label::new_on(&platform).unwrap();

    assert!(label.dispose());
    assert_eq!(label.core().state(), WidgetState::Disposed);
    assert_eq!(log.count(|c| matches!(c, HandlerCall::Disposed { .. })), 1);

    let err = label.text().unwrap_err();
    assert!(matches!(err, WeftError::ObjectDisposed { type_name: "Label" }));
    assert!(matches!(
        label.set_font_size(20.0),
        Err(WeftError::ObjectDisposed { .. })
    ));
    assert!(label.core().handler().is_err());
}

#[test]
fn test_second_dispose_is_noop() {
    let (platform, log) = mock_platform("mock");
    let mut label = Label::new_on(&platform).unwrap();

    assert!(label.dispose());
    assert!(!label.dispose());
    drop(label);

    assert_eq!(log.count(|c| matches!(c, HandlerCall::Disposed { .. })), 1);
}

#[test]
fn test_initialize_after_dispose_fails() {
    let (platform, _log) = mock_platform("mock");
    let mut button = Button::new_on(&platform).unwrap();
    button.dispose();

    assert!(matches!(
        button.initialize(),
        Err(WeftError::ObjectDisposed { .. })
    ));
    assert!(matches!(
        button.set_style("big"),
        Err(WeftError::ObjectDisposed { .. })
    ));
}

#[test]
fn test_drop_disposes_handler() {
    let (platform, log) = mock_platform("mock");
    {
        let _button = Button::new_on(&platform).unwrap();
    }
    assert_eq!(kinds(&log).last(), Some(&"disposed"));
}

// ============================================================================
// Back-references
// ============================================================================

#[test]
fn test_handler_raises_events_through_handle() {
    let (platform, _log) = mock_platform("mock");
    let mut button = Button::new_on(&platform).unwrap();
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    button.on_click(move || counter.set(counter.get() + 1));

    let mock = |button: &Button| -> bool {
        button
            .core()
            .handler()
            .unwrap()
            .as_any()
            .downcast_ref::<MockButton>()
            .unwrap()
            .click()
    };
    assert!(mock(&button));
    assert!(mock(&button));
    assert_eq!(clicks.get(), 2);
}

#[test]
fn test_handle_tolerates_released_widget() {
    let (platform, _log) = mock_platform("mock");
    let button = Button::new_on(&platform).unwrap();
    let handle = button.core().handle();
    assert_eq!(handle.id(), Some(button.core().id()));

    drop(button);

    assert!(!handle.is_alive());
    assert!(!handle.trigger("Click", &()));
}

#[test]
fn test_property_store_is_lazy() {
    let (platform, _log) = mock_platform("mock");
    let button = Button::new_on(&platform).unwrap();
    assert!(!button.core().has_store());

    button.core().set_property("tooltip", String::from("Save"));
    assert!(button.core().has_store());
    assert_eq!(
        button.core().property::<String>("tooltip").as_deref(),
        Some("Save")
    );
}

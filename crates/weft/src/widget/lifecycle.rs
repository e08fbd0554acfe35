use std::sync::Arc;

use super::{Widget, WidgetCore, WidgetState};
use crate::error::{WeftError, WeftResult};
use crate::events::EventLookup;
use crate::notify::{Notifications, WidgetEvent, WidgetEventKind};
use crate::platform::Platform;
use crate::style;
use crate::types::TypeInfo;

/// Construct a widget of type `ty` on the current platform.
///
/// See [`construct_on`].
pub fn construct<W, F>(ty: &'static TypeInfo, build: F) -> WeftResult<W>
where
    W: Widget,
    F: FnOnce(WidgetCore) -> W,
{
    let platform = Platform::instance()?;
    construct_on(&platform, ty, build)
}

/// Construct a widget of type `ty` on `platform`.
///
/// Resolves and creates the handler, attaches its [`WidgetHandle`], passes
/// the resulting core to `build`, and initializes the widget unless `ty`
/// requires manual initialization.
///
/// [`WidgetHandle`]: super::WidgetHandle
pub fn construct_on<W, F>(platform: &Arc<Platform>, ty: &'static TypeInfo, build: F) -> WeftResult<W>
where
    W: Widget,
    F: FnOnce(WidgetCore) -> W,
{
    let info = platform.find_handler(ty)?;
    let mut core = WidgetCore::create(platform.clone(), ty, &info.factory)?;
    core.attach_handler();

    let mut widget = build(core);
    if info.auto_initialize {
        widget.initialize()?;
    }
    Ok(widget)
}

fn initialize(widget: &mut dyn Widget) -> WeftResult<()> {
    let core = widget.core_mut();
    match core.state() {
        WidgetState::Disposed => {
            return Err(WeftError::ObjectDisposed {
                type_name: core.type_info().name(),
            });
        }
        WidgetState::Initialized | WidgetState::Styled => {
            tracing::warn!(
                "{} widget {:?} initialized twice; ignoring",
                core.type_info().name(),
                core.id()
            );
            return Ok(());
        }
        WidgetState::Uninitialized | WidgetState::HandlerAssigned => {}
    }

    core.handler_mut()?.initialize();
    EventLookup::global().hookup(core);
    core.set_state(WidgetState::Initialized);

    let style = core.style().map(str::to_owned);
    Notifications::global().emit(&WidgetEvent {
        kind: WidgetEventKind::Created,
        id: core.id(),
        type_info: core.type_info(),
        style: style.as_deref(),
    });

    style::provider().apply_default(widget, style.as_deref());
    widget.core_mut().set_state(WidgetState::Styled);
    Ok(())
}

fn set_style(widget: &mut dyn Widget, style: &str) -> WeftResult<()> {
    let core = widget.core_mut();
    if core.is_disposed() {
        return Err(WeftError::ObjectDisposed {
            type_name: core.type_info().name(),
        });
    }

    let style = (!style.trim().is_empty()).then(|| style.to_string());
    if core.style() == style.as_deref() {
        return Ok(());
    }
    core.replace_style(style.clone());
    if !core.is_initialized() {
        return Ok(());
    }

    style::provider().apply_cascading(None, widget, style.as_deref());
    let core = widget.core();
    Notifications::global().emit(&WidgetEvent {
        kind: WidgetEventKind::StyleChanged,
        id: core.id(),
        type_info: core.type_info(),
        style: style.as_deref(),
    });
    Ok(())
}

fn apply_styles(widget: &mut dyn Widget, container: Option<&dyn Widget>) -> WeftResult<()> {
    let core = widget.core();
    if core.is_disposed() {
        return Err(WeftError::ObjectDisposed {
            type_name: core.type_info().name(),
        });
    }
    let style = core.style().map(str::to_owned);
    style::provider().apply_cascading(container, widget, style.as_deref());
    Ok(())
}

/// Lifecycle operations available on every widget.
pub trait WidgetExt: Widget {
    /// Initialize the handler, wire overridden events and apply styles.
    ///
    /// Construction does this automatically unless the widget type opts
    /// out with [`TypeInfo::manual_initialize`]. A second call is ignored
    /// with a warning.
    fn initialize(&mut self) -> WeftResult<()>;

    /// Release the handler. Returns `false` if the widget was already
    /// disposed.
    fn dispose(&mut self) -> bool;

    /// Replace the space-separated style names.
    ///
    /// An initialized widget is restyled immediately and a
    /// [`WidgetEventKind::StyleChanged`] notification is emitted.
    fn set_style(&mut self, style: &str) -> WeftResult<()>;

    /// Run the style cascade again with the current style string.
    fn apply_styles(&mut self, container: Option<&dyn Widget>) -> WeftResult<()>;
}

impl<W: ?Sized + Widget> WidgetExt for W {
    fn initialize(&mut self) -> WeftResult<()> {
        initialize(self.as_widget_mut())
    }

    fn dispose(&mut self) -> bool {
        self.core_mut().dispose()
    }

    fn set_style(&mut self, style: &str) -> WeftResult<()> {
        set_style(self.as_widget_mut(), style)
    }

    fn apply_styles(&mut self, container: Option<&dyn Widget>) -> WeftResult<()> {
        apply_styles(self.as_widget_mut(), container)
    }
}

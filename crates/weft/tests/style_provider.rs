//! Replacing the process-wide style provider.
//!
//! Runs in its own binary since the provider is global.

use std::sync::Arc;

use parking_lot::Mutex;
use weft::style::{provider, reset_provider, set_provider};
use weft::*;
use weft_test_utils::*;

/// Provider that records what it was asked to style.
#[derive(Default)]
struct RecordingProvider {
    applied: Mutex<Vec<(WidgetId, Option<String>, bool)>>,
}

impl StyleProvider for RecordingProvider {
    fn apply_cascading(
        &self,
        container: Option<&dyn Widget>,
        widget: &mut dyn Widget,
        style: Option<&str>,
    ) {
        self.applied.lock().push((
            widget.core().id(),
            style.map(str::to_string),
            container.is_some(),
        ));
    }
}

#[test]
fn test_custom_provider_replaces_engine() {
    let (platform, _log) = mock_platform("mock");
    StyleEngine::global().add::<MockLabel, _>("provider-large", |label| label.font_size = 24.0);

    let recorder = Arc::new(RecordingProvider::default());
    set_provider(recorder.clone());

    let mut label = Label::new_on(&platform).unwrap();
    label.set_style("provider-large").unwrap();
    let container = Button::new_on(&platform).unwrap();
    label.apply_styles(Some(&container)).unwrap();

    // The engine never ran.
    assert_eq!(label.font_size().unwrap(), MockLabel::DEFAULT_FONT_SIZE);

    let id = label.core().id();
    let mine: Vec<_> = recorder
        .applied
        .lock()
        .iter()
        .filter(|(widget, _, _)| *widget == id)
        .map(|(_, style, container)| (style.clone(), *container))
        .collect();
    assert_eq!(
        mine,
        vec![
            (None, false),
            (Some("provider-large".to_string()), false),
            (Some("provider-large".to_string()), true),
        ]
    );

    reset_provider();
    provider().apply_cascading(None, &mut label, Some("provider-large"));
    assert_eq!(label.font_size().unwrap(), 24.0);
}

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use weft_core::alloc::{HashMap, TypeIdMap};
use weft_core::profiling::profile_function;

use super::{StyleKey, StyleProvider, StyleRule, StyleTarget};
use crate::notify::{Notifications, WidgetEvent, WidgetEventKind};
use crate::types::TypeInfo;
use crate::widget::Widget;

/// Which ancestors contribute type-keyed rules to a widget's cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CascadeScope {
    /// From the highest non-framework ancestor down to the concrete type.
    /// Rules keyed by toolkit types never run; a framework widget has an
    /// empty cascade.
    #[default]
    External,
    /// The whole ancestor chain, toolkit root included.
    Full,
}

#[derive(Default)]
struct Rules {
    scope: CascadeScope,
    named: HashMap<Cow<'static, str>, Vec<StyleRule>>,
    typed: TypeIdMap<Vec<StyleRule>>,
    cascade: TypeIdMap<Arc<[StyleRule]>>,
}

impl Rules {
    fn typed(&self, id: TypeId) -> &[StyleRule] {
        self.typed.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    fn cascade(&mut self, ty: &TypeInfo) -> Arc<[StyleRule]> {
        if let Some(cascade) = self.cascade.get(&ty.id()) {
            return cascade.clone();
        }

        let levels: Vec<&TypeInfo> = match self.scope {
            CascadeScope::External => ty.ancestors().take_while(|t| !t.is_framework()).collect(),
            CascadeScope::Full => ty.ancestors().collect(),
        };
        let cascade: Arc<[StyleRule]> = levels
            .iter()
            .rev()
            .flat_map(|level| self.typed(level.id()).iter().cloned())
            .collect();
        self.cascade.insert(ty.id(), cascade.clone());
        cascade
    }
}

/// Default [`StyleProvider`]: named and type-keyed rules with a cached cascade.
///
/// # Ordering
///
/// For a widget of type `B` extending `A` with style `"red big"`, rules run
/// in this order, each list in registration order:
///
/// 1. rules for `A`, then rules for `B` (the cascade; see [`CascadeScope`]
///    for where it starts)
/// 2. rules for the handler's concrete type
/// 3. rules named `red`, then rules named `big`
///
/// Cascade and named rules run against the widget and then against its
/// handler. Rules run without the engine locked, so a rule may add rules;
/// they take effect on the next application.
#[derive(Default)]
pub struct StyleEngine {
    rules: Mutex<Rules>,
}

impl StyleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose cascades cover `scope`.
    pub fn with_scope(scope: CascadeScope) -> Self {
        Self {
            rules: Mutex::new(Rules {
                scope,
                ..Rules::default()
            }),
        }
    }

    pub fn scope(&self) -> CascadeScope {
        self.rules.lock().scope
    }

    /// The engine used when no other provider is installed.
    pub fn global() -> Arc<StyleEngine> {
        static GLOBAL: OnceLock<Arc<StyleEngine>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(StyleEngine::new())).clone()
    }

    /// Add a rule acting on targets of type `T`.
    ///
    /// Widgets are searched through their base chain; handlers must be
    /// exactly `T`. Targets of other types are skipped.
    pub fn add<T, F>(&self, key: impl Into<StyleKey>, action: F)
    where
        T: Any,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.add_rule(
            key,
            Arc::new(move |target: StyleTarget<'_>| {
                if let Some(target) = target.downcast_mut::<T>() {
                    action(target);
                }
            }),
        );
    }

    /// Add a rule that applies to every `T` and subtype of `T`.
    pub fn add_type<T, F>(&self, action: F)
    where
        T: Any,
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.add::<T, F>(StyleKey::of::<T>(), action);
    }

    /// Add a raw rule. Clears the cascade cache.
    pub fn add_rule(&self, key: impl Into<StyleKey>, rule: StyleRule) {
        let key = key.into();
        tracing::trace!("Style rule added for {:?}", key);

        let mut rules = self.rules.lock();
        match key {
            StyleKey::Name(name) => rules.named.entry(name).or_default().push(rule),
            StyleKey::Type(id) => rules.typed.entry(id).or_default().push(rule),
        }
        rules.cascade.clear();
    }

    /// Remove every rule and the cascade cache.
    pub fn clear_rules(&self) {
        let mut rules = self.rules.lock();
        rules.named.clear();
        rules.typed.clear();
        rules.cascade.clear();
    }

    /// Type-keyed rules for `ty` and the bases in scope, superclass first.
    pub fn cascade(&self, ty: &TypeInfo) -> Arc<[StyleRule]> {
        self.rules.lock().cascade(ty)
    }

    /// Number of types with a cached cascade.
    pub fn cached_cascades(&self) -> usize {
        self.rules.lock().cascade.len()
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        let rules = self.rules.lock();
        rules.named.values().map(Vec::len).sum::<usize>()
            + rules.typed.values().map(Vec::len).sum::<usize>()
    }

    fn run_on_pair(rule: &StyleRule, widget: &mut dyn Widget) {
        rule(StyleTarget::Widget(&mut *widget));
        if let Ok(handler) = widget.core_mut().handler_mut() {
            rule(StyleTarget::Handler(handler));
        }
    }
}

impl StyleProvider for StyleEngine {
    fn apply_cascading(
        &self,
        _container: Option<&dyn Widget>,
        widget: &mut dyn Widget,
        style: Option<&str>,
    ) {
        profile_function!();

        let ty = widget.core().type_info();
        let handler_type = widget
            .core()
            .handler()
            .ok()
            .map(|handler| Any::type_id(handler.as_any()));

        let (cascade, handler_rules, named) = {
            let mut rules = self.rules.lock();
            let cascade = rules.cascade(ty);
            let handler_rules: Vec<StyleRule> = handler_type
                .map(|id| rules.typed(id).to_vec())
                .unwrap_or_default();
            let named: Vec<StyleRule> = style
                .unwrap_or_default()
                .split_whitespace()
                .filter_map(|name| rules.named.get(name))
                .flatten()
                .cloned()
                .collect();
            (cascade, handler_rules, named)
        };

        for rule in cascade.iter() {
            Self::run_on_pair(rule, widget);
        }
        if let Ok(handler) = widget.core_mut().handler_mut() {
            for rule in &handler_rules {
                rule(StyleTarget::Handler(&mut *handler));
            }
        }
        for rule in &named {
            Self::run_on_pair(rule, widget);
        }

        let core = widget.core();
        Notifications::global().emit(&WidgetEvent {
            kind: WidgetEventKind::Styled,
            id: core.id(),
            type_info: ty,
            style,
        });
    }
}

impl fmt::Debug for StyleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = self.rules.lock();
        f.debug_struct("StyleEngine")
            .field("named", &rules.named.keys().collect::<Vec<_>>())
            .field("typed", &rules.typed.len())
            .field("scope", &rules.scope)
            .field("cascades", &rules.cascade.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Control;
    struct Panel;
    struct Card;
    struct Other;
    static CONTROL: TypeInfo = TypeInfo::framework::<Control>("Control", "tests");
    static PANEL: TypeInfo = TypeInfo::external::<Panel>("Panel", "tests").extends(&CONTROL);
    static CARD: TypeInfo = TypeInfo::external::<Card>("Card", "tests").extends(&PANEL);
    static OTHER: TypeInfo = TypeInfo::framework::<Other>("Other", "tests");

    fn noop() -> StyleRule {
        Arc::new(|_: StyleTarget<'_>| {})
    }

    #[test]
    fn test_cascade_is_superclass_first() {
        let engine = StyleEngine::new();
        let card_rule = noop();
        let panel_rule = noop();
        engine.add_rule(StyleKey::of::<Card>(), card_rule.clone());
        engine.add_rule(StyleKey::of::<Panel>(), panel_rule.clone());

        let cascade = engine.cascade(&CARD);
        assert_eq!(cascade.len(), 2);
        assert!(Arc::ptr_eq(&cascade[0], &panel_rule));
        assert!(Arc::ptr_eq(&cascade[1], &card_rule));
    }

    #[test]
    fn test_cascade_stops_at_framework_boundary() {
        let engine = StyleEngine::new();
        assert_eq!(engine.scope(), CascadeScope::External);
        engine.add_rule(StyleKey::of::<Control>(), noop());
        engine.add_rule(StyleKey::of::<Panel>(), noop());

        assert_eq!(engine.cascade(&CARD).len(), 1);
        assert!(engine.cascade(&CONTROL).is_empty());
    }

    #[test]
    fn test_full_scope_includes_framework_types() {
        let engine = StyleEngine::with_scope(CascadeScope::Full);
        let control_rule = noop();
        engine.add_rule(StyleKey::of::<Control>(), control_rule.clone());
        engine.add_rule(StyleKey::of::<Panel>(), noop());

        let cascade = engine.cascade(&CARD);
        assert_eq!(cascade.len(), 2);
        assert!(Arc::ptr_eq(&cascade[0], &control_rule));
        assert_eq!(engine.cascade(&CONTROL).len(), 1);
    }

    #[test]
    fn test_empty_cascade_is_cached() {
        let engine = StyleEngine::new();
        assert!(engine.cascade(&OTHER).is_empty());
        assert_eq!(engine.cached_cascades(), 1);
    }

    #[test]
    fn test_adding_a_rule_clears_cascades() {
        let engine = StyleEngine::new();
        engine.cascade(&CARD);
        engine.cascade(&CONTROL);
        assert_eq!(engine.cached_cascades(), 2);

        engine.add_rule("bold", noop());
        assert_eq!(engine.cached_cascades(), 0);
        assert_eq!(engine.rule_count(), 1);
    }

    #[test]
    fn test_clear_rules_matches_fresh_engine() {
        let engine = StyleEngine::with_scope(CascadeScope::Full);
        engine.add_rule(StyleKey::of::<Panel>(), noop());
        engine.cascade(&CARD);

        engine.clear_rules();
        engine.add_rule(StyleKey::of::<Card>(), noop());

        let fresh = StyleEngine::with_scope(CascadeScope::Full);
        fresh.add_rule(StyleKey::of::<Card>(), noop());

        assert_eq!(engine.cascade(&CARD).len(), fresh.cascade(&CARD).len());
        assert_eq!(engine.cascade(&CARD).len(), 1);
        assert_eq!(engine.rule_count(), fresh.rule_count());
        assert_eq!(engine.scope(), CascadeScope::Full);
    }
}

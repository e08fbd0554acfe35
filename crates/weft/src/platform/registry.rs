//! Factory registry keyed by abstract type.
//!
//! The registry maps a [`TypeInfo`]'s `TypeId` to a [`Factory`] for O(1)
//! lookup, plus a cache of resolved [`HandlerInfo`]. Redirects and module
//! auto-loading live in [`Platform::find`](super::Platform::find), which
//! drives this map.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use weft_core::alloc::TypeIdMap;

use crate::error::{BoxError, WeftError, WeftResult};
use crate::handler::Handler;
use crate::types::TypeInfo;

type CreateFn = dyn Fn() -> Result<Box<dyn Any>, BoxError> + Send + Sync;

/// Projection from a factory's type-erased output to `dyn Handler`.
#[derive(Clone, Copy)]
pub(crate) struct HandlerView {
    pub(crate) get: fn(&dyn Any) -> Option<&dyn Handler>,
    pub(crate) get_mut: fn(&mut dyn Any) -> Option<&mut dyn Handler>,
}

impl HandlerView {
    fn of<H: ?Sized + Handler>() -> Self {
        Self {
            get: |instance| instance.downcast_ref::<Box<H>>().map(|h| h.as_handler()),
            get_mut: |instance| {
                instance
                    .downcast_mut::<Box<H>>()
                    .map(|h| h.as_handler_mut())
            },
        }
    }
}

/// A registered constructor for one abstract type.
///
/// The factory's output is stored type-erased as `Box<I>` for the interface
/// type `I` it was registered with. Factories are cheap to clone and compare
/// by identity.
#[derive(Clone)]
pub struct Factory {
    create: Arc<CreateFn>,
    instance_type: &'static str,
    instance_id: TypeId,
    handler: Option<HandlerView>,
}

impl Factory {
    /// Wrap an infallible constructor producing `Box<I>`.
    pub fn new<I, F>(f: F) -> Self
    where
        I: ?Sized + 'static,
        F: Fn() -> Box<I> + Send + Sync + 'static,
    {
        Self::try_new(move || Ok::<_, BoxError>(f()))
    }

    /// Wrap a fallible constructor producing `Box<I>`.
    pub fn try_new<I, E, F>(f: F) -> Self
    where
        I: ?Sized + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<Box<I>, E> + Send + Sync + 'static,
    {
        Self {
            create: Arc::new(move || {
                f().map(|instance| Box::new(instance) as Box<dyn Any>)
                    .map_err(Into::into)
            }),
            instance_type: std::any::type_name::<I>(),
            instance_id: TypeId::of::<Box<I>>(),
            handler: None,
        }
    }

    /// Wrap a constructor for a handler interface `H`.
    ///
    /// Only handler factories can back widgets.
    pub fn handler<H, F>(f: F) -> Self
    where
        H: ?Sized + Handler,
        F: Fn() -> Box<H> + Send + Sync + 'static,
    {
        let mut factory = Self::new(f);
        factory.handler = Some(HandlerView::of::<H>());
        factory
    }

    /// Wrap a fallible constructor for a handler interface `H`.
    pub fn try_handler<H, E, F>(f: F) -> Self
    where
        H: ?Sized + Handler,
        E: Into<BoxError>,
        F: Fn() -> Result<Box<H>, E> + Send + Sync + 'static,
    {
        let mut factory = Self::try_new(f);
        factory.handler = Some(HandlerView::of::<H>());
        factory
    }

    /// Name of the interface type this factory produces.
    pub fn instance_type(&self) -> &'static str {
        self.instance_type
    }

    /// Whether this factory produces handlers.
    pub fn is_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Whether two factories are the same registration.
    pub fn ptr_eq(&self, other: &Factory) -> bool {
        Arc::ptr_eq(&self.create, &other.create)
    }

    /// Run the constructor and downcast its output to `Box<I>`.
    pub fn create<I: ?Sized + 'static>(&self, ty: &TypeInfo) -> WeftResult<Box<I>> {
        if self.instance_id != TypeId::of::<Box<I>>() {
            return Err(WeftError::InstanceMismatch {
                type_name: ty.name(),
                expected: std::any::type_name::<I>(),
                actual: self.instance_type,
            });
        }

        let instance = self.create_erased(ty)?;
        instance
            .downcast::<Box<I>>()
            .map(|boxed| *boxed)
            .map_err(|_| WeftError::InstanceMismatch {
                type_name: ty.name(),
                expected: std::any::type_name::<I>(),
                actual: self.instance_type,
            })
    }

    pub(crate) fn create_erased(&self, ty: &TypeInfo) -> WeftResult<Box<dyn Any>> {
        (self.create)().map_err(|source| WeftError::CreationFailed {
            type_name: ty.name(),
            source,
        })
    }

    pub(crate) fn handler_view(&self) -> Option<HandlerView> {
        self.handler
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("instance_type", &self.instance_type)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Resolved construction info for a widget type.
///
/// Immutable once cached; any registration clears the cache.
#[derive(Debug, Clone)]
pub struct HandlerInfo {
    /// Factory that creates the handler.
    pub factory: Factory,
    /// Whether construction initializes the widget automatically.
    pub auto_initialize: bool,
}

struct Registration {
    factory: Factory,
    type_name: &'static str,
}

/// Instantiator map and handler-info cache.
///
/// Every insert bumps `generation`. A resolution that started before an
/// insert must not cache its result, so callers pass the generation they
/// observed before resolving to [`HandlerRegistry::cache_info`].
#[derive(Default)]
pub(crate) struct HandlerRegistry {
    instantiators: RwLock<TypeIdMap<Registration>>,
    handler_infos: RwLock<TypeIdMap<HandlerInfo>>,
    generation: AtomicU64,
}

impl HandlerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a factory, returning the factory it replaced.
    pub(crate) fn insert(&self, ty: &TypeInfo, factory: Factory) -> Option<Factory> {
        let previous = self.instantiators.write().insert(
            ty.id(),
            Registration {
                factory,
                type_name: ty.name(),
            },
        );
        // Cached infos may point at the replaced factory, directly or through a redirect.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.handler_infos.write().clear();
        previous.map(|r| r.factory)
    }

    pub(crate) fn get(&self, ty: &TypeInfo) -> Option<Factory> {
        self.instantiators
            .read()
            .get(&ty.id())
            .map(|r| r.factory.clone())
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn cached_info(&self, ty: &TypeInfo) -> Option<HandlerInfo> {
        self.handler_infos.read().get(&ty.id()).cloned()
    }

    /// Cache `info` unless a registration happened since `generation`.
    pub(crate) fn cache_info(
        &self,
        ty: &TypeInfo,
        info: HandlerInfo,
        generation: u64,
    ) -> HandlerInfo {
        let mut infos = self.handler_infos.write();
        if self.generation() != generation {
            tracing::trace!("Registry changed while resolving {}; not caching", ty.name());
            return info;
        }
        infos.entry(ty.id()).or_insert(info).clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.instantiators.read().len()
    }

    pub(crate) fn type_names(&self) -> Vec<&'static str> {
        self.instantiators
            .read()
            .values()
            .map(|r| r.type_name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send {
        fn greet(&self) -> String;
    }

    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    struct GreeterKey;
    static GREETER: TypeInfo = TypeInfo::framework::<GreeterKey>("Greeter", "tests");

    #[test]
    fn test_factory_creates_requested_interface() {
        let factory = Factory::new(|| Box::new(English) as Box<dyn Greeter>);
        let greeter = factory.create::<dyn Greeter>(&GREETER).unwrap();
        assert_eq!(greeter.greet(), "hello");
        assert!(!factory.is_handler());
    }

    #[test]
    fn test_factory_rejects_wrong_interface() {
        let factory = Factory::new(|| Box::new(English) as Box<dyn Greeter>);
        let err = factory.create::<English>(&GREETER).err().unwrap();
        assert!(matches!(err, WeftError::InstanceMismatch { .. }));
    }

    #[test]
    fn test_fallible_factory_wraps_cause() {
        let factory = Factory::try_new(|| Err::<Box<dyn Greeter>, _>("no display"));
        match factory.create::<dyn Greeter>(&GREETER) {
            Err(WeftError::CreationFailed { type_name, source }) => {
                assert_eq!(type_name, "Greeter");
                assert_eq!(source.to_string(), "no display");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_registry_last_registration_wins() {
        let registry = HandlerRegistry::new();
        let first = Factory::new(|| Box::new(1u32));
        let second = Factory::new(|| Box::new(2u32));

        assert!(registry.insert(&GREETER, first.clone()).is_none());
        let replaced = registry.insert(&GREETER, second.clone()).unwrap();

        assert!(replaced.ptr_eq(&first));
        assert!(registry.get(&GREETER).unwrap().ptr_eq(&second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_info_resolved_before_registration_is_not_cached() {
        let registry = HandlerRegistry::new();
        let stale = Factory::new(|| Box::new(1u32));
        registry.insert(&GREETER, stale.clone());

        let observed = registry.generation();
        // Another thread registers while the first resolution is in flight.
        registry.insert(&GREETER, Factory::new(|| Box::new(2u32)));

        let info = HandlerInfo {
            factory: stale.clone(),
            auto_initialize: true,
        };
        let returned = registry.cache_info(&GREETER, info, observed);

        assert!(returned.factory.ptr_eq(&stale));
        assert!(registry.cached_info(&GREETER).is_none());
    }

    #[test]
    fn test_info_is_cached_when_registry_unchanged() {
        let registry = HandlerRegistry::new();
        let factory = Factory::new(|| Box::new(1u32));
        registry.insert(&GREETER, factory.clone());

        let observed = registry.generation();
        registry.cache_info(
            &GREETER,
            HandlerInfo {
                factory: factory.clone(),
                auto_initialize: false,
            },
            observed,
        );

        let cached = registry.cached_info(&GREETER).unwrap();
        assert!(cached.factory.ptr_eq(&factory));
        assert!(!cached.auto_initialize);
    }

    #[test]
    fn test_registration_clears_info_cache() {
        let registry = HandlerRegistry::new();
        let factory = Factory::new(|| Box::new(1u32));
        registry.cache_info(
            &GREETER,
            HandlerInfo {
                factory: factory.clone(),
                auto_initialize: true,
            },
            registry.generation(),
        );
        assert!(registry.cached_info(&GREETER).is_some());

        registry.insert(&GREETER, factory);
        assert!(registry.cached_info(&GREETER).is_none());
    }
}

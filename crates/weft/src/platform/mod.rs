//! Platform instances: handler registry, shared instances and properties.
//!
//! A [`Platform`] is one backend (GTK, Win32, a test double, ...). It owns
//! the factories registered for that backend and resolves abstract types to
//! them. One platform is the process-wide default; others can be activated
//! per thread with [`Platform::context`], so one process can drive several
//! backends at once.
//!
//! # Example
//!
//! ```
//! use weft::{Platform, TypeInfo};
//!
//! trait Clipboard: Send + Sync {
//!     fn text(&self) -> String;
//! }
//!
//! struct MemoryClipboard;
//! impl Clipboard for MemoryClipboard {
//!     fn text(&self) -> String {
//!         "copied".to_string()
//!     }
//! }
//!
//! static CLIPBOARD: TypeInfo = TypeInfo::framework::<dyn Clipboard>("Clipboard", "weft.forms");
//!
//! let platform = Platform::builder("memory").build();
//! platform.register(&CLIPBOARD, || Box::new(MemoryClipboard) as Box<dyn Clipboard>);
//!
//! let a = platform.create_shared::<dyn Clipboard>(&CLIPBOARD).unwrap();
//! let b = platform.create_shared::<dyn Clipboard>(&CLIPBOARD).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! assert_eq!(a.text(), "copied");
//! ```

mod builder;
mod config;
mod context;
pub(crate) mod registry;
mod shared;

pub use builder::PlatformBuilder;
pub use config::{PlatformConfig, PlatformFeatures};
pub use context::PlatformContext;
pub use registry::{Factory, HandlerInfo};

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use weft_core::alloc::HashSet;
use weft_core::profiling::profile_function;

use crate::error::{BoxError, WeftError, WeftResult};
use crate::extension::ExtensionCatalog;
use crate::handler::Handler;
use crate::properties::Properties;
use crate::types::TypeInfo;
use registry::HandlerRegistry;
use shared::SharedInstances;

/// One platform backend.
///
/// Platforms are created with [`PlatformBuilder`] and shared as
/// `Arc<Platform>`. All methods take `&self`; internal maps are locked.
pub struct Platform {
    id: String,
    features: PlatformFeatures,
    config: PlatformConfig,
    registry: HandlerRegistry,
    shared: SharedInstances,
    catalog: Arc<ExtensionCatalog>,
    /// Modules whose descriptors have been applied.
    pub(crate) loaded_modules: Mutex<HashSet<String>>,
    /// Owning modules for which companion loading was attempted.
    pub(crate) auto_loaded: Mutex<HashSet<&'static str>>,
    properties: Mutex<Properties>,
}

impl Platform {
    /// Start building a platform with the given id.
    pub fn builder(id: impl Into<String>) -> PlatformBuilder {
        PlatformBuilder::new(id)
    }

    pub(crate) fn from_parts(
        id: String,
        features: PlatformFeatures,
        config: PlatformConfig,
        catalog: Arc<ExtensionCatalog>,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            features,
            config,
            registry: HandlerRegistry::new(),
            shared: SharedInstances::new(),
            catalog,
            loaded_modules: Mutex::new(HashSet::new()),
            auto_loaded: Mutex::new(HashSet::new()),
            properties: Mutex::new(properties),
        }
    }

    /// The platform id, used for companion module names and extension filters.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Capabilities advertised by this backend.
    pub fn features(&self) -> PlatformFeatures {
        self.features
    }

    /// Whether the backend runs on a desktop operating system.
    pub fn is_desktop(&self) -> bool {
        self.features.contains(PlatformFeatures::DESKTOP)
    }

    /// Whether the backend runs on a mobile device.
    pub fn is_mobile(&self) -> bool {
        self.features.contains(PlatformFeatures::MOBILE)
    }

    /// The platform configuration.
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// The catalog companion modules are loaded from.
    pub fn catalog(&self) -> &Arc<ExtensionCatalog> {
        &self.catalog
    }

    /// Lock the platform property bag.
    pub fn properties(&self) -> MutexGuard<'_, Properties> {
        self.properties.lock()
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a factory for `ty`, replacing any previous one.
    pub fn register_factory(&self, ty: &TypeInfo, factory: Factory) {
        tracing::debug!(
            "Platform '{}': registered {} for {}",
            self.id,
            factory.instance_type(),
            ty.name()
        );
        let previous = self.registry.insert(ty, factory);
        if previous.is_some() && self.config.warn_on_overwrite {
            tracing::warn!(
                "Platform '{}': factory for {} was replaced by a later registration",
                self.id,
                ty.name()
            );
        }
    }

    /// Register a factory only if `filter` is unset or names this platform.
    ///
    /// Returns whether the factory was registered.
    pub fn register_filtered(&self, filter: Option<&str>, ty: &TypeInfo, factory: Factory) -> bool {
        if filter.is_some_and(|id| id != self.id) {
            return false;
        }
        self.register_factory(ty, factory);
        true
    }

    /// Register an infallible factory producing `Box<I>`.
    pub fn register<I, F>(&self, ty: &TypeInfo, f: F)
    where
        I: ?Sized + 'static,
        F: Fn() -> Box<I> + Send + Sync + 'static,
    {
        self.register_factory(ty, Factory::new(f));
    }

    /// Register a fallible factory producing `Box<I>`.
    pub fn try_register<I, E, F>(&self, ty: &TypeInfo, f: F)
    where
        I: ?Sized + 'static,
        E: Into<BoxError>,
        F: Fn() -> Result<Box<I>, E> + Send + Sync + 'static,
    {
        self.register_factory(ty, Factory::try_new(f));
    }

    /// Register a handler factory for a widget type or handler interface.
    pub fn register_handler<H, F>(&self, ty: &TypeInfo, f: F)
    where
        H: ?Sized + Handler,
        F: Fn() -> Box<H> + Send + Sync + 'static,
    {
        self.register_factory(ty, Factory::handler(f));
    }

    /// Names of all types with a registered factory.
    pub fn registered_types(&self) -> Vec<&'static str> {
        self.registry.type_names()
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Find the factory for `ty`.
    ///
    /// Tries, in order: a factory registered for `ty`; a factory registered
    /// for the type's preferred handler interface; loading the owning
    /// modules and their companions from the catalog (once per module), then
    /// starting over.
    pub fn find(&self, ty: &TypeInfo) -> WeftResult<Factory> {
        profile_function!();
        loop {
            if let Some(factory) = self.registry.get(ty) {
                return Ok(factory);
            }

            if let Some(handler) = ty.preferred_handler()
                && let Some(factory) = self.registry.get(handler)
            {
                tracing::debug!(
                    "Platform '{}': {} resolved through preferred handler {}",
                    self.id,
                    ty.name(),
                    handler.name()
                );
                return Ok(factory);
            }

            if !self.auto_load(ty) {
                return Err(WeftError::HandlerNotFound {
                    type_name: ty.name(),
                });
            }
        }
    }

    /// Resolve construction info for a widget type.
    ///
    /// Cached per type until the next registration.
    pub fn find_handler(&self, ty: &TypeInfo) -> WeftResult<HandlerInfo> {
        if let Some(info) = self.registry.cached_info(ty) {
            return Ok(info);
        }

        let generation = self.registry.generation();
        let factory = self.find(ty)?;
        if !factory.is_handler() {
            return Err(WeftError::NotAHandler {
                type_name: ty.name(),
            });
        }

        Ok(self.registry.cache_info(
            ty,
            HandlerInfo {
                factory,
                auto_initialize: ty.initializes_automatically(),
            },
            generation,
        ))
    }

    /// Whether a factory can be found for `ty`.
    pub fn supports(&self, ty: &TypeInfo) -> bool {
        self.find(ty).is_ok()
    }

    /// Create a new instance of `ty` as `Box<I>`.
    pub fn create<I: ?Sized + 'static>(&self, ty: &TypeInfo) -> WeftResult<Box<I>> {
        self.find(ty)?.create::<I>(ty)
    }

    /// Get the shared instance of `ty`, creating it on first use.
    ///
    /// Once created, the instance is never replaced, even if a different
    /// factory is registered later.
    pub fn create_shared<I>(&self, ty: &TypeInfo) -> WeftResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.shared.get_or_create(ty, || self.create::<I>(ty))
    }

    /// Whether the shared instance of `ty` has been created.
    pub fn has_shared(&self, ty: &TypeInfo) -> bool {
        self.shared.contains(ty)
    }

    /// Number of shared instances created so far.
    pub fn shared_count(&self) -> usize {
        self.shared.len()
    }

    /// Mark the modules owning `ty` (and its preferred handler) as attempted
    /// and load them plus their companions. Returns `false` if nothing new
    /// was attempted.
    fn auto_load(&self, ty: &TypeInfo) -> bool {
        if !self.config.auto_load_modules {
            return false;
        }

        let owners = std::iter::once(ty.module()).chain(ty.preferred_handler().map(|h| h.module()));
        let mut attempted = false;
        for owner in owners {
            if !self.auto_loaded.lock().insert(owner) {
                continue;
            }
            attempted = true;
            tracing::debug!(
                "Platform '{}': auto-loading module '{}' for {}",
                self.id,
                owner,
                ty.name()
            );
            self.load_module_quietly(owner);
            self.load_module_quietly(&format!("{}.{}", owner, self.id));
        }
        attempted
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("id", &self.id)
            .field("features", &self.features)
            .field("registered", &self.registry.len())
            .field("shared", &self.shared.len())
            .finish()
    }
}

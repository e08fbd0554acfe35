//! Extension modules.
//!
//! Backends ship their factories as extensions bundled into named
//! [`ExtensionModule`]s. Modules are listed in an [`ExtensionCatalog`];
//! a platform loads a module from its catalog either explicitly with
//! [`Platform::load_module`] or on demand when [`Platform::find`] misses.
//! A module `weft.forms` is typically split into a platform-neutral part
//! (`weft.forms`) and one companion per backend (`weft.forms.gtk`).

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use weft_core::alloc::HashMap;

use crate::error::{WeftError, WeftResult};
use crate::handler::Handler;
use crate::platform::{Factory, Platform};
use crate::types::TypeInfo;

/// A self-registering unit applied to a platform.
///
/// # Example
///
/// ```
/// use weft::{Extension, Platform};
///
/// struct Theme;
///
/// impl Extension for Theme {
///     fn register(&self, platform: &Platform) {
///         platform.properties().insert(String::from("dark"));
///     }
/// }
///
/// let platform = Platform::builder("gtk").add_extension(Theme).build();
/// assert!(platform.properties().contains::<String>());
/// ```
pub trait Extension: Send + Sync + 'static {
    /// Name used in log output.
    ///
    /// By default, this uses the type name.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Platform id this extension is restricted to, if any.
    fn platform(&self) -> Option<&str> {
        None
    }

    /// Register factories or properties on `platform`.
    fn register(&self, platform: &Platform);
}

/// A closure-based extension.
pub struct FnExtension<F>
where
    F: Fn(&Platform) + Send + Sync + 'static,
{
    name: &'static str,
    platform: Option<String>,
    register_fn: F,
}

impl<F> FnExtension<F>
where
    F: Fn(&Platform) + Send + Sync + 'static,
{
    /// Create a new closure-based extension.
    pub fn new(name: &'static str, register_fn: F) -> Self {
        Self {
            name,
            platform: None,
            register_fn,
        }
    }

    /// Restrict the extension to the platform with the given id.
    pub fn for_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

impl<F> Extension for FnExtension<F>
where
    F: Fn(&Platform) + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    fn register(&self, platform: &Platform) {
        (self.register_fn)(platform);
    }
}

/// Registers one factory for one type.
pub struct FactoryExport {
    ty: &'static TypeInfo,
    factory: Factory,
    platform: Option<String>,
}

impl FactoryExport {
    /// Export `factory` for `ty` on every platform.
    pub fn new(ty: &'static TypeInfo, factory: Factory) -> Self {
        Self {
            ty,
            factory,
            platform: None,
        }
    }

    /// Restrict the export to the platform with the given id.
    pub fn for_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

impl Extension for FactoryExport {
    fn name(&self) -> &'static str {
        self.ty.name()
    }

    fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    fn register(&self, platform: &Platform) {
        platform.register_factory(self.ty, self.factory.clone());
    }
}

/// A named bundle of extensions.
#[derive(Clone)]
pub struct ExtensionModule {
    name: String,
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionModule {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Vec::new(),
        }
    }

    /// The module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extensions in the order they were added.
    pub fn extensions(&self) -> &[Arc<dyn Extension>] {
        &self.extensions
    }

    /// Add an extension.
    pub fn with(mut self, extension: impl Extension) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Add a closure-based extension.
    pub fn with_fn<F>(self, name: &'static str, register_fn: F) -> Self
    where
        F: Fn(&Platform) + Send + Sync + 'static,
    {
        self.with(FnExtension::new(name, register_fn))
    }

    /// Export a factory for `ty`.
    pub fn factory(self, ty: &'static TypeInfo, factory: Factory) -> Self {
        self.with(FactoryExport::new(ty, factory))
    }

    /// Export a handler factory for `ty` on every platform.
    pub fn handler<H, F>(self, ty: &'static TypeInfo, f: F) -> Self
    where
        H: ?Sized + Handler,
        F: Fn() -> Box<H> + Send + Sync + 'static,
    {
        self.factory(ty, Factory::handler(f))
    }

    /// Export a handler factory for `ty` on the platform with id `platform` only.
    pub fn handler_for<H, F>(self, platform: &str, ty: &'static TypeInfo, f: F) -> Self
    where
        H: ?Sized + Handler,
        F: Fn() -> Box<H> + Send + Sync + 'static,
    {
        self.with(FactoryExport::new(ty, Factory::handler(f)).for_platform(platform))
    }
}

impl fmt::Debug for ExtensionModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionModule")
            .field("name", &self.name)
            .field(
                "extensions",
                &self.extensions.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The set of modules available for loading.
#[derive(Default)]
pub struct ExtensionCatalog {
    modules: RwLock<HashMap<String, Arc<ExtensionModule>>>,
}

impl ExtensionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide catalog platforms use unless given another.
    pub fn global() -> Arc<ExtensionCatalog> {
        static GLOBAL: OnceLock<Arc<ExtensionCatalog>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ExtensionCatalog::new())).clone()
    }

    /// Add a module, returning the module it replaced.
    pub fn add(&self, module: ExtensionModule) -> Option<Arc<ExtensionModule>> {
        tracing::debug!(
            "Catalog: added module '{}' ({} extensions)",
            module.name,
            module.extensions.len()
        );
        self.modules
            .write()
            .insert(module.name.clone(), Arc::new(module))
    }

    /// Look up a module by name.
    pub fn get(&self, name: &str) -> Option<Arc<ExtensionModule>> {
        self.modules.read().get(name).cloned()
    }

    /// Whether a module with this name is listed.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Remove a module. Platforms that already loaded it keep its registrations.
    pub fn remove(&self, name: &str) -> Option<Arc<ExtensionModule>> {
        self.modules.write().remove(name)
    }

    /// Names of all listed modules, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.modules.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ExtensionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionCatalog")
            .field("modules", &self.names())
            .finish()
    }
}

impl Platform {
    /// Load a module from this platform's catalog.
    ///
    /// Returns the number of extensions applied; `0` if the module was
    /// already loaded on this platform.
    pub fn load_module(&self, name: &str) -> WeftResult<usize> {
        if self.is_module_loaded(name) {
            return Ok(0);
        }
        let module = self
            .catalog()
            .get(name)
            .ok_or_else(|| WeftError::ModuleNotFound {
                name: name.to_string(),
            })?;
        Ok(self.apply_module(&module))
    }

    /// Apply every extension of `module` whose platform filter matches.
    ///
    /// A module is applied at most once per platform.
    pub fn apply_module(&self, module: &ExtensionModule) -> usize {
        if !self.loaded_modules.lock().insert(module.name.clone()) {
            return 0;
        }

        let applied = module
            .extensions
            .iter()
            .filter(|extension| self.apply_extension(extension.as_ref()))
            .count();

        tracing::debug!(
            "Platform '{}': loaded module '{}' ({} of {} extensions applied)",
            self.id(),
            module.name,
            applied,
            module.extensions.len()
        );
        applied
    }

    /// Apply one extension if its platform filter is unset or names this platform.
    pub fn apply_extension(&self, extension: &dyn Extension) -> bool {
        if extension.platform().is_some_and(|id| id != self.id()) {
            tracing::trace!(
                "Platform '{}': skipped extension {} (filtered)",
                self.id(),
                extension.name()
            );
            return false;
        }
        extension.register(self);
        true
    }

    /// Whether `name` has been applied to this platform.
    pub fn is_module_loaded(&self, name: &str) -> bool {
        self.loaded_modules.lock().contains(name)
    }

    /// Names of the modules applied to this platform, sorted.
    pub fn loaded_modules(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loaded_modules.lock().iter().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn load_module_quietly(&self, name: &str) {
        match self.load_module(name) {
            Ok(_) => {}
            Err(WeftError::ModuleNotFound { name }) => {
                tracing::debug!("Platform '{}': no module '{}' to load", self.id(), name);
            }
            Err(err) => {
                tracing::warn!("Platform '{}': failed to load '{}': {}", self.id(), name, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait ClipboardHandler: Handler {}
    struct GtkClipboard;
    impl Handler for GtkClipboard {}
    impl ClipboardHandler for GtkClipboard {}

    struct Clipboard;
    static CLIPBOARD: TypeInfo = TypeInfo::framework::<Clipboard>("Clipboard", "tests.ext");

    fn platform_with(catalog: Arc<ExtensionCatalog>, id: &str) -> Arc<Platform> {
        Platform::builder(id).catalog(catalog).build()
    }

    #[test]
    fn test_load_module_applies_matching_extensions() {
        let catalog = Arc::new(ExtensionCatalog::new());
        catalog.add(
            ExtensionModule::new("tests.ext")
                .handler_for("gtk", &CLIPBOARD, || {
                    Box::new(GtkClipboard) as Box<dyn ClipboardHandler>
                })
                .with_fn("mac-theme", |p| {
                    p.properties().insert(7u32);
                }),
        );
        let gtk = platform_with(catalog.clone(), "gtk");
        let mac = platform_with(catalog, "mac");

        assert_eq!(gtk.load_module("tests.ext").unwrap(), 2);
        assert!(gtk.supports(&CLIPBOARD));
        assert_eq!(mac.load_module("tests.ext").unwrap(), 1);
        assert!(mac.registered_types().is_empty());
    }

    #[test]
    fn test_module_loaded_once() {
        let catalog = Arc::new(ExtensionCatalog::new());
        catalog.add(ExtensionModule::new("once").with_fn("count", |p| {
            *p.properties().get_or_default::<u32>() += 1;
        }));
        let platform = platform_with(catalog, "gtk");

        assert_eq!(platform.load_module("once").unwrap(), 1);
        assert_eq!(platform.load_module("once").unwrap(), 0);
        assert_eq!(platform.properties().get::<u32>(), Some(&1));
        assert_eq!(platform.loaded_modules(), vec!["once".to_string()]);
    }

    #[test]
    fn test_missing_module() {
        let platform = platform_with(Arc::new(ExtensionCatalog::new()), "gtk");
        let err = platform.load_module("nope").unwrap_err();
        assert!(matches!(err, WeftError::ModuleNotFound { ref name } if name == "nope"));
        assert!(!platform.is_module_loaded("nope"));
    }

    #[test]
    fn test_catalog_add_replaces() {
        let catalog = ExtensionCatalog::new();
        assert!(catalog.add(ExtensionModule::new("a")).is_none());
        let replaced = catalog.add(ExtensionModule::new("a").with_fn("x", |_| {}));
        assert!(replaced.is_some_and(|m| m.extensions().is_empty()));
        assert_eq!(catalog.names(), vec!["a".to_string()]);
        assert!(catalog.remove("a").is_some());
        assert!(!catalog.contains("a"));
    }

    #[test]
    fn test_default_extension_name() {
        struct Named;
        impl Extension for Named {
            fn register(&self, _platform: &Platform) {}
        }
        assert!(Named.name().ends_with("Named"));
    }
}

use std::sync::Arc;

use super::{Platform, PlatformConfig, PlatformFeatures};
use crate::extension::{Extension, ExtensionCatalog, ExtensionModule};
use crate::properties::{Properties, Property};

/// Builder for constructing a [`Platform`] with its extensions.
///
/// # Example
///
/// ```
/// use weft::{FnExtension, Platform, PlatformFeatures};
///
/// let platform = Platform::builder("gtk")
///     .features(PlatformFeatures::DESKTOP)
///     .add_extension(FnExtension::new("app-name", |platform| {
///         platform.properties().insert("Demo".to_string());
///     }))
///     .build();
///
/// assert_eq!(platform.id(), "gtk");
/// assert_eq!(platform.properties().get::<String>().map(String::as_str), Some("Demo"));
/// ```
pub struct PlatformBuilder {
    id: String,
    features: PlatformFeatures,
    config: PlatformConfig,
    catalog: Option<Arc<ExtensionCatalog>>,
    extensions: Vec<Box<dyn Extension>>,
    modules: Vec<ExtensionModule>,
    properties: Properties,
}

impl PlatformBuilder {
    /// Create a builder for a platform with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            features: PlatformFeatures::empty(),
            config: PlatformConfig::default(),
            catalog: None,
            extensions: Vec::new(),
            modules: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// Set the advertised capabilities.
    pub fn features(mut self, features: PlatformFeatures) -> Self {
        self.features = features;
        self
    }

    /// Replace the configuration.
    pub fn config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    /// Load companion modules from `catalog` instead of the global catalog.
    pub fn catalog(mut self, catalog: Arc<ExtensionCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Add an extension to run at build time.
    ///
    /// Extensions whose platform filter names a different platform are skipped.
    pub fn add_extension(mut self, extension: impl Extension) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Apply a whole module at build time.
    pub fn add_module(mut self, module: ExtensionModule) -> Self {
        self.modules.push(module);
        self
    }

    /// Insert a property before any extension runs.
    pub fn insert_property<P: Property>(mut self, value: P) -> Self {
        self.properties.insert(value);
        self
    }

    /// Build the platform, running extensions in the order they were added.
    pub fn build(self) -> Arc<Platform> {
        let catalog = self.catalog.unwrap_or_else(ExtensionCatalog::global);
        let platform = Arc::new(Platform::from_parts(
            self.id,
            self.features,
            self.config,
            catalog,
            self.properties,
        ));

        let mut applied = 0;
        for extension in &self.extensions {
            if platform.apply_extension(extension.as_ref()) {
                applied += 1;
            }
        }
        for module in &self.modules {
            applied += platform.apply_module(module);
        }

        tracing::info!(
            "Platform '{}' built with {} extensions, {} registered types",
            platform.id(),
            applied,
            platform.registered_types().len()
        );

        platform
    }
}

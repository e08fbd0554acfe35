use bitflags::bitflags;

/// Configuration for a [`Platform`](super::Platform).
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Load a type's module and its `<module>.<platform id>` companion from
    /// the extension catalog when no factory is registered.
    pub auto_load_modules: bool,
    /// Log a warning when a registration replaces an existing factory.
    pub warn_on_overwrite: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            auto_load_modules: true,
            warn_on_overwrite: true,
        }
    }
}

bitflags! {
    /// Broad capabilities a backend advertises.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlatformFeatures: u32 {
        /// Runs on a desktop operating system.
        const DESKTOP = 1 << 0;
        /// Runs on a phone or tablet.
        const MOBILE = 1 << 1;
        /// Runs inside a browser.
        const WEB = 1 << 2;
        /// Can show more than one top-level window.
        const MULTI_WINDOW = 1 << 3;
    }
}

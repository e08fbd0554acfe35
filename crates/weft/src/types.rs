//! Static type descriptors.
//!
//! Rust has no class inheritance, so widget and handler interface types
//! describe their place in the hierarchy with a [`TypeInfo`] declared as a
//! `static`. Handler resolution, event hookup and the style cascade all walk
//! these descriptors.
//!
//! # Example
//!
//! ```
//! use weft::TypeInfo;
//!
//! struct Control;
//! struct Button;
//! struct FancyButton;
//!
//! static CONTROL: TypeInfo = TypeInfo::framework::<Control>("Control", "weft.forms");
//! static BUTTON: TypeInfo =
//!     TypeInfo::framework::<Button>("Button", "weft.forms").extends(&CONTROL);
//! static FANCY: TypeInfo = TypeInfo::external::<FancyButton>("FancyButton", "my_app")
//!     .extends(&BUTTON)
//!     .overrides(&["on_click"]);
//!
//! assert!(FANCY.is_subclass_of(&CONTROL));
//! assert_eq!(FANCY.framework_boundary().map(|t| t.name()), Some("Button"));
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Whether a type belongs to the toolkit itself or to user code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Defined by the toolkit. Framework types bound the override search.
    Framework,
    /// Defined outside the toolkit (application or third-party code).
    External,
}

/// Descriptor of an abstract component or handler interface type.
///
/// Identity is the Rust [`TypeId`]; two descriptors for the same Rust type
/// compare equal.
pub struct TypeInfo {
    name: &'static str,
    id: fn() -> TypeId,
    module: &'static str,
    origin: Origin,
    base: Option<&'static TypeInfo>,
    handler: Option<&'static TypeInfo>,
    hooks: &'static [&'static str],
    auto_initialize: Option<bool>,
}

impl TypeInfo {
    const fn new<T: ?Sized + 'static>(name: &'static str, module: &'static str, origin: Origin) -> Self {
        Self {
            name,
            id: TypeId::of::<T>,
            module,
            origin,
            base: None,
            handler: None,
            hooks: &[],
            auto_initialize: None,
        }
    }

    /// Describe a toolkit-defined type `T` owned by `module`.
    pub const fn framework<T: ?Sized + 'static>(name: &'static str, module: &'static str) -> Self {
        Self::new::<T>(name, module, Origin::Framework)
    }

    /// Describe a user-defined type `T` owned by `module`.
    pub const fn external<T: ?Sized + 'static>(name: &'static str, module: &'static str) -> Self {
        Self::new::<T>(name, module, Origin::External)
    }

    /// Set the base type.
    pub const fn extends(mut self, base: &'static TypeInfo) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare the handler interface to fall back to when no factory is
    /// registered for this type directly.
    pub const fn with_handler(mut self, handler: &'static TypeInfo) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Declare the framework hooks this type overrides.
    pub const fn overrides(mut self, hooks: &'static [&'static str]) -> Self {
        self.hooks = hooks;
        self
    }

    /// Require callers to initialize widgets of this type explicitly.
    ///
    /// Subtypes inherit this unless they declare otherwise.
    pub const fn manual_initialize(mut self) -> Self {
        self.auto_initialize = Some(false);
        self
    }

    /// Initialize widgets of this type during construction (the default).
    pub const fn auto_initialize(mut self) -> Self {
        self.auto_initialize = Some(true);
        self
    }

    /// The type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The Rust type identity.
    pub fn id(&self) -> TypeId {
        (self.id)()
    }

    /// The name of the module that owns this type.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Where the type is defined.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether the type is defined by the toolkit.
    pub fn is_framework(&self) -> bool {
        self.origin == Origin::Framework
    }

    /// The direct base type.
    pub fn base(&self) -> Option<&'static TypeInfo> {
        self.base
    }

    /// The declared preferred handler interface, searching base types.
    pub fn preferred_handler(&self) -> Option<&'static TypeInfo> {
        self.ancestors().find_map(|ty| ty.handler)
    }

    /// Hooks overridden by this type itself (not its bases).
    pub fn hooks(&self) -> &'static [&'static str] {
        self.hooks
    }

    /// Whether construction initializes widgets of this type automatically.
    ///
    /// The nearest declaration in the ancestor chain wins; defaults to `true`.
    pub fn initializes_automatically(&self) -> bool {
        self.ancestors()
            .find_map(|ty| ty.auto_initialize)
            .unwrap_or(true)
    }

    /// Iterate this type followed by its base types, most-derived first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether `other` is this type or one of its bases.
    pub fn is_subclass_of(&self, other: &TypeInfo) -> bool {
        let other_id = other.id();
        self.ancestors().any(|ty| ty.id() == other_id)
    }

    /// The most-derived framework type in the ancestor chain.
    pub fn framework_boundary(&self) -> Option<&TypeInfo> {
        self.ancestors().find(|ty| ty.is_framework())
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("origin", &self.origin)
            .field("base", &self.base.map(|b| b.name))
            .finish()
    }
}

/// Iterator over a type and its bases.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a TypeInfo>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base;
        Some(current)
    }
}

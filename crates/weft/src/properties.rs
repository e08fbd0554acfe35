//! Per-platform property bag.
//!
//! Backends and extensions stash platform-wide state here (theme data,
//! native application objects, counters) without the core knowing the
//! concrete types. Each Rust type has at most one entry.

use std::any::{Any, TypeId};
use weft_core::alloc::TypeIdMap;

/// Marker trait for types that can live in a [`Properties`] bag.
///
/// Platforms are shared between threads, so values must be `Send + Sync`.
pub trait Property: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Property for T {}

struct PropertyEntry {
    data: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Container of platform properties keyed by type.
///
/// # Example
///
/// ```
/// use weft::Properties;
///
/// struct AccentColor(u32);
///
/// let mut props = Properties::new();
/// props.insert(AccentColor(0x3c78c8));
/// assert_eq!(props.get::<AccentColor>().map(|c| c.0), Some(0x3c78c8));
/// ```
#[derive(Default)]
pub struct Properties {
    storage: TypeIdMap<PropertyEntry>,
}

impl Properties {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self {
            storage: TypeIdMap::default(),
        }
    }

    /// Insert a value, returning the previous value of the same type.
    pub fn insert<P: Property>(&mut self, value: P) -> Option<P> {
        let entry = PropertyEntry {
            data: Box::new(value),
            type_name: std::any::type_name::<P>(),
        };

        self.storage
            .insert(TypeId::of::<P>(), entry)
            .and_then(|old| old.data.downcast::<P>().ok().map(|b| *b))
    }

    /// Get a value by type.
    pub fn get<P: Property>(&self) -> Option<&P> {
        self.storage
            .get(&TypeId::of::<P>())
            .and_then(|entry| entry.data.downcast_ref())
    }

    /// Get a mutable value by type.
    pub fn get_mut<P: Property>(&mut self) -> Option<&mut P> {
        self.storage
            .get_mut(&TypeId::of::<P>())
            .and_then(|entry| entry.data.downcast_mut())
    }

    /// Remove a value and return it.
    pub fn remove<P: Property>(&mut self) -> Option<P> {
        self.storage
            .remove(&TypeId::of::<P>())
            .and_then(|entry| entry.data.downcast::<P>().ok().map(|b| *b))
    }

    /// Whether a value of type `P` is present.
    pub fn contains<P: Property>(&self) -> bool {
        self.storage.contains_key(&TypeId::of::<P>())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the value of type `P`, inserting `f()` first if it is missing.
    pub fn get_or_insert_with<P: Property>(&mut self, f: impl FnOnce() -> P) -> &mut P {
        self.storage
            .entry(TypeId::of::<P>())
            .or_insert_with(|| PropertyEntry {
                data: Box::new(f()),
                type_name: std::any::type_name::<P>(),
            })
            .data
            .downcast_mut::<P>()
            .unwrap_or_else(|| unreachable!("property keyed by the TypeId of its own type"))
    }

    /// Get the value of type `P`, inserting its default first if it is missing.
    pub fn get_or_default<P: Property + Default>(&mut self) -> &mut P {
        self.get_or_insert_with(P::default)
    }

    /// Names of the stored types (for debugging).
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storage.values().map(|entry| entry.type_name)
    }
}

impl std::fmt::Debug for Properties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Properties")
            .field("count", &self.storage.len())
            .field("types", &self.type_names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct NativeAppHandle(u64);

    #[test]
    fn test_insert_replaces_and_returns_old() {
        let mut props = Properties::new();
        assert_eq!(props.insert(NativeAppHandle(1)), None);
        assert_eq!(props.insert(NativeAppHandle(2)), Some(NativeAppHandle(1)));
        assert_eq!(props.get::<NativeAppHandle>(), Some(&NativeAppHandle(2)));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_remove_and_contains() {
        let mut props = Properties::new();
        props.insert(7u8);
        assert!(props.contains::<u8>());
        assert_eq!(props.remove::<u8>(), Some(7));
        assert!(!props.contains::<u8>());
        assert!(props.is_empty());
    }

    #[test]
    fn test_get_or_insert_with_runs_once() {
        let mut props = Properties::new();
        let mut calls = 0;

        *props.get_or_insert_with(|| {
            calls += 1;
            10u32
        }) += 1;
        props.get_or_insert_with(|| {
            calls += 1;
            99u32
        });

        assert_eq!(calls, 1);
        assert_eq!(props.get::<u32>(), Some(&11));
    }

    #[test]
    fn test_get_or_default() {
        let mut props = Properties::new();
        props.get_or_default::<Vec<&'static str>>().push("gtk");
        assert_eq!(props.get::<Vec<&'static str>>(), Some(&vec!["gtk"]));
    }
}

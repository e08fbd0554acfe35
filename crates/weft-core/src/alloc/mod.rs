//! Hash collections used across Weft.
//!
//! Registries in Weft are keyed by `TypeId` or by short strings, both of
//! which hash well with AHash.

use std::any::TypeId;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

/// Map keyed by Rust type identity.
pub type TypeIdMap<V> = HashMap<TypeId, V>;

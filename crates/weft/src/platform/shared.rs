//! Per-type singleton cache.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use weft_core::alloc::TypeIdMap;

use crate::error::WeftResult;
use crate::types::TypeInfo;

/// Shared instances keyed by abstract type.
///
/// # Locking
///
/// Check, create and store all happen under one lock so each type is created
/// at most once, even when several threads ask at the same time. The lock is
/// reentrant: a factory may request another shared instance on the same
/// thread. The `RefCell` borrow is never held across the factory call.
#[derive(Default)]
pub(crate) struct SharedInstances {
    instances: ReentrantMutex<RefCell<TypeIdMap<Box<dyn Any + Send + Sync>>>>,
}

impl SharedInstances {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the cached `Arc<I>` for `ty`, creating it with `create` on first use.
    pub(crate) fn get_or_create<I, F>(&self, ty: &TypeInfo, create: F) -> WeftResult<Arc<I>>
    where
        I: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> WeftResult<Box<I>>,
    {
        let guard = self.instances.lock();

        if let Some(existing) = Self::lookup::<I>(&guard.borrow(), ty) {
            return Ok(existing);
        }

        let created: Arc<I> = Arc::from(create()?);

        let mut map = guard.borrow_mut();
        // A reentrant factory may have stored this type already; keep the first value.
        let stored = map
            .entry(ty.id())
            .or_insert_with(|| Box::new(created.clone()) as Box<dyn Any + Send + Sync>);
        match stored.downcast_ref::<Arc<I>>() {
            Some(instance) => Ok(instance.clone()),
            None => Ok(created),
        }
    }

    fn lookup<I: ?Sized + Send + Sync + 'static>(
        map: &TypeIdMap<Box<dyn Any + Send + Sync>>,
        ty: &TypeInfo,
    ) -> Option<Arc<I>> {
        map.get(&ty.id())
            .and_then(|instance| instance.downcast_ref::<Arc<I>>())
            .cloned()
    }

    pub(crate) fn contains(&self, ty: &TypeInfo) -> bool {
        self.instances.lock().borrow().contains_key(&ty.id())
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.lock().borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Clipboard;
    struct Theme;
    static CLIPBOARD: TypeInfo = TypeInfo::framework::<Clipboard>("Clipboard", "tests");
    static THEME: TypeInfo = TypeInfo::framework::<Theme>("Theme", "tests");

    #[test]
    fn test_created_once() {
        let shared = SharedInstances::new();
        let calls = AtomicUsize::new(0);

        let make = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(String::from("clipboard")))
        };
        let a = shared.get_or_create::<String, _>(&CLIPBOARD, make).unwrap();
        let b = shared.get_or_create::<String, _>(&CLIPBOARD, make).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(shared.contains(&CLIPBOARD));
    }

    #[test]
    fn test_factory_may_request_other_shared_instance() {
        let shared = SharedInstances::new();

        let theme = shared
            .get_or_create::<String, _>(&THEME, || {
                let clipboard = shared
                    .get_or_create::<String, _>(&CLIPBOARD, || Ok(Box::new("clip".to_string())))?;
                Ok(Box::new(format!("theme+{}", clipboard)))
            })
            .unwrap();

        assert_eq!(theme.as_str(), "theme+clip");
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_failed_creation_is_not_cached() {
        let shared = SharedInstances::new();
        let err = shared.get_or_create::<String, _>(&THEME, || {
            Err(crate::WeftError::HandlerNotFound { type_name: "Theme" })
        });
        assert!(err.is_err());
        assert!(!shared.contains(&THEME));
    }
}

//! Thread-scoped platform selection.
//!
//! Each thread has an optional "current" platform. When it is unset, the
//! process-wide platform installed with [`Platform::initialize`] is used.
//! [`Platform::context`] swaps the thread's platform for the lifetime of a
//! guard, so nested contexts unwind in LIFO order.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::{RwLock, const_rwlock};

use super::Platform;
use crate::error::{WeftError, WeftResult};

static GLOBAL_PLATFORM: RwLock<Option<Arc<Platform>>> = const_rwlock(None);
static ALLOW_REINITIALIZE: AtomicBool = AtomicBool::new(false);

thread_local! {
    static CURRENT_PLATFORM: RefCell<Option<Arc<Platform>>> = const { RefCell::new(None) };
}

fn swap_current(platform: Option<Arc<Platform>>) -> Option<Arc<Platform>> {
    CURRENT_PLATFORM.with(|current| current.replace(platform))
}

/// Guard returned by [`Platform::context`].
///
/// Restores the thread's previous platform when dropped, including during
/// unwinding. The guard cannot leave the thread that created it.
#[must_use = "the platform is only active while the context guard is alive"]
pub struct PlatformContext {
    previous: Option<Arc<Platform>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for PlatformContext {
    fn drop(&mut self) {
        swap_current(self.previous.take());
    }
}

impl std::fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformContext")
            .field("previous", &self.previous.as_ref().map(|p| p.id().to_string()))
            .finish()
    }
}

impl Platform {
    /// Install `platform` as the process-wide default.
    ///
    /// The first successful call wins. Later calls fail with
    /// [`WeftError::AlreadyInitialized`] unless reinitialization was allowed
    /// with [`Platform::set_allow_reinitialize`].
    pub fn initialize(platform: Arc<Platform>) -> WeftResult<()> {
        let mut global = GLOBAL_PLATFORM.write();
        if let Some(existing) = global.as_ref()
            && !ALLOW_REINITIALIZE.load(Ordering::Acquire)
        {
            return Err(WeftError::AlreadyInitialized {
                platform: existing.id().to_string(),
            });
        }

        tracing::info!("Initialized global platform '{}'", platform.id());
        *global = Some(platform);
        Ok(())
    }

    /// Allow [`Platform::initialize`] to replace an installed platform.
    pub fn set_allow_reinitialize(allow: bool) {
        ALLOW_REINITIALIZE.store(allow, Ordering::Release);
    }

    /// Whether reinitialization is currently allowed.
    pub fn allow_reinitialize() -> bool {
        ALLOW_REINITIALIZE.load(Ordering::Acquire)
    }

    /// The process-wide platform, ignoring thread contexts.
    pub fn global() -> Option<Arc<Platform>> {
        GLOBAL_PLATFORM.read().clone()
    }

    /// The platform active on this thread, falling back to the global one.
    pub fn current() -> Option<Arc<Platform>> {
        CURRENT_PLATFORM
            .with(|current| current.borrow().clone())
            .or_else(Self::global)
    }

    /// Like [`Platform::current`], but fails with [`WeftError::NoPlatform`].
    pub fn instance() -> WeftResult<Arc<Platform>> {
        Self::current().ok_or(WeftError::NoPlatform)
    }

    /// Make this platform current on this thread until the guard is dropped.
    pub fn context(self: &Arc<Self>) -> PlatformContext {
        tracing::trace!("Entering platform context '{}'", self.id());
        PlatformContext {
            previous: swap_current(Some(self.clone())),
            _not_send: PhantomData,
        }
    }

    /// Run `f` with this platform current on this thread.
    pub fn invoke<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        let _context = self.context();
        f()
    }

    /// Spawn a thread that runs `f` with this platform current.
    pub fn spawn<R, F>(self: &Arc<Self>, f: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let platform = self.clone();
        std::thread::spawn(move || platform.invoke(f))
    }

    /// Whether `self` is the platform active on this thread.
    pub fn is_current(self: &Arc<Self>) -> bool {
        Self::current().is_some_and(|current| Arc::ptr_eq(&current, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(id: &str) -> Arc<Platform> {
        Platform::builder(id).build()
    }

    fn current_id() -> Option<String> {
        CURRENT_PLATFORM.with(|c| c.borrow().as_ref().map(|p| p.id().to_string()))
    }

    #[test]
    fn test_nested_contexts_restore_in_order() {
        let p0 = platform("p0");
        let p1 = platform("p1");
        let p2 = platform("p2");
        let mut history = Vec::new();

        let _base = p0.context();
        history.push(current_id());
        {
            let _outer = p1.context();
            history.push(current_id());
            {
                let _inner = p2.context();
                history.push(current_id());
            }
            history.push(current_id());
        }
        history.push(current_id());

        let expected: Vec<_> = ["p0", "p1", "p2", "p1", "p0"]
            .iter()
            .map(|id| Some(id.to_string()))
            .collect();
        assert_eq!(history, expected);
    }

    #[test]
    fn test_context_restored_on_panic() {
        let outer = platform("outer");
        let inner = platform("inner");
        let _guard = outer.context();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            inner.invoke(|| -> () { panic!("handler blew up") })
        }));

        assert!(result.is_err());
        assert!(outer.is_current());
    }

    #[test]
    fn test_contexts_are_per_thread() {
        let main = platform("main");
        let worker = platform("worker");
        let _guard = main.context();

        let seen = worker
            .spawn(|| Platform::current().map(|p| p.id().to_string()))
            .join()
            .unwrap();

        assert_eq!(seen.as_deref(), Some("worker"));
        assert!(main.is_current());
    }
}

use std::{
    cell::RefCell,
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{any::Instance, lifetime::Lifetime};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Per-thread instances of every per-execution-context cache, dropped when the thread exits.
    static THREAD_INSTANCES: RefCell<HashMap<u64, Instance>> = RefCell::new(HashMap::new());
}

/// Instances kept alive by one registration, according to its lifetime.
pub(crate) enum LifetimeCache {
    Transient,
    Singleton(OnceCell<Instance>),
    PerExecutionContext(u64),
}

impl LifetimeCache {
    #[must_use]
    pub(crate) fn new(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Transient => Self::Transient,
            Lifetime::Singleton => Self::Singleton(OnceCell::new()),
            Lifetime::PerExecutionContext => Self::PerExecutionContext(NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// Returns the cached instance or creates one.
    ///
    /// A singleton is created at most once: concurrent callers block until the first creation
    /// finishes, and a failed creation leaves the slot empty.
    /// A per-thread instance is created without holding any borrow, so creation may resolve
    /// other services.
    pub(crate) fn get_or_create<E>(&self, create: impl FnOnce() -> Result<Instance, E>) -> Result<Instance, E> {
        match self {
            Self::Transient => create(),
            Self::Singleton(slot) => {
                if let Some(instance) = slot.get() {
                    debug!("Found in cache");
                    return Ok(instance.clone());
                }

                slot.get_or_try_init(create).cloned()
            }
            Self::PerExecutionContext(id) => {
                let cached = THREAD_INSTANCES
                    .try_with(|instances| instances.borrow().get(id).cloned())
                    .ok()
                    .flatten();
                if let Some(instance) = cached {
                    debug!(thread_id = ?std::thread::current().id(), "Found in cache");
                    return Ok(instance);
                }

                let created = create()?;
                // Left uncached while the thread is being torn down
                let stored = THREAD_INSTANCES
                    .try_with(|instances| instances.borrow_mut().entry(*id).or_insert_with(|| created.clone()).clone())
                    .unwrap_or(created);
                Ok(stored)
            }
        }
    }
}

impl Drop for LifetimeCache {
    fn drop(&mut self) {
        if let Self::PerExecutionContext(id) = *self {
            // Released after the borrow ends, the instance may own other caches
            let released = THREAD_INSTANCES.try_with(|instances| instances.borrow_mut().remove(&id));
            drop(released);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LifetimeCache;
    use crate::{
        any::{erase, Instance},
        lifetime::Lifetime,
    };

    use std::{
        convert::Infallible,
        sync::{
            atomic::{AtomicU8, Ordering},
            Arc, Barrier,
        },
        thread,
        time::Duration,
    };
    use tracing_test::traced_test;

    fn instance(cache: &LifetimeCache, calls: &AtomicU8) -> Instance {
        cache
            .get_or_create(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(erase(Arc::new(())))
            })
            .unwrap()
    }

    fn counted(cache: &LifetimeCache, calls: &AtomicU8) -> usize {
        Arc::as_ptr(&instance(cache, calls)) as *const () as usize
    }

    #[test]
    #[traced_test]
    fn test_transient() {
        let cache = LifetimeCache::new(Lifetime::Transient);
        let calls = AtomicU8::new(0);

        let first = instance(&cache, &calls);
        let second = instance(&cache, &calls);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_singleton() {
        let cache = LifetimeCache::new(Lifetime::Singleton);
        let calls = AtomicU8::new(0);

        let first = counted(&cache, &calls);
        let second = counted(&cache, &calls);

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(logs_contain("Found in cache"));
    }

    #[test]
    #[traced_test]
    fn test_singleton_failed_creation() {
        let cache = LifetimeCache::new(Lifetime::Singleton);
        let calls = AtomicU8::new(0);

        assert!(cache.get_or_create(|| Err::<Instance, _>("unavailable")).is_err());

        counted(&cache, &calls);
        counted(&cache, &calls);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_singleton_concurrent_creation() {
        let cache = Arc::new(LifetimeCache::new(Lifetime::Singleton));
        let calls = Arc::new(AtomicU8::new(0));
        let started = Arc::new(Barrier::new(2));

        let handles = (0..2)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                let started = started.clone();
                thread::spawn(move || {
                    started.wait();
                    cache
                        .get_or_create(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            // Keeps the slot busy while the other thread arrives
                            thread::sleep(Duration::from_millis(50));
                            Ok::<_, Infallible>(erase(Arc::new(())))
                        })
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        let instances = handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>();

        assert!(Arc::ptr_eq(&instances[0], &instances[1]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_per_execution_context() {
        let cache = Arc::new(LifetimeCache::new(Lifetime::PerExecutionContext));
        let calls = Arc::new(AtomicU8::new(0));

        let first = instance(&cache, &calls);
        let second = instance(&cache, &calls);
        let other = thread::spawn({
            let cache = cache.clone();
            let calls = calls.clone();
            move || counted(&cache, &calls)
        })
        .join()
        .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_ne!(Arc::as_ptr(&first) as *const () as usize, other);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[traced_test]
    fn test_per_execution_context_released_with_thread() {
        let cache = Arc::new(LifetimeCache::new(Lifetime::PerExecutionContext));
        let calls = Arc::new(AtomicU8::new(0));

        let released = thread::spawn({
            let cache = cache.clone();
            let calls = calls.clone();
            move || Arc::downgrade(&instance(&cache, &calls))
        })
        .join()
        .unwrap();

        assert!(released.upgrade().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_per_execution_context_released_with_cache() {
        let calls = AtomicU8::new(0);
        let cache = LifetimeCache::new(Lifetime::PerExecutionContext);

        let released = Arc::downgrade(&instance(&cache, &calls));
        assert!(released.upgrade().is_some());

        drop(cache);
        assert!(released.upgrade().is_none());
    }
}

//! Converter cache for mkdown.
//!
//! Backend converters are a pure function of their configuration, so a
//! converter built once for a given engine and option set can be shared by
//! every later call with the same configuration. This crate provides:
//!
//! - [`CacheKey`]: canonical, order-independent identity of a configuration
//! - [`ConverterCache`]: shared map from key to a live converter instance
//!
//! Entries are created lazily on first use and never evicted. Realistic
//! programs use a handful of configurations, so the map stays small.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mkdown_cache::{CacheKey, ConverterCache};
//!
//! let cache: ConverterCache<str> = ConverterCache::new();
//! let key = CacheKey::new("comrak", &["table"]).unwrap();
//!
//! let first = cache
//!     .get_or_create(&key, || Ok::<_, ()>(Arc::from("converter")))
//!     .unwrap();
//! let second = cache
//!     .get_or_create(&key, || Ok::<_, ()>(Arc::from("rebuilt")))
//!     .unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

mod key;
pub use key::CacheKey;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared store of converter instances keyed by [`CacheKey`].
///
/// # Thread Safety
///
/// Lookups take a read lock only. A miss builds the instance **outside** any
/// lock and then performs an insert-if-absent under the write lock, so two
/// threads racing on the same key may both construct, but both observe the
/// single instance that was stored first. A partially constructed instance is
/// never visible.
///
/// A disabled cache (see [`ConverterCache::disabled`]) never stores anything:
/// every call constructs a fresh instance.
pub struct ConverterCache<T: ?Sized> {
    entries: Option<RwLock<HashMap<CacheKey, Arc<T>>>>,
}

impl<T: ?Sized> ConverterCache<T> {
    /// Create an enabled, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Some(RwLock::new(HashMap::new())),
        }
    }

    /// Create a cache that never stores instances.
    ///
    /// Useful when configuration changes faster than reuse would amortize.
    #[must_use]
    pub fn disabled() -> Self {
        Self { entries: None }
    }

    /// Create an enabled or disabled cache from a flag.
    #[must_use]
    pub fn with_enabled(enabled: bool) -> Self {
        if enabled { Self::new() } else { Self::disabled() }
    }

    /// Whether instances are stored and reused.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Return the instance stored under `key`, building it with `factory` on
    /// first use.
    ///
    /// A factory error is returned unchanged and nothing is stored, so a later
    /// call retries construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    pub fn get_or_create<E, F>(&self, key: &CacheKey, factory: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<Arc<T>, E>,
    {
        let Some(entries) = &self.entries else {
            return factory();
        };

        if let Some(existing) = entries.read().unwrap().get(key) {
            tracing::debug!(key = %key.digest(), "converter cache hit");
            return Ok(Arc::clone(existing));
        }

        tracing::debug!(key = %key.digest(), "converter cache miss");
        let created = factory()?;

        let mut guard = entries.write().unwrap();
        let stored = guard.entry(key.clone()).or_insert(created);
        Ok(Arc::clone(stored))
    }

    /// Look up an instance without constructing one.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        let entries = self.entries.as_ref()?;
        entries.read().unwrap().get(key).map(Arc::clone)
    }

    /// Number of stored instances (always 0 when disabled).
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .map_or(0, |entries| entries.read().unwrap().len())
    }

    /// Whether no instance is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for ConverterCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    trait Converter: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Named(String);

    impl Converter for Named {
        fn name(&self) -> &str {
            &self.0
        }
    }

    fn key(engine: &str, table: bool) -> CacheKey {
        CacheKey::new(engine, &serde_json::json!({ "table": table })).unwrap()
    }

    fn build(name: &str, counter: &AtomicUsize) -> Result<Arc<dyn Converter>, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(Named(name.to_owned())))
    }

    #[test]
    fn test_same_key_returns_same_instance() {
        let cache: ConverterCache<dyn Converter> = ConverterCache::new();
        let built = AtomicUsize::new(0);

        let a = cache.get_or_create(&key("comrak", true), || build("a", &built)).unwrap();
        let b = cache.get_or_create(&key("comrak", true), || build("b", &built)).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.name(), "a");
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_keys_never_collide() {
        let cache: ConverterCache<dyn Converter> = ConverterCache::new();
        let built = AtomicUsize::new(0);

        let keys = [
            key("comrak", true),
            key("comrak", false),
            key("pulldown-cmark", true),
            key("pulldown-cmark", false),
        ];
        let instances: Vec<_> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                cache
                    .get_or_create(k, || build(&i.to_string(), &built))
                    .unwrap()
            })
            .collect();

        assert_eq!(cache.len(), 4);
        for (i, instance) in instances.iter().enumerate() {
            assert_eq!(instance.name(), i.to_string());
        }
    }

    #[test]
    fn test_disabled_cache_always_constructs() {
        let cache: ConverterCache<dyn Converter> = ConverterCache::disabled();
        let built = AtomicUsize::new(0);
        let k = key("comrak", true);

        let a = cache.get_or_create(&k, || build("a", &built)).unwrap();
        let b = cache.get_or_create(&k, || build("b", &built)).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
        assert!(cache.get(&k).is_none());
        assert!(!cache.is_enabled());
    }

    #[test]
    fn test_factory_error_is_not_cached() {
        let cache: ConverterCache<dyn Converter> = ConverterCache::new();
        let built = AtomicUsize::new(0);
        let k = key("comrak", true);

        let err = cache
            .get_or_create(&k, || Err::<Arc<dyn Converter>, _>("unavailable".to_owned()))
            .err();
        assert_eq!(err.as_deref(), Some("unavailable"));
        assert!(cache.is_empty());

        let ok = cache.get_or_create(&k, || build("ok", &built)).unwrap();
        assert_eq!(ok.name(), "ok");
    }

    #[test]
    fn test_concurrent_first_use_converges_on_one_instance() {
        const THREADS: usize = 8;
        let cache: ConverterCache<dyn Converter> = ConverterCache::new();
        let built = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let k = key("comrak", true);

        let results: Vec<Arc<dyn Converter>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let (cache, built, barrier, k) = (&cache, &built, &barrier, &k);
                    scope.spawn(move || {
                        barrier.wait();
                        cache
                            .get_or_create(k, || build(&i.to_string(), built))
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let stored = cache.get(&k).unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(result, &stored));
        }
        assert!(built.load(Ordering::SeqCst) >= 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_with_enabled_flag() {
        assert!(ConverterCache::<str>::with_enabled(true).is_enabled());
        assert!(!ConverterCache::<str>::with_enabled(false).is_enabled());
    }
}

use restclient_core::{Backend, CacheAdapter, ServiceSettings};
use restclient_fixture::FixtureRoots;
use restclient_live::PoolRegistry;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

/// Builds a backend for one service from its resolved settings.
pub type BackendFactory = Arc<dyn Fn(&ServiceSettings) -> Arc<dyn Backend> + Send + Sync>;

/// Shared state for every [`Dao`](crate::Dao) in a process.
///
/// Holds the fixture roots, the per-service connection pools and the named
/// backend factories and cache adapters that `DAO_CLASS` and
/// `DAO_CACHE_CLASS` select from. Clones share everything. Build one at
/// startup and hand it to each DAO.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    fixture_roots: FixtureRoots,
    pools: PoolRegistry,
    backends: RwLock<HashMap<String, BackendFactory>>,
    caches: RwLock<HashMap<String, Arc<dyn CacheAdapter>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixture root searched by every mock backend. Returns false if
    /// it was already registered.
    pub fn register_mock_path(&self, path: impl AsRef<Path>) -> bool {
        self.inner.fixture_roots.register(path)
    }

    pub fn fixture_roots(&self) -> &FixtureRoots {
        &self.inner.fixture_roots
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.inner.pools
    }

    /// Registers a custom backend selectable with `DAO_CLASS = name`.
    pub fn register_backend<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ServiceSettings) -> Arc<dyn Backend> + Send + Sync + 'static,
    {
        self.inner
            .backends
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(factory));
    }

    /// Registers a cache adapter selectable with `DAO_CACHE_CLASS = name`.
    ///
    /// Every DAO selecting `name` shares this one instance.
    pub fn register_cache(&self, name: impl Into<String>, adapter: Arc<dyn CacheAdapter>) {
        self.inner
            .caches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), adapter);
    }

    pub fn backend(&self, name: &str) -> Option<BackendFactory> {
        self.inner
            .backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn cache(&self, name: &str) -> Option<Arc<dyn CacheAdapter>> {
        self.inner
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backends: Vec<String> = self
            .inner
            .backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        let caches: Vec<String> = self
            .inner
            .caches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("Registry")
            .field("fixture_roots", &self.inner.fixture_roots)
            .field("pools", &self.inner.pools.len())
            .field("backends", &backends)
            .field("caches", &caches)
            .finish()
    }
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// An append-only, ordered list of fixture root directories.
///
/// Clones share the same list. Registering a path twice is a no-op and
/// nothing is ever removed, so concurrent readers always see a prefix of
/// the final list.
#[derive(Debug, Clone, Default)]
pub struct FixtureRoots {
    paths: Arc<RwLock<Vec<PathBuf>>>,
}

impl FixtureRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `path` unless it is already registered. Returns whether it was added.
    pub fn register(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let mut paths = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        if paths.iter().any(|p| p == path) {
            return false;
        }
        paths.push(path.to_path_buf());
        true
    }

    /// A copy of the registered roots, in registration order.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.paths.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

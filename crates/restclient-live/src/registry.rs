use crate::config::PoolConfig;
use crate::pool::ConnectionPool;
use restclient_core::{DaoError, ServiceSettings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Process-wide, lazily built connection pools keyed by service name.
///
/// The first caller for a service builds its pool from that service's
/// settings; every later caller gets the same pool, so settings changed after
/// first use have no effect.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Arc<Mutex<HashMap<String, Arc<ConnectionPool>>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pool for `settings.service()`, building it on first use.
    ///
    /// The second element is true when this call built the pool.
    pub fn get_or_create(
        &self,
        settings: &ServiceSettings,
    ) -> Result<(Arc<ConnectionPool>, bool), DaoError> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = pools.get(settings.service()) {
            return Ok((Arc::clone(pool), false));
        }

        let pool = Arc::new(ConnectionPool::new(PoolConfig::from_settings(settings)?)?);
        pools.insert(settings.service().to_string(), Arc::clone(&pool));
        Ok((pool, true))
    }

    pub fn get(&self, service: &str) -> Option<Arc<ConnectionPool>> {
        self.pools
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

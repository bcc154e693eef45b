use crate::dao::{Dao, DaoInner};
use crate::events::DispatchEvent;
use crate::log_policy::LogPolicy;
use crate::registry::Registry;
use crate::service::ServiceDefinition;
use restclient_core::events::{EventListeners, FnListener};
use restclient_core::{Backend, CacheAdapter, DaoError, NoCache, ServiceSettings, Settings};
use restclient_faults::FaultInjector;
use restclient_fixture::FixtureBackend;
use restclient_live::LiveBackend;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::describe_histogram;
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Cache selectors that mean "no cache".
const NO_CACHE_NAMES: [&str; 2] = ["NoCache", "restclients_core.cache.NoCache"];

/// Builder for [`Dao`].
pub struct DaoBuilder {
    definition: Arc<dyn ServiceDefinition>,
    registry: Registry,
    settings: Settings,
    faults: FaultInjector,
    event_listeners: EventListeners<DispatchEvent>,
}

impl DaoBuilder {
    pub(crate) fn new(definition: Arc<dyn ServiceDefinition>) -> Self {
        Self {
            definition,
            registry: Registry::new(),
            settings: Settings::default(),
            faults: FaultInjector::default(),
            event_listeners: EventListeners::new(),
        }
    }

    /// Shared registry of fixture roots, pools, backends and caches.
    ///
    /// Defaults to a private, empty registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn fault_injector(mut self, faults: FaultInjector) -> Self {
        self.faults = faults;
        self
    }

    /// Registers a callback for every dispatch event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&DispatchEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    /// Registers a callback for the per-dispatch observation.
    ///
    /// Called with the duration and the status bucket (`404 -> 400`).
    pub fn on_observed<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration, u16) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &DispatchEvent| {
                if let DispatchEvent::Observed {
                    duration,
                    status_bucket,
                    ..
                } = event
                {
                    f(*duration, *status_bucket);
                }
            }));
        self
    }

    /// Registers a callback for cache short-circuits, called with the URL.
    pub fn on_cache_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &DispatchEvent| {
                if let DispatchEvent::CacheHit { url, .. } = event {
                    f(url);
                }
            }));
        self
    }

    /// Resolves the backend, cache and logging policy.
    ///
    /// Unknown `DAO_CLASS` or `DAO_CACHE_CLASS` names and unparsable timing
    /// settings fail here rather than at first use.
    pub fn build(self) -> Result<Dao, DaoError> {
        let service = self.definition.service_name().to_string();
        let definition = Arc::clone(&self.definition);
        let service_settings = self
            .settings
            .for_service(&service)
            .with_defaults(Arc::new(move |key: &str| definition.default_service_setting(key)));

        let backend = self.resolve_backend(&service_settings)?;
        let cache = self.resolve_cache()?;
        let log_policy = LogPolicy::from_settings(&service_settings)?;
        let mock_delay = service_settings
            .get_seconds("MOCKDATA_DELAY")?
            .unwrap_or(Duration::ZERO);

        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_histogram!(
                    "restclient_request_duration_seconds",
                    metrics::Unit::Seconds,
                    "Restclient request duration"
                );
                describe_histogram!(
                    "restclient_response_status_code",
                    "Restclient response status, bucketed to its hundreds digit"
                );
            });
        }

        tracing::debug!(
            service = %service,
            backend = ?backend.kind(),
            cache = cache.name(),
            "dao built"
        );

        Ok(Dao::from_inner(DaoInner {
            service,
            definition: self.definition,
            settings: service_settings,
            backend,
            cache,
            faults: self.faults,
            log_policy,
            mock_delay,
            event_listeners: self.event_listeners,
        }))
    }

    fn resolve_backend(&self, settings: &ServiceSettings) -> Result<Arc<dyn Backend>, DaoError> {
        let service = settings.service();
        let selected = settings.get("DAO_CLASS").filter(|name| !name.is_empty());

        let Some(name) = selected else {
            return Ok(self.mock_backend(settings));
        };

        let legacy_live = format!("restclients.dao_implementation.{service}.Live");
        let legacy_mock = format!("restclients.dao_implementation.{service}.File");
        if name == "Live" || name == legacy_live {
            return Ok(Arc::new(LiveBackend::new(
                settings.clone(),
                self.registry.pools().clone(),
            )));
        }
        if name == "Mock" || name == legacy_mock {
            return Ok(self.mock_backend(settings));
        }

        match self.registry.backend(&name) {
            Some(factory) => Ok(factory(settings)),
            None => Err(DaoError::improperly_configured(format!(
                "unknown DAO_CLASS {name:?} for service {service}"
            ))),
        }
    }

    fn mock_backend(&self, settings: &ServiceSettings) -> Arc<dyn Backend> {
        Arc::new(FixtureBackend::new(
            settings.service(),
            self.registry.fixture_roots().clone(),
            self.definition.service_mock_paths(),
        ))
    }

    fn resolve_cache(&self) -> Result<Arc<dyn CacheAdapter>, DaoError> {
        match self.settings.get("DAO_CACHE_CLASS").filter(|name| !name.is_empty()) {
            None => Ok(Arc::new(NoCache)),
            Some(name) if NO_CACHE_NAMES.contains(&name) => Ok(Arc::new(NoCache)),
            Some(name) => self.registry.cache(name).ok_or_else(|| {
                DaoError::improperly_configured(format!("unknown DAO_CACHE_CLASS {name:?}"))
            }),
        }
    }
}

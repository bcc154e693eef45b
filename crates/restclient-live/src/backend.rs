use crate::events::TransportEvent;
use crate::registry::PoolRegistry;
use futures::future::BoxFuture;
use restclient_core::events::{EventListeners, FnListener};
use restclient_core::{
    Backend, BackendKind, Context, DaoError, Request, Response, ServiceSettings,
};
use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::describe_counter;
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Sends requests to a service's configured host through its shared pool.
///
/// Transport failures are classified: TLS problems surface as
/// [`DaoError::Tls`], anything else that prevented a status from arriving
/// (refused connection, timeout, redirect loop) as a
/// [`DaoError::DataFailure`] with status `0`. Non-2xx statuses are returned
/// as ordinary responses.
#[derive(Clone)]
pub struct LiveBackend {
    settings: ServiceSettings,
    pools: PoolRegistry,
    event_listeners: EventListeners<TransportEvent>,
}

impl LiveBackend {
    pub fn new(settings: ServiceSettings, pools: PoolRegistry) -> Self {
        Self::builder(settings, pools).build()
    }

    pub fn builder(settings: ServiceSettings, pools: PoolRegistry) -> LiveBackendBuilder {
        LiveBackendBuilder {
            settings,
            pools,
            event_listeners: EventListeners::new(),
        }
    }

    pub fn service(&self) -> &str {
        self.settings.service()
    }

    pub async fn send(&self, request: &Request) -> Result<Response, DaoError> {
        let service = self.settings.service();
        let (pool, created) = self.pools.get_or_create(&self.settings)?;
        if created {
            self.event_listeners.emit(&TransportEvent::PoolCreated {
                service: service.to_string(),
                timestamp: Instant::now(),
                max_connections: pool.config().max_connections,
            });
            tracing::debug!(
                service,
                host = %pool.config().host,
                max_connections = pool.config().max_connections,
                "connection pool created"
            );
        }

        let start = Instant::now();
        match pool.execute(request).await {
            Ok(response) => {
                self.event_listeners.emit(&TransportEvent::ResponseReceived {
                    service: service.to_string(),
                    timestamp: Instant::now(),
                    url: request.url.clone(),
                    status: response.status,
                    duration: start.elapsed(),
                });
                Ok(response)
            }
            Err(err) => Err(self.classify(&request.url, err)),
        }
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> DaoError {
        let service = self.settings.service();

        if let Some(tls) = find_tls_error(&err) {
            self.event_listeners.emit(&TransportEvent::TlsFailure {
                service: service.to_string(),
                timestamp: Instant::now(),
                url: url.to_string(),
            });
            tracing::warn!(service, url, error = %tls, "TLS failure");

            #[cfg(feature = "metrics")]
            metrics::counter!("restclient_request_ssl_error_total", "service" => service.to_string())
                .increment(1);

            return DaoError::Tls {
                url: url.to_string(),
                source: Arc::new(tls.clone()),
            };
        }

        let message = err.to_string();
        self.event_listeners.emit(&TransportEvent::TransportFailure {
            service: service.to_string(),
            timestamp: Instant::now(),
            url: url.to_string(),
            message: message.clone(),
        });
        tracing::warn!(
            service,
            url,
            timeout = err.is_timeout(),
            error = %message,
            "transport failure"
        );

        #[cfg(feature = "metrics")]
        metrics::counter!("restclient_request_timeout_total", "service" => service.to_string())
            .increment(1);

        DaoError::data_failure(url, 0, message)
    }
}

/// Walks the source chain looking for a rustls error.
///
/// hyper wraps handshake failures in nested `io::Error`s, and
/// `io::Error::source()` skips the wrapped error, so an `io::Error` with an
/// inner error is stepped into through `get_ref()` instead.
fn find_tls_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a rustls::Error> {
    let mut current: Option<&'a (dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(tls) = e.downcast_ref::<rustls::Error>() {
            return Some(tls);
        }
        current = match e.downcast_ref::<io::Error>().and_then(io::Error::get_ref) {
            Some(inner) => Some(inner as &(dyn StdError + 'static)),
            None => e.source(),
        };
    }
    None
}

impl Backend for LiveBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Live
    }

    fn load<'a>(
        &'a self,
        _ctx: &'a Context,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<Response, DaoError>> {
        Box::pin(self.send(request))
    }
}

/// Builder for [`LiveBackend`].
pub struct LiveBackendBuilder {
    settings: ServiceSettings,
    pools: PoolRegistry,
    event_listeners: EventListeners<TransportEvent>,
}

impl LiveBackendBuilder {
    /// Registers a callback for every transport event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&TransportEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    /// Registers a callback for failures that produced no status.
    ///
    /// Called with the URL and whether the failure was TLS related.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &TransportEvent| match event {
                TransportEvent::TlsFailure { url, .. } => f(url, true),
                TransportEvent::TransportFailure { url, .. } => f(url, false),
                _ => {}
            }));
        self
    }

    pub fn build(self) -> LiveBackend {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "restclient_request_timeout_total",
                    "Requests that failed in transport before a status arrived"
                );
                describe_counter!(
                    "restclient_request_ssl_error_total",
                    "Requests that failed TLS negotiation or certificate validation"
                );
            });
        }

        LiveBackend {
            settings: self.settings,
            pools: self.pools,
            event_listeners: self.event_listeners,
        }
    }
}

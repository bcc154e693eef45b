use crate::config::DaoBuilder;
use crate::events::DispatchEvent;
use crate::log_policy::LogPolicy;
use crate::service::ServiceDefinition;
use futures::future::BoxFuture;
use restclient_core::events::EventListeners;
use restclient_core::{
    Backend, BackendKind, Bytes, CacheAdapter, CacheLookup, Context, DaoError, HeaderMap, Request,
    Response, ServiceSettings,
};
use restclient_faults::FaultInjector;
use std::fmt;
use std::sync::Arc;
use std::task::Poll;
use std::time::{Duration, Instant};
use tower::Service;

/// The per-service request façade.
///
/// Every verb runs the same pipeline:
///
/// 1. the context's fault plan may answer immediately;
/// 2. the service's custom headers are merged in;
/// 3. cacheable requests consult the cache adapter, which may answer or
///    revise the headers;
/// 4. the backend loads the response, and duration and status are observed;
/// 5. mock responses get the configured delay and the edit hook;
/// 6. cacheable responses go through the adapter's post-processing, which may
///    replace them;
/// 7. a sampled timing line is logged.
///
/// Backend errors are returned unchanged. Clones share all state.
#[derive(Clone)]
pub struct Dao {
    inner: Arc<DaoInner>,
}

pub(crate) struct DaoInner {
    pub(crate) service: String,
    pub(crate) definition: Arc<dyn ServiceDefinition>,
    pub(crate) settings: ServiceSettings,
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) cache: Arc<dyn CacheAdapter>,
    pub(crate) faults: FaultInjector,
    pub(crate) log_policy: LogPolicy,
    pub(crate) mock_delay: Duration,
    pub(crate) event_listeners: EventListeners<DispatchEvent>,
}

impl Dao {
    pub fn builder(definition: impl ServiceDefinition) -> DaoBuilder {
        DaoBuilder::new(Arc::new(definition))
    }

    pub(crate) fn from_inner(inner: DaoInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.inner.backend.kind()
    }

    pub fn cache_name(&self) -> &str {
        self.inner.cache.name()
    }

    /// Settings resolved for this service, including its default hook.
    pub fn settings(&self) -> &ServiceSettings {
        &self.inner.settings
    }

    pub async fn get(&self, ctx: &Context, url: &str, headers: HeaderMap) -> Result<Response, DaoError> {
        self.load(ctx, Request::get(url).headers(headers)).await
    }

    pub async fn post(
        &self,
        ctx: &Context,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response, DaoError> {
        self.load(ctx, with_body(Request::post(url).headers(headers), body))
            .await
    }

    pub async fn put(
        &self,
        ctx: &Context,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response, DaoError> {
        self.load(ctx, with_body(Request::put(url).headers(headers), body))
            .await
    }

    pub async fn patch(
        &self,
        ctx: &Context,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response, DaoError> {
        self.load(ctx, with_body(Request::patch(url).headers(headers), body))
            .await
    }

    pub async fn delete(&self, ctx: &Context, url: &str, headers: HeaderMap) -> Result<Response, DaoError> {
        self.load(ctx, Request::delete(url).headers(headers)).await
    }

    /// Drops any cached response for `url` from this service's cache.
    pub async fn clear_cached_response(&self, url: &str) {
        self.inner.cache.invalidate(&self.inner.service, url).await;
    }

    /// Runs `request` through the dispatch pipeline.
    pub async fn load(&self, ctx: &Context, mut request: Request) -> Result<Response, DaoError> {
        let start = Instant::now();
        let inner = &*self.inner;
        let service = inner.service.as_str();

        if let Some(forced) = inner.faults.get_response(ctx, service, &request.url).await? {
            inner.event_listeners.emit(&DispatchEvent::FaultShortCircuit {
                service: service.to_string(),
                timestamp: Instant::now(),
                url: request.url.clone(),
                status: forced.status,
            });
            return Ok(forced);
        }

        if let Some(custom) = inner.definition.custom_headers(&request) {
            request.headers.extend(custom);
        }

        let cacheable = inner.definition.is_cacheable(&request);
        if cacheable {
            match inner.cache.lookup(service, &request.url, &request.headers).await {
                Some(CacheLookup::Response(mut cached)) => {
                    cached.mark_from_cache(inner.cache.name());
                    inner.event_listeners.emit(&DispatchEvent::CacheHit {
                        service: service.to_string(),
                        timestamp: Instant::now(),
                        url: request.url.clone(),
                        cache_class: inner.cache.name().to_string(),
                    });
                    self.observe(&request, &cached, start);
                    self.log(&request, &cached, true, start);
                    return Ok(cached);
                }
                Some(CacheLookup::Headers(revised)) => request.headers = revised,
                None => {}
            }
        }

        let mut response = inner.backend.load(ctx, &request).await?;
        self.observe(&request, &response, start);

        match inner.backend.kind() {
            BackendKind::Mock => {
                if !inner.mock_delay.is_zero() {
                    tokio::time::sleep(inner.mock_delay).await;
                }
                inner.definition.edit_mock_response(&request, &mut response);
            }
            BackendKind::Live if inner.definition.edit_live_responses() => {
                inner.definition.edit_mock_response(&request, &mut response);
            }
            BackendKind::Live => {}
        }

        if cacheable {
            if let Some(mut replacement) = inner
                .cache
                .process_response(service, &request.url, &response)
                .await
            {
                replacement.mark_from_cache(inner.cache.name());
                inner.event_listeners.emit(&DispatchEvent::CacheReplaced {
                    service: service.to_string(),
                    timestamp: Instant::now(),
                    url: request.url.clone(),
                    cache_class: inner.cache.name().to_string(),
                });
                self.log(&request, &replacement, true, start);
                return Ok(replacement);
            }
        }

        self.log(&request, &response, false, start);
        Ok(response)
    }

    fn observe(&self, request: &Request, response: &Response, start: Instant) {
        let duration = start.elapsed();
        let status_bucket = response.status_bucket();

        self.inner.event_listeners.emit(&DispatchEvent::Observed {
            service: self.inner.service.clone(),
            timestamp: Instant::now(),
            method: request.method,
            url: request.url.clone(),
            status: response.status,
            status_bucket,
            duration,
            from_cache: response.is_from_cache(),
        });

        #[cfg(feature = "metrics")]
        {
            metrics::histogram!(
                "restclient_request_duration_seconds",
                "service" => self.inner.service.clone()
            )
            .record(duration.as_secs_f64());
            metrics::histogram!(
                "restclient_response_status_code",
                "service" => self.inner.service.clone()
            )
            .record(f64::from(status_bucket));
        }
    }

    fn log(&self, request: &Request, response: &Response, cached: bool, start: Instant) {
        if !self.inner.log_policy.should_log() {
            return;
        }
        let from_cache = if cached { "yes" } else { "no" };
        let cache_class = response.cache_class.as_deref().unwrap_or("None");
        let time = start.elapsed().as_secs_f64();
        tracing::info!(
            target: "restclient::dao",
            service = %self.inner.service,
            method = %request.method,
            url = %request.url,
            status = response.status,
            from_cache,
            cache_class,
            time,
            "service:{} method:{} url:{} status:{} from_cache:{} cache_class:{} time:{}",
            self.inner.service,
            request.method,
            request.url,
            response.status,
            from_cache,
            cache_class,
            time
        );
    }
}

fn with_body(request: Request, body: Option<Bytes>) -> Request {
    match body {
        Some(body) => request.body(body),
        None => request,
    }
}

impl fmt::Debug for Dao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dao")
            .field("service", &self.inner.service)
            .field("backend", &self.inner.backend.kind())
            .field("cache", &self.inner.cache.name())
            .field("mock_delay", &self.inner.mock_delay)
            .finish()
    }
}

/// One dispatch through the tower [`Service`] interface.
#[derive(Debug, Clone)]
pub struct Call {
    pub ctx: Context,
    pub request: Request,
}

impl Call {
    pub fn new(ctx: Context, request: Request) -> Self {
        Self { ctx, request }
    }

    pub fn get(ctx: &Context, url: impl Into<String>) -> Self {
        Self::new(ctx.clone(), Request::get(url))
    }
}

impl Service<Call> for Dao {
    type Response = Response;
    type Error = DaoError;
    type Future = BoxFuture<'static, Result<Response, DaoError>>;

    fn poll_ready(&mut self, _cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: Call) -> Self::Future {
        let dao = self.clone();
        Box::pin(async move { dao.load(&call.ctx, call.request).await })
    }
}

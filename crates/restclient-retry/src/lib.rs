//! Caller-facing retry policy for restclient.
//!
//! The dispatch pipeline never retries on its own; callers opt in by
//! wrapping an operation (or a DAO service) with a [`RetryLayer`].
//!
//! On each failure:
//! - an error that is not one of the declared retryable kinds, or that
//!   carries a status outside the retryable status set, is returned
//!   immediately;
//! - otherwise, if attempts remain, the policy sleeps for the current delay,
//!   multiplies the delay by the backoff factor and tries again;
//! - once attempts are exhausted, the last error is returned.
//!
//! Invalid configuration (zero attempts, zero delay, non-positive backoff)
//! is rejected by [`RetryConfigBuilder::build`], before anything runs.
//!
//! # Examples
//!
//! ```
//! use restclient_core::{DaoError, Request};
//! use restclient_retry::RetryLayer;
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let retry = RetryLayer::<DaoError>::builder()
//!     .name("sws")
//!     .status_codes([503])
//!     .delay(Duration::from_millis(50))
//!     .on_retry(|attempt, delay| {
//!         println!("retry {} after {:?}", attempt, delay);
//!     })
//!     .build()?;
//!
//! let service = ServiceBuilder::new()
//!     .layer(retry)
//!     .service(tower::service_fn(|req: Request| async move {
//!         Ok::<_, DaoError>(req.url)
//!     }));
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod config;
mod events;
mod layer;
mod policy;

pub use backoff::ExponentialBackoff;
pub use config::{RetryConfig, RetryConfigBuilder, RetryConfigError};
pub use events::RetryEvent;
pub use layer::RetryLayer;
pub use policy::{FailureStatus, RetryPolicy, RetryPredicate};

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Service, ServiceExt};

#[cfg(feature = "metrics")]
fn record_outcome(name: &str, result: &'static str) {
    metrics::counter!(
        "restclient_retry_calls_total",
        "retry" => name.to_string(),
        "result" => result
    )
    .increment(1);
}

pub(crate) async fn execute<E, T, F, Fut>(config: &RetryConfig<E>, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                config.event_listeners.emit(&RetryEvent::Success {
                    name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempts: attempt + 1,
                });

                #[cfg(feature = "metrics")]
                record_outcome(&config.name, "success");

                return Ok(value);
            }
            Err(error) => {
                if !config.policy.should_retry(&error) {
                    config.event_listeners.emit(&RetryEvent::IgnoredError {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt + 1,
                    });

                    #[cfg(feature = "metrics")]
                    record_outcome(&config.name, "ignored");

                    return Err(error);
                }

                if attempt + 1 >= config.policy.max_attempts {
                    config.event_listeners.emit(&RetryEvent::Error {
                        name: config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt + 1,
                    });

                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        retry = %config.name,
                        attempts = attempt + 1,
                        "retry: attempts exhausted"
                    );

                    #[cfg(feature = "metrics")]
                    record_outcome(&config.name, "exhausted");

                    return Err(error);
                }

                let delay = config.policy.next_backoff(attempt);
                config.event_listeners.emit(&RetryEvent::Retry {
                    name: config.name.clone(),
                    timestamp: Instant::now(),
                    attempt: attempt + 1,
                    delay,
                });

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    retry = %config.name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "retry: sleeping before next attempt"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// A Tower [`Service`] that retries failed calls of the inner service.
pub struct Retry<S, E> {
    inner: S,
    config: Arc<RetryConfig<E>>,
}

impl<S, E> Retry<S, E> {
    pub fn new(inner: S, config: Arc<RetryConfig<E>>) -> Self {
        Self { inner, config }
    }
}

impl<S, E> Clone for Retry<S, E>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, Req, E> Service<Req> for Retry<S, E>
where
    S: Service<Req, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    Req: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    type Response = S::Response;
    type Error = E;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let config = Arc::clone(&self.config);

        Box::pin(async move {
            execute(&config, move || {
                let service = service.clone();
                let req = req.clone();
                async move { service.oneshot(req).await }
            })
            .await
        })
    }
}

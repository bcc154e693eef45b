use crate::backoff::ExponentialBackoff;
use crate::events::RetryEvent;
use crate::policy::{FailureStatus, RetryPolicy, RetryPredicate, StatusFilter};
use restclient_core::events::{EventListeners, FnListener};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "metrics")]
use metrics::describe_counter;
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Invalid retry configuration, reported by [`RetryConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryConfigError {
    #[error("max_attempts must be at least 1, got {0}")]
    MaxAttempts(usize),
    #[error("delay must be greater than zero")]
    Delay,
    #[error("backoff must be a finite number greater than zero, got {0}")]
    Backoff(f64),
}

/// Configuration for the retry policy.
pub struct RetryConfig<E> {
    pub(crate) policy: RetryPolicy<E>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

impl<E> RetryConfig<E> {
    pub fn builder() -> RetryConfigBuilder<E> {
        RetryConfigBuilder::new()
    }

    pub fn policy(&self) -> &RetryPolicy<E> {
        &self.policy
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder<E> {
    max_attempts: usize,
    delay: Duration,
    backoff: f64,
    predicates: Vec<RetryPredicate<E>>,
    status_filter: Option<StatusFilter<E>>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl<E> Default for RetryConfigBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryConfigBuilder<E> {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_attempts: 4
    /// - delay: 3 seconds
    /// - backoff: 2.0
    /// - retryable kinds: every error
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(3),
            backoff: 2.0,
            predicates: Vec::new(),
            status_filter: None,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Total attempts including the first, so `4` means up to 3 retries.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before the first retry.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Factor the delay is multiplied by after each retry.
    pub fn backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    /// Declares a retryable error kind. May be called several times; an error
    /// is retryable when any declared kind matches.
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Restricts retries of errors that carry a status to these codes.
    ///
    /// Errors without a status are not affected. An empty set disables the filter.
    pub fn status_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
        E: FailureStatus,
    {
        self.status_filter = Some(StatusFilter {
            codes: codes.into_iter().collect(),
            status_of: <E as FailureStatus>::failure_status,
        });
        self
    }

    /// Sets the name for this retry instance (used in events and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a retry is about to be made.
    ///
    /// # Callback Signature
    /// `Fn(usize, Duration)` - the retry number (1 = first retry) and the
    /// delay slept before it.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &RetryEvent| {
                if let RetryEvent::Retry { attempt, delay, .. } = event {
                    f(*attempt, *delay);
                }
            }));
        self
    }

    /// Registers a callback when the operation succeeds, with the total
    /// number of attempts made.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &RetryEvent| {
                if let RetryEvent::Success { attempts, .. } = event {
                    f(*attempts);
                }
            }));
        self
    }

    /// Registers a callback when all attempts are exhausted.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &RetryEvent| {
                if let RetryEvent::Error { attempts, .. } = event {
                    f(*attempts);
                }
            }));
        self
    }

    /// Registers a callback when an error is returned without retrying.
    pub fn on_ignored_error<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &RetryEvent| {
                if matches!(event, RetryEvent::IgnoredError { .. }) {
                    f();
                }
            }));
        self
    }

    /// Validates the configuration and builds the retry layer.
    pub fn build(self) -> Result<crate::RetryLayer<E>, RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError::MaxAttempts(self.max_attempts));
        }
        if self.delay.is_zero() {
            return Err(RetryConfigError::Delay);
        }
        if !self.backoff.is_finite() || self.backoff <= 0.0 {
            return Err(RetryConfigError::Backoff(self.backoff));
        }

        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "restclient_retry_calls_total",
                    "Total number of calls through a retry policy, by outcome"
                );
            });
        }

        let policy = RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: ExponentialBackoff::new(self.delay).multiplier(self.backoff),
            predicates: self.predicates,
            status_filter: self.status_filter,
        };

        Ok(crate::RetryLayer::new(RetryConfig {
            policy,
            event_listeners: self.event_listeners,
            name: self.name,
        }))
    }
}

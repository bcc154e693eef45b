use crate::{Retry, RetryConfig};
use std::sync::Arc;
use tower::Layer;

/// A configured retry policy.
///
/// Use it directly around any async operation with [`RetryLayer::run`], or as
/// a Tower [`Layer`] around a service such as a DAO.
///
/// ```
/// use restclient_core::DaoError;
/// use restclient_retry::RetryLayer;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let retry = RetryLayer::<DaoError>::builder()
///     .retry_on(|e| matches!(e, DaoError::DataFailure { .. }))
///     .status_codes([500, 502, 503])
///     .max_attempts(4)
///     .delay(Duration::from_millis(100))
///     .build()?;
///
/// let value = retry.run(|| async { Ok::<_, DaoError>("payload") }).await?;
/// assert_eq!(value, "payload");
/// # Ok(())
/// # }
/// ```
pub struct RetryLayer<E> {
    config: Arc<RetryConfig<E>>,
}

impl<E> RetryLayer<E> {
    pub(crate) fn new(config: RetryConfig<E>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn builder() -> crate::RetryConfigBuilder<E> {
        crate::RetryConfigBuilder::new()
    }

    pub fn config(&self) -> &RetryConfig<E> {
        &self.config
    }

    /// Runs `operation` under this policy, retrying it as configured.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        crate::execute(&self.config, operation).await
    }
}

impl<E> Clone for RetryLayer<E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, E> Layer<S> for RetryLayer<E> {
    type Service = Retry<S, E>;

    fn layer(&self, service: S) -> Self::Service {
        Retry::new(service, Arc::clone(&self.config))
    }
}

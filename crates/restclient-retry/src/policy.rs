use crate::backoff::ExponentialBackoff;
use restclient_core::DaoError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Determines whether an error is of a retryable kind.
pub type RetryPredicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Errors that may carry an HTTP-style status.
///
/// Used by status-code filtering: an error that reports a status outside the
/// retryable set is returned at once.
pub trait FailureStatus {
    fn failure_status(&self) -> Option<u16>;
}

impl FailureStatus for DaoError {
    fn failure_status(&self) -> Option<u16> {
        self.status()
    }
}

pub(crate) struct StatusFilter<E> {
    pub(crate) codes: HashSet<u16>,
    pub(crate) status_of: fn(&E) -> Option<u16>,
}

/// Policy for retry behavior.
///
/// Combines the backoff, maximum attempts, retryable error kinds and the
/// optional status-code filter.
pub struct RetryPolicy<E> {
    pub(crate) max_attempts: usize,
    pub(crate) backoff: ExponentialBackoff,
    pub(crate) predicates: Vec<RetryPredicate<E>>,
    pub(crate) status_filter: Option<StatusFilter<E>>,
}

impl<E> RetryPolicy<E> {
    /// Checks if the given error should be retried.
    ///
    /// With no predicates every error kind is retryable; otherwise any
    /// matching predicate makes it retryable. A status filter then rejects
    /// errors whose status is known and not in the set.
    pub fn should_retry(&self, error: &E) -> bool {
        let kind_matches =
            self.predicates.is_empty() || self.predicates.iter().any(|retryable| retryable(error));
        if !kind_matches {
            return false;
        }
        match &self.status_filter {
            Some(filter) if !filter.codes.is_empty() => match (filter.status_of)(error) {
                Some(status) => filter.codes.contains(&status),
                None => true,
            },
            _ => true,
        }
    }

    /// Computes the delay before retry number `attempt + 1`.
    pub fn next_backoff(&self, attempt: usize) -> Duration {
        self.backoff.next_interval(attempt)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

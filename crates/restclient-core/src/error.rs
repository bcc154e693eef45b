//! Error taxonomy for the dispatch pipeline.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Shared, cloneable handle to an underlying transport error.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Errors surfaced by a DAO and its backends.
///
/// The orchestrator never catches these: whatever a backend returns reaches
/// the caller unchanged. Only a caller-side retry wrapper may catch and retry.
#[derive(Debug, Clone, Error)]
pub enum DaoError {
    /// A required setting is missing or invalid, or a backend/cache key is unknown.
    #[error("improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// Fetching a resource failed.
    ///
    /// `status` is the HTTP status when one was received and `0` when the
    /// transport failed before any status arrived.
    #[error("Error fetching {url}.  Status code: {status}.  Message: {message}.")]
    DataFailure {
        url: String,
        status: u16,
        message: String,
    },

    /// More than one fixture file matched a query-bearing URL.
    #[error("Error fetching {url}.  Multiple mock data files matched the parameters provided!")]
    AmbiguousFixture { url: String },

    /// TLS negotiation or certificate validation failed.
    #[error("TLS error fetching {url}: {source}")]
    Tls {
        url: String,
        #[source]
        source: SharedError,
    },
}

impl DaoError {
    /// Builds a [`DaoError::DataFailure`].
    pub fn data_failure(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        DaoError::DataFailure {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Builds a [`DaoError::ImproperlyConfigured`].
    pub fn improperly_configured(message: impl Into<String>) -> Self {
        DaoError::ImproperlyConfigured(message.into())
    }

    /// The status carried by a data failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DaoError::DataFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The URL the failure relates to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            DaoError::DataFailure { url, .. }
            | DaoError::AmbiguousFixture { url }
            | DaoError::Tls { url, .. } => Some(url),
            DaoError::ImproperlyConfigured(_) => None,
        }
    }

    /// True when no HTTP status was ever received.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, DaoError::DataFailure { status: 0, .. } | DaoError::Tls { .. })
    }
}

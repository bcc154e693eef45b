//! Response value type returned by every backend.

use crate::error::DaoError;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::borrow::Cow;

/// A response from a backend, the cache, or an injected fault.
///
/// Status `0` is reserved for "no transport response received". The dispatch
/// layer only changes a response through the cache post-process hook and the
/// mock edit hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Set when the response was satisfied by a cache adapter.
    pub from_cache: bool,
    /// Name of the cache implementation that produced the response (diagnostic only).
    pub cache_class: Option<String>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// The canonical fixture miss: `404 Not Found` with no headers.
    pub fn not_found() -> Self {
        Self::new(404).with_reason("Not Found")
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn is_from_cache(&self) -> bool {
        self.from_cache
    }

    /// Marks the response as produced by the named cache.
    pub fn mark_from_cache(&mut self, cache_class: &str) {
        self.from_cache = true;
        if self.cache_class.is_none() {
            self.cache_class = Some(cache_class.to_string());
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The status rounded down to its hundreds digit, e.g. `404 -> 400`.
    pub fn status_bucket(&self) -> u16 {
        (self.status / 100) * 100
    }

    /// Converts a non-2xx response into [`DaoError::DataFailure`].
    pub fn error_for_status(self, url: &str) -> Result<Self, DaoError> {
        if self.is_success() {
            return Ok(self);
        }
        let message = self
            .reason
            .clone()
            .unwrap_or_else(|| self.text().into_owned());
        Err(DaoError::data_failure(url, self.status, message))
    }
}

//! Event types for the dispatch pipeline.

use restclient_core::{ClientEvent, Method};
use std::time::{Duration, Instant};

/// Events emitted by a [`Dao`](crate::Dao).
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// A fault profile answered the request before cache or backend.
    FaultShortCircuit {
        service: String,
        timestamp: Instant,
        url: String,
        status: u16,
    },
    /// The cache adapter answered the request; the backend was not called.
    CacheHit {
        service: String,
        timestamp: Instant,
        url: String,
        cache_class: String,
    },
    /// The cache adapter replaced a fresh backend response.
    CacheReplaced {
        service: String,
        timestamp: Instant,
        url: String,
        cache_class: String,
    },
    /// Exactly one per completed dispatch, whether the backend or the cache
    /// answered it.
    Observed {
        service: String,
        timestamp: Instant,
        method: Method,
        url: String,
        status: u16,
        status_bucket: u16,
        duration: Duration,
        from_cache: bool,
    },
}

impl ClientEvent for DispatchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DispatchEvent::FaultShortCircuit { .. } => "dispatch.fault_short_circuit",
            DispatchEvent::CacheHit { .. } => "dispatch.cache_hit",
            DispatchEvent::CacheReplaced { .. } => "dispatch.cache_replaced",
            DispatchEvent::Observed { .. } => "dispatch.observed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            DispatchEvent::FaultShortCircuit { timestamp, .. }
            | DispatchEvent::CacheHit { timestamp, .. }
            | DispatchEvent::CacheReplaced { timestamp, .. }
            | DispatchEvent::Observed { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            DispatchEvent::FaultShortCircuit { service, .. }
            | DispatchEvent::CacheHit { service, .. }
            | DispatchEvent::CacheReplaced { service, .. }
            | DispatchEvent::Observed { service, .. } => service,
        }
    }
}

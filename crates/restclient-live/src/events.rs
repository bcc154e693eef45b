//! Event types for the network backend.

use restclient_core::ClientEvent;
use std::time::{Duration, Instant};

/// Events emitted by the live backend.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A connection pool was built for a service (once per service).
    PoolCreated {
        service: String,
        timestamp: Instant,
        max_connections: usize,
    },
    /// An HTTP response was received.
    ResponseReceived {
        service: String,
        timestamp: Instant,
        url: String,
        status: u16,
        duration: Duration,
    },
    /// TLS negotiation or certificate validation failed.
    TlsFailure {
        service: String,
        timestamp: Instant,
        url: String,
    },
    /// The transport failed before any status arrived (refused, timed out,
    /// too many redirects, ...).
    TransportFailure {
        service: String,
        timestamp: Instant,
        url: String,
        message: String,
    },
}

impl ClientEvent for TransportEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TransportEvent::PoolCreated { .. } => "transport.pool_created",
            TransportEvent::ResponseReceived { .. } => "transport.response_received",
            TransportEvent::TlsFailure { .. } => "transport.tls_failure",
            TransportEvent::TransportFailure { .. } => "transport.failure",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            TransportEvent::PoolCreated { timestamp, .. }
            | TransportEvent::ResponseReceived { timestamp, .. }
            | TransportEvent::TlsFailure { timestamp, .. }
            | TransportEvent::TransportFailure { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            TransportEvent::PoolCreated { service, .. }
            | TransportEvent::ResponseReceived { service, .. }
            | TransportEvent::TlsFailure { service, .. }
            | TransportEvent::TransportFailure { service, .. } => service,
        }
    }
}

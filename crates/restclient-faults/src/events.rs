//! Event types for fault injection.

use restclient_core::ClientEvent;
use std::time::{Duration, Instant};

/// Events emitted by the fault injector.
#[derive(Debug, Clone)]
pub enum FaultEvent {
    /// The call was delayed before continuing.
    LatencyInjected {
        /// Service the profile applies to
        service: String,
        /// When the event occurred
        timestamp: Instant,
        /// Amount of delay injected
        delay: Duration,
    },
    /// A forced response replaced the backend call.
    ResponseForced {
        service: String,
        timestamp: Instant,
        url: String,
        status: u16,
    },
    /// A forced status of `0` was turned into a transport failure.
    TransportFailureForced {
        service: String,
        timestamp: Instant,
        url: String,
    },
}

impl ClientEvent for FaultEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FaultEvent::LatencyInjected { .. } => "fault.latency_injected",
            FaultEvent::ResponseForced { .. } => "fault.response_forced",
            FaultEvent::TransportFailureForced { .. } => "fault.transport_failure_forced",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FaultEvent::LatencyInjected { timestamp, .. }
            | FaultEvent::ResponseForced { timestamp, .. }
            | FaultEvent::TransportFailureForced { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            FaultEvent::LatencyInjected { service, .. }
            | FaultEvent::ResponseForced { service, .. }
            | FaultEvent::TransportFailureForced { service, .. } => service,
        }
    }
}

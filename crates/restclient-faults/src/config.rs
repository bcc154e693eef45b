use crate::events::FaultEvent;
use crate::FaultInjector;
use restclient_core::events::{EventListeners, FnListener};
use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::describe_counter;
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Builder for [`FaultInjector`].
#[derive(Default)]
pub struct FaultInjectorBuilder {
    event_listeners: EventListeners<FaultEvent>,
}

impl FaultInjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for injected delays.
    ///
    /// Called with the service name and the delay, before sleeping.
    pub fn on_latency<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &FaultEvent| {
            if let FaultEvent::LatencyInjected { service, delay, .. } = event {
                f(service, *delay);
            }
        }));
        self
    }

    /// Registers a callback for forced responses, including forced transport
    /// failures (reported with status `0`).
    pub fn on_forced<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, u16) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &FaultEvent| match event {
            FaultEvent::ResponseForced {
                service, status, ..
            } => f(service, *status),
            FaultEvent::TransportFailureForced { service, .. } => f(service, 0),
            FaultEvent::LatencyInjected { .. } => {}
        }));
        self
    }

    pub fn build(self) -> FaultInjector {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "restclient_faults_injected_total",
                    "Total number of faults injected into dispatches"
                );
            });
        }
        FaultInjector::new(self.event_listeners)
    }
}

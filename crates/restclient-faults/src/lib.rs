//! Fault injection for restclient.
//!
//! Tests (and staging environments) simulate degraded upstream services by
//! attaching a [`FaultPlan`] to a [`Context`]. Every dispatch consults the
//! injector first. When a profile for the service forces a status or a body,
//! the forced response is returned before any cache or backend is touched.
//!
//! # Example
//!
//! ```rust
//! use restclient_core::{Context, FaultPlan, FaultProfile};
//! use restclient_faults::{FaultInjector, FaultScope};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), restclient_core::DaoError> {
//! let injector = FaultInjector::builder().build();
//! let ctx = Context::new();
//!
//! let plan = FaultPlan::new().service(
//!     "sws",
//!     FaultProfile::new().delay(Duration::from_millis(20)).status(503),
//! );
//! let _faults = FaultScope::set(&ctx, plan);
//!
//! let forced = injector.get_response(&ctx, "sws", "/student/v5/term").await?;
//! assert_eq!(forced.map(|r| r.status), Some(503));
//! # Ok(())
//! # }
//! ```

mod config;
mod events;

pub use config::FaultInjectorBuilder;
pub use events::FaultEvent;

use restclient_core::events::EventListeners;
use restclient_core::{Context, DaoError, FaultPlan, Response};
use std::time::Instant;

/// Consults a context's fault plan before a dispatch.
#[derive(Clone, Default)]
pub struct FaultInjector {
    event_listeners: EventListeners<FaultEvent>,
}

impl FaultInjector {
    pub(crate) fn new(event_listeners: EventListeners<FaultEvent>) -> Self {
        Self { event_listeners }
    }

    pub fn builder() -> FaultInjectorBuilder {
        FaultInjectorBuilder::new()
    }

    /// Applies the active profile for `service`, if any.
    ///
    /// Sleeps for the profile's delay, then returns:
    /// - `Ok(Some(response))` when a status or body is forced (status 200 if
    ///   only a body was given),
    /// - `Err(DataFailure { status: 0 })` when the forced status is `0`,
    /// - `Ok(None)` otherwise, meaning the dispatch proceeds normally.
    pub async fn get_response(
        &self,
        ctx: &Context,
        service: &str,
        url: &str,
    ) -> Result<Option<Response>, DaoError> {
        let Some(plan) = ctx.faults() else {
            return Ok(None);
        };
        let Some(profile) = plan.get(service) else {
            return Ok(None);
        };

        if let Some(delay) = profile.load_time().filter(|d| !d.is_zero()) {
            self.event_listeners.emit(&FaultEvent::LatencyInjected {
                service: service.to_string(),
                timestamp: Instant::now(),
                delay,
            });

            #[cfg(feature = "tracing")]
            tracing::debug!(
                service,
                url,
                delay_ms = delay.as_millis() as u64,
                "fault: latency injected"
            );

            #[cfg(feature = "metrics")]
            metrics::counter!(
                "restclient_faults_injected_total",
                "service" => service.to_string(),
                "kind" => "latency"
            )
            .increment(1);

            tokio::time::sleep(delay).await;
        }

        let body = profile.forced_body().cloned();
        let status = match (profile.forced_status(), &body) {
            (Some(status), _) => status,
            (None, Some(_)) => 200,
            (None, None) => return Ok(None),
        };

        if status == 0 {
            self.event_listeners.emit(&FaultEvent::TransportFailureForced {
                service: service.to_string(),
                timestamp: Instant::now(),
                url: url.to_string(),
            });

            #[cfg(feature = "tracing")]
            tracing::warn!(service, url, "fault: transport failure forced");

            #[cfg(feature = "metrics")]
            metrics::counter!(
                "restclient_faults_injected_total",
                "service" => service.to_string(),
                "kind" => "transport"
            )
            .increment(1);

            return Err(DaoError::data_failure(url, 0, "injected transport failure"));
        }

        self.event_listeners.emit(&FaultEvent::ResponseForced {
            service: service.to_string(),
            timestamp: Instant::now(),
            url: url.to_string(),
            status,
        });

        #[cfg(feature = "tracing")]
        tracing::warn!(service, url, status, "fault: response forced");

        #[cfg(feature = "metrics")]
        metrics::counter!(
            "restclient_faults_injected_total",
            "service" => service.to_string(),
            "kind" => "response"
        )
        .increment(1);

        let mut response = Response::new(status);
        if let Some(body) = body {
            response.body = body;
        }
        Ok(Some(response))
    }
}

/// Sets a fault plan on a context for as long as the guard lives.
///
/// Dropping the guard clears the context's faults, including when the
/// guarded unit of work panics.
#[must_use = "faults are cleared as soon as the guard is dropped"]
pub struct FaultScope<'a> {
    ctx: &'a Context,
}

impl<'a> FaultScope<'a> {
    pub fn set(ctx: &'a Context, plan: FaultPlan) -> Self {
        ctx.set_faults(plan);
        Self { ctx }
    }
}

impl Drop for FaultScope<'_> {
    fn drop(&mut self) {
        self.ctx.clear_faults();
    }
}

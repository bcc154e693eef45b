//! Fault profiles used to simulate degraded services.

use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

/// A simulated degradation for one service.
///
/// All parts are optional. A profile with only a delay slows the call down
/// and then lets it proceed normally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultProfile {
    delay: Option<Duration>,
    status: Option<u16>,
    body: Option<Bytes>,
}

impl FaultProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer with this status. `0` simulates a transport failure.
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Answer with this body (status defaults to 200).
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn load_time(&self) -> Option<Duration> {
        self.delay
    }

    pub fn forced_status(&self) -> Option<u16> {
        self.status
    }

    pub fn forced_body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// Fault profiles keyed by service name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultPlan {
    services: HashMap<String, FaultProfile>,
}

impl FaultPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the profile for `service`.
    pub fn service(mut self, service: impl Into<String>, profile: FaultProfile) -> Self {
        self.services.insert(service.into(), profile);
        self
    }

    pub fn get(&self, service: &str) -> Option<&FaultProfile> {
        self.services.get(service)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

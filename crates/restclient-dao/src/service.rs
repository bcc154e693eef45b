use restclient_core::{HeaderMap, Method, Request, Response};
use std::path::PathBuf;

/// Per-service behavior plugged into a [`Dao`](crate::Dao).
///
/// Only [`service_name`](ServiceDefinition::service_name) is required; every
/// other hook has a pass-through default.
pub trait ServiceDefinition: Send + Sync + 'static {
    /// Short name used for settings prefixes, fixture paths, pools and metrics.
    fn service_name(&self) -> &str;

    /// Extra headers for a request (an OAuth bearer token, for instance).
    ///
    /// Returned headers replace same-named request headers.
    fn custom_headers(&self, _request: &Request) -> Option<HeaderMap> {
        None
    }

    /// Edits a fixture response in place, e.g. to shift dates relative to now.
    ///
    /// Runs after every mock load, and after live loads only when
    /// [`edit_live_responses`](ServiceDefinition::edit_live_responses) is true.
    fn edit_mock_response(&self, _request: &Request, _response: &mut Response) {}

    fn edit_live_responses(&self) -> bool {
        false
    }

    /// Fallback for settings missing at both the service and global level.
    fn default_service_setting(&self, _key: &str) -> Option<String> {
        None
    }

    /// Fixture roots shipped with this service's client, searched after the
    /// registered roots.
    fn service_mock_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Whether the cache adapter sees this request. GET only by default.
    fn is_cacheable(&self, request: &Request) -> bool {
        request.method == Method::Get
    }
}

/// A [`ServiceDefinition`] with no hooks beyond its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedService(String);

impl NamedService {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl ServiceDefinition for NamedService {
    fn service_name(&self) -> &str {
        &self.0
    }
}

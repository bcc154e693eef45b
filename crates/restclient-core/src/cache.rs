//! The pluggable cache capability consulted around backend calls.

use crate::response::Response;
use futures::future::BoxFuture;
use http::HeaderMap;

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// A complete response; the backend is not called.
    Response(Response),
    /// Revised request headers (e.g. conditional-request validators) to send
    /// in place of the originals.
    Headers(HeaderMap),
}

/// A cache implementation shared by every DAO that selects it.
///
/// Only cacheable requests reach the adapter. Implementations are consulted
/// concurrently and must do their own synchronization.
pub trait CacheAdapter: Send + Sync {
    /// Name reported in dispatch logs.
    fn name(&self) -> &str;

    fn lookup<'a>(
        &'a self,
        service: &'a str,
        url: &'a str,
        headers: &'a HeaderMap,
    ) -> BoxFuture<'a, Option<CacheLookup>>;

    /// Called with a fresh backend response. Returning `Some` replaces it.
    fn process_response<'a>(
        &'a self,
        service: &'a str,
        url: &'a str,
        response: &'a Response,
    ) -> BoxFuture<'a, Option<Response>>;

    fn invalidate<'a>(&'a self, service: &'a str, url: &'a str) -> BoxFuture<'a, ()>;
}

/// A cache that never caches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl CacheAdapter for NoCache {
    fn name(&self) -> &str {
        "NoCache"
    }

    fn lookup<'a>(
        &'a self,
        _service: &'a str,
        _url: &'a str,
        _headers: &'a HeaderMap,
    ) -> BoxFuture<'a, Option<CacheLookup>> {
        Box::pin(async { None })
    }

    fn process_response<'a>(
        &'a self,
        _service: &'a str,
        _url: &'a str,
        _response: &'a Response,
    ) -> BoxFuture<'a, Option<Response>> {
        Box::pin(async { None })
    }

    fn invalidate<'a>(&'a self, _service: &'a str, _url: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async {})
    }
}

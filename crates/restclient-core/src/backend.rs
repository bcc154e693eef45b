//! The backend strategy seam.

use crate::context::Context;
use crate::error::DaoError;
use crate::request::Request;
use crate::response::Response;
use futures::future::BoxFuture;

/// Whether a backend talks to the network.
///
/// Mock backends get the configured mock delay and the mock edit hook after
/// every load. Live backends only get the edit hook when a service opts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Live,
    Mock,
}

/// Something that can answer a request for one service.
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn load<'a>(
        &'a self,
        ctx: &'a Context,
        request: &'a Request,
    ) -> BoxFuture<'a, Result<Response, DaoError>>;
}

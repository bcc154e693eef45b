use restclient_core::{Context, DaoError, Settings};
use std::future::Future;
use tokio::task::JoinHandle;

/// Background work that warms caches ahead of need.
///
/// The work runs under a child of the caller's context, so it sees the
/// caller's fault plan but has its own request-scoped cache. It is spawned
/// onto the tokio runtime when threading is enabled and run to completion
/// inside [`start`](Prefetch::start) otherwise. Errors are logged at debug
/// and dropped: the caller repeats the same fetch later and handles the
/// failure there.
///
/// `DISABLE_THREADING=true` always runs inline. Otherwise `USE_THREADING`
/// (default false) decides. An unparsable value for either fails `start`
/// before the work runs.
#[derive(Debug)]
pub struct Prefetch {
    handle: Option<JoinHandle<()>>,
}

impl Prefetch {
    pub fn threading_enabled(settings: &Settings) -> Result<bool, DaoError> {
        let disabled = settings.get_bool("DISABLE_THREADING")?.unwrap_or(false);
        let enabled = settings.get_bool("USE_THREADING")?.unwrap_or(false);
        Ok(enabled && !disabled)
    }

    pub async fn start<F, Fut, T>(settings: &Settings, ctx: &Context, work: F) -> Result<Self, DaoError>
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future<Output = Result<T, DaoError>> + Send + 'static,
        T: Send + 'static,
    {
        let threaded = Self::threading_enabled(settings)?;
        let fut = run(work(ctx.child()));
        if threaded {
            Ok(Self {
                handle: Some(tokio::spawn(fut)),
            })
        } else {
            fut.await;
            Ok(Self { handle: None })
        }
    }

    pub fn is_threaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Waits for spawned work. Returns false if it panicked.
    pub async fn join(self) -> bool {
        match self.handle {
            Some(handle) => match handle.await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(error = %e, "prefetch task did not complete");
                    false
                }
            },
            None => true,
        }
    }
}

async fn run<T, Fut>(fut: Fut)
where
    Fut: Future<Output = Result<T, DaoError>>,
{
    if let Err(e) = fut.await {
        tracing::debug!(error = %e, "prefetch failed, error swallowed");
    }
}

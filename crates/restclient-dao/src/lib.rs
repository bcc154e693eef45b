//! Per-service dispatch orchestrator for restclient.
//!
//! A [`Dao`] is the façade a service client talks to. It owns the backend
//! chosen by `DAO_CLASS` (fixture files by default, the network with
//! `Live`), the cache adapter chosen by `DAO_CACHE_CLASS`, and the hooks of a
//! [`ServiceDefinition`]. Every verb call runs fault injection, cache lookup,
//! the backend, response editing, cache post-processing and sampled timing
//! logs in that order.
//!
//! # Example
//!
//! ```no_run
//! use restclient_core::{Context, HeaderMap, Settings};
//! use restclient_dao::{Dao, NamedService, Registry};
//!
//! # async fn example() -> Result<(), restclient_core::DaoError> {
//! let registry = Registry::new();
//! registry.register_mock_path("/srv/app/resources");
//!
//! let sws = Dao::builder(NamedService::new("sws"))
//!     .registry(registry)
//!     .settings(Settings::from_env())
//!     .build()?;
//!
//! let ctx = Context::new();
//! let _scope = ctx.enter_local_cache();
//! let term = sws.get(&ctx, "/student/v5/term/current.json", HeaderMap::new()).await?;
//! println!("{} {}", term.status, term.text());
//! # Ok(())
//! # }
//! ```
//!
//! # Tower
//!
//! `Dao` is a `tower::Service<Call>`, so the caller-facing retry layer (or any
//! other middleware) stacks on top of it:
//!
//! ```no_run
//! use restclient_core::{Context, DaoError};
//! use restclient_dao::{Call, Dao, NamedService};
//! use restclient_retry::RetryLayer;
//! use std::time::Duration;
//! use tower::{ServiceBuilder, ServiceExt};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dao = Dao::builder(NamedService::new("sws")).build()?;
//! let service = ServiceBuilder::new()
//!     .layer(
//!         RetryLayer::<DaoError>::builder()
//!             .status_codes([503])
//!             .delay(Duration::from_millis(100))
//!             .build()?,
//!     )
//!     .service(dao);
//!
//! let response = service.oneshot(Call::get(&Context::new(), "/student/v5/term/current.json")).await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

mod config;
mod dao;
mod events;
mod log_policy;
mod prefetch;
mod registry;
mod service;

pub use config::DaoBuilder;
pub use dao::{Call, Dao};
pub use events::DispatchEvent;
pub use log_policy::LogPolicy;
pub use prefetch::Prefetch;
pub use registry::{BackendFactory, Registry};
pub use service::{NamedService, ServiceDefinition};

//! Network backend for restclient.
//!
//! Each service gets one lazily built [`ConnectionPool`]: a rustls-backed
//! HTTP client bounded to `POOL_SIZE` concurrent requests, created from the
//! service's settings the first time it is used and shared by every DAO for
//! that service afterwards.
//!
//! ## Settings
//!
//! | Key | Default |
//! |-----|---------|
//! | `{SERVICE}_HOST` | required |
//! | `{SERVICE}_VERIFY_HTTPS` | `true` |
//! | `{SERVICE}_CERT_FILE`, `{SERVICE}_KEY_FILE` | none |
//! | `CA_BUNDLE` | bundled web roots |
//! | `{SERVICE}_TIMEOUT` | `DEFAULT_TIMEOUT`, then 2 seconds |
//! | `{SERVICE}_CONNECT_TIMEOUT` | `DEFAULT_CONNECT_TIMEOUT`, then the read timeout |
//! | `{SERVICE}_POOL_SIZE` | `DEFAULT_POOL_SIZE`, then 9 |
//!
//! ## Example
//!
//! ```no_run
//! use restclient_core::{Context, Request, Settings};
//! use restclient_live::{LiveBackend, PoolRegistry};
//!
//! # async fn example() -> Result<(), restclient_core::DaoError> {
//! let settings = Settings::builder()
//!     .set("SWS_HOST", "https://sws.example.edu")
//!     .build();
//! let backend = LiveBackend::new(settings.for_service("sws"), PoolRegistry::new());
//!
//! let response = backend.send(&Request::get("/student/v5/term/current.json")).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//!
//! With the `metrics` feature:
//! - `restclient_request_timeout_total{service}`: transport failures without a status
//! - `restclient_request_ssl_error_total{service}`: TLS failures

mod backend;
mod config;
mod events;
mod pool;
mod registry;

pub use backend::{LiveBackend, LiveBackendBuilder};
pub use config::{PoolConfig, DEFAULT_POOL_SIZE, DEFAULT_TIMEOUT};
pub use events::TransportEvent;
pub use pool::ConnectionPool;
pub use registry::PoolRegistry;

//! Per-service REST client dispatch.
//!
//! `restclient` routes each request for a named upstream service through
//! fault injection, a pluggable cache, and either recorded fixture files or
//! a pooled HTTPS client, and reports the outcome through events, metrics
//! and sampled timing logs. Each component is available as an individual
//! crate and as a feature of this one.
//!
//! # Components
//!
//! - **DAO** (`dao` feature, default): the per-service orchestrator
//! - **Faults** (`faults` feature): simulated latency and forced responses
//! - **Fixture** (`fixture` feature): file-backed backend
//! - **Live** (`live` feature): pooled rustls HTTP backend
//! - **Retry** (`retry` feature): caller-facing retry policy and tower layer
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! restclient = { version = "0.3", features = ["retry", "metrics"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "dao")]
//! # {
//! use restclient::core::{Context, HeaderMap, Settings};
//! use restclient::dao::{Dao, NamedService, Registry};
//!
//! # async fn example() -> Result<(), restclient::core::DaoError> {
//! let registry = Registry::new();
//! registry.register_mock_path("resources");
//!
//! let pws = Dao::builder(NamedService::new("pws"))
//!     .registry(registry)
//!     .settings(Settings::from_env())
//!     .build()?;
//!
//! let person = pws
//!     .get(&Context::new(), "/identity/v2/person/javerage/full.json", HeaderMap::new())
//!     .await?
//!     .error_for_status("/identity/v2/person/javerage/full.json")?;
//! println!("{}", person.text());
//! # Ok(())
//! # }
//! # }
//! ```

// Re-export core (always available)
pub use restclient_core as core;

// Re-export components based on features
#[cfg(feature = "dao")]
pub use restclient_dao as dao;

#[cfg(feature = "faults")]
pub use restclient_faults as faults;

#[cfg(feature = "fixture")]
pub use restclient_fixture as fixture;

#[cfg(feature = "live")]
pub use restclient_live as live;

#[cfg(feature = "retry")]
pub use restclient_retry as retry;

//! Core infrastructure for restclient.
//!
//! This crate provides the pieces every other restclient crate builds on:
//! - Event system for observability
//! - The [`DaoError`] taxonomy
//! - [`Request`] / [`Response`] value types
//! - [`Settings`] with per-service key resolution
//! - The explicit per-unit-of-work [`Context`] (fault plan and request-scoped memo)
//! - The [`Backend`] and [`CacheAdapter`] seams

pub mod backend;
pub mod cache;
pub mod context;
pub mod error;
pub mod events;
pub mod fault;
pub mod request;
pub mod response;
pub mod scoped_cache;
pub mod settings;

pub use backend::{Backend, BackendKind};
pub use cache::{CacheAdapter, CacheLookup, NoCache};
pub use context::Context;
pub use error::{DaoError, SharedError};
pub use events::{ClientEvent, EventListener, EventListeners, FnListener};
pub use fault::{FaultPlan, FaultProfile};
pub use request::{Method, Request};
pub use response::Response;
pub use scoped_cache::{ScopeGuard, ScopedCache};
pub use settings::{DefaultSettingFn, ServiceSettings, Settings, SettingsBuilder};

pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderName, HeaderValue};

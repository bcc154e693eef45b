//! Test organization:
//! - fixture_files.rs: fixture resolution through a mock DAO
//! - hooks.rs: service definition hooks, mock delay and backend selection
//! - cache.rs: cache adapter short-circuits, replacement and invalidation
//! - faults.rs: fault injection through the DAO
//! - logging.rs: sampled timing log lines
//! - prefetch.rs: background prefetch helper

mod faults;
mod fixture_files;
mod hooks;

use restclient_core::Settings;
use restclient_dao::{Dao, Registry, ServiceDefinition};
use std::path::PathBuf;

pub(crate) fn resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources")
}

pub(crate) fn override_resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resource_override")
}

/// The `testing` service, shipping the checked-in fixtures.
pub(crate) struct Testing;

impl ServiceDefinition for Testing {
    fn service_name(&self) -> &str {
        "testing"
    }

    fn service_mock_paths(&self) -> Vec<PathBuf> {
        vec![resources()]
    }
}

pub(crate) fn testing_dao(registry: &Registry, settings: Settings) -> Dao {
    Dao::builder(Testing)
        .registry(registry.clone())
        .settings(settings)
        .build()
        .unwrap()
}

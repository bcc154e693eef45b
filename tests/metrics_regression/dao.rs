//! Dispatch metrics regression tests

use super::helpers::*;
use restclient_core::{Context, HeaderMap, Settings};
use restclient_dao::{Dao, NamedService, Registry};
use serial_test::serial;
use std::fs;

#[tokio::test]
#[serial]
async fn dispatch_metrics_exist() {
    init_recorder();

    let dir = tempfile::TempDir::new().unwrap();
    let fixture = dir.path().join("metrics_dispatch/file/status.json");
    fs::create_dir_all(fixture.parent().unwrap()).unwrap();
    fs::write(&fixture, "{}").unwrap();

    let registry = Registry::new();
    registry.register_mock_path(dir.path());
    let dao = Dao::builder(NamedService::new("metrics_dispatch"))
        .registry(registry)
        .settings(Settings::default())
        .build()
        .unwrap();

    dao.get(&Context::new(), "/status.json", HeaderMap::new()).await.unwrap();
    dao.get(&Context::new(), "/missing.json", HeaderMap::new()).await.unwrap();

    assert_histogram_exists("restclient_request_duration_seconds");
    assert_metric_has_label(
        "restclient_request_duration_seconds",
        "service",
        "metrics_dispatch",
    );

    assert_histogram_exists("restclient_response_status_code");
    assert_metric_has_label("restclient_response_status_code", "service", "metrics_dispatch");
}

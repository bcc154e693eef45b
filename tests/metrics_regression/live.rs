//! Live transport metrics regression tests

use super::helpers::*;
use restclient_core::{Request, Settings};
use restclient_live::{LiveBackend, PoolRegistry};
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
#[serial]
async fn transport_failure_metrics_exist() {
    init_recorder();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let settings = Settings::builder()
        .set("METRICS_LIVE_HOST", format!("http://{addr}"))
        .build();
    let backend = LiveBackend::new(settings.for_service("metrics_live"), PoolRegistry::new());
    assert!(backend.send(&Request::get("/refused")).await.is_err());

    assert_counter_exists("restclient_request_timeout_total");
    assert_metric_has_label("restclient_request_timeout_total", "service", "metrics_live");
}

#[tokio::test]
#[serial]
async fn tls_failure_metrics_exist() {
    init_recorder();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
    });

    let settings = Settings::builder()
        .set("METRICS_TLS_HOST", format!("https://{addr}"))
        .build();
    let backend = LiveBackend::new(settings.for_service("metrics_tls"), PoolRegistry::new());
    assert!(backend.send(&Request::get("/secure")).await.is_err());

    assert_counter_exists("restclient_request_ssl_error_total");
    assert_metric_has_label("restclient_request_ssl_error_total", "service", "metrics_tls");
}

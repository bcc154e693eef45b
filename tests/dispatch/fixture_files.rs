//! Fixture resolution through a mock DAO.

use super::{override_resources, resources, testing_dao};
use restclient_core::{Context, DaoError, HeaderMap, Settings};
use restclient_dao::Registry;
use std::fs;

fn dao() -> restclient_dao::Dao {
    testing_dao(&Registry::new(), Settings::default())
}

async fn get(url: &str) -> Result<restclient_core::Response, DaoError> {
    dao().get(&Context::new(), url, HeaderMap::new()).await
}

#[tokio::test]
async fn found_resource() {
    let response = get("/found.json").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(&response.body[..], b"{\"OK\": true }\n");
    assert!(!response.is_from_cache());
}

#[tokio::test]
async fn missing_resource() {
    let response = get("/missing.json").await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.reason.as_deref(), Some("Not Found"));
    assert!(response.headers.is_empty());
}

#[tokio::test]
async fn sidecar_headers_and_status() {
    let response = get("/with_headers.json").await.unwrap();
    assert_eq!(response.status, 202);
    assert_eq!(response.header("Custom"), Some("My Custom Value"));
    assert_eq!(response.header("custom"), Some("My Custom Value"));
    assert_eq!(response.header("X-Data-Source"), Some("testing file mock data"));
}

#[tokio::test]
async fn flat_sidecar() {
    let response = get("/with_only_headers.json").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Custom2"), Some("My Custom Value 2"));
}

#[tokio::test]
async fn registered_roots_precede_service_roots() {
    let registry = Registry::new();
    let dao = testing_dao(&registry, Settings::default());

    let response = dao.get(&Context::new(), "/override.json", HeaderMap::new()).await.unwrap();
    assert_eq!(&response.body[..], b"{\"override\": false }\n");

    registry.register_mock_path(override_resources());

    let response = dao.get(&Context::new(), "/override.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(&response.body[..], b"{\"override\": true }\n");

    // Files missing from the override root still come from the service root.
    let response = dao.get(&Context::new(), "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn binary_data() {
    let response = get("/image.jpg").await.unwrap();
    assert_eq!(response.status, 200);
    let expected = fs::read(resources().join("testing/file/image.jpg")).unwrap();
    assert_eq!(&response.body[..], &expected[..]);
}

#[tokio::test]
async fn parameter_with_suffix() {
    let response = get("/search?first=a&second=b.POST").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "{\"search\": \"post marker\"}\n");
}

#[tokio::test]
async fn out_of_order_params() {
    let response = get("/search?first=a&second=b&third=c&fourth=d").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "{\"search\": \"four params\"}\n");
    assert_eq!(response.header("X-Matched"), Some("permutation"));
}

#[tokio::test]
async fn extra_params_do_not_match() {
    let response = get("/search?first=a&second=b&third=c&fourth=d&fifth=e")
        .await
        .unwrap();
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn quoted_params() {
    let response = get("/search?first=a&second=a%3Ab%3Ac").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "{\"search\": \"quoted\"}\n");
}

#[tokio::test]
async fn multiple_matches_are_ambiguous() {
    let err = get("/search?first=a&second=b").await.unwrap_err();
    assert!(matches!(err, DaoError::AmbiguousFixture { ref url } if url == "/search?first=a&second=b"));
    assert!(err.to_string().contains("Multiple mock data files"));
}

#[tokio::test]
async fn quoted_directory_name() {
    let response = get("/test%3folder/test.json").await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "{\"folder\": \"quoted\"}\n");
}

#[tokio::test]
async fn directory_index() {
    let response = get("/docs").await.unwrap();
    assert_eq!(response.status, 200);
    assert!(response.text().contains("docs"));
}

#[tokio::test]
async fn resolution_is_deterministic() {
    let dao = dao();
    let url = "/search?fourth=d&third=c&second=b&first=a";
    let first = dao.get(&Context::new(), url, HeaderMap::new()).await.unwrap();
    for _ in 0..5 {
        let again = dao.get(&Context::new(), url, HeaderMap::new()).await.unwrap();
        assert_eq!(again.body, first.body);
        assert_eq!(again.headers, first.headers);
        assert_eq!(again.status, first.status);
    }
}

#[tokio::test]
async fn repeated_loads_are_memoized_within_a_scope() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("testing/file/live.json");
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, "first").unwrap();

    let registry = Registry::new();
    registry.register_mock_path(dir.path());
    let dao = testing_dao(&registry, Settings::default());
    let ctx = Context::new();

    {
        let _scope = ctx.enter_local_cache();
        let first = dao.get(&ctx, "/live.json", HeaderMap::new()).await.unwrap();
        fs::write(&file, "second").unwrap();
        let again = dao.get(&ctx, "/live.json", HeaderMap::new()).await.unwrap();
        assert_eq!(first.text(), "first");
        assert_eq!(again.text(), "first");
    }

    let outside = dao.get(&ctx, "/live.json", HeaderMap::new()).await.unwrap();
    assert_eq!(outside.text(), "second");
}

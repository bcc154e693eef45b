//! Service definition hooks, mock delay and backend selection.

use super::{resources, testing_dao};
use restclient_core::{
    BackendKind, Bytes, Context, HeaderMap, HeaderValue, Request, Response, Settings,
};
use restclient_dao::{Dao, NamedService, Registry, ServiceDefinition};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Editing {
    edits: Arc<AtomicUsize>,
}

impl ServiceDefinition for Editing {
    fn service_name(&self) -> &str {
        "testing"
    }

    fn service_mock_paths(&self) -> Vec<PathBuf> {
        vec![resources()]
    }

    fn custom_headers(&self, request: &Request) -> Option<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-request-url",
            HeaderValue::from_str(&request.url).ok()?,
        );
        Some(headers)
    }

    fn edit_mock_response(&self, request: &Request, response: &mut Response) {
        self.edits.fetch_add(1, Ordering::SeqCst);
        if request.url == "/found.json" {
            response.body = Bytes::from_static(b"{\"OK\": \"edited\"}");
        }
    }

    fn default_service_setting(&self, key: &str) -> Option<String> {
        (key == "MOCKDATA_DELAY").then(|| "0.2".to_string())
    }
}

#[tokio::test]
async fn mock_responses_are_edited() {
    let edits = Arc::new(AtomicUsize::new(0));
    let dao = Dao::builder(Editing {
        edits: Arc::clone(&edits),
    })
    .settings(Settings::builder().set("MOCKDATA_DELAY", "0").build())
    .build()
    .unwrap();

    let response = dao.get(&Context::new(), "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.text(), "{\"OK\": \"edited\"}");

    // Misses are edited too.
    let missing = dao.get(&Context::new(), "/missing.json", HeaderMap::new()).await.unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(edits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mock_delay_from_default_hook() {
    let dao = Dao::builder(Editing {
        edits: Arc::new(AtomicUsize::new(0)),
    })
    .build()
    .unwrap();

    let start = Instant::now();
    dao.get(&Context::new(), "/found.json", HeaderMap::new()).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn mock_delay_from_settings() {
    let dao = testing_dao(
        &Registry::new(),
        Settings::builder().set("MOCKDATA_DELAY", "0.15").build(),
    );
    let start = Instant::now();
    let response = dao.get(&Context::new(), "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[test]
fn dao_class_resolution() {
    let kind = |settings: Settings| {
        Dao::builder(NamedService::new("sws"))
            .settings(settings)
            .build()
            .unwrap()
            .backend_kind()
    };

    assert_eq!(kind(Settings::default()), BackendKind::Mock);
    assert_eq!(
        kind(Settings::builder().set("DAO_CLASS", "Live").set("SWS_HOST", "http://localhost").build()),
        BackendKind::Live
    );
    // The service key wins over the global key.
    assert_eq!(
        kind(
            Settings::builder()
                .set("DAO_CLASS", "Live")
                .set("SWS_DAO_CLASS", "Mock")
                .build()
        ),
        BackendKind::Mock
    );
    assert_eq!(
        kind(Settings::builder().set("RESTCLIENTS_SWS_DAO_CLASS", "restclients.dao_implementation.sws.Live").build()),
        BackendKind::Live
    );
    assert_eq!(
        kind(Settings::builder().set("DAO_CLASS", "Live").build().use_mock(&["sws"])),
        BackendKind::Mock
    );
}

#[test]
fn legacy_names_are_per_service() {
    let err = Dao::builder(NamedService::new("sws"))
        .settings(
            Settings::builder()
                .set("SWS_DAO_CLASS", "restclients.dao_implementation.pws.Live")
                .build(),
        )
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("restclients.dao_implementation.pws.Live"));
}

#[tokio::test]
async fn custom_backend_by_name() {
    struct Echo;

    impl restclient_core::Backend for Echo {
        fn kind(&self) -> BackendKind {
            BackendKind::Live
        }

        fn load<'a>(
            &'a self,
            _ctx: &'a Context,
            request: &'a Request,
        ) -> futures::future::BoxFuture<'a, Result<Response, restclient_core::DaoError>> {
            let echoed = request
                .headers
                .get("x-request-url")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Box::pin(async move { Ok(Response::new(200).with_body(echoed)) })
        }
    }

    let registry = Registry::new();
    registry.register_backend("echo", |_settings: &restclient_core::ServiceSettings| {
        Arc::new(Echo) as Arc<dyn restclient_core::Backend>
    });

    let dao = Dao::builder(Editing {
        edits: Arc::new(AtomicUsize::new(0)),
    })
    .registry(registry)
    .settings(Settings::builder().set("TESTING_DAO_CLASS", "echo").build())
    .build()
    .unwrap();

    let response = dao.get(&Context::new(), "/echo/me", HeaderMap::new()).await.unwrap();
    assert_eq!(response.text(), "/echo/me");
}

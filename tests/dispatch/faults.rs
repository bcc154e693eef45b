//! Fault injection through the DAO.

use super::testing_dao;
use restclient_core::{Context, DaoError, FaultPlan, FaultProfile, HeaderMap, Settings};
use restclient_dao::{Dao, DispatchEvent, Registry};
use restclient_faults::{FaultInjector, FaultScope};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn dao() -> Dao {
    testing_dao(&Registry::new(), Settings::default())
}

fn plan(profile: FaultProfile) -> FaultPlan {
    FaultPlan::new().service("testing", profile)
}

#[tokio::test]
async fn forced_status_short_circuits() {
    let ctx = Context::new();
    let _faults = FaultScope::set(&ctx, plan(FaultProfile::new().status(503)));

    let response = dao().get(&ctx, "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 503);
    assert!(response.body.is_empty());
    assert!(!response.is_from_cache());
}

#[tokio::test]
async fn forced_body_defaults_to_ok() {
    let ctx = Context::new();
    let _faults = FaultScope::set(&ctx, plan(FaultProfile::new().body("{\"forced\": 1}")));

    let response = dao().get(&ctx, "/missing.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "{\"forced\": 1}");
}

#[tokio::test]
async fn status_zero_is_a_transport_failure() {
    let ctx = Context::new();
    let _faults = FaultScope::set(&ctx, plan(FaultProfile::new().status(0)));

    let err = dao().get(&ctx, "/found.json", HeaderMap::new()).await.unwrap_err();
    match err {
        DaoError::DataFailure { url, status, .. } => {
            assert_eq!(url, "/found.json");
            assert_eq!(status, 0);
        }
        other => panic!("expected a data failure, got {other:?}"),
    }
}

#[tokio::test]
async fn delay_only_proceeds_to_the_backend() {
    let ctx = Context::new();
    let _faults = FaultScope::set(
        &ctx,
        plan(FaultProfile::new().delay(Duration::from_millis(150))),
    );

    let start = Instant::now();
    let response = dao().get(&ctx, "/found.json", HeaderMap::new()).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(response.status, 200);
    assert_eq!(&response.body[..], b"{\"OK\": true }\n");
}

#[tokio::test]
async fn other_services_are_unaffected() {
    let ctx = Context::new();
    let _faults = FaultScope::set(
        &ctx,
        FaultPlan::new().service("sws", FaultProfile::new().status(500)),
    );

    let response = dao().get(&ctx, "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn scope_clears_on_drop() {
    let ctx = Context::new();
    let dao = dao();
    {
        let _faults = FaultScope::set(&ctx, plan(FaultProfile::new().status(500)));
        let response = dao.get(&ctx, "/found.json", HeaderMap::new()).await.unwrap();
        assert_eq!(response.status, 500);
    }
    let response = dao.get(&ctx, "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn child_inherits_but_grandchild_does_not() {
    let ctx = Context::new();
    let _faults = FaultScope::set(&ctx, plan(FaultProfile::new().status(418)));
    let dao = dao();

    let child = ctx.child();
    let response = dao.get(&child, "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 418);

    let grandchild = child.child();
    let response = dao.get(&grandchild, "/found.json", HeaderMap::new()).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn short_circuits_are_reported() {
    let forced = Arc::new(AtomicUsize::new(0));
    let short_circuits = Arc::new(Mutex::new(Vec::new()));

    let counter = Arc::clone(&forced);
    let recorded = Arc::clone(&short_circuits);
    let dao = Dao::builder(super::Testing)
        .fault_injector(
            FaultInjector::builder()
                .on_forced(move |_service: &str, _status: u16| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .build(),
        )
        .on_event(move |event: &DispatchEvent| {
            if let DispatchEvent::FaultShortCircuit { url, status, .. } = event {
                recorded.lock().unwrap().push((url.clone(), *status));
            }
        })
        .build()
        .unwrap();

    let ctx = Context::new();
    let _faults = FaultScope::set(&ctx, plan(FaultProfile::new().status(502)));
    dao.get(&ctx, "/found.json", HeaderMap::new()).await.unwrap();

    assert_eq!(forced.load(Ordering::SeqCst), 1);
    assert_eq!(
        *short_circuits.lock().unwrap(),
        vec![("/found.json".to_string(), 502)]
    );
}

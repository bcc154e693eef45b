//! Core retry behavior: success after failures, exhaustion, kind and status
//! filtering, and the Tower service form.

use restclient_core::DaoError;
use restclient_retry::RetryLayer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};

fn fast() -> restclient_retry::RetryConfigBuilder<DaoError> {
    RetryLayer::<DaoError>::builder().delay(Duration::from_millis(1))
}

fn unavailable() -> DaoError {
    DaoError::data_failure("/student/v5/term/current.json", 503, "Service Unavailable")
}

#[tokio::test]
async fn succeeds_after_two_failures() {
    let calls = AtomicUsize::new(0);
    let retry = fast().build().unwrap();

    let value = retry
        .run(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(unavailable())
                } else {
                    Ok("term")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "term");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn always_failing_exhausts_four_attempts() {
    let calls = AtomicUsize::new(0);
    let exhausted_after = Arc::new(AtomicUsize::new(0));
    let recorded = Arc::clone(&exhausted_after);
    let retry = fast()
        .on_error(move |attempts| recorded.store(attempts, Ordering::SeqCst))
        .build()
        .unwrap();

    let err = retry
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(unavailable()) }
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(exhausted_after.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn undeclared_kinds_are_not_retried() {
    let calls = AtomicUsize::new(0);
    let ignored = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ignored);
    let retry = fast()
        .retry_on(|e: &DaoError| matches!(e, DaoError::DataFailure { .. }))
        .on_ignored_error(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    let err = retry
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DaoError::improperly_configured("SWS_HOST is required")) }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DaoError::ImproperlyConfigured(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ignored.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn statuses_outside_the_set_are_returned_at_once() {
    let calls = AtomicUsize::new(0);
    let retry = fast().status_codes([500]).build().unwrap();

    let err = retry
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DaoError::data_failure("/x", 404, "Not Found")) }
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn statuses_in_the_set_are_retried() {
    let calls = AtomicUsize::new(0);
    let retry = fast().status_codes([500]).max_attempts(3).build().unwrap();

    let _ = retry
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DaoError::data_failure("/x", 500, "Internal Server Error")) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn errors_without_status_pass_the_filter() {
    let calls = AtomicUsize::new(0);
    let retry = fast().status_codes([503]).max_attempts(2).build().unwrap();

    let _ = retry
        .run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DaoError::AmbiguousFixture { url: "/x".into() }) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn success_reports_attempt_count() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let recorded = Arc::clone(&attempts);
    let calls = AtomicUsize::new(0);
    let retry = fast()
        .on_success(move |n| recorded.store(n, Ordering::SeqCst))
        .build()
        .unwrap();

    retry
        .run(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(unavailable())
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn wraps_a_tower_service() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&calls);

    let service = tower::service_fn(move |url: String| {
        let cc = Arc::clone(&cc);
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DaoError::data_failure(url, 0, "connection refused"))
            } else {
                Ok(format!("loaded {url}"))
            }
        }
    });

    let mut service = fast().build().unwrap().layer(service);
    let response = service
        .ready()
        .await
        .unwrap()
        .call("/notes".to_string())
        .await
        .unwrap();

    assert_eq!(response, "loaded /notes");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

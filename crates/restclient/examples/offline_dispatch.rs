//! Example serving a service from fixture files, then riding out an injected
//! outage with the caller-facing retry policy.

use restclient::core::{Context, DaoError, FaultPlan, FaultProfile, HeaderMap, Settings};
use restclient::dao::{Dao, NamedService, Registry};
use restclient::retry::RetryLayer;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Lay out <root>/sws/file/student/v5/term/current.json
    let root = std::env::temp_dir().join("restclient-offline-dispatch");
    let term_dir = root.join("sws/file/student/v5/term");
    fs::create_dir_all(&term_dir)?;
    fs::write(term_dir.join("current.json"), r#"{"year": 2013, "quarter": "spring"}"#)?;
    fs::write(
        term_dir.join("current.json.http-headers"),
        r#"{"headers": {"Cache-Control": "max-age=60"}, "status": 200}"#,
    )?;

    let registry = Registry::new();
    registry.register_mock_path(&root);

    let sws = Dao::builder(NamedService::new("sws"))
        .registry(registry)
        .settings(Settings::builder().set("SWS_DAO_CLASS", "Mock").build())
        .on_observed(|duration, bucket| println!("  [Observed] {bucket} in {duration:?}"))
        .build()?;

    let url = "/student/v5/term/current.json";
    let ctx = Context::new();

    println!("Plain fixture dispatch:");
    let response = sws.get(&ctx, url, HeaderMap::new()).await?;
    println!(
        "  {} {} (x-data-source: {:?})",
        response.status,
        response.text(),
        response.header("x-data-source")
    );

    println!("\nInjected outage, retried:");
    ctx.set_faults(FaultPlan::new().service("sws", FaultProfile::new().status(503)));

    let retry = RetryLayer::<DaoError>::builder()
        .name("sws-term")
        .max_attempts(4)
        .delay(Duration::from_millis(100))
        .status_codes([503])
        .on_retry(|attempt, delay| println!("  [Retry] attempt {attempt}, waiting {delay:?}"))
        .build()?;

    let attempts = Arc::new(AtomicUsize::new(0));
    let response = retry
        .run(|| {
            let attempts = Arc::clone(&attempts);
            let ctx = ctx.clone();
            let sws = sws.clone();
            async move {
                // The outage clears after the second attempt.
                if attempts.fetch_add(1, Ordering::SeqCst) == 2 {
                    ctx.clear_faults();
                }
                sws.get(&ctx, url, HeaderMap::new())
                    .await?
                    .error_for_status(url)
            }
        })
        .await?;

    println!(
        "  {} after {} attempts: {}",
        response.status,
        attempts.load(Ordering::SeqCst),
        response.text()
    );

    Ok(())
}

use crate::config::PoolConfig;
use bytes::Bytes;
use restclient_core::{DaoError, Request, Response};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// A bounded HTTP client for one service.
///
/// At most `max_connections` requests are in flight at once; callers beyond
/// that wait for a permit rather than failing. Redirects are followed once,
/// a second redirect is a transport failure.
#[derive(Debug)]
pub struct ConnectionPool {
    config: PoolConfig,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl ConnectionPool {
    pub fn new(config: PoolConfig) -> Result<Self, DaoError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::limited(1))
            .read_timeout(config.read_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_connections)
            .danger_accept_invalid_certs(!config.verify_https);

        if let (Some(cert), Some(key)) = (&config.cert_file, &config.key_file) {
            let mut pem = read_pem(cert)?;
            pem.push(b'\n');
            pem.extend(read_pem(key)?);
            let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                DaoError::improperly_configured(format!(
                    "invalid client certificate for {}: {e}",
                    config.service
                ))
            })?;
            builder = builder.identity(identity);
        }

        if let Some(bundle) = &config.ca_bundle {
            let certs = reqwest::Certificate::from_pem_bundle(&read_pem(bundle)?).map_err(|e| {
                DaoError::improperly_configured(format!(
                    "invalid CA bundle {}: {e}",
                    bundle.display()
                ))
            })?;
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let client = builder.build().map_err(|e| {
            DaoError::improperly_configured(format!(
                "cannot build HTTP client for {}: {e}",
                config.service
            ))
        })?;

        Ok(Self {
            permits: Arc::new(Semaphore::new(config.max_connections)),
            config,
            client,
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Permits not currently held by an in-flight request.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Sends `request` and reads the whole body while holding a permit.
    pub async fn execute(&self, request: &Request) -> Result<Response, reqwest::Error> {
        // The semaphore is never closed, so acquisition only waits.
        let _permit = self.permits.clone().acquire_owned().await.ok();

        let mut builder = self
            .client
            .request(request.method.into(), self.config.absolute_url(&request.url))
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body: Bytes = response.bytes().await?;

        Ok(Response {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            headers,
            body,
            ..Response::default()
        })
    }

    pub fn timeout(&self) -> Duration {
        self.config.read_timeout
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, DaoError> {
    fs::read(path).map_err(|e| {
        DaoError::improperly_configured(format!("cannot read {}: {e}", path.display()))
    })
}

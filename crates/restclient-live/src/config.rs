use restclient_core::{DaoError, ServiceSettings};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_POOL_SIZE: usize = 9;

/// Connection settings for one service's pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub service: String,
    /// Scheme and authority, e.g. `https://sws.example.edu`.
    pub host: String,
    pub verify_https: bool,
    pub cert_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
    pub ca_bundle: Option<PathBuf>,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_connections: usize,
}

impl PoolConfig {
    /// Resolves pool settings for a service.
    ///
    /// `HOST` is required. Timeouts fall back from the service key to the
    /// global key to `DEFAULT_TIMEOUT` / `DEFAULT_CONNECT_TIMEOUT` and finally
    /// to two seconds (the connect timeout defaults to the read timeout). The
    /// pool size falls back the same way to `DEFAULT_POOL_SIZE` and then 9.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, DaoError> {
        let service = settings.service().to_string();
        let host = settings.get("HOST").filter(|h| !h.is_empty()).ok_or_else(|| {
            DaoError::improperly_configured(format!(
                "{}_HOST is required for the live backend",
                service.to_ascii_uppercase()
            ))
        })?;

        let read_timeout = match settings.get_seconds("TIMEOUT")? {
            Some(timeout) => timeout,
            None => settings
                .get_seconds("DEFAULT_TIMEOUT")?
                .unwrap_or(DEFAULT_TIMEOUT),
        };
        let connect_timeout = match settings.get_seconds("CONNECT_TIMEOUT")? {
            Some(timeout) => timeout,
            None => settings
                .get_seconds("DEFAULT_CONNECT_TIMEOUT")?
                .unwrap_or(read_timeout),
        };

        let max_connections = match settings.get_parsed::<usize>("POOL_SIZE")? {
            Some(size) => size,
            None => settings
                .get_parsed::<usize>("DEFAULT_POOL_SIZE")?
                .unwrap_or(DEFAULT_POOL_SIZE),
        };
        if max_connections == 0 {
            return Err(DaoError::improperly_configured(format!(
                "pool size for {service} must be at least 1"
            )));
        }

        Ok(Self {
            host,
            verify_https: settings.get_bool("VERIFY_HTTPS")?.unwrap_or(true),
            cert_file: settings.get("CERT_FILE").map(PathBuf::from),
            key_file: settings.get("KEY_FILE").map(PathBuf::from),
            ca_bundle: settings.settings().get("CA_BUNDLE").map(PathBuf::from),
            read_timeout,
            connect_timeout,
            max_connections,
            service,
        })
    }

    /// The absolute URL for a service-relative `url`.
    pub fn absolute_url(&self, url: &str) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), url)
    }
}

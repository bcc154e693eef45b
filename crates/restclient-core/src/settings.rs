//! Settings with two-level (service, then global) key resolution.
//!
//! Keys are stored upper-cased without the `RESTCLIENTS_` prefix, so
//! `RESTCLIENTS_SWS_HOST`, `sws_host` and `SWS_HOST` all name the same value.
//!
//! ```
//! use restclient_core::Settings;
//!
//! let settings = Settings::builder()
//!     .set("TIMEOUT", "5")
//!     .set("SWS_TIMEOUT", "10")
//!     .build();
//!
//! let sws = settings.for_service("sws");
//! assert_eq!(sws.get("TIMEOUT").as_deref(), Some("10"));
//! let pws = settings.for_service("pws");
//! assert_eq!(pws.get("TIMEOUT").as_deref(), Some("5"));
//! ```

use crate::error::DaoError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const ENV_PREFIX: &str = "RESTCLIENTS_";

/// Per-service default hook, consulted after both settings levels miss.
pub type DefaultSettingFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn normalize_key(key: &str) -> String {
    let upper = key.trim().to_ascii_uppercase();
    match upper.strip_prefix(ENV_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => upper,
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, DaoError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        DaoError::improperly_configured(format!("setting {key}={raw:?} is invalid: {e}"))
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, DaoError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(DaoError::improperly_configured(format!(
            "setting {key}={raw:?} is not a boolean"
        ))),
    }
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration, DaoError> {
    let secs: f64 = parse_value(key, raw)?;
    Duration::try_from_secs_f64(secs).map_err(|_| {
        DaoError::improperly_configured(format!(
            "setting {key}={raw:?} is not a non-negative number of seconds"
        ))
    })
}

/// An immutable table of settings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: Arc<HashMap<String, String>>,
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Reads every `RESTCLIENTS_*` environment variable.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds settings from `(name, value)` pairs, keeping only
    /// `RESTCLIENTS_`-prefixed names.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut builder = Self::builder();
        for (name, value) in vars {
            if name.to_ascii_uppercase().starts_with(ENV_PREFIX) {
                builder = builder.set(&name, value);
            }
        }
        let settings = builder.build();
        #[cfg(feature = "tracing")]
        tracing::debug!(count = settings.values.len(), "loaded restclient settings");
        settings
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, DaoError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key).map(|raw| parse_value(key, raw)).transpose()
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, DaoError> {
        self.get(key).map(|raw| parse_bool(key, raw)).transpose()
    }

    /// A copy with one value added or replaced.
    pub fn with(&self, key: &str, value: impl Into<String>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(normalize_key(key), value.into());
        Self {
            values: Arc::new(values),
        }
    }

    /// A copy that forces the fixture backend for each named service.
    pub fn use_mock(&self, services: &[&str]) -> Self {
        services.iter().fold(self.clone(), |acc, service| {
            acc.with(&format!("{service}_DAO_CLASS"), "Mock")
        })
    }

    /// A view of these settings resolved for one service.
    pub fn for_service(&self, service: &str) -> ServiceSettings {
        ServiceSettings {
            settings: self.clone(),
            service: service.to_string(),
            prefix: format!("{}_", service.to_ascii_uppercase()),
            defaults: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Settings").field("keys", &keys).finish()
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    values: HashMap<String, String>,
}

impl SettingsBuilder {
    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(normalize_key(key), value.into());
        self
    }

    pub fn build(self) -> Settings {
        Settings {
            values: Arc::new(self.values),
        }
    }
}

/// Settings resolved for one service: `{SERVICE}_{KEY}`, then `{KEY}`,
/// then the service's default hook.
#[derive(Clone)]
pub struct ServiceSettings {
    settings: Settings,
    service: String,
    prefix: String,
    defaults: Option<DefaultSettingFn>,
}

impl ServiceSettings {
    /// Installs the hook consulted when neither level has a value.
    pub fn with_defaults(mut self, defaults: DefaultSettingFn) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let service_key = format!("{}{}", self.prefix, normalize_key(key));
        self.settings
            .get(&service_key)
            .or_else(|| self.settings.get(key))
            .map(str::to_string)
            .or_else(|| self.defaults.as_ref().and_then(|hook| hook(key)))
    }

    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, DaoError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key).map(|raw| parse_value(key, &raw)).transpose()
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, DaoError> {
        self.get(key).map(|raw| parse_bool(key, &raw)).transpose()
    }

    /// A value in (possibly fractional) seconds.
    pub fn get_seconds(&self, key: &str) -> Result<Option<Duration>, DaoError> {
        self.get(key).map(|raw| parse_seconds(key, &raw)).transpose()
    }
}

impl fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("service", &self.service)
            .field("has_defaults", &self.defaults.is_some())
            .finish()
    }
}

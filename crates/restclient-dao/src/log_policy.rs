use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use restclient_core::{DaoError, ServiceSettings};

/// Decides whether a dispatch gets a timing log line.
///
/// A line is written only when `TIMING_LOG_ENABLED` is set, the current local
/// time lies strictly inside the `TIMING_START`..`TIMING_END` window (when
/// both are set) and a uniform draw falls below `TIMING_LOG_RATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPolicy {
    enabled: bool,
    rate: f64,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self::new(false, 1.0)
    }
}

impl LogPolicy {
    pub fn new(enabled: bool, rate: f64) -> Self {
        Self {
            enabled,
            rate,
            window: None,
        }
    }

    pub fn with_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.window = Some((start, end));
        self
    }

    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, DaoError> {
        let window = match (settings.get("TIMING_START"), settings.get("TIMING_END")) {
            (Some(start), Some(end)) => Some((
                parse_timestamp("TIMING_START", &start)?,
                parse_timestamp("TIMING_END", &end)?,
            )),
            _ => None,
        };
        Ok(Self {
            enabled: settings.get_bool("TIMING_LOG_ENABLED")?.unwrap_or(false),
            rate: settings.get_parsed::<f64>("TIMING_LOG_RATE")?.unwrap_or(1.0),
            window,
        })
    }

    pub fn should_log(&self) -> bool {
        self.should_log_at(Local::now().naive_local(), rand::random::<f64>())
    }

    /// The decision for a given local time and a draw from `[0, 1)`.
    pub fn should_log_at(&self, now: NaiveDateTime, draw: f64) -> bool {
        if let Some((start, end)) = self.window {
            if !(start < now && now < end) {
                return false;
            }
        }
        self.enabled && draw < self.rate
    }
}

/// Accepts RFC 3339 (converted to local time) or a naive ISO-8601 date or
/// date-time.
fn parse_timestamp(key: &str, raw: &str) -> Result<NaiveDateTime, DaoError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            DaoError::improperly_configured(format!("setting {key}={raw:?} is not an ISO-8601 time"))
        })
}

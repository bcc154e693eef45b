//! `.http-headers` sidecar parsing.
//!
//! A sidecar is JSON in one of two shapes:
//!
//! ```json
//! {"headers": {"Content-Type": "application/json"}, "status": 202}
//! ```
//!
//! or a flat header object:
//!
//! ```json
//! {"Content-Type": "application/json"}
//! ```

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SidecarError {
    #[error("sidecar is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sidecar must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Default)]
pub(crate) struct Sidecar {
    pub(crate) headers: HeaderMap,
    pub(crate) status: Option<u16>,
}

fn header_value(value: &Value) -> Option<HeaderValue> {
    match value {
        Value::String(s) => HeaderValue::from_str(s).ok(),
        other => HeaderValue::from_str(&other.to_string()).ok(),
    }
}

fn merge(headers: &mut HeaderMap, entries: &Map<String, Value>) {
    for (name, value) in entries {
        let parsed = HeaderName::from_bytes(name.as_bytes()).ok().zip(header_value(value));
        match parsed {
            Some((name, value)) => {
                headers.insert(name, value);
            }
            None => tracing::debug!(header = %name, "skipping unrepresentable sidecar header"),
        }
    }
}

/// Parses sidecar bytes. The header map is seeded with `X-Data-Source`.
pub(crate) fn parse(service: &str, data: &[u8]) -> Result<Sidecar, SidecarError> {
    let Value::Object(values) = serde_json::from_slice::<Value>(data)? else {
        return Err(SidecarError::NotAnObject);
    };

    let mut sidecar = Sidecar::default();
    if let Ok(source) = HeaderValue::from_str(&format!("{service} file mock data")) {
        sidecar
            .headers
            .insert(HeaderName::from_static("x-data-source"), source);
    }

    match values.get("headers") {
        Some(Value::Object(headers)) => {
            merge(&mut sidecar.headers, headers);
            sidecar.status = values
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok());
        }
        Some(_) => return Err(SidecarError::NotAnObject),
        None => merge(&mut sidecar.headers, &values),
    }

    Ok(sidecar)
}

use std::collections::BTreeMap;

use racm_core::{Entry, ResultSet};
use serde::Deserialize;
use serde_json::Value;

/// Response of `POST /api/jobs`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

/// Response of `GET /api/jobs/{id}/status`. Every field is optional on the
/// wire; missing values default so one malformed field never drops a tick.
/// Unknown fields (e.g. `eta_seconds`) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct WireStatus {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub progress_pct: i64,
    #[serde(default)]
    pub progress_msg: String,
    #[serde(default)]
    pub detail_msg: String,
}

/// Result payload, after the optional `{ "result": … }` envelope has been
/// stripped. Entry values may arrive as any JSON scalar; they are coerced to
/// strings on conversion.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WireResult {
    #[serde(default)]
    pub detailed_entries: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub summary_entries: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    pub summary_narrative: Option<String>,
}

impl WireResult {
    /// Accept the result either wrapped in a `result` envelope or at the top
    /// level; the service has shipped both shapes.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let inner = match value {
            Value::Object(mut map) => match map.remove("result") {
                Some(inner @ Value::Object(_)) => inner,
                _ => Value::Object(map),
            },
            other => other,
        };
        serde_json::from_value(inner)
    }

    pub fn into_result_set(self) -> ResultSet {
        ResultSet {
            detailed: self.detailed_entries.into_iter().map(convert_entry).collect(),
            summary: self.summary_entries.into_iter().map(convert_entry).collect(),
            narrative: self.summary_narrative.filter(|text| !text.trim().is_empty()),
        }
    }
}

fn convert_entry(raw: BTreeMap<String, Value>) -> Entry {
    let mut entry = Entry::new();
    for (key, value) in raw {
        let text = match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        entry.insert_raw(key, text);
    }
    entry
}

/// Everything that can go wrong talking to the analysis service, in the
/// shape the status code dictates. `Display` is the user-visible message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed (401): check the API token")]
    Auth,
    #[error("file too large (413)")]
    PayloadTooLarge,
    #[error("bad request (400): {0}")]
    BadRequest(String),
    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("could not read {path}: {message}")]
    FileRead { path: String, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth => Some(401),
            ApiError::PayloadTooLarge => Some(413),
            ApiError::BadRequest(_) => Some(400),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Completion events reported by the background client, one per command
/// (plus one `Status` per poll tick).
#[derive(Debug)]
pub enum ClientEvent {
    SubmitFinished(Result<String, ApiError>),
    Status {
        job_id: String,
        result: Result<WireStatus, ApiError>,
    },
    ResultFetched {
        job_id: String,
        result: Result<ResultSet, ApiError>,
    },
    SaveFinished(Result<(), ApiError>),
    CancelFinished(Result<(), ApiError>),
    DeleteFinished(Result<(), ApiError>),
    HealthChecked(Result<(), ApiError>),
}

#[cfg(test)]
mod tests {
    use super::WireResult;
    use serde_json::json;

    #[test]
    fn result_envelope_is_unwrapped() {
        let wrapped = json!({
            "result": {
                "detailed_entries": [{"Risk ID": "R-1"}],
                "summary_entries": [],
            }
        });
        let result = WireResult::from_value(wrapped).expect("parse");
        assert_eq!(result.detailed_entries.len(), 1);
    }

    #[test]
    fn bare_result_shape_is_accepted() {
        let bare = json!({
            "detailed_entries": [],
            "summary_entries": [{"risk_id": "S-1"}],
            "summary_narrative": "## Findings",
        });
        let result = WireResult::from_value(bare).expect("parse");
        assert_eq!(result.summary_entries.len(), 1);
        assert_eq!(result.summary_narrative.as_deref(), Some("## Findings"));
    }

    #[test]
    fn scalar_values_are_coerced_to_strings() {
        let value = json!({
            "detailed_entries": [{"Risk ID": 7, "Risk Rating": null, "Source Quote": "q"}],
        });
        let set = WireResult::from_value(value).expect("parse").into_result_set();
        assert_eq!(set.detailed[0].field(2), "7");
        assert_eq!(set.detailed[0].field(20), "");
        assert_eq!(set.detailed[0].field(23), "q");
    }

    #[test]
    fn blank_narrative_is_treated_as_absent() {
        let value = json!({ "summary_narrative": "   " });
        let set = WireResult::from_value(value).expect("parse").into_result_set();
        assert!(set.narrative.is_none());
    }
}

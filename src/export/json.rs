//! JSON response envelope handed to the web layer and printed by the CLI.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::model::MailRecord;

/// `{"success", "data", "count", "fetched_at", "error"}`.
///
/// A failed fetch has `success = false` and an `error` message; an empty
/// board is `success = true` with `count = 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailResponse {
    pub success: bool,
    pub data: Vec<MailRecord>,
    pub count: usize,
    pub fetched_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MailResponse {
    pub fn ok(data: Vec<MailRecord>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
            fetched_at: now(),
            error: None,
        }
    }

    /// The "source unavailable" answer for a failed fetch.
    pub fn unavailable(err: &FetchError) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            count: 0,
            fetched_at: now(),
            error: Some(format!("dorm mail service unavailable: {err}")),
        }
    }

    /// Map a fetch outcome onto the envelope.
    pub fn from_result(result: Result<Vec<MailRecord>, FetchError>) -> Self {
        match result {
            Ok(records) => Self::ok(records),
            Err(err) => Self::unavailable(&err),
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Write records as a pretty-printed JSON array.
pub fn export_json(records: &[MailRecord], output_path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(output_path, json)?;
    tracing::info!(path = %output_path.display(), records = records.len(), "Exported JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MailRecord {
        MailRecord {
            id: "A123".into(),
            arrival_time: "2025/10/01".into(),
            recipient: "王Ｏ明".into(),
            carrier: "順豐".into(),
            kind: "包裹".into(),
            tracking_number: "SF123456".into(),
            department: "資工系碩1".into(),
            days_since_arrival: "3".into(),
        }
    }

    #[test]
    fn test_ok_envelope_uses_type_key() {
        let value = serde_json::to_value(MailResponse::ok(vec![record()])).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 1);
        assert_eq!(value["data"][0]["type"], "包裹");
        assert!(value["data"][0].get("kind").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_empty_board_is_success() {
        let resp = MailResponse::from_result(Ok(Vec::new()));
        assert!(resp.success);
        assert_eq!(resp.count, 0);
    }

    #[test]
    fn test_unavailable_envelope() {
        let err = FetchError::EmptyBody {
            url: "http://board.test/".into(),
        };
        let resp = MailResponse::from_result(Err(err));
        assert!(!resp.success);
        assert!(resp.data.is_empty());
        assert!(resp.error.as_deref().unwrap_or("").contains("unavailable"));
    }
}

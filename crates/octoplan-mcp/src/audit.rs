//! JSONL audit log of tool invocations.
//!
//! The server appends one structured entry per tool call and never reads
//! the file back. Token-bearing parameter keys are redacted before
//! anything touches disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

const SENSITIVE_KEYS: [&str; 5] = ["token", "authorization", "secret", "password", "api_key"];

const REDACTED: &str = "[REDACTED]";

/// Append-only audit sink.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
}

/// One audited tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub tool: String,
    pub params: Value,
    pub outcome: AuditOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Error,
}

impl AuditEntry {
    pub fn tool_call(tool: &str, params: &Value, failed: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            tool: tool.to_string(),
            params: redact(params.clone()),
            outcome: if failed {
                AuditOutcome::Error
            } else {
                AuditOutcome::Success
            },
        }
    }
}

impl AuditLog {
    /// Create a sink at `path`, creating the parent directory if needed.
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Append one entry as a JSON line.
    pub async fn record(&self, entry: &AuditEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry).map_err(std::io::Error::other)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Mask values under sensitive keys, recursively.
fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, val)| {
                    if SENSITIVE_KEYS
                        .iter()
                        .any(|sensitive| key.to_ascii_lowercase().contains(sensitive))
                    {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact(val))
                    }
                })
                .collect(),
        ),
        Value::Array(elements) => Value::Array(elements.into_iter().map(redact).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_record_appends_json_lines() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl")).unwrap();

        log.record(&AuditEntry::tool_call("get_issue", &json!({ "number": 5 }), false))
            .await
            .unwrap();
        log.record(&AuditEntry::tool_call("get_issue", &json!({ "number": 6 }), true))
            .await
            .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let entries: Vec<AuditEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, AuditOutcome::Success);
        assert_eq!(entries[1].outcome, AuditOutcome::Error);
        assert_eq!(entries[1].params["number"], 6);
    }

    #[test]
    fn test_redaction_masks_sensitive_keys() {
        let entry = AuditEntry::tool_call(
            "create_issue",
            &json!({
                "title": "hello",
                "github_token": "ghp_secretvalue",
                "nested": { "Authorization": "Bearer abc" }
            }),
            false,
        );
        assert_eq!(entry.params["title"], "hello");
        assert_eq!(entry.params["github_token"], REDACTED);
        assert_eq!(entry.params["nested"]["Authorization"], REDACTED);
    }
}

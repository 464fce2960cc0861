//! Structured telemetry for the reconciliation and recording cores.
//!
//! Events are JSONL envelopes. Until a log path is set the log buffers in
//! memory; once a path is known buffered events flush to disk and later
//! events append directly. The log is an explicitly constructed handle —
//! hosts share it via `Arc` — and every failure inside it is swallowed:
//! telemetry must never affect text correctness.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Serialize, Deserialize, Clone)]
struct ErrorEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    timestamp: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone)]
struct MessageEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    timestamp: String,
    message: String,
    level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone)]
struct PerformanceEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    timestamp: String,
    operation: String,
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<serde_json::Value>,
}

#[derive(Clone)]
enum LogEnvelope {
    Error(ErrorEnvelope),
    Performance(PerformanceEnvelope),
    Message(MessageEnvelope),
}

impl LogEnvelope {
    fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            LogEnvelope::Error(e) => serde_json::to_value(e).ok(),
            LogEnvelope::Performance(p) => serde_json::to_value(p).ok(),
            LogEnvelope::Message(m) => serde_json::to_value(m).ok(),
        }
    }
}

enum LogMode {
    Buffered(Vec<LogEnvelope>),
    Disk(PathBuf),
}

/// Shared telemetry handle
pub struct TelemetryLog {
    mode: Mutex<LogMode>,
}

impl TelemetryLog {
    /// New log in buffered mode
    pub fn new() -> Self {
        TelemetryLog {
            mode: Mutex::new(LogMode::Buffered(Vec::new())),
        }
    }

    /// Switch to disk mode and flush buffered events.
    /// A second call is ignored; the first path wins.
    pub fn set_log_path(&self, log_path: PathBuf) {
        let mut mode = match self.mode.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        let buffered_events = match &*mode {
            LogMode::Buffered(events) => events.clone(),
            LogMode::Disk(_) => return,
        };

        *mode = LogMode::Disk(log_path.clone());
        drop(mode);

        if !buffered_events.is_empty() {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
                for envelope in buffered_events {
                    if let Some(json) = envelope.to_json() {
                        let _ = writeln!(file, "{}", json);
                    }
                }
            }
        }
    }

    fn append_envelope(&self, envelope: LogEnvelope) {
        let mut mode = match self.mode.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        match &mut *mode {
            LogMode::Buffered(buffer) => {
                buffer.push(envelope);
            }
            LogMode::Disk(log_path) => {
                let log_path = log_path.clone();
                drop(mode);

                if let Some(json) = envelope.to_json() {
                    if let Ok(mut file) =
                        OpenOptions::new().create(true).append(true).open(&log_path)
                    {
                        let _ = writeln!(file, "{}", json);
                    }
                }
            }
        }
    }

    pub fn log_error(&self, error: &dyn std::error::Error, context: Option<serde_json::Value>) {
        let envelope = ErrorEnvelope {
            event_type: "error".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            message: error.to_string(),
            context,
        };

        self.append_envelope(LogEnvelope::Error(envelope));
    }

    pub fn log_performance(
        &self,
        operation: &str,
        duration: Duration,
        context: Option<serde_json::Value>,
    ) {
        let envelope = PerformanceEnvelope {
            event_type: "performance".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            duration_ms: duration.as_millis(),
            context,
        };

        self.append_envelope(LogEnvelope::Performance(envelope));
    }

    pub fn log_message(&self, message: &str, level: &str, context: Option<serde_json::Value>) {
        let envelope = MessageEnvelope {
            event_type: "message".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            message: message.to_string(),
            level: level.to_string(),
            context,
        };

        self.append_envelope(LogEnvelope::Message(envelope));
    }

    /// Number of events still held in the in-memory buffer (zero once in
    /// disk mode)
    pub fn buffered_len(&self) -> usize {
        match self.mode.lock() {
            Ok(guard) => match &*guard {
                LogMode::Buffered(events) => events.len(),
                LogMode::Disk(_) => 0,
            },
            Err(_) => 0,
        }
    }
}

impl Default for TelemetryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PairviewError;

    #[test]
    fn test_buffers_until_path_set() {
        let log = TelemetryLog::new();
        log.log_message("starting", "info", None);
        log.log_error(&PairviewError::Generic("boom".to_string()), None);
        assert_eq!(log.buffered_len(), 2);
    }

    #[test]
    fn test_set_log_path_flushes_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.log");

        let log = TelemetryLog::new();
        log.log_message("one", "info", None);
        log.log_performance(
            "diff",
            Duration::from_millis(12),
            Some(serde_json::json!({"lines": 40})),
        );
        log.set_log_path(path.clone());
        assert_eq!(log.buffered_len(), 0);

        log.log_message("two", "info", None);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(value.get("type").is_some());
        }
    }

    #[test]
    fn test_second_path_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");

        let log = TelemetryLog::new();
        log.set_log_path(first.clone());
        log.set_log_path(second.clone());
        log.log_message("hello", "info", None);

        assert!(first.exists());
        assert!(!second.exists());
    }

    #[test]
    fn test_error_envelope_carries_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");

        let log = TelemetryLog::new();
        log.set_log_path(path.clone());
        log.log_error(
            &PairviewError::Generic("sink offline".to_string()),
            Some(serde_json::json!({"operation": "redraw"})),
        );

        let contents = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["context"]["operation"], "redraw");
        assert!(value["message"].as_str().unwrap().contains("sink offline"));
    }
}

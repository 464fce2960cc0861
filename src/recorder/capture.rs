//! The behavior capture state machine: classifies live edit events into
//! typed actions and detects idle gaps, holding the previous full buffer
//! snapshot so deletions can be recovered from the pre-change content.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use super::actions::{ActionKind, CodingAction, merge_actions};
use super::events::{BufferSpan, EditorEvent, Key, resolve_span};
use crate::config::RecorderConfig;
use crate::telemetry::TelemetryLog;

/// Millisecond clock seam; production uses [`SystemClock`], tests drive a
/// [`ManualClock`].
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Shared hand-driven clock for tests
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Per-buffer behavior recorder. Owns its action log for one editor-mount
/// lifetime; readers only ever receive snapshots.
pub struct ActionRecorder {
    session_id: Uuid,
    config: RecorderConfig,
    clock: Box<dyn Clock>,
    telemetry: Option<Arc<TelemetryLog>>,
    /// Full buffer content as of the previous change event
    snapshot: String,
    actions: Vec<CodingAction>,
    last_event_at: Option<u64>,
    completion_armed: bool,
    disposed: bool,
}

impl ActionRecorder {
    pub fn new(initial_content: impl Into<String>, config: RecorderConfig) -> Self {
        Self::with_clock(initial_content, config, Box::new(SystemClock))
    }

    pub fn with_clock(
        initial_content: impl Into<String>,
        config: RecorderConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        ActionRecorder {
            session_id: Uuid::new_v4(),
            config,
            clock,
            telemetry: None,
            snapshot: initial_content.into(),
            actions: Vec::new(),
            last_event_at: None,
            completion_armed: false,
            disposed: false,
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<TelemetryLog>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    /// Snapshot of the raw action log
    pub fn actions(&self) -> Vec<CodingAction> {
        self.actions.clone()
    }

    /// Compacted copy of the log for the analytics sink
    pub fn merged(&self) -> Vec<CodingAction> {
        merge_actions(&self.actions)
    }

    /// Reset the log and snapshot for a fresh editing session
    pub fn reset(&mut self, content: impl Into<String>) {
        self.session_id = Uuid::new_v4();
        self.snapshot = content.into();
        self.actions.clear();
        self.last_event_at = None;
        self.completion_armed = false;
        self.disposed = false;
    }

    /// Drop the accumulated log without touching the snapshot
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Observe one editor event. A malformed span drops only that event;
    /// recording continues.
    pub fn handle_event(&mut self, event: &EditorEvent) {
        if self.disposed {
            return;
        }
        let now = self.clock.now_ms();
        self.flush_idle(now);

        match event {
            EditorEvent::Typed { span, text } => {
                self.push(ActionKind::Type, text.clone(), now);
                self.apply_change(span, text);
                self.completion_armed = false;
            }
            EditorEvent::Pasted { span, text } => {
                self.push(ActionKind::Paste, text.clone(), now);
                self.apply_change(span, text);
                self.completion_armed = false;
            }
            EditorEvent::Copied { text } => {
                self.push(ActionKind::Copy, text.clone(), now);
            }
            EditorEvent::RangeReplaced { span, text } => {
                if text.is_empty() && !span.is_empty() {
                    // Recover the deleted text from the pre-change snapshot
                    match resolve_span(&self.snapshot, span) {
                        Ok(range) => {
                            let deleted = self.snapshot[range].to_string();
                            self.push(ActionKind::Delete, deleted, now);
                        }
                        Err(e) => self.log_dropped_event("delete", &e),
                    }
                } else if self.completion_armed
                    && text.chars().count() >= self.config.completion_min_chars
                {
                    self.push(ActionKind::Completion, text.clone(), now);
                } else if !text.is_empty() {
                    self.push(ActionKind::Type, text.clone(), now);
                }
                self.apply_change(span, text);
                self.completion_armed = false;
            }
            EditorEvent::KeyDown { key, modifiers } => match key {
                Key::Enter | Key::Tab if !modifiers.primary() => {
                    self.completion_armed = true;
                }
                Key::Char('z') | Key::Char('Z')
                    if modifiers.primary() && modifiers.shift =>
                {
                    self.push(ActionKind::Redo, String::new(), now);
                    self.completion_armed = false;
                }
                Key::Char('z') | Key::Char('Z') if modifiers.primary() => {
                    self.push(ActionKind::Undo, String::new(), now);
                    self.completion_armed = false;
                }
                Key::Char('y') | Key::Char('Y') if modifiers.primary() => {
                    self.push(ActionKind::Redo, String::new(), now);
                    self.completion_armed = false;
                }
                _ => {
                    self.completion_armed = false;
                }
            },
            EditorEvent::SelectionChanged { text } => {
                self.push(ActionKind::Select, text.clone(), now);
            }
        }

        self.last_event_at = Some(now);
    }

    /// Flush a trailing idle gap and stop observing. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let now = self.clock.now_ms();
        self.flush_idle(now);
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn flush_idle(&mut self, now: u64) {
        if let Some(last) = self.last_event_at {
            let gap = now.saturating_sub(last);
            if gap > self.config.idle_threshold_ms {
                self.actions.push(CodingAction {
                    kind: ActionKind::Wait,
                    content: String::new(),
                    timestamp: last,
                    duration: gap,
                    extra: None,
                });
                self.last_event_at = Some(now);
            }
        }
    }

    fn push(&mut self, kind: ActionKind, content: String, now: u64) {
        let duration = self
            .last_event_at
            .map(|t| now.saturating_sub(t))
            .unwrap_or(0);
        self.actions.push(CodingAction {
            kind,
            content,
            timestamp: now,
            duration,
            extra: None,
        });
    }

    fn apply_change(&mut self, span: &BufferSpan, text: &str) {
        match resolve_span(&self.snapshot, span) {
            Ok(range) => {
                self.snapshot.replace_range(range, text);
            }
            Err(e) => self.log_dropped_event("apply_change", &e),
        }
    }

    fn log_dropped_event(&self, operation: &str, error: &crate::error::PairviewError) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.log_error(
                error,
                Some(serde_json::json!({
                    "session_id": self.session_id.to_string(),
                    "operation": operation,
                })),
            );
        }
    }
}

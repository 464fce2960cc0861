//! Classified edit-behavior actions and the merge pass that compacts a raw
//! action log for reporting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Type,
    Paste,
    Copy,
    Delete,
    Completion,
    Undo,
    Redo,
    Wait,
    Select,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Type => "type",
            ActionKind::Paste => "paste",
            ActionKind::Copy => "copy",
            ActionKind::Delete => "delete",
            ActionKind::Completion => "completion",
            ActionKind::Undo => "undo",
            ActionKind::Redo => "redo",
            ActionKind::Wait => "wait",
            ActionKind::Select => "select",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "type" => Some(ActionKind::Type),
            "paste" => Some(ActionKind::Paste),
            "copy" => Some(ActionKind::Copy),
            "delete" => Some(ActionKind::Delete),
            "completion" => Some(ActionKind::Completion),
            "undo" => Some(ActionKind::Undo),
            "redo" => Some(ActionKind::Redo),
            "wait" => Some(ActionKind::Wait),
            "select" => Some(ActionKind::Select),
            _ => None,
        }
    }
}

/// One classified, timestamped edit-behavior event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingAction {
    pub kind: ActionKind,
    pub content: String,
    /// Epoch milliseconds
    pub timestamp: u64,
    /// Milliseconds
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl CodingAction {
    pub fn new(kind: ActionKind, content: impl Into<String>, timestamp: u64) -> Self {
        CodingAction {
            kind,
            content: content.into(),
            timestamp,
            duration: 0,
            extra: None,
        }
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }
}

/// Compact a raw action log. Pure single left-to-right pass; the input is
/// never mutated and re-merging a merged list changes nothing.
///
/// Rules for adjacent pairs:
/// - Type + Type: concatenated content, summed duration.
/// - Type + Completion: the completion supersedes the typed prefix — a Type
///   carrying the completion's content, summed duration.
/// - Delete + Delete: later content followed by earlier content (deletions
///   are observed in reverse-apply order), summed duration.
/// - Wait + Wait: summed duration.
/// - Select + Select: latest content and extra, summed duration.
/// - Anything else stays unmerged.
pub fn merge_actions(actions: &[CodingAction]) -> Vec<CodingAction> {
    let mut merged: Vec<CodingAction> = Vec::new();

    for action in actions {
        if let Some(last) = merged.last_mut() {
            match (last.kind, action.kind) {
                (ActionKind::Type, ActionKind::Type) => {
                    last.content.push_str(&action.content);
                    last.duration += action.duration;
                    continue;
                }
                (ActionKind::Type, ActionKind::Completion) => {
                    last.content = action.content.clone();
                    last.duration += action.duration;
                    continue;
                }
                (ActionKind::Delete, ActionKind::Delete) => {
                    last.content = format!("{}{}", action.content, last.content);
                    last.duration += action.duration;
                    continue;
                }
                (ActionKind::Wait, ActionKind::Wait) => {
                    last.duration += action.duration;
                    continue;
                }
                (ActionKind::Select, ActionKind::Select) => {
                    last.content = action.content.clone();
                    last.extra = action.extra.clone();
                    last.duration += action.duration;
                    continue;
                }
                _ => {}
            }
        }
        merged.push(action.clone());
    }

    merged
}

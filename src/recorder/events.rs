//! Editor events observed by the recorder, span resolution against a buffer
//! snapshot, and the typed observer registry hosts push events through.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use crate::error::PairviewError;

/// A span in editor coordinates: 1-indexed lines and columns, end exclusive
/// in the usual editor sense (the caret between characters). Columns count
/// characters within the line text, terminator excluded; `line_count + 1`
/// with column 1 addresses end of buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSpan {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl BufferSpan {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        BufferSpan {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Zero-width span at a caret position
    pub fn caret(line: u32, col: u32) -> Self {
        BufferSpan::new(line, col, line, col)
    }

    pub fn is_empty(&self) -> bool {
        self.start_line == self.end_line && self.start_col == self.end_col
    }
}

#[derive(Debug, Clone)]
struct LineMeta {
    /// Byte offset of the line start
    start: usize,
    /// Byte offset past the terminator
    end: usize,
    /// Byte offset of the terminator (== end for an unterminated final line)
    text_end: usize,
}

fn collect_line_meta(content: &str) -> Vec<LineMeta> {
    let mut meta = Vec::new();
    let mut line_start = 0usize;

    for (idx, ch) in content.char_indices() {
        if ch == '\n' {
            meta.push(LineMeta {
                start: line_start,
                end: idx + 1,
                text_end: idx,
            });
            line_start = idx + 1;
        }
    }

    if line_start < content.len() {
        meta.push(LineMeta {
            start: line_start,
            end: content.len(),
            text_end: content.len(),
        });
    }

    meta
}

fn position_offset(
    content: &str,
    lines: &[LineMeta],
    line: u32,
    col: u32,
) -> Result<usize, PairviewError> {
    if line == 0 || col == 0 {
        return Err(PairviewError::InvalidSpan(format!(
            "position {}:{} is not 1-indexed",
            line, col
        )));
    }
    // One past the final line with column 1 addresses end of buffer
    if line as usize == lines.len() + 1 && col == 1 {
        return Ok(content.len());
    }
    let meta = lines.get(line as usize - 1).ok_or_else(|| {
        PairviewError::InvalidSpan(format!("line {} past end of {}-line snapshot", line, lines.len()))
    })?;

    let text = &content[meta.start..meta.text_end];
    let mut chars_seen: u32 = 0;
    for (byte_idx, _) in text.char_indices() {
        if chars_seen == col - 1 {
            return Ok(meta.start + byte_idx);
        }
        chars_seen += 1;
    }
    if col - 1 == chars_seen {
        // Column just past the line text, before the terminator
        return Ok(meta.text_end);
    }
    Err(PairviewError::InvalidSpan(format!(
        "column {} past end of line {}",
        col, line
    )))
}

/// Resolve a span to a byte range over `content` (the pre-change snapshot)
pub(crate) fn resolve_span(
    content: &str,
    span: &BufferSpan,
) -> Result<Range<usize>, PairviewError> {
    let lines = collect_line_meta(content);
    let start = position_offset(content, &lines, span.start_line, span.start_col)?;
    let end = position_offset(content, &lines, span.end_line, span.end_col)?;
    if start > end {
        return Err(PairviewError::InvalidSpan(format!(
            "span start {} after end {}",
            start, end
        )));
    }
    Ok(start..end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Tab,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on Linux/Windows, Cmd on macOS
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Everything the recorder observes from the hosting editor surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Literal keystrokes inserted at a caret
    Typed { span: BufferSpan, text: String },
    Pasted { span: BufferSpan, text: String },
    Copied { text: String },
    /// Generic content change over a span; empty text over a non-empty span
    /// is a deletion
    RangeReplaced { span: BufferSpan, text: String },
    KeyDown { key: Key, modifiers: Modifiers },
    SelectionChanged { text: String },
}

/// Subscription handle returned by [`EventHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Handler = Rc<RefCell<dyn FnMut(&EditorEvent)>>;

/// Typed observer registry for editor events.
///
/// Unsubscribing is idempotent and safe from within a running callback;
/// handlers subscribed during an emit are not invoked until the next emit.
pub struct EventHub {
    handlers: RefCell<Vec<(u64, Handler)>>,
    next_id: Cell<u64>,
}

impl EventHub {
    pub fn new() -> Self {
        EventHub {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(handler))));
        Subscription(id)
    }

    /// Returns false when the subscription was already removed
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.0);
        handlers.len() != before
    }

    /// Deliver an event to every handler live at emit time
    pub fn emit(&self, event: &EditorEvent) {
        let snapshot: Vec<(u64, Handler)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            let still_live = self.handlers.borrow().iter().any(|(i, _)| *i == id);
            if !still_live {
                continue;
            }
            // A handler emitting back into the hub would find itself
            // borrowed; skip rather than abort the fan-out
            if let Ok(mut callback) = handler.try_borrow_mut() {
                callback(event);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

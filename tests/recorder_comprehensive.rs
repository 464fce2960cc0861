/// Comprehensive tests for the behavior capture pipeline.
///
/// Coverage areas:
/// 1. Event classification end to end (typing, paste, delete, completion)
/// 2. Idle detection across realistic event timelines
/// 3. Merge-pass compaction and idempotence
/// 4. Hub fan-out into a recorder
/// 5. Persistence round-trip through the action store
use std::cell::RefCell;
use std::rc::Rc;

use pairview::recorder::events::{BufferSpan, Key, Modifiers};
use pairview::recorder::ManualClock;
use pairview::{
    ActionKind, ActionRecorder, ActionStore, CodingAction, EditorEvent, EventHub, RecorderConfig,
    recorder::merge_actions,
};

fn recorder_at(content: &str, clock: &ManualClock) -> ActionRecorder {
    ActionRecorder::with_clock(content, RecorderConfig::default(), Box::new(clock.clone()))
}

fn typed(line: u32, col: u32, text: &str) -> EditorEvent {
    EditorEvent::Typed {
        span: BufferSpan::caret(line, col),
        text: text.to_string(),
    }
}

// =============================================================================
// Classification timelines
// =============================================================================

#[test]
fn test_idle_timeline_produces_type_wait_type() {
    let clock = ManualClock::new(0);
    let mut recorder = recorder_at("", &clock);

    recorder.handle_event(&typed(1, 1, "a"));
    clock.set(3_500);
    recorder.handle_event(&typed(1, 2, "b"));

    let kinds: Vec<ActionKind> = recorder.actions().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ActionKind::Type, ActionKind::Wait, ActionKind::Type]);
    assert!(recorder.actions()[1].duration >= 3_000);
}

#[test]
fn test_typing_session_with_completion_and_deletion() {
    let clock = ManualClock::new(1_000);
    let mut recorder = recorder_at("", &clock);

    recorder.handle_event(&typed(1, 1, "l"));
    clock.advance(80);
    recorder.handle_event(&typed(1, 2, "e"));
    clock.advance(80);
    recorder.handle_event(&typed(1, 3, "t"));

    // Accept an inline completion with Tab
    clock.advance(200);
    recorder.handle_event(&EditorEvent::KeyDown {
        key: Key::Tab,
        modifiers: Modifiers::default(),
    });
    recorder.handle_event(&EditorEvent::RangeReplaced {
        span: BufferSpan::caret(1, 4),
        text: " value = 1;".to_string(),
    });
    assert_eq!(recorder.snapshot(), "let value = 1;");

    // Backspace the trailing semicolon
    clock.advance(150);
    recorder.handle_event(&EditorEvent::RangeReplaced {
        span: BufferSpan::new(1, 14, 1, 15),
        text: String::new(),
    });
    assert_eq!(recorder.snapshot(), "let value = 1");

    let kinds: Vec<ActionKind> = recorder.actions().iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::Type,
            ActionKind::Type,
            ActionKind::Type,
            ActionKind::Completion,
            ActionKind::Delete,
        ]
    );
    assert_eq!(recorder.actions()[4].content, ";");

    // The merge pass folds the typed prefix into the completion
    let merged = recorder.merged();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].kind, ActionKind::Type);
    assert_eq!(merged[0].content, " value = 1;");
    assert_eq!(merged[1].kind, ActionKind::Delete);
}

#[test]
fn test_backspace_run_merges_into_reading_order() {
    let clock = ManualClock::new(0);
    let mut recorder = recorder_at("abc", &clock);

    for col in (1..=3).rev() {
        recorder.handle_event(&EditorEvent::RangeReplaced {
            span: BufferSpan::new(1, col, 1, col + 1),
            text: String::new(),
        });
        clock.advance(50);
    }
    assert_eq!(recorder.snapshot(), "");

    let merged = recorder.merged();
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].kind, ActionKind::Delete);
    assert_eq!(merged[0].content, "abc");
}

#[test]
fn test_paste_then_undo_timeline() {
    let clock = ManualClock::new(0);
    let mut recorder = recorder_at("", &clock);
    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::default()
    };

    recorder.handle_event(&EditorEvent::Pasted {
        span: BufferSpan::caret(1, 1),
        text: "pasted block\n".to_string(),
    });
    clock.advance(400);
    recorder.handle_event(&EditorEvent::KeyDown {
        key: Key::Char('z'),
        modifiers: ctrl,
    });

    let kinds: Vec<ActionKind> = recorder.actions().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ActionKind::Paste, ActionKind::Undo]);
    assert_eq!(recorder.snapshot(), "pasted block\n");
}

#[test]
fn test_wait_splits_merge_runs() {
    let clock = ManualClock::new(0);
    let mut recorder = recorder_at("", &clock);

    recorder.handle_event(&typed(1, 1, "a"));
    clock.set(5_000);
    recorder.handle_event(&typed(1, 2, "b"));
    clock.set(5_100);
    recorder.handle_event(&typed(1, 3, "c"));

    let merged = recorder.merged();
    let kinds: Vec<ActionKind> = merged.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ActionKind::Type, ActionKind::Wait, ActionKind::Type]);
    assert_eq!(merged[0].content, "a");
    assert_eq!(merged[2].content, "bc");
}

// =============================================================================
// Merge-pass properties
// =============================================================================

#[test]
fn test_merge_examples() {
    let type_a = CodingAction::new(ActionKind::Type, "a", 0);
    let type_b = CodingAction::new(ActionKind::Type, "b", 100);
    let wait = CodingAction {
        kind: ActionKind::Wait,
        content: String::new(),
        timestamp: 50,
        duration: 500,
        extra: None,
    };

    let merged = merge_actions(&[type_a.clone(), type_b.clone()]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].content, "ab");

    let unmerged = merge_actions(&[type_a, wait, type_b]);
    assert_eq!(unmerged.len(), 3);
}

#[test]
fn test_merge_idempotent_over_recorded_sessions() {
    let clock = ManualClock::new(0);
    let mut recorder = recorder_at("", &clock);

    for (i, ch) in ["f", "o", "o"].iter().enumerate() {
        recorder.handle_event(&typed(1, (i + 1) as u32, ch));
        clock.advance(90);
    }
    clock.advance(4_000);
    recorder.handle_event(&typed(1, 4, "!"));
    recorder.handle_event(&EditorEvent::SelectionChanged {
        text: "foo!".to_string(),
    });
    recorder.handle_event(&EditorEvent::SelectionChanged {
        text: "foo".to_string(),
    });

    let once = recorder.merged();
    let twice = merge_actions(&once);
    assert_eq!(once, twice);
}

// =============================================================================
// Hub fan-out
// =============================================================================

#[test]
fn test_hub_drives_recorder() {
    let clock = ManualClock::new(0);
    let recorder = Rc::new(RefCell::new(recorder_at("", &clock)));
    let hub = EventHub::new();

    let sink = Rc::clone(&recorder);
    let subscription = hub.subscribe(move |event| sink.borrow_mut().handle_event(event));

    hub.emit(&typed(1, 1, "h"));
    hub.emit(&typed(1, 2, "i"));
    assert_eq!(recorder.borrow().snapshot(), "hi");
    assert_eq!(recorder.borrow().actions().len(), 2);

    hub.unsubscribe(subscription);
    hub.emit(&typed(1, 3, "!"));
    assert_eq!(recorder.borrow().actions().len(), 2);
}

#[test]
fn test_hub_keeps_later_handlers_when_one_unsubscribes() {
    let hub = Rc::new(EventHub::new());
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let hub_inner = Rc::clone(&hub);
    let log_a = Rc::clone(&log);
    let first = Rc::new(RefCell::new(None));
    let first_inner = Rc::clone(&first);
    let sub = hub.subscribe(move |_| {
        log_a.borrow_mut().push("first");
        if let Some(own) = *first_inner.borrow() {
            hub_inner.unsubscribe(own);
        }
    });
    *first.borrow_mut() = Some(sub);

    let log_b = Rc::clone(&log);
    hub.subscribe(move |_| log_b.borrow_mut().push("second"));

    hub.emit(&EditorEvent::Copied {
        text: String::new(),
    });
    assert_eq!(*log.borrow(), vec!["first", "second"]);

    hub.emit(&EditorEvent::Copied {
        text: String::new(),
    });
    assert_eq!(*log.borrow(), vec!["first", "second", "second"]);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_merged_log_round_trips_through_store() {
    let clock = ManualClock::new(0);
    let mut recorder = recorder_at("", &clock);

    recorder.handle_event(&typed(1, 1, "a"));
    clock.advance(100);
    recorder.handle_event(&typed(1, 2, "b"));
    clock.set(8_000);
    recorder.handle_event(&typed(1, 3, "c"));
    recorder.dispose();

    let merged = recorder.merged();
    let mut store = ActionStore::open_in_memory().unwrap();
    store
        .save_actions(&recorder.session_id(), &merged)
        .unwrap();

    let loaded = store.load_actions(&recorder.session_id()).unwrap();
    assert_eq!(loaded, merged);
    let kinds: Vec<ActionKind> = loaded.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![ActionKind::Type, ActionKind::Wait, ActionKind::Type]);
}

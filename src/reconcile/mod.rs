pub mod buffer;
pub mod decorations;
pub mod session;

pub use buffer::{LineRange, StringBuffer, TextBuffer};
pub use decorations::{
    DecorationSink, FailingDecorationSink, MemoryDecorationSink, NullDecorationSink, StyleClass,
};
pub use session::{ReviewSession, SessionState};

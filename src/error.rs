use std::fmt;

#[derive(Debug)]
pub enum PairviewError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    SqliteError(rusqlite::Error),
    /// A line range addressed lines outside the current buffer
    BufferRange {
        start: u32,
        end: u32,
        line_count: u32,
    },
    /// A reported editor span could not be resolved against the snapshot
    InvalidSpan(String),
    Generic(String),
}

impl fmt::Display for PairviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairviewError::IoError(e) => write!(f, "IO error: {}", e),
            PairviewError::JsonError(e) => write!(f, "JSON error: {}", e),
            PairviewError::SqliteError(e) => write!(f, "SQLite error: {}", e),
            PairviewError::BufferRange {
                start,
                end,
                line_count,
            } => write!(
                f,
                "Buffer range [{}, {}] out of bounds for {} lines",
                start, end, line_count
            ),
            PairviewError::InvalidSpan(detail) => write!(f, "Invalid span: {}", detail),
            PairviewError::Generic(e) => write!(f, "Generic error: {}", e),
        }
    }
}

impl std::error::Error for PairviewError {}

impl From<std::io::Error> for PairviewError {
    fn from(err: std::io::Error) -> Self {
        PairviewError::IoError(err)
    }
}

impl From<serde_json::Error> for PairviewError {
    fn from(err: serde_json::Error) -> Self {
        PairviewError::JsonError(err)
    }
}

impl From<rusqlite::Error> for PairviewError {
    fn from(err: rusqlite::Error) -> Self {
        PairviewError::SqliteError(err)
    }
}

impl Clone for PairviewError {
    fn clone(&self) -> Self {
        match self {
            PairviewError::IoError(e) => {
                PairviewError::IoError(std::io::Error::new(e.kind(), e.to_string()))
            }
            PairviewError::JsonError(e) => PairviewError::Generic(format!("JSON error: {}", e)),
            PairviewError::SqliteError(e) => PairviewError::Generic(format!("SQLite error: {}", e)),
            PairviewError::BufferRange {
                start,
                end,
                line_count,
            } => PairviewError::BufferRange {
                start: *start,
                end: *end,
                line_count: *line_count,
            },
            PairviewError::InvalidSpan(s) => PairviewError::InvalidSpan(s.clone()),
            PairviewError::Generic(s) => PairviewError::Generic(s.clone()),
        }
    }
}

use std::io;
use std::path::PathBuf;
use std::str::Utf8Error;
use thiserror::Error;

pub type Result<T, E = LogError> = std::result::Result<T, E>;

/// Every failure the event log can report.
///
/// Errors split into three groups:
/// - Record-local ([`LogError::is_record_local`]): only the affected record is lost.
///   A sequential reader may skip it and continue with the next frame.
/// - The recoverable tail ([`LogError::TruncatedTail`]): the stream ends in a partial frame,
///   which is what a live or crashed writer leaves behind. Nothing valid follows it yet.
/// - Everything else is fatal to the handle that raised it.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Malformed record. {0}")]
    MalformedRecord(String),

    #[error("Truncated tail at offset {offset}. The frame needs {needed} bytes; {available} are available.")]
    TruncatedTail {
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("Shape mismatch. Shape {shape:?} needs {expected} {unit}; got {actual}.")]
    ShapeMismatch {
        shape: Vec<u64>,
        expected: u64,
        actual: u64,
        unit: &'static str,
    },

    #[error("Invalid UTF-8 in field {field_id}.")]
    EncodingError {
        field_id: u16,
        #[source]
        source: Utf8Error,
    },

    #[error("Another writer holds {path:?}.")]
    WriterConflict {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Refusing to append to {path:?}. {reason} at offset {offset}.")]
    CorruptTail {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("Bad stream header. {0}")]
    BadHeader(String),

    #[error("Unsupported element type {0:?}")]
    UnsupportedElementType(String),

    #[error("Unsupported byte order {0:?}")]
    UnsupportedByteOrder(String),

    #[error("Element type mismatch. The array holds {actual}; {requested} was requested.")]
    ElementTypeMismatch { actual: String, requested: String },

    #[error("Invalid event. {0}")]
    InvalidEvent(String),

    #[error("External file path {0:?} leads outside the session base dir.")]
    OutsideBaseDir(String),

    #[error("Read-back of the record at offset {offset} does not match what was written.")]
    VerifyFailed { offset: u64 },

    #[error("{op} {path:?}")]
    Fs {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LogError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Whether only the record being decoded is affected.
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Self::MalformedRecord(_)
                | Self::ShapeMismatch { .. }
                | Self::EncodingError { .. }
                | Self::UnsupportedElementType(_)
                | Self::UnsupportedByteOrder(_)
        )
    }

    pub fn is_recoverable_tail(&self) -> bool {
        matches!(self, Self::TruncatedTail { .. })
    }
}

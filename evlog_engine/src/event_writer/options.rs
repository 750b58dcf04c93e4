use crate::frame::RecordOffset;

#[derive(Clone, Debug)]
pub struct WriterOptions {
    /// Continue an existing stream. Otherwise an existing stream is discarded.
    pub append: bool,
    /// Read each record back after writing it.
    pub verify_after_write: bool,
    /// `flush` waits until written records are durable.
    pub sync_on_flush: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            append: true,
            verify_after_write: false,
            sync_on_flush: true,
        }
    }
}

impl WriterOptions {
    pub fn truncate() -> Self {
        Self {
            append: false,
            ..Self::default()
        }
    }
}

/// Counts for one writer session. Records that existed before `open` are not counted.
#[derive(Clone, Default, Debug)]
pub struct WriterStats {
    pub records_written: u64,
    pub bytes_written: u64,
    pub end_offset: RecordOffset,
}

use crate::frame::{self, FrameCursor, RecordOffset};
use crate::fs_utils;
use crate::header::{StreamHeader, HEADER_LEN};
use evlog_types::types::Event;
use evlog_types::{LogError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod log_helpers;
mod options;
pub use log_helpers::*;
pub use options::*;

/// The single producer of one event log.
///
/// Holds an advisory exclusive lock on the file from `open` until `close` or drop.
/// Each record is appended with one write call and is never read back,
/// unless [`WriterOptions::verify_after_write`] is set.
pub struct EventWriter {
    path: PathBuf,
    file: File,
    opts: WriterOptions,
    /// The end of the last complete record.
    end: u64,
    stats: WriterStats,
    closed: bool,
}

impl EventWriter {
    pub fn open<P: AsRef<Path>>(path: P, opts: WriterOptions) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_utils::create_dir_all(parent)?;
        }

        // Creating is not writing: an existing file is left intact until the lock is held.
        let mut file = fs_utils::open_file(
            path,
            OpenOptions::new().read(true).write(true).create(true),
        )?;
        fs_utils::lock_file(&file, path)?;

        let file_len = fs_utils::file_len(&file, path)?;
        let existing = if opts.append && file_len > 0 {
            Self::validate_existing(&file, path)?
        } else {
            None
        };
        let end = match existing {
            Some((end, record_count)) => {
                debug!(?path, end, record_count, "Appending to an existing event log.");
                end
            }
            None => {
                fs_utils::set_len(&file, 0, path)?;
                file.seek(SeekFrom::Start(0))?;
                file.write_all(&StreamHeader::default().to_bytes())?;
                debug!(?path, "Started a new event log.");
                HEADER_LEN
            }
        };
        file.seek(SeekFrom::Start(end))?;

        Ok(Self {
            path: path.into(),
            file,
            opts,
            end,
            stats: WriterStats {
                end_offset: RecordOffset::from(end),
                ..WriterStats::default()
            },
            closed: false,
        })
    }

    /// Scans every frame. Returns the end of the last one and the frame count,
    /// or `None` if the header itself was never completed.
    fn validate_existing(file: &File, path: &Path) -> Result<Option<(u64, u64)>> {
        let mut cursor = FrameCursor::new(BufReader::new(file))?;
        if cursor.header().is_none() {
            warn!(?path, "Starting over on a log whose header was never completed.");
            return Ok(None);
        }
        let mut record_count = 0;
        loop {
            match cursor.next_frame() {
                Ok(None) => return Ok(Some((*cursor.pos(), record_count))),
                Ok(Some(frame)) => {
                    cursor.skip(frame);
                    record_count += 1;
                }
                Err(LogError::TruncatedTail {
                    offset,
                    needed,
                    available,
                }) => {
                    return Err(LogError::CorruptTail {
                        path: path.into(),
                        offset,
                        reason: format!(
                            "The last frame needs {needed} bytes but only {available} remain"
                        ),
                    })
                }
                Err(e) if e.is_record_local() => {
                    warn!(?path, "Existing log has a corrupt frame. {e}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &WriterOptions {
        &self.opts
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Appends one record and returns its offset.
    ///
    /// On failure, the stream is cut back to the end of the previous record.
    pub fn write(&mut self, event: &Event) -> Result<RecordOffset> {
        event.validate()?;
        let payload = event.serialize()?;
        let frame = frame::encode_frame(&payload)?;

        let offset = RecordOffset::from(self.end);
        if let Err(e) = self.append_frame(offset, &frame) {
            self.roll_back();
            return Err(e);
        }
        self.end += frame.len() as u64;

        self.stats.records_written += 1;
        self.stats.bytes_written += frame.len() as u64;
        self.stats.end_offset = RecordOffset::from(self.end);
        Ok(offset)
    }

    fn append_frame(&mut self, offset: RecordOffset, frame: &[u8]) -> Result<()> {
        self.file.write_all(frame)?;
        if self.opts.verify_after_write {
            self.verify(offset, frame)?;
        }
        Ok(())
    }

    /// Cuts the stream back to `end`.
    fn roll_back(&mut self) {
        let res = fs_utils::set_len(&self.file, self.end, &self.path).and_then(|()| {
            self.file.seek(SeekFrom::Start(self.end))?;
            Ok(())
        });
        if let Err(e) = res {
            warn!(path = ?self.path, end = self.end, "Could not cut back a partial record. {e}");
        }
    }

    fn verify(&mut self, offset: RecordOffset, frame: &[u8]) -> Result<()> {
        fs_utils::sync_data(&self.file, &self.path)?;

        let mut read_back = vec![0u8; frame.len()];
        self.file.seek(SeekFrom::Start(*offset))?;
        let res = self.file.read_exact(&mut read_back);
        self.file.seek(SeekFrom::Start(*offset + frame.len() as u64))?;
        res?;

        if read_back != frame {
            return Err(LogError::VerifyFailed { offset: *offset });
        }
        Ok(())
    }

    /// Pushes written records to storage. With [`WriterOptions::sync_on_flush`], waits until they are durable.
    pub fn flush(&mut self) -> Result<()> {
        self.file.flush()?;
        if self.opts.sync_on_flush {
            fs_utils::sync_data(&self.file, &self.path)?;
        }
        Ok(())
    }

    /// Flushes and releases the lock. Records are durable once this returns `Ok`.
    pub fn close(mut self) -> Result<WriterStats> {
        self.closed = true;
        self.flush()?;
        fs_utils::sync_data(&self.file, &self.path)?;
        fs_utils::unlock_file(&self.file, &self.path)?;
        debug!(path = ?self.path, records = self.stats.records_written, "Closed the event log.");
        Ok(self.stats.clone())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.flush() {
                warn!(path = ?self.path, "Could not flush the event log on drop. {e}");
            }
        }
    }
}

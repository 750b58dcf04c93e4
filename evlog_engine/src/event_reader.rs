use crate::frame::{FrameCursor, ReadResult, RecordOffset};
use crate::fs_utils;
use evlog_types::types::{Event, ExternalFile, Value};
use evlog_types::{LogError, Result};
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod tag_index;
pub use tag_index::*;

#[derive(Clone, Default, Debug)]
pub struct ReaderOptions {
    /// The session base dir that external file paths are relative to.
    /// Defaults to the dir containing the log.
    pub base_dir: Option<PathBuf>,
}

/// Reads an event log, sequentially or at known offsets.
///
/// Any number of readers may read a log while its writer is appending to it.
/// A partial frame at the end is reported as [`LogError::TruncatedTail`] and is
/// retried on the next call, rather than treated as corruption.
pub struct EventReader {
    path: PathBuf,
    base_dir: PathBuf,
    frames: FrameCursor<BufReader<File>>,
}

impl EventReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, ReaderOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, opts: ReaderOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = fs_utils::open_file(path, OpenOptions::new().read(true))?;
        let frames = FrameCursor::new(BufReader::new(file))?;
        let base_dir = opts.base_dir.unwrap_or_else(|| {
            path.parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });
        debug!(?path, ?base_dir, version = ?frames.header().map(|h| h.version), "Opened an event log.");
        Ok(Self {
            path: path.into(),
            base_dir,
            frames,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The offset that the next call to [`Self::next`] reads from.
    pub fn position(&self) -> RecordOffset {
        self.frames.pos()
    }

    /// Makes the next sequential read start at `offset`, which must be a record boundary.
    pub fn seek(&mut self, offset: RecordOffset) -> Result<()> {
        self.frames.set_pos(offset)
    }

    /// Restarts sequential reading from the first record.
    pub fn rewind(&mut self) {
        self.frames.rewind();
    }

    /// Fails with [`LogError::OutsideBaseDir`] for a path that does not stay within the base dir.
    pub fn resolve_external(&self, file: &ExternalFile) -> Result<PathBuf> {
        file.resolve(&self.base_dir)
    }
}

/* Sequential reading. */
impl EventReader {
    /// A record-local error consumes the bad record; the following call reads the next one.
    /// [`LogError::TruncatedTail`] consumes nothing.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<ReadResult<Event>> {
        let frame = match self.frames.next_frame()? {
            None => return Ok(ReadResult::EOF),
            Some(frame) => frame,
        };
        let payload = self.frames.read_payload(frame)?;
        let event = Event::deserialize(&payload)?;
        Ok(ReadResult::Some(frame.offset, event))
    }

    /// Iterates from the current position.
    ///
    /// Record-local errors are yielded and iteration continues.
    /// A truncated tail or any other error is yielded once, and ends iteration.
    pub fn events(&mut self) -> Events<'_> {
        Events {
            reader: self,
            done: false,
        }
    }
}

pub struct Events<'a> {
    reader: &'a mut EventReader,
    done: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<(RecordOffset, Event)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.reader.position();
        match self.reader.next() {
            Ok(ReadResult::EOF) => {
                self.done = true;
                None
            }
            Ok(ReadResult::Some(offset, event)) => Some(Ok((offset, event))),
            Err(e) if e.is_record_local() => {
                warn!(path = ?self.reader.path, %offset, "Skipping a bad record. {e}");
                Some(Err(e))
            }
            Err(e) => {
                if e.is_recoverable_tail() {
                    warn!(path = ?self.reader.path, %offset, "The stream ends in a partial record.");
                }
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/* Random access and indexing. */
impl EventReader {
    /// Decodes the one record at `offset`. The sequential position is not affected.
    pub fn read_at(&mut self, offset: RecordOffset) -> Result<Event> {
        let saved = self.frames.pos();
        let res = self.read_one_at(offset);
        self.frames.set_pos(saved)?;
        res
    }

    fn read_one_at(&mut self, offset: RecordOffset) -> Result<Event> {
        self.frames.set_pos(offset)?;
        let frame = self.frames.next_frame()?.ok_or_else(|| {
            LogError::malformed(format!("No record at offset {offset}. The stream ends there."))
        })?;
        let payload = self.frames.read_payload(frame)?;
        Event::deserialize(&payload)
    }

    /// Scans the whole stream once, decoding only event headers.
    pub fn build_tag_index(&mut self) -> Result<TagIndex> {
        let mut index = TagIndex::default();
        self.refresh_tag_index(&mut index)?;
        Ok(index)
    }

    /// Continues scanning from where `index` stopped. The sequential position is not affected.
    ///
    /// Frames whose header cannot be decoded are counted and skipped.
    /// A partial frame at the end stops the scan and is rescanned next time.
    pub fn refresh_tag_index(&mut self, index: &mut TagIndex) -> Result<()> {
        let saved = self.frames.pos();
        let res = self.scan_into(index);
        self.frames.set_pos(saved)?;
        res?;
        debug!(
            path = ?self.path,
            tags = index.tag_count(),
            records = index.record_count,
            scanned_to = %index.scanned_to,
            "Indexed tags."
        );
        Ok(())
    }

    fn scan_into(&mut self, index: &mut TagIndex) -> Result<()> {
        index.truncated_tail = false;
        self.frames.set_pos(index.scanned_to)?;
        loop {
            let frame = match self.frames.next_frame() {
                Ok(None) => return Ok(()),
                Ok(Some(frame)) => frame,
                Err(e) if e.is_recoverable_tail() => {
                    index.truncated_tail = true;
                    debug!(path = ?self.path, "Indexing stopped at a partial record. {e}");
                    return Ok(());
                }
                Err(e) if e.is_record_local() => {
                    warn!(path = ?self.path, "Not indexing a corrupt frame. {e}");
                    index.skipped += 1;
                    index.record_count += 1;
                    index.scanned_to = self.frames.pos();
                    continue;
                }
                Err(e) => return Err(e),
            };
            match self.frames.read_header(frame) {
                Ok(header) => match header.tag {
                    Some(tag) => index.offsets.entry(tag).or_default().push(frame.offset),
                    None => index.untagged += 1,
                },
                Err(e) if e.is_record_local() => {
                    warn!(path = ?self.path, offset = %frame.offset, "Not indexing a bad record. {e}");
                    index.skipped += 1;
                }
                Err(e) => return Err(e),
            }
            index.record_count += 1;
            index.scanned_to = self.frames.pos();
        }
    }

    /// The records of `tag`, in append order.
    pub fn events_for_tag(&mut self, index: &TagIndex, tag: &str) -> Result<Vec<Event>> {
        index
            .get(tag)
            .iter()
            .map(|offset| self.read_at(*offset))
            .collect()
    }

    /// `(wall_time, value)` of every scalar record of `tag`.
    /// Records of other cases, or without a wall time, are left out.
    pub fn scalar_series(&mut self, tag: &str) -> Result<Vec<(f64, f32)>> {
        let index = self.build_tag_index()?;
        let series = self
            .events_for_tag(&index, tag)?
            .into_iter()
            .filter_map(|event| match (event.wall_time, event.value) {
                (Some(wall_time), Some(Value::Scalar(f))) => Some((wall_time, f)),
                _ => None,
            })
            .collect();
        Ok(series)
    }
}

use crate::header::{StreamHeader, HEADER_LEN};
use derive_more::{Deref, Display, From};
use evlog_types::types::EventHeader;
use evlog_types::{LogError, Result};
use std::io::{Read, Seek, SeekFrom};
use std::mem;

/// The absolute file offset of a frame's length prefix.
#[derive(From, Deref, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Debug)]
pub struct RecordOffset(u64);

#[derive(PartialEq, Debug)]
pub enum ReadResult<T> {
    EOF,
    Some(RecordOffset, T),
}

/// The length prefix of a frame. It counts the payload only.
#[derive(Deref, Clone, Copy, Debug)]
pub struct FrameLen(u32);
impl FrameLen {
    /// The length and its bitwise complement.
    pub const ENCODED_LEN: u64 = mem::size_of::<u32>() as u64 * 2;

    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let int = u32::try_from(payload.len()).map_err(|_| {
            LogError::InvalidEvent(format!(
                "A record of {} bytes exceeds the {} byte limit.",
                payload.len(),
                u32::MAX
            ))
        })?;
        Ok(Self(int))
    }

    pub fn to_bytes(self) -> [u8; Self::ENCODED_LEN as usize] {
        let mut buf = [0u8; Self::ENCODED_LEN as usize];
        buf[..4].copy_from_slice(&self.0.to_le_bytes());
        buf[4..].copy_from_slice(&(!self.0).to_le_bytes());
        buf
    }

    /// `None` if the length does not match its complement.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        let len = u32::from_le_bytes(buf.get(..4)?.try_into().ok()?);
        let check = u32::from_le_bytes(buf.get(4..8)?.try_into().ok()?);
        (len == !check).then_some(Self(len))
    }
}

/// ```text
/// struct Frame {
///     payload_len:    u32,
///     check:          u32,    // !payload_len
///     payload:        [u8; payload_len],
/// }
/// ```
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let frame_len = FrameLen::from_payload(payload)?;
    let mut buf = Vec::with_capacity(FrameLen::ENCODED_LEN as usize + payload.len());
    buf.extend_from_slice(&frame_len.to_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// A complete frame, located but not yet consumed.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct FrameRef {
    pub offset: RecordOffset,
    pub payload_len: u32,
}
impl FrameRef {
    pub fn payload_offset(&self) -> u64 {
        *self.offset + FrameLen::ENCODED_LEN
    }
    pub fn end(&self) -> u64 {
        self.payload_offset() + self.payload_len as u64
    }
}

/// Walks the frames of a stream.
///
/// The stream may be growing while it is walked. A frame that extends past the
/// currently known end is reported as [`LogError::TruncatedTail`] and the position
/// is left on it, so that it can be retried after more bytes have arrived.
/// Likewise a stream whose header is still being written reads as empty.
pub struct FrameCursor<R> {
    r: R,
    /// `None` until the whole header is in the stream.
    header: Option<StreamHeader>,
    /// The offset of the next frame.
    pos: u64,
    /// Where `r` is, if known.
    r_pos: Option<u64>,
    /// The stream length, as of the last time it was looked up.
    known_len: u64,
}

impl<R: Read + Seek> FrameCursor<R> {
    /// Validates the stream header, if it is complete, and positions at the first frame.
    pub fn new(r: R) -> Result<Self> {
        let mut cursor = Self {
            r,
            header: None,
            pos: HEADER_LEN,
            r_pos: None,
            known_len: 0,
        };
        cursor.load_header()?;
        Ok(cursor)
    }

    pub fn header(&self) -> Option<StreamHeader> {
        self.header
    }

    pub fn pos(&self) -> RecordOffset {
        RecordOffset(self.pos)
    }

    pub fn set_pos(&mut self, offset: RecordOffset) -> Result<()> {
        if *offset < HEADER_LEN {
            return Err(LogError::malformed(format!(
                "Offset {offset} lies within the stream header."
            )));
        }
        self.pos = *offset;
        Ok(())
    }

    pub fn rewind(&mut self) {
        self.pos = HEADER_LEN;
    }

    /// `Ok(false)` while the stream is shorter than its header but starts like one.
    fn load_header(&mut self) -> Result<bool> {
        if self.header.is_some() {
            return Ok(true);
        }
        let complete = self.is_available(0, HEADER_LEN)?;
        let len = if complete { HEADER_LEN } else { self.known_len };
        let mut buf = [0u8; HEADER_LEN as usize];
        self.seek_r(0)?;
        self.read_exact(&mut buf[..len as usize])?;
        if !complete {
            if StreamHeader::is_prefix(&buf[..len as usize]) {
                return Ok(false);
            }
            return Err(LogError::BadHeader(String::from(
                "The stream is shorter than its header and does not start like one.",
            )));
        }
        self.header = Some(StreamHeader::from_bytes(buf)?);
        Ok(true)
    }

    /// `Ok(None)` if the stream ends exactly at the current position.
    ///
    /// A corrupt length prefix is reported as [`LogError::MalformedRecord`],
    /// and the position moves on to the next intact prefix.
    pub fn next_frame(&mut self) -> Result<Option<FrameRef>> {
        if !self.load_header()? {
            return Ok(None);
        }
        let offset = self.pos;

        if !self.is_available(offset, FrameLen::ENCODED_LEN)? {
            let available = self.known_len.saturating_sub(offset);
            if available == 0 {
                return Ok(None);
            }
            return Err(LogError::TruncatedTail {
                offset,
                needed: FrameLen::ENCODED_LEN,
                available,
            });
        }

        self.seek_r(offset)?;
        let mut buf = [0u8; FrameLen::ENCODED_LEN as usize];
        self.read_exact(&mut buf)?;
        let payload_len = match FrameLen::from_bytes(&buf) {
            Some(frame_len) => *frame_len,
            None => {
                let resume = self.resync(offset + 1)?;
                self.pos = resume;
                return Err(LogError::malformed(format!(
                    "The frame prefix at offset {offset} is corrupt. Resuming at offset {resume}."
                )));
            }
        };

        let needed = FrameLen::ENCODED_LEN + payload_len as u64;
        if !self.is_available(offset, needed)? {
            return Err(LogError::TruncatedTail {
                offset,
                needed,
                available: self.known_len.saturating_sub(offset),
            });
        }

        Ok(Some(FrameRef {
            offset: RecordOffset(offset),
            payload_len,
        }))
    }

    /// The first offset from `from` on that holds an intact frame prefix,
    /// or the end of the stream if there is none.
    fn resync(&mut self, from: u64) -> Result<u64> {
        let mut rest = vec![0u8; self.known_len.saturating_sub(from) as usize];
        self.seek_r(from)?;
        self.read_exact(&mut rest)?;
        let found = rest
            .windows(FrameLen::ENCODED_LEN as usize)
            .position(|w| FrameLen::from_bytes(w).is_some());
        Ok(found.map_or(self.known_len.max(from), |i| from + i as u64))
    }

    /// Consumes the frame. The position advances past it even if reading fails.
    pub fn read_payload(&mut self, frame: FrameRef) -> Result<Vec<u8>> {
        self.pos = frame.end();
        self.seek_r(frame.payload_offset())?;
        let mut buf = vec![0u8; frame.payload_len as usize];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Consumes the frame, decoding only its event header.
    /// The position advances past it even if decoding fails.
    pub fn read_header(&mut self, frame: FrameRef) -> Result<EventHeader> {
        self.pos = frame.end();
        self.seek_r(frame.payload_offset())?;
        self.r_pos = None;
        let header = EventHeader::deser(&mut self.r, frame.payload_len as u64)?;
        self.r_pos = Some(frame.end());
        Ok(header)
    }

    /// Consumes the frame without reading it.
    pub fn skip(&mut self, frame: FrameRef) {
        self.pos = frame.end();
    }

    fn is_available(&mut self, offset: u64, len: u64) -> Result<bool> {
        let end = offset.saturating_add(len);
        if end <= self.known_len {
            return Ok(true);
        }
        self.r_pos = None;
        self.known_len = self.r.seek(SeekFrom::End(0))?;
        self.r_pos = Some(self.known_len);
        Ok(end <= self.known_len)
    }

    fn seek_r(&mut self, offset: u64) -> Result<()> {
        if self.r_pos != Some(offset) {
            self.r_pos = None;
            self.r.seek(SeekFrom::Start(offset))?;
            self.r_pos = Some(offset);
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.r_pos.take();
        self.r.read_exact(buf)?;
        self.r_pos = start.map(|start| start + buf.len() as u64);
        Ok(())
    }
}

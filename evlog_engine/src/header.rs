use evlog_types::{LogError, Result};
use std::mem;

/// Identifies an event log stream at offset 0.
pub const MAGIC: [u8; 4] = *b"EVLG";

pub const FORMAT_VERSION: u16 = 1;

/// `magic` + `version` + `reserved`.
pub const HEADER_LEN: u64 = (MAGIC.len() + mem::size_of::<u16>() * 2) as u64;

/// ```text
/// struct StreamHeader {
///     magic:      [u8; 4],    // "EVLG"
///     version:    u16,
///     reserved:   u16,        // zero
/// }
/// ```
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct StreamHeader {
    pub version: u16,
}

impl Default for StreamHeader {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
        }
    }
}

impl StreamHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN as usize] {
        let mut buf = [0u8; HEADER_LEN as usize];
        buf[..4].copy_from_slice(&MAGIC);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: [u8; HEADER_LEN as usize]) -> Result<Self> {
        if buf[..4] != MAGIC {
            return Err(LogError::BadHeader(format!(
                "Magic {:?} is not {:?}.",
                &buf[..4],
                MAGIC
            )));
        }
        let version = u16::from_le_bytes([buf[4], buf[5]]);
        if version == 0 || version > FORMAT_VERSION {
            return Err(LogError::BadHeader(format!(
                "Format version {version} is not supported. The newest known is {FORMAT_VERSION}."
            )));
        }
        Ok(Self { version })
    }

    /// Whether `buf` is how a stream of this format starts while its header is still being written.
    pub fn is_prefix(buf: &[u8]) -> bool {
        buf.len() < HEADER_LEN as usize && Self::default().to_bytes().starts_with(buf)
    }
}

use crate::{LogError, Result};
use derive_more::Deref;
use std::mem;

/// `field_id` + `wire_kind`.
pub const FIELD_HEADER_LEN: usize = mem::size_of::<u16>() + mem::size_of::<u8>();

#[derive(Deref, Clone, Copy, Debug)]
pub struct BodyLen(u32);
impl BodyLen {
    pub const ENCODED_LEN: usize = mem::size_of::<u32>();

    pub fn from_body(buf: &[u8]) -> Result<Self> {
        let int = u32::try_from(buf.len()).map_err(|_| {
            LogError::InvalidEvent(format!(
                "A field body of {} bytes exceeds the {} byte limit.",
                buf.len(),
                u32::MAX
            ))
        })?;
        Ok(Self(int))
    }
    pub fn from_le_bytes(buf: [u8; mem::size_of::<u32>()]) -> Self {
        Self(u32::from_le_bytes(buf))
    }
}
